use std::time::Duration;

use conversion_client::{
    ClientError, ClientSettings, DownloadRequest, EngineEvent, EngineHandle, FailureKind,
    ProgressReport, UploadReply, UploadRequest,
};
use conversion_core::{
    Effect, Msg, OutputKind, ProgressSnapshot, SubmissionError, TaskId, UploadAccepted,
    UploadForm,
};
use conversion_logging::{conv_info, conv_warn};

/// Executes core effects on the HTTP engine and turns engine events back
/// into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendUpload { submission, form } => {
                    conv_info!(
                        "SendUpload submission={} file={}",
                        submission,
                        form.file.display()
                    );
                    self.engine.upload(submission, upload_request(form));
                }
                Effect::StartPolling { task_id } => {
                    conv_info!("StartPolling task_id={}", task_id);
                    self.engine.start_polling(task_id.as_str());
                }
                Effect::StopPolling { task_id } => {
                    conv_info!("StopPolling task_id={}", task_id);
                    self.engine.stop_polling(task_id.as_str());
                }
                Effect::Download { task_id, output } => {
                    conv_info!("Download task_id={} output={}", task_id, output);
                    self.engine.download(download_request(&task_id, output));
                }
            }
        }
    }

    pub fn next_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, ClientError> {
        self.engine.recv_timeout(timeout)
    }
}

pub fn upload_request(form: UploadForm) -> UploadRequest {
    UploadRequest {
        file: form.file,
        file_field: form.file_field,
        fields: form.fields,
    }
}

pub fn download_request(task_id: &TaskId, output: OutputKind) -> DownloadRequest {
    DownloadRequest {
        task_id: task_id.to_string(),
        file_type: output.as_str().to_string(),
        fallback_name: format!("{}.{}", task_id, output.file_extension()),
    }
}

/// Classifies an upload outcome into the submission error taxonomy.
pub fn map_upload_result(
    result: Result<UploadReply, ClientError>,
) -> Result<UploadAccepted, SubmissionError> {
    match result {
        Ok(UploadReply {
            task_id: Some(task_id),
            output_format,
            ..
        }) => Ok(UploadAccepted {
            task_id: TaskId::new(task_id),
            output: output_format.as_deref().and_then(OutputKind::parse),
        }),
        Ok(reply) => Err(SubmissionError::missing_task_id(reply.error)),
        Err(ClientError {
            kind: FailureKind::HttpStatus(code),
            server_error,
            ..
        }) => Err(SubmissionError::rejected(code, server_error)),
        Err(err) => Err(SubmissionError::transport(err.to_string())),
    }
}

pub fn map_progress(report: ProgressReport) -> ProgressSnapshot {
    let output = report.output_format.as_deref().and_then(OutputKind::parse);
    ProgressSnapshot::from_fields(report.status, report.progress, report.message, report.error)
        .with_output(output)
}

/// Maps an engine event to a state-machine message. Download results are not
/// messages; the session handles them directly.
pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::UploadCompleted { submission, result } => Some(Msg::UploadFinished {
            submission,
            result: map_upload_result(result),
        }),
        EngineEvent::Progress {
            task_id,
            tick,
            result,
        } => {
            let task_id = TaskId::new(task_id);
            Some(match result {
                Ok(report) => Msg::ProgressReceived {
                    task_id,
                    snapshot: map_progress(report),
                },
                Err(err) => {
                    conv_warn!("Poll tick {} for task {} failed: {}", tick, task_id, err);
                    Msg::ProgressFailed {
                        task_id,
                        reason: err.to_string(),
                    }
                }
            })
        }
        EngineEvent::DownloadCompleted { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_reply_without_task_id_uses_server_error() {
        let result = map_upload_result(Ok(UploadReply {
            task_id: None,
            error: Some("Insufficient credits".to_string()),
            output_format: None,
        }));
        assert_eq!(
            result,
            Err(SubmissionError::MissingTaskId {
                message: "Insufficient credits".to_string(),
            })
        );
    }

    #[test]
    fn download_request_uses_kind_for_path_and_extension() {
        let request = download_request(&TaskId::from("abc"), OutputKind::Pdf);
        assert_eq!(request.file_type, "pdf");
        assert_eq!(request.fallback_name, "abc.pdf");
    }

    #[test]
    fn progress_report_defaults_apply() {
        let snapshot = map_progress(ProgressReport {
            output_format: Some("audio".to_string()),
            ..ProgressReport::default()
        });
        assert_eq!(snapshot.status, "Unknown");
        assert_eq!(snapshot.progress, 0);
        assert_eq!(snapshot.output, Some(OutputKind::Audio));
    }
}
