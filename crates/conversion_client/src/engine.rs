use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use conversion_logging::{conv_debug, conv_warn};

use crate::poller::{ChannelEventSink, EventSink, Poller};
use crate::{
    ClientError, ClientSettings, DownloadRequest, Downloader, EngineEvent, FailureKind,
    ReqwestDownloader, ReqwestProgressFetcher, ReqwestUploader, UploadRequest, Uploader,
};

enum EngineCommand {
    Upload {
        submission: u64,
        request: UploadRequest,
    },
    StartPolling {
        task_id: String,
    },
    StopPolling {
        task_id: String,
    },
    Download {
        request: DownloadRequest,
    },
}

/// Runs HTTP work on a background Tokio runtime.
///
/// Commands go in through [`EngineHandle`] methods; results come back as
/// [`EngineEvent`]s. Dropping the handle stops the poll timer and shuts the
/// runtime down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let uploader: Arc<dyn Uploader> = Arc::new(ReqwestUploader::new(&settings)?);
        let downloader: Arc<dyn Downloader> = Arc::new(ReqwestDownloader::new(&settings)?);
        let fetcher = Arc::new(ReqwestProgressFetcher::new(&settings)?);
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let poll_interval = settings.poll_interval;

        thread::spawn(move || {
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let mut poller = Poller::new(runtime.handle().clone(), fetcher, poll_interval);

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Upload {
                        submission,
                        request,
                    } => {
                        let uploader = uploader.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            let result = uploader.upload(&request).await;
                            sink.emit(EngineEvent::UploadCompleted { submission, result });
                        });
                    }
                    EngineCommand::StartPolling { task_id } => {
                        poller.start(task_id, sink.clone());
                    }
                    EngineCommand::StopPolling { task_id } => {
                        if !poller.stop(&task_id) {
                            conv_debug!("No poll timer running for task {}", task_id);
                        }
                    }
                    EngineCommand::Download { request } => {
                        let downloader = downloader.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            let result = downloader.download(&request).await;
                            sink.emit(EngineEvent::DownloadCompleted {
                                task_id: request.task_id,
                                result,
                            });
                        });
                    }
                }
            }

            // Cancel the timer before the runtime goes away.
            drop(poller);
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, submission: u64, request: UploadRequest) {
        self.send(EngineCommand::Upload {
            submission,
            request,
        });
    }

    pub fn start_polling(&self, task_id: impl Into<String>) {
        self.send(EngineCommand::StartPolling {
            task_id: task_id.into(),
        });
    }

    pub fn stop_polling(&self, task_id: impl Into<String>) {
        self.send(EngineCommand::StopPolling {
            task_id: task_id.into(),
        });
    }

    pub fn download(&self, request: DownloadRequest) {
        self.send(EngineCommand::Download { request });
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time; an error means the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, ClientError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClientError::new(
                FailureKind::EngineStopped,
                "engine thread exited",
            )),
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            conv_warn!("Engine thread is gone; command dropped");
        }
    }
}
