//! Conversion client: HTTP I/O and effect execution for the task lifecycle.
mod download;
mod engine;
mod persist;
mod poller;
mod progress;
mod settings;
mod types;
mod upload;

pub use download::{content_disposition_filename, Downloader, ReqwestDownloader};
pub use engine::EngineHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{ChannelEventSink, EventSink, Poller};
pub use progress::{ProgressFetcher, ReqwestProgressFetcher};
pub use settings::{ClientSettings, Routes};
pub use types::{
    ClientError, DownloadOutput, DownloadRequest, EngineEvent, FailureKind, ProgressReport,
    UploadReply, UploadRequest,
};
pub use upload::{ReqwestUploader, Uploader};
