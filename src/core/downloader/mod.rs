mod batch;
mod client;
mod progress;
mod task;
pub mod verify;

pub use batch::{BatchDownloader, DEFAULT_CONCURRENCY};
pub use client::{Downloader, Fetch};
pub use progress::{DownloadEvent, LogObserver, NoopObserver, ProgressObserver};
pub use task::{BatchResult, DownloadTask, FetchOutcome, TaskFailure};
