// ─── Batch Download Coordinator ───
// A fixed pool of workers drains one shared queue of download tasks.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use futures_util::FutureExt;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::client::Fetch;
use super::progress::{DownloadEvent, ProgressObserver};
use super::task::{BatchResult, DownloadTask, FetchOutcome, TaskFailure};
use crate::core::error::{LauncherError, LauncherResult};

/// Number of workers used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Consumer half of the task queue.
///
/// The queue is *closed* once the producer drops its sender and *drained*
/// once a closed queue has handed out its last task (`recv` yields `None`).
type TaskQueue = Arc<Mutex<mpsc::Receiver<DownloadTask>>>;

/// State shared by every worker of one batch.
struct BatchContext {
    total: usize,
    progress: AtomicUsize,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    bytes_downloaded: AtomicU64,
    failures: StdMutex<Vec<TaskFailure>>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl BatchContext {
    fn new(total: usize, observer: Arc<dyn ProgressObserver>, cancel: CancellationToken) -> Self {
        Self {
            total,
            progress: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            bytes_downloaded: AtomicU64::new(0),
            failures: StdMutex::new(Vec::new()),
            observer,
            cancel,
        }
    }

    fn emit(&self, event: DownloadEvent) {
        self.observer.on_event(event);
    }

    /// Each caller gets a distinct value in `1..=total`.
    fn report_progress(&self) {
        let completed = self.progress.fetch_add(1, Ordering::AcqRel) + 1;
        self.emit(DownloadEvent::Progress {
            completed,
            total: self.total,
        });
    }

    fn record(&self, task: DownloadTask, result: LauncherResult<FetchOutcome>) {
        match result {
            Ok(FetchOutcome::Skipped) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FetchOutcome::Downloaded { bytes }) => {
                self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                if !matches!(error, LauncherError::Cancelled) {
                    warn!("Failed to download {}: {}", task.url, error);
                }
                self.failures
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(TaskFailure {
                        url: task.url,
                        error,
                    });
            }
        }
    }

    /// Only meaningful once every worker has exited.
    fn take_result(&self) -> BatchResult {
        let failures = std::mem::take(
            &mut *self
                .failures
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        BatchResult {
            total: self.total,
            completed: self.completed.load(Ordering::Acquire),
            skipped: self.skipped.load(Ordering::Acquire),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Acquire),
            failures,
        }
    }
}

/// Runs download tasks through a bounded pool of workers.
pub struct BatchDownloader {
    fetcher: Arc<dyn Fetch>,
    /// Number of workers, always at least one.
    concurrency: usize,
    cancel: CancellationToken,
}

impl BatchDownloader {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Once `token` is cancelled, workers stop issuing requests and every
    /// remaining task is recorded as [`LauncherError::Cancelled`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Download every task, never failing as a whole.
    ///
    /// Per-task errors end up in [`BatchResult::failures`]. `Finished` is
    /// emitted after every worker has exited, so it always follows the last
    /// progress notification.
    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        observer: Arc<dyn ProgressObserver>,
    ) -> BatchResult {
        let total = tasks.len();
        info!(
            "Starting batch download: {} files, concurrency={}",
            total, self.concurrency
        );

        let ctx = Arc::new(BatchContext::new(total, observer, self.cancel.clone()));
        ctx.emit(DownloadEvent::Started { total });
        ctx.emit(DownloadEvent::Progress {
            completed: 0,
            total,
        });

        let (tx, rx) = mpsc::channel(self.concurrency * 2);
        let queue: TaskQueue = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            workers.spawn(worker(id, queue.clone(), self.fetcher.clone(), ctx.clone()));
        }
        // Workers own the receiver; once they are all gone `send` fails.
        drop(queue);

        let mut pending = tasks.into_iter();
        while let Some(task) = pending.next() {
            if let Err(mpsc::error::SendError(task)) = tx.send(task).await {
                // Every worker is gone; account for what never got queued.
                for task in std::iter::once(task).chain(pending.by_ref()) {
                    ctx.record(
                        task,
                        Err(LauncherError::Other("download worker pool stopped".into())),
                    );
                    ctx.report_progress();
                }
                break;
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Download worker panicked: {}", e);
            }
        }

        ctx.emit(DownloadEvent::Finished);

        let result = ctx.take_result();

        info!(
            "Batch finished: {}/{} ok ({} up to date, {} bytes downloaded), {} failed",
            result.completed,
            result.total,
            result.skipped,
            result.bytes_downloaded,
            result.failures.len()
        );
        result
    }
}

async fn worker(id: usize, queue: TaskQueue, fetcher: Arc<dyn Fetch>, ctx: Arc<BatchContext>) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        let result = if ctx.cancel.is_cancelled() {
            Err(LauncherError::Cancelled)
        } else {
            let fetch = AssertUnwindSafe(fetcher.fetch(&task)).catch_unwind();
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => Err(LauncherError::Cancelled),
                caught = fetch => caught.unwrap_or_else(|panic| {
                    Err(LauncherError::Other(format!(
                        "download of {} panicked: {}",
                        task.url,
                        panic_message(panic.as_ref())
                    )))
                }),
            }
        };

        ctx.record(task, result);
        ctx.report_progress();
    }

    debug!("Download worker {} exiting: queue drained", id);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
