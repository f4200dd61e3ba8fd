use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Lifecycle notifications of one batch, in emission order:
/// `Started`, `Progress { completed: 0 }`, one `Progress` per task, `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Started { total: usize },
    Progress { completed: usize, total: usize },
    Finished,
}

/// Receives batch notifications. Called from worker tasks, so it must be
/// cheap and must not block.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: DownloadEvent);
}

/// Discards every event.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: DownloadEvent) {}
}

/// Forwards events to a channel, e.g. a UI task.
impl ProgressObserver for UnboundedSender<DownloadEvent> {
    fn on_event(&self, event: DownloadEvent) {
        let _ = self.send(event);
    }
}

/// Logs progress every ten percent.
pub struct LogObserver {
    label: String,
    last_decile: AtomicUsize,
}

impl LogObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_decile: AtomicUsize::new(0),
        }
    }
}

impl ProgressObserver for LogObserver {
    fn on_event(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { total } => {
                info!("{}: {} files to check", self.label, total);
            }
            DownloadEvent::Progress { completed, total } if total > 0 => {
                let decile = completed * 10 / total;
                if decile > self.last_decile.fetch_max(decile, Ordering::Relaxed) {
                    info!(
                        "{}: {}% ({}/{})",
                        self.label,
                        decile * 10,
                        completed,
                        total
                    );
                }
            }
            DownloadEvent::Progress { .. } => {}
            DownloadEvent::Finished => info!("{}: finished", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_forwards_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.on_event(DownloadEvent::Started { total: 2 });
        tx.on_event(DownloadEvent::Finished);

        assert_eq!(rx.try_recv().unwrap(), DownloadEvent::Started { total: 2 });
        assert_eq!(rx.try_recv().unwrap(), DownloadEvent::Finished);
    }

    #[test]
    fn log_observer_tracks_highest_decile() {
        let observer = LogObserver::new("test");
        observer.on_event(DownloadEvent::Progress {
            completed: 5,
            total: 10,
        });
        observer.on_event(DownloadEvent::Progress {
            completed: 3,
            total: 10,
        });
        assert_eq!(observer.last_decile.load(Ordering::Relaxed), 5);
    }
}
