use std::sync::Arc;
use std::time::Duration;

use conversion_logging::{conv_debug, conv_info};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, ProgressFetcher};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

struct ActivePoll {
    task_id: String,
    token: CancellationToken,
}

/// Owns the single repeating status timer.
///
/// The first check runs immediately, then one per interval. Each tick's
/// request runs on its own task, so a slow response never delays arming the
/// next tick. Results that arrive after the timer was cancelled are dropped.
pub struct Poller {
    runtime: Handle,
    fetcher: Arc<dyn ProgressFetcher>,
    interval: Duration,
    active: Option<ActivePoll>,
}

impl Poller {
    pub fn new(runtime: Handle, fetcher: Arc<dyn ProgressFetcher>, interval: Duration) -> Self {
        Self {
            runtime,
            fetcher,
            interval,
            active: None,
        }
    }

    /// Cancels the current timer, if any, then arms a new one for `task_id`.
    pub fn start(&mut self, task_id: impl Into<String>, sink: Arc<dyn EventSink>) {
        let task_id = task_id.into();
        self.cancel_current();

        let token = CancellationToken::new();
        conv_info!(
            "Polling task {} every {} ms",
            task_id,
            self.interval.as_millis()
        );
        self.runtime.spawn(run_timer(
            self.fetcher.clone(),
            task_id.clone(),
            self.interval,
            token.clone(),
            sink,
        ));
        self.active = Some(ActivePoll { task_id, token });
    }

    /// Cancels the timer if it belongs to `task_id`. Returns whether a timer
    /// was cancelled.
    pub fn stop(&mut self, task_id: &str) -> bool {
        if self.active_task() != Some(task_id) {
            return false;
        }
        self.cancel_current();
        true
    }

    pub fn active_task(&self) -> Option<&str> {
        self.active.as_ref().map(|poll| poll.task_id.as_str())
    }

    fn cancel_current(&mut self) {
        if let Some(previous) = self.active.take() {
            conv_debug!("Cancelling poll timer for task {}", previous.task_id);
            previous.token.cancel();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

async fn run_timer(
    fetcher: Arc<dyn ProgressFetcher>,
    task_id: String,
    interval: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                tick += 1;
                let fetcher = fetcher.clone();
                let task_id = task_id.clone();
                let token = token.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let result = tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        result = fetcher.fetch(&task_id) => result,
                    };
                    if token.is_cancelled() {
                        return;
                    }
                    sink.emit(EngineEvent::Progress { task_id, tick, result });
                });
            }
        }
    }
    conv_debug!("Poll timer for task {} stopped after {} ticks", task_id, tick);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::{ClientError, ProgressReport};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ProgressFetcher for CountingFetcher {
        async fn fetch(&self, _task_id: &str) -> Result<ProgressReport, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProgressReport {
                status: Some("processing".to_string()),
                ..ProgressReport::default()
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<EngineEvent>>,
    }

    impl RecordingSink {
        fn task_ids(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|event| match event {
                    EngineEvent::Progress { task_id, .. } => Some(task_id.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: EngineEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn first_tick_is_immediate_then_periodic() {
        let fetcher = Arc::new(CountingFetcher::default());
        let sink = Arc::new(RecordingSink::default());
        let mut poller =
            Poller::new(Handle::current(), fetcher.clone(), Duration::from_millis(100));

        poller.start("abc", sink.clone());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(fetcher.calls.load(Ordering::SeqCst) >= 2);
        assert!(poller.stop("abc"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_cancels_the_timer() {
        let fetcher = Arc::new(CountingFetcher::default());
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Handle::current(), fetcher.clone(), Duration::from_millis(30));

        poller.start("abc", sink.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!poller.stop("other"));
        assert!(poller.stop("abc"));
        assert_eq!(poller.active_task(), None);

        let calls = fetcher.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn restarting_replaces_the_previous_timer() {
        let fetcher = Arc::new(CountingFetcher::default());
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Handle::current(), fetcher, Duration::from_millis(30));

        poller.start("old", sink.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.start("new", sink.clone());
        let seen_before = sink.task_ids().len();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let ids = sink.task_ids();
        assert!(ids[seen_before..].iter().all(|id| id == "new"));
        assert_eq!(poller.active_task(), Some("new"));
        drop(poller);
    }
}
