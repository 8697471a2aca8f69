use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A periodic background fetch that is guaranteed to stop.
///
/// The first tick fires one period after `spawn`. Cancelling interrupts both the
/// wait and a fetch in flight. Dropping the handle cancels it.
#[derive(Debug)]
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = stopped.changed() => break,
                    _ = tick() => {}
                }
            }
            tracing::debug!("poll loop stopped");
        });
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Stop polling. Returns true only for the call that actually stopped it.
    pub fn cancel(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        let _ = self.cancel.send(true);
        task.abort();
        true
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
