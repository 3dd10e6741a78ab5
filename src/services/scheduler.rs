use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// A callback deferred onto the runtime, the way a page timer works.
///
/// Dropping the task leaves it running; only [`ScheduledTask::cancel`] stops it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Must be called from inside a tokio runtime.
    pub fn after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            f();
        });

        Self { handle }
    }

    /// No-op once the callback has run or the task was already cancelled.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_pending(&self) -> bool {
        !self.handle.is_finished()
    }
}
