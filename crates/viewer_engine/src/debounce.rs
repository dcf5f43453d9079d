use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Runs an action once a quiet interval has passed without a newer one
/// being scheduled.
///
/// Every call to [`Debouncer::schedule`] cancels the previously scheduled
/// action and restarts the countdown. Dropping the debouncer cancels any
/// action still waiting.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, runtime: &Handle, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let window = self.window;
        runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(window) => action.await,
            }
        });
        self.pending = Some(token);
    }

    /// Cancels the waiting action, if any. An action whose window already
    /// elapsed keeps running.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
