//! Cooperative cancellation shared between the caller, the coordinator and the pool.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag with a blocking-friendly notification
///
/// Cancelling sets the flag and closes the notification channel, so a coordinator
/// blocked in `select!` on [`CancellationToken::notified`] wakes up immediately.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

struct TokenState {
    cancelled: AtomicBool,
    notifier: Mutex<Option<Sender<()>>>,
    notified: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = channel::bounded(0);
        Self {
            inner: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                notifier: Mutex::new(Some(sender)),
                notified: receiver,
            }),
        }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notifier.lock().take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the token is cancelled
    pub fn notified(&self) -> &Receiver<()> {
        &self.inner.notified
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
