use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

/// A cancellation signal shared between render loops and tasks.
///
/// Cancelling stops the animation immediately. It does not stop the task:
/// a task that should end early must poll [`CancelToken::is_cancelled`]
/// (also exposed on [`Update`](crate::Update)).
///
/// ```rust,ignore
/// let token = CancelToken::new();
/// token.cancel_after(Duration::from_secs(30));
/// Animation::spinner("Waiting for lock")
///     .cancel_on(&token)
///     .run(&logger, |update| {
///         while !update.is_cancelled() { /* poll */ }
///         Ok::<_, std::io::Error>(())
///     })?;
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    // Dropping the sender disconnects `signal`, which wakes every `select!`.
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
                signal: rx,
            }),
        }
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            tracing::trace!("cancel token fired");
            self.inner
                .trigger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Cancels the token once `timeout` has elapsed.
    pub fn cancel_after(&self, timeout: Duration) {
        let token = self.clone();
        let spawned = std::thread::Builder::new()
            .name("cancel-timer".into())
            .spawn(move || {
                // Returns early when the token is cancelled by someone else.
                let _ = token.signal().recv_timeout(timeout);
                token.cancel();
            });
        if let Err(err) = spawned {
            tracing::warn!(%err, "could not start cancel timer");
        }
    }

    /// Becomes ready (disconnected) once the token is cancelled.
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn cancel_wakes_waiters() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = std::thread::spawn(move || waiter.signal().recv().is_err());
        token.cancel();
        assert!(handle.join().unwrap());
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_after_fires() {
        let token = CancelToken::new();
        let start = Instant::now();
        token.cancel_after(Duration::from_millis(20));
        let _ = token.signal().recv_timeout(Duration::from_secs(5));
        assert!(token.is_cancelled());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
