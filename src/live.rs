//! State a running task can change while its animation is on screen.
//!
//! Message and fields each travel through a one-slot channel. A newer value
//! evicts the one still waiting, so nothing piles up while the render loop
//! is not draining (during a delay, or on non-interactive output). Progress
//! lives in atomics so readers never wait on a writer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::cancel::CancelToken;
use crate::field::Field;

/// Latest-value cell: at most one value is ever pending.
struct Latest<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> Latest<T> {
    fn new() -> (Self, Receiver<T>) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (Self { tx, rx: rx.clone() }, rx)
    }

    /// Publishes `value`, dropping a pending one the reader has not taken.
    fn replace(&self, mut value: T) {
        loop {
            match self.tx.try_send(value) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.rx.try_recv();
                    value = rejected;
                }
            }
        }
    }
}

#[derive(Debug)]
struct Progress {
    current: AtomicU64,
    total: AtomicU64,
}

impl Progress {
    fn new(current: i64, total: i64) -> Self {
        let total = total.max(1) as u64;
        Self {
            current: AtomicU64::new((current.max(0) as u64).min(total)),
            total: AtomicU64::new(total),
        }
    }

    /// Consistent `(current, total)` with `current <= total` and `total >= 1`.
    fn load(&self) -> (u64, u64) {
        let total = self.total.load(Ordering::Acquire).max(1);
        let current = self.current.load(Ordering::Acquire).min(total);
        (current, total)
    }
}

/// Handle given to a task for publishing live changes to its animation.
///
/// Cheap to clone. Every setter replaces the whole value; the render loop
/// picks the latest one up on its next tick.
///
/// ```rust,ignore
/// Animation::bar("Uploading", files.len() as i64).run(&logger, |update| {
///     for file in files {
///         update.set_message(format!("Uploading {file}"));
///         upload(file)?;
///         update.increment(1);
///     }
///     Ok::<_, io::Error>(())
/// })?;
/// ```
#[derive(Clone)]
pub struct Update {
    message: Latest<Arc<str>>,
    fields: Latest<Arc<Vec<Field>>>,
    progress: Arc<Progress>,
    token: CancelToken,
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Update")
            .field("progress", &self.progress.load())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl Update {
    pub fn set_message(&self, message: impl Into<String>) {
        let message: String = message.into();
        self.message.replace(message.into());
    }

    /// Replaces the whole field list.
    pub fn set_fields<I, F>(&self, fields: I)
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        let fields: Vec<Field> = fields.into_iter().map(Into::into).collect();
        self.fields.replace(Arc::new(fields));
    }

    /// Sets progress, clamped to `[0, total]`.
    pub fn set_progress(&self, current: i64) {
        let total = self.progress.total.load(Ordering::Acquire);
        let clamped = (current.max(0) as u64).min(total);
        self.progress.current.store(clamped, Ordering::Release);
    }

    /// Adds `n` to the progress, saturating at the total.
    pub fn increment(&self, n: u64) {
        let total = self.progress.total.load(Ordering::Acquire);
        let _ = self
            .progress
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(n).min(total))
            });
    }

    /// Sets the total (at least 1) and re-clamps the current progress.
    pub fn set_total(&self, total: i64) {
        let total = total.max(1) as u64;
        self.progress.total.store(total, Ordering::Release);
        let _ = self
            .progress
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current > total).then_some(total)
            });
    }

    /// Current `(progress, total)`.
    pub fn progress(&self) -> (u64, u64) {
        self.progress.load()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

/// The render loop's side: the latest published values.
pub(crate) struct LiveState {
    pub(crate) message: Arc<str>,
    pub(crate) fields: Arc<Vec<Field>>,
    message_rx: Receiver<Arc<str>>,
    fields_rx: Receiver<Arc<Vec<Field>>>,
    progress: Arc<Progress>,
}

impl LiveState {
    pub(crate) fn new(
        message: &str, fields: Vec<Field>, current: i64, total: i64, token: CancelToken,
    ) -> (Self, Update) {
        let (message_slot, message_rx) = Latest::new();
        let (fields_slot, fields_rx) = Latest::new();
        let progress = Arc::new(Progress::new(current, total));
        let live = Self {
            message: Arc::from(message),
            fields: Arc::new(fields),
            message_rx,
            fields_rx,
            progress: progress.clone(),
        };
        let update = Update {
            message: message_slot,
            fields: fields_slot,
            progress,
            token,
        };
        (live, update)
    }

    /// Takes the latest published values without blocking.
    ///
    /// Returns `false` once every [`Update`] handle has been dropped.
    pub(crate) fn drain(&mut self) -> bool {
        let message = match self.message_rx.try_recv() {
            Ok(message) => {
                self.message = message;
                true
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        };
        let fields = match self.fields_rx.try_recv() {
            Ok(fields) => {
                self.fields = fields;
                true
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        };
        message && fields
    }

    pub(crate) fn progress(&self) -> (u64, u64) {
        self.progress.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(current: i64, total: i64) -> (LiveState, Update) {
        LiveState::new("start", vec![], current, total, CancelToken::new())
    }

    #[test]
    fn progress_is_clamped() {
        let (state, update) = live(0, 10);
        update.set_progress(15);
        assert_eq!(state.progress(), (10, 10));
        update.set_progress(-4);
        assert_eq!(state.progress(), (0, 10));
        update.increment(7);
        update.increment(7);
        assert_eq!(update.progress(), (10, 10));
    }

    #[test]
    fn initial_values_are_clamped() {
        assert_eq!(live(50, 10).0.progress(), (10, 10));
        assert_eq!(live(-1, 0).0.progress(), (0, 1));
    }

    #[test]
    fn shrinking_total_reclamps_current() {
        let (state, update) = live(8, 10);
        update.set_total(5);
        assert_eq!(state.progress(), (5, 5));
        update.set_total(-3);
        assert_eq!(state.progress(), (1, 1));
    }

    #[test]
    fn drain_applies_latest_whole_values() {
        let (mut state, update) = live(0, 1);
        update.set_message("one");
        update.set_message("two");
        update.set_fields([("file", "a.txt")]);
        assert!(state.drain());
        assert_eq!(&*state.message, "two");
        assert_eq!(*state.fields, vec![Field::new("file", "a.txt")]);

        drop(update);
        assert!(!state.drain());
    }

    #[test]
    fn undrained_updates_do_not_pile_up() {
        let (mut state, update) = live(0, 1);
        for n in 0..100_000 {
            update.set_message(format!("step {n}"));
            update.set_fields([("n", n)]);
        }
        assert_eq!(state.message_rx.len(), 1);
        assert_eq!(state.fields_rx.len(), 1);
        assert!(state.drain());
        assert_eq!(&*state.message, "step 99999");
        assert_eq!(*state.fields, vec![Field::new("n", 99_999)]);
    }
}
