/// Boxed error returned by a user task.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why an animation finished without a value.
///
/// A task's own error is kept verbatim in [`Error::Task`] and can be
/// recovered with [`Error::downcast_ref`]. Cancellation is a separate
/// variant so callers can tell "the work failed" apart from "we stopped
/// waiting for it".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The task returned an error.
    #[error("{0}")]
    Task(BoxError),
    /// The shared [`CancelToken`](crate::CancelToken) fired before the task completed.
    #[error("animation cancelled")]
    Cancelled,
    /// The task panicked. Holds the panic payload when it was a string.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The worker thread could not be started.
    #[error("failed to spawn task worker")]
    Spawn(#[source] std::io::Error),
    /// Every error produced by a group, in slot order.
    #[error("{}", join_messages(.0))]
    Joined(Vec<Error>),
}

impl Error {
    /// Wraps a task error.
    pub fn task<E: Into<BoxError>>(err: E) -> Self {
        Self::Task(err.into())
    }

    /// Returns `true` if this is (or, for [`Error::Joined`], contains only) a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Joined(errors) => !errors.is_empty() && errors.iter().all(Error::is_cancelled),
            _ => false,
        }
    }

    /// Attempts to view the task error as a concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Task(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub(crate) fn join(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Joined(errors)),
        }
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
