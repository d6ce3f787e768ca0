use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam_channel::Receiver;

use crate::error::{BoxError, Error};
use crate::live::Update;

/// Completion signal of a background task. Yields exactly one result.
pub(crate) type Done<T> = Receiver<Result<T, Error>>;

/// Runs `task` on its own worker thread.
///
/// The worker is detached: nobody joins it, so a task that ignores
/// cancellation keeps running after its animation has returned.
pub(crate) fn spawn<T, E, F>(name: &str, update: Update, task: F) -> Result<Done<T>, Error>
where
    T: Send + 'static,
    E: Into<BoxError>,
    F: FnOnce(Update) -> Result<T, E> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let result = match catch_unwind(AssertUnwindSafe(|| task(update))) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(Error::Task(err.into())),
                Err(payload) => Err(Error::Panicked(panic_message(payload))),
            };
            // The receiver is gone when the animation was cancelled.
            let _ = tx.send(result);
        })
        .map_err(Error::Spawn)?;
    Ok(rx)
}

/// Maps a closed completion channel to a result.
pub(crate) fn settle<T>(received: Result<Result<T, Error>, crossbeam_channel::RecvError>) -> Result<T, Error> {
    received.unwrap_or_else(|_| Err(Error::Panicked("task exited without a result".to_string())))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::live::LiveState;

    fn update() -> Update {
        LiveState::new("", vec![], 0, 1, CancelToken::new()).1
    }

    #[test]
    fn value_is_delivered() {
        let done = spawn("t", update(), |_| Ok::<_, std::io::Error>(7)).unwrap();
        assert_eq!(settle(done.recv()).unwrap(), 7);
    }

    #[test]
    fn task_error_is_wrapped() {
        let done = spawn("t", update(), |_| Err::<(), _>("nope")).unwrap();
        let err = settle(done.recv()).unwrap_err();
        assert!(matches!(err, Error::Task(_)));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn panics_are_caught() {
        let done = spawn("t", update(), |_| -> Result<(), BoxError> { panic!("kaboom") }).unwrap();
        match settle(done.recv()) {
            Err(Error::Panicked(msg)) => assert_eq!(msg, "kaboom"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
