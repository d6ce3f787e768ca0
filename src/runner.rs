//! The single-task render loop.
//!
//! One worker runs the task; the calling thread owns the terminal and
//! waits on three things at once: the redraw ticker, the task's completion
//! signal and the cancel token.

use std::time::Instant;

use crossbeam_channel::{after, select, tick};
use tracing::debug;

use crate::animation::Animation;
use crate::cancel::CancelToken;
use crate::error::{BoxError, Error, Result};
use crate::live::{LiveState, Update};
use crate::logger::Logger;
use crate::render::FrameRenderer;
use crate::snapshot::Snapshot;
use crate::task::{self, settle};
use crate::writer::Terminal;

pub(crate) fn run<T, E, F>(animation: Animation, logger: &Logger, task: F) -> Result<T>
where
    T: Send + 'static,
    E: Into<BoxError>,
    F: FnOnce(Update) -> std::result::Result<T, E> + Send + 'static,
{
    let token = animation.token.clone().unwrap_or_default();
    let (current, total) = animation.initial_progress();
    let (mut live, update) = LiveState::new(
        &animation.message,
        animation.fields.clone(),
        current,
        total,
        token.clone(),
    );

    let started = Instant::now();
    let done = task::spawn(&format!("tally-spin-{}", animation.mode.name()), update, task)?;

    if let Some(delay) = animation.delay {
        select! {
            recv(done) -> result => {
                debug!(?delay, "task finished inside delay, nothing drawn");
                return settle(result);
            }
            recv(token.signal()) -> _ => {
                debug!("cancelled during delay");
                return finished_or_cancelled(&done);
            }
            recv(after(delay)) -> _ => {}
        }
    }

    let snap = Snapshot::capture(logger, &animation);
    let mut renderer = FrameRenderer::new(&animation);
    debug!(
        mode = animation.mode.name(),
        tick = ?snap.tick,
        interactive = snap.interactive,
        "animation started"
    );

    if !snap.interactive {
        return wait_static(&snap, &mut renderer, &live, &done, &token);
    }

    let mut term = Terminal::new(snap.output.clone());
    term.hide_cursor();
    let ticker = tick(snap.tick);

    live.drain();
    term.draw_line(&renderer.frame(&snap, &live, started.elapsed()));
    loop {
        select! {
            recv(ticker) -> _ => {
                live.drain();
                term.draw_line(&renderer.frame(&snap, &live, started.elapsed()));
            }
            recv(done) -> result => {
                term.erase_line();
                debug!(elapsed = ?started.elapsed(), "animation finished");
                return settle(result);
            }
            recv(token.signal()) -> _ => {
                term.erase_line();
                debug!(elapsed = ?started.elapsed(), "animation cancelled");
                return finished_or_cancelled(&done);
            }
        }
    }
}

/// Prints the line once without escapes, then blocks.
fn wait_static<T>(
    snap: &Snapshot, renderer: &mut FrameRenderer, live: &LiveState,
    done: &task::Done<T>, token: &CancelToken,
) -> Result<T> {
    debug!("output is not interactive, printing a static line");
    let mut line = renderer.static_line(snap, live);
    line.push('\n');
    snap.output.write_all(line.as_bytes());

    select! {
        recv(done) -> result => settle(result),
        recv(token.signal()) -> _ => finished_or_cancelled(done),
    }
}

/// A task that completed just as the token fired keeps its own result.
fn finished_or_cancelled<T>(done: &task::Done<T>) -> Result<T> {
    done.try_recv().unwrap_or(Err(Error::Cancelled))
}
