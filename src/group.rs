//! Several animations redrawn together as one block.
//!
//! Slots are registered in order with [`Group::add`] and started with
//! [`SlotBuilder::run`] or [`SlotBuilder::progress`]. [`Group::wait`] then
//! owns the terminal: every tick it polls each slot's completion signal,
//! moves back over the previous block and redraws all slots top to bottom.
//!
//! ```rust,ignore
//! let mut group = Group::new(&logger);
//! let a = group.add(Animation::spinner("Fetching index")).run(fetch_index);
//! let b = group
//!     .add(Animation::bar("Downloading", 0).percent("pct"))
//!     .progress(|update| download(update));
//! let result = group.wait();
//! result.log_each();
//! result.err().map_or(Ok(()), Err)?;
//! ```

use std::time::{Duration, Instant};

use crossbeam_channel::{Select, TryRecvError, select, tick};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::animation::Animation;
use crate::cancel::CancelToken;
use crate::error::{BoxError, Error};
use crate::field::Field;
use crate::live::{LiveState, Update};
use crate::logger::Logger;
use crate::render::FrameRenderer;
use crate::snapshot::Snapshot;
use crate::style::Level;
use crate::task::{self, Done};
use crate::writer::Terminal;

/// Identifies a slot within its group and its [`GroupResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle(usize);

/// Runs several tasks concurrently, each with its own animated line.
///
/// All slots share one cancel token. A slot's own
/// [`Animation::cancel_on`] token is ignored.
///
/// [`Animation::delay`] is honored per slot: the slot stays out of the block
/// until its delay has passed, and never appears if it finishes sooner.
/// Non-interactive output prints every slot's line regardless.
pub struct Group {
    logger: Logger,
    token: CancelToken,
    slots: IndexMap<SlotHandle, Slot>,
}

struct Slot {
    animation: Animation,
    running: Option<Running>,
}

struct Running {
    live: LiveState,
    done: Done<()>,
    started: Instant,
}

/// A registered slot waiting for its task.
#[must_use = "a slot does nothing until its task is started"]
pub struct SlotBuilder<'g> {
    group: &'g mut Group,
    handle: SlotHandle,
}

impl Group {
    pub fn new(logger: &Logger) -> Self {
        Self::with_token(logger, CancelToken::new())
    }

    pub fn with_token(logger: &Logger, token: CancelToken) -> Self {
        Self {
            logger: logger.clone(),
            token,
            slots: IndexMap::new(),
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Registers a slot. Its position in the block is its registration order.
    pub fn add(&mut self, animation: Animation) -> SlotBuilder<'_> {
        let handle = SlotHandle(self.slots.len());
        self.slots.insert(
            handle,
            Slot {
                animation,
                running: None,
            },
        );
        SlotBuilder {
            group: self,
            handle,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The shared redraw interval: the fastest registered slot sets the pace.
    pub fn tick_rate(&self) -> Option<Duration> {
        self.slots.values().map(|slot| slot.animation.tick_rate()).min()
    }

    /// Draws every slot until all are done or the token is cancelled.
    ///
    /// The block is erased before returning. Slots that were added but
    /// never started are dropped from the result.
    pub fn wait(self) -> GroupResult {
        let Group {
            logger,
            token,
            slots,
        } = self;

        let mut runs = Vec::with_capacity(slots.len());
        for (handle, slot) in slots {
            match slot.running {
                Some(running) => runs.push(SlotRun::new(&logger, handle, slot.animation, running)),
                None => warn!(slot = %slot.animation.message, "slot was never started, skipping"),
            }
        }

        let interactive = runs.first().is_some_and(|run| run.snap.interactive);
        debug!(slots = runs.len(), interactive, "group started");
        let started = Instant::now();

        if interactive {
            animate(&logger, &token, &mut runs);
        } else {
            wait_static(&logger, &token, &mut runs);
        }

        debug!(elapsed = ?started.elapsed(), cancelled = token.is_cancelled(), "group finished");
        let outcomes = runs
            .into_iter()
            .map(|run| (run.handle, run.into_outcome()))
            .collect();
        GroupResult { logger, outcomes }
    }
}

impl SlotBuilder<'_> {
    /// Starts a task that does not report progress.
    pub fn run<E, F>(self, task: F) -> SlotHandle
    where
        E: Into<BoxError>,
        F: FnOnce() -> Result<(), E> + Send + 'static,
    {
        self.progress(move |_| task())
    }

    /// Starts a task that publishes live changes through [`Update`].
    pub fn progress<E, F>(self, task: F) -> SlotHandle
    where
        E: Into<BoxError>,
        F: FnOnce(Update) -> Result<(), E> + Send + 'static,
    {
        let SlotBuilder { group, handle } = self;
        let token = group.token.clone();
        let Some(slot) = group.slots.get_mut(&handle) else {
            return handle;
        };

        let animation = &slot.animation;
        let (current, total) = animation.initial_progress();
        let (live, update) = LiveState::new(&animation.message, animation.fields.clone(), current, total, token);
        let name = format!("tally-spin-slot-{}", handle.0);
        let done = task::spawn(&name, update, task).unwrap_or_else(|err| {
            // Surface the spawn failure as the slot's own result.
            let (tx, rx) = crossbeam_channel::bounded(1);
            let _ = tx.send(Err(err));
            rx
        });

        slot.running = Some(Running {
            live,
            done,
            started: Instant::now(),
        });
        handle
    }
}

enum State {
    Active,
    Done { result: Result<(), Error>, elapsed: Duration },
}

/// One slot's runtime state inside [`Group::wait`].
struct SlotRun {
    handle: SlotHandle,
    level: Level,
    tick: Duration,
    delay: Option<Duration>,
    snap: Snapshot,
    renderer: FrameRenderer,
    live: LiveState,
    done: Done<()>,
    started: Instant,
    state: State,
}

impl SlotRun {
    fn new(logger: &Logger, handle: SlotHandle, animation: Animation, running: Running) -> Self {
        let Running { live, done, started } = running;
        Self {
            handle,
            level: animation.level,
            tick: animation.tick_rate(),
            delay: animation.delay,
            snap: Snapshot::capture(logger, &animation),
            renderer: FrameRenderer::new(&animation),
            live,
            done,
            started,
            state: State::Active,
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.state, State::Active)
    }

    fn finish(&mut self, result: Result<(), Error>) {
        self.live.drain();
        self.state = State::Done {
            result,
            elapsed: self.started.elapsed(),
        };
    }

    /// Checks the completion signal without blocking.
    fn poll(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.done.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.finish(task::settle(Err(crossbeam_channel::RecvError)))
            }
        }
        true
    }

    /// Inside its delay a slot takes no row in the block.
    fn hidden(&self) -> bool {
        let Some(delay) = self.delay else {
            return false;
        };
        match &self.state {
            State::Active => self.started.elapsed() < delay,
            State::Done { elapsed, .. } => *elapsed < delay,
        }
    }

    fn line(&mut self) -> Option<String> {
        if self.hidden() {
            return None;
        }
        let line = match &self.state {
            State::Active => {
                self.live.drain();
                self.renderer.frame(&self.snap, &self.live, self.started.elapsed())
            }
            State::Done { result, elapsed } => {
                self.renderer
                    .done_line(&self.snap, &self.live, *elapsed, result.is_err())
            }
        };
        Some(line)
    }

    fn into_outcome(self) -> SlotOutcome {
        let (result, elapsed) = match self.state {
            State::Done { result, elapsed } => (result, elapsed),
            State::Active => (Err(Error::Cancelled), self.started.elapsed()),
        };
        SlotOutcome {
            message: self.live.message.to_string(),
            fields: self.live.fields.to_vec(),
            level: self.level,
            result,
            elapsed,
        }
    }
}

fn active_rate(runs: &[SlotRun]) -> Option<Duration> {
    runs.iter().filter(|run| run.is_active()).map(|run| run.tick).min()
}

fn animate(logger: &Logger, token: &CancelToken, runs: &mut [SlotRun]) {
    let mut term = Terminal::new(logger.output().clone());
    term.hide_cursor();

    let Some(mut rate) = active_rate(runs) else {
        return;
    };
    let mut ticker = tick(rate);
    loop {
        let mut finished = false;
        for run in runs.iter_mut() {
            finished |= run.poll();
        }

        let Some(next) = active_rate(runs) else {
            break;
        };
        let lines: Vec<String> = runs.iter_mut().filter_map(SlotRun::line).collect();
        term.draw_block(&lines);

        if finished && next != rate {
            debug!(from = ?rate, to = ?next, "group cadence changed");
            rate = next;
            ticker = tick(rate);
        }

        select! {
            recv(ticker) -> _ => {}
            recv(token.signal()) -> _ => {
                debug!("group cancelled");
                break;
            }
        }
    }
    // Slots that finished since the last tick keep their real result.
    for run in runs.iter_mut() {
        run.poll();
    }
    term.erase_block();
}

/// Prints each slot's initial line once, then blocks on every slot.
fn wait_static(logger: &Logger, token: &CancelToken, runs: &mut [SlotRun]) {
    debug!("output is not interactive, printing static lines");
    let mut text = String::new();
    for run in runs.iter_mut() {
        text.push_str(&run.renderer.static_line(&run.snap, &run.live));
        text.push('\n');
    }
    logger.output().write_all(text.as_bytes());

    loop {
        let pending: Vec<usize> = (0..runs.len()).filter(|&i| runs[i].is_active()).collect();
        if pending.is_empty() {
            return;
        }
        let receivers: Vec<Done<()>> = pending.iter().map(|&i| runs[i].done.clone()).collect();

        let mut sel = Select::new();
        for done in &receivers {
            sel.recv(done);
        }
        let cancel = sel.recv(token.signal());
        let oper = sel.select();
        let index = oper.index();
        if index == cancel {
            let _ = oper.recv(token.signal());
            debug!("group cancelled");
            break;
        }
        let result = oper.recv(&receivers[index]);
        runs[pending[index]].finish(task::settle(result));
    }
    for run in runs.iter_mut() {
        run.poll();
    }
}

/// How one slot ended.
#[derive(Debug)]
pub struct SlotOutcome {
    /// The last published message.
    pub message: String,
    pub fields: Vec<Field>,
    pub level: Level,
    pub result: Result<(), Error>,
    pub elapsed: Duration,
}

impl SlotOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    fn log_level(&self) -> Level {
        match &self.result {
            Ok(()) => self.level,
            Err(err) if err.is_cancelled() => Level::Warn,
            Err(_) => Level::Error,
        }
    }
}

/// Outcomes of a finished [`Group::wait`], in slot order.
#[derive(Debug)]
pub struct GroupResult {
    logger: Logger,
    outcomes: IndexMap<SlotHandle, SlotOutcome>,
}

impl GroupResult {
    pub fn slot(&self, handle: SlotHandle) -> Option<&SlotOutcome> {
        self.outcomes.get(&handle)
    }

    pub fn results(&self) -> impl Iterator<Item = (SlotHandle, &SlotOutcome)> {
        self.outcomes.iter().map(|(handle, outcome)| (*handle, outcome))
    }

    pub fn is_ok(&self) -> bool {
        self.outcomes.values().all(SlotOutcome::is_ok)
    }

    /// Logs one aggregate entry: info when every slot succeeded, error otherwise.
    pub fn log(&self, message: &str) {
        let failed: Vec<String> = self
            .outcomes
            .values()
            .filter_map(|outcome| outcome.result.as_ref().err())
            .map(ToString::to_string)
            .collect();
        let mut fields = vec![Field::new("tasks", self.outcomes.len())];
        let level = if failed.is_empty() {
            Level::Info
        } else {
            fields.push(Field::new("failed", failed.len()));
            fields.push(Field::new("error", failed.join("; ")));
            Level::Error
        };
        self.logger.log(level, message, &fields);
    }

    /// Logs one entry per slot with its final message and fields.
    pub fn log_each(&self) {
        for outcome in self.outcomes.values() {
            let mut fields = outcome.fields.clone();
            if let Err(err) = &outcome.result {
                fields.push(Field::new("error", err));
            }
            self.logger.log(outcome.log_level(), &outcome.message, &fields);
        }
    }

    /// Every slot error joined into one, or `None` when all succeeded.
    pub fn err(self) -> Option<Error> {
        let errors = self
            .outcomes
            .into_values()
            .filter_map(|outcome| outcome.result.err())
            .collect();
        Error::join(errors)
    }
}
