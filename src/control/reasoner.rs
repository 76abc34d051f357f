//! The reasoner control loop.
//!
//! # Cycle
//!
//! Each tick:
//! 1. Polls every input source once, in registration order, unless a walk is
//!    owed. Closed sources are dropped after the full poll.
//! 2. If running (or walking) and not paused, advances the clock and the
//!    system timer by one and runs one engine cycle.
//! 3. Turns a faulting cycle into an `Err` broadcast instead of stopping.
//!
//! # Execution paths
//!
//! Cycles run either on the background worker ([`Reasoner::start`]) or inline
//! on the caller's thread ([`Reasoner::run`], [`Reasoner::walk_immediate`],
//! [`Reasoner::tick`]). Callers must [`Reasoner::stop`] the worker before
//! driving cycles inline.

use super::config::{validate_silence, ReasonerConfig};
use super::engine::{CycleFault, InferenceEngine};
use super::error::{ReasonerError, ReasonerResult};
use super::worker::Worker;
use crate::io::{ChannelRegistry, InputChannel, OutputCategory, OutputChannel, Outputs};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Payload of the notification broadcast on every reset
pub const RESET_MESSAGE: &str = "reset";

/// Externally visible run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug)]
struct SchedulerState {
    running: bool,
    paused: bool,
    walking_steps: u64,
    finished_inputs: bool,
    clock: u64,
    timer: u64, // Cycles since the timer was last reset
    min_tick_period: Duration,
    debug: bool,
}

impl SchedulerState {
    fn runnable(&self) -> bool {
        (self.running || self.walking_steps > 0) && !self.paused
    }
}

pub(crate) struct Shared<E> {
    name: String,
    config: ReasonerConfig,
    state: Mutex<SchedulerState>,
    engine: Mutex<E>,
    inputs: ChannelRegistry<dyn InputChannel>,
    pub(crate) outputs: Outputs,
    silence: Arc<AtomicU32>,
    worker: Mutex<Option<Worker>>,
}

impl<E: InferenceEngine> Shared<E> {
    pub(crate) fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub(crate) fn min_tick_period(&self) -> Duration {
        self.state.lock().min_tick_period
    }

    /// One scheduling opportunity; returns whether an engine cycle ran
    pub(crate) fn tick(&self) -> ReasonerResult<bool> {
        let walking = {
            let state = self.state.lock();
            if state.debug && (state.running || state.walking_steps > 0 || !state.finished_inputs) {
                debug!(
                    reasoner = %self.name,
                    walking_steps = state.walking_steps,
                    clock = state.clock,
                    timer = state.timer,
                    "tick"
                );
            }
            state.walking_steps
        };

        if walking == 0 {
            self.poll_inputs();
        }

        let clock = {
            let mut state = self.state.lock();
            if !state.runnable() {
                return Ok(false);
            }
            state.clock += 1;
            state.timer += 1;
            state.clock
        };

        let fault = self.run_cycle(clock).err();

        {
            let mut state = self.state.lock();
            if state.walking_steps > 0 {
                state.walking_steps -= 1;
            }
        }

        if let Some(fault) = fault {
            warn!(reasoner = %self.name, clock, error = %fault, "inference cycle failed");
            self.outputs.output(OutputCategory::Err, &fault.to_string())?;
        }
        Ok(true)
    }

    fn poll_inputs(&self) {
        let channels = self.inputs.snapshot();
        let mut produced = false;
        let mut closed = Vec::new();

        for (position, input) in channels.iter().enumerate() {
            if input.is_closed() {
                closed.push(Arc::clone(input));
            } else if input.poll_next() {
                produced = true;
            }
            trace!(reasoner = %self.name, position, produced, "input polled");
        }

        self.state.lock().finished_inputs = !produced;

        let removed = self.inputs.remove_all(&closed);
        if removed > 0 {
            debug!(reasoner = %self.name, removed, "closed input channels removed");
        }
    }

    fn run_cycle(&self, clock: u64) -> Result<(), CycleFault> {
        let mut engine = self.engine.lock();
        match panic::catch_unwind(AssertUnwindSafe(|| engine.work_cycle(clock, &self.outputs))) {
            Ok(result) => result,
            Err(payload) => Err(CycleFault::from_panic(clock, payload.as_ref())),
        }
    }
}

/// A cognitive-cycle reasoner driving an inference engine.
///
/// Cloning yields another handle to the same reasoner.
///
/// # Example
///
/// ```rust,ignore
/// let reasoner = Reasoner::new(engine, ReasonerConfig::default())?;
/// reasoner.add_output_channel(Arc::new(TracingSink::new("nar", reasoner.silence_handle())));
/// reasoner.run(100, false)?;
/// assert_eq!(reasoner.time(), 100);
/// ```
pub struct Reasoner<E: InferenceEngine> {
    shared: Arc<Shared<E>>,
}

impl<E: InferenceEngine> Clone for Reasoner<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: InferenceEngine> Reasoner<E> {
    /// Creates a stopped reasoner around `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError::InvalidConfig`] if the configuration is out of bounds.
    pub fn new(engine: E, config: ReasonerConfig) -> ReasonerResult<Self> {
        config.validate()?;
        let state = SchedulerState {
            running: false,
            paused: false,
            walking_steps: 0,
            finished_inputs: false,
            clock: 0,
            timer: 0,
            min_tick_period: config.min_tick_period(),
            debug: config.debug,
        };
        let shared = Shared {
            name: config.name.clone(),
            silence: Arc::new(AtomicU32::new(config.silence_level)),
            config,
            state: Mutex::new(state),
            engine: Mutex::new(engine),
            inputs: ChannelRegistry::new(),
            outputs: Outputs::new(),
            worker: Mutex::new(None),
        };
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    // =========================================================================
    // RUN MODE
    // =========================================================================

    /// Runs cycles continuously on a background worker.
    ///
    /// Calling this while a worker is alive only updates the tick period.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError::WorkerSpawn`] if the worker thread cannot be created.
    pub fn start(&self, min_tick_period: Duration) -> ReasonerResult<()> {
        let mut slot = self.shared.worker.lock();
        {
            let mut state = self.shared.state.lock();
            state.min_tick_period = min_tick_period;
            state.running = true;
            state.paused = false;
        }

        if slot.as_ref().map_or(false, |w| !w.is_finished()) {
            return Ok(());
        }
        if let Some(finished) = slot.take() {
            finished.cancel();
        }

        match Worker::spawn(Arc::downgrade(&self.shared), &self.shared.name) {
            Ok(worker) => {
                *slot = Some(worker);
                info!(
                    reasoner = %self.shared.name,
                    min_tick_period_ms = u64::try_from(min_tick_period.as_millis()).unwrap_or(u64::MAX),
                    "reasoner started"
                );
                Ok(())
            }
            Err(e) => {
                self.shared.state.lock().running = false;
                Err(ReasonerError::WorkerSpawn(e))
            }
        }
    }

    /// Stops the worker, waiting for it to finish its current cycle.
    pub fn stop(&self) {
        let worker = self.shared.worker.lock().take();
        self.shared.state.lock().running = false;
        if let Some(worker) = worker {
            worker.cancel();
            info!(reasoner = %self.shared.name, "reasoner stopped");
        }
    }

    pub fn pause(&self) {
        self.shared.state.lock().paused = true;
    }

    pub fn resume(&self) {
        self.shared.state.lock().paused = false;
    }

    /// Owes `steps` forced cycles to the next scheduling opportunities
    pub fn walk(&self, steps: u64) {
        let mut state = self.shared.state.lock();
        if state.debug {
            debug!(
                reasoner = %self.shared.name,
                "thinking {} {}",
                steps,
                if steps > 1 { "cycles" } else { "cycle" }
            );
        }
        state.walking_steps = steps;
    }

    /// Stops the worker, runs one cycle inline, then owes `steps` more.
    ///
    /// The reasoner is left stopped.
    pub fn walk_immediate(&self, steps: u64) -> ReasonerResult<()> {
        self.stop();
        {
            let mut state = self.shared.state.lock();
            state.paused = false;
            state.running = true;
        }
        let ticked = self.shared.tick();
        self.walk(steps);
        self.shared.state.lock().running = false;
        ticked.map(|_| ())
    }

    /// Runs `min_cycles` cycles back-to-back on the caller's thread, then any
    /// owed walk cycles, and leaves the reasoner paused.
    pub fn run(&self, min_cycles: u64, debug: bool) -> ReasonerResult<()> {
        {
            let mut state = self.shared.state.lock();
            state.debug = debug;
            state.running = true;
            state.paused = false;
        }
        let result = self.run_cycles(min_cycles);
        {
            let mut state = self.shared.state.lock();
            state.running = false;
            state.paused = true;
        }
        result
    }

    fn run_cycles(&self, min_cycles: u64) -> ReasonerResult<()> {
        for _ in 0..min_cycles {
            self.shared.tick()?;
        }
        while self.walk_remaining() > 0 {
            // A sink may pause the reasoner mid-drain
            if !self.shared.tick()? {
                break;
            }
        }
        Ok(())
    }

    /// One scheduling opportunity on the caller's thread.
    ///
    /// Returns whether an inference cycle ran.
    pub fn tick(&self) -> ReasonerResult<bool> {
        self.shared.tick()
    }

    /// Zeroes the clock and owed walk, re-initializes the engine and broadcasts a reset notice
    pub fn reset(&self) -> ReasonerResult<()> {
        {
            let mut state = self.shared.state.lock();
            state.walking_steps = 0;
            state.clock = 0;
        }
        self.shared.engine.lock().init();
        self.output(OutputCategory::Out, RESET_MESSAGE)
    }

    // =========================================================================
    // CHANNELS
    // =========================================================================

    pub fn add_input_channel(&self, channel: Arc<dyn InputChannel>) {
        self.shared.inputs.add(channel);
    }

    pub fn remove_input_channel(&self, channel: &Arc<dyn InputChannel>) -> bool {
        self.shared.inputs.remove(channel)
    }

    pub fn add_output_channel(&self, channel: Arc<dyn OutputChannel>) {
        self.shared.outputs.add(channel);
    }

    pub fn remove_output_channel(&self, channel: &Arc<dyn OutputChannel>) -> bool {
        self.shared.outputs.remove(channel)
    }

    pub fn input_channel_count(&self) -> usize {
        self.shared.inputs.len()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.shared.outputs
    }

    /// Broadcasts an event to every output sink in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError::Sink`] from the first sink that refuses the event.
    pub fn output(&self, category: OutputCategory, payload: &str) -> ReasonerResult<()> {
        self.shared.outputs.output(category, payload)?;
        Ok(())
    }

    // =========================================================================
    // TIMER
    // =========================================================================

    /// Cycles since the timer was last reset
    pub fn system_clock(&self) -> u64 {
        self.shared.state.lock().timer
    }

    /// Returns the timer value and resets it
    pub fn update_timer(&self) -> u64 {
        let mut state = self.shared.state.lock();
        std::mem::take(&mut state.timer)
    }

    pub fn init_timer(&self) {
        self.shared.state.lock().timer = 0;
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Current logical clock
    pub fn time(&self) -> u64 {
        self.shared.state.lock().clock
    }

    pub fn mode(&self) -> RunMode {
        let state = self.shared.state.lock();
        if state.paused {
            RunMode::Paused
        } else if state.running {
            RunMode::Running
        } else {
            RunMode::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    pub fn walk_remaining(&self) -> u64 {
        self.shared.state.lock().walking_steps
    }

    /// Whether the last input poll found no work
    pub fn is_finished_inputs(&self) -> bool {
        self.shared.state.lock().finished_inputs
    }

    pub fn min_tick_period(&self) -> Duration {
        self.shared.min_tick_period()
    }

    pub fn is_debug(&self) -> bool {
        self.shared.state.lock().debug
    }

    pub fn set_debug(&self, debug: bool) {
        self.shared.state.lock().debug = debug;
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.shared.config
    }

    pub fn silence_level(&self) -> u32 {
        self.shared.silence.load(Ordering::Relaxed)
    }

    /// # Errors
    ///
    /// Returns [`ReasonerError::InvalidConfig`] above the silent level.
    pub fn set_silence_level(&self, level: u32) -> ReasonerResult<()> {
        validate_silence(level)?;
        self.shared.silence.store(level, Ordering::Relaxed);
        Ok(())
    }

    /// Shared silence level, for sinks that mute themselves
    pub fn silence_handle(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.shared.silence)
    }

    /// Runs `f` with exclusive access to the engine
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        let mut engine = self.shared.engine.lock();
        f(&mut *engine)
    }
}
