//! Background execution context for a started reasoner.
//!
//! The worker holds only a weak handle, so it winds down once every
//! `Reasoner` handle is gone. Cancellation is a flag checked at the top of
//! each cycle; `cancel` also unparks the thread so an inter-cycle sleep ends
//! early.

use super::engine::{panic_message, InferenceEngine};
use super::reasoner::Shared;
use crate::io::OutputCategory;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

pub(crate) struct Worker {
    handle: JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

impl Worker {
    pub(crate) fn spawn<E: InferenceEngine>(shared: Weak<Shared<E>>, name: &str) -> io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let reasoner = name.to_string();
        let handle = thread::Builder::new()
            .name(format!("{name}-inference"))
            .spawn(move || run_loop(shared, flag, reasoner))?;
        Ok(Self { handle, cancel })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Requests cancellation and waits for the current cycle to complete.
    ///
    /// Called from the worker thread itself, it only raises the flag.
    pub(crate) fn cancel(self) {
        self.cancel.store(true, Ordering::Release);
        self.handle.thread().unpark();
        if self.handle.thread().id() == thread::current().id() {
            return;
        }
        if self.handle.join().is_err() {
            warn!("inference worker exited by panic");
        }
    }
}

fn run_loop<E: InferenceEngine>(shared: Weak<Shared<E>>, cancel: Arc<AtomicBool>, reasoner: String) {
    info!(%reasoner, "inference worker starting");

    loop {
        if cancel.load(Ordering::Acquire) {
            break;
        }
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.is_running() {
            break;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| shared.tick())) {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(%reasoner, error = %e, "cycle output failed"),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(%reasoner, %message, "tick panicked outside the engine");
                if let Err(e) = shared.outputs.output(OutputCategory::Err, &message) {
                    warn!(%reasoner, error = %e, "fault notification failed");
                }
            }
        }

        let period = shared.min_tick_period();
        drop(shared);
        if period.is_zero() {
            thread::yield_now();
        } else {
            // Unpark from `cancel` or a spurious wake-up just ends the sleep early
            thread::park_timeout(period);
        }
    }

    info!(%reasoner, "inference worker shutting down");
}
