//! Cooperative cancellation across worker threads.
//!
//! An [`InterruptGuard`] installs a SIGINT handler that flips a process-wide
//! flag; long-running loops call [`InterruptGuard::checkpoint`] at safe
//! points (start of each tree, start of each node) and unwind with
//! [`CoreError::Interrupted`] once the flag is observed. Installation is
//! first-guard-wins: nested or concurrent guards are no-ops beyond the
//! first, so the handler is registered and removed exactly once however many
//! workers are in flight.
//!
//! The flag is read with relaxed ordering from hot loops; a check may be
//! stale by one scheduling quantum, which only delays cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use signal_hook::consts::SIGINT;
use signal_hook::SigId;

use crate::error::CoreError;

fn interrupt_flag() -> &'static Arc<AtomicBool> {
    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    FLAG.get_or_init(|| Arc::new(AtomicBool::new(false)))
}

static HANDLER: Mutex<Option<SigId>> = Mutex::new(None);

/// Whether an interrupt has been requested since the active guard was
/// installed.
pub fn is_interrupted() -> bool {
    interrupt_flag().load(Ordering::Relaxed)
}

/// Clear a pending interrupt request.
pub fn reset_interrupt() {
    interrupt_flag().store(false, Ordering::SeqCst);
}

/// Scoped owner of the process-wide SIGINT registration.
///
/// The first live guard installs the handler and clears any stale flag;
/// dropping it (or calling [`release`](Self::release)) removes the handler
/// again. Guards constructed while another is live are inert.
#[derive(Debug)]
pub struct InterruptGuard {
    active: bool,
}

impl InterruptGuard {
    pub fn new() -> Self {
        let mut slot = HANDLER.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            interrupt_flag().store(false, Ordering::SeqCst);
            match signal_hook::flag::register(SIGINT, Arc::clone(interrupt_flag())) {
                Ok(id) => {
                    *slot = Some(id);
                    return Self { active: true };
                }
                Err(err) => {
                    log::warn!("could not install interrupt handler: {err}");
                }
            }
        }
        Self { active: false }
    }

    /// Remove the handler registration ahead of drop. Idempotent; no-op for
    /// inert guards.
    pub fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut slot = HANDLER.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = slot.take() {
            signal_hook::low_level::unregister(id);
        }
    }

    /// Observe the interrupt flag at a safe point.
    ///
    /// When set, removes the handler, clears the flag, and returns
    /// [`CoreError::Interrupted`] so in-flight construction unwinds.
    pub fn checkpoint(&mut self) -> Result<(), CoreError> {
        if is_interrupted() {
            self.release();
            reset_interrupt();
            log::error!("procedure was interrupted");
            return Err(CoreError::Interrupted);
        }
        Ok(())
    }
}

impl Default for InterruptGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if self.active {
            reset_interrupt();
        }
        self.release();
    }
}
