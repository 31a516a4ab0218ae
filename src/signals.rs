//! Interrupt handling for pipesh
//!
//! Ctrl-C is delivered to the whole foreground process group. Children
//! keep the default disposition and die; the shell itself only records
//! that an interrupt happened and keeps going.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the handler, cleared by [`take_interrupt`]
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install a SIGINT handler so an interrupt never ends the shell.
///
/// The handler is installed once per process; later calls are no-ops.
pub fn install_interrupt_guard() -> Result<(), ctrlc::Error> {
    match ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
        Ok(()) | Err(ctrlc::Error::MultipleHandlers) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Whether an interrupt arrived since the last call
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
