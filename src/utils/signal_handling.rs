use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

static CTRL_C_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Installs a handler for SIGINT/SIGTERM that merely records the signal. Long running
/// searches poll [`received_ctrl_c`] and unwind with their best solution so far.
pub fn initialize() {
    let result = ctrlc::set_handler(|| {
        info!("Received termination signal");
        CTRL_C_RECEIVED.store(true, Ordering::SeqCst);
    });

    if let Err(e) = result {
        warn!("Cannot install signal handler: {e}");
    }
}

pub fn received_ctrl_c() -> bool {
    CTRL_C_RECEIVED.load(Ordering::Relaxed)
}
