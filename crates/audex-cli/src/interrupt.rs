//! Ctrl-C turns into a cooperative cancel of the running export.

use std::thread;

use tracing::{debug, warn};

use audex_model::CancelFlag;

pub const INTERRUPT_REASON: &str = "interrupted by Ctrl-C";

/// Set `flag` on the first Ctrl-C. The watcher thread lives until the process
/// exits; the pipeline notices the flag at its next checkpoint.
pub fn cancel_on_interrupt(flag: &CancelFlag) {
    let flag = flag.clone();
    let spawned = thread::Builder::new()
        .name("audex-interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(error) => {
                    warn!(%error, "Ctrl-C handler unavailable");
                    return;
                }
            };
            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => {
                    debug!("Ctrl-C received, cancelling export");
                    flag.cancel_with_reason(INTERRUPT_REASON);
                }
                Err(error) => warn!(%error, "Ctrl-C handler failed"),
            }
        });
    if let Err(error) = spawned {
        warn!(%error, "could not start Ctrl-C watcher");
    }
}
