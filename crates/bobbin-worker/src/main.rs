//! Pass-through service worker.
//!
//! Serves the configured component by echoing each request's transport back
//! unchanged. Real services link `bobbin-worker` as a library and pass their
//! own callback to [`bobbin_worker::run_service`].

use std::process::ExitCode;

use bobbin_worker::{Action, CallbackError, run_service};

fn main() -> ExitCode {
    run_service(|action: &mut Action| -> Result<(), CallbackError> {
        action.log(&format!("passing {} through", action.name()));
        Ok(())
    })
}
