//! Error presentation seam.
//!
//! A failed request cycle must reach the user immediately.  What "reach the
//! user" means (a modal alert, a toast, a line on stderr) is not the bus's
//! business, so the scope is handed an [`ErrorPresenter`] at mount.

use tracing::error;

use super::router::RouteError;

/// Shows a failed request cycle to the user.
///
/// Called once per failure, from the pump task, while the dispatch registry
/// is locked.  Implementations must return promptly and must not touch the
/// bus.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorPresenter: Send + Sync {
    fn present(&self, error: &RouteError);
}

/// Reports failures through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl ErrorPresenter for TracingPresenter {
    fn present(&self, error: &RouteError) {
        error!("{error}");
    }
}
