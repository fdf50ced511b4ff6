//! Logging helpers shared by every crate.
//!
//! Plain levels go through `tracing` directly. `success!` marks a positive
//! milestone and is rendered with its own symbol by the CLI formatter.

/// Target used by [`success!`] so formatters can tell milestones apart.
pub const SUCCESS_TARGET: &str = "assetronics::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)+)
    };
}
