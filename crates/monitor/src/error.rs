use thiserror::Error;

/// Errors that can occur in the cluster monitor.
#[derive(Debug, Error)]
pub enum Error {
    /// The monitor was already started.
    #[error("monitor already started")]
    AlreadyStarted,

    /// The monitor was closed and cannot be restarted.
    #[error("monitor is closed")]
    Closed,
}
