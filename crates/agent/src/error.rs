use thiserror::Error;

/// Errors that can occur while configuring or running the agent.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The status server could not bind its port.
    #[error("failed to bind status server: {0}")]
    Bind(std::io::Error),

    /// Monitor error.
    #[error(transparent)]
    Monitor(#[from] kage_monitor::Error),

    /// Reporter error.
    #[error(transparent)]
    Reporter(#[from] kage_reporter::Error),
}
