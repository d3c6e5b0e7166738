use thiserror::Error;

/// Errors that can occur while building reporters.
#[derive(Debug, Error)]
pub enum Error {
    /// No factory is registered under the requested name.
    #[error("unknown reporter \"{0}\"")]
    UnknownReporter(String),

    /// The InfluxDB DSN could not be used.
    #[error("invalid influx dsn: {0}")]
    InvalidDsn(String),

    /// An extra tag is not of the form `key=value`.
    #[error("invalid tag \"{0}\", expected key=value")]
    InvalidTag(String),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
