use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The fact channel needs room for at least one fact.
    #[error("channel capacity must be greater than zero")]
    ZeroCapacity,
}
