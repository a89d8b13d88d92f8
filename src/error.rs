use thiserror::Error;

use crate::config::ConfigError;

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over canonical capability errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A worker thread panicked; the run's output is not trustworthy.
    #[error("worker thread {name} panicked")]
    WorkerPanicked { name: String },
}
