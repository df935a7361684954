use libdleq::DleqError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid configuration file: {0}")]
    InvalidConfig(#[from] serde_yml::Error),
    #[error("{0}")]
    Dleq(#[from] DleqError),
    #[error("Could not start the worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
