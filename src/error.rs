use crate::domain::project::ProjectStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscrowError>;

/// Errors surfaced by the escrow engine and its surrounding layers.
///
/// Every engine operation either fully commits or fails with one of these
/// kinds; no partial state is ever persisted.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// The caller fails the access-policy check for the attempted action.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The operation has no transition out of the project's current status.
    #[error("invalid state for project {project}: status is {status:?}")]
    InvalidState { project: u64, status: ProjectStatus },
    /// Malformed input rejected before it reaches the state machine.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("project {0} not found")]
    NotFound(u64),
    /// The transfer gateway could not move funds. Any status change staged
    /// in the same operation is rolled back before this is returned.
    #[error("transfer failed for project {project}: {reason}")]
    TransferFailed { project: u64, reason: String },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EscrowError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

