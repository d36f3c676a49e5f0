use thiserror::Error;

/// Errors raised synchronously when a named port is not part of the
/// exposed port set. Everything else the wire can do wrong (malformed
/// bracket nesting, a window that never completes) is not detected here;
/// it shows up as a future that never resolves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error("No such inport: {0}")]
    UnknownInport(String),

    #[error("No such outport: {0}")]
    UnknownOutport(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
