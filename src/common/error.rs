//! Error types.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in quilldb.
///
/// By having a single error type, error handling stays consistent across the
/// storage, container, and execution layers.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer pool has no free frames and cannot evict any pages.
    ///
    /// This happens when all frames are pinned.
    #[error("no free frames available in buffer pool")]
    NoFreeFrames,

    /// The disk scheduler's worker thread is gone.
    #[error("disk scheduler shut down")]
    SchedulerShutDown,

    /// Requested table does not exist in the catalog.
    #[error("table {0} not found")]
    TableNotFound(u32),

    /// Requested index does not exist in the catalog.
    #[error("index {0} not found")]
    IndexNotFound(u32),

    /// The requested operation is not supported.
    ///
    /// Fatal to the query that requested it, e.g. an executor built for a
    /// join type it does not implement.
    #[error("not supported: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoFreeFrames;
        assert_eq!(
            format!("{}", err),
            "no free frames available in buffer pool"
        );

        let err = Error::TableNotFound(7);
        assert_eq!(format!("{}", err), "table 7 not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert!(matches!(err, Error::Io(_)));
    }
}
