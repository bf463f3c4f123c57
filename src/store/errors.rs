//! Record store error types
//!
//! Error codes:
//! - STUDENT_STORE_IO_ERROR (ERROR severity)
//! - STUDENT_STORE_WRITE_FAILED (ERROR severity)
//! - STUDENT_STORE_READ_FAILED (ERROR severity)
//! - STUDENT_STORE_DATA_CORRUPTION (FATAL severity)
//! - STUDENT_STORE_UNIQUE_VIOLATION (ERROR severity)
//! - STUDENT_STORE_LOCK_POISONED (FATAL severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The store can no longer be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Disk I/O failure
    IoError,
    /// Log append or fsync failed
    WriteFailed,
    /// Log read failed
    ReadFailed,
    /// Checksum or framing failure in the log
    DataCorruption,
    /// A unique column already holds the value
    UniqueViolation,
    /// A writer panicked while holding the table lock
    LockPoisoned,
    /// A failed append could not be rolled back; the log refuses writes
    LogPoisoned,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::IoError => "STUDENT_STORE_IO_ERROR",
            StoreErrorCode::WriteFailed => "STUDENT_STORE_WRITE_FAILED",
            StoreErrorCode::ReadFailed => "STUDENT_STORE_READ_FAILED",
            StoreErrorCode::DataCorruption => "STUDENT_STORE_DATA_CORRUPTION",
            StoreErrorCode::UniqueViolation => "STUDENT_STORE_UNIQUE_VIOLATION",
            StoreErrorCode::LockPoisoned => "STUDENT_STORE_LOCK_POISONED",
            StoreErrorCode::LogPoisoned => "STUDENT_STORE_LOG_POISONED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::DataCorruption
            | StoreErrorCode::LockPoisoned
            | StoreErrorCode::LogPoisoned => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with code, message and optional context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new store I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::IoError, message)
        }
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::WriteFailed, message)
        }
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::ReadFailed, message)
        }
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::new(StoreErrorCode::DataCorruption, reason)
        }
    }

    /// Create a unique constraint violation for a column value
    pub fn unique_violation(column: &str, value: &str) -> Self {
        Self {
            details: Some(format!("{}: {}", column, value)),
            ..Self::new(
                StoreErrorCode::UniqueViolation,
                format!("duplicate value for unique column '{}'", column),
            )
        }
    }

    /// Create a lock poisoned error
    pub fn lock_poisoned() -> Self {
        Self::new(StoreErrorCode::LockPoisoned, "Lock poisoned")
    }

    /// Create an error for a log whose tail could not be restored
    pub fn log_poisoned(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("path: {}", path.display())),
            ..Self::new(StoreErrorCode::LogPoisoned, reason)
        }
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        self.code == StoreErrorCode::UniqueViolation
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreErrorCode::IoError.code(), "STUDENT_STORE_IO_ERROR");
        assert_eq!(StoreErrorCode::DataCorruption.code(), "STUDENT_STORE_DATA_CORRUPTION");
        assert_eq!(StoreErrorCode::UniqueViolation.code(), "STUDENT_STORE_UNIQUE_VIOLATION");
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = StoreError::corruption_at_offset(12, "checksum mismatch");
        assert!(err.is_fatal());

        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("checksum mismatch"));
        assert!(display.contains("byte_offset: 12"));
    }

    #[test]
    fn test_unique_violation_not_fatal() {
        let err = StoreError::unique_violation("email", "ana@x.com");
        assert!(err.is_unique_violation());
        assert!(!err.is_fatal());
        assert_eq!(err.details(), Some("email: ana@x.com"));
    }

    #[test]
    fn test_write_failed_keeps_source() {
        use std::error::Error;

        let err = StoreError::write_failed("disk full", io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.source().is_some());
        assert_eq!(err.code(), StoreErrorCode::WriteFailed);
    }

    #[test]
    fn test_log_poisoned_is_fatal() {
        let err = StoreError::log_poisoned(Path::new("/var/data/students.log"), "rollback after failed fsync did not complete");
        assert_eq!(err.code(), StoreErrorCode::LogPoisoned);
        assert!(err.is_fatal());
        assert!(err.message().contains("rollback"));
        assert_eq!(err.details(), Some("path: /var/data/students.log"));
    }
}
