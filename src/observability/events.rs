//! Observable events of the student directory
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Service startup begins
    ServiceStartupBegin,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Listener bound, ready for requests
    Serving,
    /// Shutdown signal received
    ShutdownStart,
    /// Server drained
    ShutdownComplete,

    // Store
    /// Mutation log replayed on open
    StoreReplayComplete,
    /// Mutation log failed verification on open (FATAL)
    StoreCorruption,
    /// A store operation failed
    StoreFailure,

    // Student writes
    StudentCreated,
    StudentUpdated,
    StudentDeleted,
    StudentsCleared,

    // Rejections
    /// Write refused because the email is owned by another student
    DuplicateEmailRejected,
    /// Write refused because a field failed validation
    InvalidInputRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServiceStartupBegin => "SERVICE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "SERVICE_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::StoreReplayComplete => "STORE_REPLAY_COMPLETE",
            Event::StoreCorruption => "STORE_CORRUPTION",
            Event::StoreFailure => "STORE_FAILURE",

            Event::StudentCreated => "STUDENT_CREATED",
            Event::StudentUpdated => "STUDENT_UPDATED",
            Event::StudentDeleted => "STUDENT_DELETED",
            Event::StudentsCleared => "STUDENTS_CLEARED",

            Event::DuplicateEmailRejected => "DUPLICATE_EMAIL_REJECTED",
            Event::InvalidInputRejected => "INVALID_INPUT_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::ServiceStartupBegin,
            Event::ConfigLoaded,
            Event::Serving,
            Event::ShutdownStart,
            Event::ShutdownComplete,
            Event::StoreReplayComplete,
            Event::StoreCorruption,
            Event::StoreFailure,
            Event::StudentCreated,
            Event::StudentUpdated,
            Event::StudentDeleted,
            Event::StudentsCleared,
            Event::DuplicateEmailRejected,
            Event::InvalidInputRejected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(Event::StoreCorruption.is_fatal());
        assert!(!Event::StoreFailure.is_fatal());
        assert!(!Event::DuplicateEmailRejected.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::Serving), "SERVICE_SERVING");
        assert_eq!(format!("{}", Event::StudentsCleared), "STUDENTS_CLEARED");
    }
}
