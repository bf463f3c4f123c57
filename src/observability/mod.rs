//! Observability for the student directory
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle and write events
//! - Atomic counters
//!
//! Observability is read-only: it never changes the outcome of an operation
//! and never fails one.
//!
//! ```ignore
//! Logger::info("STUDENT_CREATED", &[("id", "1")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_students_created();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
