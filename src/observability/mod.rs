//! Observability
//!
//! Structured JSON logging with typed lifecycle events.
//!
//! ```ignore
//! use devcamp::observability::{Event, Logger};
//!
//! Logger::info("HTTP_REQUEST", &[("method", "GET"), ("status", "200")]);
//! log_event_with_fields(Event::SeedImported, &[("documents", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    if event.is_fatal() {
        Logger::fatal(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
