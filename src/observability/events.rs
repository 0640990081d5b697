//! Observable events
//!
//! Events are explicit and typed; the string form is the `event` field of
//! each log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Server startup begins
    ServerStart,
    /// Listener bound, ready to serve
    ServerListening,
    /// Server failed to start or stopped with an error
    ServerFailed,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Seed data imported into the document store
    SeedImported,

    // Requests
    /// One HTTP request handled
    HttpRequest,
    /// Request ended in a server-side error
    HttpError,
    /// Query parameters translated into a query plan
    QueryTranslated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServerStart => "SERVER_START",
            Event::ServerListening => "SERVER_LISTENING",
            Event::ServerFailed => "SERVER_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SeedImported => "SEED_IMPORTED",
            Event::HttpRequest => "HTTP_REQUEST",
            Event::HttpError => "HTTP_ERROR",
            Event::QueryTranslated => "QUERY_TRANSLATED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ServerFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
