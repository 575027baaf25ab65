//! Log message constants
//!
//! Centralizes the messages emitted through `tracing` so wording stays
//! consistent across the service, loaders and binary. Variable parts are
//! attached as structured fields, never interpolated.

/// Application startup and lifecycle messages
pub mod application {
    pub const STARTING: &str = "Starting breeding KPI report";
    pub const CONNECTING_TO_DATABASE: &str = "Connecting to database";
    pub const USING_EVENT_FILE: &str = "Reading breeding events from file";
    pub const REPORT_WRITTEN: &str = "Breeding KPI report written";
}

/// Database-related log messages
pub mod database {
    pub const HEALTH_CHECK_FAILED: &str = "Database health check failed";
    pub const CONNECTION_ESTABLISHED: &str = "Database connection established";
}

/// KPI service messages
pub mod kpi {
    pub const EVENTS_LOADED: &str = "Loaded breeding events for expanded window";
    pub const LOAD_FAILED: &str = "Breeding event load failed";
    pub const RESOLVED_TREND_MONTHS: &str = "Resolved trend months";
}
