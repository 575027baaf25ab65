//! Application services and business logic orchestration
//!
//! This module contains the KPI service, the event-source port it depends
//! on, and the wiring that connects them to configuration and storage.

pub mod app;
pub mod event_loader;
pub mod kpi_service;

pub use app::Application;
pub use event_loader::{EventWindowLoader, LoaderError};
pub use kpi_service::{BreedingKpiService, Clock, FixedClock, KpiOptions, SystemClock};
