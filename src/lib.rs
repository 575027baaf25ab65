//! Breeding KPI - herd reproductive performance indicators
//!
//! Computes conception rate, days open, calving interval and AI per
//! conception from an owner's insemination and calving log, together with
//! monthly trends and month-over-month deltas.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{Application, BreedingKpiService};
pub use error::{Error, Result};
