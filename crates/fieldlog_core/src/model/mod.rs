//! Field-sampling domain model.
//!
//! # Responsibility
//! - Define the paired template/instance records: trips, locations, samples
//!   and measurements.
//! - Share validation, warnings, equality and JSON rules through the traits
//!   in `common`.
//!
//! # Invariants
//! - Instances own snapshots of their templates; nothing is shared.
//! - Loading JSON is strict; validation and warnings are explicit calls.

pub mod common;
pub mod coords;
pub mod location;
pub mod meas_type;
pub mod sample;
pub mod set;
pub mod timestamp;
pub mod trip;
pub mod validation;
