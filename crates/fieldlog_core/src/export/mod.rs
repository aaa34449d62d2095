//! Read-only projections of trips into exchange formats.

pub mod trip_csv;
