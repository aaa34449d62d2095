//! Readers that turn instrument output into measurements.

pub mod wtw;
