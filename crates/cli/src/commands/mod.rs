//! Command implementations.
//!
//! Each command writes its human-readable output to the given writer and
//! leaves logging to `tracing`.

pub mod admin;
pub mod shop;
