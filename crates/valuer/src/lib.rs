//! Core library for the valuation platform's construction cost calculator.
//!
//! The `calculators` module owns the domain model, rate-schedule lookup, and
//! the calculation service; `config`, `telemetry`, and `error` carry the
//! application plumbing shared with the delivery binaries.

pub mod calculators;
pub mod config;
pub mod error;
pub mod telemetry;
