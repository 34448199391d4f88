//! Sensor subsystem.
//!
//! One auxiliary analog input, sampled on each grant and reported in the
//! grant telemetry.

pub mod voltage;
