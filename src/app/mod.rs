//! Application core — pure domain orchestration, zero I/O.
//!
//! This module wires the access-control rules in [`crate::access`] into
//! one control-loop cycle.  All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
