//! RfidGate firmware library.
//!
//! An RFID access-control controller: a polled proximity-card reader
//! feeds a decision engine (authorization, daily quota, global cooldown)
//! that drives a lock relay and reports grants and unauthorized scans to
//! a remote datastore.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod access;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;

#[cfg(target_os = "espidf")]
mod esp_link_shims;
