//! Reader and relay drivers, hardware initialisation.

pub mod hw_init;
pub mod mfrc522;
pub mod relay;
