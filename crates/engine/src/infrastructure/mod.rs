//! Infrastructure adapters and port definitions.

pub mod memory;
pub mod ports;
pub mod random;
