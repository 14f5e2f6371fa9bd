//! Application core: sequencing logic, zero I/O.
//!
//! The converter sequencer and everything it decides live here. Hardware,
//! device discovery and reporting are reached only through the **port
//! traits** in [`ports`], so the whole loop runs against test doubles.

pub mod events;
pub mod phase;
pub mod ports;
pub mod sequencer;
pub mod topology;
