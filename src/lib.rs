//! CP9314 converter sequencer.
//!
//! Exposes the sequencing core and its adapters for the firmware binary,
//! integration tests and fuzzing. ESP-IDF-specific code lives only in
//! `main.rs` behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;

pub use app::events::{FaultCause, FaultReport, FlagReadout, Operation, SequencerEvent};
pub use app::phase::Phase;
pub use app::ports::{DeviceRegistry, EventSink, Regulator};
pub use app::sequencer::Sequencer;
pub use app::topology::{Converter, Role, Topology};
pub use config::SequencerConfig;
pub use error::{ErrorCode, ErrorFlags, SequencerError};
