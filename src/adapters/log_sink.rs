//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing sequencer events to the `log`
//! facade (ESP-IDF logger → UART / USB-CDC in production).

use log::{debug, error, info, warn};

use crate::app::events::SequencerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SequencerEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SequencerEvent) {
        match event {
            SequencerEvent::Standalone { secondary } => {
                warn!(
                    "No secondary CP9314 \"{}\" found, assuming standalone operation",
                    secondary
                );
            }
            SequencerEvent::Ready { role, identifier } => {
                info!(
                    "Found device \"{}\" ({}), getting regulator data",
                    identifier, role
                );
            }
            SequencerEvent::Present { identifier, .. } => {
                info!("Found device {}", identifier);
            }
            SequencerEvent::PhaseChanged { from, to } => {
                debug!("PHASE | {} -> {}", from, to);
            }
            SequencerEvent::ConvertersEnabled => {
                info!("Converter(s) enabled");
            }
            SequencerEvent::ConvertersDisabled => {
                info!("Converter(s) disabled");
            }
            SequencerEvent::Fault(report) => {
                error!("FAULT | {}", report);
            }
            SequencerEvent::StartupFailed(e) => {
                error!("Error: {} (status {})", e, e.errno());
            }
        }
    }
}
