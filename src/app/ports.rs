//! Port traits: the boundary between the sequencer and the outside world.
//!
//! ```text
//!   DeviceRegistry ──▶ Regulator ──▶ Sequencer ──▶ EventSink
//! ```
//!
//! Adapters implement these traits; the [`Sequencer`](super::sequencer::Sequencer)
//! is generic over them and never touches hardware directly. Dwell waits go
//! through [`embedded_hal::delay::DelayNs`] rather than a port of our own.

use crate::error::{ErrorCode, ErrorFlags};

// ───────────────────────────────────────────────────────────────
// Regulator driver contract
// ───────────────────────────────────────────────────────────────

/// One physical voltage regulator.
///
/// Calls are synchronous and issued from a single thread. A driver reports
/// a tripped protection circuit as [`ErrorCode::EINVAL`]; any other error is
/// treated as a plain I/O failure.
pub trait Regulator {
    /// Whether the driver finished initialising the device.
    fn is_ready(&self) -> bool;

    /// Turn the converter output on.
    fn enable(&mut self) -> Result<(), ErrorCode>;

    /// Turn the converter output off.
    fn disable(&mut self) -> Result<(), ErrorCode>;

    /// Read the error-flag register. Only meaningful after a fault.
    fn read_error_flags(&mut self) -> Result<ErrorFlags, ErrorCode>;
}

// ───────────────────────────────────────────────────────────────
// Device registry
// ───────────────────────────────────────────────────────────────

/// Resolves a label to a live device handle.
///
/// The sequencer calls this at startup only, once per role, and takes
/// ownership of whatever comes back.
pub trait DeviceRegistry {
    type Device: Regulator;

    fn resolve(&mut self, label: &str) -> Option<Self::Device>;
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget destination for [`SequencerEvent`](super::events::SequencerEvent)s.
/// Adapters decide where they go (serial log, test recorder, ...).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::SequencerEvent);
}
