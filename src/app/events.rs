//! Outbound sequencer events.
//!
//! The [`Sequencer`](super::sequencer::Sequencer) emits these through the
//! [`EventSink`](super::ports::EventSink) port. The core decides *what* to
//! report; adapters decide how it reaches an operator.

use core::fmt;

use crate::config::Label;
use crate::error::{ErrorCode, ErrorFlags, SequencerError};

use super::phase::Phase;
use super::topology::Role;

/// Structured events emitted by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Secondary label did not resolve; running a single converter.
    Standalone { secondary: Label },

    /// A converter passed its startup readiness check.
    Ready { role: Role, identifier: Label },

    /// Start-of-cycle presence report, one per present converter.
    Present { role: Role, identifier: Label },

    /// The sequencer moved to a new phase.
    PhaseChanged { from: Phase, to: Phase },

    /// Every present converter was enabled.
    ConvertersEnabled,

    /// Every present converter was disabled.
    ConvertersDisabled,

    /// A driver call failed during enable or disable. The loop stops.
    Fault(FaultReport),

    /// Startup could not complete. Nothing was sequenced.
    StartupFailed(SequencerError),
}

/// Which driver call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Enable,
    Disable,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "enable"),
            Self::Disable => write!(f, "disable"),
        }
    }
}

/// How the driver failure was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCause {
    /// Fault-class code: the error-flag register was consulted.
    ConfigurationFault,
    /// Any other code.
    IoError,
}

/// Outcome of the follow-up error-flag read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagReadout {
    /// Not attempted (I/O-class failure).
    Skipped,
    /// Register read succeeded.
    Decoded(ErrorFlags),
    /// Register read failed with this code.
    Unavailable(ErrorCode),
}

/// A failed driver call, built at the moment of failure and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultReport {
    pub identifier: Label,
    pub role: Role,
    pub operation: Operation,
    /// Code the failing enable/disable call returned.
    pub code: ErrorCode,
    pub flags: FlagReadout,
}

impl FaultReport {
    /// Fault class, implied by whether the flag register was consulted.
    pub fn cause(&self) -> FaultCause {
        match self.flags {
            FlagReadout::Skipped => FaultCause::IoError,
            FlagReadout::Decoded(_) | FlagReadout::Unavailable(_) => FaultCause::ConfigurationFault,
        }
    }

    /// Decoded flags, if the register was read successfully.
    pub fn raw_error_flags(&self) -> Option<ErrorFlags> {
        match self.flags {
            FlagReadout::Decoded(flags) => Some(flags),
            FlagReadout::Skipped | FlagReadout::Unavailable(_) => None,
        }
    }
}

impl From<FaultReport> for SequencerError {
    fn from(report: FaultReport) -> Self {
        let FaultReport {
            identifier,
            operation,
            code,
            flags,
            ..
        } = report;
        match flags {
            FlagReadout::Decoded(flags) => Self::ConfigurationFault {
                identifier,
                operation,
                flags,
            },
            FlagReadout::Unavailable(read_error) => Self::FaultFlagsUnavailable {
                identifier,
                operation,
                read_error,
            },
            FlagReadout::Skipped => Self::IoError {
                identifier,
                operation,
                code,
            },
        }
    }
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flags {
            FlagReadout::Decoded(flags) => write!(
                f,
                "regulator fault detected on {} during {}: {}",
                self.identifier, self.operation, flags
            ),
            FlagReadout::Unavailable(read_error) => write!(
                f,
                "regulator fault detected on {} during {} ({}); error flags unreadable: {}",
                self.identifier, self.operation, self.code, read_error
            ),
            FlagReadout::Skipped => write!(
                f,
                "I/O error during {} of {}: {}",
                self.operation, self.identifier, self.code
            ),
        }
    }
}
