//! Error types for the converter sequencer.
//!
//! Two layers live here:
//!
//! - [`ErrorCode`] and [`ErrorFlags`] are the raw vocabulary of the regulator
//!   driver contract (negative errno values and the error-flag register).
//! - [`SequencerError`] is what the control loop propagates to its host.
//!   Every variant is fatal; nothing in the core recovers locally.

use core::fmt;

use crate::app::events::Operation;
use crate::config::{ConfigError, Label};

// ---------------------------------------------------------------------------
// Driver return codes
// ---------------------------------------------------------------------------

/// A negative errno value returned by a regulator driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// Generic I/O failure.
    pub const EIO: Self = Self(-5);
    /// No such device.
    pub const ENODEV: Self = Self(-19);
    /// Device busy.
    pub const EBUSY: Self = Self(-16);
    /// Invalid configuration. Regulator drivers return this when the
    /// converter trips a protection circuit, so it is the fault-class code.
    pub const EINVAL: Self = Self(-22);
    /// Operation timed out.
    pub const ETIMEDOUT: Self = Self(-116);

    /// Raw errno value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Classify the code into fault-class or generic I/O.
    pub const fn kind(self) -> ErrorKind {
        if self.0 == Self::EINVAL.0 {
            ErrorKind::Fault
        } else {
            ErrorKind::Io
        }
    }

    /// True for the distinguished configuration/electrical fault code.
    pub const fn is_fault(self) -> bool {
        matches!(self.kind(), ErrorKind::Fault)
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Self::EIO => Some("EIO"),
            Self::ENODEV => Some("ENODEV"),
            Self::EBUSY => Some("EBUSY"),
            Self::EINVAL => Some("EINVAL"),
            Self::ETIMEDOUT => Some("ETIMEDOUT"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The only distinction the sequencer draws between driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration/electrical fault; the error-flag register holds the cause.
    Fault,
    /// Anything else. Reported with its raw code only.
    Io,
}

// ---------------------------------------------------------------------------
// Error-flag register
// ---------------------------------------------------------------------------

/// Bit pattern read from a converter's error-flag register.
///
/// Uses the standard regulator flag layout. Bits outside the known set are
/// kept and printed as raw hex so nothing the hardware reports is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorFlags(u32);

impl ErrorFlags {
    pub const OVER_VOLTAGE: Self = Self(1 << 0);
    pub const OVER_CURRENT: Self = Self(1 << 1);
    pub const OVER_TEMP: Self = Self(1 << 2);

    const KNOWN: [(Self, &'static str); 3] = [
        (Self::OVER_VOLTAGE, "over-voltage"),
        (Self::OVER_CURRENT, "over-current"),
        (Self::OVER_TEMP, "over-temperature"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Names of the known flags that are set, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::KNOWN
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Bits the decoder has no name for.
    pub const fn unknown_bits(self) -> u32 {
        self.0 & !(Self::OVER_VOLTAGE.0 | Self::OVER_CURRENT.0 | Self::OVER_TEMP.0)
    }
}

impl core::ops::BitOr for ErrorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)?;
        if self.is_empty() {
            return write!(f, " [none]");
        }
        write!(f, " [")?;
        let mut first = true;
        for name in self.names() {
            if !first {
                write!(f, ", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        let unknown = self.unknown_bits();
        if unknown != 0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "unknown 0x{:x}", unknown)?;
        }
        write!(f, "]")
    }
}

// ---------------------------------------------------------------------------
// Sequencer errors
// ---------------------------------------------------------------------------

/// Every way the sequencer can stop. All variants are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    /// The primary converter could not be resolved from the registry.
    NoPrimaryDevice { identifier: Label },
    /// A present converter failed its one-time readiness check.
    DeviceNotReady { identifier: Label },
    /// The driver signalled a fault; the error-flag register was decoded.
    ConfigurationFault {
        identifier: Label,
        operation: Operation,
        flags: ErrorFlags,
    },
    /// The driver signalled a fault and reading the error flags failed too.
    FaultFlagsUnavailable {
        identifier: Label,
        operation: Operation,
        read_error: ErrorCode,
    },
    /// Any other driver failure.
    IoError {
        identifier: Label,
        operation: Operation,
        code: ErrorCode,
    },
    /// The configuration was rejected before touching the registry.
    InvalidConfig(ConfigError),
}

impl SequencerError {
    /// Status handed back to the host environment. Always negative.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NoPrimaryDevice { .. } | Self::DeviceNotReady { .. } => ErrorCode::EIO.raw(),
            Self::ConfigurationFault { .. }
            | Self::FaultFlagsUnavailable { .. }
            | Self::InvalidConfig(_) => ErrorCode::EINVAL.raw(),
            Self::IoError { code, .. } if code.raw() < 0 => code.raw(),
            Self::IoError { .. } => ErrorCode::EIO.raw(),
        }
    }

    /// Label of the converter involved, when there is one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::NoPrimaryDevice { identifier }
            | Self::DeviceNotReady { identifier }
            | Self::ConfigurationFault { identifier, .. }
            | Self::FaultFlagsUnavailable { identifier, .. }
            | Self::IoError { identifier, .. } => Some(identifier.as_str()),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPrimaryDevice { identifier } => {
                write!(f, "no primary converter \"{}\" found", identifier)
            }
            Self::DeviceNotReady { identifier } => write!(
                f,
                "device \"{}\" is not ready; check the driver initialization logs",
                identifier
            ),
            Self::ConfigurationFault {
                identifier,
                operation,
                flags,
            } => write!(
                f,
                "regulator fault on \"{}\" during {}: flags {}",
                identifier, operation, flags
            ),
            Self::FaultFlagsUnavailable {
                identifier,
                operation,
                read_error,
            } => write!(
                f,
                "regulator fault on \"{}\" during {}; reading error flags failed: {}",
                identifier, operation, read_error
            ),
            Self::IoError {
                identifier,
                operation,
                code,
            } => write!(
                f,
                "I/O error on \"{}\" during {}: {}",
                identifier, operation, code
            ),
            Self::InvalidConfig(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for SequencerError {}

impl From<ConfigError> for SequencerError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, SequencerError>;
