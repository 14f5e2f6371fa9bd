//! Converter topology and startup resolution.
//!
//! Presence is structural: a [`Topology`] is either one converter or two,
//! so there is no "secondary might be missing" check to forget inside the
//! loop. A [`Converter`] is only ever constructed after its readiness check
//! passed.

use core::fmt;

use crate::config::{Label, SequencerConfig};
use crate::error::{ErrorCode, SequencerError};

use super::events::{FaultReport, FlagReadout, Operation, SequencerEvent};
use super::ports::{DeviceRegistry, EventSink, Regulator};

/// Which slot a converter occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Always expected to exist.
    Primary,
    /// Optional second converter.
    Secondary,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// A resolved, ready regulator in a given role.
pub struct Converter<R> {
    identifier: Label,
    role: Role,
    regulator: R,
}

impl<R: Regulator> Converter<R> {
    fn new(identifier: Label, role: Role, regulator: R) -> Self {
        Self {
            identifier,
            role,
            regulator,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn regulator(&self) -> &R {
        &self.regulator
    }

    pub fn enable(&mut self) -> Result<(), FaultReport> {
        let result = self.regulator.enable();
        result.map_err(|code| self.classify(Operation::Enable, code))
    }

    pub fn disable(&mut self) -> Result<(), FaultReport> {
        let result = self.regulator.disable();
        result.map_err(|code| self.classify(Operation::Disable, code))
    }

    /// Turn a failed driver call into a report. Fault-class codes cost one
    /// extra register read; the read is never retried.
    fn classify(&mut self, operation: Operation, code: ErrorCode) -> FaultReport {
        let flags = if code.is_fault() {
            match self.regulator.read_error_flags() {
                Ok(flags) => FlagReadout::Decoded(flags),
                Err(read_error) => FlagReadout::Unavailable(read_error),
            }
        } else {
            FlagReadout::Skipped
        };
        FaultReport {
            identifier: self.identifier.clone(),
            role: self.role,
            operation,
            code,
            flags,
        }
    }

    fn presence(&self) -> SequencerEvent {
        SequencerEvent::Present {
            role: self.role,
            identifier: self.identifier.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// The converters present in this deployment.
pub enum Topology<R> {
    Standalone(Converter<R>),
    Dual {
        primary: Converter<R>,
        secondary: Converter<R>,
    },
}

impl<R: Regulator> Topology<R> {
    /// Resolve and readiness-check the converters named in `config`.
    ///
    /// Primary is resolved first and must exist. Secondary is optional.
    /// Each present converter is checked for readiness exactly once, primary
    /// first. Every failure is reported through `sink` before it is returned.
    pub fn resolve<G>(
        registry: &mut G,
        config: &SequencerConfig,
        sink: &mut impl EventSink,
    ) -> Result<Self, SequencerError>
    where
        G: DeviceRegistry<Device = R>,
    {
        let result = Self::resolve_inner(registry, config, sink);
        if let Err(e) = &result {
            sink.emit(&SequencerEvent::StartupFailed(e.clone()));
        }
        result
    }

    fn resolve_inner<G>(
        registry: &mut G,
        config: &SequencerConfig,
        sink: &mut impl EventSink,
    ) -> Result<Self, SequencerError>
    where
        G: DeviceRegistry<Device = R>,
    {
        config.validate()?;

        let Some(primary) = registry.resolve(&config.primary_label) else {
            return Err(SequencerError::NoPrimaryDevice {
                identifier: config.primary_label.clone(),
            });
        };
        let secondary = registry.resolve(&config.secondary_label);
        if secondary.is_none() {
            sink.emit(&SequencerEvent::Standalone {
                secondary: config.secondary_label.clone(),
            });
        }

        let primary = Self::check_ready(primary, &config.primary_label, Role::Primary, sink)?;
        match secondary {
            None => Ok(Self::Standalone(primary)),
            Some(secondary) => {
                let secondary =
                    Self::check_ready(secondary, &config.secondary_label, Role::Secondary, sink)?;
                Ok(Self::Dual { primary, secondary })
            }
        }
    }

    fn check_ready(
        regulator: R,
        identifier: &Label,
        role: Role,
        sink: &mut impl EventSink,
    ) -> Result<Converter<R>, SequencerError> {
        if !regulator.is_ready() {
            return Err(SequencerError::DeviceNotReady {
                identifier: identifier.clone(),
            });
        }
        sink.emit(&SequencerEvent::Ready {
            role,
            identifier: identifier.clone(),
        });
        Ok(Converter::new(identifier.clone(), role, regulator))
    }

    pub fn primary(&self) -> &Converter<R> {
        match self {
            Self::Standalone(primary) | Self::Dual { primary, .. } => primary,
        }
    }

    pub fn secondary(&self) -> Option<&Converter<R>> {
        match self {
            Self::Standalone(_) => None,
            Self::Dual { secondary, .. } => Some(secondary),
        }
    }

    pub fn is_dual(&self) -> bool {
        matches!(self, Self::Dual { .. })
    }

    /// Present converters, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &Converter<R>> {
        core::iter::once(self.primary()).chain(self.secondary())
    }

    /// Emit one presence event per converter, primary first.
    pub(crate) fn report_presence(&self, sink: &mut impl EventSink) {
        for converter in self.iter() {
            sink.emit(&converter.presence());
        }
    }

    /// Enable primary, then secondary. Stops at the first failure; anything
    /// already enabled stays enabled.
    pub(crate) fn enable_all(&mut self) -> Result<(), FaultReport> {
        match self {
            Self::Standalone(primary) => primary.enable(),
            Self::Dual { primary, secondary } => {
                primary.enable()?;
                secondary.enable()
            }
        }
    }

    /// Disable secondary, then primary. Stops at the first failure.
    pub(crate) fn disable_all(&mut self) -> Result<(), FaultReport> {
        match self {
            Self::Standalone(primary) => primary.disable(),
            Self::Dual { primary, secondary } => {
                secondary.disable()?;
                primary.disable()
            }
        }
    }
}
