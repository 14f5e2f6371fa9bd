//! Sequencing phases.
//!
//! ```text
//!  ┌──────────┐  both enabled  ┌─────────┐
//!  │ Enabling │───────────────▶│ Enabled │
//!  └──────────┘                └─────────┘
//!       ▲                           │ enabled dwell
//!       │ disabled dwell            ▼
//!  ┌──────────┐  both disabled ┌───────────┐
//!  │ Disabled │◀───────────────│ Disabling │
//!  └──────────┘                └───────────┘
//! ```
//!
//! A failed enable or disable leaves the ring entirely; the sequencer
//! latches the error instead of moving to another phase.

use core::fmt;

/// Where the sequencer is in its enable/disable cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Enabling = 0,
    Enabled = 1,
    Disabling = 2,
    Disabled = 3,
}

impl Phase {
    /// Number of phases in the ring.
    pub const COUNT: usize = 4;

    /// Phase the sequencer sits in before its first cycle. Converters are
    /// off at boot, so the first move is `Disabled -> Enabling`.
    pub const INITIAL: Self = Self::Disabled;

    /// Convert an index back to a `Phase`, wrapping modulo [`Self::COUNT`].
    pub const fn from_index(idx: usize) -> Self {
        match idx % Self::COUNT {
            0 => Self::Enabling,
            1 => Self::Enabled,
            2 => Self::Disabling,
            _ => Self::Disabled,
        }
    }

    /// The only phase this one may move to.
    pub const fn next(self) -> Self {
        Self::from_index(self as usize + 1)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Enabling => "Enabling",
            Self::Enabled => "Enabled",
            Self::Disabling => "Disabling",
            Self::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
