//! In-memory converter for host runs and fuzzing.
//!
//! Tracks output state and call counts, and fails on demand: a scripted
//! failure fires when the Nth enable (or disable) call is made.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the board wires [`GpioRegulator`](super::gpio_regulator::GpioRegulator)s
//! instead; nothing here touches hardware.

use log::debug;

use crate::app::ports::Regulator;
use crate::error::{ErrorCode, ErrorFlags};

/// Scripted failure: the `at`-th call (zero-based) returns `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedFailure {
    pub at: u32,
    pub code: ErrorCode,
}

#[derive(Debug, Clone)]
pub struct SimRegulator {
    ready: bool,
    enabled: bool,
    enable_calls: u32,
    disable_calls: u32,
    flag_reads: u32,
    fail_enable: Option<ScriptedFailure>,
    fail_disable: Option<ScriptedFailure>,
    flags: Result<ErrorFlags, ErrorCode>,
}

impl Default for SimRegulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegulator {
    /// A ready converter that never fails.
    pub fn new() -> Self {
        Self {
            ready: true,
            enabled: false,
            enable_calls: 0,
            disable_calls: 0,
            flag_reads: 0,
            fail_enable: None,
            fail_disable: None,
            flags: Ok(ErrorFlags::empty()),
        }
    }

    #[must_use]
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    #[must_use]
    pub fn fail_enable_at(mut self, at: u32, code: ErrorCode) -> Self {
        self.fail_enable = Some(ScriptedFailure { at, code });
        self
    }

    #[must_use]
    pub fn fail_disable_at(mut self, at: u32, code: ErrorCode) -> Self {
        self.fail_disable = Some(ScriptedFailure { at, code });
        self
    }

    /// What `read_error_flags` returns.
    #[must_use]
    pub fn with_flags(mut self, flags: Result<ErrorFlags, ErrorCode>) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable_calls(&self) -> u32 {
        self.enable_calls
    }

    pub fn disable_calls(&self) -> u32 {
        self.disable_calls
    }

    pub fn flag_reads(&self) -> u32 {
        self.flag_reads
    }

    fn scripted(failure: Option<ScriptedFailure>, call: u32) -> Result<(), ErrorCode> {
        match failure {
            Some(f) if f.at == call => Err(f.code),
            _ => Ok(()),
        }
    }
}

impl Regulator for SimRegulator {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn enable(&mut self) -> Result<(), ErrorCode> {
        let call = self.enable_calls;
        self.enable_calls += 1;
        Self::scripted(self.fail_enable, call)?;
        self.enabled = true;
        debug!("sim regulator: enabled (call {})", call);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        let call = self.disable_calls;
        self.disable_calls += 1;
        Self::scripted(self.fail_disable, call)?;
        self.enabled = false;
        debug!("sim regulator: disabled (call {})", call);
        Ok(())
    }

    fn read_error_flags(&mut self) -> Result<ErrorFlags, ErrorCode> {
        self.flag_reads += 1;
        self.flags
    }
}
