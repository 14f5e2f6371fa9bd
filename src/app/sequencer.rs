//! The converter sequencer: the control loop.
//!
//! [`Sequencer`] owns the resolved [`Topology`] and a blocking delay. Each
//! cycle it reports presence, enables every converter, holds, disables every
//! converter, holds, and repeats. The first failed driver call ends the loop
//! for good.
//!
//! ```text
//!  Topology ──▶ ┌───────────────────────┐ ──▶ EventSink
//!               │       Sequencer       │
//!   DelayNs ◀── │  phase ring · latch   │
//!               └───────────────────────┘
//! ```

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::SequencerConfig;
use crate::error::SequencerError;

use super::events::{FaultReport, SequencerEvent};
use super::phase::Phase;
use super::ports::{EventSink, Regulator};
use super::topology::Topology;

/// Drives one or two converters through the enable/disable cycle.
pub struct Sequencer<R, D> {
    topology: Topology<R>,
    delay: D,
    enabled_dwell_ms: u32,
    disabled_dwell_ms: u32,
    phase: Phase,
    /// Completed enable/disable cycles.
    cycles: u64,
    /// Set by the first failure; every later cycle returns it unchanged.
    halted: Option<SequencerError>,
}

impl<R: Regulator, D: DelayNs> Sequencer<R, D> {
    /// Build a sequencer over an already-resolved topology.
    pub fn new(topology: Topology<R>, config: &SequencerConfig, delay: D) -> Self {
        Self {
            topology,
            delay,
            enabled_dwell_ms: config.enabled_dwell_ms,
            disabled_dwell_ms: config.disabled_dwell_ms,
            phase: Phase::INITIAL,
            cycles: 0,
            halted: None,
        }
    }

    // ── Loop ──────────────────────────────────────────────────

    /// Cycle until a driver call fails. Never returns `Ok`.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<Infallible, SequencerError> {
        info!(
            "sequencer running: {} converter(s), dwell {}ms enabled / {}ms disabled",
            self.topology.iter().count(),
            self.enabled_dwell_ms,
            self.disabled_dwell_ms
        );
        loop {
            self.cycle(sink)?;
        }
    }

    /// Run one full enable → hold → disable → hold cycle.
    ///
    /// On failure the fault is reported, the error is latched, and nothing
    /// is undone: a converter enabled earlier in the same cycle is left on.
    pub fn cycle(&mut self, sink: &mut impl EventSink) -> Result<(), SequencerError> {
        self.check_latch()?;

        // 1. Presence
        self.topology.report_presence(sink);

        // 2-4. Enable and hold
        self.enable_all(sink)?;
        self.delay.delay_ms(self.enabled_dwell_ms);

        // 5-7. Disable and hold
        self.disable_all(sink)?;
        self.delay.delay_ms(self.disabled_dwell_ms);

        self.cycles += 1;
        Ok(())
    }

    /// Enable primary, then secondary if present.
    ///
    /// Walks `Disabled → Enabling → Enabled`. A no-op when already enabled.
    /// Fails with the latched error, without touching hardware, once halted.
    pub fn enable_all(&mut self, sink: &mut impl EventSink) -> Result<(), SequencerError> {
        self.check_latch()?;
        if self.phase == Phase::Enabled {
            return Ok(());
        }
        self.advance(Phase::Enabling, sink);
        if let Err(report) = self.topology.enable_all() {
            return Err(self.halt(report, sink));
        }
        sink.emit(&SequencerEvent::ConvertersEnabled);
        self.advance(Phase::Enabled, sink);
        Ok(())
    }

    /// Disable secondary if present, then primary.
    ///
    /// Walks `Enabled → Disabling → Disabled`. A no-op when already disabled.
    /// Fails with the latched error, without touching hardware, once halted.
    pub fn disable_all(&mut self, sink: &mut impl EventSink) -> Result<(), SequencerError> {
        self.check_latch()?;
        if self.phase == Phase::Disabled {
            return Ok(());
        }
        self.advance(Phase::Disabling, sink);
        if let Err(report) = self.topology.disable_all() {
            return Err(self.halt(report, sink));
        }
        sink.emit(&SequencerEvent::ConvertersDisabled);
        self.advance(Phase::Disabled, sink);
        Ok(())
    }

    /// Idle forever without touching any converter.
    pub fn park(&mut self) -> ! {
        park(&mut self.delay)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn topology(&self) -> &Topology<R> {
        &self.topology
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_latch(&self) -> Result<(), SequencerError> {
        match &self.halted {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn advance(&mut self, to: Phase, sink: &mut impl EventSink) {
        let from = self.phase;
        debug_assert_eq!(from.next(), to, "phase ring skipped a step");
        debug!("phase transition: {} -> {}", from, to);
        self.phase = to;
        sink.emit(&SequencerEvent::PhaseChanged { from, to });
    }

    fn halt(&mut self, report: FaultReport, sink: &mut impl EventSink) -> SequencerError {
        sink.emit(&SequencerEvent::Fault(report.clone()));
        let e = SequencerError::from(report);
        self.halted = Some(e.clone());
        e
    }
}

/// Interval between wake-ups while parked.
pub const PARK_INTERVAL_MS: u32 = u32::MAX;

/// Block the calling task forever on `delay`.
pub fn park(delay: &mut impl DelayNs) -> ! {
    loop {
        delay.delay_ms(PARK_INTERVAL_MS);
    }
}
