//! Mock hardware for integration tests.
//!
//! Every registry lookup, driver call, delay and emitted event lands in one
//! shared, totally ordered [`Timeline`], so tests can assert on cross-device
//! ordering without touching real pins.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cp9314_sequencer::app::ports::{DeviceRegistry, EventSink, Regulator};
use cp9314_sequencer::{
    ErrorCode, ErrorFlags, Sequencer, SequencerConfig, SequencerError, SequencerEvent, Topology,
};
use embedded_hal::delay::DelayNs;

pub const PRIMARY: &str = "cp9314";
pub const SECONDARY: &str = "cp9314_dev2";

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve(String),
    IsReady(&'static str),
    Enable(&'static str),
    Disable(&'static str),
    ReadFlags(&'static str),
    DelayMs(u32),
    DelayNs(u32),
    Event(SequencerEvent),
}

impl Call {
    /// True for anything that reached a device (not the registry, a delay, or the sink).
    pub fn is_device_call(&self) -> bool {
        matches!(
            self,
            Call::IsReady(_) | Call::Enable(_) | Call::Disable(_) | Call::ReadFlags(_)
        )
    }

    /// Device the call addressed, if any.
    pub fn device(&self) -> Option<&'static str> {
        match self {
            Call::IsReady(n) | Call::Enable(n) | Call::Disable(n) | Call::ReadFlags(n) => Some(*n),
            _ => None,
        }
    }
}

pub type Timeline = Rc<RefCell<Vec<Call>>>;

// ── MockRegulator ─────────────────────────────────────────────

pub struct MockRegulator {
    name: &'static str,
    log: Timeline,
    ready: bool,
    enable_results: VecDeque<Result<(), ErrorCode>>,
    disable_results: VecDeque<Result<(), ErrorCode>>,
    flags: Result<ErrorFlags, ErrorCode>,
}

impl MockRegulator {
    pub fn new(name: &'static str, log: Timeline) -> Self {
        Self {
            name,
            log,
            ready: true,
            enable_results: VecDeque::new(),
            disable_results: VecDeque::new(),
            flags: Ok(ErrorFlags::empty()),
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Queue results for successive enable calls; afterwards every call succeeds.
    pub fn enable_results(mut self, results: impl IntoIterator<Item = Result<(), ErrorCode>>) -> Self {
        self.enable_results.extend(results);
        self
    }

    pub fn disable_results(mut self, results: impl IntoIterator<Item = Result<(), ErrorCode>>) -> Self {
        self.disable_results.extend(results);
        self
    }

    pub fn flags(mut self, flags: Result<ErrorFlags, ErrorCode>) -> Self {
        self.flags = flags;
        self
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Regulator for MockRegulator {
    fn is_ready(&self) -> bool {
        self.record(Call::IsReady(self.name));
        self.ready
    }

    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.record(Call::Enable(self.name));
        self.enable_results.pop_front().unwrap_or(Ok(()))
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        self.record(Call::Disable(self.name));
        self.disable_results.pop_front().unwrap_or(Ok(()))
    }

    fn read_error_flags(&mut self) -> Result<ErrorFlags, ErrorCode> {
        self.record(Call::ReadFlags(self.name));
        self.flags
    }
}

// ── MockRegistry ──────────────────────────────────────────────

pub struct MockRegistry {
    log: Timeline,
    devices: Vec<(&'static str, MockRegulator)>,
}

impl DeviceRegistry for MockRegistry {
    type Device = MockRegulator;

    fn resolve(&mut self, label: &str) -> Option<MockRegulator> {
        self.log.borrow_mut().push(Call::Resolve(label.to_string()));
        let idx = self.devices.iter().position(|(n, _)| *n == label)?;
        Some(self.devices.remove(idx).1)
    }
}

// ── Delay and sink ────────────────────────────────────────────

pub struct RecordingDelay {
    log: Timeline,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Call::DelayNs(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Call::DelayMs(ms));
    }
}

pub struct RecordingSink {
    log: Timeline,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SequencerEvent) {
        self.log.borrow_mut().push(Call::Event(event.clone()));
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// One test rig: a registry, a sink, a delay, all writing to one timeline.
pub struct Bench {
    pub log: Timeline,
    pub registry: MockRegistry,
    pub sink: RecordingSink,
    pub config: SequencerConfig,
}

impl Bench {
    pub fn new() -> Self {
        let log: Timeline = Rc::new(RefCell::new(Vec::new()));
        Self {
            registry: MockRegistry {
                log: log.clone(),
                devices: Vec::new(),
            },
            sink: RecordingSink { log: log.clone() },
            config: SequencerConfig::default(),
            log,
        }
    }

    /// Primary only, both calls always succeed.
    pub fn standalone() -> Self {
        let mut bench = Self::new();
        let primary = bench.regulator(PRIMARY);
        bench.install(primary);
        bench
    }

    /// Primary and secondary, both calls always succeed.
    pub fn dual() -> Self {
        let mut bench = Self::standalone();
        let secondary = bench.regulator(SECONDARY);
        bench.install(secondary);
        bench
    }

    /// A fresh regulator wired to this bench's timeline.
    pub fn regulator(&self, name: &'static str) -> MockRegulator {
        MockRegulator::new(name, self.log.clone())
    }

    pub fn install(&mut self, regulator: MockRegulator) {
        self.registry.devices.push((regulator.name, regulator));
    }

    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay {
            log: self.log.clone(),
        }
    }

    pub fn resolve(&mut self) -> Result<Topology<MockRegulator>, SequencerError> {
        Topology::resolve(&mut self.registry, &self.config, &mut self.sink)
    }

    /// Resolve and build a sequencer, then forget the startup calls.
    pub fn start(&mut self) -> Sequencer<MockRegulator, RecordingDelay> {
        let topology = self.resolve().expect("startup should succeed");
        let sequencer = Sequencer::new(topology, &self.config, self.delay());
        self.clear();
        sequencer
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn device_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_device_call).collect()
    }

    /// Events, minus phase bookkeeping.
    pub fn reports(&self) -> Vec<SequencerEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, SequencerEvent::PhaseChanged { .. }))
            .collect()
    }

    pub fn events(&self) -> Vec<SequencerEvent> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn touched(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c.device() == Some(name))
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}
