//! Fuzz target: `Topology::resolve` + `Sequencer::cycle`
//!
//! Decodes arbitrary bytes into a converter setup (presence, readiness,
//! scripted enable/disable failures, flag register contents) and drives
//! the sequencer until it halts or the cycle budget runs out. Asserts that
//! it never panics, stops at the first failure, and stays silent once
//! halted.
//!
//! cargo fuzz run fuzz_sequencer

#![no_main]

use cp9314_sequencer::adapters::registry::StaticRegistry;
use cp9314_sequencer::adapters::sim_regulator::SimRegulator;
use cp9314_sequencer::{
    ErrorCode, ErrorFlags, EventSink, Sequencer, SequencerConfig, SequencerEvent, Topology,
};
use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;

const MAX_CYCLES: u32 = 16;

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Default)]
struct CountingSink {
    events: usize,
    faults: usize,
}

impl EventSink for CountingSink {
    fn emit(&mut self, event: &SequencerEvent) {
        self.events += 1;
        if matches!(event, SequencerEvent::Fault(_)) {
            self.faults += 1;
        }
    }
}

fn code(byte: u8) -> ErrorCode {
    match byte % 4 {
        0 => ErrorCode::EINVAL,
        1 => ErrorCode::EIO,
        2 => ErrorCode::ETIMEDOUT,
        _ => ErrorCode(-i32::from(byte)),
    }
}

fn regulator(bytes: &[u8; 4]) -> SimRegulator {
    let [opts, enable, disable, flags] = *bytes;
    let mut sim = SimRegulator::new();
    if opts & 0x01 != 0 {
        sim = sim.not_ready();
    }
    if opts & 0x02 != 0 {
        sim = sim.fail_enable_at(u32::from(enable % 8), code(enable));
    }
    if opts & 0x04 != 0 {
        sim = sim.fail_disable_at(u32::from(disable % 8), code(disable));
    }
    if opts & 0x08 != 0 {
        sim = sim.with_flags(Err(code(flags)));
    } else {
        sim = sim.with_flags(Ok(ErrorFlags::from_bits(u32::from(flags))));
    }
    sim
}

fuzz_target!(|data: &[u8]| {
    let Some((&layout, rest)) = data.split_first() else {
        return;
    };
    let mut chunks = rest.chunks_exact(4);
    let Some(primary_bytes) = chunks.next() else {
        return;
    };
    let secondary_bytes = chunks.next();

    let config = SequencerConfig::default();
    let mut registry: StaticRegistry<SimRegulator, 2> = StaticRegistry::new();
    if layout & 0x01 == 0 {
        let bytes: [u8; 4] = primary_bytes.try_into().unwrap();
        registry.register(&config.primary_label, regulator(&bytes)).unwrap();
    }
    if let Some(bytes) = secondary_bytes {
        let bytes: [u8; 4] = bytes.try_into().unwrap();
        registry.register(&config.secondary_label, regulator(&bytes)).unwrap();
    }

    let mut sink = CountingSink::default();
    let Ok(topology) = Topology::resolve(&mut registry, &config, &mut sink) else {
        return;
    };
    let mut sequencer = Sequencer::new(topology, &config, NoDelay);

    for _ in 0..MAX_CYCLES {
        if sequencer.cycle(&mut sink).is_err() {
            break;
        }
    }

    assert!(sink.faults <= 1, "more than one fault reported");
    if sequencer.is_halted() {
        assert_eq!(sink.faults, 1);
        let before = sink.events;
        let calls_before: u32 = sequencer
            .topology()
            .iter()
            .map(|c| c.regulator().enable_calls() + c.regulator().disable_calls())
            .sum();
        assert!(sequencer.cycle(&mut sink).is_err());
        let calls_after: u32 = sequencer
            .topology()
            .iter()
            .map(|c| c.regulator().enable_calls() + c.regulator().disable_calls())
            .sum();
        assert_eq!(sink.events, before, "halted sequencer emitted an event");
        assert_eq!(calls_before, calls_after, "halted sequencer touched a converter");
    } else {
        assert_eq!(sequencer.cycles(), u64::from(MAX_CYCLES));
    }
});
