//! CP9314 sequencer firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  GpioRegulator ×1..2   StaticRegistry   LogEventSink     │
//! │  (Regulator)           (DeviceRegistry) (EventSink)      │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │  Topology::resolve  →  Sequencer::run (forever) │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Board wiring (ESP32-S3):
//!
//! | Converter     | EN     | nFAULT |
//! |---------------|--------|--------|
//! | `cp9314`      | GPIO4  | GPIO5  |
//! | `cp9314_dev2` | GPIO6  | GPIO7  |
//!
//! The secondary is only registered when built with the `dual` feature.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, InputPin as _, Output, OutputPin as _, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info};

use cp9314_sequencer::adapters::gpio_regulator::GpioRegulator;
use cp9314_sequencer::adapters::log_sink::LogEventSink;
use cp9314_sequencer::adapters::registry::StaticRegistry;
use cp9314_sequencer::app::sequencer::park;
use cp9314_sequencer::{ErrorFlags, Sequencer, SequencerConfig, Topology};

type BoardRegulator = GpioRegulator<
    PinDriver<'static, AnyOutputPin, Output>,
    PinDriver<'static, AnyInputPin, Input>,
>;

/// nFAULT on this board is the converter's over-current comparator.
const FAULT_LINE_MEANING: ErrorFlags = ErrorFlags::OVER_CURRENT;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("CP9314 sequencer v{}", env!("CARGO_PKG_VERSION"));

    let config = SequencerConfig::default();
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // ── 2. Populate the device registry ───────────────────────
    let mut registry: StaticRegistry<BoardRegulator, 2> = StaticRegistry::new();

    let primary = GpioRegulator::new(
        PinDriver::output(pins.gpio4.downgrade_output())?,
        PinDriver::input(pins.gpio5.downgrade_input())?,
        FAULT_LINE_MEANING,
    );
    registry.register(&config.primary_label, primary)?;

    #[cfg(feature = "dual")]
    {
        let secondary = GpioRegulator::new(
            PinDriver::output(pins.gpio6.downgrade_output())?,
            PinDriver::input(pins.gpio7.downgrade_input())?,
            FAULT_LINE_MEANING,
        );
        registry.register(&config.secondary_label, secondary)?;
    }

    // ── 3. Resolve, check readiness, sequence forever ─────────
    // Fatal errors park the task. main must not return: exit() reboots.
    let mut sink = LogEventSink::new();
    let topology = match Topology::resolve(&mut registry, &config, &mut sink) {
        Ok(topology) => topology,
        Err(e) => {
            error!("startup aborted (status {}), idling", e.errno());
            park(&mut FreeRtos);
        }
    };
    let mut sequencer = Sequencer::new(topology, &config, FreeRtos);

    let Err(e) = sequencer.run(&mut sink);
    error!("sequencer halted (status {}), idling", e.errno());
    sequencer.park()
}
