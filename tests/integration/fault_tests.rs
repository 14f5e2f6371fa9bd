//! Fault classification, stop-on-first-failure, and the halt latch.

use cp9314_sequencer::config::label;
use cp9314_sequencer::{
    ErrorCode, ErrorFlags, FaultCause, FlagReadout, Operation, Phase, Role, SequencerError,
    SequencerEvent,
};

use crate::mock_hw::{Bench, Call, PRIMARY, SECONDARY};

fn faults(bench: &Bench) -> Vec<cp9314_sequencer::FaultReport> {
    bench
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SequencerEvent::Fault(r) => Some(r),
            _ => None,
        })
        .collect()
}

#[test]
fn primary_enable_fault_reads_flags_once_and_stops() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Err(ErrorCode::EINVAL)])
        .flags(Ok(ErrorFlags::OVER_CURRENT | ErrorFlags::OVER_TEMP));
    bench.install(primary);
    let secondary = bench.regulator(SECONDARY);
    bench.install(secondary);
    let mut sequencer = bench.start();

    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(
        bench.device_calls(),
        vec![Call::Enable(PRIMARY), Call::ReadFlags(PRIMARY)]
    );
    assert!(!bench.touched(SECONDARY));
    assert_eq!(
        err,
        SequencerError::ConfigurationFault {
            identifier: label(PRIMARY).unwrap(),
            operation: Operation::Enable,
            flags: ErrorFlags::from_bits(0b110),
        }
    );
    assert_eq!(err.errno(), -22);

    let reports = faults(&bench);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].cause(), FaultCause::ConfigurationFault);
    assert_eq!(reports[0].role, Role::Primary);
    assert_eq!(reports[0].code, ErrorCode::EINVAL);
    assert_eq!(reports[0].raw_error_flags(), Some(ErrorFlags::from_bits(0x6)));
    assert!(
        !bench.calls().contains(&Call::Event(SequencerEvent::ConvertersEnabled)),
        "no enabled report after a fault"
    );
}

#[test]
fn primary_enable_io_error_skips_flag_read() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Err(ErrorCode::EIO)]);
    bench.install(primary);
    let mut sequencer = bench.start();

    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(bench.device_calls(), vec![Call::Enable(PRIMARY)]);
    assert_eq!(
        err,
        SequencerError::IoError {
            identifier: label(PRIMARY).unwrap(),
            operation: Operation::Enable,
            code: ErrorCode::EIO,
        }
    );
    assert_eq!(err.errno(), -5);
    assert_eq!(faults(&bench)[0].flags, FlagReadout::Skipped);
    assert!(
        !bench.calls().iter().any(|c| matches!(c, Call::DelayMs(_))),
        "no dwell after a failed enable"
    );
}

#[test]
fn secondary_enable_fault_leaves_primary_enabled() {
    let mut bench = Bench::standalone();
    let secondary = bench
        .regulator(SECONDARY)
        .enable_results([Err(ErrorCode::EINVAL)])
        .flags(Ok(ErrorFlags::OVER_VOLTAGE));
    bench.install(secondary);
    let mut sequencer = bench.start();

    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(
        bench.device_calls(),
        vec![
            Call::Enable(PRIMARY),
            Call::Enable(SECONDARY),
            Call::ReadFlags(SECONDARY),
        ],
        "no rollback of the primary"
    );
    assert_eq!(err.identifier(), Some(SECONDARY));
    assert_eq!(faults(&bench)[0].role, Role::Secondary);
}

#[test]
fn secondary_disable_io_error_skips_primary_disable() {
    let mut bench = Bench::standalone();
    let secondary = bench
        .regulator(SECONDARY)
        .disable_results([Err(ErrorCode::ETIMEDOUT)]);
    bench.install(secondary);
    let mut sequencer = bench.start();

    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(
        bench.device_calls(),
        vec![
            Call::Enable(PRIMARY),
            Call::Enable(SECONDARY),
            Call::Disable(SECONDARY),
        ]
    );
    assert_eq!(err.errno(), -116);
    assert_eq!(sequencer.phase(), Phase::Disabling);
    assert_eq!(sequencer.cycles(), 0);
}

#[test]
fn primary_disable_fault_consults_flags() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .disable_results([Ok(()), Err(ErrorCode::EINVAL)])
        .flags(Ok(ErrorFlags::OVER_TEMP));
    bench.install(primary);
    let mut sequencer = bench.start();

    sequencer.cycle(&mut bench.sink).unwrap();
    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(sequencer.cycles(), 1);
    assert_eq!(
        err,
        SequencerError::ConfigurationFault {
            identifier: label(PRIMARY).unwrap(),
            operation: Operation::Disable,
            flags: ErrorFlags::OVER_TEMP,
        }
    );
    let tail: Vec<Call> = bench.device_calls().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![Call::ReadFlags(PRIMARY), Call::Disable(PRIMARY)]);
}

#[test]
fn unreadable_flags_report_both_failures() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Err(ErrorCode::EINVAL)])
        .flags(Err(ErrorCode::EIO));
    bench.install(primary);
    let mut sequencer = bench.start();

    let err = sequencer.cycle(&mut bench.sink).unwrap_err();

    assert_eq!(
        err,
        SequencerError::FaultFlagsUnavailable {
            identifier: label(PRIMARY).unwrap(),
            operation: Operation::Enable,
            read_error: ErrorCode::EIO,
        }
    );
    assert_eq!(err.errno(), -22);
    let report = &faults(&bench)[0];
    assert_eq!(report.code, ErrorCode::EINVAL);
    assert_eq!(report.flags, FlagReadout::Unavailable(ErrorCode::EIO));
    assert_eq!(
        bench
            .device_calls()
            .iter()
            .filter(|c| **c == Call::ReadFlags(PRIMARY))
            .count(),
        1,
        "flag read is never retried"
    );
}

#[test]
fn halted_sequencer_makes_no_further_calls() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Err(ErrorCode::EIO)]);
    bench.install(primary);
    let mut sequencer = bench.start();

    let first = sequencer.cycle(&mut bench.sink).unwrap_err();
    assert!(sequencer.is_halted());
    assert_eq!(sequencer.phase(), Phase::Enabling);
    bench.clear();

    for _ in 0..5 {
        assert_eq!(sequencer.cycle(&mut bench.sink).unwrap_err(), first);
    }
    assert!(bench.calls().is_empty(), "latched halt is silent");
}

#[test]
fn run_returns_the_first_failure() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Ok(()), Ok(()), Err(ErrorCode::ENODEV)]);
    bench.install(primary);
    let mut sequencer = bench.start();

    let Err(err) = sequencer.run(&mut bench.sink);

    assert_eq!(sequencer.cycles(), 2);
    assert_eq!(err.errno(), -19);
    assert_eq!(faults(&bench).len(), 1);
    assert!(bench.calls().ends_with(&[
        Call::Enable(PRIMARY),
        Call::Event(SequencerEvent::Fault(faults(&bench)[0].clone())),
    ]));
}

#[test]
fn direct_calls_after_halt_leave_hardware_alone() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .enable_results([Err(ErrorCode::EINVAL)]);
    bench.install(primary);
    let mut sequencer = bench.start();

    let first = sequencer.cycle(&mut bench.sink).unwrap_err();
    assert!(sequencer.is_halted());
    bench.clear();

    assert_eq!(sequencer.enable_all(&mut bench.sink), Err(first.clone()));
    assert_eq!(sequencer.disable_all(&mut bench.sink), Err(first));
    assert!(bench.calls().is_empty(), "halted sequencer drove hardware");
    assert_eq!(sequencer.phase(), Phase::Enabling);
}

#[test]
fn direct_disable_fault_latches() {
    let mut bench = Bench::new();
    let primary = bench
        .regulator(PRIMARY)
        .disable_results([Err(ErrorCode::EIO)]);
    bench.install(primary);
    let mut sequencer = bench.start();

    sequencer.enable_all(&mut bench.sink).unwrap();
    let err = sequencer.disable_all(&mut bench.sink).unwrap_err();

    assert!(sequencer.is_halted());
    assert_eq!(faults(&bench).len(), 1);
    bench.clear();
    assert_eq!(sequencer.cycle(&mut bench.sink), Err(err));
    assert!(bench.calls().is_empty());
}
