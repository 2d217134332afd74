use std::sync::mpsc::channel;
use std::time::Duration;

use alloc_rate_meter::{
    estimate, AllocationRateMeter, MeterConfig, RateEstimator, Snapshot, Strategy,
};

fn snapshot(timestamp_ms: u64, heap_used: u64, gc_cycles: u64, threads: Option<u128>) -> Snapshot {
    Snapshot {
        timestamp_ms,
        heap_used,
        gc_cycles,
        thread_allocated_total: threads,
    }
}

#[test]
fn heap_growth_without_collection() {
    let tick1 = snapshot(0, 100, 0, None);
    let tick2 = snapshot(1_000, 1_100, 0, None);

    assert_eq!(Some(1_000), estimate(Some(&tick1), &tick2));
}

#[test]
fn collection_without_thread_totals_is_skipped() {
    let tick1 = snapshot(0, 1_100, 0, None);
    let tick2 = snapshot(1_000, 100, 1, None);

    assert_eq!(None, estimate(Some(&tick1), &tick2));
}

#[test]
fn collection_with_thread_totals() {
    let tick1 = snapshot(0, 1_100, 0, Some(5_000));
    let tick2 = snapshot(500, 100, 1, Some(5_800));

    let result = RateEstimator::evaluate(Some(&tick1), &tick2).unwrap();

    assert_eq!(1_600, result.rate);
    assert_eq!(Strategy::ThreadAllocated, result.strategy);
}

#[test]
fn monotonic_sequence_yields_non_negative_rates() {
    let ticks: Vec<Snapshot> = (0..10u64)
        .map(|i| snapshot(i * 250 + 7, 1_000 + i * i * 4_096, 12, Some(i as u128 * 10)))
        .collect();

    let mut previous: Option<&Snapshot> = None;
    let mut rates = Vec::new();
    for tick in &ticks {
        if let Some(rate) = estimate(previous, tick) {
            rates.push(rate);
        }
        previous = Some(tick);
    }

    assert_eq!(ticks.len() - 1, rates.len());
    assert!(rates.iter().all(|rate| *rate >= 0));
}

#[cfg(feature = "process-stats")]
#[test]
fn process_meter_runs_until_terminated() {
    use alloc_rate_meter::{MeterState, ProcessStatsProvider};

    let (tx, rx) = channel();
    let mut meter = AllocationRateMeter::with_config(
        ProcessStatsProvider::new().expect("current process"),
        MeterConfig::with_interval_ms(20),
        move |rate| {
            let _ = tx.send(rate);
        },
    )
    .expect("valid config");
    meter.start().expect("meter started");
    assert_eq!(MeterState::Running, meter.state());

    // resident memory may shrink between ticks, which skips them
    let mut ballast = Vec::new();
    for _ in 0..20 {
        ballast.push(vec![1u8; 1 << 20]);
        std::thread::sleep(Duration::from_millis(5));
    }
    let _ = rx.recv_timeout(Duration::from_millis(200));

    meter.terminate();
    meter.join();
    drop(ballast);
}

#[test]
fn dropping_the_meter_stops_sampling() {
    use alloc_rate_meter::{Result, RuntimeStatsProvider};

    struct Counting(u64);

    impl RuntimeStatsProvider for Counting {
        fn heap_used(&mut self) -> Result<u64> {
            self.0 += 1;
            Ok(self.0)
        }

        fn gc_cycles(&mut self) -> Result<u64> {
            Ok(0)
        }

        fn thread_allocated_bytes(&mut self) -> Result<Option<Vec<u64>>> {
            Ok(None)
        }
    }

    let (tx, rx) = channel();
    let mut meter = AllocationRateMeter::with_config(
        Counting(0),
        MeterConfig::with_interval_ms(5),
        move |rate| {
            let _ = tx.send(rate);
        },
    )
    .unwrap();
    meter.start().unwrap();
    rx.recv_timeout(Duration::from_secs(5)).expect("first rate");

    drop(meter);

    // the sender lives in the callback, so the channel closes once the thread exits
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(_) => assert!(std::time::Instant::now() < deadline, "meter kept running"),
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                assert!(std::time::Instant::now() < deadline, "meter kept running")
            }
        }
    }
}
