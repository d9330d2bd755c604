//! Stress test: the revocation epoch under concurrent bumps and reads.

use std::sync::Arc;
use std::thread;

use rtgf_registry::RevocationEpoch;

#[test]
fn stress_concurrent_bumps_are_never_lost() {
    const THREADS: u64 = 16;
    const BUMPS: u64 = 500;

    let epoch = Arc::new(RevocationEpoch::new(100));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let epoch = Arc::clone(&epoch);
            thread::spawn(move || {
                let mut seen = Vec::with_capacity(BUMPS as usize);
                for _ in 0..BUMPS {
                    seen.push(epoch.bump());
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("bump thread panicked"))
        .collect();

    assert_eq!(epoch.read(), 100 + THREADS * BUMPS);

    // Every bump returned a distinct value in (100, 100 + N].
    all.sort_unstable();
    let expected: Vec<u64> = (101..=100 + THREADS * BUMPS).collect();
    assert_eq!(all, expected);
}

#[test]
fn stress_readers_observe_monotonic_epoch() {
    let epoch = Arc::new(RevocationEpoch::default());

    let writer = {
        let epoch = Arc::clone(&epoch);
        thread::spawn(move || {
            for _ in 0..2_000 {
                epoch.bump();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let epoch = Arc::clone(&epoch);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..5_000 {
                    let now = epoch.read();
                    assert!(now >= last, "reader {i} saw epoch go back from {last} to {now}");
                    last = now;
                }
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for r in readers {
        r.join().expect("reader panicked");
    }
    assert_eq!(epoch.read(), 2_001);
}
