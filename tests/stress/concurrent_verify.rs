//! Stress test: many threads verifying through one shared service while
//! the revocation epoch moves underneath them.

use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use serde_json::json;

use rtgf_registry::{
    MemoryContentStore, RegistryConfig, RegistryIndex, RegistrySnapshot, TokenEntry, TokenType,
    VerificationRequest, VerificationService, VerifierMode,
};

const RMT: &str = "urn:lane2:token:RMT:EU:PSD3:3.2";
const IMT: &str = "urn:lane2:token:IMT:EU:SG:2025";
const CORT: &str = "urn:lane2:token:CORT:VODAFONE.VISA:2025";
const PSRT: &str = "urn:lane2:token:PSRT:VISA:ACQ-123";
const REVOKED_PSRT: &str = "urn:lane2:token:PSRT:VISA:ACQ-999";

fn service() -> VerificationService {
    let body = |ty: &str, revoked: bool| {
        json!({"type": ty, "nbf": "2025-10-01T00:00:00Z", "exp": "2026-10-01T00:00:00Z", "revoked": revoked})
            .to_string()
    };
    let store = MemoryContentStore::new()
        .with("rmt.json", body("RRMT", false))
        .with("imt.json", body("IMT", false))
        .with("cort.json", body("CORT", false))
        .with("psrt.json", body("PSRT", false))
        .with("psrt-revoked.json", body("PSRT", true));
    let index = RegistryIndex::build([
        TokenEntry::new(RMT, TokenType::Rmt, "rmt.json"),
        TokenEntry::new(IMT, TokenType::Imt, "imt.json"),
        TokenEntry::new(CORT, TokenType::Cort, "cort.json"),
        TokenEntry::new(PSRT, TokenType::Psrt, "psrt.json"),
        TokenEntry::new(REVOKED_PSRT, TokenType::Psrt, "psrt-revoked.json"),
    ])
    .expect("index should build");

    VerificationService::from_parts(
        RegistryConfig::default(),
        RegistrySnapshot::new(index, Arc::new(store)),
        VerifierMode::Structural,
        json!({"keys": []}),
    )
}

#[test]
fn stress_parallel_verification_is_consistent() {
    let service = Arc::new(service());
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let good = VerificationRequest::new(RMT, IMT, CORT, PSRT);
                let revoked = VerificationRequest::new(RMT, IMT, CORT, REVOKED_PSRT);
                let mut last_epoch = 0;
                for i in 0..500 {
                    let verdict = if i % 2 == 0 {
                        service.verify_at(&good, now)
                    } else {
                        service.verify_at(&revoked, now)
                    };
                    if i % 2 == 0 {
                        assert!(verdict.valid, "thread {t} iteration {i}: {}", verdict.reason);
                    } else {
                        assert_eq!(verdict.reason, format!("token_revoked:{REVOKED_PSRT}"));
                    }
                    assert!(verdict.rev_epoch >= last_epoch);
                    last_epoch = verdict.rev_epoch;
                }
            })
        })
        .collect();

    let bumper = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            for _ in 0..250 {
                service.bump_epoch();
            }
        })
    };

    for h in handles {
        h.join().expect("verifier thread panicked");
    }
    bumper.join().expect("bumper panicked");
    assert_eq!(service.read_epoch(), 251);
}

#[test]
fn stress_verdicts_are_idempotent() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
    let request = VerificationRequest::new(RMT, IMT, CORT, PSRT);

    let first = service.verify_at(&request, now);
    for _ in 0..1_000 {
        assert_eq!(service.verify_at(&request, now), first);
    }
}
