//! Stress test: registry reloads racing in-flight verifications.
//!
//! Every verification pins one snapshot, so a request evaluated while the
//! manifest flips between two versions must see one version or the other,
//! never a mix.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use serde_json::json;

use rtgf_registry::{RegistryConfig, VerificationRequest, VerificationService};

const RMT: &str = "urn:lane2:token:RMT:EU:PSD3:3.2";
const IMT: &str = "urn:lane2:token:IMT:EU:SG:2025";
const CORT: &str = "urn:lane2:token:CORT:VODAFONE.VISA:2025";
const PSRT: &str = "urn:lane2:token:PSRT:VISA:ACQ-123";

fn write_payload(dir: &Path, file: &str, ty: &str) {
    let body = json!({"type": ty, "nbf": "2025-10-01T00:00:00Z", "exp": "2026-10-01T00:00:00Z"});
    std::fs::write(dir.join(file), body.to_string()).expect("write payload");
}

/// Manifest whose PSRT entry points at `psrt_file`.
fn write_manifest(dir: &Path, psrt_file: &str) {
    let entry = |uri: &str, ty: &str, slug: &str, file: &str| {
        json!({"uri": uri, "type": ty, "slug": slug, "content_ref": file})
    };
    let manifest = json!({
        "version": psrt_file,
        "tokens": [
            entry(RMT, "RMT", "eu-psd3-2025", "rmt.json"),
            entry(IMT, "IMT", "eu-sg-2025", "imt.json"),
            entry(CORT, "CORT", "vodafone-visa-2025", "cort.json"),
            entry(PSRT, "PSRT", "visa-acq-123", psrt_file),
        ]
    });
    let tmp = dir.join("manifest.json.tmp");
    std::fs::write(&tmp, manifest.to_string()).expect("write manifest");
    std::fs::rename(&tmp, dir.join("manifest.json")).expect("replace manifest");
}

fn open(dir: &Path) -> VerificationService {
    write_payload(dir, "rmt.json", "RRMT");
    write_payload(dir, "imt.json", "IMT");
    write_payload(dir, "cort.json", "CORT");
    write_payload(dir, "psrt-good.json", "PSRT");
    // Wrong discriminator: verifies as invalid_psrt.
    write_payload(dir, "psrt-bad.json", "CORT");
    write_manifest(dir, "psrt-good.json");

    let config = RegistryConfig {
        static_dir: dir.to_path_buf(),
        manifest: Some(dir.join("manifest.json")),
        ..RegistryConfig::default()
    };
    VerificationService::open(config).expect("service should open")
}

#[test]
fn stress_reload_while_verifying() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = Arc::new(open(dir.path()));
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..6)
        .map(|_| {
            let service = Arc::clone(&service);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let request = VerificationRequest::new(RMT, IMT, CORT, PSRT);
                let (mut accepted, mut rejected) = (0u32, 0u32);
                while !done.load(Ordering::Acquire) {
                    let verdict = service.verify_at(&request, now);
                    if verdict.valid {
                        accepted += 1;
                    } else {
                        assert_eq!(verdict.reason, "invalid_psrt");
                        rejected += 1;
                    }
                }
                (accepted, rejected)
            })
        })
        .collect();

    let mut ids = std::collections::HashSet::new();
    for i in 0..100 {
        let file = if i % 2 == 0 { "psrt-bad.json" } else { "psrt-good.json" };
        write_manifest(dir.path(), file);
        ids.insert(service.reload().expect("reload should succeed"));
    }
    done.store(true, Ordering::Release);

    let total: u32 = readers
        .into_iter()
        .map(|r| {
            let (a, b) = r.join().expect("reader panicked");
            a + b
        })
        .sum();
    assert!(total > 0);
    assert_eq!(ids.len(), 2, "two manifests, two snapshot ids");

    // Last write was the good manifest.
    assert!(service.verify_at(&VerificationRequest::new(RMT, IMT, CORT, PSRT), now).valid);
}

#[test]
fn stress_failed_reloads_keep_serving() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = open(dir.path());
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
    let request = VerificationRequest::new(RMT, IMT, CORT, PSRT);
    let first = service.snapshot().snapshot_id().to_string();

    for _ in 0..50 {
        std::fs::write(dir.path().join("manifest.json"), b"{ not json").expect("corrupt manifest");
        assert!(service.reload().is_err());
        assert_eq!(service.snapshot().snapshot_id(), first);
        assert!(service.verify_at(&request, now).valid);
    }

    write_manifest(dir.path(), "psrt-good.json");
    assert_eq!(service.reload().expect("reload"), first);
}
