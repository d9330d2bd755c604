//! Integration test: full registry lifecycle.
//!
//! 1. Publish sandbox payloads into a static directory
//! 2. Open the service and verify the sandbox bundle
//! 3. Look tokens up by URI and by type+slug
//! 4. Revoke a token, bump the epoch, and reload
//! 5. Publish the catalog

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use rtgf_registry::{RegistryConfig, VerificationRequest, VerificationService};

const RMT: &str = "urn:lane2:token:RMT:EU:PSD3:3.2";
const RRMT: &str = "urn:lane2:token:RRMT:EU:PSD3:3.2";
const IMT: &str = "urn:lane2:token:IMT:EU:SG:2025";
const CORT: &str = "urn:lane2:token:CORT:VODAFONE.VISA:2025";
const PSRT: &str = "urn:lane2:token:PSRT:VISA:ACQ-123";

fn payload(ty: &str, revoked: bool) -> Value {
    json!({
        "type": ty,
        "nbf": "2025-10-01T00:00:00Z",
        "exp": "2026-10-01T00:00:00Z",
        "revoked": revoked,
    })
}

fn publish(dir: &Path, file: &str, body: &Value) {
    std::fs::write(dir.join(file), serde_json::to_vec_pretty(body).unwrap())
        .expect("write payload");
}

fn publish_sandbox(dir: &Path) {
    publish(dir, "rrmt-eu-psd3-2025.json", &payload("RRMT", false));
    publish(dir, "imt-eu-sg-2025.json", &payload("IMT", false));
    publish(dir, "cort-vodafone-visa-2025.json", &payload("CORT", false));
    publish(dir, "psrt-visa-acq-123.json", &payload("PSRT", false));
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap()
}

#[test]
fn full_workflow_publish_verify_revoke_reload() {
    // ── Step 1: Publish ─────────────────────────────────────────────────
    let dir = tempfile::tempdir().expect("tempdir");
    publish_sandbox(dir.path());

    // ── Step 2: Open and verify ─────────────────────────────────────────
    let config = RegistryConfig {
        static_dir: dir.path().to_path_buf(),
        initial_epoch: 7,
        base_url: Some("https://registry.rtgf.test/".into()),
        fixed_time: Some(now()),
        ..RegistryConfig::default()
    };
    let service = VerificationService::open(config).expect("service should open");
    assert_eq!(service.verifier_name(), "structural");

    let request = VerificationRequest::new(RMT, IMT, CORT, PSRT);
    let verdict = service.verify(&request);
    assert!(verdict.valid, "sandbox bundle should verify: {}", verdict.reason);
    assert_eq!(verdict.rev_epoch, 7);

    // The RRMT spelling of the regulatory token verifies too.
    assert!(service.verify(&VerificationRequest::new(RRMT, IMT, CORT, PSRT)).valid);

    // Wire shape.
    assert_eq!(
        serde_json::to_value(&verdict).unwrap(),
        json!({"valid": true, "revEpoch": 7})
    );

    // ── Step 3: Lookups ─────────────────────────────────────────────────
    let by_uri = service.token_by_uri(CORT).expect("cort by uri");
    let by_slug = service
        .token_by_type_slug("Cort", "vodafone-visa-2025")
        .expect("cort by slug");
    assert_eq!(by_uri, by_slug);
    let parsed: Value = serde_json::from_slice(&by_uri).unwrap();
    assert_eq!(parsed["type"], "CORT");

    assert_eq!(
        service.token_by_uri(RMT).unwrap(),
        service.token_by_uri(RRMT).unwrap(),
        "RMT and RRMT share a payload"
    );
    assert!(service.token_by_uri("urn:lane2:token:CORT:NOPE").unwrap_err().is_not_found());

    // ── Step 4: Revoke, bump, reload ────────────────────────────────────
    let before = service.snapshot().snapshot_id().to_string();
    publish(dir.path(), "psrt-visa-acq-123.json", &payload("PSRT", true));

    // The snapshot preloaded payloads; nothing changes until reload.
    assert!(service.verify(&request).valid);

    assert_eq!(service.bump_epoch(), 8);
    let after = service.reload().expect("reload");
    assert_eq!(after, before, "entry metadata did not change");

    let verdict = service.verify(&request);
    assert!(!verdict.valid);
    assert_eq!(verdict.reason, format!("token_revoked:{PSRT}"));
    assert_eq!(verdict.rev_epoch, 8);

    // ── Step 5: Catalog ─────────────────────────────────────────────────
    let catalog = serde_json::to_value(service.catalog()).unwrap();
    assert_eq!(catalog["registrySnapshotId"], before.as_str());
    assert_eq!(catalog["issuers"][0]["iss"], "did:org:rtgf.eu");
    assert_eq!(
        catalog["issuers"][0]["jwks"],
        "https://registry.rtgf.test/jwks.json"
    );
    assert_eq!(catalog["corridors"][0]["id"], "EU:THA:CRAFT-01");
    assert_eq!(
        catalog["corridors"][0]["requiredTokens"],
        json!(["RMT", "IMT", "CORT", "PSRT"])
    );
}

#[test]
fn full_workflow_time_moves_through_the_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_sandbox(dir.path());
    let service = VerificationService::open(RegistryConfig {
        static_dir: dir.path().to_path_buf(),
        ..RegistryConfig::default()
    })
    .expect("service should open");
    let request = VerificationRequest::new(RMT, IMT, CORT, PSRT);

    let early = Utc.with_ymd_and_hms(2025, 9, 30, 23, 59, 59).unwrap();
    assert_eq!(
        service.verify_at(&request, early).reason,
        format!("token_not_yet_valid:{RMT}")
    );
    assert!(service.verify_at(&request, now()).valid);
    let late = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 1).unwrap();
    assert_eq!(
        service.verify_at(&request, late).reason,
        format!("token_expired:{RMT}")
    );
}

#[test]
fn full_workflow_custom_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish(dir.path(), "rmt.json", &payload("RMT", false));
    publish(dir.path(), "imt.json", &payload("IMT", false));
    publish(dir.path(), "cort.json", &payload("CORT", false));
    publish(dir.path(), "psrt.json", &payload("PSRT", false));
    let manifest = json!({
        "version": "test-1",
        "tokens": [
            {"uri": "urn:t:RMT:1", "type": "RMT", "slug": "r1", "content_ref": "rmt.json"},
            {"uri": "urn:t:IMT:1", "type": "IMT", "content_ref": "imt.json"},
            {"uri": "urn:t:CORT:1", "type": "CORT", "slug": "c1", "content_ref": "cort.json",
             "nbf": "2025-10-01T00:00:00Z", "exp": "2026-10-01T00:00:00Z"},
            {"uri": "urn:t:PSRT:1", "type": "PSRT", "slug": "p1", "content_ref": "psrt.json"}
        ]
    });
    let manifest_path = dir.path().join("manifest.json");
    std::fs::write(&manifest_path, manifest.to_string()).expect("write manifest");

    let service = VerificationService::open(RegistryConfig {
        static_dir: dir.path().to_path_buf(),
        manifest: Some(manifest_path),
        ..RegistryConfig::default()
    })
    .expect("service should open");

    assert_eq!(service.snapshot().index().len(), 4);
    assert!(service
        .verify_at(
            &VerificationRequest::new("urn:t:RMT:1", "urn:t:IMT:1", "urn:t:CORT:1", "urn:t:PSRT:1"),
            now()
        )
        .valid);
    assert!(service.token_by_type_slug("psrt", "p1").is_ok());
    // Sandbox URIs are not part of this manifest.
    assert_eq!(
        service.verify_at(&VerificationRequest::new(RMT, IMT, CORT, PSRT), now()).reason,
        format!("metadata_missing:{RMT}")
    );
}

#[test]
fn full_workflow_missing_payload_fails_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish(dir.path(), "rrmt-eu-psd3-2025.json", &payload("RRMT", false));
    let result = VerificationService::open(RegistryConfig {
        static_dir: dir.path().to_path_buf(),
        ..RegistryConfig::default()
    });
    assert!(result.is_err(), "startup must fail when sandbox payloads are missing");
}
