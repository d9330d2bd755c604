//! Integration tests for the CLI binary.
//!
//! Runs `rtgf` against the shipped sandbox fixtures and against scratch
//! directories. Registered as a [[test]] in the rtgf-cli crate so that
//! CARGO_BIN_EXE_rtgf is available.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const RMT: &str = "urn:lane2:token:RMT:EU:PSD3:3.2";
const IMT: &str = "urn:lane2:token:IMT:EU:SG:2025";
const CORT: &str = "urn:lane2:token:CORT:VODAFONE.VISA:2025";
const PSRT: &str = "urn:lane2:token:PSRT:VISA:ACQ-123";

/// Get a Command pointing to the `rtgf` binary, isolated from the caller's
/// registry environment.
fn rtgf_binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rtgf"));
    for var in ["RTGF_STATIC_DIR", "RTGF_URL", "RTGF_INITIAL_EPOCH", "FIXED_TIME"] {
        cmd.env_remove(var);
    }
    cmd
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static/tokens")
}

/// `rtgf --static-dir <fixtures> --fixed-time 2025-12-01T00:00:00Z <args>`
fn run_sandbox(args: &[&str]) -> Output {
    rtgf_binary()
        .arg("--static-dir")
        .arg(fixtures())
        .args(["--fixed-time", "2025-12-01T00:00:00Z"])
        .args(args)
        .output()
        .expect("failed to execute rtgf")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_responds_to_help() {
    let output = rtgf_binary()
        .arg("--help")
        .output()
        .expect("failed to execute rtgf --help");

    assert!(
        output.status.success(),
        "rtgf --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("Usage"), "got: {text}");
    assert!(text.contains("verify"), "got: {text}");
}

#[test]
fn cli_responds_to_version() {
    let output = rtgf_binary()
        .arg("--version")
        .output()
        .expect("failed to execute rtgf --version");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains(env!("CARGO_PKG_VERSION")), "got: {text}");
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = rtgf_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute rtgf");

    assert!(!output.status.success());
}

#[test]
fn cli_check_reports_sandbox() {
    let output = run_sandbox(&["--verifier", "ed25519", "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("Registry OK"));
    assert!(text.contains("Tokens:     5"), "got: {text}");
    assert!(text.contains("Verifier:   ed25519"), "got: {text}");
    assert!(text.contains("JWKS keys:  1"), "got: {text}");
}

#[test]
fn cli_verify_sandbox_bundle() {
    let output = run_sandbox(&[
        "--verifier", "ed25519", "verify", "--rmt", RMT, "--imt", IMT, "--cort", CORT, "--psrt",
        PSRT,
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout(&output).trim(), "VALID (revEpoch 1)");
}

#[test]
fn cli_verify_json_reports_missing_token() {
    let output = run_sandbox(&["verify", "--rmt", RMT, "--imt", IMT, "--cort", CORT, "--json"]);
    assert!(!output.status.success(), "a rejected verdict exits non-zero");
    let verdict: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("verdict should be JSON");
    assert_eq!(verdict["valid"], false);
    assert_eq!(verdict["reason"], "missing_psrt");
    assert_eq!(verdict["revEpoch"], 1);
}

#[test]
fn cli_verify_reads_request_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let request = dir.path().join("request.json");
    let body = serde_json::json!({
        "tokens": {"rmt": RMT, "imt": IMT, "cort": "urn:lane2:token:CORT:UNKNOWN", "psrt": PSRT}
    });
    std::fs::write(&request, body.to_string()).unwrap();

    let output = run_sandbox(&["verify", "--request", request.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        stdout(&output).starts_with("REJECTED: metadata_missing:urn:lane2:token:CORT:UNKNOWN"),
        "got: {}",
        stdout(&output)
    );
}

#[test]
fn cli_lookup_and_token_agree() {
    let by_uri = run_sandbox(&["token", CORT]);
    let by_slug = run_sandbox(&["lookup", "cort", "vodafone-visa-2025"]);
    assert!(by_uri.status.success());
    assert!(by_slug.status.success());
    assert_eq!(by_uri.stdout, by_slug.stdout);

    let traversal = run_sandbox(&["lookup", "cort", "../jwks"]);
    assert!(!traversal.status.success());
}

#[test]
fn cli_catalog_lists_default_corridor() {
    let output = run_sandbox(&["catalog"]);
    assert!(output.status.success());
    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["corridors"][0]["id"], "EU:THA:CRAFT-01");
    assert!(catalog["registrySnapshotId"]
        .as_str()
        .unwrap()
        .starts_with("sha256:"));
}

#[test]
fn cli_keygen_and_seal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let secret = dir.path().join("issuer.key");

    let keygen = rtgf_binary()
        .args(["keygen", "--kid", "test-1", "--secret-file"])
        .arg(&secret)
        .output()
        .expect("failed to execute rtgf keygen");
    assert!(keygen.status.success());
    let jwks: serde_json::Value = serde_json::from_slice(&keygen.stdout).unwrap();
    assert_eq!(jwks["keys"][0]["kid"], "test-1");
    assert_eq!(jwks["keys"][0]["kty"], "OKP");

    // Refuses to overwrite an existing secret.
    let again = rtgf_binary()
        .args(["keygen", "--kid", "test-2", "--secret-file"])
        .arg(&secret)
        .output()
        .unwrap();
    assert!(!again.status.success());

    let payload = dir.path().join("psrt.json");
    std::fs::write(&payload, r#"{"type":"PSRT","exp":"2026-01-01T00:00:00Z"}"#).unwrap();
    let seal = rtgf_binary()
        .arg("seal")
        .arg(&payload)
        .args(["--kid", "test-1", "--secret-file"])
        .arg(&secret)
        .output()
        .expect("failed to execute rtgf seal");
    assert!(seal.status.success());
    let sealed: serde_json::Value = serde_json::from_slice(&seal.stdout).unwrap();
    assert_eq!(sealed["type"], "PSRT");
    assert_eq!(sealed["proof"]["kid"], "test-1");
    assert!(sealed["proof"]["sig"].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn cli_fails_cleanly_on_missing_static_dir() {
    let output = rtgf_binary()
        .args(["--static-dir", "/nonexistent/rtgf/tokens", "check"])
        .output()
        .expect("failed to execute rtgf");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
