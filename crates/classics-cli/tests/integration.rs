//! Integration tests for CLI commands.

use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const HELLO_CID: &str = "bafyreidykglsfhoixmivffc5uwhcgshx4j465xwqntbmu43nb2dzqwfvae";
const HELLO_BINARY: &str = "oWVoZWxsb2V3b3JsZA==";
const NULL_CID: &str = "bafyreifqwkmiw256ojf2zws6tzjeonw6bpd5vza4i22ccpcq4hjv2ts7cm";
const SEED_B64: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
const SEED_ADDRESS: &str = "AOQQPP7TZYIL4HLQ3UMOOS6ATFT6JVRQTOSQ2XY53SDGIESVGG4MPFYUMQ";

const VEHICLE_ID: &str = "6f1c2a34-9b1e-4c2d-8a77-0e5b3f9d1c42";

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_classics"));
    cmd.current_dir(dir)
        .env_remove("ALGORAND_ALGOD_URL")
        .env_remove("ALGORAND_ALGOD_TOKEN")
        .env_remove("ALGORAND_SIGNING_SEED")
        .env_remove("ALGORAND_NETWORK")
        .env("RUST_LOG", "warn");
    cmd
}

fn run_cli(dir: &Path, args: &[&str]) -> (bool, String, String) {
    let output = command(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

fn vehicle_json() -> serde_json::Value {
    json!({
        "id": VEHICLE_ID,
        "make": "Honda",
        "model": "Civic",
        "year": 2010,
        "chassisNumber": "VIN123456",
        "createdAt": "2024-03-01T12:00:00Z",
        "updatedAt": "2024-03-01T12:00:00Z"
    })
}

fn event_json(vehicle_id: &str) -> serde_json::Value {
    json!({
        "id": "0b7e6a0e-4f53-4d5e-9a11-2f0c6d3e8b10",
        "vehicleId": vehicle_id,
        "type": "car_show",
        "title": "Spring Concours",
        "date": "2024-04-20T10:00:00Z",
        "metadata": { "award": "Best in Class" },
        "createdAt": "2024-04-21T08:00:00Z"
    })
}

/// Config pointing at a port nothing listens on.
fn unreachable_config(dir: &Path) -> String {
    let path = dir.join("classics.toml");
    std::fs::write(
        &path,
        format!(
            "[algod]\nalgod_url = \"http://127.0.0.1:9\"\nsigning_seed_b64 = \"{}\"\ntimeout_secs = 2\n",
            SEED_B64
        ),
    )
    .unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_cid_command() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "hello.json", &json!({ "hello": "world" }));

    let (success, stdout, _) = run_cli(dir.path(), &["cid", &input]);
    assert!(success);
    assert!(stdout.contains(HELLO_CID));
    assert!(stdout.contains(r#"{"hello":"world"}"#));
    assert!(stdout.contains(HELLO_BINARY));
}

#[test]
fn test_cid_json_output() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "hello.json", &json!({ "hello": "world" }));

    let (success, stdout, _) = run_cli(dir.path(), &["cid", &input, "--json"]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["cid"], HELLO_CID);
    assert_eq!(parsed["canonical_binary_b64"], HELLO_BINARY);
    assert_eq!(parsed["canonical_text"], r#"{"hello":"world"}"#);
}

#[test]
fn test_cid_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let mut child = command(dir.path())
        .args(["cid", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"null")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["cid"], NULL_CID);
}

#[test]
fn test_cid_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"make\": ").unwrap();

    let (success, _, stderr) = run_cli(dir.path(), &["cid", path.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Invalid JSON"));
}

#[test]
fn test_verify_command() {
    let dir = TempDir::new().unwrap();
    let (success, stdout, _) = run_cli(
        dir.path(),
        &["verify", "--cid", HELLO_CID, "--binary", HELLO_BINARY],
    );
    assert!(success);
    assert!(stdout.contains("OK"));
    assert!(stdout.contains(r#"{"hello":"world"}"#));
}

#[test]
fn test_verify_detects_mismatch() {
    let dir = TempDir::new().unwrap();
    let (success, _, stderr) = run_cli(
        dir.path(),
        &["verify", "--cid", NULL_CID, "--binary", HELLO_BINARY],
    );
    assert!(!success);
    assert!(stderr.contains("cid mismatch"));
}

#[test]
fn test_verify_detects_text_mismatch() {
    let dir = TempDir::new().unwrap();
    let (success, _, stderr) = run_cli(
        dir.path(),
        &[
            "verify",
            "--cid",
            HELLO_CID,
            "--binary",
            HELLO_BINARY,
            "--text",
            r#"{"hello": "world"}"#,
        ],
    );
    assert!(!success);
    assert!(stderr.contains("canonical text"));
}

#[test]
fn test_note_command() {
    let dir = TempDir::new().unwrap();
    let (success, stdout, _) = run_cli(dir.path(), &["note", "--kind", "genesis", "--cid", HELLO_CID]);
    assert!(success);
    assert_eq!(stdout.trim(), format!("type=genesis|cid={}", HELLO_CID));
}

#[test]
fn test_note_rejects_unknown_kind_and_bad_cid() {
    let dir = TempDir::new().unwrap();
    let (success, _, _) = run_cli(dir.path(), &["note", "--kind", "transfer", "--cid", HELLO_CID]);
    assert!(!success);

    let (success, _, _) = run_cli(dir.path(), &["note", "--kind", "new_event", "--cid", "Qm123"]);
    assert!(!success);
}

#[test]
fn test_genesis_requires_algod_config() {
    let dir = TempDir::new().unwrap();
    let vehicle = write_json(dir.path(), "vehicle.json", &vehicle_json());
    let before = std::fs::read_to_string(&vehicle).unwrap();

    let (success, _, stderr) = run_cli(dir.path(), &["genesis", "--vehicle", &vehicle]);
    assert!(!success);
    assert!(stderr.contains("algod URL is required"));
    assert_eq!(std::fs::read_to_string(&vehicle).unwrap(), before);
}

#[test]
fn test_genesis_with_unreachable_algod_leaves_vehicle_untouched() {
    let dir = TempDir::new().unwrap();
    let config = unreachable_config(dir.path());
    let vehicle = write_json(dir.path(), "vehicle.json", &vehicle_json());
    let before = std::fs::read_to_string(&vehicle).unwrap();

    let (success, _, stderr) = run_cli(
        dir.path(),
        &["--config", &config, "genesis", "--vehicle", &vehicle],
    );
    assert!(!success);
    assert!(stderr.contains("Error"));
    assert_eq!(std::fs::read_to_string(&vehicle).unwrap(), before);
}

#[test]
fn test_anchor_event_rejects_foreign_event() {
    let dir = TempDir::new().unwrap();
    let vehicle = write_json(dir.path(), "vehicle.json", &vehicle_json());
    let event = write_json(
        dir.path(),
        "event.json",
        &event_json("00000000-0000-0000-0000-000000000001"),
    );

    let (success, _, stderr) = run_cli(
        dir.path(),
        &["anchor-event", "--vehicle", &vehicle, "--event", &event],
    );
    assert!(!success);
    assert!(stderr.contains("belongs to vehicle"));
}

#[test]
fn test_anchor_event_rejects_anchored_event() {
    let dir = TempDir::new().unwrap();
    let vehicle = write_json(dir.path(), "vehicle.json", &vehicle_json());
    let mut anchored = event_json(VEHICLE_ID);
    anchored["blockchainTxId"] = json!("4ZREPIZQ2LVM7C7D4WTL7PIT3TKY5KK7CEYD74OGMMIRFVTCGVZQ");
    let event = write_json(dir.path(), "event.json", &anchored);

    let (success, _, stderr) = run_cli(
        dir.path(),
        &["anchor-event", "--vehicle", &vehicle, "--event", &event],
    );
    assert!(!success);
    assert!(stderr.contains("already anchored"));
}

#[test]
fn test_status_reports_address_then_fails_offline() {
    let dir = TempDir::new().unwrap();
    unreachable_config(dir.path());

    // classics.toml in the working directory is picked up without --config.
    let (success, stdout, stderr) = run_cli(dir.path(), &["status"]);
    assert!(!success);
    assert!(stdout.contains(SEED_ADDRESS));
    assert!(stderr.contains("unreachable"));
}

#[test]
fn test_env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let output = command(dir.path())
        .env("ALGORAND_ALGOD_URL", "http://127.0.0.1:9")
        .env("ALGORAND_SIGNING_SEED", SEED_B64)
        .arg("status")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("http://127.0.0.1:9"));
    assert!(stdout.contains(SEED_ADDRESS));
}
