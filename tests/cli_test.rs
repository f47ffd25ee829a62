//! End-to-end tests for the `sign`, `verify` and `keymgmt` binaries.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bin(name: &str, server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    cmd.env("SECURE_SBOM_API_KEY", common::API_KEY)
        .env("SECURE_SBOM_BASE_URL", server.uri())
        .env_remove("SECURE_SBOM_LOG");
    cmd
}

fn write_sbom(dir: &TempDir) -> String {
    let path = dir.path().join("sbom.json");
    std::fs::write(&path, common::sample_sbom().to_string()).unwrap();
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_then_verify() {
    let server = common::signing_service().await;
    let dir = TempDir::new().unwrap();
    let sbom = write_sbom(&dir);
    let signed = path_str(&dir.path().join("signed.json"));

    bin("sign", &server)
        .args(["-key-id", "key-123", "-sbom", &sbom, "-output", &signed])
        .assert()
        .success()
        .stderr(predicate::str::contains("SBOM successfully signed"));

    let contents = std::fs::read_to_string(&signed).unwrap();
    assert!(contents.contains("\n  \"signature\""), "not indented: {contents}");
    let document: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(document["signature"]["algorithm"], "SHA256");

    // The flag wins over the environment.
    bin("verify", &server)
        .env("SECURE_SBOM_BASE_URL", "http://127.0.0.1:9")
        .args(["-key-id", "key-123", "-sbom", &signed, "-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("SBOM signature is VALID"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_reads_stdin_and_writes_stdout() {
    let server = common::signing_service().await;

    let output = bin("sign", &server)
        .args(["-key-id", "key-123", "-quiet"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .stdout
        .clone();

    let document: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(document["name"], "example");
    assert!(document["signature"]["value"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_tampered_document_fails() {
    let server = common::signing_service().await;
    let dir = TempDir::new().unwrap();

    let mut document = common::sign_document("key-123", &common::sample_sbom());
    document["version"] = Value::from("9.9");
    let tampered = dir.path().join("tampered.json");
    std::fs::write(&tampered, document.to_string()).unwrap();

    bin("verify", &server)
        .args(["-key-id", "key-123", "-sbom", &path_str(&tampered)])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SBOM signature is INVALID"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_json_output() {
    let server = common::signing_service().await;
    let signed = common::sign_document("key-123", &common::sample_sbom());

    let output = bin("verify", &server)
        .args(["-key-id", "key-123", "-output", "json", "-quiet"])
        .write_stdin(signed.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let result: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["valid"], true);
    assert_eq!(result["status"], "VALID");
    assert_eq!(result["timestamp"], "2025-01-01T00:00:00Z");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_spdx_with_detached_signature() {
    let server = common::signing_service().await;
    let sbom = serde_json::json!({"spdxVersion": "SPDX-2.3", "name": "example"});
    let signature = common::spdx_signature("key-123", &sbom);

    bin("verify", &server)
        .args(["-key-id", "key-123", "-signature", &signature])
        .write_stdin(sbom.to_string())
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_key_id_is_usage_error() {
    let server = common::signing_service().await;

    bin("sign", &server)
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--key-id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_api_key_fails() {
    let server = common::signing_service().await;

    bin("sign", &server)
        .env_remove("SECURE_SBOM_API_KEY")
        .args(["-key-id", "key-123"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("API key is required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_sbom_fails() {
    let server = common::signing_service().await;

    bin("sign", &server)
        .args(["-key-id", "key-123"])
        .write_stdin("this is not json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid SBOM"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_retries_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    bin("sign", &server)
        .args(["-key-id", "key-123", "-retries", "0"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("503"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_list_table() {
    let server = common::signing_service().await;

    bin("keymgmt", &server)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("key-123   2025-01-02 03:04   ES256"))
        .stdout(predicate::str::contains("default"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_list_json() {
    let server = common::signing_service().await;

    let output = bin("keymgmt", &server)
        .args(["list", "-output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let list: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(list["keys"].as_array().map(Vec::len), Some(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_generate_saves_public_key() {
    let server = common::signing_service().await;
    let dir = TempDir::new().unwrap();
    let pem = dir.path().join("out.pem");

    bin("keymgmt", &server)
        .args(["generate", "-save-public", &path_str(&pem)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key ID:     key-new"));

    assert_eq!(std::fs::read(&pem).unwrap(), common::PUBLIC_KEY_PEM.as_bytes());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_public_prints_pem_verbatim() {
    let server = common::signing_service().await;

    bin("keymgmt", &server)
        .args(["public", "key-123"])
        .assert()
        .success()
        .stdout(common::PUBLIC_KEY_PEM);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_requires_subcommand() {
    let server = common::signing_service().await;

    bin("keymgmt", &server).assert().code(1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_huge_timeout_is_rejected_without_panicking() {
    let server = common::signing_service().await;

    bin("sign", &server)
        .args(["-key-id", "key-123", "-timeout", "18446744073709551615"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_large_timeout_still_signs() {
    let server = common::signing_service().await;

    bin("sign", &server)
        .args(["-key-id", "key-123", "-timeout", "1000000h", "-quiet"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keymgmt_reports_progress_unless_quiet() {
    let server = common::signing_service().await;

    bin("keymgmt", &server)
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("Retrieving keys from SecureSBOM..."));

    bin("keymgmt", &server)
        .args(["public", "key-123"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Retrieving public key for key-123..."));

    bin("keymgmt", &server)
        .args(["list", "-quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dash_prefixed_key_id_is_kept() {
    let server = common::signing_service().await;

    let output = bin("sign", &server)
        .args(["-key-id", "-k1", "-quiet"])
        .write_stdin(common::sample_sbom().to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(document, common::sign_document("-k1", &common::sample_sbom()));
}
