//! In-process stand-in for the SecureSBOM service.
//!
//! "Signs" a document by attaching a SHA-256 over the key ID and the compact
//! JSON of the unsigned document, and verifies by recomputing it.

#![allow(dead_code)]

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test_api_key";
pub const PUBLIC_KEY_PEM: &str =
    "-----BEGIN PUBLIC KEY-----\nMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE\n-----END PUBLIC KEY-----\n";

/// The key ID in `/v1/keys/{id}/...`.
fn key_id(request: &Request) -> String {
    request
        .url
        .path_segments()
        .and_then(|mut segments| segments.nth(2))
        .unwrap_or_default()
        .to_string()
}

fn digest(key_id: &str, unsigned: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key_id.as_bytes());
    hasher.update(unsigned.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Attach a signature to `document` the way the fake service does.
pub fn sign_document(key_id: &str, document: &Value) -> Value {
    let mut signed = document.clone();
    if let Some(object) = signed.as_object_mut() {
        object.remove("signature");
        let value = digest(key_id, &Value::Object(object.clone()));
        object.insert(
            "signature".to_string(),
            json!({"algorithm": "SHA256", "value": value}),
        );
    }
    signed
}

fn verify_document(key_id: &str, document: &Value) -> bool {
    let Some(object) = document.as_object() else {
        return false;
    };
    let Some(value) = object
        .get("signature")
        .and_then(|s| s.get("value"))
        .and_then(Value::as_str)
    else {
        return false;
    };
    let mut unsigned = object.clone();
    unsigned.remove("signature");
    digest(key_id, &Value::Object(unsigned)) == value
}

fn verify_response(key_id: &str, valid: bool) -> ResponseTemplate {
    let message = if valid {
        "signature verified"
    } else {
        "signature does not match document"
    };
    ResponseTemplate::new(200).set_body_json(json!({
        "valid": valid,
        "message": message,
        "key_id": key_id,
        "algorithm": "SHA256",
        "timestamp": "2025-01-01T00:00:00Z"
    }))
}

struct SignResponder;

impl Respond for SignResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match serde_json::from_slice::<Value>(&request.body) {
            Ok(document) => {
                ResponseTemplate::new(200).set_body_json(sign_document(&key_id(request), &document))
            }
            Err(_) => ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "invalid_sbom", "message": "body is not JSON"}
            })),
        }
    }
}

struct VerifyResponder;

impl Respond for VerifyResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let key_id = key_id(request);
        let document: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        verify_response(&key_id, verify_document(&key_id, &document))
    }
}

/// SPDX verification: the detached signature must equal what the service
/// would have attached to the document.
struct SpdxVerifyResponder;

impl Respond for SpdxVerifyResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let key_id = key_id(request);
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let signature = body["signature"].as_str().unwrap_or_default();
        let valid = digest(&key_id, &body["sbom"]) == signature;
        verify_response(&key_id, valid)
    }
}

/// Start a mock server that behaves like a healthy SecureSBOM service.
pub async fn signing_service() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                {"id": "key-123", "created_at": "2025-01-02T03:04:05Z", "algorithm": "ES256"},
                {"id": "key-456", "created_at": "2025-02-03T04:05:06Z"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "key-new",
            "created_at": "2025-03-01T00:00:00Z",
            "algorithm": "ES256",
            "public_key": PUBLIC_KEY_PEM
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/keys/[^/]+/public\.pem$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-pem-file")
                .set_body_string(PUBLIC_KEY_PEM),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/keys/[^/]+/sign$"))
        .respond_with(SignResponder)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/keys/[^/]+/verify$"))
        .respond_with(VerifyResponder)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/keys/[^/]+/verify/spdx$"))
        .respond_with(SpdxVerifyResponder)
        .mount(&server)
        .await;

    server
}

/// Detached signature the fake service accepts for an SPDX document.
pub fn spdx_signature(key_id: &str, document: &Value) -> String {
    digest(key_id, document)
}

pub fn sample_sbom() -> Value {
    json!({"name": "example", "version": "1.0"})
}
