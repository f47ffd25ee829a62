//! Type definitions for the SecureSBOM SDK.
//!
//! This module contains the response types returned by the SDK. All of
//! them are plain data and are never mutated after decoding.

use serde::{Deserialize, Serialize};

/// A signing key as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyInfo {
    /// Unique key identifier.
    #[serde(alias = "key_id")]
    pub id: String,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Signature algorithm (e.g., "ES256").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// Response from listing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyList {
    /// Keys available to the API key.
    #[serde(default)]
    pub keys: Vec<KeyInfo>,
}

/// A freshly generated signing key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedKey {
    /// Unique key identifier.
    #[serde(alias = "key_id")]
    pub id: String,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Signature algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// PEM-encoded public key.
    #[serde(default)]
    pub public_key: String,
}

/// A signed SBOM, exactly as returned by the service.
///
/// CycloneDX documents carry their signature inline, so the signed result is
/// the full document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SignResult(serde_json::Value);

impl SignResult {
    pub(crate) fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    /// The signed document.
    pub fn document(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume the result and return the signed document.
    pub fn into_document(self) -> serde_json::Value {
        self.0
    }

    /// The embedded signature value, when the document has one.
    ///
    /// Looks for `signature.value`, or a plain string `signature`.
    pub fn signature_value(&self) -> Option<&str> {
        let signature = self.0.get("signature")?;
        signature
            .get("value")
            .and_then(|v| v.as_str())
            .or_else(|| signature.as_str())
    }

    /// The embedded signature algorithm, when present.
    pub fn signature_algorithm(&self) -> Option<&str> {
        self.0
            .get("signature")
            .and_then(|s| s.get("algorithm"))
            .and_then(|v| v.as_str())
    }
}

/// Outcome of verifying a signed SBOM.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifyResult {
    /// Whether the signature matched the document.
    pub valid: bool,
    /// Service message explaining the outcome.
    #[serde(default)]
    pub message: String,
    /// Key the document was verified against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Signature algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Verification timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_list_deserialization() {
        let json = r#"{
            "keys": [
                {"id": "key-1", "created_at": "2025-01-01T00:00:00Z", "algorithm": "ES256"},
                {"key_id": "key-2", "created_at": "2025-02-01T12:30:00Z"}
            ]
        }"#;

        let list: KeyList = serde_json::from_str(json).unwrap();
        assert_eq!(list.keys.len(), 2);
        assert_eq!(list.keys[0].algorithm.as_deref(), Some("ES256"));
        assert_eq!(list.keys[1].id, "key-2");
        assert!(list.keys[1].algorithm.is_none());
    }

    #[test]
    fn test_empty_key_list() {
        let list: KeyList = serde_json::from_str("{}").unwrap();
        assert!(list.keys.is_empty());
    }

    #[test]
    fn test_generated_key_keeps_pem_verbatim() {
        let pem = "-----BEGIN PUBLIC KEY-----\nMFkw\n-----END PUBLIC KEY-----\n";
        let key: GeneratedKey = serde_json::from_value(json!({
            "key_id": "k-9",
            "created_at": "2025-01-01T00:00:00Z",
            "public_key": pem,
        }))
        .unwrap();
        assert_eq!(key.id, "k-9");
        assert_eq!(key.public_key, pem);
    }

    #[test]
    fn test_sign_result_signature_accessors() {
        let result = SignResult::new(json!({
            "bomFormat": "CycloneDX",
            "signature": {"algorithm": "ES256", "value": "abc"}
        }));
        assert_eq!(result.signature_value(), Some("abc"));
        assert_eq!(result.signature_algorithm(), Some("ES256"));

        let unsigned = SignResult::new(json!({"bomFormat": "CycloneDX"}));
        assert!(unsigned.signature_value().is_none());
    }

    #[test]
    fn test_sign_result_is_transparent() {
        let doc = json!({"name": "example", "signature": "s"});
        let result = SignResult::new(doc.clone());
        assert_eq!(serde_json::to_value(&result).unwrap(), doc);
        assert_eq!(result.signature_value(), Some("s"));
    }

    #[test]
    fn test_verify_result_optional_fields() {
        let result: VerifyResult = serde_json::from_str(r#"{"valid": false}"#).unwrap();
        assert!(!result.valid);
        assert!(result.message.is_empty());

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("key_id")); // None fields are skipped
    }
}
