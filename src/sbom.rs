//! Loading SBOM documents.
//!
//! The SDK does not validate SBOM contents; that is the service's job. It
//! only checks that the input is a JSON object and notes which format the
//! document appears to be.

use crate::error::{Result, SecureSbomError};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// SBOM format, as far as it can be told from the top-level fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbomFormat {
    /// `"bomFormat": "CycloneDX"`.
    CycloneDx,
    /// Has an `spdxVersion` field.
    Spdx,
    /// Anything else.
    Unknown,
}

impl fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbomFormat::CycloneDx => write!(f, "CycloneDX"),
            SbomFormat::Spdx => write!(f, "SPDX"),
            SbomFormat::Unknown => write!(f, "unknown"),
        }
    }
}

/// An SBOM document ready to be sent to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Sbom {
    document: serde_json::Value,
}

impl Sbom {
    /// Wrap an already-parsed document.
    pub fn from_value(document: serde_json::Value) -> Result<Self> {
        if !document.is_object() {
            return Err(SecureSbomError::InvalidSbom(
                "document must be a JSON object".to_string(),
            ));
        }
        Ok(Self { document })
    }

    /// Parse a document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(SecureSbomError::InvalidSbom("input is empty".to_string()));
        }
        let document = serde_json::from_slice(bytes)
            .map_err(|e| SecureSbomError::InvalidSbom(format!("not valid JSON: {e}")))?;
        Self::from_value(document)
    }

    /// Read a document from any reader (e.g. stdin).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| SecureSbomError::io("-", e))?;
        Self::from_slice(&bytes)
    }

    /// Read a document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SecureSbomError::io(path, e))?;
        let sbom = Self::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), format = %sbom.format(), "loaded SBOM");
        Ok(sbom)
    }

    /// The parsed document.
    pub fn document(&self) -> &serde_json::Value {
        &self.document
    }

    /// Consume the SBOM and return the document.
    pub fn into_document(self) -> serde_json::Value {
        self.document
    }

    /// Best-effort format detection.
    pub fn format(&self) -> SbomFormat {
        if self.document.get("bomFormat").and_then(|v| v.as_str()) == Some("CycloneDX") {
            SbomFormat::CycloneDx
        } else if self.document.get("spdxVersion").is_some() {
            SbomFormat::Spdx
        } else {
            SbomFormat::Unknown
        }
    }

    /// Whether the document already carries an inline signature.
    pub fn is_signed(&self) -> bool {
        self.document.get("signature").is_some()
    }

    /// Hex-encoded SHA-256 of the document's compact JSON encoding.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(&self.document).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
