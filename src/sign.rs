//! Signing and verification operations.
//!
//! This module provides the SbomClient for signing SBOM documents with keys
//! held by the service, and for verifying signed documents. CycloneDX
//! documents carry their signature inline; SPDX documents are verified
//! against a detached signature supplied by the caller.

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::types::{SignResult, VerifyResult};
use serde::Serialize;

/// Client for signing and verification.
///
/// Access via `client.sbom()`.
pub struct SbomClient {
    client: Client,
}

impl SbomClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sign an SBOM document with a key.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Cancellation and deadline scope
    /// * `key_id` - The key ID to sign with
    /// * `sbom` - The SBOM document
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use securesbom::{Client, Context};
    /// use serde_json::json;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::builder().from_env().build_client()?;
    ///     let sbom = json!({"bomFormat": "CycloneDX", "specVersion": "1.5"});
    ///
    ///     let signed = client.sbom().sign(&Context::background(), "my-key-123", &sbom).await?;
    ///     println!("{}", serde_json::to_string_pretty(&signed)?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn sign(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<SignResult> {
        let document: serde_json::Value = self
            .client
            .post(ctx, &["v1", "keys", key_id, "sign"], sbom)
            .await?;
        Ok(SignResult::new(document))
    }

    /// Verify a signed CycloneDX document.
    pub async fn verify(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        self.client
            .post(ctx, &["v1", "keys", key_id, "verify"], sbom)
            .await
    }

    /// Verify an SPDX document against a detached signature.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use securesbom::{Client, Context, Sbom};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::builder().from_env().build_client()?;
    ///     let sbom = Sbom::from_file("sbom.spdx.json")?;
    ///
    ///     let result = client
    ///         .sbom()
    ///         .verify_spdx(&Context::background(), "my-key-123", "MEUCIQ...", sbom.document())
    ///         .await?;
    ///     println!("valid: {}", result.valid);
    ///     Ok(())
    /// }
    /// ```
    pub async fn verify_spdx(
        &self,
        ctx: &Context,
        key_id: &str,
        signature: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        #[derive(Serialize)]
        struct Request<'a> {
            signature: &'a str,
            sbom: &'a serde_json::Value,
        }

        self.client
            .post(
                ctx,
                &["v1", "keys", key_id, "verify", "spdx"],
                &Request { signature, sbom },
            )
            .await
    }
}
