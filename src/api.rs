//! The client contract.
//!
//! [`SecureSbomApi`] is the interface shared by the base [`Client`], the
//! [`RetryingClient`](crate::retry::RetryingClient) decorator and any test
//! double. Code that only needs to talk to the service should depend on the
//! trait rather than on a concrete client.

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::types::{GeneratedKey, KeyList, SignResult, VerifyResult};
use async_trait::async_trait;

/// Operations offered by the SecureSBOM service.
#[async_trait]
pub trait SecureSbomApi: Send + Sync {
    /// Check that the service is reachable.
    async fn health_check(&self, ctx: &Context) -> Result<()>;

    /// List available signing keys.
    async fn list_keys(&self, ctx: &Context) -> Result<KeyList>;

    /// Generate a new signing key.
    async fn generate_key(&self, ctx: &Context) -> Result<GeneratedKey>;

    /// Fetch the PEM-encoded public key of a key.
    async fn get_public_key(&self, ctx: &Context, key_id: &str) -> Result<String>;

    /// Sign an SBOM document.
    async fn sign_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<SignResult>;

    /// Verify a signed CycloneDX document.
    async fn verify_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult>;

    /// Verify an SPDX document against a detached signature.
    async fn verify_spdx_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        signature: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult>;
}

#[async_trait]
impl SecureSbomApi for Client {
    async fn health_check(&self, ctx: &Context) -> Result<()> {
        Client::health_check(self, ctx).await
    }

    async fn list_keys(&self, ctx: &Context) -> Result<KeyList> {
        self.keys().list(ctx).await
    }

    async fn generate_key(&self, ctx: &Context) -> Result<GeneratedKey> {
        self.keys().generate(ctx).await
    }

    async fn get_public_key(&self, ctx: &Context, key_id: &str) -> Result<String> {
        self.keys().public_key(ctx, key_id).await
    }

    async fn sign_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<SignResult> {
        self.sbom().sign(ctx, key_id, sbom).await
    }

    async fn verify_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        self.sbom().verify(ctx, key_id, sbom).await
    }

    async fn verify_spdx_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        signature: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        self.sbom().verify_spdx(ctx, key_id, signature, sbom).await
    }
}

#[async_trait]
impl<T: SecureSbomApi + ?Sized> SecureSbomApi for Box<T> {
    async fn health_check(&self, ctx: &Context) -> Result<()> {
        (**self).health_check(ctx).await
    }

    async fn list_keys(&self, ctx: &Context) -> Result<KeyList> {
        (**self).list_keys(ctx).await
    }

    async fn generate_key(&self, ctx: &Context) -> Result<GeneratedKey> {
        (**self).generate_key(ctx).await
    }

    async fn get_public_key(&self, ctx: &Context, key_id: &str) -> Result<String> {
        (**self).get_public_key(ctx, key_id).await
    }

    async fn sign_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<SignResult> {
        (**self).sign_sbom(ctx, key_id, sbom).await
    }

    async fn verify_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        (**self).verify_sbom(ctx, key_id, sbom).await
    }

    async fn verify_spdx_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        signature: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        (**self).verify_spdx_sbom(ctx, key_id, signature, sbom).await
    }
}
