//! Key management operations.
//!
//! This module provides the KeysClient for listing keys, generating new
//! signing keys and fetching public keys. Private key material never leaves
//! the service.

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::types::{GeneratedKey, KeyList};

/// Client for key management operations.
///
/// Access via `client.keys()`.
pub struct KeysClient {
    client: Client,
}

impl KeysClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the signing keys available to this API key.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use securesbom::{Client, Context};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::builder().from_env().build_client()?;
    ///
    ///     let list = client.keys().list(&Context::background()).await?;
    ///     for key in &list.keys {
    ///         println!("{} ({})", key.id, key.created_at);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn list(&self, ctx: &Context) -> Result<KeyList> {
        self.client.get(ctx, &["v1", "keys"]).await
    }

    /// Generate a new signing key.
    ///
    /// The response includes the PEM-encoded public key.
    pub async fn generate(&self, ctx: &Context) -> Result<GeneratedKey> {
        self.client.post_empty(ctx, &["v1", "keys"]).await
    }

    /// Fetch the PEM-encoded public key of `key_id`.
    ///
    /// The body is returned verbatim, including any trailing newline.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use securesbom::{Client, Context};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::builder().from_env().build_client()?;
    ///
    ///     let pem = client.keys().public_key(&Context::background(), "my-key-123").await?;
    ///     std::fs::write("public.pem", pem)?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn public_key(&self, ctx: &Context, key_id: &str) -> Result<String> {
        self.client
            .get_text(ctx, &["v1", "keys", key_id, "public.pem"])
            .await
    }
}
