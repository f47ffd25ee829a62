//! # SecureSBOM Rust SDK
//!
//! Rust SDK for the SecureSBOM service, which signs and verifies Software
//! Bills of Materials (SBOMs). Signing keys live in the service and never
//! leave it; this crate only composes requests and decodes responses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use securesbom::{Config, Context, RetryConfig, RetryingClient, Sbom, SecureSbomApi};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads SECURE_SBOM_API_KEY / SECURE_SBOM_BASE_URL
//!     let base = Config::builder().from_env().build_client()?;
//!     let client = RetryingClient::new(base, RetryConfig::default());
//!
//!     let ctx = Context::with_timeout(Duration::from_secs(40));
//!     client.health_check(&ctx).await?;
//!
//!     let sbom = Sbom::from_file("sbom.json")?;
//!     let signed = client.sign_sbom(&ctx, "my-key-123", sbom.document()).await?;
//!
//!     let result = client.verify_sbom(&ctx, "my-key-123", signed.document()).await?;
//!     println!("valid: {}", result.valid);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Configuration**: builder with environment fallback
//! - **Key Management**: list keys, generate keys, fetch public keys
//! - **Signing**: sign CycloneDX SBOMs
//! - **Verification**: verify CycloneDX SBOMs, and SPDX SBOMs with a detached signature
//! - **Retries**: exponential backoff for temporary failures, bounded by a [`Context`]
//!
//! ## Error Handling
//!
//! All operations return `Result<T, SecureSbomError>`:
//!
//! ```rust,no_run
//! use securesbom::{Config, Context, SecureSbomError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Config::builder().from_env().build_client().unwrap();
//!
//!     match client.keys().list(&Context::background()).await {
//!         Ok(list) => println!("Found {} keys", list.keys.len()),
//!         Err(e) if e.is_auth_error() => println!("Invalid API key"),
//!         Err(e) if e.is_temporary() => println!("Service unavailable, retry later"),
//!         Err(SecureSbomError::Config(msg)) => println!("Bad configuration: {msg}"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod keys;
pub mod retry;
pub mod sbom;
pub mod sign;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types at the crate root
pub use api::SecureSbomApi;
pub use client::Client;
pub use config::{Config, ConfigBuilder};
pub use context::Context;
pub use error::{Result, SecureSbomError};
pub use retry::{with_retrying_client, RetryConfig, RetryingClient};
pub use sbom::{Sbom, SbomFormat};

// Re-export types module for easy access
pub use types::{GeneratedKey, KeyInfo, KeyList, SignResult, VerifyResult};
