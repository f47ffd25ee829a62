//! SecureSBOM API client.
//!
//! The main entry point for interacting with the SecureSBOM service. The
//! client performs exactly one HTTP attempt per call; wrap it in a
//! [`RetryingClient`](crate::retry::RetryingClient) for retries.

use crate::config::{Config, ConfigBuilder};
use crate::context::Context;
use crate::error::{Result, SecureSbomError};
use crate::keys::KeysClient;
use crate::sign::SbomClient;
use reqwest::{header, Client as HttpClient, Method, RequestBuilder, Url};
use serde::Deserialize;

/// SecureSBOM API client.
///
/// # Example
///
/// ```rust,no_run
/// use securesbom::{Client, Context, Sbom};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::builder().from_env().build_client()?;
///     let ctx = Context::background();
///
///     let sbom = Sbom::from_file("sbom.json")?;
///     let signed = client.sbom().sign(&ctx, "my-key-123", sbom.document()).await?;
///
///     let result = client.sbom().verify(&ctx, "my-key-123", signed.document()).await?;
///     assert!(result.valid);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: Url,
    pub(crate) api_key: String,
}

impl Client {
    /// Start building a client configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Create a client bound to a resolved configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|e| SecureSbomError::Config(format!("invalid base URL: {e}")))?;

        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| SecureSbomError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key().to_string(),
        })
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Get the keys client for key management operations.
    pub fn keys(&self) -> KeysClient {
        KeysClient::new(self.clone())
    }

    /// Get the SBOM client for signing and verification.
    pub fn sbom(&self) -> SbomClient {
        SbomClient::new(self.clone())
    }

    /// Check that the service is reachable and accepting requests.
    pub async fn health_check(&self, ctx: &Context) -> Result<()> {
        let request = self.request(Method::GET, &["v1", "health"])?;
        ctx.run(async {
            let response = request.send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(parse_error(response).await)
            }
        })
        .await
    }

    /// Build the URL for `segments` below the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SecureSbomError::Config(format!("base URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        tracing::debug!(%method, %url, "sending request");
        Ok(self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key)))
    }

    /// Make an authenticated GET request and decode a JSON response.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &Context,
        segments: &[&str],
    ) -> Result<T> {
        let request = self
            .request(Method::GET, segments)?
            .header(header::ACCEPT, "application/json");
        ctx.run(async { handle_response(request.send().await?).await })
            .await
    }

    /// Make an authenticated GET request and return the body as text.
    pub(crate) async fn get_text(&self, ctx: &Context, segments: &[&str]) -> Result<String> {
        let request = self
            .request(Method::GET, segments)?
            .header(header::ACCEPT, "application/x-pem-file, text/plain, */*");
        ctx.run(async {
            let response = request.send().await?;
            if response.status().is_success() {
                Ok(response.text().await?)
            } else {
                Err(parse_error(response).await)
            }
        })
        .await
    }

    /// Make an authenticated POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, ctx: &Context, segments: &[&str], body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self
            .request(Method::POST, segments)?
            .header(header::ACCEPT, "application/json")
            .json(body);
        ctx.run(async { handle_response(request.send().await?).await })
            .await
    }

    /// Make an authenticated POST request without a body.
    pub(crate) async fn post_empty<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &Context,
        segments: &[&str],
    ) -> Result<T> {
        let request = self
            .request(Method::POST, segments)?
            .header(header::ACCEPT, "application/json");
        ctx.run(async { handle_response(request.send().await?).await })
            .await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(parse_error(response).await);
    }
    let status = response.status();
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        SecureSbomError::Decode(format!("invalid response body (HTTP {status}): {e}"))
    })
}

async fn parse_error(response: reqwest::Response) -> SecureSbomError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let (code, message) = error_details(&body);

    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });
    tracing::debug!(status = status.as_u16(), %message, "API request failed");

    SecureSbomError::Api {
        status_code: status.as_u16(),
        code,
        message,
    }
}

/// Pull an error code and message out of an error response body.
///
/// Accepts `{"error": {"code", "message"}}`, `{"code", "message"}`,
/// `{"error": "..."}` and plain text.
fn error_details(body: &str) -> (Option<String>, Option<String>) {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<ErrorField>,
        code: Option<String>,
        message: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Detailed {
            code: Option<String>,
            message: Option<String>,
        },
        Text(String),
    }

    let body = body.trim();
    if body.is_empty() {
        return (None, None);
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => match envelope.error {
            Some(ErrorField::Detailed { code, message }) => {
                (code.or(envelope.code), message.or(envelope.message))
            }
            Some(ErrorField::Text(text)) => (envelope.code, envelope.message.or(Some(text))),
            None => (envelope.code, envelope.message),
        },
        Err(_) => (None, Some(body.to_string())),
    }
}
