use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::ControlError;

// ── SecretStore ───────────────────────────────────────────────────────────────

/// Source of the certificate secrets. Every call reads the latest version;
/// nothing is cached between calls.
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Latest version of the named secret, decoded as UTF-8.
    async fn latest(&self, secret: &str) -> Result<String, ControlError>;
}

// ── Token provider ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum FetchError {
    #[error("GCP auth failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("secret version has no payload")]
    NoPayload,

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Source of GCP access tokens; tests swap in a static token.
#[async_trait]
trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, FetchError>;
}

/// Production token provider backed by Application Default Credentials.
/// The provider is resolved on first use so a missing ADC setup fails the
/// secret read rather than startup.
#[derive(Default)]
struct AdcTokenProvider {
    inner: OnceCell<Arc<dyn gcp_auth::TokenProvider>>,
}

#[async_trait]
impl TokenProvider for AdcTokenProvider {
    async fn token(&self) -> Result<String, FetchError> {
        let inner = self
            .inner
            .get_or_try_init(gcp_auth::provider)
            .await
            .map_err(|e| FetchError::Auth(e.to_string()))?;
        let token = inner
            .token(&["https://www.googleapis.com/auth/cloud-platform"])
            .await
            .map_err(|e| FetchError::Auth(e.to_string()))?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed token, no network call.
#[cfg(test)]
struct StaticToken(String);

#[cfg(test)]
#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, FetchError> {
        Ok(self.0.clone())
    }
}

// ── GcpSecretStore ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AccessSecretResponse {
    payload: Option<SecretPayload>,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    /// Base64-encoded secret bytes.
    #[serde(default)]
    data: String,
}

/// Google Secret Manager, scoped to one project.
pub struct GcpSecretStore {
    project_id: String,
    base: String,
    client: reqwest::Client,
    token: Box<dyn TokenProvider>,
}

impl GcpSecretStore {
    /// Create a store using Application Default Credentials.
    ///
    /// ADC resolution order:
    /// 1. `GOOGLE_APPLICATION_CREDENTIALS` env var (service account JSON key)
    /// 2. The metadata server (Cloud Functions, Cloud Run, GCE)
    /// 3. `gcloud auth application-default login` for local dev
    pub fn from_adc(project_id: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            base: base.into(),
            client: reqwest::Client::new(),
            token: Box::new(AdcTokenProvider::default()),
        }
    }

    #[cfg(test)]
    fn with_static_token(project_id: &str, token: &str, base: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            base: base.to_string(),
            client: reqwest::Client::new(),
            token: Box::new(StaticToken(token.to_string())),
        }
    }

    /// `projects/{project}/secrets/{secret}/versions/latest`
    pub fn version_path(&self, secret: &str) -> String {
        format!("projects/{}/secrets/{}/versions/latest", self.project_id, secret)
    }

    /// Convert a GCP REST error envelope into `"NOT_FOUND: Secret [...] not found"`.
    fn extract_gcp_error(status: u16, body: &Value) -> String {
        let err = &body["error"];
        match (err["status"].as_str(), err["message"].as_str()) {
            (Some(s), Some(m)) => format!("{}: {}", s, m),
            (None, Some(m)) => format!("{} {}", status, m),
            _ => format!("status {}", status),
        }
    }

    async fn fetch(&self, secret: &str) -> Result<String, FetchError> {
        let token = self.token.token().await?;
        let url = format!("{}/v1/{}:access", self.base, self.version_path(secret));
        debug!(url = %url, "Secret Manager GET");

        let resp = self.client.get(&url).bearer_auth(&token).send().await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(FetchError::Api(Self::extract_gcp_error(status, &body)));
        }

        let body: AccessSecretResponse = resp.json().await?;
        let payload = body.payload.ok_or(FetchError::NoPayload)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.data.as_bytes())?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[async_trait]
impl SecretStore for GcpSecretStore {
    fn name(&self) -> &'static str {
        "gcp"
    }

    async fn latest(&self, secret: &str) -> Result<String, ControlError> {
        self.fetch(secret).await.map_err(|e| ControlError::SecretAccess {
            name: secret.to_string(),
            message: e.to_string(),
        })
    }
}

// ── StaticSecrets ─────────────────────────────────────────────────────────────

/// In-memory secrets for local runs and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecrets {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn latest(&self, secret: &str) -> Result<String, ControlError> {
        self.values
            .get(secret)
            .cloned()
            .ok_or_else(|| ControlError::SecretAccess {
                name: secret.to_string(),
                message: "secret not found".into(),
            })
    }
}
