use fnswitch_domain::{Action, Endpoints, HandlerConfig};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::credential::{authenticate_with_certificate, CertificateCredential, TokenError, MANAGEMENT_SCOPE};
use crate::error::ControlError;
use crate::secrets::SecretStore;

/// Everything but RFC 3986 unreserved characters is escaped inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[derive(Debug, Error)]
pub enum WebError {
    /// ARM answered 404: the site or its resource group does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("could not acquire management token: {0}")]
    Token(#[from] TokenError),

    #[error("POST {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("POST {url}: status {status}: {message}")]
    Api { url: String, status: u16, message: String },

    #[error("invalid site URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Handle on the `Microsoft.Web/sites` operations of one subscription.
///
/// Built per invocation and dropped afterwards; the bearer token is acquired
/// on each call, never stored.
#[derive(Debug)]
pub struct WebClient {
    subscription_id: String,
    credential: CertificateCredential,
    client: reqwest::Client,
    management: String,
    login: String,
    api_version: String,
}

impl WebClient {
    pub fn new(
        credential: CertificateCredential,
        subscription_id: impl Into<String>,
        endpoints: &Endpoints,
        api_version: impl Into<String>,
    ) -> Result<Self, ControlError> {
        for base in [&endpoints.management, &endpoints.login] {
            reqwest::Url::parse(base)
                .map_err(|e| ControlError::client_init(format!("invalid endpoint '{}': {}", base, e)))?;
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("fnswitch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ControlError::client_init(format!("HTTP client: {}", e)))?;

        Ok(Self {
            subscription_id: subscription_id.into(),
            credential,
            client,
            management: endpoints.management.trim_end_matches('/').to_string(),
            login: endpoints.login.trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        })
    }

    /// Fetch the certificate secrets, build a credential and bind a client to
    /// `subscription_id`. Credential failures come back wrapped in `ClientInit`.
    pub async fn connect(
        secrets: &dyn SecretStore,
        config: &HandlerConfig,
        subscription_id: &str,
    ) -> Result<Self, ControlError> {
        let credential = authenticate_with_certificate(secrets, config)
            .await
            .map_err(ControlError::client_init)?;
        Self::new(credential, subscription_id, &config.endpoints, config.web_api_version.as_str())
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub async fn start(&self, resource_group: &str, name: &str) -> Result<(), WebError> {
        self.site_action(resource_group, name, "start").await
    }

    pub async fn stop(&self, resource_group: &str, name: &str) -> Result<(), WebError> {
        self.site_action(resource_group, name, "stop").await
    }

    pub async fn apply(&self, resource_group: &str, name: &str, action: Action) -> Result<(), WebError> {
        match action {
            Action::Enable => self.start(resource_group, name).await,
            Action::Disable => self.stop(resource_group, name).await,
        }
    }

    /// Resource names are escaped, so a `/`, `?` or `#` in a name can never
    /// reach another path or operation.
    fn site_url(&self, resource_group: &str, name: &str, operation: &str) -> Result<reqwest::Url, WebError> {
        // A dot segment would be resolved away by URL normalisation.
        if name.chars().all(|c| c == '.') {
            return Err(WebError::NotFound(format!("no site can be named '{}'", name)));
        }
        let raw = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}/{}",
            self.management,
            utf8_percent_encode(&self.subscription_id, SEGMENT),
            utf8_percent_encode(resource_group, SEGMENT),
            utf8_percent_encode(name, SEGMENT),
            operation,
        );
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| WebError::InvalidUrl { url: raw.clone(), message: e.to_string() })?;
        url.query_pairs_mut().append_pair("api-version", &self.api_version);
        Ok(url)
    }

    // ── ARM error parsing ─────────────────────────────────────────────────────

    fn parse_arm_error(body: &Value) -> String {
        let err = body
            .get("error")
            .or_else(|| body.get("Error"))
            .unwrap_or(body);
        let code = err["code"].as_str().unwrap_or("Unknown");
        let message = err["message"].as_str().unwrap_or("unknown error");
        format!("{}: {}", code, message)
    }

    /// `POST …/sites/{name}/{operation}`. ARM answers synchronously with 200;
    /// the result is not polled.
    async fn site_action(&self, resource_group: &str, name: &str, operation: &str) -> Result<(), WebError> {
        let token = self
            .credential
            .access_token(&self.client, &self.login, MANAGEMENT_SCOPE)
            .await?;
        let url = self.site_url(resource_group, name, operation)?;
        debug!(url = %url, "Azure ARM POST");

        let resp = self
            .client
            .post(url.clone())
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| WebError::Transport { url: url.to_string(), source: e })?;

        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if status == 404 {
            return Err(WebError::NotFound(Self::parse_arm_error(&body)));
        }
        Err(WebError::Api { url: url.to_string(), status, message: Self::parse_arm_error(&body) })
    }
}
