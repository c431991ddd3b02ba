use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::StatusPolicy;

pub const DEFAULT_CERTIFICATE_SECRET: &str = "azure_access_certificate";
pub const DEFAULT_PASSWORD_SECRET: &str = "azure_access_certificate_pass";
pub const DEFAULT_WEB_API_VERSION: &str = "2022-03-01";

/// The Azure AD application the handler signs in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureIdentity {
    pub tenant_id: String,
    pub client_id: String,
}

/// Service base URLs. Overridden in tests to point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub management: String,
    pub login: String,
    pub secret_manager: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            management: "https://management.azure.com".into(),
            login: "https://login.microsoftonline.com".into(),
            secret_manager: "https://secretmanager.googleapis.com".into(),
        }
    }
}

impl Endpoints {
    /// Every service at the same base URL.
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            management: base.clone(),
            login: base.clone(),
            secret_manager: base,
        }
    }
}

/// Process-wide settings, fixed at startup and shared read-only by every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub identity: AzureIdentity,
    /// Secret Manager project holding the certificate secrets.
    pub project_id: String,
    pub certificate_secret: String,
    pub password_secret: String,
    pub endpoints: Endpoints,
    /// `api-version` query parameter for `Microsoft.Web/sites` calls.
    pub web_api_version: String,
    pub status_policy: StatusPolicy,
}

impl HandlerConfig {
    /// Config with default secret names, endpoints and status policy.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            identity: AzureIdentity {
                tenant_id: tenant_id.into(),
                client_id: client_id.into(),
            },
            project_id: project_id.into(),
            certificate_secret: DEFAULT_CERTIFICATE_SECRET.into(),
            password_secret: DEFAULT_PASSWORD_SECRET.into(),
            endpoints: Endpoints::default(),
            web_api_version: DEFAULT_WEB_API_VERSION.into(),
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("tenant_id", &self.identity.tenant_id),
            ("client_id", &self.identity.client_id),
            ("project_id", &self.project_id),
            ("certificate_secret", &self.certificate_secret),
            ("password_secret", &self.password_secret),
            ("web_api_version", &self.web_api_version),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidConfig(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}
