use serde::{Deserialize, Serialize};

/// Raw YAML representation of the handler config file. Every field is optional
/// so that the file, CLI flags and environment can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub project_id: Option<String>,
    pub certificate_secret: Option<String>,
    pub password_secret: Option<String>,
    pub web_api_version: Option<String>,
    /// Report not-found and invalid-action outcomes as 404/400.
    pub strict_status: Option<bool>,
    #[serde(default)]
    pub endpoints: RawEndpoints,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawEndpoints {
    pub management: Option<String>,
    pub login: Option<String>,
    pub secret_manager: Option<String>,
}

impl RawConfig {
    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            tenant_id: overrides.tenant_id.or(self.tenant_id),
            client_id: overrides.client_id.or(self.client_id),
            project_id: overrides.project_id.or(self.project_id),
            certificate_secret: overrides.certificate_secret.or(self.certificate_secret),
            password_secret: overrides.password_secret.or(self.password_secret),
            web_api_version: overrides.web_api_version.or(self.web_api_version),
            strict_status: overrides.strict_status.or(self.strict_status),
            endpoints: RawEndpoints {
                management: overrides.endpoints.management.or(self.endpoints.management),
                login: overrides.endpoints.login.or(self.endpoints.login),
                secret_manager: overrides
                    .endpoints
                    .secret_manager
                    .or(self.endpoints.secret_manager),
            },
        }
    }
}
