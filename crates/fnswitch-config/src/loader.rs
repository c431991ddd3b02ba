use std::path::Path;

use fnswitch_domain::{Endpoints, HandlerConfig, StatusPolicy};
use tracing::debug;

use crate::error::ConfigError;
use crate::raw::RawConfig;

/// Read a YAML config file into its raw form without validating it.
pub fn read_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("Loading handler config from {}", path.display());
    serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the optional config file, layer `overrides` on top and resolve the result.
pub fn load_config(path: Option<&Path>, overrides: RawConfig) -> Result<HandlerConfig, ConfigError> {
    let base = match path {
        Some(p) => read_config_file(p)?,
        None => RawConfig::default(),
    };
    resolve(base.merge(overrides))
}

/// Fill defaults and validate. Tenant id, client id and project id have no default.
pub fn resolve(raw: RawConfig) -> Result<HandlerConfig, ConfigError> {
    let tenant_id = required(raw.tenant_id, "tenant_id", "FNSWITCH_TENANT_ID")?;
    let client_id = required(raw.client_id, "client_id", "FNSWITCH_CLIENT_ID")?;
    let project_id = required(raw.project_id, "project_id", "GOOGLE_CLOUD_PROJECT")?;

    let mut config = HandlerConfig::new(tenant_id, client_id, project_id);
    if let Some(name) = raw.certificate_secret {
        config.certificate_secret = name;
    }
    if let Some(name) = raw.password_secret {
        config.password_secret = name;
    }
    if let Some(version) = raw.web_api_version {
        config.web_api_version = version;
    }
    config.status_policy = StatusPolicy::from_strict(raw.strict_status.unwrap_or(false));

    let defaults = Endpoints::default();
    config.endpoints = Endpoints {
        management: trim_base(raw.endpoints.management).unwrap_or(defaults.management),
        login: trim_base(raw.endpoints.login).unwrap_or(defaults.login),
        secret_manager: trim_base(raw.endpoints.secret_manager).unwrap_or(defaults.secret_manager),
    };

    config.validate()?;
    debug!(
        tenant_id = %config.identity.tenant_id,
        project_id = %config.project_id,
        status_policy = ?config.status_policy,
        "Resolved handler config"
    );
    Ok(config)
}

fn required(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { field, env }),
    }
}

fn trim_base(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
}
