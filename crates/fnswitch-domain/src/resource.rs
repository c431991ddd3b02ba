use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

// The `.` in `Microsoft.Web` is left unescaped: any single character matches there.
static RESOURCE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/subscriptions/(?P<subscription_id>[0-9a-fA-F-]+)/resourceGroups/(?P<resource_group>[a-zA-Z0-9_-]+)/providers/Microsoft.Web/sites/(?P<app_name>.+)$",
    )
    .expect("Invalid resource id regex")
});

/// A Function App addressed by its Azure resource path.
///
/// ```text
/// /subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.Web/sites/{app_name}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub app_name: String,
}

impl ResourceId {
    /// Parse a resource path. The whole string must match; there is no partial result.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let caps = RESOURCE_ID.captures(s).ok_or(DomainError::InvalidFormat)?;
        Ok(ResourceId {
            subscription_id: caps["subscription_id"].to_string(),
            resource_group: caps["resource_group"].to_string(),
            app_name: caps["app_name"].to_string(),
        })
    }

    /// ARM path of the site, relative to the management endpoint.
    pub fn site_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
            self.subscription_id, self.resource_group, self.app_name
        )
    }
}

impl FromStr for ResourceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.site_path())
    }
}
