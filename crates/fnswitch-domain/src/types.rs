use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

// ── Action ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Start the app.
    Enable,
    /// Stop the app.
    Disable,
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Action::Enable),
            "disable" => Ok(Action::Disable),
            other => Err(DomainError::InvalidAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Enable => write!(f, "enable"),
            Action::Disable => write!(f, "disable"),
        }
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Non-error result of applying an action to a Function App.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Enabled { app: String },
    Disabled { app: String },
    NotFound { app: String, resource_group: String },
    InvalidAction,
}

impl Outcome {
    /// The outcome of successfully applying `action` to `app`.
    pub fn applied(action: Action, app: impl Into<String>) -> Self {
        match action {
            Action::Enable => Outcome::Enabled { app: app.into() },
            Action::Disable => Outcome::Disabled { app: app.into() },
        }
    }

    /// True when the app's state was actually changed (or confirmed).
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Enabled { .. } | Outcome::Disabled { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Enabled { app } => format!("Function App {} is now enabled.", app),
            Outcome::Disabled { app } => format!("Function App {} is now disabled.", app),
            Outcome::NotFound { app, resource_group } => format!(
                "Function App {} not found in resource group {}.",
                app, resource_group
            ),
            Outcome::InvalidAction => "Invalid action. Use 'enable' or 'disable'.".to_string(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

// ── Status policy ─────────────────────────────────────────────────────────────

/// How non-applied outcomes map onto HTTP status codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// `NotFound` and `InvalidAction` are reported with 200 and a `status` body.
    #[default]
    Compatible,
    /// `NotFound` is 404 and `InvalidAction` is 400, both with an `error` body.
    Strict,
}

impl StatusPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            StatusPolicy::Strict
        } else {
            StatusPolicy::Compatible
        }
    }
}
