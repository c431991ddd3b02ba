use std::sync::Arc;

use async_trait::async_trait;
use fnswitch_domain::{Action, HandlerConfig, Outcome, ResourceId};
use tracing::{debug, info, warn};

use crate::error::ControlError;
use crate::secrets::SecretStore;
use crate::web::{WebClient, WebError};

#[async_trait]
pub trait AppController: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Start (`Enable`) or stop (`Disable`) the Function App named by `target`.
    ///
    /// A missing app is an [`Outcome::NotFound`], not an error.
    async fn apply(&self, target: &ResourceId, action: Action) -> Result<Outcome, ControlError>;

    /// Apply a raw action string. Anything but `enable`/`disable` yields
    /// [`Outcome::InvalidAction`] without a start or stop call.
    async fn manage(&self, target: &ResourceId, action: &str) -> Result<Outcome, ControlError> {
        match action.parse::<Action>() {
            Ok(action) => self.apply(target, action).await,
            Err(_) => {
                debug!(action, "Rejecting unknown action");
                Ok(Outcome::InvalidAction)
            }
        }
    }
}

// ── AzureAppController ────────────────────────────────────────────────────────

/// Controls Function Apps through Azure Resource Manager.
///
/// Every call fetches the certificate secrets, builds a new credential and a
/// new [`WebClient`]; nothing carries over between calls.
pub struct AzureAppController {
    config: Arc<HandlerConfig>,
    secrets: Arc<dyn SecretStore>,
}

impl AzureAppController {
    pub fn new(config: Arc<HandlerConfig>, secrets: Arc<dyn SecretStore>) -> Self {
        Self { config, secrets }
    }

    async fn connect(&self, target: &ResourceId) -> Result<WebClient, ControlError> {
        WebClient::connect(self.secrets.as_ref(), &self.config, &target.subscription_id)
            .await
            .map_err(ControlError::management)
    }

    async fn run(&self, client: &WebClient, target: &ResourceId, action: Action) -> Result<Outcome, ControlError> {
        match client.apply(&target.resource_group, &target.app_name, action).await {
            Ok(()) => {
                info!(
                    subscription_id = %target.subscription_id,
                    resource_group = %target.resource_group,
                    app = %target.app_name,
                    %action,
                    "Function App state changed"
                );
                Ok(Outcome::applied(action, target.app_name.as_str()))
            }
            Err(WebError::NotFound(detail)) => {
                warn!(
                    resource_group = %target.resource_group,
                    app = %target.app_name,
                    detail = %detail,
                    "Function App not found"
                );
                Ok(Outcome::NotFound {
                    app: target.app_name.clone(),
                    resource_group: target.resource_group.clone(),
                })
            }
            Err(e) => Err(ControlError::management(e.to_string())),
        }
    }
}

#[async_trait]
impl AppController for AzureAppController {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn apply(&self, target: &ResourceId, action: Action) -> Result<Outcome, ControlError> {
        let client = self.connect(target).await?;
        self.run(&client, target, action).await
    }

    /// The client is built before the action is looked at, so an unknown
    /// action still surfaces secret and credential failures.
    async fn manage(&self, target: &ResourceId, action: &str) -> Result<Outcome, ControlError> {
        let client = self.connect(target).await?;
        match action.parse::<Action>() {
            Ok(action) => self.run(&client, target, action).await,
            Err(_) => {
                debug!(action, "Rejecting unknown action");
                Ok(Outcome::InvalidAction)
            }
        }
    }
}
