use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use fnswitch_domain::{Action, Outcome, ResourceId};
use tokio::sync::Mutex;
use tracing::debug;

use crate::controller::AppController;
use crate::error::ControlError;

/// A controller that simulates Function Apps in memory.
///
/// - Apps are running until stopped.
/// - Apps registered with [`LocalAppController::with_missing`] report `NotFound`.
/// - Performs no I/O and never fails.
#[derive(Debug, Default)]
pub struct LocalAppController {
    running: Mutex<HashMap<ResourceId, bool>>,
    missing: HashSet<ResourceId>,
}

impl LocalAppController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, id: ResourceId) -> Self {
        self.missing.insert(id);
        self
    }

    /// `None` for apps that do not exist.
    pub async fn is_running(&self, id: &ResourceId) -> Option<bool> {
        if self.missing.contains(id) {
            return None;
        }
        Some(self.running.lock().await.get(id).copied().unwrap_or(true))
    }
}

#[async_trait]
impl AppController for LocalAppController {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn apply(&self, target: &ResourceId, action: Action) -> Result<Outcome, ControlError> {
        debug!(resource_id = %target, %action, "LocalAppController: apply");
        if self.missing.contains(target) {
            return Ok(Outcome::NotFound {
                app: target.app_name.clone(),
                resource_group: target.resource_group.clone(),
            });
        }
        self.running
            .lock()
            .await
            .insert(target.clone(), action == Action::Enable);
        Ok(Outcome::applied(action, target.app_name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(app: &str) -> ResourceId {
        ResourceId::parse(&format!(
            "/subscriptions/abcd/resourceGroups/rg/providers/Microsoft.Web/sites/{}",
            app
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn tracks_running_state() {
        let ctl = LocalAppController::new();
        assert_eq!(ctl.is_running(&id("a")).await, Some(true));

        ctl.apply(&id("a"), Action::Disable).await.unwrap();
        assert_eq!(ctl.is_running(&id("a")).await, Some(false));

        ctl.apply(&id("a"), Action::Enable).await.unwrap();
        ctl.apply(&id("a"), Action::Enable).await.unwrap();
        assert_eq!(ctl.is_running(&id("a")).await, Some(true));
    }

    #[tokio::test]
    async fn missing_apps_report_not_found() {
        let ctl = LocalAppController::new().with_missing(id("gone"));
        let outcome = ctl.apply(&id("gone"), Action::Enable).await.unwrap();
        assert!(matches!(outcome, Outcome::NotFound { .. }));
        assert_eq!(ctl.is_running(&id("gone")).await, None);
    }
}
