use std::sync::Arc;
use fnswitch_domain::StatusPolicy;
use fnswitch_driver::AppController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<dyn AppController>,
    /// How not-found and invalid-action outcomes are reported.
    pub status_policy: StatusPolicy,
}
