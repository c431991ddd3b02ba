use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fnswitch_domain::{DomainError, Outcome, ResourceId, StatusPolicy};
use fnswitch_driver::AppController;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────────────────────

pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Invocation ────────────────────────────────────────────────────────────────

/// `POST /` with `{"resourceid": "...", "action": "enable" | "disable"}`.
pub async fn invoke(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let status = handle(state.controller.as_ref(), state.status_policy, &body).await?;
    Ok(Json(json!({ "status": status })))
}

/// Run one invocation outside of axum and return its status code and JSON body.
pub async fn invocation_response(
    controller: &dyn AppController,
    policy: StatusPolicy,
    body: &[u8],
) -> (StatusCode, Value) {
    match handle(controller, policy, body).await {
        Ok(status) => (StatusCode::OK, json!({ "status": status })),
        Err(e) => (e.status, json!({ "error": e.message })),
    }
}

/// The four gates: body has `resourceid`, it parses, body has `action`, the
/// controller succeeds. Returns the `status` message.
async fn handle(
    controller: &dyn AppController,
    policy: StatusPolicy,
    body: &[u8],
) -> Result<String, ApiError> {
    // A body that is not JSON has no `resourceid` either.
    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let target = match request.get("resourceid") {
        Some(value) if is_blank(value) => return Err(ApiError::missing_field("resourceid")),
        None => return Err(ApiError::missing_field("resourceid")),
        Some(Value::String(s)) => ResourceId::parse(s)?,
        Some(_) => return Err(DomainError::InvalidFormat.into()),
    };

    let result = match request.get("action") {
        Some(value) if is_blank(value) => return Err(ApiError::missing_field("action")),
        None => return Err(ApiError::missing_field("action")),
        Some(Value::String(action)) => controller.manage(&target, action).await,
        // Never a valid action, but still goes through the controller so
        // credential failures are reported the same way.
        Some(other) => controller.manage(&target, &other.to_string()).await,
    };

    match result {
        Ok(outcome) => {
            info!(
                resource_id = %target,
                controller = controller.name(),
                applied = outcome.is_applied(),
                "Invocation finished"
            );
            outcome_status(outcome, policy)
        }
        Err(e) => {
            error!(kind = e.kind(), "An error occurred: {}", e);
            Err(e.into())
        }
    }
}

/// `null`, `false`, zero, `""`, `[]` and `{}` count as an absent field.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn outcome_status(outcome: Outcome, policy: StatusPolicy) -> Result<String, ApiError> {
    match (policy, &outcome) {
        (StatusPolicy::Strict, Outcome::NotFound { .. }) => Err(ApiError::not_found(outcome.message())),
        (StatusPolicy::Strict, Outcome::InvalidAction) => Err(ApiError::bad_request(outcome.message())),
        _ => Ok(outcome.message()),
    }
}
