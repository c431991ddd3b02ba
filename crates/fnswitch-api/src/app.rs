use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use fnswitch_domain::StatusPolicy;
use fnswitch_driver::AppController;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_app(controller: Arc<dyn AppController>, status_policy: StatusPolicy) -> Router {
    let state = AppState { controller, status_policy };

    Router::new()
        .route("/", post(handlers::invoke))
        .route("/invoke", post(handlers::invoke))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use fnswitch_domain::{HandlerConfig, ResourceId};
    use fnswitch_driver::{AzureAppController, LocalAppController, StaticSecrets};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const VALID: &str = "/subscriptions/abcd-1234/resourceGroups/myrg/providers/Microsoft.Web/sites/myapp";

    fn test_app() -> Router {
        build_app(Arc::new(LocalAppController::new()), StatusPolicy::Compatible)
    }

    fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn call(app: Router, body: Value) -> (StatusCode, Value) {
        let resp = app.oneshot(post_json("/", body.to_string())).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_returns_200() {
        let resp = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn disable_returns_status_message() {
        let (status, body) = call(test_app(), json!({ "resourceid": VALID, "action": "disable" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "Function App myapp is now disabled." }));
    }

    #[tokio::test]
    async fn invoke_alias_route_works() {
        let body = json!({ "resourceid": VALID, "action": "enable" }).to_string();
        let resp = test_app().oneshot(post_json("/invoke", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_resourceid_is_400() {
        let (status, body) = call(test_app(), json!({ "action": "enable" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required field 'resourceid'" }));
    }

    #[tokio::test]
    async fn empty_resourceid_is_missing() {
        let (status, body) = call(test_app(), json!({ "resourceid": "", "action": "enable" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field 'resourceid'");
    }

    #[tokio::test]
    async fn non_json_body_is_missing_resourceid() {
        let resp = test_app().oneshot(post_json("/", "resourceid=x")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Missing required field 'resourceid'");
    }

    #[tokio::test]
    async fn malformed_resourceid_is_400() {
        let (status, body) =
            call(test_app(), json!({ "resourceid": "not-a-valid-path", "action": "enable" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid resourceid format" }));
    }

    #[tokio::test]
    async fn non_string_resourceid_is_invalid_format() {
        let (status, body) = call(test_app(), json!({ "resourceid": 42, "action": "enable" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid resourceid format");
    }

    #[tokio::test]
    async fn format_is_checked_before_action() {
        let (status, body) = call(test_app(), json!({ "resourceid": "bad" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid resourceid format");
    }

    #[tokio::test]
    async fn missing_action_is_400() {
        let (status, body) = call(test_app(), json!({ "resourceid": VALID })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required field 'action'" }));
    }

    #[tokio::test]
    async fn unknown_action_is_200_by_default() {
        let (status, body) = call(test_app(), json!({ "resourceid": VALID, "action": "toggle" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "Invalid action. Use 'enable' or 'disable'." }));
    }

    #[tokio::test]
    async fn unknown_action_is_400_when_strict() {
        let app = build_app(Arc::new(LocalAppController::new()), StatusPolicy::Strict);
        let (status, body) = call(app, json!({ "resourceid": VALID, "action": "toggle" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid action. Use 'enable' or 'disable'." }));
    }

    #[tokio::test]
    async fn not_found_follows_status_policy() {
        let missing = || LocalAppController::new().with_missing(ResourceId::parse(VALID).unwrap());
        let expected = "Function App myapp not found in resource group myrg.";

        let app = build_app(Arc::new(missing()), StatusPolicy::Compatible);
        let (status, body) = call(app, json!({ "resourceid": VALID, "action": "enable" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);

        let app = build_app(Arc::new(missing()), StatusPolicy::Strict);
        let (status, body) = call(app, json!({ "resourceid": VALID, "action": "enable" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], expected);
    }

    #[tokio::test]
    async fn enable_twice_succeeds() {
        let ctl = Arc::new(LocalAppController::new());
        for _ in 0..2 {
            let app = build_app(ctl.clone(), StatusPolicy::Compatible);
            let (status, body) = call(app, json!({ "resourceid": VALID, "action": "enable" })).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "Function App myapp is now enabled.");
        }
        assert_eq!(ctl.is_running(&ResourceId::parse(VALID).unwrap()).await, Some(true));
    }

    fn azure_without_secrets() -> Router {
        let controller = AzureAppController::new(
            Arc::new(HandlerConfig::new("tenant", "client", "ops")),
            Arc::new(StaticSecrets::new()),
        );
        build_app(Arc::new(controller), StatusPolicy::Compatible)
    }

    const MISSING_SECRET: &str = "An error occurred: Error managing Function App: Error getting web client: \
        Error authenticating with certificate: Error retrieving secret 'azure_access_certificate': secret not found";

    #[tokio::test]
    async fn downstream_failure_is_500_with_wrapped_message() {
        let (status, body) =
            call(azure_without_secrets(), json!({ "resourceid": VALID, "action": "enable" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": MISSING_SECRET }));
    }

    #[tokio::test]
    async fn unknown_action_with_unreadable_secret_is_500() {
        let (status, body) =
            call(azure_without_secrets(), json!({ "resourceid": VALID, "action": "toggle" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": MISSING_SECRET }));
    }

    #[tokio::test]
    async fn falsy_values_count_as_missing() {
        for blank in [json!(0), json!(false), json!([]), json!({})] {
            let (status, body) = call(test_app(), json!({ "resourceid": blank, "action": "enable" })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Missing required field 'resourceid'");

            let (status, body) = call(test_app(), json!({ "resourceid": VALID, "action": blank })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Missing required field 'action'");
        }
    }

    #[tokio::test]
    async fn non_string_action_is_invalid_action() {
        let (status, body) = call(test_app(), json!({ "resourceid": VALID, "action": true })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Invalid action. Use 'enable' or 'disable'.");
    }

    #[tokio::test]
    async fn invocation_response_matches_router() {
        let ctl = LocalAppController::new();
        let (status, body) = crate::invocation_response(
            &ctl,
            StatusPolicy::Compatible,
            json!({ "resourceid": VALID, "action": "disable" }).to_string().as_bytes(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Function App myapp is now disabled.");
    }
}
