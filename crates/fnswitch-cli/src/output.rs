use serde_json::Value;

/// Render an invocation response as a status line followed by the JSON body.
pub fn render_response(status: u16, body: &Value) -> String {
    let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
    format!("HTTP {}\n{}\n", status, pretty)
}

/// Request body for one invocation.
pub fn request_body(resource_id: &str, action: &str) -> Value {
    serde_json::json!({ "resourceid": resource_id, "action": action })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_status_line_and_body() {
        let out = render_response(200, &json!({ "status": "Function App a is now enabled." }));
        assert!(out.starts_with("HTTP 200\n{"));
        assert!(out.contains("\"status\": \"Function App a is now enabled.\""));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn request_body_uses_wire_field_names() {
        let body = request_body("/subscriptions/a/resourceGroups/b/providers/Microsoft.Web/sites/c", "enable");
        assert_eq!(body["resourceid"], "/subscriptions/a/resourceGroups/b/providers/Microsoft.Web/sites/c");
        assert_eq!(body["action"], "enable");
    }
}
