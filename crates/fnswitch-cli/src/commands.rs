use std::sync::Arc;

use anyhow::{Context, Result};
use fnswitch_config::{load_config, RawConfig};
use fnswitch_domain::StatusPolicy;
use fnswitch_driver::{AppController, AzureAppController, GcpSecretStore, LocalAppController};
use tracing::info;

use crate::cli::ConfigArgs;
use crate::output;

// ── Serve ─────────────────────────────────────────────────────────────────────

pub async fn serve(config: ConfigArgs, port: u16, bind: String) -> Result<()> {
    let (controller, policy) = build_controller(&config)?;
    let app = fnswitch_api::build_app(controller.clone(), policy);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(addr, controller = controller.name(), status_policy = ?policy, "Listening");
    println!("Listening on http://{addr} ({} controller)", controller.name());
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ── Invoke ────────────────────────────────────────────────────────────────────

pub async fn invoke(
    resource_id: String,
    action: String,
    remote: Option<String>,
    config: ConfigArgs,
) -> Result<()> {
    let body = output::request_body(&resource_id, &action);

    let (status, response) = match remote {
        Some(url) => {
            let resp = reqwest::Client::new()
                .post(format!("{}/", url.trim_end_matches('/')))
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Failed to reach server at {url}"))?;
            let status = resp.status().as_u16();
            let response: serde_json::Value =
                resp.json().await.context("Server returned a non-JSON response")?;
            (status, response)
        }
        None => {
            let (controller, policy) = build_controller(&config)?;
            let (status, response) = fnswitch_api::invocation_response(
                controller.as_ref(),
                policy,
                body.to_string().as_bytes(),
            )
            .await;
            (status.as_u16(), response)
        }
    };

    print!("{}", output::render_response(status, &response));
    if !(200..300).contains(&status) {
        anyhow::bail!("invocation failed with status {status}");
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Local mode needs no identity settings; the Azure controller requires a full config.
fn build_controller(args: &ConfigArgs) -> Result<(Arc<dyn AppController>, StatusPolicy)> {
    if args.local {
        let policy = StatusPolicy::from_strict(args.strict_status);
        return Ok((Arc::new(LocalAppController::new()), policy));
    }

    let config = load_config(args.config.as_deref(), overrides(args))
        .context("Invalid handler configuration")?;
    let secrets = GcpSecretStore::from_adc(
        config.project_id.clone(),
        config.endpoints.secret_manager.clone(),
    );
    let policy = config.status_policy;
    let controller = AzureAppController::new(Arc::new(config), Arc::new(secrets));
    Ok((Arc::new(controller), policy))
}

fn overrides(args: &ConfigArgs) -> RawConfig {
    RawConfig {
        tenant_id: args.tenant_id.clone(),
        client_id: args.client_id.clone(),
        project_id: args.project_id.clone(),
        certificate_secret: args.certificate_secret.clone(),
        password_secret: args.password_secret.clone(),
        // An absent flag must not override `strict_status: true` from the file.
        strict_status: args.strict_status.then_some(true),
        ..Default::default()
    }
}
