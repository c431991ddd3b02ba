use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "fnswitch",
    about = "Start or stop Azure Function Apps with a certificate kept in Google Secret Manager",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP handler.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Port to listen on.
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,

        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Run a single invocation and print the response.
    Invoke {
        /// Full resource id of the Function App.
        #[arg(long)]
        resource_id: String,

        /// `enable` or `disable`.
        #[arg(long)]
        action: String,

        /// Send the request to a running fnswitch server instead of running in-process.
        #[arg(long, env = "FNSWITCH_URL")]
        remote: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// YAML config file; flags and environment override its values.
    #[arg(long, env = "FNSWITCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Azure AD tenant id.
    #[arg(long, env = "FNSWITCH_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Azure AD application (client) id.
    #[arg(long, env = "FNSWITCH_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Google Cloud project holding the certificate secrets.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: Option<String>,

    /// Secret holding the base64 PKCS#12 certificate.
    #[arg(long, env = "FNSWITCH_CERT_SECRET")]
    pub certificate_secret: Option<String>,

    /// Secret holding the certificate password.
    #[arg(long, env = "FNSWITCH_CERT_PASS_SECRET")]
    pub password_secret: Option<String>,

    /// Report missing apps as 404 and unknown actions as 400.
    #[arg(long)]
    pub strict_status: bool,

    /// Simulate Function Apps in memory; no secrets or Azure calls.
    #[arg(long)]
    pub local: bool,
}
