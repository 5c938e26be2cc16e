//! Rulesmith MCP bridge
//!
//! Editor tools speak JSON-RPC over stdin/stdout; Rulesmith serves it over
//! HTTP. This process forwards each stdin line to the protocol endpoint and
//! writes the reply to stdout. Logs go to stderr so stdout stays clean.

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_stderr_tracing, install_color_eyre};
use eyre::Result;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

mod bridge;

use bridge::{Bridge, Credentials};

#[derive(Parser, Debug)]
#[command(name = "rulesmith-mcp-bridge")]
#[command(about = "Forward newline-delimited JSON-RPC from stdio to a Rulesmith server")]
struct Cli {
    /// Protocol endpoint URL
    #[arg(long, env = "RULESMITH_URL", default_value = "http://localhost:8080/mcp")]
    url: String,

    /// API token created in the dashboard
    #[arg(long, env = "RULESMITH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Caller id, for deployments behind a trusted gateway
    #[arg(long, env = "RULESMITH_USER_ID")]
    user_id: Option<Uuid>,

    /// Per-request timeout in seconds
    #[arg(long, env = "RULESMITH_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_stderr_tracing(&Environment::from_env());

    let cli = Cli::parse();
    if cli.token.is_none() && cli.user_id.is_none() {
        warn!("Neither RULESMITH_TOKEN nor RULESMITH_USER_ID is set; requests will be rejected");
    }

    let bridge = Bridge::new(
        cli.url,
        Credentials {
            token: cli.token,
            user_id: cli.user_id,
        },
        Duration::from_secs(cli.timeout_secs),
    )?;

    info!(url = %bridge.url(), "Bridge ready");
    bridge::run(&bridge, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("stdin closed, exiting");

    Ok(())
}
