//! Stdio MCP server for WiZ smart lights.
//!
//! Speaks line-delimited JSON-RPC on stdin/stdout; logs go to stderr and are
//! filtered with `RUST_LOG` (default `info`).

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use wizlights_mcp::{BulbCommandDispatcher, TransportConfig, WizTransport, build_registry, serve};

#[derive(Parser)]
#[command(name = "wizlights-mcp")]
#[command(about = "Control WiZ smart lights through an MCP host", long_about = None)]
struct Cli {
    /// UDP port the bulbs listen on
    #[arg(long, env = "WIZLIGHTS_PORT", default_value_t = TransportConfig::DEFAULT_PORT)]
    port: u16,

    /// How long to wait for a bulb to answer one datagram, in milliseconds
    #[arg(long, env = "WIZLIGHTS_REQUEST_TIMEOUT_MS", default_value = "1000")]
    request_timeout_ms: u64,

    /// Extra attempts after a bulb fails to answer
    #[arg(long, env = "WIZLIGHTS_MAX_RETRIES", default_value = "3")]
    max_retries: u32,

    /// How long discovery listens for replies, in seconds
    #[arg(long, env = "WIZLIGHTS_DISCOVERY_TIMEOUT", default_value = "5")]
    discovery_timeout: u64,
}

impl Cli {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            port: self.port,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_retries: self.max_retries,
            discovery_timeout: Duration::from_secs(self.discovery_timeout),
            ..TransportConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()?;

    let config = cli.transport_config();
    log::info!("starting WizLights on port {} ({config:?})", config.port);

    let dispatcher = Arc::new(BulbCommandDispatcher::new(WizTransport::new(config)));
    let registry = Arc::new(build_registry(dispatcher));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(registry, stdin, tokio::io::stdout()).await?;
    Ok(())
}
