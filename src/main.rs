//! cors-relay
//!
//! Forwards every request to one fixed upstream origin and relays the answer
//! with permissive CORS headers, so browser apps on other origins can call it.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!     Client Request     │                  cors-relay                  │
//!     ───────────────────┼─▶ http::server ─▶ proxy::handler             │
//!                        │                    ├─ OPTIONS → preflight ───┼─▶ 200 + CORS
//!                        │                    ├─ translate (URL, Host)  │
//!                        │                    ├─ dispatch (timeout) ────┼─▶ Upstream
//!     Client Response    │                    └─ relay (+CORS) / 502 ◀──┼── origin
//!     ◀──────────────────┼──────────────────────────┘                   │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{resolve_config, ConfigOverrides, LogFormat};
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::Shutdown;
use cors_relay::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "cors-relay", version)]
#[command(about = "Transparent HTTP relay that adds CORS headers", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CORS_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "CORS_RELAY_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "CORS_RELAY_PORT")]
    port: Option<u16>,

    /// Upstream origin, e.g. http://127.0.0.1:7001
    #[arg(short, long, env = "CORS_RELAY_UPSTREAM")]
    upstream: Option<String>,

    /// Upstream timeout in seconds
    #[arg(long, env = "CORS_RELAY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level or tracing filter directive
    #[arg(long, env = "CORS_RELAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, env = "CORS_RELAY_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            upstream: self.upstream.clone(),
            timeout_secs: self.timeout_secs,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.origin,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
