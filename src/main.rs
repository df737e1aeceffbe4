use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nanjil::config::NanjilConfig;
use nanjil::grpc::GrpcServer;
use nanjil::ratelimit::{spawn_sweeper, RateLimiter, SharedRateLimiter};

/// Rate limiting and dispatch estimation service for the Nanjil booking API.
#[derive(Parser, Debug)]
#[command(name = "nanjil", version, about)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "NANJIL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the gRPC listen address
    #[arg(long)]
    grpc_addr: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting Nanjil dispatch service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = NanjilConfig::load(args.config.as_deref())?;
    if let Some(addr) = args.grpc_addr {
        config.server.grpc_addr = addr;
    }
    info!(
        grpc_addr = %config.server.grpc_addr,
        routes = config.rate_limiting.policies.routes.len(),
        "Configuration loaded"
    );

    // Initialize the rate limiter
    let rate_limiter: SharedRateLimiter = Arc::new(RateLimiter::system());
    let sweeper = match config.rate_limiting.sweep_interval_secs {
        0 => {
            warn!("Rate limit sweeping disabled, expired entries are only reset on reuse");
            None
        }
        secs => Some(spawn_sweeper(
            Arc::clone(&rate_limiter),
            Duration::from_secs(secs),
        )),
    };

    let grpc_server = GrpcServer::new(
        config.server.grpc_addr,
        rate_limiter,
        config.rate_limiting.policies,
    );

    // Run the server with graceful shutdown on Ctrl+C
    grpc_server.serve_with_shutdown(shutdown_signal()).await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    info!("Nanjil dispatch service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
