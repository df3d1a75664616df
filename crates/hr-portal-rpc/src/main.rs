//! HR portal dev servers - mock ERP backend, CORS proxy, and connectivity probe.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hr_portal_core::DevConfig;
use hr_portal_rpc::{
    reports_to_json, run_probe, start_backend, start_proxy, BackendState, ProxyState,
};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "hr-portal-rpc")]
#[command(about = "Development servers for the HR portal")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", global = true)]
    host: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the seeded HR dataset on the ERP endpoints
    MockBackend {
        #[arg(short, long, default_value_t = DevConfig::BACKEND_PORT)]
        port: u16,

        /// Browser origin allowed by CORS
        #[arg(long, default_value = DevConfig::UI_ORIGIN)]
        allow_origin: String,
    },
    /// Forward browser requests to the ERP backend
    Proxy {
        #[arg(short, long, default_value_t = DevConfig::PROXY_PORT)]
        port: u16,

        /// Backend to forward to
        #[arg(long, default_value = DevConfig::BACKEND_URL)]
        target: Url,

        /// Browser origin allowed by CORS
        #[arg(long, default_value = DevConfig::UI_ORIGIN)]
        allow_origin: String,
    },
    /// Check that the backend and the proxy answer
    Probe {
        #[arg(long, default_value = DevConfig::BACKEND_URL)]
        backend: String,

        #[arg(long, default_value = DevConfig::PROXY_URL)]
        proxy: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match args.command {
        Command::MockBackend { port, allow_origin } => {
            let state = Arc::new(BackendState::seeded());
            let addr = start_backend(state, &args.host, port, &allow_origin).await?;
            info!("Mock backend running on http://{}", addr);
            info!("Development login: {} / {}", DevConfig::LOGIN, DevConfig::PASSWORD);
        }
        Command::Proxy {
            port,
            target,
            allow_origin,
        } => {
            let state = Arc::new(ProxyState::new(target)?);
            let addr = start_proxy(state, &args.host, port, &allow_origin).await?;
            info!("Proxy running on http://{}", addr);
        }
        Command::Probe {
            backend,
            proxy,
            json,
        } => {
            let reports = run_probe(&backend, &proxy).await;
            if json {
                println!("{}", reports_to_json(&reports)?);
            } else {
                for report in &reports {
                    println!("{}", report);
                }
            }
            if reports.iter().any(|r| !r.reachable) {
                anyhow::bail!("one or more endpoints are unreachable");
            }
            return Ok(());
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
