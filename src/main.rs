//! Git gateway.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                     GIT GATEWAY                       │
//!   Request / Event      │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!   ─────────────────────┼─▶│   http   │──▶│  dispatch  │──▶│  credentials  │   │
//!                        │  │ harness  │   │            │   │  (scope)      │   │
//!                        │  └──────────┘   └─────┬──────┘   └───────────────┘   │
//!                        │                       │                              │
//!                        │             ┌─────────┴─────────┐                    │
//!                        │             ▼                   ▼                    │
//!                        │      ┌────────────┐      ┌────────────┐              │
//!                        │      │  routing   │      │  security  │              │
//!                        │      │  + guards  │      │   (CORS)   │              │
//!                        │      └─────┬──────┘      └────────────┘              │
//!                        │            ▼                                         │
//!   Response             │      ┌────────────┐                                  │
//!   ◀────────────────────┼──────│   proxy    │◀──────────────────────────────── ┼── Upstream API
//!                        │      └────────────┘                                  │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use git_gateway::config::{load_config, Environment, GatewayConfig};
use git_gateway::dispatch::Dispatcher;
use git_gateway::http::{GatewayEvent, HttpServer};
use git_gateway::lifecycle::{shutdown_signal, Shutdown};
use git_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "git-gateway")]
#[command(about = "Scoped HTTP gateway to a source-control API", long_about = None, version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local HTTP server (default)
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Dispatch one API Gateway v2 JSON event and print the response
    Invoke {
        /// Event file; reads stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env = Arc::new(Environment::from_process());
    let mut config = load_config(cli.config.as_deref(), &env)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        base_path = %config.gateway.base_path,
        upstream = %config.upstream.base_url,
        local_dev = config.local_dev.enabled,
        "Configuration loaded"
    );

    let dispatcher = Arc::new(Dispatcher::new(&config, env)?);

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }
            serve(config, dispatcher).await?;
        }
        Commands::Invoke { event } => {
            invoke(&dispatcher, event.as_deref()).await?;
        }
    }

    Ok(())
}

async fn serve(config: GatewayConfig, dispatcher: Arc<Dispatcher>) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(&config.listener, dispatcher)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn invoke(dispatcher: &Dispatcher, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let event = GatewayEvent::from_lambda_json(&json)?;
    let response = dispatcher.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
