//! Reverse proxy configurator.
//!
//! # Architecture Overview
//!
//! ```text
//!   proxy.yaml / proxy.toml
//!          │
//!          ▼
//!   ┌─────────────┐    ┌──────────────────────────────────────┐    ┌─────────────────┐
//!   │   config    │───▶│            configurator              │───▶│ EffectiveConfig │
//!   │   loader    │    │  walker → stack → registry → handlers│    │  (global + N    │
//!   └─────────────┘    │              │                       │    │  registrations) │
//!          ▲           │              ▼                       │    └────────┬────────┘
//!          │           │   tls (shared, copy-on-write)        │             │
//!   ┌─────────────┐    └──────────────────────────────────────┘             ▼
//!   │   watcher   │                                                ┌─────────────────┐
//!   │ (hot reload)│───────────── ArcSwap::store ──────────────────▶│   admin API     │
//!   └─────────────┘                                                └─────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use reverse_proxy_configurator::admin::{setup_admin_router, AppState};
use reverse_proxy_configurator::config::watcher::ConfigWatcher;
use reverse_proxy_configurator::configurator::{registry, ConfiguratorOptions, DEFAULT_MAX_DEPTH};
use reverse_proxy_configurator::lifecycle::{self, signals, Shutdown};
use reverse_proxy_configurator::observability::logging;

#[derive(Parser)]
#[command(name = "reverse-proxy-configurator")]
#[command(about = "Scoped configuration engine for a reverse proxy", long_about = None)]
struct Cli {
    /// CA bundle loaded into the root TLS context.
    #[arg(long, global = true)]
    ca_bundle: Option<PathBuf>,

    /// Maximum nesting of scopes, global included.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a configuration file and print the result as JSON
    Check { file: PathBuf },
    /// Apply a configuration file, watch it, and serve the admin API
    Serve {
        file: PathBuf,

        #[arg(long, default_value = "127.0.0.1:8081")]
        admin_address: SocketAddr,

        /// Require `Authorization: Bearer <key>` on the admin API.
        #[arg(long, env = "PROXY_ADMIN_API_KEY")]
        api_key: Option<String>,

        /// Do not reload on file changes.
        #[arg(long)]
        no_watch: bool,
    },
    /// List known directives and where they are allowed
    Directives,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let options = ConfiguratorOptions {
        max_depth: cli.max_depth,
        default_ca_bundle: cli.ca_bundle,
        ..ConfiguratorOptions::default()
    };

    let result = match cli.command {
        Commands::Check { file } => check(&file, &options),
        Commands::Serve {
            file,
            admin_address,
            api_key,
            no_watch,
        } => serve(file, options, admin_address, api_key, no_watch).await,
        Commands::Directives => {
            directives();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn check(file: &std::path::Path, options: &ConfiguratorOptions) -> Result<(), Box<dyn std::error::Error>> {
    let effective = lifecycle::load(file, options)?;
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

fn directives() {
    for directive in registry().iter() {
        let deferred = if directive.deferred { " (deferred)" } else { "" };
        println!("{:<28} {}{}", directive.name, directive.levels, deferred);
    }
}

async fn serve(
    file: PathBuf,
    options: ConfiguratorOptions,
    admin_address: SocketAddr,
    api_key: Option<String>,
    no_watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("reverse-proxy-configurator v{} starting", env!("CARGO_PKG_VERSION"));

    let initial = lifecycle::load(&file, &options)?;
    let state = AppState::new(initial, api_key);
    let shutdown = Shutdown::new();

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = if no_watch {
        None
    } else {
        let (watcher, mut updates) = ConfigWatcher::new(&file, options);
        let handle = watcher.run()?;

        let state = state.clone();
        let mut stop = shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(next) = updates.recv() => {
                        let generation = state.replace(next);
                        tracing::info!(generation, "Configuration reloaded");
                    }
                    _ = stop.recv() => break,
                    else => break,
                }
            }
        });
        Some(handle)
    };

    let listener = TcpListener::bind(admin_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    let app = setup_admin_router(state);
    let stop = shutdown.subscribe();
    let server = axum::serve(listener, app).with_graceful_shutdown(Shutdown::wait(stop));

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    server.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
