mod args;
mod config;
mod dirs;
mod scheduler;

use std::io;
use std::net::SocketAddr;

use clap::Parser;
use cmg_app::{AppPaths, AppState, ensure_app_data_dir};
use http_api::HttpState;
use tracing::{info, warn};

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = config::load_or_create(cli.config.as_deref()).map_err(io::Error::other)?;
    if config.created {
        info!(file = %config.paths.file.display(), "created default config");
    }
    let data_dir = dirs::resolve_data_dir(config.config.data_dir.as_ref()).map_err(io::Error::other)?;
    let paths = AppPaths::new(data_dir).with_spool_dir(config.config.monitor.spool_dir.clone());
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    info!(
        db = %paths.db_path.display(),
        spool = %paths.spool_dir.display(),
        "using data dir"
    );

    let app_state = AppState::new(&paths, config.config.monitor.clone());
    if app_state.is_fresh_db() {
        info!(db = %paths.db_path.display(), "creating database");
    }
    app_state
        .initialize()
        .map_err(|err| io::Error::other(format!("failed to initialize: {err}")))?;

    match cli.command {
        Command::Tick => {
            let ingest = app_state.services.ingest.clone();
            let report = tokio::task::spawn_blocking(move || ingest.tick()).await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Aggregates { hours } => {
            let rows = app_state.services.readings.aggregates(hours)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Serve { port, no_scheduler } => {
            let port = port.unwrap_or(config.config.port);
            serve(app_state, port, no_scheduler).await?;
        }
    }
    Ok(())
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cmg=info".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

async fn serve(app_state: AppState, port: u16, no_scheduler: bool) -> Result<(), io::Error> {
    let scheduler = (!no_scheduler).then(|| scheduler::spawn_hourly(app_state.clone()));
    let router = http_api::router(HttpState::new(app_state));

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!(port, actual_port, "configured port was unavailable");
    }
    info!(url = %format!("http://127.0.0.1:{actual_port}"), "cmg monitor API is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
