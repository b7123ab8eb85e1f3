use std::env;

use gitboard_server::config::loader::load_config;
use gitboard_server::jobs::RefreshScheduler;
use gitboard_server::{AppState, build_app_with_state, observability};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From GITBOARD_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (gitboard.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (GITBOARD_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present, before anything else reads the environment.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let (config_path, source) = resolve_config_path();
    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "configuration loaded"
    );
    observability::apply_logging_level(&cfg.logging.level);

    let state = match AppState::from_config(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    // Daily trending refresh in the background.
    let scheduler_shutdown = if cfg.jobs.enabled {
        match RefreshScheduler::new(state.trending.clone(), &cfg.jobs) {
            Ok(scheduler) => Some(scheduler.start()),
            Err(e) => {
                eprintln!("Scheduler initialization failed: {e}");
                std::process::exit(2);
            }
        }
    } else {
        tracing::info!("scheduled refresh disabled by config");
        None
    };

    let app = build_app_with_state(state);
    let addr = cfg.addr();

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!("listening on {addr}");
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {err}");
    }

    if let Some(shutdown) = scheduler_shutdown {
        let _ = shutdown.send(true);
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: GITBOARD_CONFIG
/// 3. Default: gitboard.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("GITBOARD_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("gitboard.toml".to_string(), ConfigSource::Default)
}
