// Main entrypoint for the applife binary.

use applife::app::{self, App, Server};
use applife::config::{Config, ConfigTrait};
use applife::workers::Heartbeat;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const CONFIG_PATH: &str = "cfg/applife.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/applife.cfg.local.yaml";

/// applife - runs servers until a terminating signal arrives
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    /// Stop on its own after this long (e.g. "30s", "1m")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    run_for: Option<Duration>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok(cfg),
        Err(_) => Config::load(CONFIG_PATH)
            .with_context(|| format!("failed to load config from {}", CONFIG_PATH)),
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let cfg = load_cfg(args.cfg)?;

    // Must be done after config is loaded
    configure_logger(&cfg);

    info!(
        component = "main",
        event = "config_loaded",
        app_name = cfg.name(),
        app_version = cfg.version(),
        "config loaded"
    );

    let mut servers: Vec<Arc<dyn Server>> = Vec::new();
    if let Some(heartbeat) = cfg.heartbeat().filter(|h| h.enabled) {
        servers.push(Arc::new(Heartbeat::new(heartbeat.interval())));
    }

    let mut opts = cfg.options();
    opts.push(app::servers(servers));
    let app = App::init(opts);

    app.start().context("failed to start application")?;

    if let Some(run_for) = args.run_for {
        let timed = app.clone();
        tokio::task::spawn(async move {
            tokio::time::sleep(run_for).await;
            info!(
                component = "main",
                event = "run_for_elapsed",
                run_for = %humantime::format_duration(run_for),
                "stopping application"
            );
            timed.stop();
        });
    }

    if let Err(e) = app.wait().await {
        error!(
            component = "main",
            scope = "app",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down application"
        );
        return Err(e.into());
    }

    Ok(())
}
