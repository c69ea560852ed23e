use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtc_signal_relay::config::AppConfig;
use rtc_signal_relay::state::AppState;
use rtc_signal_relay::web;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

/// rtc-signal-relay command line arguments
#[derive(Parser, Debug)]
#[command(name = "rtc-signal-relay")]
#[command(version, about = "Minimal WebRTC signaling relay", long_about = None)]
struct CliArgs {
    /// JSON configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address (overrides config file)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    address: Option<String>,

    /// HTTP port (overrides config file)
    #[arg(short = 'p', long, value_name = "PORT")]
    http_port: Option<u16>,

    /// Directory holding the browser client assets
    #[arg(long, value_name = "DIR")]
    public_dir: Option<PathBuf>,

    /// Signaling URL substituted into the entry template
    #[arg(long, env = "SIGNALING_URL", value_name = "URL")]
    signaling_url: Option<String>,

    /// Serve the static index instead of rendering the template
    #[arg(long)]
    no_template: bool,

    /// Log level (error, warn, info, verbose, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for verbose, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(args.log_level, args.verbose);

    tracing::info!("Starting rtc-signal-relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            AppConfig::load(path).await?
        }
        None => AppConfig::default(),
    };

    // Apply CLI argument overrides to config (only if explicitly specified)
    if let Some(addr) = args.address {
        config.web.bind_address = addr;
    }
    if let Some(port) = args.http_port {
        config.web.http_port = port;
    }
    if let Some(dir) = args.public_dir {
        config.assets.public_dir = dir;
    }
    if let Some(url) = args.signaling_url {
        config.signaling.url = url;
    }
    if args.no_template {
        config.assets.template = None;
    }

    config.validate()?;
    let addr = config.listen_addr()?;

    tracing::info!("Public directory: {}", config.assets.public_dir.display());
    match &config.assets.template {
        Some(template) => tracing::info!(
            "Rendering {} with signaling URL {}",
            template,
            config.signaling.url
        ),
        None => tracing::info!("Templating disabled, serving {}", config.assets.index),
    }

    let state = AppState::new(config);
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    tracing::info!("Server running at http://{}", listener.local_addr()?);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
    {
        tracing::error!("HTTP server error: {}", e);
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Verbose,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "rtc_signal_relay=error,tower_http=error",
        LogLevel::Warn => "rtc_signal_relay=warn,tower_http=warn",
        LogLevel::Info => "rtc_signal_relay=info,tower_http=info",
        LogLevel::Verbose => "rtc_signal_relay=debug,tower_http=info",
        LogLevel::Debug => "rtc_signal_relay=debug,tower_http=debug",
        LogLevel::Trace => "rtc_signal_relay=trace,tower_http=debug",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}
