//! joinvote daemon: puts Telegram join requests to a member vote.

mod metrics_server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use joinvote_gateway::{Gateway, InboundEvent};
use joinvote_i18n::TextResolver;
use joinvote_node::{
    init_logging, LogFormat, NodeConfig, RequestRouter, Services, SessionMetrics,
    SessionRegistry, SessionSettings, ShutdownController,
};
use joinvote_store_lmdb::LmdbEnvironment;
use joinvote_telegram::{TelegramClient, UpdatePoller};
use tokio::sync::mpsc;

/// Inbound events buffered between the poller and the router.
const EVENT_QUEUE: usize = 256;

/// How long each background task gets to finish after shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "joinvote", about = "Telegram join-request voting bot")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "JOINVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Bot API token.
    #[arg(long, env = "JOINVOTE_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Data directory for the LMDB store.
    #[arg(long, env = "JOINVOTE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "JOINVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "JOINVOTE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long, env = "JOINVOTE_ENABLE_METRICS")]
    metrics: bool,

    /// Metrics port.
    #[arg(long, env = "JOINVOTE_METRICS_PORT")]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the bot (default).
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => NodeConfig::default(),
    };

    if let Some(token) = &cli.token {
        config.bot_token = token.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(port) = cli.metrics_port {
        config.metrics_port = port;
    }
    config.enable_metrics |= cli.metrics;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::PrintConfig => {
            let mut shown = config;
            if !shown.bot_token.is_empty() {
                shown.bot_token = "<redacted>".to_string();
            }
            print!("{}", shown.to_toml_string()?);
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);
    config.validate()?;

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("failed to open store at {}", config.data_dir.display()))?;
    tracing::info!(data_dir = %config.data_dir.display(), "store opened");

    let client = Arc::new(TelegramClient::new(&config.bot_token, &config.api_url));
    let identity = client
        .bot_identity()
        .await
        .context("failed to reach the Bot API")?;
    tracing::info!(bot = %identity.username, id = %identity.id, "connected to Bot API");

    let metrics = SessionMetrics::new()?;
    let registry = Arc::new(SessionRegistry::new().with_gauge(metrics.active_sessions.clone()));
    let mut settings = SessionSettings::from_config(&config);
    if settings.bot_username.is_none() {
        settings.bot_username = Some(identity.username.clone());
    }
    let services = Arc::new(Services {
        ledger: Arc::new(env.ledger()),
        policies: Arc::new(env.policy_store()),
        gateway: client.clone(),
        texts: TextResolver::new(),
        metrics,
        settings,
    });
    let router = Arc::new(RequestRouter::new(Arc::clone(&services), registry));
    let shutdown = ShutdownController::new();

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
    let poller = UpdatePoller::new(Arc::clone(&client), config.poll_timeout_secs)
        .skip_pending(config.skip_pending_updates);

    let mut handles = vec![
        tokio::spawn(poller.run(events_tx, shutdown.subscribe())),
        tokio::spawn(route_events(Arc::clone(&router), events_rx)),
    ];
    if config.enable_metrics {
        handles.push(tokio::spawn(metrics_server::serve_metrics(
            Arc::clone(&services),
            config.metrics_port,
            shutdown.subscribe(),
        )));
    }

    tracing::info!("joinvote running");
    shutdown.wait_for_signal().await;

    let aborted = router.shutdown();
    tracing::info!(aborted, "shutdown signal received, stopping");
    for handle in handles {
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err() {
            tracing::warn!("background task did not stop in time");
        }
    }

    tracing::info!("joinvote exited cleanly");
    Ok(())
}

/// Hand each event to the router on its own task so one slow platform call
/// never holds up the rest. Ends when the poller drops its sender.
async fn route_events(router: Arc<RequestRouter>, mut events: mpsc::Receiver<InboundEvent>) {
    while let Some(event) = events.recv().await {
        let router = Arc::clone(&router);
        tokio::spawn(async move { router.handle_event(event).await });
    }
    tracing::debug!("event channel closed");
}
