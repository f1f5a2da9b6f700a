mod check_commands;
mod config_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    tougao_config::{Severity, TougaoConfig},
    tougao_submission::{InMemorySubmissionStore, SubmissionFlow},
    tougao_telegram::{TelegramChannelPublisher, TelegramOutbound},
};

#[derive(Parser)]
#[command(name = "tougao", about = "tougao: Telegram submission bot", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "TOUGAO_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default when no subcommand is provided).
    Run,
    /// Check a caption against the submission template without the bot.
    Check {
        /// File holding the caption; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Explicit `--config` must load; otherwise fall back to discovery.
/// Environment overrides apply either way.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<TougaoConfig> {
    let mut config = match path {
        Some(path) => tougao_config::load_config(path)?,
        None => tougao_config::discover_and_load(),
    };
    tougao_config::apply_env_overrides(&mut config);
    Ok(config)
}

async fn run(config: TougaoConfig) -> anyhow::Result<()> {
    let result = tougao_config::validate(&config);
    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            Severity::Error => error!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Warning => warn!(path = %diagnostic.path, "{}", diagnostic.message),
        }
    }
    if result.has_errors() {
        anyhow::bail!(
            "configuration has {} error(s); run `tougao config validate` for details",
            result.count(Severity::Error)
        );
    }

    let bot = tougao_telegram::build_bot(&config.telegram)?;
    let publisher = TelegramChannelPublisher::new(bot.clone(), &config.publish)?;
    let flow = Arc::new(SubmissionFlow::new(
        Arc::new(InMemorySubmissionStore::new()),
        Arc::new(TelegramOutbound::new(bot.clone())),
        Arc::new(publisher),
        config.templates.clone(),
    ));

    let polling = tougao_telegram::start_polling(bot, &config.telegram, flow)
        .await
        .context("failed to connect to telegram")?;
    info!(channel_id = %config.publish.channel_id, "tougao running, press Ctrl-C to stop");

    let stopped = polling.cancel_token();
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("shutting down");
            polling.shutdown().await;
            Ok(())
        },
        () = stopped.cancelled() => {
            polling.join().await;
            anyhow::bail!("telegram polling stopped unexpectedly")
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "tougao starting");
            let config = load_config(cli.config.as_deref())?;
            run(config).await
        },
        Some(Commands::Check { file }) => check_commands::handle_check(file.as_deref()),
        Some(Commands::Config { action }) => {
            let config = load_config(cli.config.as_deref())?;
            config_commands::handle_config(action, &config)
        },
    }
}
