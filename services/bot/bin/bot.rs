//! Main Entrypoint for the Quiz Bot
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the question bank and the quiz engine.
//! 4. Polling Telegram until SIGINT or SIGTERM arrives.
//!
//! With `--check` it audits the question bank instead and exits.

use anyhow::Context;
use clap::Parser;
use quiz_bot::{audit, config, telegram};
use quiz_core::{QuizEngine, bank::FileQuestionBank};
use std::{path::PathBuf, sync::Arc};
use teloxide::Bot;
use tracing::{Level, info, warn};

#[derive(Parser, Debug)]
#[command(name = "quiz-bot", version, about = "Grade, subject and unit quiz bot for Telegram")]
struct Args {
    /// Question bank root holding grade{G}/{subject}/unit{U}.json files.
    /// Overrides QUIZ_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Load every unit in the question bank, print a report and exit.
    #[arg(long)]
    check: bool,
}

/// Resolves once the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
}

async fn check_bank(data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    config::load_dotenv();
    init_logging(config::log_level_from_env().context("Failed to load configuration")?);

    let data_dir = data_dir.unwrap_or_else(config::data_dir_from_env);
    info!(data_dir = %data_dir.display(), "Auditing question bank...");
    let report = audit::audit_bank(&FileQuestionBank::new(&data_dir)).await;
    print!("{report}");

    if !report.is_healthy() {
        anyhow::bail!("{} unit file(s) could not be loaded", report.broken.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.check {
        return check_bank(args.data_dir).await;
    }

    // --- 1. Load Configuration ---
    let mut config = config::Config::from_env().context("Failed to load configuration")?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    // --- 2. Initialize Logging ---
    init_logging(config.log_level);
    info!("Configuration loaded. Initializing quiz engine...");

    // --- 3. Initialize the Question Bank and Engine ---
    if !config.data_dir.is_dir() {
        warn!(
            data_dir = %config.data_dir.display(),
            "Question bank directory does not exist; every unit will report no questions."
        );
    }
    let bank = Arc::new(FileQuestionBank::new(&config.data_dir));
    let engine = Arc::new(QuizEngine::new(bank));

    // --- 4. Start Polling ---
    info!(
        data_dir = %config.data_dir.display(),
        "Bot configured. Polling for updates..."
    );
    telegram::run(Bot::new(config.bot_token.clone()), engine.clone(), shutdown_signal()).await;

    info!(
        sessions = engine.sessions().len().await,
        "Bot has shut down."
    );
    Ok(())
}
