//! Console front end for Taskminder.
//!
//! # Responsibility
//! - Load configuration, start logging and open the task database.
//! - Treat stdin lines as inbound chat messages from one owner and stdout as
//!   the outbound chat, with the reminder scheduler running alongside.
//! - Stop the scheduler cleanly on end of input or Ctrl-C.

mod command;
mod console;

use anyhow::Context;
use clap::Parser;
use command::{parse_message, Parsed};
use console::{Console, ConsoleSink};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use taskminder_core::{
    core_version, default_log_level, init_logging, AppConfig, OwnerId, ReminderScheduler, Reply,
    SqliteTaskStore, TaskDispatcher, TaskStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "taskminder", version, about = "Task tracker with deadline reminders")]
struct Cli {
    /// Configuration file; defaults to ./taskminder.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Owner id used for every message read from stdin.
    #[arg(long, default_value_t = 1)]
    owner: OwnerId,

    /// Overrides `database_path` from the configuration.
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let log_dir = match config.log_dir.take() {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd.join("logs"),
    };
    let log_level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&log_level, &log_dir).context("initializing logging")?;

    let store: Arc<dyn TaskStore> = Arc::new(
        SqliteTaskStore::open(&config.database_path).with_context(|| {
            format!("opening task database `{}`", config.database_path.display())
        })?,
    );

    let console = Console::stdout();
    let cancel = CancellationToken::new();
    let scheduler = ReminderScheduler::new(
        store.clone(),
        Arc::new(ConsoleSink::new(console.clone())),
        config.reminder,
    )
    .spawn(cancel.clone());
    let dispatcher = TaskDispatcher::new(store);

    info!(
        "event=cli_start module=cli status=ok core_version={} owner_id={} database={}",
        core_version(),
        cli.owner,
        config.database_path.display()
    );
    console.write_line(&Reply::Help.to_string()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("event=cli_interrupt module=cli status=ok");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let reply = match parse_message(cli.owner, &line) {
            Parsed::Request(request) => dispatcher.dispatch(request).to_string(),
            Parsed::Hint(hint) => hint.to_string(),
            Parsed::Empty => continue,
        };
        if let Err(err) = console.write_line(&reply).await {
            warn!("event=reply_send module=cli status=error error={err}");
        }
    }

    cancel.cancel();
    scheduler.await.context("joining reminder scheduler")?;
    info!("event=cli_stop module=cli status=ok");
    Ok(())
}
