use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use taskflow::cli::commands::{Cli, Commands};
use taskflow::cli::handlers;
use taskflow::io::config_io;
use taskflow::io::data_dir::resolve_data_dir;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "taskflow.log";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    // A broken config is reported by the command itself
    let config = config_io::read_config(&data_dir);
    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.log.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    let to_file = matches!(cli.command, Some(Commands::Tui));
    if let Err(e) = init_tracing(&level, to_file.then_some(data_dir.as_path())) {
        eprintln!("warning: {}", e);
    }

    let result = match config {
        Ok(config) => handlers::dispatch(cli, &data_dir, &config).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// `TASKFLOW_LOG` wins over the configured level. The TUI owns the terminal,
/// so it logs to a file in the data directory instead of stderr.
fn init_tracing(
    level: &str,
    log_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_env("TASKFLOW_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()?;
        }
    }
    Ok(())
}
