use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tf", about = concat!("taskflow v", env!("CARGO_PKG_VERSION"), " - one task at a time"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a commented taskflow.toml
    Init,
    /// Show the active task and the next and waiting queues (default)
    Dashboard,
    /// List every task, including someday and done
    List(ListArgs),
    /// Capture a new task from free text (@context, #tags, "tomorrow", ...)
    Capture(CaptureArgs),
    /// Make a task the active one
    Start(StartArgs),
    /// Mark a task done
    Done(IdArgs),
    /// Move a task to waiting
    Defer(IdArgs),
    /// Set any status (now, next, waiting, someday, done)
    Status(StatusArgs),
    /// Change a task's title
    Rename(RenameArgs),
    /// Permanently delete a task
    Delete(IdArgs),
    /// Record that the weekly review is done
    Review,
    /// Serve JSON commands on stdin/stdout, one per line
    Serve,
    /// Open the terminal UI
    Tui,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks with this status
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct CaptureArgs {
    /// Task text; several words are joined with spaces
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID or a unique prefix of it
    pub id: String,
}

#[derive(Args)]
pub struct StartArgs {
    /// Task ID or a unique prefix of it
    pub id: String,
    /// Switch without asking, even if another task is active
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task ID or a unique prefix of it
    pub id: String,
    /// New status
    pub status: String,
    /// When the new status is `now`, switch without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Task ID or a unique prefix of it
    pub id: String,
    /// New title
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub title: Vec<String>,
}
