mod serve;

use std::error::Error;
use std::io::{IsTerminal, Write};
use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::model::config::Config;
use crate::model::task::{Task, TaskStatus};
use crate::sync::local::LocalTaskStore;
use crate::sync::store::{Outcome, SyncStore};
use crate::sync::switch::{
    SWITCH_CONFIRM_LABEL, SWITCH_MESSAGE, SWITCH_TITLE, StartDecision, SwitchConfirmation,
};

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch(cli: Cli, data_dir: &Path, config: &Config) -> CmdResult {
    let json = cli.json;
    let store = SyncStore::new(LocalTaskStore::open(data_dir)?);
    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Init => cmd_init(data_dir),
        Commands::Dashboard => cmd_dashboard(&store, json).await,
        Commands::List(args) => cmd_list(&store, args, json),
        Commands::Capture(args) => cmd_capture(&store, args, json).await,
        Commands::Start(args) => cmd_start(&store, &args.id, args.yes, config, json).await,
        Commands::Done(args) => cmd_status(&store, &args.id, TaskStatus::Done, json).await,
        Commands::Defer(args) => cmd_status(&store, &args.id, TaskStatus::Waiting, json).await,
        Commands::Status(args) => match parse_status_arg(&args.status)? {
            TaskStatus::Now => cmd_start(&store, &args.id, args.yes, config, json).await,
            status => cmd_status(&store, &args.id, status, json).await,
        },
        Commands::Rename(args) => cmd_rename(&store, args, json).await,
        Commands::Delete(args) => cmd_delete(&store, args, json).await,
        Commands::Review => cmd_review(&store, json).await,
        Commands::Serve => serve::run(store.commands()).await,
        Commands::Tui => crate::tui::run(store, config, data_dir).await,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Store = SyncStore<LocalTaskStore>;

/// Turn a failed store operation into the message it recorded
fn check(store: &Store, outcome: Outcome) -> CmdResult {
    match outcome {
        Outcome::Failed => Err(store
            .error()
            .unwrap_or_else(|| "command failed".to_string())
            .into()),
        Outcome::Skipped | Outcome::Applied => Ok(()),
    }
}

/// Find a task by full ID or unique ID prefix.
fn resolve_id(store: &Store, query: &str) -> Result<Task, Box<dyn Error>> {
    let tasks = store.commands().tasks()?;
    if let Some(task) = tasks.get(query) {
        return Ok(task.clone());
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(query)).collect();
    match matches.as_slice() {
        [task] => Ok((*task).clone()),
        [] => Err(format!("no task matching '{}'", query).into()),
        many => Err(format!(
            "'{}' matches {} tasks: {}",
            query,
            many.len(),
            many.iter()
                .map(|t| short_id(&t.id))
                .collect::<Vec<_>>()
                .join(", ")
        )
        .into()),
    }
}

fn print_task(store: &Store, id: &str, verb: &str, json: bool) -> CmdResult {
    let tasks = store.commands().tasks()?;
    let Some(task) = tasks.get(id) else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{} {}", verb, format_task_line(task));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// The data directory already exists once the store is open
fn cmd_init(data_dir: &Path) -> CmdResult {
    if config_io::write_default_config(data_dir)? {
        println!("initialized taskflow in {}", data_dir.display());
    } else {
        println!("taskflow already initialized in {}", data_dir.display());
    }
    Ok(())
}

async fn cmd_dashboard(store: &Store, json: bool) -> CmdResult {
    check(store, store.fetch_dashboard().await)?;
    let view = store.dashboard().unwrap_or_default();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_dashboard(&view) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_list(store: &Store, args: ListArgs, json: bool) -> CmdResult {
    let filter = args.status.as_deref().map(parse_status_arg).transpose()?;
    let collection = store.commands().tasks()?;
    let mut tasks: Vec<&Task> = collection
        .iter()
        .filter(|t| filter.is_none_or(|s| t.status == s))
        .collect();
    tasks.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&TaskListJson { tasks })?);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

async fn cmd_capture(store: &Store, args: CaptureArgs, json: bool) -> CmdResult {
    let text = args.text.join(" ");
    let outcome = store.quick_capture(&text).await;
    check(store, outcome)?;
    if outcome == Outcome::Skipped {
        return Err("nothing to capture".into());
    }
    let newest = store
        .commands()
        .tasks()?
        .iter()
        .filter(|t| t.original_input.as_deref() == Some(text.trim()))
        .max_by_key(|t| t.created_at)
        .map(|t| t.id.clone());
    match newest {
        Some(id) => print_task(store, &id, "captured", json),
        None => Ok(()),
    }
}

/// Every path into the active slot goes through here, so a switch is
/// always confirmed (or `--yes`d) before the current task is demoted.
async fn cmd_start(
    store: &Store,
    query: &str,
    yes: bool,
    config: &Config,
    json: bool,
) -> CmdResult {
    let task = resolve_id(store, query)?;
    check(store, store.fetch_dashboard().await)?;

    let mut switch = SwitchConfirmation::new();
    let outcome = match switch.request_start(store, &task.id).await {
        StartDecision::Started(Outcome::Skipped) => {
            return print_task(store, &task.id, "already active", json);
        }
        StartDecision::Started(outcome) => outcome,
        StartDecision::Pending { active, .. } => {
            if yes || !config.ui.confirm_switch || confirm_switch(&active)? {
                switch.confirm(store).await.unwrap_or(Outcome::Skipped)
            } else {
                switch.cancel();
                println!("cancelled");
                return Ok(());
            }
        }
    };
    check(store, outcome)?;
    print_task(store, &task.id, "started", json)
}

/// Ask on the terminal. Without a terminal there is nobody to ask.
fn confirm_switch(active: &str) -> Result<bool, Box<dyn Error>> {
    if !std::io::stdin().is_terminal() {
        return Err(format!(
            "task {} is active; pass --yes to switch",
            short_id(active)
        )
        .into());
    }
    eprintln!("{}", SWITCH_TITLE);
    eprintln!("{}", SWITCH_MESSAGE);
    eprint!("{}? [y/n] ", SWITCH_CONFIRM_LABEL);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Status changes that cannot take the active slot
async fn cmd_status(store: &Store, query: &str, status: TaskStatus, json: bool) -> CmdResult {
    let task = resolve_id(store, query)?;
    check(store, store.set_status(&task.id, status).await)?;
    let verb = match status {
        TaskStatus::Done => "done",
        TaskStatus::Waiting => "deferred",
        TaskStatus::Now | TaskStatus::Next | TaskStatus::Someday => "moved",
    };
    print_task(store, &task.id, verb, json)
}

async fn cmd_rename(store: &Store, args: RenameArgs, json: bool) -> CmdResult {
    let task = resolve_id(store, &args.id)?;
    let title = args.title.join(" ");
    check(store, store.rename_task(&task.id, &title).await)?;
    print_task(store, &task.id, "renamed", json)
}

async fn cmd_delete(store: &Store, args: IdArgs, json: bool) -> CmdResult {
    let task = resolve_id(store, &args.id)?;
    check(store, store.delete_task(&task.id).await)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("deleted {}", format_task_line(&task));
    }
    Ok(())
}

async fn cmd_review(store: &Store, json: bool) -> CmdResult {
    check(store, store.complete_review().await)?;
    let days = store
        .dashboard()
        .map(|d| d.review_due_in_days)
        .unwrap_or_default();
    if json {
        println!("{}", serde_json::json!({ "review_due_in_days": days }));
    } else {
        println!("review recorded; next {}", format_review(days));
    }
    Ok(())
}
