mod cli;
mod report;
mod tasks_file;
mod terminal;

use std::fmt::Display;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Parser;
use tracing::{error, info, warn};

use cadence_alarms::{AlarmScheduler, InMemoryTaskSource, InMemoryTriggerService};
use cadence_core::config::{load_dotenv, Config};
use cadence_core::{Task, TaskId};
use cadence_recurrence::OccurrenceGenerator;

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    load_dotenv();
    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    config.log_summary();

    let tasks_path = args
        .tasks_file
        .clone()
        .unwrap_or_else(|| config.preview.tasks_file.clone());
    let tasks = match args.command {
        Command::Config => Vec::new(),
        _ => {
            let tasks = tasks_file::load_tasks(&tasks_path)?;
            info!(tasks = tasks.len(), file = %tasks_path.display(), "Tasks loaded");
            tasks
        }
    };

    // The only real-clock read: everything below takes `now` explicitly.
    let result = match args.now {
        Some(now) => run(&args.command, &config, tasks, &now, &terminal).await,
        None => match config.scheduler.utc_offset() {
            Some(offset) => {
                let now = Utc::now().with_timezone(&offset);
                run(&args.command, &config, tasks, &now, &terminal).await
            }
            None => run(&args.command, &config, tasks, &Local::now(), &terminal).await,
        },
    };

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}

async fn run<Tz>(
    command: &Command,
    config: &Config,
    tasks: Vec<Task>,
    now: &DateTime<Tz>,
    terminal: &Terminal,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match command {
        Command::Preview { task, count, json } => {
            let task = tasks
                .iter()
                .find(|t| t.id().as_str() == task.as_str())
                .with_context(|| format!("task '{task}' not found"))?;
            let count = count.unwrap_or(config.preview.count) as usize;
            let generator = OccurrenceGenerator::from_config(&config.scheduler);

            let preview = report::preview_task(task, &generator, count, now);
            if *json {
                terminal.print_json(&preview)
            } else {
                terminal.print_preview(&preview)
            }
        }

        Command::Describe => {
            for task in &tasks {
                terminal.print_summary_line(
                    task.id().as_str(),
                    &task.task_type().to_string(),
                    &report::schedule_summary(task),
                )?;
            }
            Ok(())
        }

        Command::Config => terminal.print_json(&config.summary()),

        Command::Replay { json } => {
            let order: Vec<TaskId> = tasks.iter().map(|t| t.id().clone()).collect();
            let source = Arc::new(InMemoryTaskSource::from_tasks(tasks));
            if source.is_empty() {
                warn!("No tasks to replay");
            }
            info!(tasks = source.len(), "Replaying alarms");
            let triggers = Arc::new(InMemoryTriggerService::new());
            let scheduler =
                AlarmScheduler::from_config(source, triggers.clone(), &config.scheduler);

            let report = scheduler.replay_all(order, now).await;
            let rows = report::replay_rows(&report, &now.timezone());
            let live = triggers.live_triggers().len();
            if *json {
                terminal.print_json(&serde_json::json!({
                    "tasks": rows,
                    "live_triggers": live,
                }))
            } else {
                terminal.print_replay(&rows, live)
            }
        }
    }
}
