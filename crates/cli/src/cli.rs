use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};

/// Preview and arm recurring task reminders.
///
/// Tasks are read from a YAML file. Nothing here talks to a real wake-up
/// service: `replay` arms triggers against an in-memory service and prints
/// what it would have registered.
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Preview and arm recurring task reminders")]
pub struct CliArgs {
    /// Configuration profile, e.g. PROD
    #[arg(long, global = true, env = "CADENCE_PROFILE")]
    pub profile: Option<String>,

    /// Task file (default: CADENCE_TASKS_FILE or data/tasks/example.yaml)
    #[arg(long, global = true)]
    pub tasks_file: Option<PathBuf>,

    /// Reference time as RFC 3339, e.g. 2025-07-10T08:00:00+02:00 (default: now)
    #[arg(long, global = true, value_parser = parse_reference_time)]
    pub now: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print upcoming occurrences of every reminder of a task
    Preview {
        /// Task id
        #[arg(long)]
        task: String,

        /// Occurrences per reminder (default: CADENCE_PREVIEW_COUNT or 5)
        #[arg(long)]
        count: Option<u32>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Boot replay: arm every task against the in-memory trigger service
    Replay {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a one-line summary of every task's recurrence
    Describe,

    /// Print the effective configuration as JSON
    Config,
}

fn parse_reference_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("invalid RFC 3339 time '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn parses_preview_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "cadence",
            "preview",
            "--task",
            "stretch",
            "--count",
            "3",
            "--now",
            "2025-07-10T08:00:00Z",
            "--tasks-file",
            "tasks.yaml",
        ])
        .unwrap();

        assert_eq!(args.tasks_file, Some(PathBuf::from("tasks.yaml")));
        assert_eq!(
            args.now.map(|t| t.with_timezone(&Utc)),
            Some(Utc.with_ymd_and_hms(2025, 7, 10, 8, 0, 0).unwrap())
        );
        match args.command {
            Command::Preview { task, count, json } => {
                assert_eq!(task, "stretch");
                assert_eq!(count, Some(3));
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_reference_time() {
        let err = CliArgs::try_parse_from(["cadence", "replay", "--now", "tomorrow"]).unwrap_err();
        assert!(err.to_string().contains("invalid RFC 3339 time"));
    }

    #[test]
    fn describe_takes_no_arguments() {
        let args = CliArgs::try_parse_from(["cadence", "describe"]).unwrap();
        assert!(matches!(args.command, Command::Describe));
        assert!(args.now.is_none());
    }

    #[test]
    fn profile_falls_back_to_env() {
        std::env::set_var("CADENCE_PROFILE", "STAGING");
        let from_env = CliArgs::try_parse_from(["cadence", "config"]).unwrap();
        let from_flag = CliArgs::try_parse_from(["cadence", "config", "--profile", "PROD"]).unwrap();
        std::env::remove_var("CADENCE_PROFILE");

        assert_eq!(from_env.profile.as_deref(), Some("STAGING"));
        assert_eq!(from_flag.profile.as_deref(), Some("PROD"));
        assert!(matches!(from_env.command, Command::Config));
    }
}
