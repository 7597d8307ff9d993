use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde::Serialize;

use crate::report::{ReplayRow, ReplayStatus, TaskPreview};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const ARMED: Color = Color::Green;
    const SKIPPED: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

/// Writes command output to stdout.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Pretty-printed JSON.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_preview(&self, preview: &TaskPreview) -> Result<()> {
        let mut stdout = io::stdout();
        let title = if preview.title.is_empty() {
            String::new()
        } else {
            format!(" ({})", preview.title)
        };
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(&preview.task_id),
            ResetColor,
            Print(format!("{title}: {}\n", preview.schedule)),
        )?;
        match &preview.alarms_reason {
            None => execute!(
                stdout,
                SetForegroundColor(Colors::ARMED),
                Print("  alarms: armed\n"),
                ResetColor
            )?,
            Some(reason) => execute!(
                stdout,
                SetForegroundColor(Colors::SKIPPED),
                Print(format!("  alarms: not armed ({reason})\n")),
                ResetColor
            )?,
        }

        for reminder in &preview.reminders {
            execute!(stdout, Print(format!("  {} at {}\n", reminder.reminder_id, reminder.time)))?;
            if reminder.occurrences.is_empty() {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print("    no upcoming occurrences\n"),
                    ResetColor
                )?;
            }
            for at in &reminder.occurrences {
                execute!(stdout, Print(format!("    {at}\n")))?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// One line per task: id, type and schedule summary.
    pub fn print_summary_line(&self, task_id: &str, task_type: &str, summary: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{task_id:<20}")),
            SetForegroundColor(Colors::DIM),
            Print(format!("{task_type:<8}")),
            ResetColor,
            Print(format!("{summary}\n")),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_replay(&self, rows: &[ReplayRow], live_triggers: usize) -> Result<()> {
        let mut stdout = io::stdout();
        for row in rows {
            let (color, label) = match row.status {
                ReplayStatus::Armed => (Colors::ARMED, "armed  "),
                ReplayStatus::Skipped => (Colors::SKIPPED, "skipped"),
                ReplayStatus::Failed => (Colors::ERROR, "failed "),
            };
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(label),
                ResetColor,
                Print(format!(" {}", row.task_id)),
            )?;
            if !row.detail.is_empty() {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!(" ({})", row.detail)),
                    ResetColor
                )?;
            }
            execute!(stdout, Print("\n"))?;
            for armed in &row.armed {
                execute!(stdout, Print(format!("        {} -> {}\n", armed.reminder_id, armed.at)))?;
            }
        }
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("---\n{live_triggers} live trigger(s)\n")),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {msg}\n")),
            ResetColor
        )?;
        Ok(())
    }
}
