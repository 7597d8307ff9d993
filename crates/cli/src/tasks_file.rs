//! Loading the YAML task list.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use cadence_core::Task;

/// Read and validate every task in `path`.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read task file {}", path.display()))?;
    parse_tasks(&yaml).with_context(|| format!("failed to parse task file {}", path.display()))
}

/// Parse a YAML sequence of tasks. Task ids must be unique.
pub fn parse_tasks(yaml: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_yaml::from_str(yaml)?;

    let mut seen = HashSet::new();
    for task in &tasks {
        if !seen.insert(task.id()) {
            bail!("duplicate task id '{}'", task.id());
        }
    }
    Ok(tasks)
}
