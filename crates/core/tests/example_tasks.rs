//! Integration tests that verify the example task file in `data/tasks/`
//! deserializes into valid tasks.

use chrono::{NaiveDate, NaiveTime, Weekday};

use cadence_core::{Frequency, MonthlySelector, RecurrencePattern, Task, TaskType};

/// Integration tests run from the crate directory, so go up two levels.
fn example_file() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/tasks/example.yaml")
}

fn load_tasks() -> Vec<Task> {
    let path = example_file();
    let yaml = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_yaml::from_str(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn task<'a>(tasks: &'a [Task], id: &str) -> &'a Task {
    tasks
        .iter()
        .find(|t| t.id().as_str() == id)
        .unwrap_or_else(|| panic!("no task '{id}' in example file"))
}

#[test]
fn example_file_parses() {
    let tasks = load_tasks();
    assert_eq!(tasks.len(), 10);

    let ids: std::collections::HashSet<_> = tasks.iter().map(|t| t.id()).collect();
    assert_eq!(ids.len(), tasks.len(), "task ids must be unique");
}

#[test]
fn daily_types_carry_rules_and_others_do_not() {
    for task in load_tasks() {
        match task.task_type() {
            TaskType::Daily => assert!(task.recurrence().is_some(), "{}", task.id()),
            _ => assert!(task.recurrence().is_none(), "{}", task.id()),
        }
        assert!(!task.reminders().is_empty(), "{} has no reminders", task.id());
    }
}

#[test]
fn second_saturday_rule() {
    let tasks = load_tasks();
    let games = task(&tasks, "board-games");
    let rule = games.recurrence().unwrap();

    assert_eq!(rule.anchor(), NaiveDate::from_ymd_opt(2025, 7, 12).unwrap());
    assert_eq!(rule.anchor_weekday(), Weekday::Sat);
    assert_eq!(
        rule.pattern(),
        &RecurrencePattern::Monthly(MonthlySelector::WeeksOfMonth([1].into()))
    );
    assert_eq!(
        games.reminders()[0].time_of_day,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );
}

#[test]
fn interval_and_selectors_round_out() {
    let tasks = load_tasks();

    let plants = task(&tasks, "water-plants").recurrence().unwrap();
    assert_eq!(plants.interval(), 3);
    assert_eq!(plants.frequency(), Frequency::Daily);

    let review = task(&tasks, "weekly-review").recurrence().unwrap();
    match review.pattern() {
        RecurrencePattern::Weekly(days) => {
            assert_eq!(days.iter().collect::<Vec<_>>(), vec![Weekday::Fri]);
        }
        other => panic!("expected weekly pattern, got {other:?}"),
    }

    let rent = task(&tasks, "pay-rent").recurrence().unwrap();
    assert_eq!(
        rent.pattern(),
        &RecurrencePattern::Monthly(MonthlySelector::DaysOfMonth([31].into()))
    );

    let book_club = task(&tasks, "book-club").recurrence().unwrap();
    assert_eq!(book_club.interval(), 2);

    let passport = task(&tasks, "renew-passport").recurrence().unwrap();
    assert_eq!(passport.frequency(), Frequency::Yearly);
}

#[test]
fn stored_reminder_dates_are_dropped() {
    let tasks = load_tasks();
    let groceries = task(&tasks, "buy-groceries");
    assert_eq!(groceries.task_type(), TaskType::Todo);
    assert_eq!(
        groceries.reminders()[0].time_of_day,
        NaiveTime::from_hms_opt(18, 0, 0).unwrap()
    );
}
