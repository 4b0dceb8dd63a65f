use crate::domain::due_buckets;
use crate::persistence::{atomic_write, report_file, StoreState};
use crate::report::stats::{
    completion_by_category, daily_activity, open_subtask_count, overall_completion_rate,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Generate a markdown report for a store snapshot.
///
/// Defaults to today's date and the report file in the data directory;
/// returns the path written.
pub fn generate_report(
    snapshot: &StoreState,
    date: Option<NaiveDate>,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let report_date = date.unwrap_or_else(|| Local::now().date_naive());
    let path = match output_path {
        Some(path) => path,
        None => report_file(report_date)?,
    };

    let content = render_report(snapshot, report_date);
    atomic_write(&path, &content)?;
    Ok(path)
}

/// Render the report body
fn render_report(snapshot: &StoreState, report_date: NaiveDate) -> String {
    let tasks = &snapshot.todos;
    let mut out = String::new();

    out.push_str(&format!("# Task Report - {}\n\n", report_date));

    // Headline numbers
    let completed = tasks.iter().filter(|t| t.completed).count();
    out.push_str("## Overview\n\n");
    out.push_str(&format!("- Total tasks: {}\n", tasks.len()));
    out.push_str(&format!("- Completed: {}\n", completed));
    out.push_str(&format!("- Open: {}\n", tasks.len() - completed));
    out.push_str(&format!("- Open subtasks: {}\n", open_subtask_count(tasks)));
    out.push_str(&format!(
        "- Completion rate: {}\n\n",
        format_percent(overall_completion_rate(tasks))
    ));

    // Per-category table
    out.push_str("## Completion by category\n\n");
    out.push_str("| Category | Total | Completed | Rate |\n");
    out.push_str("|----------|-------|-----------|------|\n");
    for entry in completion_by_category(tasks) {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            entry.category,
            entry.total,
            entry.completed,
            format_percent(entry.rate)
        ));
    }
    out.push('\n');

    // Due-date pressure
    let buckets = due_buckets(tasks, Local::now());
    out.push_str("## Due dates\n\n");
    out.push_str(&format!("- Overdue: {}\n", buckets.overdue.len()));
    out.push_str(&format!("- Due today: {}\n", buckets.due_today.len()));
    out.push_str(&format!("- Due tomorrow: {}\n\n", buckets.due_tomorrow.len()));

    // Activity by day, most recent first
    let mut activity: Vec<(NaiveDate, usize)> = daily_activity(tasks).into_iter().collect();
    activity.sort_by(|a, b| b.0.cmp(&a.0));
    if !activity.is_empty() {
        out.push_str("## Activity\n\n");
        for (day, count) in activity {
            out.push_str(&format!("- {}: {} task(s) touched\n", day, count));
        }
        out.push('\n');
    }

    if !snapshot.labels.is_empty() {
        out.push_str("## Labels\n\n");
        for label in &snapshot.labels {
            out.push_str(&format!("- {}\n", label));
        }
    }

    out
}
