use super::enums::Category;
use super::task::Task;
use chrono::{DateTime, Duration, Local, NaiveDate};

/// Count of tasks in each category bucket.
///
/// Categories are a closed enumeration, so the four buckets partition the
/// task list exactly.
pub fn category_counts(tasks: &[Task]) -> [(Category, usize); 4] {
    let mut counts = [
        (Category::Immediate, 0),
        (Category::DueSoon, 0),
        (Category::Favorite, 0),
        (Category::Personal, 0),
    ];
    for task in tasks {
        for entry in counts.iter_mut() {
            if entry.0 == task.category {
                entry.1 += 1;
            }
        }
    }
    counts
}

/// Open tasks grouped by due-date urgency, for suggestion surfaces.
///
/// Buckets are independent filters: a task due earlier today is both
/// overdue and due today, matching how the suggestion panel counts them.
#[derive(Debug, Default)]
pub struct DueBuckets<'a> {
    pub overdue: Vec<&'a Task>,
    pub due_today: Vec<&'a Task>,
    pub due_tomorrow: Vec<&'a Task>,
}

/// Partition incomplete tasks with a due date into urgency buckets
pub fn due_buckets(tasks: &[Task], now: DateTime<Local>) -> DueBuckets<'_> {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);
    let mut buckets = DueBuckets::default();

    for task in tasks.iter().filter(|t| !t.completed) {
        let due = match task.due_date {
            Some(due) => due,
            None => continue,
        };
        if due < now {
            buckets.overdue.push(task);
        }
        if due.date_naive() == today {
            buckets.due_today.push(task);
        }
        if due.date_naive() == tomorrow {
            buckets.due_tomorrow.push(task);
        }
    }

    buckets
}

/// Checkbox glyph for a task or subtask row
pub fn status_glyph(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Format a due instant relative to today ("today 17:00", "tomorrow", "in 3d", "2d late")
pub fn format_due_relative(due: Option<DateTime<Local>>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d.date_naive() - today).num_days();
            if days == 0 {
                format!("today {}", d.format("%H:%M"))
            } else if days == 1 {
                "tomorrow".into()
            } else if days > 1 {
                format!("in {}d", days)
            } else {
                format!("{}d late", -days)
            }
        }
    }
}

/// Tree connector for subtask rows
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_in(category: Category) -> Task {
        let mut task = Task::new("t");
        task.category = category;
        task
    }

    #[test]
    fn test_category_counts_partition_exactly() {
        let tasks = vec![
            task_in(Category::Immediate),
            task_in(Category::Immediate),
            task_in(Category::DueSoon),
            task_in(Category::Favorite),
            task_in(Category::Personal),
            task_in(Category::Personal),
        ];

        let counts = category_counts(&tasks);
        assert_eq!(counts[0], (Category::Immediate, 2));
        assert_eq!(counts[1], (Category::DueSoon, 1));
        assert_eq!(counts[2], (Category::Favorite, 1));
        assert_eq!(counts[3], (Category::Personal, 2));

        // Every task lands in exactly one bucket
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, tasks.len());
    }

    #[test]
    fn test_due_buckets() {
        let now = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let mut overdue = Task::new("overdue");
        overdue.due_date = Some(now - Duration::days(2));

        let mut later_today = Task::new("later today");
        later_today.due_date = Some(now + Duration::hours(3));

        let mut tomorrow = Task::new("tomorrow");
        tomorrow.due_date = Some(now + Duration::days(1));

        let mut done = Task::new("done");
        done.due_date = Some(now - Duration::days(5));
        done.completed = true;

        let undated = Task::new("undated");

        let tasks = vec![overdue, later_today, tomorrow, done, undated];
        let buckets = due_buckets(&tasks, now);

        assert_eq!(buckets.overdue.len(), 1);
        assert_eq!(buckets.overdue[0].title, "overdue");
        assert_eq!(buckets.due_today.len(), 1);
        assert_eq!(buckets.due_today[0].title, "later today");
        assert_eq!(buckets.due_tomorrow.len(), 1);
        assert_eq!(buckets.due_tomorrow[0].title, "tomorrow");
    }

    #[test]
    fn test_due_earlier_today_is_both_overdue_and_today() {
        let now = Local.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let mut task = Task::new("this morning");
        task.due_date = Some(Local.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap());

        let tasks = vec![task];
        let buckets = due_buckets(&tasks, now);
        assert_eq!(buckets.overdue.len(), 1);
        assert_eq!(buckets.due_today.len(), 1);
    }

    #[test]
    fn test_format_due_relative() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let at = |y, m, d, h| Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();

        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(at(2024, 3, 15, 17)), today), "today 17:00");
        assert_eq!(format_due_relative(Some(at(2024, 3, 16, 9)), today), "tomorrow");
        assert_eq!(format_due_relative(Some(at(2024, 3, 20, 9)), today), "in 5d");
        assert_eq!(format_due_relative(Some(at(2024, 3, 13, 9)), today), "2d late");
    }

    #[test]
    fn test_tree_connector() {
        assert_eq!(tree_connector(false), "├─");
        assert_eq!(tree_connector(true), "└─");
    }
}
