use crate::domain::{Category, Task};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Completion tally for one category bucket
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCompletion {
    pub category: Category,
    pub total: usize,
    pub completed: usize,
    /// Completed share in percent, 0 for an empty bucket
    pub rate: f64,
}

/// Calculate the completion rate for each category bucket
pub fn completion_by_category(tasks: &[Task]) -> Vec<CategoryCompletion> {
    Category::all()
        .iter()
        .map(|&category| {
            let total = tasks.iter().filter(|t| t.category == category).count();
            let completed = tasks
                .iter()
                .filter(|t| t.category == category && t.completed)
                .count();
            let rate = if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            CategoryCompletion {
                category,
                total,
                completed,
                rate,
            }
        })
        .collect()
}

/// Overall completed share in percent, 0 when there are no tasks
pub fn overall_completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    completed as f64 / tasks.len() as f64 * 100.0
}

/// Tasks touched per calendar day, keyed by the updated stamp's date
pub fn daily_activity(tasks: &[Task]) -> HashMap<NaiveDate, usize> {
    let mut activity: HashMap<NaiveDate, usize> = HashMap::new();
    for task in tasks {
        *activity.entry(task.updated_at.date_naive()).or_insert(0) += 1;
    }
    activity
}

/// Count of open (not completed) subtasks across all tasks
pub fn open_subtask_count(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .flat_map(|t| t.subtasks.iter())
        .filter(|s| !s.completed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn task(category: Category, completed: bool) -> Task {
        let mut task = Task::new("t");
        task.category = category;
        task.completed = completed;
        task
    }

    #[test]
    fn test_completion_by_category_partitions_the_set() {
        let tasks = vec![
            task(Category::Immediate, true),
            task(Category::Immediate, false),
            task(Category::DueSoon, false),
            task(Category::Personal, true),
        ];

        let stats = completion_by_category(&tasks);
        assert_eq!(stats.len(), 4);

        let total: usize = stats.iter().map(|s| s.total).sum();
        assert_eq!(total, tasks.len());

        let immediate = &stats[0];
        assert_eq!(immediate.category, Category::Immediate);
        assert_eq!(immediate.total, 2);
        assert_eq!(immediate.completed, 1);
        assert_eq!(immediate.rate, 50.0);

        let favorite = &stats[2];
        assert_eq!(favorite.total, 0);
        assert_eq!(favorite.rate, 0.0);
    }

    #[test]
    fn test_overall_completion_rate() {
        assert_eq!(overall_completion_rate(&[]), 0.0);

        let tasks = vec![
            task(Category::Immediate, true),
            task(Category::Immediate, true),
            task(Category::Personal, false),
            task(Category::Personal, false),
        ];
        assert_eq!(overall_completion_rate(&tasks), 50.0);
    }

    #[test]
    fn test_daily_activity_groups_by_update_date() {
        let tasks = vec![
            task(Category::Immediate, false),
            task(Category::Personal, false),
        ];

        let activity = daily_activity(&tasks);
        let today = Local::now().date_naive();
        assert_eq!(activity.get(&today), Some(&2));
        assert_eq!(activity.len(), 1);
    }

    #[test]
    fn test_open_subtask_count() {
        let mut parent = task(Category::Immediate, false);
        let first = parent.add_subtask("one");
        parent.add_subtask("two");
        parent.toggle_subtask(first);

        let tasks = vec![parent, task(Category::Personal, false)];
        assert_eq!(open_subtask_count(&tasks), 1);
    }
}
