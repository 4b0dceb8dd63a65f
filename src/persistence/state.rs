use crate::domain::{Task, ViewMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Full store state, persisted as one versionless JSON document.
///
/// Field names match the original storage slot layout (camelCase keys),
/// so a slot written by any compliant implementation loads back cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreState {
    pub todos: Vec<Task>,
    pub view_mode: ViewMode,
    pub labels: Vec<String>,
}

/// Serialize store state to the JSON slot payload
pub fn to_json(state: &StoreState) -> Result<String> {
    serde_json::to_string_pretty(state).context("Failed to serialize store state")
}

/// Parse a JSON slot payload back into store state
pub fn from_json(payload: &str) -> Result<StoreState> {
    serde_json::from_str(payload).context("Failed to parse store state")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Priority, Recurrence, Frequency};
    use chrono::Local;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut task = Task::new("Persisted");
        task.description = Some("notes".to_string());
        task.category = Category::Favorite;
        task.priority = Priority::High;
        task.due_date = Some(Local::now());
        task.labels = vec!["home".to_string(), "home".to_string()];
        task.recurring = Some(Recurrence {
            frequency: Frequency::Monthly,
            interval: 1,
        });
        task.add_subtask("step one");

        let state = StoreState {
            todos: vec![task],
            view_mode: ViewMode::Kanban,
            labels: vec!["errands".to_string()],
        };

        let payload = to_json(&state).unwrap();
        let back = from_json(&payload).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_slot_layout_keys() {
        let state = StoreState::default();
        let payload = to_json(&state).unwrap();
        assert!(payload.contains("\"todos\""));
        assert!(payload.contains("\"viewMode\""));
        assert!(payload.contains("\"labels\""));
    }

    #[test]
    fn test_missing_fields_default() {
        let state = from_json("{}").unwrap();
        assert!(state.todos.is_empty());
        assert_eq!(state.view_mode, ViewMode::List);
        assert!(state.labels.is_empty());
    }

    #[test]
    fn test_malformed_due_date_degrades_to_absent() {
        let payload = r#"{
            "todos": [{
                "id": "5d8f2f64-2bd4-4f0a-9c3e-5a3d6a1f0b42",
                "title": "Lenient load",
                "completed": false,
                "category": "personal",
                "priority": "low",
                "dueDate": "not-a-date",
                "createdAt": "2024-03-15T10:30:00+00:00",
                "updatedAt": "2024-03-15T10:30:00+00:00"
            }],
            "viewMode": "calendar",
            "labels": []
        }"#;

        let state = from_json(payload).unwrap();
        assert_eq!(state.todos.len(), 1);
        assert_eq!(state.todos[0].title, "Lenient load");
        assert!(state.todos[0].due_date.is_none());
        assert_eq!(state.view_mode, ViewMode::Calendar);
    }
}
