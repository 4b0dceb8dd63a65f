use super::enums::{Category, Frequency, Priority};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RFC 3339 timestamps with lenient loading.
///
/// Persisted state is versionless, so a malformed timestamp must never
/// fail a load: required stamps fall back to the load instant, optional
/// ones to absent.
mod stamp {
    use chrono::{DateTime, Local};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Local))
            .unwrap_or_else(|_| Local::now()))
    }
}

/// Optional RFC 3339 timestamp; malformed values load as absent
mod stamp_opt {
    use chrono::{DateTime, Local};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        value: &Option<DateTime<Local>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Local)))
    }
}

/// Recurrence attribute for a task. Stored and persisted verbatim,
/// never interpreted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Every N days/weeks/months. Always positive.
    pub interval: u32,
}

/// A child checklist item owned by exactly one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

impl SubTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A user-created unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique ID, generated at creation and never reused
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Optional free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is done
    pub completed: bool,
    /// Display grouping bucket
    pub category: Category,
    /// Priority level
    pub priority: Priority,
    /// Optional due instant
    #[serde(default, with = "stamp_opt", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Local>>,
    /// Subtasks, insertion order significant
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    /// Free-text labels (duplicates allowed)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Stored recurrence attribute, never acted upon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurrence>,
    /// When the task was created, immutable afterwards
    #[serde(with = "stamp")]
    pub created_at: DateTime<Local>,
    /// Refreshed on every mutation to this task or its subtasks
    #[serde(with = "stamp")]
    pub updated_at: DateTime<Local>,
}

impl Task {
    /// Create a task with default category/priority and empty collections
    pub fn new(title: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            completed: false,
            category: Category::default(),
            priority: Priority::default(),
            due_date: None,
            subtasks: Vec::new(),
            labels: Vec::new(),
            recurring: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the updated stamp after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Local::now();
    }

    /// Flip the completed flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }

    /// Append a new subtask and return its id
    pub fn add_subtask(&mut self, title: impl Into<String>) -> Uuid {
        let subtask = SubTask::new(title);
        let id = subtask.id;
        self.subtasks.push(subtask);
        self.touch();
        id
    }

    /// Flip a subtask's completed flag. Returns false if the id is unknown.
    pub fn toggle_subtask(&mut self, subtask_id: Uuid) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.completed = !subtask.completed;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Remove a subtask. Returns false if the id is unknown.
    pub fn remove_subtask(&mut self, subtask_id: Uuid) -> bool {
        let before = self.subtasks.len();
        self.subtasks.retain(|s| s.id != subtask_id);
        if self.subtasks.len() != before {
            self.touch();
            true
        } else {
            false
        }
    }

    /// Count of completed subtasks
    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }
}
