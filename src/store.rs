//! The canonical task store.
//!
//! Owns the authoritative `{todos, view_mode, labels}` state, applies every
//! mutation to completion, then persists the full snapshot through the
//! injected storage backend and notifies subscribers. Memory is the source
//! of truth for the running session; the persisted copy is best-effort and
//! a failed save never rolls a mutation back.

use crate::domain::{Category, Priority, Recurrence, SubTask, Task, ViewMode};
use crate::nldate;
use crate::persistence::{from_json, to_json, StateStorage, StoreState};
use chrono::{DateTime, Local};
use uuid::Uuid;

/// Title given to tasks created without one, including free-text input
/// that was nothing but a date phrase
pub const PLACEHOLDER_TITLE: &str = "New Task";

/// Immutable copy of store state handed to consumers. Cloned on the way
/// out, so nothing a consumer does reaches the store.
pub type Snapshot = StoreState;

/// Callback invoked with a fresh snapshot after every state transition
pub type Subscriber = Box<dyn Fn(&Snapshot)>;

/// Input to [`TaskStore::add_todo`], dispatched explicitly by shape
pub enum AddTodoInput {
    /// Free text, scanned for a natural-language date phrase
    FreeText(String),
    /// Pre-filled fields from a structured form
    Structured(NewTodo),
}

/// Partial task record for the structured add path. Missing fields take
/// the documented defaults.
#[derive(Debug, Default, Clone)]
pub struct NewTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Local>>,
    pub subtasks: Vec<SubTask>,
    pub labels: Vec<String>,
    pub recurring: Option<Recurrence>,
}

/// Partial update for [`TaskStore::update_todo`]. Outer `None` leaves a
/// field untouched; the nested `Option` on optional fields clears them.
#[derive(Debug, Default, Clone)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Local>>>,
    pub subtasks: Option<Vec<SubTask>>,
    pub labels: Option<Vec<String>>,
    pub recurring: Option<Option<Recurrence>>,
}

/// The state container. All task data lives here; presentation layers get
/// snapshots and call the mutation operations below.
pub struct TaskStore {
    state: StoreState,
    storage: Box<dyn StateStorage>,
    subscribers: Vec<Subscriber>,
    last_persist_error: Option<String>,
}

impl TaskStore {
    /// Load persisted state through `storage`. A missing slot or a payload
    /// that fails to parse starts an empty store rather than failing.
    pub fn open(storage: Box<dyn StateStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(payload)) => match from_json(&payload) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!("Error parsing saved state, starting fresh: {e}");
                    StoreState::default()
                }
            },
            Ok(None) => StoreState::default(),
            Err(e) => {
                eprintln!("Error reading saved state, starting fresh: {e}");
                StoreState::default()
            }
        };

        Self {
            state,
            storage,
            subscribers: Vec::new(),
            last_persist_error: None,
        }
    }

    /// Clone of the current state for rendering
    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    /// Register a consumer callback, invoked after every transition
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// The most recent persistence failure, if the last save did not land
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Add a task and return its id
    pub fn add_todo(&mut self, input: AddTodoInput) -> Uuid {
        let now = Local::now();
        let task = match input {
            AddTodoInput::FreeText(text) => {
                let (title, due_date) = match nldate::extract_date_phrase(&text, now) {
                    Some(found) => {
                        let remainder = nldate::strip_phrase(&text, &found);
                        (remainder, Some(found.resolved))
                    }
                    None => (text.trim().to_string(), None),
                };
                // Input that was nothing but a date phrase still needs a title
                let title = if title.is_empty() {
                    PLACEHOLDER_TITLE.to_string()
                } else {
                    title
                };
                Task {
                    id: Uuid::new_v4(),
                    title,
                    description: None,
                    completed: false,
                    category: Category::Immediate,
                    priority: Priority::Medium,
                    due_date,
                    subtasks: Vec::new(),
                    labels: Vec::new(),
                    recurring: None,
                    created_at: now,
                    updated_at: now,
                }
            }
            AddTodoInput::Structured(new) => Task {
                id: Uuid::new_v4(),
                title: new
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
                description: new.description,
                completed: false,
                category: new.category.unwrap_or_default(),
                priority: new.priority.unwrap_or_default(),
                due_date: new.due_date,
                subtasks: new.subtasks,
                labels: new.labels,
                recurring: new.recurring,
                created_at: now,
                updated_at: now,
            },
        };

        let id = task.id;
        self.state.todos.push(task);
        self.commit();
        id
    }

    /// Flip a task's completed flag. Unknown ids are a silent no-op.
    pub fn toggle_todo(&mut self, id: Uuid) {
        if let Some(task) = self.task_mut(id) {
            task.toggle();
        }
        self.commit();
    }

    /// Remove a task and all its subtasks. Unknown ids are a silent no-op.
    pub fn remove_todo(&mut self, id: Uuid) {
        self.state.todos.retain(|t| t.id != id);
        self.commit();
    }

    /// Shallow-merge the provided fields into a task. Only supplied fields
    /// are overwritten; no cross-field consistency is enforced. Unknown ids
    /// are a silent no-op.
    pub fn update_todo(&mut self, id: Uuid, patch: TodoPatch) {
        if let Some(task) = self.task_mut(id) {
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
            if let Some(category) = patch.category {
                task.category = category;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            if let Some(subtasks) = patch.subtasks {
                task.subtasks = subtasks;
            }
            if let Some(labels) = patch.labels {
                task.labels = labels;
            }
            if let Some(recurring) = patch.recurring {
                task.recurring = recurring;
            }
            task.touch();
        }
        self.commit();
    }

    /// Append a subtask to a task, returning the new subtask id when the
    /// parent exists
    pub fn add_subtask(&mut self, todo_id: Uuid, title: impl Into<String>) -> Option<Uuid> {
        let subtask_id = self.task_mut(todo_id).map(|task| task.add_subtask(title));
        self.commit();
        subtask_id
    }

    /// Flip a subtask's completed flag. Unknown ids are a silent no-op.
    pub fn toggle_subtask(&mut self, todo_id: Uuid, subtask_id: Uuid) {
        if let Some(task) = self.task_mut(todo_id) {
            task.toggle_subtask(subtask_id);
        }
        self.commit();
    }

    /// Remove a subtask. Unknown ids are a silent no-op.
    pub fn remove_subtask(&mut self, todo_id: Uuid, subtask_id: Uuid) {
        if let Some(task) = self.task_mut(todo_id) {
            task.remove_subtask(subtask_id);
        }
        self.commit();
    }

    /// Set the preferred view mode
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.view_mode = mode;
        self.commit();
    }

    /// Add a label to the global list. Duplicates accumulate.
    pub fn add_label(&mut self, label: impl Into<String>) {
        self.state.labels.push(label.into());
        self.commit();
    }

    /// Remove every occurrence of a label from the global list
    pub fn remove_label(&mut self, label: &str) {
        self.state.labels.retain(|l| l != label);
        self.commit();
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.state.todos.iter_mut().find(|t| t.id == id)
    }

    /// Persist the full snapshot and notify subscribers. Runs after every
    /// operation; a failed save is logged and remembered but the in-memory
    /// state stays authoritative.
    fn commit(&mut self) {
        match to_json(&self.state).and_then(|payload| self.storage.save(&payload)) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                eprintln!("Error saving state: {e}");
                self.last_persist_error = Some(e.to_string());
            }
        }

        let snapshot = self.state.clone();
        for subscriber in &self.subscribers {
            subscriber(&snapshot);
        }
    }
}
