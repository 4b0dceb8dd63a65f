mod domain;
mod nldate;
mod persistence;
mod report;
mod store;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use domain::{
    category_counts, due_buckets, format_due_relative, status_glyph, tree_connector, Category,
    Priority, Task, ViewMode,
};
use persistence::{get_data_dir, init_local_dir, FileStorage};
use store::{AddTodoInput, NewTodo, Snapshot, TaskStore, TodoPatch};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tasknest")]
#[command(about = "A personal task tracker with smart date capture, subtasks and quick analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tasknest directory in the current directory
    Init,
    /// Add a task from free text ("pay rent tomorrow at 5pm") or structured flags
    Add {
        /// Free text; a date phrase in it becomes the due date
        text: Vec<String>,
        /// Structured form: explicit title (must not be empty)
        #[arg(long)]
        title: Option<String>,
        /// Structured form: description
        #[arg(long)]
        description: Option<String>,
        /// Structured form: category (immediate, due-soon, favorite, personal)
        #[arg(long)]
        category: Option<Category>,
        /// Structured form: priority (low, medium, high)
        #[arg(long)]
        priority: Option<Priority>,
        /// Structured form: due date phrase ("tomorrow at 5pm", "next friday")
        #[arg(long)]
        due: Option<String>,
        /// Structured form: label (repeatable)
        #[arg(long)]
        label: Vec<String>,
    },
    /// List tasks with their subtasks
    List {
        /// Only show tasks in this category
        #[arg(long)]
        category: Option<Category>,
        /// Hide completed tasks
        #[arg(long)]
        open: bool,
    },
    /// Toggle a task's completed state
    Done {
        /// Task id (prefix is enough)
        id: String,
    },
    /// Remove a task and all its subtasks
    Rm {
        /// Task id (prefix is enough)
        id: String,
    },
    /// Edit fields of an existing task
    Edit {
        /// Task id (prefix is enough)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Due date phrase ("tomorrow at 5pm")
        #[arg(long)]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Manage subtasks of a task
    Sub {
        #[command(subcommand)]
        command: SubCommands,
    },
    /// Show or set the preferred view mode (list, kanban, calendar)
    View {
        /// New mode; omit to show the current one
        mode: Option<ViewMode>,
    },
    /// Manage the global label list
    Label {
        #[command(subcommand)]
        command: LabelCommands,
    },
    /// Print quick statistics for the current tasks
    Stats,
    /// Write a markdown report
    Report {
        /// Date to stamp the report with (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
        /// Output file path. Defaults to report-YYYY-MM-DD.md in the data directory.
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum SubCommands {
    /// Add a subtask to a task
    Add {
        /// Parent task id (prefix is enough)
        id: String,
        /// Subtask title
        title: Vec<String>,
    },
    /// Toggle a subtask's completed state
    Done {
        /// Parent task id (prefix is enough)
        id: String,
        /// Subtask id (prefix is enough)
        subtask: String,
    },
    /// Remove a subtask
    Rm {
        /// Parent task id (prefix is enough)
        id: String,
        /// Subtask id (prefix is enough)
        subtask: String,
    },
}

#[derive(Subcommand)]
enum LabelCommands {
    /// Add a label to the global list
    Add { name: String },
    /// Remove a label from the global list
    Rm { name: String },
    /// List known labels
    Ls,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let data_dir = init_local_dir()?;
            println!("Initialized tasknest directory: {}", data_dir.display());
            println!();
            println!("tasknest will now use this local directory for task storage.");
            Ok(())
        }
        Commands::Add {
            text,
            title,
            description,
            category,
            priority,
            due,
            label,
        } => {
            let mut store = open_store()?;
            let structured = title.is_some()
                || description.is_some()
                || category.is_some()
                || priority.is_some()
                || due.is_some()
                || !label.is_empty();

            let id = if structured {
                if !text.is_empty() {
                    bail!("give either free text or structured flags, not both");
                }
                // The form boundary enforces non-empty titles; the store
                // itself accepts whatever it is given
                if let Some(t) = &title {
                    if t.trim().is_empty() {
                        bail!("title must not be empty");
                    }
                }
                let due_date = match due {
                    Some(phrase) => Some(parse_due_phrase(&phrase)?),
                    None => None,
                };
                store.add_todo(AddTodoInput::Structured(NewTodo {
                    title,
                    description,
                    category,
                    priority,
                    due_date,
                    labels: label,
                    ..NewTodo::default()
                }))
            } else {
                if text.is_empty() {
                    bail!("nothing to add; give free text or structured flags");
                }
                store.add_todo(AddTodoInput::FreeText(text.join(" ")))
            };

            report_persist_error(&store);
            let snapshot = store.snapshot();
            if let Some(task) = snapshot.todos.iter().find(|t| t.id == id) {
                match task.due_date {
                    Some(due) => println!(
                        "Added {} '{}' (due {})",
                        short_id(id),
                        task.title,
                        due.format("%Y-%m-%d %H:%M")
                    ),
                    None => println!("Added {} '{}'", short_id(id), task.title),
                }
            }
            Ok(())
        }
        Commands::List { category, open } => {
            let store = open_store()?;
            print_tasks(&store.snapshot(), category, open);
            Ok(())
        }
        Commands::Done { id } => {
            let mut store = open_store()?;
            let task_id = resolve_task_id(&store.snapshot(), &id)?;
            store.toggle_todo(task_id);
            report_persist_error(&store);

            let snapshot = store.snapshot();
            if let Some(task) = snapshot.todos.iter().find(|t| t.id == task_id) {
                let state = if task.completed { "done" } else { "open" };
                println!("Marked {} '{}' as {}", short_id(task_id), task.title, state);
            }
            Ok(())
        }
        Commands::Rm { id } => {
            let mut store = open_store()?;
            let snapshot = store.snapshot();
            let task_id = resolve_task_id(&snapshot, &id)?;
            let title = snapshot
                .todos
                .iter()
                .find(|t| t.id == task_id)
                .map(|t| t.title.clone())
                .unwrap_or_default();

            store.remove_todo(task_id);
            report_persist_error(&store);
            println!("Removed {} '{}'", short_id(task_id), title);
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            description,
            category,
            priority,
            due,
            clear_due,
        } => {
            let mut store = open_store()?;
            let task_id = resolve_task_id(&store.snapshot(), &id)?;

            let mut patch = TodoPatch::default();
            if let Some(t) = title {
                if t.trim().is_empty() {
                    bail!("title must not be empty");
                }
                patch.title = Some(t);
            }
            if description.is_some() {
                patch.description = Some(description);
            }
            patch.category = category;
            patch.priority = priority;
            if clear_due {
                patch.due_date = Some(None);
            } else if let Some(phrase) = due {
                patch.due_date = Some(Some(parse_due_phrase(&phrase)?));
            }

            store.update_todo(task_id, patch);
            report_persist_error(&store);
            println!("Updated {}", short_id(task_id));
            Ok(())
        }
        Commands::Sub { command } => run_sub_command(command),
        Commands::View { mode } => {
            let mut store = open_store()?;
            match mode {
                Some(mode) => {
                    store.set_view_mode(mode);
                    report_persist_error(&store);
                    println!("View mode set to {}", mode);
                }
                None => println!("View mode: {}", store.snapshot().view_mode),
            }
            Ok(())
        }
        Commands::Label { command } => {
            let mut store = open_store()?;
            match command {
                LabelCommands::Add { name } => {
                    store.add_label(name.clone());
                    report_persist_error(&store);
                    println!("Added label '{}'", name);
                }
                LabelCommands::Rm { name } => {
                    store.remove_label(&name);
                    report_persist_error(&store);
                    println!("Removed label '{}'", name);
                }
                LabelCommands::Ls => {
                    let snapshot = store.snapshot();
                    if snapshot.labels.is_empty() {
                        println!("No labels");
                    } else {
                        for label in &snapshot.labels {
                            println!("{}", label);
                        }
                    }
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let store = open_store()?;
            print_stats(&store.snapshot());
            Ok(())
        }
        Commands::Report { date, output } => {
            let report_date = match date {
                Some(date_str) => Some(
                    chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                        .map_err(|e| anyhow::anyhow!("Invalid date format. Use YYYY-MM-DD: {}", e))?,
                ),
                None => None,
            };
            let output_path = output.map(std::path::PathBuf::from);

            let store = open_store()?;
            let report_path = report::generate_report(&store.snapshot(), report_date, output_path)?;
            println!("Report generated: {}", report_path.display());
            Ok(())
        }
    }
}

fn run_sub_command(command: SubCommands) -> Result<()> {
    let mut store = open_store()?;

    match command {
        SubCommands::Add { id, title } => {
            let title = title.join(" ");
            if title.trim().is_empty() {
                bail!("subtask title must not be empty");
            }
            let task_id = resolve_task_id(&store.snapshot(), &id)?;
            if let Some(subtask_id) = store.add_subtask(task_id, title) {
                report_persist_error(&store);
                println!("Added subtask {} to {}", short_id(subtask_id), short_id(task_id));
            }
        }
        SubCommands::Done { id, subtask } => {
            let snapshot = store.snapshot();
            let task_id = resolve_task_id(&snapshot, &id)?;
            let subtask_id = resolve_subtask_id(&snapshot, task_id, &subtask)?;
            store.toggle_subtask(task_id, subtask_id);
            report_persist_error(&store);
            println!("Toggled subtask {}", short_id(subtask_id));
        }
        SubCommands::Rm { id, subtask } => {
            let snapshot = store.snapshot();
            let task_id = resolve_task_id(&snapshot, &id)?;
            let subtask_id = resolve_subtask_id(&snapshot, task_id, &subtask)?;
            store.remove_subtask(task_id, subtask_id);
            report_persist_error(&store);
            println!("Removed subtask {}", short_id(subtask_id));
        }
    }
    Ok(())
}

/// Open the store over the file slot in the resolved data directory
fn open_store() -> Result<TaskStore> {
    let data_dir = get_data_dir()?;
    let storage = FileStorage::in_data_dir()
        .with_context(|| format!("Could not open storage in {}", data_dir.display()))?;
    Ok(TaskStore::open(Box::new(storage)))
}

/// Resolve a natural-language due phrase for the structured paths
fn parse_due_phrase(phrase: &str) -> Result<DateTime<Local>> {
    nldate::extract_date_phrase(phrase, Local::now())
        .map(|found| found.resolved)
        .with_context(|| format!("could not understand due date '{}'", phrase))
}

/// Surface a failed save without undoing the mutation
fn report_persist_error(store: &TaskStore) {
    if let Some(err) = store.last_persist_error() {
        eprintln!("Warning: state not saved: {}", err);
    }
}

/// Resolve a user-supplied id prefix against the task list
fn resolve_task_id(snapshot: &Snapshot, prefix: &str) -> Result<Uuid> {
    let needle = prefix.to_lowercase();
    let matches: Vec<&Task> = snapshot
        .todos
        .iter()
        .filter(|t| t.id.to_string().starts_with(&needle))
        .collect();

    match matches.len() {
        0 => bail!("no task matching id '{}'", prefix),
        1 => Ok(matches[0].id),
        n => bail!("id '{}' is ambiguous ({} matches); use more characters", prefix, n),
    }
}

/// Resolve a subtask id prefix within one task
fn resolve_subtask_id(snapshot: &Snapshot, task_id: Uuid, prefix: &str) -> Result<Uuid> {
    let task = snapshot
        .todos
        .iter()
        .find(|t| t.id == task_id)
        .with_context(|| format!("no task matching id '{}'", task_id))?;

    let needle = prefix.to_lowercase();
    let matches: Vec<Uuid> = task
        .subtasks
        .iter()
        .filter(|s| s.id.to_string().starts_with(&needle))
        .map(|s| s.id)
        .collect();

    match matches.len() {
        0 => bail!("no subtask matching id '{}'", prefix),
        1 => Ok(matches[0]),
        n => bail!("id '{}' is ambiguous ({} matches); use more characters", prefix, n),
    }
}

/// First block of a UUID, enough to address tasks interactively
fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn print_tasks(snapshot: &Snapshot, category: Option<Category>, open_only: bool) {
    let today = Local::now().date_naive();
    let mut shown = 0;

    for task in &snapshot.todos {
        if let Some(wanted) = category {
            if task.category != wanted {
                continue;
            }
        }
        if open_only && task.completed {
            continue;
        }

        let labels = if task.labels.is_empty() {
            String::new()
        } else {
            format!(" [{}]", task.labels.join(","))
        };
        let progress = if task.subtasks.is_empty() {
            String::new()
        } else {
            format!(" {}/{}", task.completed_subtasks(), task.subtasks.len())
        };
        println!(
            "{} {}  {}  ({}, {}, due {}){}{}",
            status_glyph(task.completed),
            short_id(task.id),
            task.title,
            task.category,
            task.priority,
            format_due_relative(task.due_date, today),
            progress,
            labels
        );

        let count = task.subtasks.len();
        for (i, subtask) in task.subtasks.iter().enumerate() {
            println!(
                "    {} {} {}  {}",
                tree_connector(i == count - 1),
                status_glyph(subtask.completed),
                short_id(subtask.id),
                subtask.title
            );
        }
        shown += 1;
    }

    if shown == 0 {
        println!("No tasks");
    }
}

fn print_stats(snapshot: &Snapshot) {
    let tasks = &snapshot.todos;
    let completed = tasks.iter().filter(|t| t.completed).count();

    println!("Tasks: {} total, {} completed, {} open", tasks.len(), completed, tasks.len() - completed);
    println!(
        "Completion rate: {:.1}%",
        report::overall_completion_rate(tasks)
    );
    println!("Open subtasks: {}", report::open_subtask_count(tasks));
    println!();

    println!("By category:");
    for (category, count) in category_counts(tasks) {
        println!("  {:<10} {}", category.name(), count);
    }
    println!();

    let buckets = due_buckets(tasks, Local::now());
    println!(
        "Due: {} overdue, {} today, {} tomorrow",
        buckets.overdue.len(),
        buckets.due_today.len(),
        buckets.due_tomorrow.len()
    );
    println!("View mode: {}", snapshot.view_mode);
    println!("Labels: {}", snapshot.labels.len());
}
