use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a closed-enumeration string fails to parse
#[derive(Debug, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct EnumParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Display grouping bucket for tasks. Not a workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Immediate,
    DueSoon,
    Favorite,
    Personal,
}

impl Category {
    /// Get the display name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Category::Immediate => "immediate",
            Category::DueSoon => "due-soon",
            Category::Favorite => "favorite",
            Category::Personal => "personal",
        }
    }

    /// Get all categories as a list
    pub fn all() -> &'static [Category] {
        &[
            Category::Immediate,
            Category::DueSoon,
            Category::Favorite,
            Category::Personal,
        ]
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Immediate
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Ok(Category::Immediate),
            "due-soon" | "duesoon" => Ok(Category::DueSoon),
            "favorite" | "favourite" => Ok(Category::Favorite),
            "personal" => Ok(Category::Personal),
            _ => Err(EnumParseError::new(
                "category",
                s,
                "immediate, due-soon, favorite, personal",
            )),
        }
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Get the display name for this priority
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(EnumParseError::new("priority", s, "low, medium, high")),
        }
    }
}

/// UI layout preference. Stored with the state, no effect on data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    List,
    Kanban,
    Calendar,
}

impl ViewMode {
    /// Get the display name for this view mode
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Kanban => "kanban",
            ViewMode::Calendar => "calendar",
        }
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::List
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "kanban" => Ok(ViewMode::Kanban),
            "calendar" => Ok(ViewMode::Calendar),
            _ => Err(EnumParseError::new("view mode", s, "list, kanban, calendar")),
        }
    }
}

/// Repetition frequency for the stored (but never scheduled) recurring attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Get the display name for this frequency
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Frequency {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(EnumParseError::new("frequency", s, "daily, weekly, monthly")),
        }
    }
}
