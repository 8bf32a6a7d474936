use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority, persisted as its numeric level (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse a numeric level, rejecting anything outside 0..=3
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }

    /// Numeric level as stored on disk
    pub fn level(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Persisted levels outside the known range clamp to `None`.
impl From<i64> for Priority {
    fn from(level: i64) -> Self {
        Self::from_level(level).unwrap_or_default()
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

/// Status filter applied to the task view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Filter {
    #[default]
    All,
    Todo,
    Done,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Todo => "todo",
            Self::Done => "done",
        }
    }

    /// Check whether a task with the given done flag passes this filter
    pub fn matches(&self, done: bool) -> bool {
        match self {
            Self::All => true,
            Self::Todo => !done,
            Self::Done => done,
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "todo" => Ok(Self::Todo),
            "done" => Ok(Self::Done),
            other => Err(other.to_string()),
        }
    }
}

// Unknown persisted filters fall back to showing everything.
impl From<String> for Filter {
    fn from(s: String) -> Self {
        s.trim().parse().unwrap_or_default()
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.as_str().to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pane had focus when the session was last saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Focus {
    #[default]
    Lists,
    Tasks,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Tasks => "tasks",
        }
    }
}

impl FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lists" => Ok(Self::Lists),
            "tasks" => Ok(Self::Tasks),
            other => Err(other.to_string()),
        }
    }
}

impl From<String> for Focus {
    fn from(s: String) -> Self {
        s.trim().parse().unwrap_or_default()
    }
}

impl From<Focus> for String {
    fn from(focus: Focus) -> Self {
        focus.as_str().to_string()
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step up or down in a manual ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Index offset for this direction
    pub fn delta(&self) -> isize {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }
}
