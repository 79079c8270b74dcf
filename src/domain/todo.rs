use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub Uuid);

impl Default for TodoId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

/// Urgency of a todo, serialized as its numeric level 1..=3.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub enum Priority {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn level(self) -> u8 { self as u8 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("priority {0} is outside 1..=3")]
pub struct PriorityOutOfRange(pub i64);

impl TryFrom<i64> for Priority {
    type Error = PriorityOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(PriorityOutOfRange(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self { p.level() }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Moves `updated_at` forward to `now`, or one nanosecond past its
    /// previous value when the clock has not advanced.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at { now } else { self.updated_at + Duration::nanoseconds(1) };
    }
}

/// Validated user-editable fields of a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

/// Document handed to storage on insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn from_draft(draft: TodoDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
