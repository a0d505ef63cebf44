use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Task lifecycle status.
///
/// Serializes as the string name ("Created", "Started", "Canceled").
/// Deserializes from either the integer code (0/1/2) or the name; query
/// strings arrive as text, so numeric strings are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Created,
    Started,
    Canceled,
}

impl TaskStatus {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(TaskStatus::Created),
            1 => Some(TaskStatus::Started),
            2 => Some(TaskStatus::Canceled),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Created" => Some(TaskStatus::Created),
            "Started" => Some(TaskStatus::Started),
            "Canceled" => Some(TaskStatus::Canceled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "Created",
            TaskStatus::Started => "Started",
            TaskStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct TaskStatusVisitor;

impl Visitor<'_> for TaskStatusVisitor {
    type Value = TaskStatus;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a task status code (0-2) or name")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskStatus, E> {
        TaskStatus::from_code(v)
            .ok_or_else(|| E::custom(format!("unknown task status code: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskStatus, E> {
        u64::try_from(v)
            .ok()
            .and_then(TaskStatus::from_code)
            .ok_or_else(|| E::custom(format!("unknown task status code: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskStatus, E> {
        // Query parameters carry codes as text ("status=0").
        if let Ok(code) = v.parse::<u64>() {
            return self.visit_u64(code);
        }
        TaskStatus::from_name(v).ok_or_else(|| E::custom(format!("unknown task status: {v}")))
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TaskStatusVisitor)
    }
}

/// Task entity - a unit of work owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub owner_id: u64,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. The id is assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: u64,
    pub name: String,
    pub description: Option<String>,
}

/// Partial update applied to a task. `None` fields retain their prior value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Materialize a task from its creation input and assigned id.
    /// New tasks always start in `Created`.
    pub fn from_new(id: u64, new: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: new.owner_id,
            name: new.name,
            description: new.description,
            status: TaskStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place and bump `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
