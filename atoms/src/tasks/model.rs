use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[serde(rename = "alta")]
    High,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "baja")]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "alta",
            Self::Medium => "media",
            Self::Low => "baja",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "iniciada")]
    Started,
    #[serde(rename = "en proceso")]
    InProgress,
    #[serde(rename = "finalizada")]
    Finished,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "iniciada",
            Self::InProgress => "en proceso",
            Self::Finished => "finalizada",
            Self::Cancelled => "cancelada",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "iniciada" => Ok(Self::Started),
            "en proceso" | "en-proceso" => Ok(Self::InProgress),
            "finalizada" => Ok(Self::Finished),
            "cancelada" => Ok(Self::Cancelled),
            other => Err(ParseTaskStatusError(other.to_string())),
        }
    }
}

/// Task document under `users/{uid}/tasks`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default)]
    pub name: String,
    /// Free text, e.g. "2 horas".
    #[serde(default)]
    pub duration: String,
    /// `yyyy-mm-dd`.
    #[serde(default)]
    pub date: String,
    /// Employee names as typed; not linked to employee documents.
    #[serde(default)]
    pub employees: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Task domain model with its document id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    #[serde(flatten)]
    pub record: TaskRecord,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CreateTaskPayload {
    pub name: String,
    pub duration: String,
    /// Defaults to today.
    pub date: Option<String>,
    /// Comma-separated names.
    pub employees: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UpdateTaskPayload {
    pub name: Option<String>,
    pub duration: Option<String>,
    pub date: Option<String>,
    pub employees: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub description: Option<String>,
}

/// Split the comma-separated employee field, dropping empty entries.
pub fn split_employee_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
