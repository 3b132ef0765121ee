use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing modal content. Every outcome the app reports is one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Alert with an empty title, as most form warnings are shown.
    pub fn untitled(message: impl Into<String>) -> Self {
        Self::new("", message)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.title, self.message)
        }
    }
}

/// What kind of failure an alert reports; the HTTP layer maps it to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Input rejected before any backend call.
    Warning,
    NotFound,
    Conflict,
    Unauthenticated,
    RateLimited,
    Unavailable,
    Failure,
}

/// Errors that can be shown to the user.
pub trait UserFacing {
    fn alert(&self) -> Alert;
    fn kind(&self) -> AlertKind;
}
