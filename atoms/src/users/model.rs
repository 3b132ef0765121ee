use serde::{Deserialize, Serialize};

/// The backend-managed identity, distinct from the profile document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name and surname guessed from the display name.
    pub fn names(&self) -> (String, String) {
        self.display_name
            .as_deref()
            .map(split_display_name)
            .unwrap_or_default()
    }
}

/// First word is the name, the rest is the surname.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let mut words = display_name.split_whitespace();
    let name = words.next().unwrap_or_default().to_string();
    let surname = words.collect::<Vec<_>>().join(" ");
    (name, surname)
}
