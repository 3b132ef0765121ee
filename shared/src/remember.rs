//! "Remember me" storage for the login form.
//!
//! Each device that asks to be remembered gets a random key, handed back to
//! it in a cookie. Credentials are only ever read under that key. Values are
//! kept the way the mobile key-value storage kept them: one JSON string per
//! key, with the password as entered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use thiserror::Error;

pub const CREDENTIALS_KEY: &str = "userCredentials";
pub const REMEMBER_DEVICE_COOKIE: &str = "remember_device";

/// Fresh unguessable device key.
pub fn new_device_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn entry_key(device: &str) -> String {
    format!("{}:{}", CREDENTIALS_KEY, device)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberedCredentials {
    pub stored_email: String,
    pub stored_password: String,
}

#[derive(Debug, Error)]
pub enum RememberError {
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("credential storage lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self, device: &str) -> Result<Option<RememberedCredentials>, RememberError>;
    async fn save(
        &self,
        device: &str,
        credentials: &RememberedCredentials,
    ) -> Result<(), RememberError>;
    async fn clear(&self, device: &str) -> Result<(), RememberError>;
}

type Entries = BTreeMap<String, String>;

/// JSON file of key to serialized value. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<Entries, RememberError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), RememberError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(entries)?).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self, device: &str) -> Result<Option<RememberedCredentials>, RememberError> {
        let entries = self.read_entries().await?;
        match entries.get(&entry_key(device)) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        device: &str,
        credentials: &RememberedCredentials,
    ) -> Result<(), RememberError> {
        let mut entries = self.read_entries().await?;
        entries.insert(entry_key(device), serde_json::to_string(credentials)?);
        self.write_entries(&entries).await
    }

    async fn clear(&self, device: &str) -> Result<(), RememberError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(&entry_key(device)).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    stored: Arc<RwLock<BTreeMap<String, RememberedCredentials>>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device: &str) -> Option<RememberedCredentials> {
        self.stored.read().ok().and_then(|s| s.get(device).cloned())
    }

    pub fn len(&self) -> usize {
        self.stored.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self, device: &str) -> Result<Option<RememberedCredentials>, RememberError> {
        let stored = self.stored.read().map_err(|_| RememberError::Poisoned)?;
        Ok(stored.get(device).cloned())
    }

    async fn save(
        &self,
        device: &str,
        credentials: &RememberedCredentials,
    ) -> Result<(), RememberError> {
        self.stored
            .write()
            .map_err(|_| RememberError::Poisoned)?
            .insert(device.to_string(), credentials.clone());
        Ok(())
    }

    async fn clear(&self, device: &str) -> Result<(), RememberError> {
        self.stored
            .write()
            .map_err(|_| RememberError::Poisoned)?
            .remove(device);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("gth-{}-{}-{}.json", name, std::process::id(), nanos))
    }

    fn credentials() -> RememberedCredentials {
        RememberedCredentials {
            stored_email: "ana@gth.com".into(),
            stored_password: "Secreto123".into(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let store = FileCredentialStore::new(temp_path("missing"));
        assert_eq!(store.load("d1").await.unwrap(), None);
        store.clear("d1").await.unwrap();
    }

    #[tokio::test]
    async fn file_keeps_the_storage_layout() {
        let path = temp_path("layout");
        let store = FileCredentialStore::new(&path);
        store.save("d1", &credentials()).await.unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        let inner: serde_json::Value = serde_json::from_str(&raw["userCredentials:d1"]).unwrap();
        assert_eq!(inner["storedEmail"], "ana@gth.com");
        assert_eq!(inner["storedPassword"], "Secreto123");

        assert_eq!(store.load("d1").await.unwrap(), Some(credentials()));
        store.clear("d1").await.unwrap();
        assert_eq!(store.load("d1").await.unwrap(), None);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn clear_keeps_other_keys() {
        let path = temp_path("other-keys");
        tokio::fs::write(&path, r#"{"theme":"\"dark\""}"#).await.unwrap();
        let store = FileCredentialStore::new(&path);

        store.save("d1", &credentials()).await.unwrap();
        store.clear("d1").await.unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(raw.len(), 1);
        assert!(raw.contains_key("theme"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn devices_do_not_see_each_other() {
        let path = temp_path("devices");
        let store = FileCredentialStore::new(&path);
        store.save("d1", &credentials()).await.unwrap();

        assert_eq!(store.load("d2").await.unwrap(), None);
        store.clear("d2").await.unwrap();
        assert_eq!(store.load("d1").await.unwrap(), Some(credentials()));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn device_keys_are_distinct() {
        assert_ne!(new_device_key(), new_device_key());
    }
}
