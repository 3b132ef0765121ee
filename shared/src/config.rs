use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "gth";
pub const DEFAULT_CREDENTIALS_PATH: &str = "/tmp/gth-credentials.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Runtime configuration, read once from the environment at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding every collection.
    pub table_name: String,
    pub cognito_client_id: String,
    /// Empty when the app client has no secret.
    pub cognito_client_secret: String,
    pub cognito_user_pool_id: String,
    /// Where remembered login credentials are kept.
    pub credentials_path: PathBuf,
    /// Origins allowed to call with credentials. `*` admits any origin
    /// without credentials.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            cognito_client_id: String::new(),
            cognito_client_secret: String::new(),
            cognito_user_pool_id: String::new(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            cors_origins: vec!["*".to_string()],
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let defaults = Self::default();

        Ok(Self {
            table_name: get("TABLE_NAME").unwrap_or(defaults.table_name),
            cognito_client_id: require("COGNITO_CLIENT_ID")?,
            cognito_client_secret: get("COGNITO_CLIENT_SECRET").unwrap_or_default(),
            cognito_user_pool_id: require("COGNITO_USER_POOL_ID")?,
            credentials_path: get("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.cors_origins),
        })
    }
}
