use gth_atoms::store::DynamoDocumentStore;
use gth_atoms::DocumentStore;
use std::sync::Arc;

use crate::auth::{AuthProvider, CognitoAuthProvider};
use crate::config::Config;
use crate::remember::{CredentialStore, FileCredentialStore};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            store,
            auth,
            credentials,
        }
    }

    /// Wire the AWS-backed adapters from the ambient AWS configuration.
    pub async fn from_config(config: Config) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let dynamo_client = aws_sdk_dynamodb::Client::new(&aws_config);
        let cognito_client = aws_sdk_cognitoidentityprovider::Client::new(&aws_config);

        let store = DynamoDocumentStore::new(dynamo_client, config.table_name.clone());
        let auth = CognitoAuthProvider::new(
            cognito_client,
            config.cognito_client_id.clone(),
            config.cognito_client_secret.clone(),
            config.cognito_user_pool_id.clone(),
        );
        let credentials = FileCredentialStore::new(config.credentials_path.clone());

        Self::new(config, Arc::new(store), Arc::new(auth), Arc::new(credentials))
    }
}
