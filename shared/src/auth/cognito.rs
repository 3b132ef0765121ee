//! Cognito user-pool adapter.
//!
//! The pool is expected to use the email address as username.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use base64::{engine::general_purpose::STANDARD, Engine};
use gth_atoms::AuthUser;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{AuthError, AuthProvider, AuthResult, AuthSession};

type HmacSha256 = Hmac<Sha256>;

/// `SECRET_HASH` for app clients that carry a secret:
/// base64(HMAC-SHA256(secret, username + client_id)).
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> AuthResult<String> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|e| AuthError::Other(format!("invalid client secret: {}", e)))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Map a Cognito exception code to the app's error cases.
pub fn error_for_code(code: Option<&str>, message: Option<&str>) -> AuthError {
    let message = message.unwrap_or_default();
    match code.unwrap_or_default() {
        "NotAuthorizedException" => AuthError::InvalidCredential,
        "UsernameExistsException" | "AliasExistsException" => AuthError::EmailAlreadyInUse,
        "TooManyRequestsException" | "LimitExceededException" | "TooManyFailedAttemptsException" => {
            AuthError::TooManyRequests
        }
        "UserNotFoundException" => AuthError::UserNotFound,
        "InvalidParameterException" if message.to_lowercase().contains("email") => {
            AuthError::InvalidEmail
        }
        "" => AuthError::Other(message.to_string()),
        code => AuthError::Other(format!("{}: {}", code, message)),
    }
}

fn classify<E, R>(op: &str, err: SdkError<E, R>) -> AuthError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            tracing::warn!("Cognito {} unreachable: {}", op, DisplayErrorContext(&err));
            AuthError::NetworkRequestFailed(DisplayErrorContext(&err).to_string())
        }
        SdkError::ServiceError(service) => {
            let inner = service.err();
            let mapped = error_for_code(inner.code(), inner.message());
            tracing::info!("Cognito {} rejected: {:?}", op, mapped);
            mapped
        }
        _ => {
            tracing::error!("Cognito {} error: {}", op, DisplayErrorContext(&err));
            AuthError::Other(DisplayErrorContext(&err).to_string())
        }
    }
}

fn attribute(name: &str, value: &str) -> AuthResult<AttributeType> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| AuthError::Other(e.to_string()))
}

pub struct CognitoAuthProvider {
    client: CognitoClient,
    client_id: String,
    client_secret: String,
    user_pool_id: String,
}

impl CognitoAuthProvider {
    pub fn new(
        client: CognitoClient,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_pool_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_pool_id: user_pool_id.into(),
        }
    }

    fn hash_for(&self, username: &str) -> AuthResult<Option<String>> {
        if self.client_secret.is_empty() {
            return Ok(None);
        }
        secret_hash(username, &self.client_id, &self.client_secret).map(Some)
    }

    async fn password_auth(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let mut request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password);
        if let Some(hash) = self.hash_for(email)? {
            request = request.auth_parameters("SECRET_HASH", hash);
        }

        let output = request
            .send()
            .await
            .map_err(|e| classify("initiate_auth", e))?;

        let Some(result) = output.authentication_result() else {
            tracing::warn!("Cognito answered with challenge {:?}", output.challenge_name());
            return Err(AuthError::Other("authentication challenge not supported".into()));
        };
        let access_token = result
            .access_token()
            .ok_or_else(|| AuthError::Other("missing access token".into()))?
            .to_string();

        let user = self.current_user(&access_token).await?;
        Ok(AuthSession {
            user,
            access_token,
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl AuthProvider for CognitoAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .set_secret_hash(self.hash_for(email)?)
            .username(email)
            .password(password)
            .user_attributes(attribute("email", email)?)
            .send()
            .await
            .map_err(|e| classify("sign_up", e))?;
        tracing::info!("Cognito user {} created", output.user_sub());

        // Accounts are usable right away; there is no verification step.
        self.client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .send()
            .await
            .map_err(|e| classify("admin_confirm_sign_up", e))?;

        self.password_auth(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.password_auth(email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        self.client
            .global_sign_out()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| classify("global_sign_out", e))?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .set_secret_hash(self.hash_for(email)?)
            .username(email)
            .send()
            .await
            .map_err(|e| classify("forgot_password", e))?;
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> AuthResult<()> {
        match self.password_auth(email, password).await {
            Ok(_) => Ok(()),
            Err(AuthError::InvalidCredential) => Err(AuthError::WrongPassword),
            Err(e) => Err(e),
        }
    }

    async fn update_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let result = self
            .client
            .change_password()
            .access_token(access_token)
            .previous_password(current_password)
            .proposed_password(new_password)
            .send()
            .await;

        match result.map_err(|e| classify("change_password", e)) {
            Ok(_) => Ok(()),
            Err(AuthError::InvalidCredential) => Err(AuthError::WrongPassword),
            Err(e) => Err(e),
        }
    }

    async fn update_display_name(&self, access_token: &str, display_name: &str) -> AuthResult<()> {
        self.client
            .update_user_attributes()
            .access_token(access_token)
            .user_attributes(attribute("name", display_name)?)
            .send()
            .await
            .map_err(|e| classify("update_user_attributes", e))?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> AuthResult<AuthUser> {
        let output = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| match classify("get_user", e) {
                AuthError::InvalidCredential => AuthError::Unauthenticated,
                other => other,
            })?;

        let find = |name: &str| {
            output
                .user_attributes()
                .iter()
                .find(|attr| attr.name() == name)
                .and_then(|attr| attr.value())
                .map(str::to_string)
        };

        let mut user = AuthUser::new(find("sub").unwrap_or_else(|| output.username().to_string()));
        user.email = find("email");
        user.display_name = find("name");
        Ok(user)
    }
}
