//! In-memory auth provider for tests and local runs.

use async_trait::async_trait;
use gth_atoms::AuthUser;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AuthError, AuthProvider, AuthResult, AuthSession};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by email.
    accounts: HashMap<String, Account>,
    /// Access token to email.
    sessions: HashMap<String, String>,
    reset_requests: Vec<String>,
    next_failure: Option<AuthError>,
}

/// Accounts and sessions held in memory. Calls are counted and the next
/// call can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthProvider {
    state: Arc<Mutex<State>>,
    calls: Arc<AtomicUsize>,
    issued: Arc<AtomicUsize>,
}

impl InMemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing sign-up.
    pub fn with_account(self, uid: &str, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let mut user = AuthUser::new(uid).with_email(email);
        user.display_name = display_name.map(str::to_string);
        if let Ok(mut state) = self.state.lock() {
            state.accounts.insert(
                email.to_string(),
                Account {
                    user,
                    password: password.to_string(),
                },
            );
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The next provider call fails with `error`.
    pub fn fail_next(&self, error: AuthError) {
        if let Ok(mut state) = self.state.lock() {
            state.next_failure = Some(error);
        }
    }

    pub fn user(&self, email: &str) -> Option<AuthUser> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.accounts.get(email).map(|a| a.user.clone()))
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.accounts.get(email).map(|a| a.password.clone()))
    }

    pub fn active_sessions(&self) -> usize {
        self.state.lock().map(|s| s.sessions.len()).unwrap_or(0)
    }

    pub fn reset_requests(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.reset_requests.clone())
            .unwrap_or_default()
    }

    /// Count the call and hand out the state, or the injected failure.
    fn enter(&self) -> AuthResult<MutexGuard<'_, State>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self
            .state
            .lock()
            .map_err(|e| AuthError::Other(e.to_string()))?;
        match state.next_failure.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }

    fn open_session(&self, state: &mut State, email: &str) -> AuthResult<AuthSession> {
        let account = state.accounts.get(email).ok_or(AuthError::UserNotFound)?;
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access_token = format!("access-{}", n);
        let session = AuthSession {
            user: account.user.clone(),
            access_token: access_token.clone(),
            id_token: Some(format!("id-{}", n)),
            refresh_token: Some(format!("refresh-{}", n)),
        };
        state.sessions.insert(access_token, email.to_string());
        Ok(session)
    }

    fn email_for(state: &State, access_token: &str) -> AuthResult<String> {
        state
            .sessions
            .get(access_token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let mut state = self.enter()?;
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if state.accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let uid = format!("uid-{}", state.accounts.len() + 1);
        state.accounts.insert(
            email.to_string(),
            Account {
                user: AuthUser::new(uid).with_email(email),
                password: password.to_string(),
            },
        );
        self.open_session(&mut state, email)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let mut state = self.enter()?;
        let valid = state
            .accounts
            .get(email)
            .is_some_and(|account| account.password == password);
        if !valid {
            return Err(AuthError::InvalidCredential);
        }
        self.open_session(&mut state, email)
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let mut state = self.enter()?;
        let email = Self::email_for(&state, access_token)?;
        state.sessions.retain(|_, owner| *owner != email);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        let mut state = self.enter()?;
        if !state.accounts.contains_key(email) {
            return Err(AuthError::UserNotFound);
        }
        state.reset_requests.push(email.to_string());
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> AuthResult<()> {
        let state = self.enter()?;
        match state.accounts.get(email) {
            Some(account) if account.password == password => Ok(()),
            Some(_) => Err(AuthError::WrongPassword),
            None => Err(AuthError::UserNotFound),
        }
    }

    async fn update_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let mut state = self.enter()?;
        let email = Self::email_for(&state, access_token)?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or(AuthError::UserNotFound)?;
        if account.password != current_password {
            return Err(AuthError::WrongPassword);
        }
        account.password = new_password.to_string();
        Ok(())
    }

    async fn update_display_name(&self, access_token: &str, display_name: &str) -> AuthResult<()> {
        let mut state = self.enter()?;
        let email = Self::email_for(&state, access_token)?;
        if let Some(account) = state.accounts.get_mut(&email) {
            account.user.display_name = Some(display_name.to_string());
        }
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> AuthResult<AuthUser> {
        let state = self.enter()?;
        let email = Self::email_for(&state, access_token)?;
        state
            .accounts
            .get(&email)
            .map(|a| a.user.clone())
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_checks_password() {
        let auth = InMemoryAuthProvider::new().with_account("u1", "ana@gth.com", "Secreto123", None);

        assert_eq!(
            auth.sign_in("ana@gth.com", "otra").await.unwrap_err(),
            AuthError::InvalidCredential
        );
        let session = auth.sign_in("ana@gth.com", "Secreto123").await.unwrap();
        assert_eq!(session.user.uid, "u1");
        assert_eq!(auth.current_user(&session.access_token).await.unwrap().uid, "u1");
        assert_eq!(auth.calls(), 3);
    }

    #[tokio::test]
    async fn sign_out_ends_every_session() {
        let auth = InMemoryAuthProvider::new().with_account("u1", "ana@gth.com", "Secreto123", None);
        let first = auth.sign_in("ana@gth.com", "Secreto123").await.unwrap();
        auth.sign_in("ana@gth.com", "Secreto123").await.unwrap();

        auth.sign_out(&first.access_token).await.unwrap();

        assert_eq!(auth.active_sessions(), 0);
        assert_eq!(
            auth.current_user(&first.access_token).await.unwrap_err(),
            AuthError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let auth = InMemoryAuthProvider::new().with_account("u1", "ana@gth.com", "Secreto123", None);
        auth.fail_next(AuthError::NetworkRequestFailed("offline".into()));

        assert!(matches!(
            auth.sign_in("ana@gth.com", "Secreto123").await,
            Err(AuthError::NetworkRequestFailed(_))
        ));
        assert!(auth.sign_in("ana@gth.com", "Secreto123").await.is_ok());
    }
}
