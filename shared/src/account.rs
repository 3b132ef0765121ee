//! Account flows: sign-up, login with "remember me", logout and password
//! management.

use gth_atoms::employees::{register_account_employee, EmployeeError};
use gth_atoms::validation::{
    is_blank, is_strong_password, is_valid_email, is_valid_email_format, is_valid_name,
    passwords_match,
};
use gth_atoms::{Alert, AlertKind, UserFacing};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthContext, AuthError, AuthProvider, AuthSession};
use crate::messages::{alert_for, kind_for, AuthOperation};
use crate::remember::{new_device_key, CredentialStore, RememberedCredentials};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(Alert),

    #[error("{op:?} failed: {source}")]
    Auth {
        op: AuthOperation,
        #[source]
        source: AuthError,
    },

    #[error("{alert}")]
    Store {
        alert: Alert,
        #[source]
        source: EmployeeError,
    },
}

impl AccountError {
    fn auth(op: AuthOperation) -> impl FnOnce(AuthError) -> Self {
        move |source| Self::Auth { op, source }
    }
}

impl UserFacing for AccountError {
    fn alert(&self) -> Alert {
        match self {
            Self::Invalid(alert) | Self::Store { alert, .. } => alert.clone(),
            Self::Auth { op, source } => alert_for(*op, source),
        }
    }

    fn kind(&self) -> AlertKind {
        match self {
            Self::Invalid(_) => AlertKind::Warning,
            Self::Auth { source, .. } => kind_for(source),
            Self::Store { source, .. } => source.kind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// Values to pre-fill the login form with.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginPrefill {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn invalid(title: &str, message: &str) -> AccountError {
    AccountError::Invalid(Alert::new(title, message))
}

fn check_sign_up(form: &SignUpForm) -> Result<(), AccountError> {
    let required = [
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.password,
        &form.confirm_password,
    ];
    if required.iter().any(|field| is_blank(field)) {
        return Err(invalid("", "Todos los campos son obligatorios."));
    }
    if !is_valid_name(form.first_name.trim()) {
        return Err(invalid("", "El nombre solo puede contener letras y espacios."));
    }
    if !is_valid_name(form.last_name.trim()) {
        return Err(invalid("", "El apellido solo puede contener letras y espacios."));
    }
    if !is_valid_email(&form.email) {
        return Err(invalid("", "Ingrese un correo electrónico válido."));
    }
    if !passwords_match(&form.password, &form.confirm_password) {
        return Err(invalid("", "Las contraseñas no coinciden."));
    }
    if !is_strong_password(&form.password) {
        return Err(invalid(
            "",
            "La contraseña debe cumplir con todos los requisitos de seguridad.",
        ));
    }
    Ok(())
}

/// Create the account, name it, register it as an employee and leave it
/// signed out.
pub async fn sign_up(
    auth: &dyn AuthProvider,
    store: &dyn gth_atoms::DocumentStore,
    form: SignUpForm,
) -> Result<Alert, AccountError> {
    check_sign_up(&form)?;

    let email = form.email.trim();
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();

    let session = auth
        .sign_up(email, &form.password)
        .await
        .map_err(AccountError::auth(AuthOperation::SignUp))?;
    tracing::info!("Account {} created", session.user.uid);

    auth.update_display_name(&session.access_token, &format!("{} {}", first_name, last_name))
        .await
        .map_err(AccountError::auth(AuthOperation::SignUp))?;

    register_account_employee(store, &session.user.uid, first_name, last_name, email)
        .await
        .map_err(|source| AccountError::Store {
            alert: Alert::new("Error", "Hubo un problema al registrar el usuario."),
            source,
        })?;

    if let Err(e) = auth.sign_out(&session.access_token).await {
        tracing::warn!("Sign-out after sign-up failed for {}: {}", session.user.uid, e);
    }

    Ok(Alert::new(
        "Registro exitoso",
        "Tu cuenta ha sido creada. Por favor inicia sesión.",
    ))
}

/// A successful login and the device key its credentials are remembered
/// under, if the user asked to be remembered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: AuthSession,
    pub remember_device: Option<String>,
}

/// Sign in, then remember or forget the credentials for the calling device.
///
/// Storage is only touched after a successful sign-in. A device without a key
/// gets a new one. Storage failures are logged and never block the login.
pub async fn login(
    auth: &dyn AuthProvider,
    credentials: &dyn CredentialStore,
    form: LoginForm,
    device: Option<&str>,
) -> Result<LoginOutcome, AccountError> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(invalid("", "Por favor, complete todos los campos."));
    }

    let session = auth
        .sign_in(&form.email, &form.password)
        .await
        .map_err(AccountError::auth(AuthOperation::Login))?;
    tracing::info!("User {} signed in", session.user.uid);

    let remember_device = if form.remember_me {
        let key = device.map_or_else(new_device_key, str::to_string);
        let remembered = RememberedCredentials {
            stored_email: form.email,
            stored_password: form.password,
        };
        match credentials.save(&key, &remembered).await {
            Ok(()) => Some(key),
            Err(e) => {
                tracing::error!("Could not save remembered credentials: {}", e);
                None
            }
        }
    } else {
        if let Some(device) = device {
            if let Err(e) = credentials.clear(device).await {
                tracing::error!("Could not clear remembered credentials: {}", e);
            }
        }
        None
    };

    Ok(LoginOutcome {
        session,
        remember_device,
    })
}

/// What the login form starts with on this device. No key, or unreadable
/// storage, counts as empty.
pub async fn remembered_credentials(
    credentials: &dyn CredentialStore,
    device: Option<&str>,
) -> LoginPrefill {
    let Some(device) = device.filter(|d| !d.is_empty()) else {
        return LoginPrefill::default();
    };
    match credentials.load(device).await {
        Ok(Some(stored)) => LoginPrefill {
            email: stored.stored_email,
            password: stored.stored_password,
            remember_me: true,
        },
        Ok(None) => LoginPrefill::default(),
        Err(e) => {
            tracing::error!("Could not read remembered credentials: {}", e);
            LoginPrefill::default()
        }
    }
}

pub async fn logout(auth: &dyn AuthProvider, ctx: &AuthContext) -> Result<Alert, AccountError> {
    auth.sign_out(&ctx.access_token)
        .await
        .map_err(AccountError::auth(AuthOperation::Logout))?;
    tracing::info!("User {} signed out", ctx.user.uid);
    Ok(Alert::new("Éxito", "Sesión cerrada correctamente"))
}

pub fn password_reset_sent_alert() -> Alert {
    Alert::new(
        "Solicitud enviada",
        "Se ha enviado un enlace a su correo. Si su cuenta existe, recibirá las instrucciones \
         para restablecer su contraseña. Por favor, revise su bandeja de entrada y la casilla de spam.",
    )
}

/// Request a reset link. Unknown accounts get the same answer as known ones.
pub async fn send_password_reset(auth: &dyn AuthProvider, email: &str) -> Result<Alert, AccountError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid(
            "Campo requerido",
            "Por favor, ingrese su correo electrónico.",
        ));
    }
    if !is_valid_email_format(email) {
        return Err(invalid(
            "Formato inválido",
            "Por favor, ingrese un formato de correo válido.",
        ));
    }

    match auth.send_password_reset(email).await {
        Ok(()) => {}
        Err(AuthError::UserNotFound) => {
            tracing::info!("Password reset requested for unknown account");
        }
        Err(e) => return Err(AccountError::auth(AuthOperation::PasswordReset)(e)),
    }
    Ok(password_reset_sent_alert())
}

pub async fn change_password(
    auth: &dyn AuthProvider,
    ctx: &AuthContext,
    form: ChangePasswordForm,
) -> Result<Alert, AccountError> {
    if form.current_password.is_empty()
        || form.new_password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err(invalid("Error", "Todos los campos son obligatorios."));
    }
    if !is_strong_password(&form.new_password) {
        return Err(invalid(
            "Error",
            "La nueva contraseña debe cumplir con todos los requisitos de seguridad.",
        ));
    }
    if form.new_password != form.confirm_password {
        return Err(invalid("Error", "Las contraseñas no coinciden."));
    }
    let Some(email) = ctx.user.email.as_deref() else {
        return Err(invalid("Error", "No se ha encontrado un usuario."));
    };

    auth.reauthenticate(email, &form.current_password)
        .await
        .map_err(AccountError::auth(AuthOperation::ChangePassword))?;
    auth.update_password(&ctx.access_token, &form.current_password, &form.new_password)
        .await
        .map_err(AccountError::auth(AuthOperation::ChangePassword))?;

    tracing::info!("Password changed for {}", ctx.user.uid);
    Ok(Alert::new("Éxito", "Contraseña cambiada correctamente"))
}
