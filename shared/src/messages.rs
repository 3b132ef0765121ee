//! Spanish alerts for auth provider failures.

use gth_atoms::{Alert, AlertKind};

use crate::auth::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    SignUp,
    Login,
    Logout,
    ChangePassword,
    PasswordReset,
}

const NETWORK_LOGIN: &str = "Error de red. Por favor, comprueba tu conexión.";

/// The alert shown when `op` fails with `err`.
pub fn alert_for(op: AuthOperation, err: &AuthError) -> Alert {
    use AuthError::*;
    use AuthOperation::*;

    let message = match (op, err) {
        (SignUp, InvalidEmail) => "El correo electrónico ingresado no es válido.",
        (SignUp, EmailAlreadyInUse) => "Este correo electrónico ya está en uso.",
        (SignUp, NetworkRequestFailed(_)) => "Problema de conexión. Revise su internet.",
        (SignUp, _) => "Hubo un problema al registrar el usuario.",

        (Login, NetworkRequestFailed(_)) => NETWORK_LOGIN,
        (Login, _) => "Credenciales inválidas.",

        (Logout, _) => "Hubo un problema al cerrar sesión.",

        (ChangePassword, WrongPassword | InvalidCredential) => "La contraseña actual es incorrecta.",
        (ChangePassword, Unauthenticated | UserNotFound) => "No se ha encontrado un usuario.",
        (ChangePassword, _) => "Ocurrió un error al cambiar la contraseña. Inténtalo de nuevo.",

        (PasswordReset, NetworkRequestFailed(_)) => NETWORK_LOGIN,
        (PasswordReset, TooManyRequests) => {
            "Demasiados intentos. Por favor, espere unos minutos antes de intentar nuevamente."
        }
        (PasswordReset, _) => {
            "Hubo un problema al procesar su solicitud. Por favor, intente nuevamente más tarde."
        }
    };

    match op {
        Login => Alert::untitled(message),
        _ => Alert::new("Error", message),
    }
}

/// Response class for an auth failure.
pub fn kind_for(err: &AuthError) -> AlertKind {
    match err {
        AuthError::NetworkRequestFailed(_) => AlertKind::Unavailable,
        AuthError::TooManyRequests => AlertKind::RateLimited,
        AuthError::Unauthenticated
        | AuthError::InvalidCredential
        | AuthError::WrongPassword
        | AuthError::UserNotFound => AlertKind::Unauthenticated,
        AuthError::EmailAlreadyInUse => AlertKind::Conflict,
        AuthError::InvalidEmail => AlertKind::Warning,
        AuthError::Other(_) => AlertKind::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthOperation::SignUp, AuthError::EmailAlreadyInUse, "Este correo electrónico ya está en uso.")]
    #[case(AuthOperation::SignUp, AuthError::Other("x".into()), "Hubo un problema al registrar el usuario.")]
    #[case(AuthOperation::Login, AuthError::UserNotFound, "Credenciales inválidas.")]
    #[case(
        AuthOperation::Login,
        AuthError::NetworkRequestFailed("dns".into()),
        "Error de red. Por favor, comprueba tu conexión."
    )]
    #[case(AuthOperation::ChangePassword, AuthError::InvalidCredential, "La contraseña actual es incorrecta.")]
    #[case(
        AuthOperation::PasswordReset,
        AuthError::TooManyRequests,
        "Demasiados intentos. Por favor, espere unos minutos antes de intentar nuevamente."
    )]
    fn messages(#[case] op: AuthOperation, #[case] err: AuthError, #[case] expected: &str) {
        assert_eq!(alert_for(op, &err).message, expected);
    }

    #[test]
    fn login_alerts_are_untitled() {
        assert_eq!(alert_for(AuthOperation::Login, &AuthError::InvalidCredential).title, "");
        assert_eq!(alert_for(AuthOperation::SignUp, &AuthError::InvalidEmail).title, "Error");
    }

    #[test]
    fn reset_never_reveals_missing_accounts() {
        let missing = alert_for(AuthOperation::PasswordReset, &AuthError::UserNotFound);
        let other = alert_for(AuthOperation::PasswordReset, &AuthError::Other("boom".into()));
        assert_eq!(missing, other);
    }
}
