use gth_atoms::AuthUser;
use lambda_http::http::header::{AUTHORIZATION, COOKIE};
use lambda_http::http::HeaderMap;

use super::{AuthError, AuthProvider, AuthResult};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub access_token: String,
    pub user: AuthUser,
}

fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Value of the named cookie, when present and non-empty.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| cookie_value(v, name).filter(|value| !value.is_empty()))
        .map(str::to_string)
}

/// Token from `Authorization: Bearer ...`, else from the access token cookie.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_header.or_else(|| request_cookie(headers, ACCESS_TOKEN_COOKIE))
}

pub async fn authenticate(auth: &dyn AuthProvider, headers: &HeaderMap) -> AuthResult<AuthContext> {
    let access_token = bearer_token(headers).ok_or(AuthError::Unauthenticated)?;
    let user = auth.current_user(&access_token).await?;
    Ok(AuthContext { access_token, user })
}
