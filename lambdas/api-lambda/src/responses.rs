use gth_atoms::{Alert, AlertKind, UserFacing};
use lambda_http::http::header::{HeaderValue, SET_COOKIE, VARY};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Response};
use serde::Serialize;

pub fn status_for(kind: AlertKind) -> StatusCode {
    match kind {
        AlertKind::Warning => StatusCode::BAD_REQUEST,
        AlertKind::NotFound => StatusCode::NOT_FOUND,
        AlertKind::Conflict => StatusCode::CONFLICT,
        AlertKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        AlertKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AlertKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        AlertKind::Failure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}

pub fn alert(status: StatusCode, alert: &Alert) -> Result<Response<Body>, Error> {
    json(status, alert)
}

/// Alert body with the status its kind maps to.
pub fn failure<E: UserFacing + std::fmt::Display>(err: &E) -> Result<Response<Body>, Error> {
    let kind = err.kind();
    match kind {
        AlertKind::Failure | AlertKind::Unavailable => tracing::error!("Request failed: {}", err),
        _ => tracing::warn!("Request rejected: {}", err),
    }
    alert(status_for(kind), &err.alert())
}

pub fn bad_request(message: &str) -> Result<Response<Body>, Error> {
    alert(StatusCode::BAD_REQUEST, &Alert::new("Error", message))
}

pub fn unauthorized() -> Result<Response<Body>, Error> {
    alert(
        StatusCode::UNAUTHORIZED,
        &Alert::new("Error", "Error: Usuario no autenticado."),
    )
}

pub fn not_found() -> Result<Response<Body>, Error> {
    json(StatusCode::NOT_FOUND, &serde_json::json!({"error": "Not found"}))
}

pub fn method_not_allowed() -> Result<Response<Body>, Error> {
    json(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({"error": "Method not allowed"}),
    )
}

pub fn with_set_cookies(mut resp: Response<Body>, cookies: &[String]) -> Response<Body> {
    let headers = resp.headers_mut();
    for cookie in cookies {
        if let Ok(v) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, v);
        }
    }
    resp
}

/// Origin to answer with and whether it may send credentials.
///
/// Only listed origins are echoed with credentials; a listed `*` answers any
/// other origin with a bare wildcard.
fn allowed_origin<'a>(
    allowed: &'a [String],
    request_origin: Option<&'a str>,
) -> Option<(&'a str, bool)> {
    if let Some(origin) = request_origin.filter(|o| allowed.iter().any(|a| a == o)) {
        return Some((origin, true));
    }
    allowed.iter().any(|a| a == "*").then_some(("*", false))
}

pub fn with_cors_headers(
    mut resp: Response<Body>,
    allowed_origins: &[String],
    request_origin: Option<&str>,
) -> Response<Body> {
    let headers = resp.headers_mut();
    if let Some((origin, credentials)) = allowed_origin(allowed_origins, request_origin) {
        if let Ok(v) = HeaderValue::from_str(origin) {
            headers.insert("Access-Control-Allow-Origin", v);
        }
        if credentials {
            headers.insert("Access-Control-Allow-Credentials", HeaderValue::from_static("true"));
        }
    }
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));
    resp
}

pub fn session_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; Secure; SameSite=None", name, value)
}

pub fn persistent_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        name, value, max_age_secs
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0", name)
}
