use gth_atoms::employees::{
    self, DeleteOutcome, EmployeeEdit, EmployeeFilter, EmployeeForm, EmployeeProfileView,
};
use gth_atoms::profiles::{self, ProfileForm};
use gth_atoms::tasks::{self, CreateTaskPayload, TaskStatus, UpdateTaskPayload};
use gth_shared::account::{self, ChangePasswordForm, LoginForm, SignUpForm};
use gth_shared::auth::{self, request_cookie, AuthContext, ACCESS_TOKEN_COOKIE};
use gth_shared::remember::REMEMBER_DEVICE_COOKIE;
use gth_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::responses::{
    self, bad_request, clear_cookie, failure, method_not_allowed, not_found, persistent_cookie,
    session_cookie, unauthorized, with_cors_headers, with_set_cookies,
};

const REMEMBER_DEVICE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

#[derive(Deserialize)]
struct PasswordResetRequest {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct PhotoRequest {
    #[serde(default)]
    uri: String,
}

fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T, Error> {
    let bytes: &[u8] = body.as_ref();
    let bytes = if bytes.is_empty() { b"{}".as_slice() } else { bytes };
    Ok(serde_json::from_slice(bytes)?)
}

/// Parse the JSON body or answer 400.
macro_rules! body_or_400 {
    ($event:expr) => {
        match parse_body($event.body()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Invalid request body: {}", e);
                return bad_request("El cuerpo de la solicitud no es válido.");
            }
        }
    };
}

fn query<'a>(event: &'a Request, key: &str) -> Option<&'a str> {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first(key))
}

fn query_flag(event: &Request, key: &str) -> Option<bool> {
    query(event, key).and_then(|v| v.parse().ok())
}

/// Main Lambda handler.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    let request_origin = event
        .headers()
        .get("Origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    let finalize = |resp: Result<Response<Body>, Error>| {
        resp.map(|r| with_cors_headers(r, &state.config.cors_origins, request_origin.as_deref()))
    };

    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return finalize(Ok(resp));
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    // Public routes
    match (&method, parts.as_slice()) {
        (&Method::POST, ["signup"]) => return finalize(signup(&event, &state).await),
        (&Method::POST, ["login"]) => return finalize(login(&event, &state).await),
        (&Method::GET, ["login", "remembered"]) => {
            let device = request_cookie(event.headers(), REMEMBER_DEVICE_COOKIE);
            let prefill =
                account::remembered_credentials(state.credentials.as_ref(), device.as_deref())
                    .await;
            return finalize(responses::json(StatusCode::OK, &prefill));
        }
        (&Method::POST, ["password", "forgot"]) => {
            return finalize(forgot_password(&event, &state).await)
        }
        (_, ["signup"] | ["login"] | ["login", "remembered"] | ["password", "forgot"]) => {
            return finalize(method_not_allowed())
        }
        _ => {}
    }

    let ctx = match auth::authenticate(state.auth.as_ref(), event.headers()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!("Unauthenticated request to {}: {}", path, e);
            return finalize(unauthorized());
        }
    };

    let resp = match parts.first().copied() {
        Some("logout" | "password") => session_routes(&method, &parts, &event, &state, &ctx).await,
        Some("users") => user_routes(&method, &parts, &event, &state, &ctx).await,
        Some("employees") => employee_routes(&method, &parts, &event, &state).await,
        Some("tasks") => task_routes(&method, &parts, &event, &state, &ctx).await,
        _ => not_found(),
    };
    finalize(resp)
}

async fn signup(event: &Request, state: &AppState) -> Result<Response<Body>, Error> {
    let form: SignUpForm = body_or_400!(event);
    match account::sign_up(state.auth.as_ref(), state.store.as_ref(), form).await {
        Ok(alert) => responses::alert(StatusCode::CREATED, &alert),
        Err(e) => failure(&e),
    }
}

async fn login(event: &Request, state: &AppState) -> Result<Response<Body>, Error> {
    let form: LoginForm = body_or_400!(event);
    let device = request_cookie(event.headers(), REMEMBER_DEVICE_COOKIE);
    let outcome = match account::login(
        state.auth.as_ref(),
        state.credentials.as_ref(),
        form,
        device.as_deref(),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => return failure(&e),
    };

    let mut cookies = vec![session_cookie(ACCESS_TOKEN_COOKIE, &outcome.session.access_token)];
    match (&outcome.remember_device, &device) {
        (Some(key), _) => cookies.push(persistent_cookie(
            REMEMBER_DEVICE_COOKIE,
            key,
            REMEMBER_DEVICE_MAX_AGE,
        )),
        (None, Some(_)) => cookies.push(clear_cookie(REMEMBER_DEVICE_COOKIE)),
        (None, None) => {}
    }
    let resp = responses::json(StatusCode::OK, &outcome.session)?;
    Ok(with_set_cookies(resp, &cookies))
}

async fn forgot_password(event: &Request, state: &AppState) -> Result<Response<Body>, Error> {
    let request: PasswordResetRequest = body_or_400!(event);
    match account::send_password_reset(state.auth.as_ref(), &request.email).await {
        Ok(alert) => responses::alert(StatusCode::OK, &alert),
        Err(e) => failure(&e),
    }
}

async fn session_routes(
    method: &Method,
    parts: &[&str],
    event: &Request,
    state: &AppState,
    ctx: &AuthContext,
) -> Result<Response<Body>, Error> {
    match (method, parts) {
        (&Method::POST, ["logout"]) => match account::logout(state.auth.as_ref(), ctx).await {
            Ok(alert) => {
                let resp = responses::alert(StatusCode::OK, &alert)?;
                Ok(with_set_cookies(resp, &[clear_cookie(ACCESS_TOKEN_COOKIE)]))
            }
            Err(e) => failure(&e),
        },
        (&Method::POST, ["password", "change"]) => {
            let form: ChangePasswordForm = body_or_400!(event);
            match account::change_password(state.auth.as_ref(), ctx, form).await {
                Ok(alert) => responses::alert(StatusCode::OK, &alert),
                Err(e) => failure(&e),
            }
        }
        (_, ["logout"] | ["password", "change"]) => method_not_allowed(),
        _ => not_found(),
    }
}

async fn user_routes(
    method: &Method,
    parts: &[&str],
    event: &Request,
    state: &AppState,
    ctx: &AuthContext,
) -> Result<Response<Body>, Error> {
    let store = state.store.as_ref();
    let user = &ctx.user;

    match (method, parts) {
        (&Method::GET, ["users", "me"]) => {
            let profile = profiles::load_profile(store, user).await;
            let view = profiles::view_profile(store, user).await;
            responses::json(StatusCode::OK, &json!({ "profile": profile, "view": view }))
        }
        (&Method::PUT, ["users", "me"]) => {
            let form: ProfileForm = body_or_400!(event);
            match profiles::save_profile(store, user, form).await {
                Ok(profile) => responses::json(
                    StatusCode::OK,
                    &json!({ "alert": profiles::saved_alert(), "profile": profile }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::PUT, ["users", "me", "photo"]) => {
            let request: PhotoRequest = body_or_400!(event);
            match profiles::set_profile_photo(store, user, &request.uri).await {
                Ok(()) => responses::alert(StatusCode::OK, &profiles::photo_updated_alert()),
                Err(e) => failure(&e),
            }
        }
        (_, ["users", "me"] | ["users", "me", "photo"]) => method_not_allowed(),
        _ => not_found(),
    }
}

async fn employee_routes(
    method: &Method,
    parts: &[&str],
    event: &Request,
    state: &AppState,
) -> Result<Response<Body>, Error> {
    let store = state.store.as_ref();

    match (method, parts) {
        (&Method::GET, ["employees"]) => {
            let filter = EmployeeFilter {
                q: query(event, "q").map(str::to_string),
                active: query_flag(event, "active"),
            };
            match employees::list_employees(store, &filter).await {
                Ok(list) => responses::json(StatusCode::OK, &list),
                Err(e) => failure(&e),
            }
        }
        (&Method::POST, ["employees"]) => {
            let form: EmployeeForm = body_or_400!(event);
            match employees::create_employee(store, form).await {
                Ok(employee) => responses::json(
                    StatusCode::CREATED,
                    &json!({ "alert": employees::added_alert(), "employee": employee }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::GET, ["employees", id]) => match employees::get_employee(store, id).await {
            Ok(employee) => responses::json(StatusCode::OK, &employee),
            Err(e) => failure(&e),
        },
        (&Method::PATCH, ["employees", id]) => {
            let edit: EmployeeEdit = body_or_400!(event);
            match employees::update_employee(store, id, edit).await {
                Ok(employee) => responses::json(
                    StatusCode::OK,
                    &json!({ "alert": employees::updated_alert(), "employee": employee }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::DELETE, ["employees", id]) => {
            let confirmed = query_flag(event, "confirm").unwrap_or(false);
            match employees::delete_employee(store, id, confirmed).await {
                Ok(DeleteOutcome::ConfirmationRequired(prompt)) => {
                    responses::alert(StatusCode::CONFLICT, &prompt)
                }
                Ok(DeleteOutcome::Deleted(remaining)) => responses::json(
                    StatusCode::OK,
                    &json!({ "alert": employees::deleted_alert(), "employees": remaining }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::GET, ["employees", id, "profile"]) => {
            match employees::get_employee(store, id).await {
                Ok(employee) => {
                    responses::json(StatusCode::OK, &EmployeeProfileView::from(&employee))
                }
                Err(e) => failure(&e),
            }
        }
        (_, ["employees"] | ["employees", _] | ["employees", _, "profile"]) => method_not_allowed(),
        _ => not_found(),
    }
}

async fn task_routes(
    method: &Method,
    parts: &[&str],
    event: &Request,
    state: &AppState,
    ctx: &AuthContext,
) -> Result<Response<Body>, Error> {
    let store = state.store.as_ref();
    let uid = ctx.user.uid.as_str();

    match (method, parts) {
        (&Method::GET, ["tasks"]) => {
            let status = match query(event, "status").filter(|s| !s.is_empty()) {
                Some(raw) => match raw.parse::<TaskStatus>() {
                    Ok(status) => Some(status),
                    Err(e) => {
                        tracing::warn!("Rejected task filter: {}", e);
                        return bad_request("Estado de tarea desconocido.");
                    }
                },
                None => None,
            };
            match tasks::list_tasks(store, uid, status).await {
                Ok(list) => responses::json(StatusCode::OK, &list),
                Err(e) => failure(&e),
            }
        }
        (&Method::POST, ["tasks"]) => {
            let payload: CreateTaskPayload = body_or_400!(event);
            match tasks::create_task(store, uid, payload).await {
                Ok(task) => responses::json(
                    StatusCode::CREATED,
                    &json!({ "alert": tasks::created_alert(), "task": task }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::GET, ["tasks", id]) => match tasks::get_task(store, uid, id).await {
            Ok(task) => responses::json(StatusCode::OK, &task),
            Err(e) => failure(&e),
        },
        (&Method::PATCH, ["tasks", id]) => {
            let payload: UpdateTaskPayload = body_or_400!(event);
            match tasks::update_task(store, uid, id, payload).await {
                Ok(task) => responses::json(
                    StatusCode::OK,
                    &json!({ "alert": tasks::updated_alert(), "task": task }),
                ),
                Err(e) => failure(&e),
            }
        }
        (&Method::DELETE, ["tasks", id]) => match tasks::delete_task(store, uid, id).await {
            Ok(()) => responses::alert(StatusCode::OK, &tasks::deleted_alert()),
            Err(e) => failure(&e),
        },
        (_, ["tasks"] | ["tasks", _]) => method_not_allowed(),
        _ => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gth_atoms::store::{collections, InMemoryDocumentStore};
    use gth_shared::auth::InMemoryAuthProvider;
    use gth_shared::remember::InMemoryCredentialStore;
    use gth_shared::{AuthProvider, Config};
    use lambda_http::http;
    use rstest::{fixture, rstest};
    use serde_json::Value;
    use std::collections::HashMap;

    const EMAIL: &str = "ana@gth.com";
    const PASSWORD: &str = "Secreto123";
    const APP_ORIGIN: &str = "https://app.gth.com";

    struct Harness {
        state: Arc<AppState>,
        store: InMemoryDocumentStore,
        token: String,
    }

    #[fixture]
    async fn harness() -> Harness {
        let store = InMemoryDocumentStore::new();
        let auth = InMemoryAuthProvider::new().with_account("u1", EMAIL, PASSWORD, Some("Ana Gómez"));
        let token = auth.sign_in(EMAIL, PASSWORD).await.unwrap().access_token;
        let config = Config {
            cors_origins: vec![APP_ORIGIN.to_string(), "*".to_string()],
            ..Config::default()
        };
        let state = AppState::new(
            config,
            Arc::new(store.clone()),
            Arc::new(auth),
            Arc::new(InMemoryCredentialStore::new()),
        );
        Harness {
            state: Arc::new(state),
            store,
            token,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = body.map_or(Body::Empty, |b| Body::Text(b.to_string()));
        builder.body(body).unwrap()
    }

    fn with_query(req: Request, pairs: &[(&str, &str)]) -> Request {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        req.with_query_string_parameters(params)
    }

    fn body_json(resp: &Response<Body>) -> Value {
        serde_json::from_slice(resp.body().as_ref()).unwrap()
    }

    async fn call(h: &Harness, req: Request) -> Response<Body> {
        function_handler(req, h.state.clone()).await.unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn preflight_gets_cors_headers(#[future] harness: Harness) {
        let h = harness.await;
        let mut req = request("OPTIONS", "/employees", None, None);
        req.headers_mut().insert("Origin", APP_ORIGIN.parse().unwrap());

        let resp = call(&h, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], APP_ORIGIN);
        assert_eq!(resp.headers()["Access-Control-Allow-Credentials"], "true");
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_origins_get_no_credentials(#[future] harness: Harness) {
        let h = harness.await;
        let mut req = request("GET", "/employees", Some(&h.token), None);
        req.headers_mut()
            .insert("Origin", "https://evil.example".parse().unwrap());

        let resp = call(&h, req).await;

        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert!(resp
            .headers()
            .get("Access-Control-Allow-Credentials")
            .is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn protected_routes_need_a_token(#[future] harness: Harness) {
        let h = harness.await;
        let resp = call(&h, request("GET", "/employees", None, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = call(&h, request("GET", "/tasks", Some("bogus"), None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    fn set_cookies(resp: &Response<Body>) -> Vec<String> {
        resp.headers()
            .get_all("Set-Cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn with_cookie(mut req: Request, cookie: &str) -> Request {
        req.headers_mut().insert("Cookie", cookie.parse().unwrap());
        req
    }

    #[rstest]
    #[tokio::test]
    async fn login_sets_cookies(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "email": EMAIL, "password": PASSWORD, "rememberMe": true });

        let resp = call(&h, request("POST", "/login", None, Some(body))).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let cookies = set_cookies(&resp);
        assert!(cookies[0].starts_with("access_token=access-"));
        assert!(cookies[1].starts_with("remember_device="));
        assert_eq!(body_json(&resp)["user"]["uid"], "u1");
    }

    #[rstest]
    #[tokio::test]
    async fn remembered_credentials_stay_with_their_device(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "email": EMAIL, "password": PASSWORD, "rememberMe": true });
        let resp = call(&h, request("POST", "/login", None, Some(body))).await;
        let device_cookie = set_cookies(&resp)[1]
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let mine = with_cookie(request("GET", "/login/remembered", None, None), &device_cookie);
        let resp = call(&h, mine).await;
        assert_eq!(body_json(&resp)["email"], EMAIL);
        assert_eq!(body_json(&resp)["password"], PASSWORD);
        assert_eq!(body_json(&resp)["rememberMe"], true);

        let resp = call(&h, request("GET", "/login/remembered", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(&resp),
            json!({ "email": "", "password": "", "rememberMe": false })
        );

        let guessed = with_cookie(
            request("GET", "/login/remembered", None, None),
            "remember_device=00000000-0000-0000-0000-000000000000",
        );
        assert_eq!(body_json(&call(&h, guessed).await)["email"], "");
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_login_cannot_touch_remembered_credentials(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "email": EMAIL, "password": PASSWORD, "rememberMe": true });
        let resp = call(&h, request("POST", "/login", None, Some(body))).await;
        let device_cookie = set_cookies(&resp)[1]
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let wrong = json!({ "email": EMAIL, "password": "otra", "rememberMe": false });
        let resp = call(&h, request("POST", "/login", None, Some(wrong))).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let forget = json!({ "email": EMAIL, "password": PASSWORD, "rememberMe": false });
        call(&h, request("POST", "/login", None, Some(forget))).await;

        let mine = with_cookie(request("GET", "/login/remembered", None, None), &device_cookie);
        assert_eq!(body_json(&call(&h, mine).await)["email"], EMAIL);
    }

    #[rstest]
    #[tokio::test]
    async fn employee_edit_keeps_omitted_fields(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({
            "nombre": "Luis",
            "apellido": "Pérez",
            "imagen": "file:///fotos/luis.jpg"
        });
        let resp = call(&h, request("POST", "/employees", Some(&h.token), Some(body))).await;
        let id = body_json(&resp)["employee"]["id"].as_str().unwrap().to_string();
        let path = format!("/employees/{}", id);

        let off = json!({ "activo": false });
        call(&h, request("PATCH", &path, Some(&h.token), Some(off))).await;
        let edit = json!({ "puesto": "Tasador" });
        let resp = call(&h, request("PATCH", &path, Some(&h.token), Some(edit))).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let employee = &body_json(&resp)["employee"];
        assert_eq!(employee["puesto"], "Tasador");
        assert_eq!(employee["activo"], false);
        assert_eq!(employee["imagen"], "file:///fotos/luis.jpg");
        assert_eq!(employee["nombre"], "Luis");
    }

    #[rstest]
    #[tokio::test]
    async fn bad_login_is_401(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "email": EMAIL, "password": "otra" });
        let resp = call(&h, request("POST", "/login", None, Some(body))).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(&resp)["message"], "Credenciales inválidas.");
    }

    #[rstest]
    #[tokio::test]
    async fn employee_validation_is_400_without_writes(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "nombre": "Ana" });

        let resp = call(&h, request("POST", "/employees", Some(&h.token), Some(body))).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&resp)["title"], "Campos obligatorios");
        assert_eq!(h.store.calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn employee_delete_requires_confirmation(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "nombre": "Luis", "apellido": "Pérez", "puesto": "Vendedor" });
        let resp = call(&h, request("POST", "/employees", Some(&h.token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(&resp)["employee"]["id"].as_str().unwrap().to_string();
        let path = format!("/employees/{}", id);

        let resp = call(&h, request("DELETE", &path, Some(&h.token), None)).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(&resp)["title"], "Eliminar empleado");
        assert_eq!(h.store.len(collections::EMPLOYEES), 1);

        let req = with_query(
            request("DELETE", &path, Some(&h.token), None),
            &[("confirm", "true")],
        );
        let resp = call(&h, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(&resp)["employees"], json!([]));
        assert_eq!(h.store.len(collections::EMPLOYEES), 0);

        let resp = call(&h, request("GET", &path, Some(&h.token), None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn employee_search_and_profile(#[future] harness: Harness) {
        let h = harness.await;
        for (name, surname) in [("Luis", "Pérez"), ("Marta", "Ruiz")] {
            let body = json!({ "nombre": name, "apellido": surname });
            call(&h, request("POST", "/employees", Some(&h.token), Some(body))).await;
        }

        let req = with_query(request("GET", "/employees", Some(&h.token), None), &[("q", "ruiz")]);
        let resp = call(&h, req).await;
        let list = body_json(&resp);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let id = list[0]["id"].as_str().unwrap();
        let resp = call(
            &h,
            request("GET", &format!("/employees/{}/profile", id), Some(&h.token), None),
        )
        .await;
        let view = body_json(&resp);
        assert_eq!(view["initials"], "MR");
        assert_eq!(view["status_label"], "Activo");
        assert_eq!(view["position"], "No asignado");
    }

    #[rstest]
    #[tokio::test]
    async fn tasks_are_scoped_and_filtered(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({
            "name": "Visita",
            "duration": "1 hora",
            "employees": "Ana, Luis",
            "description": "Mostrar casa",
            "status": "finalizada"
        });
        let resp = call(&h, request("POST", "/tasks", Some(&h.token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(&resp)["alert"]["message"], "Tarea creada exitosamente");
        assert_eq!(h.store.len(&collections::user_tasks("u1")), 1);

        let req = with_query(request("GET", "/tasks", Some(&h.token), None), &[("status", "iniciada")]);
        assert_eq!(body_json(&call(&h, req).await), json!([]));

        let req = with_query(request("GET", "/tasks", Some(&h.token), None), &[("status", "pausada")]);
        assert_eq!(call(&h, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_save_and_read(#[future] harness: Harness) {
        let h = harness.await;
        let body = json!({ "nombre": "Ana", "apellido": "Gómez", "ciudad": "Rosario" });

        let resp = call(&h, request("PUT", "/users/me", Some(&h.token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(&resp)["profile"]["email"], EMAIL);

        let resp = call(&h, request("GET", "/users/me", Some(&h.token), None)).await;
        let json = body_json(&resp);
        assert_eq!(json["view"]["city"], "Rosario");
        assert_eq!(json["view"]["full_name"], "Ana Gómez");
    }

    #[rstest]
    #[tokio::test]
    async fn logout_clears_cookie(#[future] harness: Harness) {
        let h = harness.await;
        let resp = call(&h, request("POST", "/logout", Some(&h.token), None)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()["Set-Cookie"]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        let resp = call(&h, request("GET", "/users/me", Some(&h.token), None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_routes(#[future] harness: Harness) {
        let h = harness.await;
        let resp = call(&h, request("GET", "/nada", Some(&h.token), None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = call(&h, request("PUT", "/login", None, None)).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
