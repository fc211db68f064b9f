use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Redirect,
    routing::{any, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const USERNAME: &str = "gopher";
pub const PASSWORD: &str = "secret";

/// Size of the `/big` response body, past ureq's default read limit.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct SignIn {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: String,
    /// Only `x-*` headers, so transport-added headers do not leak in.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

/// Name of the signed-in user, if any. One session per app instance.
pub type Session = Arc<RwLock<Option<String>>>;

pub fn app() -> Router {
    let session: Session = Arc::new(RwLock::new(None));
    Router::new()
        .route("/foo/bar", get(foo_bar))
        .route("/signin", post(sign_in))
        .route("/signout", post(sign_out))
        .route("/me", get(me))
        .route("/old", any(old))
        .route("/new", get(new))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/big", get(big))
        .with_state(session)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn foo_bar() -> Json<Value> {
    Json(json!({"foo": "bar"}))
}

async fn sign_in(
    State(session): State<Session>,
    Form(input): Form<SignIn>,
) -> (StatusCode, Json<Value>) {
    if input.username != USERNAME || input.password != PASSWORD {
        info!(username = %input.username, "sign-in rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid credentials"})),
        );
    }
    *session.write().await = Some(input.username.clone());
    info!(username = %input.username, "signed in");
    (StatusCode::OK, Json(json!({"user": input.username})))
}

async fn sign_out(State(session): State<Session>) -> StatusCode {
    session.write().await.take();
    StatusCode::NO_CONTENT
}

async fn me(State(session): State<Session>) -> Result<Json<Value>, StatusCode> {
    let user = session.read().await.clone().ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(json!({"user": user})))
}

async fn old() -> Redirect {
    Redirect::to("/new")
}

async fn new() -> Json<Value> {
    Json(json!({"moved": true}))
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let mut echoed: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        if name.as_str().starts_with("x-") {
            echoed
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();
    Json(Echo {
        method: method.to_string(),
        content_type,
        headers: echoed,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn big() -> Vec<u8> {
    vec![b'a'; BIG_BODY_LEN]
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
