use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::api_error::ApiError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
    persistence::{PersistenceBridge, mysql_bridge::DbPool},
    realtime::{connection, gateway::Gateway},
};
use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use chrono::Duration;
use log::info;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod attendance;
mod class;
mod login;
mod me;
pub mod middleware;
mod signup;
mod students;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub session: Arc<AttendanceSession>,
    pub bridge: Arc<dyn PersistenceBridge>,
    pub jwt_secret: Arc<String>,
    pub token_ttl: Duration,
}

pub(crate) fn success(data: impl Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub(crate) fn require_role(user: &AuthenticatedUser, role: Role) -> Result<(), ApiError> {
    match role {
        Role::Teacher if !user.is_teacher() => Err(ApiError::Forbidden(
            "Forbidden, teacher access required".to_string(),
        )),
        Role::Student if !user.is_student() => Err(ApiError::Forbidden("Forbidden".to_string())),
        _ => Ok(()),
    }
}

async fn hello() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "hello from live attendance system backend!",
    }))
}

pub fn router(state: AppState, gateway: Arc<Gateway>, frontend_url: Option<&str>) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me::me))
        .route("/class", post(class::create_class))
        .route("/class/{id}", get(class::get_class))
        .route("/class/{id}/add-student", post(class::add_student))
        .route("/class/{id}/my-attendance", get(class::my_attendance))
        .route("/students", get(students::students))
        .route("/attendance/start", post(attendance::start))
        .route("/attendance/all", get(attendance::all))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authentication::authentication,
        ));

    let app = Router::new()
        .route("/", get(hello))
        .route("/auth/signup", post(signup::signup))
        .route("/auth/login", post(login::login))
        .merge(protected)
        .with_state(state)
        .merge(connection::router(gateway));

    match frontend_url.and_then(|url| url.parse::<HeaderValue>().ok()) {
        Some(origin) => app.layer(CorsLayer::new().allow_origin(origin)),
        None => app,
    }
}

/// Serves `router` until the listener fails.
pub async fn listen(router: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("HTTP server listening on port {port}");
    axum::serve(listener, router).await
}
