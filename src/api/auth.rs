use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::auth;
use crate::models::Session;
use crate::store::Store;

#[derive(Deserialize)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

/// Load the session once per request and hand it down; handlers never
/// re-read it mid-flight.
pub(crate) async fn require_session(store: &dyn Store) -> Result<Session, ApiError> {
    auth::current_session(store)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Sesión requerida".to_string()))
}

pub(crate) fn require_admin(session: &Session) -> Result<(), ApiError> {
    if session.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthPayload>,
) -> Result<Json<Session>, ApiError> {
    let session = auth::register(state.store.as_ref(), &payload.email, &payload.password).await?;
    Ok(Json(session))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthPayload>,
) -> Result<Json<Session>, ApiError> {
    let session = auth::login(state.store.as_ref(), &payload.email, &payload.password).await?;
    Ok(Json(session))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    require_session(state.store.as_ref()).await?;
    auth::logout(state.store.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session(State(state): State<Arc<AppState>>) -> Result<Json<Session>, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    Ok(Json(session))
}
