use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::{
    agents::{
        dto::{AuthSuccess, ErrorBody, LoginRequest, RegisterRequest},
        services::CredentialError,
    },
    state::AppState,
};

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.code() })).into_response()
    }
}

pub fn agent_routes() -> Router<AppState> {
    Router::new()
        .route("/agents/register", post(register))
        .route("/agents/login", post(login))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AuthSuccess>), CredentialError> {
    state.accounts.ensure_available()?;
    let req: RegisterRequest = parse_body(&body)?;
    let created = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthSuccess>, CredentialError> {
    state.accounts.ensure_available()?;
    let req: LoginRequest = parse_body(&body)?;
    Ok(Json(state.accounts.login(req).await?))
}

/// Bodies are parsed as JSON whatever the `Content-Type` header says.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CredentialError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejected request body");
        CredentialError::InvalidJson
    })
}
