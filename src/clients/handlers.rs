use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{Client, ClientStatus, CreateClientRequest, StatusUpdateRequest},
    repo,
};
use crate::{
    auth::{is_valid_email, AuthUser},
    error::{AppError, ValidationError},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", get(get_client).delete(delete_client))
        .route("/clients/:id/status", put(update_status))
}

fn not_found() -> AppError {
    AppError::NotFound("Client not found".into())
}

#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(repo::list_by_coach(&state.db, coach_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_client(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "is required").into());
    }
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::new("email", "is not a valid address").into());
    }
    if repo::email_taken(&state.db, &email).await? {
        warn!(%email, "client email already registered");
        return Err(AppError::Conflict("Client email already registered".into()));
    }

    let status = ClientStatus::from_active_flag(payload.is_active);
    let client = repo::create(
        &state.db,
        coach_id,
        name,
        &email,
        payload.goal.as_deref(),
        status,
    )
    .await?;

    info!(client_id = %client.id, %coach_id, %status, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}

#[instrument(skip(state))]
pub async fn get_client(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    repo::find(&state.db, coach_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[instrument(skip(state))]
pub async fn delete_client(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, coach_id, id).await? {
        return Err(not_found());
    }
    info!(client_id = %id, %coach_id, "client deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Client>, AppError> {
    let update = payload.validate()?;
    if payload.is_active.is_some_and(|flag| flag != update.is_active) {
        warn!(client_id = %id, status = %update.status, "is_active flag disagrees with status; using status");
    }

    let client = repo::update_status(&state.db, coach_id, id, update)
        .await?
        .ok_or_else(not_found)?;

    info!(client_id = %id, status = %client.status, "client status persisted");
    Ok(Json(client))
}
