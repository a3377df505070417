use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, CoachProfile, LoginRequest, RefreshRequest, RegisterRequest},
    jwt::{AuthUser, JwtKeys},
    password::{check_password, hash_password, is_valid_email, verify_password},
    repo::Coach,
};
use crate::{
    error::{AppError, ValidationError},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

fn issue_tokens(state: &AppState, coach: CoachProfile) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(coach.id)?,
        refresh_token: keys.sign_refresh(coach.id)?,
        token_type: "bearer",
        user: coach,
    })
}

fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::new("email", "is not a valid address"));
    }
    Ok(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email)?;
    check_password(&payload.password)?;

    if Coach::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let full_name = payload.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let coach = Coach::create(&state.db, &email, &hash, full_name).await?;

    info!(coach_id = %coach.id, email = %coach.email, "coach registered");
    Ok(Json(issue_tokens(&state, coach.into())?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email)?;
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(coach) = Coach::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &coach.password_hash)? {
        warn!(coach_id = %coach.id, "login invalid password");
        return Err(invalid());
    }

    info!(coach_id = %coach.id, "coach logged in");
    Ok(Json(issue_tokens(&state, coach.into())?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let coach = load_profile(&state, claims.coach_id()).await?;
    Ok(Json(issue_tokens(&state, coach)?))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(coach_id): AuthUser,
) -> Result<Json<CoachProfile>, AppError> {
    Ok(Json(load_profile(&state, coach_id).await?))
}

async fn load_profile(state: &AppState, coach_id: Uuid) -> Result<CoachProfile, AppError> {
    Coach::find_by_id(&state.db, coach_id)
        .await?
        .map(CoachProfile::from)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt as _;

    use crate::app::build_app;

    #[test]
    fn profile_serialization() {
        let profile = CoachProfile {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            full_name: None,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"id\""));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Coach@Example.COM ").unwrap(), "coach@example.com");
        assert_eq!(normalize_email("nope").unwrap_err().field, "email");
    }

    #[tokio::test]
    async fn register_rejects_short_password_before_db() {
        let req = Request::post("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"a@b.co","password":"short"}"#))
            .unwrap();
        let resp = build_app(AppState::fake()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let state = AppState::fake();
        let access = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let req = Request::post("/api/v1/auth/refresh")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "refresh_token": access }).to_string()))
            .unwrap();
        let resp = build_app(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
