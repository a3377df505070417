use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
mod handlers;
pub mod jwt;
mod password;
mod repo;

pub use dto::CoachProfile;
pub use jwt::{AuthUser, JwtKeys};
pub(crate) use password::is_valid_email;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::extract::FromRef;
    use uuid::Uuid;

    use super::JwtKeys;
    use crate::state::AppState;

    /// `Authorization` header value for a random coach.
    pub fn bearer_for(state: &AppState) -> String {
        bearer_for_coach(state, Uuid::new_v4())
    }

    pub fn bearer_for_coach(state: &AppState, coach_id: Uuid) -> String {
        let token = JwtKeys::from_ref(state)
            .sign_access(coach_id)
            .expect("sign access");
        format!("Bearer {token}")
    }
}
