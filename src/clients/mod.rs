use crate::state::AppState;
use axum::Router;

pub mod dto;
mod handlers;
pub(crate) mod repo;
pub mod workflow;

pub use dto::{Client, ClientStatus, StatusUpdate};
pub use workflow::{ClientRoster, ClientStatusBackend, ClientStatusWorkflow, StatusTransition};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
