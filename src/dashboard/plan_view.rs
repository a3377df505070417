use tracing::{info, instrument};
use uuid::Uuid;

use super::api::ApiClient;
use crate::{
    error::BackendError,
    mealplans::{
        dto::PlanView,
        fallback,
        schedule::{normalize, Normalized},
    },
};

/// Fetches a plan and builds the screen model. A missing plan or empty history
/// falls back to example data; only transport and server failures are errors.
#[instrument(skip(api))]
pub async fn load_plan_view(api: &ApiClient, plan_id: Uuid) -> Result<PlanView, BackendError> {
    let view = match api.fetch_plan_detail(plan_id).await? {
        Some(detail) => fallback::resolve(Some(detail.mealplan), normalize(&detail.history)),
        None => {
            info!(%plan_id, "plan not found; showing example week");
            fallback::resolve(None, Normalized::default())
        }
    };
    Ok(view)
}
