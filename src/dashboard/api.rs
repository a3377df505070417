//! Async HTTP client for the meal-plan REST API.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::session::ProfileSource;
use crate::{
    auth::CoachProfile,
    clients::{Client as CoachClient, ClientStatusBackend, StatusUpdate},
    config::ApiConfig,
    error::{BackendError, DashboardError},
    mealplans::{CreatePlanRequest, MealPlan, PlanDetail},
};

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same client, authenticating as `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sends `req`; any non-success status becomes a [`BackendError`].
    async fn execute(req: RequestBuilder) -> Result<Response, BackendError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = BackendError::from_response(status.as_u16(), &body);
        warn!(%status, error = %err, "backend call failed");
        Err(err)
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, BackendError> {
        Ok(Self::execute(req).await?.json().await?)
    }

    /// Like `send`, but a 404 is `Ok(None)`.
    async fn send_optional<T: DeserializeOwned>(req: RequestBuilder) -> Result<Option<T>, BackendError> {
        match Self::execute(req).await {
            Ok(resp) => Ok(Some(resp.json().await?)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `POST /mealplan`. Validates and fills in macros before anything is sent.
    #[instrument(skip(self, request))]
    pub async fn create_plan(&self, request: &CreatePlanRequest) -> Result<MealPlan, DashboardError> {
        let plan = request.validate()?;
        let created: MealPlan = Self::send(self.auth(self.http.post(self.url("/mealplan"))).json(&plan)).await?;
        debug!(plan_id = %created.id, "plan created");
        Ok(created)
    }

    /// `GET /mealplan/:id`; `None` when the plan does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_plan_detail(&self, plan_id: Uuid) -> Result<Option<PlanDetail>, BackendError> {
        Self::send_optional(self.auth(self.http.get(self.url(&format!("/mealplan/{plan_id}"))))).await
    }

    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<CoachClient>, BackendError> {
        Self::send(self.auth(self.http.get(self.url("/clients")))).await
    }

    /// `PUT /clients/:id/status`
    #[instrument(skip(self))]
    pub async fn update_client_status(
        &self,
        client_id: Uuid,
        update: StatusUpdate,
    ) -> Result<CoachClient, BackendError> {
        let req = self
            .auth(self.http.put(self.url(&format!("/clients/{client_id}/status"))))
            .json(&update);
        Self::send(req).await
    }

    /// `GET /auth/me` with the client's own token.
    pub async fn fetch_profile(&self) -> Result<CoachProfile, BackendError> {
        Self::send(self.auth(self.http.get(self.url("/auth/me")))).await
    }
}

#[async_trait]
impl ClientStatusBackend for ApiClient {
    async fn persist_status(&self, client_id: Uuid, update: StatusUpdate) -> Result<(), BackendError> {
        self.update_client_status(client_id, update).await.map(|_| ())
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile_with(&self, token: &str) -> Result<CoachProfile, BackendError> {
        Self::send(self.http.get(self.url("/auth/me")).bearer_auth(token)).await
    }
}
