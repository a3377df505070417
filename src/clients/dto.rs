use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ValidationError;

/// Lifecycle status of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Inactive,
    Completed,
    #[serde(alias = "On Hold")]
    OnHold,
    Archived,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 5] = [
        ClientStatus::Active,
        ClientStatus::Inactive,
        ClientStatus::Completed,
        ClientStatus::OnHold,
        ClientStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Inactive => "Inactive",
            ClientStatus::Completed => "Completed",
            ClientStatus::OnHold => "OnHold",
            ClientStatus::Archived => "Archived",
        }
    }

    /// The `is_active` flag stored next to the status.
    pub fn is_active(self) -> bool {
        self == ClientStatus::Active
    }

    /// Initial status at registration.
    pub fn from_active_flag(is_active: bool) -> Self {
        if is_active {
            ClientStatus::Active
        } else {
            ClientStatus::Inactive
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        ClientStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&key))
            .ok_or_else(|| ValidationError::new("status", format!("unknown status `{s}`")))
    }
}

/// A coach's client as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
    pub is_active: bool,
    pub goal: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub goal: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of a status change. `is_active` always mirrors `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: ClientStatus,
    pub is_active: bool,
}

impl StatusUpdate {
    pub fn to(status: ClientStatus) -> Self {
        Self {
            status,
            is_active: status.is_active(),
        }
    }
}

/// Status change as received over the wire; the status is parsed leniently.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub is_active: Option<bool>,
}

impl StatusUpdateRequest {
    pub fn validate(&self) -> Result<StatusUpdate, ValidationError> {
        Ok(StatusUpdate::to(self.status.parse()?))
    }
}
