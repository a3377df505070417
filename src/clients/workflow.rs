//! Client lifecycle status transitions.
//!
//! Every (current, target) pair is accepted, including re-applying the
//! current status and leaving `Archived` or `Completed`. A transition persists
//! first and only then touches the caller's in-memory copy, so a failed write
//! never leaves a half-applied status behind.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::dto::{Client, ClientStatus, StatusUpdate};
use crate::error::{BackendError, StatusUpdateError};

/// Where status changes are persisted.
#[async_trait]
pub trait ClientStatusBackend: Send + Sync {
    async fn persist_status(&self, client_id: Uuid, update: StatusUpdate) -> Result<(), BackendError>;
}

/// Clients the caller currently holds in memory (roster, open detail view).
#[derive(Debug, Clone, Default)]
pub struct ClientRoster {
    clients: HashMap<Uuid, Client>,
}

impl ClientRoster {
    pub fn new(clients: impl IntoIterator<Item = Client>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, client_id: Uuid) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    pub fn status_of(&self, client_id: Uuid) -> Option<ClientStatus> {
        self.get(client_id).map(|c| c.status)
    }

    /// Inserts or replaces a client, e.g. after a fresh fetch.
    pub fn upsert(&mut self, client: Client) {
        self.clients.insert(client.id, client);
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    fn apply(&mut self, client_id: Uuid, update: StatusUpdate) -> Option<ClientStatus> {
        let client = self.clients.get_mut(&client_id)?;
        let previous = client.status;
        client.status = update.status;
        client.is_active = update.is_active;
        Some(previous)
    }
}

/// Outcome of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub client_id: Uuid,
    /// Status held in memory before the change; `None` if the client was not loaded.
    pub previous: Option<ClientStatus>,
    pub current: ClientStatus,
}

impl StatusTransition {
    pub fn changed(&self) -> bool {
        self.previous != Some(self.current)
    }
}

pub struct ClientStatusWorkflow<B> {
    backend: B,
}

impl<B: ClientStatusBackend> ClientStatusWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Persists `target` for the client, then mirrors it into `roster`.
    pub async fn transition(
        &self,
        roster: &mut ClientRoster,
        client_id: Uuid,
        target: ClientStatus,
    ) -> Result<StatusTransition, StatusUpdateError> {
        let update = StatusUpdate::to(target);

        if let Err(source) = self.backend.persist_status(client_id, update).await {
            error!(%client_id, status = %target, error = %source, "status update failed");
            return Err(StatusUpdateError::Persist { client_id, source });
        }

        let previous = roster.apply(client_id, update);
        let transition = StatusTransition {
            client_id,
            previous,
            current: target,
        };
        if transition.changed() {
            info!(%client_id, from = ?previous, to = %target, "client status changed");
        } else {
            debug!(%client_id, status = %target, "client status re-applied");
        }
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(Uuid, StatusUpdate)>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl ClientStatusBackend for RecordingBackend {
        async fn persist_status(&self, client_id: Uuid, update: StatusUpdate) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push((client_id, update));
            match self.fail_with {
                Some(status) => Err(BackendError::from_response(status, r#"{"detail":"Client not found"}"#)),
                None => Ok(()),
            }
        }
    }

    fn client(status: ClientStatus) -> Client {
        let now = OffsetDateTime::now_utc();
        Client {
            id: Uuid::new_v4(),
            coach_id: Uuid::nil(),
            name: "Sam".into(),
            email: format!("{}@example.com", Uuid::new_v4()),
            status,
            is_active: status.is_active(),
            goal: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn transition_persists_then_updates_roster() {
        let c = client(ClientStatus::Active);
        let id = c.id;
        let mut roster = ClientRoster::new([c]);
        let wf = ClientStatusWorkflow::new(RecordingBackend::default());

        let t = wf.transition(&mut roster, id, ClientStatus::OnHold).await.unwrap();

        assert!(t.changed());
        assert_eq!(t.previous, Some(ClientStatus::Active));
        assert_eq!(roster.status_of(id), Some(ClientStatus::OnHold));
        assert!(!roster.get(id).unwrap().is_active);
        let calls = wf.backend.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(id, StatusUpdate { status: ClientStatus::OnHold, is_active: false })]);
    }

    #[tokio::test]
    async fn every_pair_of_states_is_accepted() {
        let wf = ClientStatusWorkflow::new(RecordingBackend::default());
        for from in ClientStatus::ALL {
            for to in ClientStatus::ALL {
                let c = client(from);
                let id = c.id;
                let mut roster = ClientRoster::new([c]);
                let t = wf.transition(&mut roster, id, to).await.unwrap();
                assert_eq!(roster.status_of(id), Some(to));
                assert_eq!(t.changed(), from != to);
            }
        }
    }

    #[tokio::test]
    async fn same_status_persists_once_and_leaves_others_alone() {
        let target = client(ClientStatus::Completed);
        let other = client(ClientStatus::Inactive);
        let (target_id, other_snapshot) = (target.id, other.clone());
        let mut roster = ClientRoster::new([target, other]);
        let wf = ClientStatusWorkflow::new(RecordingBackend::default());

        let t = wf.transition(&mut roster, target_id, ClientStatus::Completed).await.unwrap();

        assert!(!t.changed());
        assert_eq!(wf.backend.calls.lock().unwrap().len(), 1);
        assert_eq!(roster.get(other_snapshot.id), Some(&other_snapshot));
        assert_eq!(roster.len(), 2);
    }

    #[tokio::test]
    async fn failed_persist_leaves_roster_untouched() {
        let c = client(ClientStatus::Active);
        let id = c.id;
        let mut roster = ClientRoster::new([c.clone()]);
        let wf = ClientStatusWorkflow::new(RecordingBackend {
            fail_with: Some(404),
            ..Default::default()
        });

        let err = wf.transition(&mut roster, id, ClientStatus::Archived).await.unwrap_err();

        assert_eq!(roster.get(id), Some(&c));
        let StatusUpdateError::Persist { client_id, source } = err;
        assert_eq!(client_id, id);
        assert_eq!(source.to_string(), "Client not found");
    }

    #[tokio::test]
    async fn unknown_client_is_persisted_without_roster_entry() {
        let mut roster = ClientRoster::default();
        let wf = ClientStatusWorkflow::new(RecordingBackend::default());
        let id = Uuid::new_v4();

        let t = wf.transition(&mut roster, id, ClientStatus::Active).await.unwrap();

        assert_eq!(t.previous, None);
        assert!(roster.is_empty());
    }
}
