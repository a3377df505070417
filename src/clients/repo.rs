use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Client, ClientStatus, StatusUpdate};

#[derive(Debug, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub is_active: bool,
    pub goal: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ClientRow> for Client {
    type Error = anyhow::Error;

    fn try_from(r: ClientRow) -> anyhow::Result<Self> {
        let status = r
            .status
            .parse::<ClientStatus>()
            .with_context(|| format!("client {} has stored status {:?}", r.id, r.status))?;
        Ok(Self {
            id: r.id,
            coach_id: r.coach_id,
            name: r.name,
            email: r.email,
            status,
            is_active: r.is_active,
            goal: r.goal,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const COLUMNS: &str = "id, coach_id, name, email, status, is_active, goal, created_at, updated_at";

pub async fn list_by_coach(db: &PgPool, coach_id: Uuid) -> anyhow::Result<Vec<Client>> {
    let rows = sqlx::query_as::<_, ClientRow>(&format!(
        "SELECT {COLUMNS} FROM clients WHERE coach_id = $1 ORDER BY created_at DESC"
    ))
    .bind(coach_id)
    .fetch_all(db)
    .await
    .context("list clients")?;
    rows.into_iter().map(Client::try_from).collect()
}

pub async fn find(db: &PgPool, coach_id: Uuid, client_id: Uuid) -> anyhow::Result<Option<Client>> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
        "SELECT {COLUMNS} FROM clients WHERE id = $1 AND coach_id = $2"
    ))
    .bind(client_id)
    .bind(coach_id)
    .fetch_optional(db)
    .await
    .context("find client")?;
    row.map(Client::try_from).transpose()
}

pub async fn create(
    db: &PgPool,
    coach_id: Uuid,
    name: &str,
    email: &str,
    goal: Option<&str>,
    status: ClientStatus,
) -> anyhow::Result<Client> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
        r#"
        INSERT INTO clients (coach_id, name, email, goal, status, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(coach_id)
    .bind(name)
    .bind(email)
    .bind(goal)
    .bind(status.as_str())
    .bind(status.is_active())
    .fetch_one(db)
    .await
    .context("insert client")?;
    Client::try_from(row)
}

pub async fn email_taken(db: &PgPool, email: &str) -> anyhow::Result<bool> {
    let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM clients WHERE email = $1)")
        .bind(email)
        .fetch_one(db)
        .await
        .context("check client email")?;
    Ok(taken)
}

/// Writes the new status; `None` when the client does not belong to the coach.
pub async fn update_status(
    db: &PgPool,
    coach_id: Uuid,
    client_id: Uuid,
    update: StatusUpdate,
) -> anyhow::Result<Option<Client>> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
        r#"
        UPDATE clients
           SET status = $3, is_active = $4, updated_at = now()
         WHERE id = $1 AND coach_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(client_id)
    .bind(coach_id)
    .bind(update.status.as_str())
    .bind(update.is_active)
    .fetch_optional(db)
    .await
    .context("update client status")?;
    row.map(Client::try_from).transpose()
}

pub async fn delete(db: &PgPool, coach_id: Uuid, client_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND coach_id = $2")
        .bind(client_id)
        .bind(coach_id)
        .execute(db)
        .await
        .context("delete client")?;
    Ok(result.rows_affected() > 0)
}
