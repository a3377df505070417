use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::CoachProfile;

/// Coach account row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Coach {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub full_name: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Coach> for CoachProfile {
    fn from(c: Coach) -> Self {
        Self {
            id: c.id,
            email: c.email,
            full_name: c.full_name,
        }
    }
}

impl Coach {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>(
            r#"
            SELECT id, email, password_hash, full_name, created_at
            FROM coaches
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(coach)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>(
            r#"
            SELECT id, email, password_hash, full_name, created_at
            FROM coaches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(coach)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> anyhow::Result<Coach> {
        let coach = sqlx::query_as::<_, Coach>(
            r#"
            INSERT INTO coaches (email, password_hash, full_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, full_name, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(db)
        .await?;
        Ok(coach)
    }
}
