use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    dto::{DayHistoryRow, MealPlan, NewMealPlan},
    generator::GeneratedDay,
};

const PLAN_COLUMNS: &str = "id, owner_id, client_id, goal, diet_type, daily_calories, \
     macro_protein, macro_carbs, macro_fats, meals_per_day, created_at";

/// Inserts the plan and its day records; either all rows land or none do.
pub async fn insert_plan_with_days(
    db: &PgPool,
    owner_id: Uuid,
    plan: &NewMealPlan,
    days: &[GeneratedDay],
) -> anyhow::Result<MealPlan> {
    let int = |field: &str, v: u32| i32::try_from(v).with_context(|| format!("{field} {v} out of range"));
    let daily_calories = int("daily_calories", plan.daily_calories)?;
    let (protein, carbs, fats) = (
        int("protein", plan.macros.protein)?,
        int("carbs", plan.macros.carbs)?,
        int("fats", plan.macros.fats)?,
    );

    let mut tx = db.begin().await.context("begin tx")?;

    let created = sqlx::query_as::<_, MealPlan>(&format!(
        r#"
        INSERT INTO meal_plans
            (owner_id, client_id, goal, diet_type, daily_calories,
             macro_protein, macro_carbs, macro_fats, meals_per_day)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(plan.client_id)
    .bind(&plan.goal)
    .bind(&plan.diet_type)
    .bind(daily_calories)
    .bind(protein)
    .bind(carbs)
    .bind(fats)
    .bind(i32::from(plan.meals_per_day))
    .fetch_one(&mut *tx)
    .await
    .context("insert meal plan")?;

    for day in days {
        insert_day_tx(&mut tx, created.id, day).await?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(created)
}

async fn insert_day_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    day: &GeneratedDay,
) -> anyhow::Result<()> {
    let payload = day
        .meals_json()
        .with_context(|| format!("encode meals for {}", day.day))?;

    sqlx::query(
        r#"
        INSERT INTO meal_plan_days (meal_plan_id, day_number, meals_json)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(plan_id)
    .bind(day.day_number())
    .bind(payload)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("insert day {} of plan {plan_id}", day.day_number()))?;

    Ok(())
}

/// The plan if it exists and belongs to `owner_id`.
pub async fn find_plan(db: &PgPool, owner_id: Uuid, plan_id: Uuid) -> anyhow::Result<Option<MealPlan>> {
    let plan = sqlx::query_as::<_, MealPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1 AND owner_id = $2"
    ))
    .bind(plan_id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
    .context("find meal plan")?;
    Ok(plan)
}

/// Day records in storage order. Normalization does not depend on it.
pub async fn list_days(db: &PgPool, plan_id: Uuid) -> anyhow::Result<Vec<DayHistoryRow>> {
    let rows = sqlx::query_as::<_, DayHistoryRow>(
        r#"
        SELECT id, day_number, meals_json, created_at
          FROM meal_plan_days
         WHERE meal_plan_id = $1
         ORDER BY day_number ASC, created_at ASC
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await
    .context("list plan days")?;
    Ok(rows)
}

pub async fn list_by_owner(
    db: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealPlan>> {
    let rows = sqlx::query_as::<_, MealPlan>(&format!(
        r#"
        SELECT {PLAN_COLUMNS}
          FROM meal_plans
         WHERE owner_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meal plans")?;
    Ok(rows)
}
