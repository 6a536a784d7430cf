//! Plan item database operations
//!
//! Items are always read in visiting order: `sort_order` ascending, then
//! insertion order.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;
use w2p_common::models::{PlanItem, PlanItemWithIdea};
use w2p_common::Result;

use super::ideas::idea_from_row;
use super::parse_uuid;

const ITEM_WITH_IDEA_SELECT: &str = r#"
    SELECT pi.id AS item_id, pi.plan_id, pi.idea_id, pi.sort_order,
           i.id, i.title, i.description, i.url, i.source, i.category, i.status,
           i.image_url, i.place_name, i.place_address, i.lat, i.lng, i.raw_text,
           i.created_at, i.updated_at
    FROM plan_items pi
    JOIN ideas i ON i.id = pi.idea_id
"#;

fn item_from_row(row: &SqliteRow, id_column: &str) -> Result<PlanItem> {
    let id: String = row.try_get(id_column)?;
    let plan_id: String = row.try_get("plan_id")?;
    let idea_id: String = row.try_get("idea_id")?;

    Ok(PlanItem {
        id: parse_uuid(&id)?,
        plan_id: parse_uuid(&plan_id)?,
        idea_id: parse_uuid(&idea_id)?,
        sort_order: row.try_get("sort_order")?,
    })
}

fn item_with_idea_from_row(row: &SqliteRow) -> Result<PlanItemWithIdea> {
    Ok(PlanItemWithIdea {
        item: item_from_row(row, "item_id")?,
        idea: idea_from_row(row)?,
    })
}

/// Items of one plan with their ideas, in visiting order
pub async fn list_items_with_ideas<'e, E>(executor: E, plan_id: Uuid) -> Result<Vec<PlanItemWithIdea>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "{} WHERE pi.plan_id = ? ORDER BY pi.sort_order ASC, pi.rowid ASC",
        ITEM_WITH_IDEA_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(plan_id.to_string())
        .fetch_all(executor)
        .await?;

    rows.iter().map(item_with_idea_from_row).collect()
}

/// Items of every plan, grouped by plan then visiting order
pub async fn list_all_items_with_ideas(pool: &SqlitePool) -> Result<Vec<PlanItemWithIdea>> {
    let sql = format!(
        "{} ORDER BY pi.plan_id, pi.sort_order ASC, pi.rowid ASC",
        ITEM_WITH_IDEA_SELECT
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(item_with_idea_from_row).collect()
}

pub async fn count_items<'e, E>(executor: E, plan_id: Uuid) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM plan_items WHERE plan_id = ?")
        .bind(plan_id.to_string())
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Fails with a unique violation when the idea is already in the plan
pub async fn insert_item<'e, E>(executor: E, item: &PlanItem) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO plan_items (id, plan_id, idea_id, sort_order) VALUES (?, ?, ?, ?)")
        .bind(item.id.to_string())
        .bind(item.plan_id.to_string())
        .bind(item.idea_id.to_string())
        .bind(item.sort_order)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn set_sort_order<'e, E>(executor: E, item_id: Uuid, sort_order: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE plan_items SET sort_order = ? WHERE id = ?")
        .bind(sort_order)
        .bind(item_id.to_string())
        .execute(executor)
        .await?;

    Ok(())
}

/// Remove an item from a plan
///
/// Scoped to the plan: an item id belonging to another plan is not
/// touched. Returns `false` when nothing was removed.
pub async fn delete_item(pool: &SqlitePool, plan_id: Uuid, item_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plan_items WHERE id = ? AND plan_id = ?")
        .bind(item_id.to_string())
        .bind(plan_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
