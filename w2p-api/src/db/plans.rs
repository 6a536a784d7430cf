//! Plan database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;
use w2p_common::models::{Plan, PlanDetail, PlanItemWithIdea};
use w2p_common::Result;

use super::plan_items::{list_all_items_with_ideas, list_items_with_ideas};
use super::{format_timestamp, parse_timestamp, parse_uuid};

const PLAN_COLUMNS: &str = "id, title, scheduled_for, notes, created_at, updated_at";

fn plan_from_row(row: &SqliteRow) -> Result<Plan> {
    let id: String = row.try_get("id")?;
    let scheduled_for: String = row.try_get("scheduled_for")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Plan {
        id: parse_uuid(&id)?,
        title: row.try_get("title")?,
        scheduled_for: parse_timestamp(&scheduled_for)?,
        notes: row.try_get("notes")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub async fn insert_plan<'e, E>(executor: E, plan: &Plan) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO plans (id, title, scheduled_for, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(plan.id.to_string())
    .bind(&plan.title)
    .bind(format_timestamp(&plan.scheduled_for))
    .bind(&plan.notes)
    .bind(format_timestamp(&plan.created_at))
    .bind(format_timestamp(&plan.updated_at))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_plan<'e, E>(executor: E, id: Uuid) -> Result<Option<Plan>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM plans WHERE id = ?", PLAN_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(plan_from_row).transpose()
}

/// All plans, soonest first
pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<Plan>> {
    let sql = format!(
        "SELECT {} FROM plans ORDER BY scheduled_for ASC, rowid ASC",
        PLAN_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(plan_from_row).collect()
}

pub async fn update_plan<'e, E>(executor: E, plan: &Plan) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE plans SET title = ?, scheduled_for = ?, notes = ?, updated_at = ? WHERE id = ?")
        .bind(&plan.title)
        .bind(format_timestamp(&plan.scheduled_for))
        .bind(&plan.notes)
        .bind(format_timestamp(&plan.updated_at))
        .bind(plan.id.to_string())
        .execute(executor)
        .await?;

    Ok(())
}

/// Delete a plan and (by cascade) its items
pub async fn delete_plan(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Plan with its items in visiting order
pub async fn load_plan_detail(pool: &SqlitePool, id: Uuid) -> Result<Option<PlanDetail>> {
    let Some(plan) = get_plan(pool, id).await? else {
        return Ok(None);
    };

    let items = list_items_with_ideas(pool, id).await?;
    Ok(Some(PlanDetail { plan, items }))
}

/// Every plan with its items, soonest first
pub async fn list_plan_details(pool: &SqlitePool) -> Result<Vec<PlanDetail>> {
    let plans = list_plans(pool).await?;

    let mut items_by_plan: HashMap<Uuid, Vec<PlanItemWithIdea>> = HashMap::new();
    for entry in list_all_items_with_ideas(pool).await? {
        items_by_plan.entry(entry.item.plan_id).or_default().push(entry);
    }

    Ok(plans
        .into_iter()
        .map(|plan| {
            let items = items_by_plan.remove(&plan.id).unwrap_or_default();
            PlanDetail { plan, items }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ideas::insert_idea;
    use crate::db::plan_items::{count_items, delete_item, insert_item};
    use crate::db::now;
    use chrono::{Duration, TimeZone, Utc};
    use w2p_common::db::init_memory_database;
    use w2p_common::models::{Category, Idea, IdeaStatus, PlanItem, Source};

    fn plan(title: &str, days_ahead: i64) -> Plan {
        let ts = now();
        Plan {
            id: Uuid::new_v4(),
            title: title.to_string(),
            scheduled_for: Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap()
                + Duration::days(days_ahead),
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn idea(title: &str) -> Idea {
        let ts = now();
        Idea {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            url: None,
            source: Source::Text,
            category: Category::Date,
            status: IdeaStatus::Saved,
            image_url: None,
            place_name: None,
            place_address: None,
            lat: None,
            lng: None,
            raw_text: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn item(plan: &Plan, idea: &Idea, sort_order: i64) -> PlanItem {
        PlanItem {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            idea_id: idea.id,
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_plans_listed_soonest_first_with_items() {
        let pool = init_memory_database().await.unwrap();
        let later = plan("Anniversary", 10);
        let sooner = plan("Friday", 2);
        insert_plan(&pool, &later).await.unwrap();
        insert_plan(&pool, &sooner).await.unwrap();

        let dinner = idea("Dinner");
        let walk = idea("Walk");
        insert_idea(&pool, &dinner).await.unwrap();
        insert_idea(&pool, &walk).await.unwrap();
        insert_item(&pool, &item(&sooner, &walk, 1)).await.unwrap();
        insert_item(&pool, &item(&sooner, &dinner, 0)).await.unwrap();

        let details = list_plan_details(&pool).await.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].plan.id, sooner.id);
        assert_eq!(details[1].plan.id, later.id);
        assert!(details[1].items.is_empty());

        let titles: Vec<_> = details[0].items.iter().map(|i| i.idea.title.as_str()).collect();
        assert_eq!(titles, vec!["Dinner", "Walk"]);
    }

    #[tokio::test]
    async fn test_item_count_and_scoped_delete() {
        let pool = init_memory_database().await.unwrap();
        let first = plan("First", 1);
        let second = plan("Second", 2);
        insert_plan(&pool, &first).await.unwrap();
        insert_plan(&pool, &second).await.unwrap();
        let picnic = idea("Picnic");
        insert_idea(&pool, &picnic).await.unwrap();

        let entry = item(&first, &picnic, 0);
        insert_item(&pool, &entry).await.unwrap();

        assert_eq!(count_items(&pool, first.id).await.unwrap(), 1);
        assert_eq!(count_items(&pool, second.id).await.unwrap(), 0);

        // Same idea twice in one plan hits the UNIQUE constraint
        let err = insert_item(&pool, &item(&first, &picnic, 1)).await.unwrap_err();
        assert!(err.is_unique_violation());
        // Other plans may still hold it
        insert_item(&pool, &item(&second, &picnic, 0)).await.unwrap();
        assert_eq!(count_items(&pool, second.id).await.unwrap(), 1);

        // Wrong plan leaves the item alone
        assert!(!delete_item(&pool, second.id, entry.id).await.unwrap());
        assert!(delete_item(&pool, first.id, entry.id).await.unwrap());
        assert_eq!(count_items(&pool, first.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_plan_cascades_items() {
        let pool = init_memory_database().await.unwrap();
        let date = plan("Date", 1);
        insert_plan(&pool, &date).await.unwrap();
        let bowling = idea("Bowling");
        insert_idea(&pool, &bowling).await.unwrap();
        insert_item(&pool, &item(&date, &bowling, 0)).await.unwrap();

        assert!(delete_plan(&pool, date.id).await.unwrap());
        assert!(load_plan_detail(&pool, date.id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plan_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_update_plan() {
        let pool = init_memory_database().await.unwrap();
        let mut date = plan("Date", 1);
        insert_plan(&pool, &date).await.unwrap();

        date.title = "Date night".to_string();
        date.notes = Some("Book a table".to_string());
        update_plan(&pool, &date).await.unwrap();

        assert_eq!(get_plan(&pool, date.id).await.unwrap(), Some(date));
    }
}
