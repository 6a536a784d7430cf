//! Idea database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;
use w2p_common::models::{Category, Idea, IdeaStatus};
use w2p_common::Result;

use super::{format_timestamp, parse_timestamp, parse_uuid};

pub(crate) const IDEA_COLUMNS: &str = "id, title, description, url, source, category, status, \
     image_url, place_name, place_address, lat, lng, raw_text, created_at, updated_at";

/// Optional filters for listing ideas
#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    pub category: Option<Category>,
    pub status: Option<IdeaStatus>,
    /// Case-insensitive match on title, description or place name
    pub search: Option<String>,
    /// Only ideas with both coordinates
    pub located_only: bool,
}

/// Map a row carrying [`IDEA_COLUMNS`] to an idea
pub(crate) fn idea_from_row(row: &SqliteRow) -> Result<Idea> {
    let id: String = row.try_get("id")?;
    let source: String = row.try_get("source")?;
    let category: String = row.try_get("category")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Idea {
        id: parse_uuid(&id)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        url: row.try_get("url")?,
        source: source.parse()?,
        category: category.parse()?,
        status: status.parse()?,
        image_url: row.try_get("image_url")?,
        place_name: row.try_get("place_name")?,
        place_address: row.try_get("place_address")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        raw_text: row.try_get("raw_text")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub async fn insert_idea<'e, E>(executor: E, idea: &Idea) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO ideas (
            id, title, description, url, source, category, status, image_url,
            place_name, place_address, lat, lng, raw_text, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(idea.id.to_string())
    .bind(&idea.title)
    .bind(&idea.description)
    .bind(&idea.url)
    .bind(idea.source.as_str())
    .bind(idea.category.as_str())
    .bind(idea.status.as_str())
    .bind(&idea.image_url)
    .bind(&idea.place_name)
    .bind(&idea.place_address)
    .bind(idea.lat)
    .bind(idea.lng)
    .bind(&idea.raw_text)
    .bind(format_timestamp(&idea.created_at))
    .bind(format_timestamp(&idea.updated_at))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_idea<'e, E>(executor: E, id: Uuid) -> Result<Option<Idea>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM ideas WHERE id = ?", IDEA_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(idea_from_row).transpose()
}

/// List ideas, newest first
pub async fn list_ideas(pool: &SqlitePool, filter: &IdeaFilter) -> Result<Vec<Idea>> {
    let mut builder =
        QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM ideas WHERE 1 = 1", IDEA_COLUMNS));

    if let Some(category) = filter.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR place_name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if filter.located_only {
        builder.push(" AND lat IS NOT NULL AND lng IS NOT NULL");
    }

    builder.push(" ORDER BY created_at DESC, rowid DESC");

    let rows = builder.build().fetch_all(pool).await?;
    let ideas = rows.iter().map(idea_from_row).collect::<Result<Vec<_>>>()?;

    if filter.located_only {
        Ok(ideas.into_iter().filter(|idea| idea.coordinate().is_some()).collect())
    } else {
        Ok(ideas)
    }
}

/// Overwrite every mutable column of an idea
pub async fn update_idea<'e, E>(executor: E, idea: &Idea) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE ideas SET
            title = ?, description = ?, url = ?, source = ?, category = ?, status = ?,
            image_url = ?, place_name = ?, place_address = ?, lat = ?, lng = ?,
            raw_text = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&idea.title)
    .bind(&idea.description)
    .bind(&idea.url)
    .bind(idea.source.as_str())
    .bind(idea.category.as_str())
    .bind(idea.status.as_str())
    .bind(&idea.image_url)
    .bind(&idea.place_name)
    .bind(&idea.place_address)
    .bind(idea.lat)
    .bind(idea.lng)
    .bind(&idea.raw_text)
    .bind(format_timestamp(&idea.updated_at))
    .bind(idea.id.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_idea_status<'e, E>(executor: E, id: Uuid, status: IdeaStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE ideas SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(format_timestamp(&super::now()))
        .bind(id.to_string())
        .execute(executor)
        .await?;

    Ok(())
}

/// Delete an idea; plan items referencing it cascade
///
/// Returns `false` when no idea had that id.
pub async fn delete_idea(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM ideas WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
