use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{new_record, strip_system_fields, ListQuery, RecordStore, StoreError};
use crate::types::{record_id, Record};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS admin_records (
    seq BIGSERIAL,
    resource TEXT NOT NULL,
    id UUID NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (resource, id)
)"#;

// Scalar top-level values only, matching `matches_search` in the memory store.
const SEARCH_CLAUSE: &str = "($2::text IS NULL OR EXISTS (\
    SELECT 1 FROM jsonb_each(data) AS field \
    WHERE jsonb_typeof(field.value) IN ('string', 'number', 'boolean') \
    AND (field.value #>> '{}') ILIKE '%' || $2 || '%' ESCAPE '\\'))";

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Resource records as JSONB rows in a single table.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn parse_id(resource: &str, id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::not_found(resource, id))
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list(&self, resource: &str, query: &ListQuery) -> Result<(Vec<Record>, u64), StoreError> {
        let search = query.search.as_deref().filter(|s| !s.is_empty()).map(escape_like);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM admin_records WHERE resource = $1 AND {}",
            SEARCH_CLAUSE
        ))
        .bind(resource)
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<Json<Record>> = sqlx::query_scalar(&format!(
            "SELECT data FROM admin_records WHERE resource = $1 AND {} ORDER BY seq LIMIT $3 OFFSET $4",
            SEARCH_CLAUSE
        ))
        .bind(resource)
        .bind(search.as_deref())
        .bind(query.limit as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|Json(r)| r).collect(), total.max(0) as u64))
    }

    async fn get(&self, resource: &str, id: &str) -> Result<Record, StoreError> {
        let uuid = parse_id(resource, id)?;
        let row: Option<Json<Record>> =
            sqlx::query_scalar("SELECT data FROM admin_records WHERE resource = $1 AND id = $2")
                .bind(resource)
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|Json(r)| r).ok_or_else(|| StoreError::not_found(resource, id))
    }

    async fn insert(&self, resource: &str, data: Record) -> Result<Record, StoreError> {
        let record = new_record(data);
        let id = record_id(&record)
            .and_then(|id| Uuid::parse_str(&id).ok())
            .ok_or_else(|| StoreError::Corrupt("generated id is not a uuid".into()))?;

        let Json(stored): Json<Record> = sqlx::query_scalar(
            "INSERT INTO admin_records (resource, id, data) VALUES ($1, $2, $3) RETURNING data",
        )
        .bind(resource)
        .bind(id)
        .bind(Json(&record))
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn update(&self, resource: &str, id: &str, patch: Record) -> Result<Record, StoreError> {
        let uuid = parse_id(resource, id)?;
        let mut patch = strip_system_fields(patch);
        patch.insert("updated_at".into(), chrono::Utc::now().to_rfc3339().into());

        let row: Option<Json<Record>> = sqlx::query_scalar(
            "UPDATE admin_records SET data = data || $3, updated_at = now() \
             WHERE resource = $1 AND id = $2 RETURNING data",
        )
        .bind(resource)
        .bind(uuid)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;
        row.map(|Json(r)| r).ok_or_else(|| StoreError::not_found(resource, id))
    }

    async fn delete(&self, resource: &str, id: &str) -> Result<Record, StoreError> {
        let uuid = parse_id(resource, id)?;
        let row: Option<Json<Record>> =
            sqlx::query_scalar("DELETE FROM admin_records WHERE resource = $1 AND id = $2 RETURNING data")
                .bind(resource)
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|Json(r)| r).ok_or_else(|| StoreError::not_found(resource, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("intro_to"), "intro\\_to");
        assert_eq!(escape_like(r"C:\path"), r"C:\\path");
        assert_eq!(escape_like("plain"), "plain");
    }
}
