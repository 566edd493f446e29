// Collection-level operations: GET/POST /api/data/:resource

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{authorize, into_record};
use crate::database::ListQuery;
use crate::error::ApiResult;
use crate::rbac::Session;
use crate::renderer::validate_form;
use crate::server::AppState;
use crate::types::{ListResult, Record};

const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct ListParamsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListParamsQuery {
    /// Page is 1-based; limit is clamped to `1..=max_limit`.
    pub fn into_query(self, max_limit: u32) -> ListQuery {
        ListQuery {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, max_limit.max(1)),
            search: self.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// GET /api/data/:resource - one page of records as `{data, total, page, limit}`
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<String>,
    Query(params): Query<ListParamsQuery>,
) -> ApiResult<Json<ListResult<Record>>> {
    let descriptor = authorize(&state, &session, &resource)?;
    let query = params.into_query(state.max_page_size);

    let (data, total) = state.store.list(&descriptor.name, &query).await?;
    Ok(Json(ListResult {
        data,
        total,
        page: query.page,
        limit: query.limit,
    }))
}

/// POST /api/data/:resource - create a record from the declared form fields
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let descriptor = authorize(&state, &session, &resource)?;
    let data = validate_form(&descriptor.form_fields, &into_record(body)?)?;

    let record = state.store.insert(&descriptor.name, data).await?;
    tracing::info!(resource = %descriptor.name, by = %session.email, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_are_clamped() {
        let query = ListParamsQuery {
            page: Some(0),
            limit: Some(5000),
            search: Some("  ".into()),
        }
        .into_query(100);
        assert_eq!(query, ListQuery { page: 1, limit: 100, search: None });

        let query = ListParamsQuery::default().into_query(100);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }
}
