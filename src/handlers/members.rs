use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, Query, State,
    },
    http::HeaderMap,
};
use serde::Serialize;

use crate::app::AppState;
use crate::database::record::MemberRecord;
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult};
use crate::roster::params::parse_event;
use crate::roster::{ListParams, ListQuery, MutationBatch};

/// Body of a successful list call
#[derive(Debug, Serialize)]
pub struct MemberPage {
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub rows: Vec<MemberRecord>,
}

/// GET /api/members/:event - one page of an event's roster
pub async fn get(
    State(state): State<AppState>,
    event: Result<Path<String>, PathRejection>,
    query: Option<Query<Vec<(String, String)>>>,
) -> ApiResult<MemberPage> {
    let Path(event) = event?;
    let event_slug = parse_event(&event)?;
    // An undecodable query string is treated like an empty one
    let query = query
        .map(|Query(pairs)| ListQuery::from_pairs(pairs))
        .unwrap_or_default();
    let params = ListParams::from_query(&query);

    let page = state.planner.list(&event_slug, &params).await?;

    Ok(ApiResponse::success(MemberPage {
        page: params.page,
        size: params.size,
        total: page.total,
        rows: page.rows,
    }))
}

/// POST /api/members/:event - upsert and/or delete rows, edit key required
pub async fn post(
    State(state): State<AppState>,
    event: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<()> {
    let Path(event) = event?;
    let event_slug = parse_event(&event)?;
    authorize(&headers, state.edit_key.as_ref())?;

    let batch = MutationBatch::from_body(&body?)?;
    state.planner.apply(&event_slug, batch).await?;

    Ok(ApiResponse::ok())
}

/// GET or POST on the collection path without an event
pub async fn missing_event() -> ApiError {
    ApiError::bad_request("event required")
}

/// Any other verb on the members resource
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
