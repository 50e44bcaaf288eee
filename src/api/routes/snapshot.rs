//! Snapshot Route
//!
//! GET /snapshot - the current clock face as a standalone SVG document

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;

pub async fn snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let document = state.snapshot.render_document()?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], document).into_response())
}
