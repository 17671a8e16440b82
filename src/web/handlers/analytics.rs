use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::newsroom::analytics;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub days: Option<i64>,
}

pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>> {
    let summary = analytics::summarize(state.newsroom.store(), query.days.unwrap_or(7))?;
    Ok(Json(json!({ "success": true, "summary": summary })))
}
