use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::web::AppState;

#[derive(Deserialize)]
pub struct CronQuery {
    pub key: Option<String>,
}

fn check_secret(state: &AppState, headers: &HeaderMap, query: &CronQuery) -> Result<()> {
    let secret = state.cron_secret.as_deref().ok_or_else(|| {
        Error::Unauthorized("cron endpoint disabled: no PRESSBOX_CRON_SECRET".to_string())
    })?;

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));
    if bearer == Some(secret) || query.key.as_deref() == Some(secret) {
        return Ok(());
    }
    Err(Error::Unauthorized("invalid cron secret".to_string()))
}

/// Scheduler-triggered pitch generation across all active agents. The
/// scheduler authenticates with the shared secret, in the Authorization
/// header or as `?key=` for callers that cannot set headers.
pub async fn commission(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    check_secret(&state, &headers, &query)?;
    let outcome = state.newsroom.run_commission().await?;
    Ok(Json(json!({ "success": true, "outcome": outcome })))
}
