use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::web::AppState;

pub async fn get(State(state): State<AppState>) -> Result<Json<Value>> {
    let settings = state.newsroom.store().get_settings()?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub cron_enabled: Option<bool>,
    pub max_pitches_per_run: Option<i64>,
}

pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>> {
    if let Some(max) = payload.max_pitches_per_run
        && max < 1
    {
        return Err(Error::Validation(
            "max_pitches_per_run must be at least 1".to_string(),
        ));
    }
    let settings = state
        .newsroom
        .store()
        .update_settings(payload.cron_enabled, payload.max_pitches_per_run)?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}
