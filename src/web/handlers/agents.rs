use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::web::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let agents = state.newsroom.store().list_agents(query.active_only)?;
    Ok(Json(json!({ "success": true, "agents": agents })))
}

#[derive(Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub focus: String,
    #[serde(default)]
    pub constraints: String,
    pub pitch_limit: Option<i64>,
    pub user_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if payload.name.trim().is_empty() || payload.focus.trim().is_empty() {
        return Err(Error::Validation("name and focus are required".to_string()));
    }
    let limit = payload.pitch_limit.unwrap_or(3);
    if limit < 1 {
        return Err(Error::Validation("pitch_limit must be at least 1".to_string()));
    }
    let agent = state.newsroom.store().create_agent(
        payload.name.trim(),
        payload.focus.trim(),
        payload.constraints.trim(),
        limit,
        payload.user_id.as_deref(),
    )?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "agent": agent })),
    ))
}

#[derive(Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub focus: Option<String>,
    pub constraints: Option<String>,
    pub pitch_limit: Option<i64>,
    pub active: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAgentRequest>,
) -> Result<Json<Value>> {
    if let Some(limit) = payload.pitch_limit
        && limit < 1
    {
        return Err(Error::Validation("pitch_limit must be at least 1".to_string()));
    }
    let agent = state.newsroom.store().update_agent(
        &id,
        payload.name.as_deref(),
        payload.focus.as_deref(),
        payload.constraints.as_deref(),
        payload.pitch_limit,
        payload.active,
    )?;
    Ok(Json(json!({ "success": true, "agent": agent })))
}

/// On-demand pitch generation for one agent.
pub async fn commission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = state.newsroom.commission_one(&id).await?;
    Ok(Json(json!({ "success": true, "result": result })))
}
