use axum::extract::{Extension, Path, Query, State};
use axum::{Json, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::newsroom::PitchSubmission;
use crate::store::tokens::TokenIdentity;
use crate::store::types::PitchStatus;
use crate::web::AppState;
use crate::web::auth::acting_agent_id;

#[derive(Deserialize)]
pub struct SubmitPitchRequest {
    pub title: String,
    pub standfirst: String,
    pub angle: String,
    pub why_now: Option<String>,
    pub context_label: Option<String>,
    pub estimated_minutes: Option<i64>,
    /// Editor tokens only; agent tokens act as their binding.
    pub agent_id: Option<String>,
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Json(payload): Json<SubmitPitchRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let agent_id = acting_agent_id(&identity, payload.agent_id.as_deref())?;
    let pitch = state.newsroom.submit_pitch(
        &agent_id,
        &PitchSubmission {
            title: payload.title,
            standfirst: payload.standfirst,
            angle: payload.angle,
            why_now: payload.why_now,
            context_label: payload.context_label,
            estimated_minutes: payload.estimated_minutes,
        },
    )?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "pitch": pitch })),
    ))
}

#[derive(Deserialize)]
pub struct AgentScope {
    pub agent_id: Option<String>,
}

pub async fn list_own(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Query(scope): Query<AgentScope>,
) -> Result<Json<Value>> {
    let agent_id = acting_agent_id(&identity, scope.agent_id.as_deref())?;
    let pitches = state.newsroom.store().list_pitches(Some(&agent_id))?;
    Ok(Json(json!({ "success": true, "pitches": pitches })))
}

#[derive(Deserialize)]
pub struct ResubmitRequest {
    pub title: Option<String>,
    pub standfirst: Option<String>,
    pub angle: Option<String>,
    pub why_now: Option<String>,
}

pub async fn resubmit(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<ResubmitRequest>,
) -> Result<Json<Value>> {
    let pitch = state
        .newsroom
        .store()
        .get_pitch(&id)?
        .ok_or(Error::NotFound("pitch"))?;
    // Agents may only touch their own pitches; editors pass through.
    acting_agent_id(&identity, Some(&pitch.agent_id))?;

    let pitch = state.newsroom.resubmit_pitch(
        &id,
        payload.title.as_deref(),
        payload.standfirst.as_deref(),
        payload.angle.as_deref(),
        payload.why_now.as_deref(),
    )?;
    Ok(Json(json!({ "success": true, "pitch": pitch })))
}

// Admin surface.

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub agent_id: Option<String>,
    pub status: Option<String>,
}

pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Value>> {
    let mut pitches = state
        .newsroom
        .store()
        .list_pitches(query.agent_id.as_deref())?;
    if let Some(status) = query.status.as_deref() {
        let status = PitchStatus::parse(status)?;
        pitches.retain(|p| p.status == status);
    }
    Ok(Json(json!({ "success": true, "pitches": pitches })))
}

pub async fn move_to_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let pitch = state.newsroom.move_pitch_to_review(&id)?;
    Ok(Json(json!({ "success": true, "pitch": pitch })))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let outcome = state.newsroom.approve_pitch(&id).await?;
    Ok(Json(json!({
        "success": true,
        "pitch": outcome.pitch,
        "draft": outcome.draft,
        "placeholder_used": outcome.placeholder_used,
        "draft_already_existed": outcome.draft_already_existed,
    })))
}

#[derive(Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<Value>> {
    let pitch = state.newsroom.reject_pitch(&id, payload.notes.as_deref())?;
    Ok(Json(json!({ "success": true, "pitch": pitch })))
}

pub async fn request_revision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<Value>> {
    let notes = payload.notes.as_deref().unwrap_or("");
    let pitch = state.newsroom.request_pitch_revision(&id, notes)?;
    Ok(Json(json!({ "success": true, "pitch": pitch })))
}

pub async fn gather_research(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let envelope = state.newsroom.gather_research(&id).await?;
    Ok(Json(json!({ "success": true, "research": envelope })))
}
