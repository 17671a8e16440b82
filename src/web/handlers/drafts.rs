use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::newsroom::PublishRequest;
use crate::store::tokens::TokenIdentity;
use crate::store::types::{DraftRecord, DraftStatus, Role};
use crate::web::AppState;
use crate::web::auth::acting_agent_id;

fn load_draft(state: &AppState, id: &str) -> Result<DraftRecord> {
    state
        .newsroom
        .store()
        .get_draft(id)?
        .ok_or(Error::NotFound("draft"))
}

/// Agents only reach their own drafts; editors reach all of them.
fn ensure_draft_access(
    state: &AppState,
    identity: &TokenIdentity,
    draft: &DraftRecord,
) -> Result<()> {
    if identity.role == Role::Editor {
        return Ok(());
    }
    let pitch = state
        .newsroom
        .store()
        .get_pitch(&draft.pitch_id)?
        .ok_or(Error::NotFound("pitch"))?;
    acting_agent_id(identity, Some(&pitch.agent_id))?;
    Ok(())
}

// Agent surface.

pub async fn get_own(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = load_draft(&state, &id)?;
    ensure_draft_access(&state, &identity, &draft)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

#[derive(Deserialize)]
pub struct DraftEdit {
    pub title: Option<String>,
    pub standfirst: Option<String>,
    pub content: Option<String>,
}

pub async fn agent_edit(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<DraftEdit>,
) -> Result<Json<Value>> {
    let draft = load_draft(&state, &id)?;
    ensure_draft_access(&state, &identity, &draft)?;

    let draft = if identity.role == Role::Editor {
        state.newsroom.update_draft(
            &id,
            payload.title.as_deref(),
            payload.standfirst.as_deref(),
            payload.content.as_deref(),
        )?
    } else {
        let pitch = state
            .newsroom
            .store()
            .get_pitch(&draft.pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        state.newsroom.agent_update_draft(
            &pitch.agent_id,
            &id,
            payload.title.as_deref(),
            payload.standfirst.as_deref(),
            payload.content.as_deref(),
        )?
    };
    Ok(Json(json!({ "success": true, "draft": draft })))
}

pub async fn submit_for_review(
    State(state): State<AppState>,
    Extension(identity): Extension<TokenIdentity>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = load_draft(&state, &id)?;
    ensure_draft_access(&state, &identity, &draft)?;
    let draft = state.newsroom.submit_draft_for_review(&id)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

// Admin surface.

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
}

pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Value>> {
    let status = match query.status.as_deref() {
        Some(s) => Some(DraftStatus::parse(s)?),
        None => None,
    };
    let drafts = state.newsroom.store().list_drafts(status)?;
    Ok(Json(json!({ "success": true, "drafts": drafts })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let draft = load_draft(&state, &id)?;
    let article = state.newsroom.store().get_article_by_draft(&id)?;
    Ok(Json(json!({ "success": true, "draft": draft, "article": article })))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DraftEdit>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.update_draft(
        &id,
        payload.title.as_deref(),
        payload.standfirst.as_deref(),
        payload.content.as_deref(),
    )?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

pub async fn move_to_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.move_draft_to_review(&id)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.approve_draft(&id)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

pub async fn unapprove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.unapprove_draft(&id)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

#[derive(Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

pub async fn request_revision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<Value>> {
    let notes = payload.notes.as_deref().unwrap_or("");
    let draft = state.newsroom.request_draft_revision(&id, notes)?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

#[derive(Deserialize)]
pub struct RefineRequest {
    pub feedback: String,
}

pub async fn refine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RefineRequest>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.refine_draft(&id, &payload.feedback).await?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

pub async fn quality_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let review = state.newsroom.review_draft(&id).await?;
    Ok(Json(json!({ "success": true, "review": review })))
}

#[derive(Deserialize)]
pub struct PublishPayload {
    pub slug: String,
    pub title: Option<String>,
    pub standfirst: Option<String>,
    pub byline: Option<String>,
    pub sport: Option<String>,
    pub reading_minutes: Option<i64>,
    #[serde(default)]
    pub featured: bool,
}

pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PublishPayload>,
) -> Result<Json<Value>> {
    let article = state.newsroom.publish_draft(
        &id,
        &PublishRequest {
            slug: payload.slug,
            title: payload.title,
            standfirst: payload.standfirst,
            byline: payload.byline,
            sport: payload.sport,
            reading_minutes: payload.reading_minutes,
            featured: payload.featured,
        },
    )?;
    Ok(Json(json!({ "success": true, "article": article })))
}

pub async fn update_published(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let article = state.newsroom.update_published(&id)?;
    Ok(Json(json!({ "success": true, "article": article })))
}
