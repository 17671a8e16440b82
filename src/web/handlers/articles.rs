use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::web::AppState;

pub async fn list_all(State(state): State<AppState>) -> Result<Json<Value>> {
    let articles = state.newsroom.store().list_all_articles()?;
    Ok(Json(json!({ "success": true, "articles": articles })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let article = state
        .newsroom
        .store()
        .get_article(&id)?
        .ok_or(Error::NotFound("article"))?;
    let related = state.newsroom.store().related_articles(&id)?;
    Ok(Json(json!({ "success": true, "article": article, "related": related })))
}

#[derive(Deserialize)]
pub struct UpdateArticleRequest {
    pub byline: Option<String>,
    pub image_url: Option<String>,
    pub context_label: Option<String>,
    pub sport: Option<String>,
    pub hidden: Option<bool>,
    pub featured: Option<bool>,
    pub display_order: Option<i64>,
    pub scheduled_at: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<Value>> {
    state.newsroom.store().update_article_fields(
        &id,
        payload.byline.as_deref(),
        payload.image_url.as_deref(),
        payload.context_label.as_deref(),
        payload.sport.as_deref(),
        payload.hidden,
        payload.featured,
        payload.display_order,
        payload.scheduled_at.as_deref(),
    )?;
    let article = state
        .newsroom
        .store()
        .get_article(&id)?
        .ok_or(Error::NotFound("article"))?;
    Ok(Json(json!({ "success": true, "article": article })))
}

#[derive(Deserialize)]
pub struct SeoFieldsRequest {
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub noindex: Option<bool>,
}

pub async fn update_seo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SeoFieldsRequest>,
) -> Result<Json<Value>> {
    state.newsroom.store().update_article_seo_fields(
        &id,
        payload.meta_description.as_deref(),
        payload.canonical_url.as_deref(),
        payload.noindex,
    )?;
    let article = state
        .newsroom
        .store()
        .get_article(&id)?
        .ok_or(Error::NotFound("article"))?;
    Ok(Json(json!({ "success": true, "article": article })))
}

pub async fn audit_seo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let article = state.newsroom.audit_article_seo(&id).await?;
    Ok(Json(json!({
        "success": true,
        "seo_status": article.seo_status,
        "seo_notes": article.seo_notes,
        "article": article,
    })))
}

pub async fn upgrade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let draft = state.newsroom.upgrade_article(&id).await?;
    Ok(Json(json!({ "success": true, "draft": draft })))
}

#[derive(Deserialize)]
pub struct RelateRequest {
    pub other_id: String,
}

pub async fn relate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RelateRequest>,
) -> Result<Json<Value>> {
    for article_id in [&id, &payload.other_id] {
        if state.newsroom.store().get_article(article_id)?.is_none() {
            return Err(Error::NotFound("article"));
        }
    }
    state.newsroom.store().relate_articles(&id, &payload.other_id)?;
    let related = state.newsroom.store().related_articles(&id)?;
    Ok(Json(json!({ "success": true, "related": related })))
}

pub async fn unrelate(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    state.newsroom.store().unrelate_articles(&id, &other_id)?;
    Ok(Json(json!({ "success": true })))
}
