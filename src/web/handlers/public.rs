use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::store::types::ArticleRecord;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub sport: Option<String>,
}

fn public_json(article: &ArticleRecord) -> Value {
    json!({
        "id": article.id,
        "slug": article.slug,
        "title": article.title,
        "standfirst": article.standfirst,
        "content": article.content,
        "context_label": article.context_label,
        "byline": article.byline,
        "image_url": article.image_url,
        "reading_minutes": article.reading_minutes,
        "featured": article.featured,
        "sport": article.sport,
        "published_at": article.published_at,
        "meta_description": article.meta_description,
        "canonical_url": article.canonical_url,
        "noindex": article.noindex,
    })
}

/// Public listing. A storage failure degrades to an empty list with an
/// explicit marker so the page can show a warning instead of a false blank.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    match state
        .newsroom
        .store()
        .list_public_articles(query.sport.as_deref())
    {
        Ok(articles) => {
            let articles: Vec<Value> = articles.iter().map(public_json).collect();
            Json(json!({ "success": true, "degraded": false, "articles": articles }))
        }
        Err(e) => {
            tracing::warn!("public listing degraded: {}", e);
            Json(json!({ "success": true, "degraded": true, "articles": [] }))
        }
    }
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let article = state
        .newsroom
        .store()
        .get_article_by_slug(&slug)?
        .filter(|a| !a.hidden)
        .ok_or(Error::NotFound("article"))?;
    let related: Vec<Value> = state
        .newsroom
        .store()
        .related_articles(&article.id)?
        .iter()
        .map(public_json)
        .collect();
    Ok(Json(json!({
        "success": true,
        "article": public_json(&article),
        "related": related,
    })))
}

#[derive(Deserialize)]
pub struct BeaconPayload {
    pub article_id: String,
    pub session_id: Option<String>,
    pub duration_secs: Option<i64>,
    pub referrer: Option<String>,
}

/// Unauthenticated page-view ingestion. The only validation is that the
/// article exists; unknown ids are a 404 and write nothing.
pub async fn beacon(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BeaconPayload>,
) -> Result<Json<Value>> {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok());
    state.newsroom.store().insert_page_view(
        &payload.article_id,
        payload.session_id.as_deref(),
        payload.duration_secs,
        user_agent,
        payload.referrer.as_deref(),
    )?;
    Ok(Json(json!({ "success": true })))
}
