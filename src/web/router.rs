use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, header};
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::AppState;
use super::auth;
use super::handlers::{agents, analytics, articles, cron, drafts, pitches, public, settings};

fn public_cors() -> CorsLayer {
    // Articles and the beacon are consumed by third-party pages.
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/articles", get(public::list_articles))
        .route("/api/articles/{slug}", get(public::get_article))
        .route("/api/beacon", post(public::beacon))
        .route("/api/cron/commission", post(cron::commission))
        .layer(public_cors())
        .with_state(state.clone());

    let agent_routes = Router::new()
        .route(
            "/api/agent/pitches",
            get(pitches::list_own).post(pitches::submit),
        )
        .route("/api/agent/pitches/{id}/resubmit", post(pitches::resubmit))
        .route(
            "/api/agent/drafts/{id}",
            get(drafts::get_own).patch(drafts::agent_edit),
        )
        .route(
            "/api/agent/drafts/{id}/submit",
            post(drafts::submit_for_review),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_agent_or_editor,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/admin/agents",
            get(agents::list).post(agents::create),
        )
        .route("/api/admin/agents/{id}", axum::routing::patch(agents::update))
        .route("/api/admin/agents/{id}/commission", post(agents::commission))
        .route("/api/admin/pitches", get(pitches::list_all))
        .route("/api/admin/pitches/{id}/review", post(pitches::move_to_review))
        .route("/api/admin/pitches/{id}/approve", post(pitches::approve))
        .route("/api/admin/pitches/{id}/reject", post(pitches::reject))
        .route(
            "/api/admin/pitches/{id}/request-revision",
            post(pitches::request_revision),
        )
        .route(
            "/api/admin/pitches/{id}/research",
            post(pitches::gather_research),
        )
        .route("/api/admin/drafts", get(drafts::list_all))
        .route(
            "/api/admin/drafts/{id}",
            get(drafts::get).patch(drafts::edit),
        )
        .route("/api/admin/drafts/{id}/review", post(drafts::move_to_review))
        .route("/api/admin/drafts/{id}/approve", post(drafts::approve))
        .route("/api/admin/drafts/{id}/unapprove", post(drafts::unapprove))
        .route(
            "/api/admin/drafts/{id}/request-revision",
            post(drafts::request_revision),
        )
        .route("/api/admin/drafts/{id}/refine", post(drafts::refine))
        .route(
            "/api/admin/drafts/{id}/quality-review",
            post(drafts::quality_review),
        )
        .route("/api/admin/drafts/{id}/publish", post(drafts::publish))
        .route("/api/admin/drafts/{id}/sync", post(drafts::update_published))
        .route("/api/admin/articles", get(articles::list_all))
        .route(
            "/api/admin/articles/{id}",
            get(articles::get).patch(articles::update),
        )
        .route(
            "/api/admin/articles/{id}/seo",
            axum::routing::patch(articles::update_seo),
        )
        .route("/api/admin/articles/{id}/seo/audit", post(articles::audit_seo))
        .route("/api/admin/articles/{id}/upgrade", post(articles::upgrade))
        .route("/api/admin/articles/{id}/related", post(articles::relate))
        .route(
            "/api/admin/articles/{id}/related/{other_id}",
            axum::routing::delete(articles::unrelate),
        )
        .route("/api/admin/analytics", get(analytics::summary))
        .route(
            "/api/admin/settings",
            get(settings::get).patch(settings::update),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_editor,
        ))
        .with_state(state);

    public_routes
        .merge(agent_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(security_headers))
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use tower::util::ServiceExt;

    use crate::newsroom::Newsroom;
    use crate::newsroom::testutil::{ScriptedGenerator, StubFeeds, StubResearcher};
    use crate::store::ContentStore;
    use crate::store::types::Role;

    const PITCH_BATCH: &str = r#"[{"title": "Generated", "standfirst": "s", "angle": "a"}]"#;

    fn test_state() -> AppState {
        let store = ContentStore::open_in_memory().unwrap();
        let newsroom = Newsroom::new(
            store,
            Arc::new(ScriptedGenerator::always(PITCH_BATCH)),
            Arc::new(StubResearcher {
                anchors: 0,
                degraded: false,
            }),
            Arc::new(StubFeeds),
        );
        AppState {
            newsroom,
            cron_secret: Some("s3cret".to_string()),
        }
    }

    fn app(state: &AppState) -> Router {
        build_router(state.clone())
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn public_listing_needs_no_token() {
        let state = test_state();
        let (status, body) = send(app(&state), "GET", "/api/articles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], false);
        assert!(body["articles"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_routes_reject_missing_and_agent_tokens() {
        let state = test_state();
        let (status, _) = send(app(&state), "GET", "/api/admin/agents", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let agent = state
            .newsroom
            .store()
            .create_agent("A", "tennis", "", 3, None)
            .unwrap();
        let (agent_token, _) = state
            .newsroom
            .store()
            .create_api_token("a", Role::Agent, Some(&agent.id))
            .unwrap();
        let (status, _) = send(
            app(&state),
            "GET",
            "/api/admin/agents",
            Some(&agent_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn editor_token_passes_the_admin_gate() {
        let state = test_state();
        let (token, _) = state
            .newsroom
            .store()
            .create_api_token("desk", Role::Editor, None)
            .unwrap();
        let (status, body) = send(app(&state), "GET", "/api/admin/agents", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn agent_token_submits_a_pitch_as_itself() {
        let state = test_state();
        let agent = state
            .newsroom
            .store()
            .create_agent("A", "tennis", "", 3, None)
            .unwrap();
        let (token, _) = state
            .newsroom
            .store()
            .create_api_token("a", Role::Agent, Some(&agent.id))
            .unwrap();

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/agent/pitches",
            Some(&token),
            Some(serde_json::json!({
                "title": "The drop shot returns",
                "standfirst": "s",
                "angle": "a",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["pitch"]["agent_id"], agent.id.as_str());
    }

    #[tokio::test]
    async fn beacon_rejects_unknown_article_ids() {
        let state = test_state();
        let (status, _) = send(
            app(&state),
            "POST",
            "/api/beacon",
            None,
            Some(serde_json::json!({ "article_id": "ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cron_accepts_the_secret_in_header_or_query() {
        let state = test_state();
        let (status, _) = send(app(&state), "POST", "/api/cron/commission", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/cron/commission",
            Some("wrong"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/cron/commission",
            Some("s3cret"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["pitches_created"], 0);

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/cron/commission?key=s3cret",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn cron_commissions_pitches_for_active_agents() {
        let state = test_state();
        let agent = state
            .newsroom
            .store()
            .create_agent("A", "tennis", "", 3, None)
            .unwrap();

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/cron/commission",
            Some("s3cret"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["pitches_created"], 1);

        let pitches = state.newsroom.store().list_pitches(Some(&agent.id)).unwrap();
        assert_eq!(pitches.len(), 1);
        assert_eq!(pitches[0].title, "Generated");
    }

    #[tokio::test]
    async fn security_headers_are_set_on_every_response() {
        let state = test_state();
        let request = Request::builder()
            .uri("/api/articles")
            .body(Body::empty())
            .unwrap();
        let response = app(&state).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn slug_lookup_hides_hidden_articles() {
        let state = test_state();
        let (status, _) = send(app(&state), "GET", "/api/articles/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
