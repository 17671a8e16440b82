use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    Anchor, ResearchCollector, ResearchEnvelope, ResearchQuery, UPSTREAM_TIMEOUT_SECS,
    strip_code_fences,
};

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiTool>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiTool {
    google_search: serde_json::Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResContent,
}

#[derive(Deserialize)]
struct GeminiResContent {
    parts: Vec<GeminiResPart>,
}

#[derive(Deserialize)]
struct GeminiResPart {
    text: String,
}

/// Search-grounded research via the Gemini generateContent API.
pub struct GeminiResearcher {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiResearcher {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    fn build_prompt(query: &ResearchQuery) -> String {
        let mut prompt = format!(
            "You are a sports research assistant. Find concrete, verifiable moments \
             (race decisions, split times, tactical calls, consequences) for a story.\n\
             Story title: {}\nStory angle: {}\n",
            query.title, query.angle
        );
        if let Some(athlete) = &query.athlete {
            prompt.push_str(&format!("Focus athlete: {}\n", athlete));
        }
        if let Some(context) = &query.context {
            prompt.push_str(&format!("Context: {}\n", context));
        }
        prompt.push_str(
            "Respond with ONLY a JSON array of objects, each with keys \"fact\" (string), \
             \"source\" (string or null), \"date\" (string or null). No prose, no markdown.",
        );
        prompt
    }

    async fn try_collect(&self, query: &ResearchQuery) -> anyhow::Result<Vec<Anchor>> {
        let req = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Self::build_prompt(query),
                }],
            }],
            tools: vec![GeminiTool {
                google_search: serde_json::json!({}),
            }],
        };
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let res = self.client.post(&url).json(&req).send().await?;
        if !res.status().is_success() {
            return Err(anyhow::anyhow!(
                "Gemini API Error: {}",
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: GeminiResponse = res.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        let anchors: Vec<Anchor> = serde_json::from_str(strip_code_fences(&text))?;
        Ok(anchors)
    }
}

#[async_trait]
impl ResearchCollector for GeminiResearcher {
    async fn collect(&self, query: &ResearchQuery) -> ResearchEnvelope {
        match self.try_collect(query).await {
            Ok(anchors) => ResearchEnvelope {
                version: ResearchEnvelope::VERSION,
                athlete: query.athlete.clone(),
                anchors,
                degraded: false,
                collected_at: chrono::Utc::now().to_rfc3339(),
            },
            Err(e) => {
                tracing::warn!("research collection failed, using fallback: {}", e);
                ResearchEnvelope::fallback(query)
            }
        }
    }
}
