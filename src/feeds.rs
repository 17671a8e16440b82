use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use rand::seq::SliceRandom;
use reqwest::Client;

/// One headline pulled from a news feed, used to ground pitch generation.
#[derive(Debug, Clone)]
pub struct Headline {
    pub title: String,
    pub summary: String,
}

#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Best-effort: failures are logged and reported as an empty list.
    async fn headlines_for_focus(&self, focus: &str) -> Vec<Headline>;
}

/// Category-keyed public RSS feeds.
const FEED_CATALOG: &[(&str, &[&str])] = &[
    ("football", &["https://feeds.bbci.co.uk/sport/football/rss.xml"]),
    ("cricket", &["https://feeds.bbci.co.uk/sport/cricket/rss.xml"]),
    ("rugby", &["https://feeds.bbci.co.uk/sport/rugby-union/rss.xml"]),
    ("tennis", &["https://feeds.bbci.co.uk/sport/tennis/rss.xml"]),
    ("golf", &["https://feeds.bbci.co.uk/sport/golf/rss.xml"]),
    ("athletics", &["https://feeds.bbci.co.uk/sport/athletics/rss.xml"]),
    ("cycling", &["https://feeds.bbci.co.uk/sport/cycling/rss.xml"]),
    (
        "formula 1",
        &["https://feeds.bbci.co.uk/sport/formula1/rss.xml"],
    ),
];

const GENERAL_FEED: &str = "https://feeds.bbci.co.uk/sport/rss.xml";

pub struct NewsFeeds {
    client: Client,
}

impl NewsFeeds {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Pick a feed matching the agent's free-text focus, falling back to the
    /// general sport feed when no category keyword matches.
    fn pick_feed(focus: &str) -> &'static str {
        let focus_lower = focus.to_lowercase();
        let mut candidates: Vec<&'static str> = Vec::new();
        for (keyword, urls) in FEED_CATALOG {
            if focus_lower.contains(keyword) {
                candidates.extend_from_slice(urls);
            }
        }
        if candidates.is_empty() {
            return GENERAL_FEED;
        }
        let mut rng = rand::thread_rng();
        candidates.choose(&mut rng).copied().unwrap_or(GENERAL_FEED)
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<Headline>> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_rss(&body)
    }
}

impl Default for NewsFeeds {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeadlineSource for NewsFeeds {
    async fn headlines_for_focus(&self, focus: &str) -> Vec<Headline> {
        let url = Self::pick_feed(focus);
        match self.fetch(url).await {
            Ok(headlines) => headlines,
            Err(e) => {
                tracing::warn!("feed {} failed: {}", url, e);
                Vec::new()
            }
        }
    }
}

/// Pull `<item><title>`/`<description>` pairs out of an RSS document.
pub fn parse_rss(xml: &str) -> anyhow::Result<Vec<Headline>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut headlines = Vec::new();
    let mut in_item = false;
    let mut current_tag: Option<Vec<u8>> = None;
    let mut title = String::new();
    let mut summary = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if name == b"item" {
                    in_item = true;
                    title.clear();
                    summary.clear();
                } else if in_item {
                    current_tag = Some(name);
                }
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    in_item = false;
                    if !title.is_empty() {
                        headlines.push(Headline {
                            title: title.clone(),
                            summary: summary.clone(),
                        });
                    }
                }
                current_tag = None;
            }
            Event::Text(t) if in_item => {
                let text = t.unescape()?.into_owned();
                match current_tag.as_deref() {
                    Some(b"title") => title.push_str(&text),
                    Some(b"description") => summary.push_str(&text),
                    _ => {}
                }
            }
            Event::CData(t) if in_item => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                match current_tag.as_deref() {
                    Some(b"title") => title.push_str(&text),
                    Some(b"description") => summary.push_str(&text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(headlines)
}
