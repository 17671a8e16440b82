//! Read-side aggregation of the page-view event log. Events are bucketed in
//! memory; the store only does the time-range cut.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::store::ContentStore;

#[derive(Debug, Clone, Serialize)]
pub struct DailyBucket {
    /// Calendar day in UTC, `YYYY-MM-DD`.
    pub day: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopArticle {
    pub article_id: String,
    pub title: String,
    pub slug: String,
    pub views: i64,
    pub avg_duration_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub unique_sessions: i64,
    /// Mean over events that reported a nonzero duration.
    pub avg_duration_secs: i64,
    /// One bucket per calendar day in the window, zero-filled, oldest first.
    pub daily: Vec<DailyBucket>,
    /// Most-viewed articles in the window, at most ten.
    pub top_articles: Vec<TopArticle>,
}

/// Summarize the last `days` days of page views. An empty window yields a
/// zeroed summary with exactly `days` empty day buckets, not an error.
pub fn summarize(store: &ContentStore, days: i64) -> Result<AnalyticsSummary> {
    let days = days.clamp(1, 365);
    let now = Utc::now();
    let since = now - Duration::days(days);
    let views = store.page_views_since(since)?;

    let mut per_day: HashMap<String, i64> = HashMap::new();
    let mut sessions: HashSet<&str> = HashSet::new();
    let mut duration_sum: i64 = 0;
    let mut duration_count: i64 = 0;
    let mut per_article: HashMap<&str, (i64, i64, i64)> = HashMap::new();

    for view in &views {
        *per_day
            .entry(view.created_at.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
        if let Some(session) = view.session_id.as_deref() {
            sessions.insert(session);
        }
        let entry = per_article.entry(view.article_id.as_str()).or_insert((0, 0, 0));
        entry.0 += 1;
        if let Some(secs) = view.duration_secs.filter(|&d| d > 0) {
            duration_sum += secs;
            duration_count += 1;
            entry.1 += secs;
            entry.2 += 1;
        }
    }

    let mut daily = Vec::with_capacity(days as usize);
    for offset in (0..days).rev() {
        let day = (now - Duration::days(offset)).format("%Y-%m-%d").to_string();
        let views = per_day.get(&day).copied().unwrap_or(0);
        daily.push(DailyBucket { day, views });
    }

    let mut ranked: Vec<(&str, i64, i64)> = per_article
        .into_iter()
        .map(|(id, (views, dur_sum, dur_count))| {
            (id, views, if dur_count > 0 { dur_sum / dur_count } else { 0 })
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut top_articles = Vec::new();
    for (article_id, views, avg_duration_secs) in ranked.into_iter().take(10) {
        // Deleted rows cannot occur (views reference articles), but a racing
        // lookup miss just drops the entry from the ranking.
        if let Some(article) = store.get_article(article_id)? {
            top_articles.push(TopArticle {
                article_id: article.id,
                title: article.title,
                slug: article.slug,
                views,
                avg_duration_secs,
            });
        }
    }

    Ok(AnalyticsSummary {
        total_views: views.len() as i64,
        unique_sessions: sessions.len() as i64,
        avg_duration_secs: if duration_count > 0 {
            duration_sum / duration_count
        } else {
            0
        },
        daily,
        top_articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::articles::NewArticle;
    use crate::store::drafts::DraftCreation;
    use crate::store::pitches::NewPitch;

    fn store_with_articles(n: usize) -> (ContentStore, Vec<String>) {
        let store = ContentStore::open_in_memory().unwrap();
        let agent = store.create_agent("A", "golf", "", 50, None).unwrap();
        let mut ids = Vec::new();
        for i in 0..n {
            let pitch = store
                .insert_pitch(&NewPitch {
                    agent_id: &agent.id,
                    title: "t",
                    standfirst: "s",
                    angle: "a",
                    why_now: None,
                    context_label: None,
                    estimated_minutes: None,
                })
                .unwrap();
            let draft = match store.create_draft_approving_pitch(&pitch.id, "x").unwrap() {
                DraftCreation::Created(d) => d,
                _ => unreachable!(),
            };
            let slug = format!("article-{i}");
            let article = store
                .publish_article(&NewArticle {
                    draft_id: &draft.id,
                    slug: &slug,
                    title: "t",
                    standfirst: "s",
                    content: "x",
                    context_label: None,
                    byline: None,
                    reading_minutes: None,
                    featured: false,
                    sport: None,
                })
                .unwrap();
            ids.push(article.id);
        }
        (store, ids)
    }

    #[test]
    fn empty_window_is_zeroed_with_one_bucket_per_day() {
        let (store, _) = store_with_articles(0);
        let summary = summarize(&store, 7).unwrap();
        assert_eq!(summary.total_views, 0);
        assert_eq!(summary.unique_sessions, 0);
        assert_eq!(summary.avg_duration_secs, 0);
        assert_eq!(summary.daily.len(), 7);
        assert!(summary.daily.iter().all(|b| b.views == 0));
        assert!(summary.top_articles.is_empty());

        assert_eq!(summarize(&store, 1).unwrap().daily.len(), 1);
        assert_eq!(summarize(&store, 30).unwrap().daily.len(), 30);
    }

    #[test]
    fn sessions_dedupe_and_zero_durations_stay_out_of_the_average() {
        let (store, ids) = store_with_articles(1);
        store.insert_page_view(&ids[0], Some("s1"), Some(30), None, None).unwrap();
        store.insert_page_view(&ids[0], Some("s1"), Some(90), None, None).unwrap();
        store.insert_page_view(&ids[0], Some("s2"), Some(0), None, None).unwrap();
        store.insert_page_view(&ids[0], None, None, None, None).unwrap();

        let summary = summarize(&store, 7).unwrap();
        assert_eq!(summary.total_views, 4);
        assert_eq!(summary.unique_sessions, 2);
        assert_eq!(summary.avg_duration_secs, 60);
        assert_eq!(summary.daily.last().unwrap().views, 4);
    }

    #[test]
    fn top_articles_rank_by_views_and_cap_at_ten() {
        let (store, ids) = store_with_articles(12);
        for (i, id) in ids.iter().enumerate() {
            // Article i gets i+1 views.
            for _ in 0..=i {
                store.insert_page_view(id, None, Some(20), None, None).unwrap();
            }
        }

        let summary = summarize(&store, 7).unwrap();
        assert_eq!(summary.top_articles.len(), 10);
        assert_eq!(summary.top_articles[0].article_id, ids[11]);
        assert_eq!(summary.top_articles[0].views, 12);
        assert!(
            summary
                .top_articles
                .windows(2)
                .all(|w| w[0].views >= w[1].views)
        );
        assert_eq!(summary.top_articles[0].avg_duration_secs, 20);
    }
}
