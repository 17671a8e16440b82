//! Prompt assembly for every generative capability. Each builder returns the
//! message list fed to the text generator; parsing of structured replies
//! lives next to the operation that needs it.

use crate::ai::{ChatMessage, ResearchEnvelope};
use crate::feeds::Headline;
use crate::store::types::{AgentRecord, ArticleRecord, PitchRecord};

const HOUSE_STYLE: &str =
    "You write for an independent sports magazine. Long-form, reported tone. \
     No cliches, no exclamation marks, no invented quotes. Output clean HTML \
     using only <p>, <h2>, <blockquote> and <em> tags.";

fn agent_context(agent: &AgentRecord) -> String {
    let mut ctx = format!(
        "You are writing as the contributor \"{}\". Beat: {}.",
        agent.name, agent.focus
    );
    if !agent.constraints.trim().is_empty() {
        ctx.push_str(&format!(" Writing constraints: {}.", agent.constraints));
    }
    ctx
}

fn research_context(research: &ResearchEnvelope) -> String {
    if research.anchors.is_empty() {
        return String::new();
    }
    let mut ctx = String::from(
        "Ground the piece in these verified moments; weave them in naturally:\n",
    );
    for anchor in &research.anchors {
        ctx.push_str(&format!("- {}", anchor.fact));
        if let Some(source) = &anchor.source {
            ctx.push_str(&format!(" (source: {})", source));
        }
        ctx.push('\n');
    }
    ctx
}

/// Full article body from an approved pitch.
pub fn article_body(
    pitch: &PitchRecord,
    agent: &AgentRecord,
    research: Option<&ResearchEnvelope>,
) -> Vec<ChatMessage> {
    let mut user = format!(
        "Write the full article for this approved pitch.\nTitle: {}\nStandfirst: {}\nAngle: {}\n",
        pitch.title, pitch.standfirst, pitch.angle
    );
    if let Some(why_now) = &pitch.why_now {
        user.push_str(&format!("Why now: {}\n", why_now));
    }
    if let Some(minutes) = pitch.estimated_minutes {
        user.push_str(&format!("Target length: about {} minutes of reading.\n", minutes));
    }
    if let Some(research) = research {
        user.push_str(&research_context(research));
    }
    user.push_str("Return only the HTML body.");

    vec![
        ChatMessage::system(format!("{HOUSE_STYLE} {}", agent_context(agent))),
        ChatMessage::user(user),
    ]
}

/// Revision of an existing draft honoring editor feedback.
pub fn refine(content: &str, feedback: &str, agent: &AgentRecord) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!("{HOUSE_STYLE} {}", agent_context(agent))),
        ChatMessage::user(format!(
            "Revise the draft below according to the editor's feedback. Keep what works. \
             Return only the revised HTML body.\n\nEditor feedback: {}\n\nDraft:\n{}",
            feedback, content
        )),
    ]
}

/// Quality review returning a structured verdict.
pub fn quality_review(title: &str, standfirst: &str, content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are a strict commissioning editor. Judge the draft for accuracy of framing, \
             structure, and house style. Respond with ONLY a JSON object: \
             {\"verdict\": \"ready\"|\"revise\"|\"reject\", \"reasons\": [string], \
             \"required_fixes\": [string]}. required_fixes must be non-empty when the \
             verdict is revise, and empty otherwise.",
        ),
        ChatMessage::user(format!(
            "Title: {}\nStandfirst: {}\n\n{}",
            title, standfirst, content
        )),
    ]
}

/// Post-publication upgrade pass incorporating fresh research anchors.
pub fn upgrade(
    title: &str,
    standfirst: &str,
    content: &str,
    research: &ResearchEnvelope,
) -> Vec<ChatMessage> {
    let mut user = format!(
        "Rework this published article so every claim is anchored in concrete, sourced \
         moments. Preserve the argument and voice.\nTitle: {}\nStandfirst: {}\n",
        title, standfirst
    );
    let research_ctx = research_context(research);
    if research_ctx.is_empty() {
        user.push_str(
            "No verified research anchors are available; tighten the piece without adding \
             new factual claims.\n",
        );
    } else {
        user.push_str(&research_ctx);
    }
    user.push_str(&format!("\nArticle:\n{}\n\nReturn only the revised HTML body.", content));

    vec![ChatMessage::system(HOUSE_STYLE.to_string()), ChatMessage::user(user)]
}

/// Pitch generation from the day's headlines.
pub fn pitch_generation(
    agent: &AgentRecord,
    headlines: &[Headline],
    count: i64,
) -> Vec<ChatMessage> {
    let mut user = format!(
        "Propose {} story pitch(es) matching your beat. Each pitch must argue something, \
         not just report.\n",
        count
    );
    if headlines.is_empty() {
        user.push_str("No fresh headlines are available; pitch from your standing beat.\n");
    } else {
        user.push_str("Today's headlines:\n");
        for h in headlines.iter().take(12) {
            user.push_str(&format!("- {}: {}\n", h.title, h.summary));
        }
    }
    user.push_str(
        "Respond with ONLY a JSON array of objects with keys \"title\", \"standfirst\", \
         \"angle\", \"why_now\" (string or null), \"estimated_minutes\" (number or null).",
    );

    vec![
        ChatMessage::system(format!(
            "You pitch stories for an independent sports magazine. {}",
            agent_context(agent)
        )),
        ChatMessage::user(user),
    ]
}

/// SEO hygiene audit: technical and semantic correctness, not traffic.
pub fn seo_audit(article: &ArticleRecord) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You audit published articles for SEO hygiene: title/standfirst coherence, \
             meta description quality, heading structure, link text, semantic HTML. You do \
             NOT optimize for traffic. Respond with ONLY a JSON object: \
             {\"verdict\": \"pass\"|\"flagged\", \"notes\": [string]}.",
        ),
        ChatMessage::user(format!(
            "Slug: {}\nTitle: {}\nStandfirst: {}\nMeta description: {}\nCanonical URL: {}\n\n{}",
            article.slug,
            article.title,
            article.standfirst,
            article.meta_description.as_deref().unwrap_or("(none)"),
            article.canonical_url.as_deref().unwrap_or("(none)"),
            article.content
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> AgentRecord {
        AgentRecord {
            id: "a1".into(),
            name: "Lena Ortiz".into(),
            focus: "track cycling".into(),
            constraints: "never use first person".into(),
            active: true,
            pitch_limit: 3,
            user_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn agent_constraints_reach_the_system_prompt() {
        let pitch = PitchRecord {
            id: "p1".into(),
            agent_id: "a1".into(),
            title: "t".into(),
            standfirst: "s".into(),
            angle: "a".into(),
            why_now: None,
            context_label: None,
            estimated_minutes: None,
            status: crate::store::types::PitchStatus::Submitted,
            editor_notes: None,
            research_json: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let messages = article_body(&pitch, &agent(), None);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("never use first person"));
        assert!(messages[0].content.contains("track cycling"));
    }

    #[test]
    fn research_anchors_appear_in_the_user_prompt() {
        let research = ResearchEnvelope {
            version: 1,
            athlete: None,
            anchors: vec![crate::ai::Anchor {
                fact: "Attacked with 43 laps left".into(),
                source: Some("race report".into()),
                date: None,
            }],
            degraded: false,
            collected_at: String::new(),
        };
        let messages = upgrade("t", "s", "<p>x</p>", &research);
        assert!(messages[1].content.contains("Attacked with 43 laps left"));
        assert!(messages[1].content.contains("race report"));
    }

    #[test]
    fn empty_research_switches_to_the_no_anchor_instruction() {
        let research = ResearchEnvelope {
            version: 1,
            athlete: None,
            anchors: vec![],
            degraded: true,
            collected_at: String::new(),
        };
        let messages = upgrade("t", "s", "<p>x</p>", &research);
        assert!(messages[1].content.contains("No verified research anchors"));
    }

    #[test]
    fn pitch_prompt_lists_headlines() {
        let headlines = vec![Headline {
            title: "Omnium shake-up".into(),
            summary: "Rules change again".into(),
        }];
        let messages = pitch_generation(&agent(), &headlines, 2);
        assert!(messages[1].content.contains("Omnium shake-up"));
        assert!(messages[1].content.contains("JSON array"));
    }
}
