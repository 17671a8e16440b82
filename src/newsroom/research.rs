//! Best-effort extraction of a focus athlete from free text, plus the
//! opportunistic parse of stored research payloads.

use crate::ai::ResearchEnvelope;

/// Generic title lead-ins that look like the start of a name run.
const LEAD_WORDS: &[&str] = &[
    "why", "how", "what", "when", "where", "who", "inside", "behind", "after", "before",
    "beyond", "the", "a", "an", "can", "will", "is", "was",
];

/// Capitalized words that are competition or venue vocabulary, not names.
const NON_NAME_WORDS: &[&str] = &[
    "World", "Worlds", "Olympic", "Olympics", "Games", "Champions", "Championship",
    "Championships", "League", "Premier", "Cup", "Grand", "Prix", "Tour", "Final", "Finals",
    "Series", "Open", "Stadium", "Derby", "Test", "Ashes", "Slam", "Classic", "Masters",
];

fn is_capitalized_word(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase() || c == '-'),
        _ => false,
    }
}

/// Extract the first plausible athlete name: a run of two or more
/// capitalized words, with generic lead-ins and competition vocabulary
/// trimmed away. Inherently best-effort; callers must handle `None`.
pub fn extract_athlete(title: &str) -> Option<String> {
    let tokens: Vec<String> = title
        .split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
                .trim_end_matches("'s")
                .trim_end_matches("\u{2019}s")
                .to_string()
        })
        .collect();

    let mut run: Vec<&str> = Vec::new();
    let mut runs: Vec<Vec<&str>> = Vec::new();
    for token in &tokens {
        if is_capitalized_word(token) {
            run.push(token.as_str());
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }

    for mut candidate in runs {
        while let Some(first) = candidate.first() {
            let lower = first.to_lowercase();
            if LEAD_WORDS.contains(&lower.as_str()) || NON_NAME_WORDS.contains(first) {
                candidate.remove(0);
            } else {
                break;
            }
        }
        while let Some(last) = candidate.last() {
            if NON_NAME_WORDS.contains(last) {
                candidate.pop();
            } else {
                break;
            }
        }
        if candidate.len() >= 2 {
            return Some(candidate.join(" "));
        }
    }
    None
}

/// Parse a stored research payload. Anything unreadable (missing, invalid
/// JSON, wrong shape) is treated as absent research.
pub fn parse_stored_research(raw: Option<&str>) -> Option<ResearchEnvelope> {
    raw.and_then(|s| serde_json::from_str(s).ok())
}
