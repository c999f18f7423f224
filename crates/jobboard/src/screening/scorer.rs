use serde::{Deserialize, Serialize};

pub const LOW_KEYWORD_WARNING: &str = "Resume does not contain many relevant keywords.";
pub const EMPTY_RESUME_WARNING: &str = "Resume content is empty or unreadable.";

/// Scores below this threshold carry [`LOW_KEYWORD_WARNING`].
pub const LOW_SCORE_THRESHOLD: u8 = 50;

/// ATS score for a single resume against a job's keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub warnings: Vec<String>,
}

/// Count keywords whose lowercase form occurs in `text`. Each keyword in the list counts once.
pub fn matched_keywords<K: AsRef<str>>(text: &str, keywords: &[K]) -> usize {
    keywords
        .iter()
        .filter(|keyword| text.contains(&keyword.as_ref().to_lowercase()))
        .count()
}

/// Percentage of keywords found in `text`, truncated toward zero, plus quality warnings.
///
/// `text` is expected to be lowercase already (see [`super::extract`]).
pub fn score<K: AsRef<str>>(text: &str, keywords: &[K]) -> ScoreResult {
    let total = keywords.len();
    let score = if total == 0 {
        0
    } else {
        let matched = matched_keywords(text, keywords);
        // matched <= total, so the quotient never exceeds 100
        u8::try_from(matched * 100 / total).unwrap_or(100)
    };

    let mut warnings = Vec::new();
    if score < LOW_SCORE_THRESHOLD {
        warnings.push(LOW_KEYWORD_WARNING.to_string());
    }
    if text.trim().is_empty() {
        warnings.push(EMPTY_RESUME_WARNING.to_string());
    }

    ScoreResult { score, warnings }
}
