//! Resume screening: PDF text extraction, ATS keyword scoring, and folder ranking.
//!
//! The scorer and the ranker deliberately differ in how they count: the scorer
//! reports the share of keywords present, while the ranker reports a raw count in
//! which duplicated keywords in the list each contribute.

pub mod extractor;
pub mod ranker;
pub mod report;
pub mod scorer;

pub use extractor::{extract, ExtractionError, PageTextSource, PdfTextSource, TextExtractor};
pub use ranker::{rank, raw_match_count, FolderRanker, RankEntry, RankError};
pub use report::{render_table, write_csv};
pub use scorer::{
    matched_keywords, score, ScoreResult, EMPTY_RESUME_WARNING, LOW_KEYWORD_WARNING,
    LOW_SCORE_THRESHOLD,
};

use std::path::Path;

/// Extract a resume and score it against `keywords` in one step.
pub fn screen_resume<S, K>(extractor: &TextExtractor<S>, path: &Path, keywords: &[K]) -> ScoreResult
where
    S: PageTextSource,
    K: AsRef<str>,
{
    let text = extractor.extract(path);
    score(&text, keywords)
}
