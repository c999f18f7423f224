use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::extractor::{PageTextSource, PdfTextSource, TextExtractor};

/// One resume's position in a folder ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub filename: String,
    pub count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("unable to list resume folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Count every keyword in the list, duplicates included, whose lowercase form occurs in `text`.
pub fn raw_match_count<K: AsRef<str>>(text: &str, keywords: &[K]) -> usize {
    let mut count = 0;
    for keyword in keywords {
        if text.contains(&keyword.as_ref().to_lowercase()) {
            count += 1;
        }
    }
    count
}

/// Batch ranker over a folder of PDF resumes.
#[derive(Debug, Default, Clone)]
pub struct FolderRanker<S = PdfTextSource> {
    extractor: TextExtractor<S>,
}

impl FolderRanker<PdfTextSource> {
    pub fn pdf() -> Self {
        Self::new(TextExtractor::pdf())
    }
}

impl<S: PageTextSource> FolderRanker<S> {
    pub fn new(extractor: TextExtractor<S>) -> Self {
        Self { extractor }
    }

    /// Rank every `*.pdf` entry in `directory` by raw keyword count, highest first.
    ///
    /// The suffix check is case-sensitive. Ties keep directory-listing order. Files that
    /// fail to extract contribute a count of zero rather than aborting the scan.
    pub fn rank<K: AsRef<str>>(
        &self,
        directory: &Path,
        keywords: &[K],
    ) -> Result<Vec<RankEntry>, RankError> {
        let entries = std::fs::read_dir(directory).map_err(|source| RankError::ReadDir {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut ranking = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            let filename = entry.file_name().to_string_lossy().into_owned();
            if !filename.ends_with(".pdf") {
                continue;
            }

            let text = self.extractor.extract(&entry.path());
            let count = raw_match_count(&text, keywords);
            debug!(%filename, count, "ranked resume");
            ranking.push(RankEntry { filename, count });
        }

        // sort_by is stable, so equal counts keep listing order
        ranking.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(ranking)
    }
}

/// Rank the PDFs in `directory` with the production extractor.
pub fn rank<K: AsRef<str>>(directory: &Path, keywords: &[K]) -> Result<Vec<RankEntry>, RankError> {
    FolderRanker::pdf().rank(directory, keywords)
}
