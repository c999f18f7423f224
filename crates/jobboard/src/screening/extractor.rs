use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::warn;

/// Reasons a resume could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse PDF: {0}")]
    Parse(String),
    #[error("PDF parser panicked on malformed input")]
    Panicked,
}

/// Page-level plain-text extraction capability.
///
/// Implementations return one entry per page, in page order. Pages without a
/// text layer may be returned as empty strings.
pub trait PageTextSource: Send + Sync {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Production text source backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PageTextSource for PdfTextSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // pdf-extract panics on some malformed documents instead of returning errors.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(err)) => Err(ExtractionError::Parse(err.to_string())),
            Err(_) => Err(ExtractionError::Panicked),
        }
    }
}

/// Converts resume files into lowercase text suitable for keyword matching.
#[derive(Debug, Default, Clone)]
pub struct TextExtractor<S = PdfTextSource> {
    source: S,
}

impl TextExtractor<PdfTextSource> {
    pub fn pdf() -> Self {
        Self::new(PdfTextSource)
    }
}

impl<S: PageTextSource> TextExtractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Concatenate every page's text in page order and lowercase the result.
    pub fn try_extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let pages = self.source.page_texts(path)?;
        let text: String = pages.iter().map(String::as_str).collect();
        Ok(text.to_lowercase())
    }

    /// Total variant of [`try_extract`](Self::try_extract): any failure yields empty text.
    pub fn extract(&self, path: &Path) -> String {
        match self.try_extract(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "resume text extraction failed");
                String::new()
            }
        }
    }
}

/// Extract lowercase text from a PDF on disk, returning an empty string on any failure.
pub fn extract(path: impl AsRef<Path>) -> String {
    TextExtractor::pdf().extract(path.as_ref())
}
