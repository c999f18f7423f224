use std::path::PathBuf;

/// Reduce an uploaded file name to a safe ASCII basename.
///
/// Path separators become whitespace, whitespace runs collapse to `_`, characters
/// outside `[A-Za-z0-9_.-]` are dropped, and leading or trailing `.`/`_` are stripped.
/// The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let separated: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|ch| if ch == '/' || ch == '\\' { ' ' } else { ch })
        .collect();
    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(*ch, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|ch: char| ch == '.' || ch == '_').to_string()
}

/// Case-insensitive `.pdf` extension check applied to uploads.
pub fn is_pdf_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Directory holding uploaded resumes.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write `bytes` under an already-sanitised name, replacing any previous file.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Resolve a stored upload. Names that do not survive sanitisation unchanged are refused.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || secure_filename(filename) != filename {
            return None;
        }
        let path = self.root.join(filename);
        path.is_file().then_some(path)
    }
}
