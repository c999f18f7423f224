use clap::{Args, ValueEnum};
use jobboard::board::KeywordSet;
use jobboard::error::AppError;
use jobboard::screening::{rank, render_table, screen_resume, write_csv, TextExtractor};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Folder containing the PDF resumes to rank
    #[arg(long)]
    pub(crate) dir: PathBuf,
    /// Comma-separated keywords; duplicates count once per occurrence in the list
    #[arg(long)]
    pub(crate) keywords: String,
    /// Output format for the ranking
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// PDF resume to score
    #[arg(long)]
    pub(crate) resume: PathBuf,
    /// Comma-separated keywords the resume is scored against
    #[arg(long)]
    pub(crate) keywords: String,
}

pub(crate) fn run_rank<W: Write>(args: RankArgs, out: &mut W) -> Result<(), AppError> {
    let keywords = KeywordSet::parse(&args.keywords);
    debug!(dir = %args.dir.display(), keywords = keywords.len(), "ranking resumes");
    let ranking = rank(&args.dir, keywords.as_slice())?;

    match args.format {
        OutputFormat::Table => out.write_all(render_table(&ranking).as_bytes())?,
        OutputFormat::Csv => write_csv(&ranking, &mut *out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &ranking)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub(crate) fn run_score<W: Write>(args: ScoreArgs, out: &mut W) -> Result<(), AppError> {
    let keywords = KeywordSet::parse(&args.keywords);
    let result = screen_resume(&TextExtractor::pdf(), &args.resume, keywords.as_slice());
    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn rank_output(dir: PathBuf, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        run_rank(
            RankArgs {
                dir,
                keywords: "python, sql".to_string(),
                format,
            },
            &mut buffer,
        )
        .expect("rank runs");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn rank_reports_unreadable_pdfs_with_zero_matches() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.pdf"), b"not a pdf").expect("write");
        std::fs::write(dir.path().join("notes.txt"), b"python sql").expect("write");

        let csv = rank_output(dir.path().to_path_buf(), OutputFormat::Csv);
        assert_eq!(csv, "rank,filename,count\n1,broken.pdf,0\n");

        let json: Value =
            serde_json::from_str(&rank_output(dir.path().to_path_buf(), OutputFormat::Json))
                .expect("json output");
        assert_eq!(json[0]["filename"], "broken.pdf");
        assert_eq!(json[0]["count"], 0);
    }

    #[test]
    fn rank_on_empty_folder_prints_notice() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = rank_output(dir.path().to_path_buf(), OutputFormat::Table);
        assert_eq!(table, "no PDF resumes found\n");
    }

    #[test]
    fn rank_on_missing_folder_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run_rank(
            RankArgs {
                dir: dir.path().join("absent"),
                keywords: "python".to_string(),
                format: OutputFormat::Table,
            },
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(AppError::Rank(_))));
    }

    #[test]
    fn score_prints_both_warnings_for_unreadable_resume() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"garbage").expect("write");

        let mut buffer = Vec::new();
        run_score(
            ScoreArgs {
                resume: path,
                keywords: "python".to_string(),
            },
            &mut buffer,
        )
        .expect("score runs");

        let json: Value = serde_json::from_slice(&buffer).expect("json output");
        assert_eq!(json["score"], 0);
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(2));
    }
}
