use std::io::Write;

use super::ranker::RankEntry;

/// Write a ranking as CSV with a `rank,filename,count` header.
pub fn write_csv<W: Write>(ranking: &[RankEntry], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["rank", "filename", "count"])?;
    for (position, entry) in ranking.iter().enumerate() {
        writer.write_record([
            (position + 1).to_string(),
            entry.filename.clone(),
            entry.count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a ranking as an aligned plain-text table.
pub fn render_table(ranking: &[RankEntry]) -> String {
    if ranking.is_empty() {
        return "no PDF resumes found\n".to_string();
    }

    let width = ranking
        .iter()
        .map(|entry| entry.filename.len())
        .max()
        .unwrap_or(0)
        .max("filename".len());

    let mut out = format!("{:>4}  {:<width$}  {:>5}\n", "rank", "filename", "count");
    for (position, entry) in ranking.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<width$}  {:>5}\n",
            position + 1,
            entry.filename,
            entry.count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking() -> Vec<RankEntry> {
        vec![
            RankEntry {
                filename: "b.pdf".to_string(),
                count: 3,
            },
            RankEntry {
                filename: "a, jr.pdf".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn csv_output_quotes_awkward_filenames() {
        let mut buffer = Vec::new();
        write_csv(&ranking(), &mut buffer).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text, "rank,filename,count\n1,b.pdf,3\n2,\"a, jr.pdf\",1\n");
    }

    #[test]
    fn table_output_aligns_columns() {
        let table = render_table(&ranking());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank  filename"));
        assert!(lines[1].contains("b.pdf"));
        assert!(lines[2].trim_end().ends_with('1'));
        assert_eq!(render_table(&[]), "no PDF resumes found\n");
    }
}
