// src/report.rs

use crate::model::{CommitReport, FileStats};
use chrono::{TimeZone, Utc};

/// Human readable report, one block per commit.
pub fn render_text(reports: &[CommitReport]) -> String {
    let mut out = String::new();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let date = Utc
            .timestamp_opt(report.time, 0)
            .single()
            .map(|d| d.to_rfc2822())
            .unwrap_or_default();

        out.push_str(&format!(
            "commit {}\nDate:   {}\n    {}\n\n",
            report.commit, date, report.summary
        ));

        match &report.stats {
            Some(stats) => {
                for file in &report.files {
                    out.push_str(&render_file(file));
                }
                out.push_str(&stats.to_string());
            }
            None => out.push_str("No statistics (root commit)\n"),
        }
    }
    out
}

fn render_file(file: &FileStats) -> String {
    format!(
        "  {} [{}] code +{}/-{} comment +{}/-{} blank +{}/-{}\n",
        file.path,
        file.language.as_deref().unwrap_or("-"),
        file.code.additions,
        file.code.deletions,
        file.comment.additions,
        file.comment.deletions,
        file.blank.additions,
        file.blank.deletions,
    )
}

pub fn render_json(reports: &[CommitReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
