//! Human-readable progress artifacts: the progress report file rewritten after
//! every commit, and the end-of-run summary.

use chrono::{DateTime, Local};
use std::path::Path;

use crate::backlog::Backlog;

/// Render the progress report file for `backlog` as of `now`.
pub fn render_progress_file(backlog: &Backlog, now: DateTime<Local>) -> String {
    let total = backlog.features.len();
    let done = backlog.completed().count();

    let mut lines = vec![
        format!("# Project Progress - {}", now.format("%Y-%m-%d %H:%M")),
        format!("# Status: {}/{} features complete", done, total),
        String::new(),
        "## Completed".to_string(),
    ];
    for f in backlog.completed() {
        lines.push(format!(
            "- [x] [{}] {}",
            f.priority.to_string().to_uppercase(),
            f.title
        ));
    }
    lines.push(String::new());
    lines.push("## Pending".to_string());
    for f in backlog.pending() {
        lines.push(format!(
            "- [ ] [{}] {}: {}",
            f.priority.to_string().to_uppercase(),
            f.title,
            f.description
        ));
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Regenerate the progress report file wholesale.
pub fn write_progress_file(path: &Path, backlog: &Backlog) -> std::io::Result<()> {
    std::fs::write(path, render_progress_file(backlog, Local::now()))
}

/// Plain-text summary of completed vs remaining features, by id and title.
pub fn render_summary(backlog: &Backlog) -> String {
    let total = backlog.features.len();
    let done = backlog.completed().count();

    let mut out = format!("Completed: {}/{} features\n", done, total);
    if done < total {
        out.push_str("\nRemaining:\n");
        for f in backlog.pending() {
            out.push_str(&format!("  - [{}] {}\n", f.id, f.title));
        }
    }
    out.push('\n');
    for f in &backlog.features {
        let mark = if f.done { "✓" } else { "○" };
        out.push_str(&format!("{} [{}] {}\n", mark, f.id, f.title));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlog::{Feature, Priority};
    use chrono::TimeZone;

    fn sample() -> Backlog {
        let mut backlog = Backlog::bare(vec![
            Feature::new(1, "Reader", "read files").with_priority(Priority::High),
            Feature::new(2, "Parser", "split scenes"),
            Feature::new(3, "Export", "write pdf").with_priority(Priority::Low),
        ]);
        backlog.mark_done(1);
        backlog
    }

    #[test]
    fn test_progress_file_layout() {
        let now = Local.with_ymd_and_hms(2026, 3, 4, 9, 5, 0).unwrap();
        let text = render_progress_file(&sample(), now);
        let expected = "\
# Project Progress - 2026-03-04 09:05
# Status: 1/3 features complete

## Completed
- [x] [HIGH] Reader

## Pending
- [ ] [MEDIUM] Parser: split scenes
- [ ] [LOW] Export: write pdf
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_write_progress_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claude-progress.txt");
        write_progress_file(&path, &sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Project Progress - "));
        assert!(content.contains("- [x] [HIGH] Reader"));
    }

    #[test]
    fn test_summary_lists_remaining_by_id() {
        let summary = render_summary(&sample());
        assert!(summary.starts_with("Completed: 1/3 features"));
        assert!(summary.contains("Remaining:\n  - [2] Parser\n  - [3] Export\n"));
        assert!(summary.contains("✓ [1] Reader"));
        assert!(summary.contains("○ [3] Export"));
    }

    #[test]
    fn test_summary_when_all_done() {
        let mut backlog = sample();
        backlog.mark_done(2);
        backlog.mark_done(3);
        let summary = render_summary(&backlog);
        assert!(summary.starts_with("Completed: 3/3 features"));
        assert!(!summary.contains("Remaining"));
    }
}
