//! Tail-window token detection.

use super::types::{BLOCKED_TOKEN, COMPLETE_TOKEN, FAILED_TOKEN, IterationOutcome};

/// Number of trailing characters inspected for a completion token.
pub const TAIL_WINDOW_CHARS: usize = 2000;

/// The last `TAIL_WINDOW_CHARS` characters of `output` (whole text if shorter).
pub fn tail_window(output: &str) -> &str {
    match output.char_indices().rev().nth(TAIL_WINDOW_CHARS - 1) {
        Some((start, _)) => &output[start..],
        None => output,
    }
}

/// Classify an agent turn from its captured output.
///
/// Priority is blocked > failed > complete: an agent explaining why it is
/// blocked may well mention the other words.
pub fn detect(output: &str) -> IterationOutcome {
    let tail = tail_window(output);
    if tail.contains(BLOCKED_TOKEN) {
        IterationOutcome::Blocked
    } else if tail.contains(FAILED_TOKEN) {
        IterationOutcome::Failed
    } else if tail.contains(COMPLETE_TOKEN) {
        IterationOutcome::Complete
    } else {
        IterationOutcome::AssumedSuccess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_token() {
        assert_eq!(detect("done.\nFEATURE_COMPLETE\n"), IterationOutcome::Complete);
        assert_eq!(detect("oops FEATURE_FAILED"), IterationOutcome::Failed);
        assert_eq!(detect("FEATURE_BLOCKED: need API key"), IterationOutcome::Blocked);
    }

    #[test]
    fn test_detect_no_token() {
        assert_eq!(detect("all good, I think"), IterationOutcome::AssumedSuccess);
        assert_eq!(detect(""), IterationOutcome::AssumedSuccess);
    }

    #[test]
    fn test_blocked_beats_complete() {
        let text = "I could not reach FEATURE_COMPLETE because credentials are missing.\nFEATURE_BLOCKED";
        assert_eq!(detect(text), IterationOutcome::Blocked);
    }

    #[test]
    fn test_failed_beats_complete() {
        let text = "FEATURE_COMPLETE was not possible. FEATURE_FAILED";
        assert_eq!(detect(text), IterationOutcome::Failed);
    }

    #[test]
    fn test_blocked_beats_failed() {
        assert_eq!(
            detect("FEATURE_FAILED ... FEATURE_BLOCKED"),
            IterationOutcome::Blocked
        );
    }

    #[test]
    fn test_token_before_window_is_ignored() {
        let mut text = String::from("FEATURE_COMPLETE\n");
        text.push_str(&"x".repeat(TAIL_WINDOW_CHARS));
        assert_eq!(detect(&text), IterationOutcome::AssumedSuccess);
    }

    #[test]
    fn test_token_at_window_edge_is_found() {
        let mut text = String::from(COMPLETE_TOKEN);
        text.push_str(&"x".repeat(TAIL_WINDOW_CHARS - COMPLETE_TOKEN.len()));
        assert_eq!(tail_window(&text).len(), TAIL_WINDOW_CHARS);
        assert_eq!(detect(&text), IterationOutcome::Complete);
    }

    #[test]
    fn test_tail_window_counts_chars_not_bytes() {
        let text = "漫".repeat(TAIL_WINDOW_CHARS + 10);
        let tail = tail_window(&text);
        assert_eq!(tail.chars().count(), TAIL_WINDOW_CHARS);
    }

    #[test]
    fn test_tail_window_short_text_is_whole() {
        assert_eq!(tail_window("short"), "short");
    }
}
