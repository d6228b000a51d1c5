/// Bounded windows of buffer text around the cursor, recomputed per
/// trigger. `prefix` ends exactly at the cursor offset; both windows are
/// truncated at whole-line granularity, never mid-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    pub prefix: String,
    pub suffix: String,
    pub previous_line: String,
    pub previous_non_empty_line: String,
    pub next_non_empty_line: String,
}

/// Whether an automatic trigger should fire at this cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerVerdict {
    Valid,
    /// The text before the cursor on the current line is only whitespace
    /// followed by letters: the user is mid-identifier.
    MidWord,
    /// The rest of the current line contains a word character; a
    /// completion here would collide with existing trailing code.
    TrailingText,
}

impl TriggerVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, TriggerVerdict::Valid)
    }
}

/// Clamp `offset` to the buffer length and back onto a char boundary.
/// Host-reported offsets should already satisfy both; every entry point
/// that indexes the buffer clamps anyway.
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut o = offset.min(text.len());
    while o > 0 && !text.is_char_boundary(o) {
        o -= 1;
    }
    o
}

/// Text on the cursor's line before the cursor.
pub fn current_line_prefix(text: &str, offset: usize) -> &str {
    let o = clamp_offset(text, offset);
    let before = &text[..o];
    match before.rfind('\n') {
        Some(nl) => &before[nl + 1..],
        None => before,
    }
}

/// Text on the cursor's line after the cursor, excluding the newline.
pub fn current_line_suffix(text: &str, offset: usize) -> &str {
    let o = clamp_offset(text, offset);
    let after = &text[o..];
    match after.find('\n') {
        Some(nl) => &after[..nl],
        None => after,
    }
}

/// Extract bounded prefix/suffix windows around `offset`.
///
/// Lines are accumulated away from the cursor until the next whole line
/// would overflow the budget; that line and everything beyond it are
/// dropped. Returns `None` when the buffer is empty up to the cursor.
pub fn extract(
    text: &str,
    offset: usize,
    max_prefix_chars: usize,
    max_suffix_chars: usize,
) -> Option<DocumentContext> {
    let o = clamp_offset(text, offset);
    let before = &text[..o];
    let after = &text[o..];

    if before.is_empty() {
        return None;
    }

    // Backward walk: candidate cuts are line starts, nearest first.
    let mut starts = vec![0usize];
    for (i, b) in before.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    let mut cut = o;
    for &s in starts.iter().rev() {
        if o - s <= max_prefix_chars {
            cut = s;
        } else {
            break;
        }
    }
    let prefix = before[cut..].to_string();

    // Forward walk: candidate cuts are just past each newline, plus the
    // end of the buffer.
    let mut ends = Vec::new();
    for (i, b) in after.bytes().enumerate() {
        if b == b'\n' {
            ends.push(i + 1);
        }
    }
    ends.push(after.len());
    let mut fcut = 0usize;
    for &e in &ends {
        if e <= max_suffix_chars {
            fcut = e;
        } else {
            break;
        }
    }
    let suffix = after[..fcut].to_string();

    let before_lines: Vec<&str> = before.split('\n').collect();
    let n = before_lines.len();
    let previous_line = if n >= 2 { before_lines[n - 2] } else { "" };
    let previous_non_empty_line = before_lines[..n - 1]
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty())
        .copied()
        .unwrap_or("");

    // Skip the remainder of the cursor's own line, then find the nearest
    // non-blank line below.
    let next_non_empty_line = after
        .split('\n')
        .skip(1)
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    Some(DocumentContext {
        prefix,
        suffix,
        previous_line: previous_line.to_string(),
        previous_non_empty_line: previous_non_empty_line.to_string(),
        next_non_empty_line: next_non_empty_line.to_string(),
    })
}

/// Decide whether an automatic trigger at `offset` is worth firing.
/// Explicit invocations bypass this check.
pub fn trigger_verdict(text: &str, offset: usize) -> TriggerVerdict {
    let line_prefix = current_line_prefix(text, offset);
    let trimmed = line_prefix.trim_start();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return TriggerVerdict::MidWord;
    }

    let line_suffix = current_line_suffix(text, offset);
    if line_suffix
        .chars()
        .any(|c| c.is_alphanumeric() || c == '_')
    {
        return TriggerVerdict::TrailingText;
    }

    TriggerVerdict::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_cursor_yields_none() {
        assert!(extract("", 0, 100, 100).is_none());
        assert!(extract("fn main() {}", 0, 100, 100).is_none());
    }

    #[test]
    fn test_prefix_ends_at_cursor() {
        let text = "let a = 1;\nlet b = ";
        let ctx = extract(text, text.len(), 100, 100).unwrap();
        assert_eq!(ctx.prefix, text);
        assert!(ctx.prefix.ends_with("let b = "));
    }

    #[test]
    fn test_prefix_budget_truncates_whole_lines() {
        let text = "aaaa\nbbbb\ncccc\ndd";
        // Budget of 8 fits "cccc\ndd" (7 chars) but not "bbbb\ncccc\ndd".
        let ctx = extract(text, text.len(), 8, 100).unwrap();
        assert_eq!(ctx.prefix, "cccc\ndd");
        assert!(ctx.prefix.len() <= 8);
    }

    #[test]
    fn test_prefix_never_cut_mid_line() {
        let text = "aaaa\nbbbb\ncc";
        for budget in 0..=text.len() {
            let ctx = extract(text, text.len(), budget, 100).unwrap();
            assert!(ctx.prefix.len() <= budget);
            // Any kept prefix starts at a line boundary.
            if !ctx.prefix.is_empty() {
                let start = text.len() - ctx.prefix.len();
                assert!(start == 0 || text.as_bytes()[start - 1] == b'\n');
            }
        }
    }

    #[test]
    fn test_suffix_budget_truncates_whole_lines() {
        let text = "x\nAAAA\nBBBB\nCCCC";
        let ctx = extract(text, 1, 100, 11).unwrap();
        // "\nAAAA\nBBBB\n" is 11 chars; "CCCC" does not fit.
        assert_eq!(ctx.suffix, "\nAAAA\nBBBB\n");
        assert!(ctx.suffix.len() <= 11);
    }

    #[test]
    fn test_suffix_budget_invariant() {
        let text = "x\nAAAA\nBBBB\nCCCC";
        for budget in 0..=text.len() {
            let ctx = extract(text, 1, 100, budget).unwrap();
            assert!(ctx.suffix.len() <= budget, "budget {}", budget);
        }
    }

    #[test]
    fn test_neighbor_lines() {
        let text = "fn top() {}\n\nfn mid() {\n    let x = \n\n    let y = 2;\n}";
        let offset = text.find("let x = ").unwrap() + "let x = ".len();
        let ctx = extract(text, offset, 1000, 1000).unwrap();
        assert_eq!(ctx.previous_line, "fn mid() {");
        assert_eq!(ctx.previous_non_empty_line, "fn mid() {");
        assert_eq!(ctx.next_non_empty_line, "    let y = 2;");
    }

    #[test]
    fn test_previous_line_blank_but_non_empty_found_above() {
        let text = "first line\n\ncursor ";
        let ctx = extract(text, text.len(), 1000, 1000).unwrap();
        assert_eq!(ctx.previous_line, "");
        assert_eq!(ctx.previous_non_empty_line, "first line");
    }

    #[test]
    fn test_no_neighbor_lines_means_empty_strings() {
        let text = "only ";
        let ctx = extract(text, text.len(), 1000, 1000).unwrap();
        assert_eq!(ctx.previous_line, "");
        assert_eq!(ctx.previous_non_empty_line, "");
        assert_eq!(ctx.next_non_empty_line, "");
    }

    #[test]
    fn test_mid_word_guard() {
        // Line before cursor is whitespace plus letters only.
        let text = "  fo";
        assert_eq!(trigger_verdict(text, text.len()), TriggerVerdict::MidWord);
        let text = "fn main() {\n    fo";
        assert_eq!(trigger_verdict(text, text.len()), TriggerVerdict::MidWord);
    }

    #[test]
    fn test_trailing_text_guard() {
        let text = "let x = |rest";
        let offset = text.find('|').unwrap();
        let text = text.replace('|', "");
        assert_eq!(
            trigger_verdict(&text, offset),
            TriggerVerdict::TrailingText
        );
    }

    #[test]
    fn test_valid_after_punctuation() {
        let text = "let x = ";
        assert_eq!(trigger_verdict(text, text.len()), TriggerVerdict::Valid);
        let text = "foo(";
        assert_eq!(trigger_verdict(text, text.len()), TriggerVerdict::Valid);
    }

    #[test]
    fn test_trailing_punctuation_only_is_valid() {
        // Closing brackets after the cursor are not word characters.
        let text = "foo()";
        let offset = text.len() - 1;
        assert_eq!(trigger_verdict(text, offset), TriggerVerdict::Valid);
    }

    #[test]
    fn test_line_helpers() {
        let text = "ab\ncd ef\ngh";
        let offset = text.find("ef").unwrap();
        assert_eq!(current_line_prefix(text, offset), "cd ");
        assert_eq!(current_line_suffix(text, offset), "ef");
    }

    #[test]
    fn test_clamped_offset_on_non_boundary() {
        let text = "héllo";
        // Offset 2 is inside the two-byte 'é'; clamping must not panic.
        let _ = extract(text, 2, 100, 100);
        let _ = trigger_verdict(text, 2);
    }

    #[test]
    fn test_clamp_offset_values() {
        let text = "héllo";
        assert_eq!(clamp_offset(text, 2), 1);
        assert_eq!(clamp_offset(text, 3), 3);
        assert_eq!(clamp_offset(text, 100), text.len());
    }
}
