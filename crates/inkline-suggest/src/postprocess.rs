use crate::candidate::CompletionCandidate;
use inkline_editor::{IndentConfig, TextRange};

/// Characters stripped from every candidate: zero-width space and the
/// line-separator control character.
const DENIED_CHARS: &[char] = &['\u{200B}', '\u{2028}'];

/// Clean a raw model completion. The chain is order-significant and
/// idempotent: running it on an already-processed candidate is a no-op.
///
/// Steps that change the candidate where it maps onto buffer text adjust
/// the range end by the exact delta; that is what keeps the diff merger's
/// insertion-only guarantee intact.
pub fn post_process(
    candidate: &CompletionCandidate,
    prefix: &str,
    line_suffix: &str,
    indent: &IndentConfig,
) -> CompletionCandidate {
    let mut text = candidate.insert_text.clone();
    let mut range = candidate.range;

    text = strip_trailing_fence(&text);
    text = trim_leading(&text, prefix);
    text.retain(|c| !DENIED_CHARS.contains(&c));

    let (renormalized, delta) = renormalize_indent(&text, indent);
    text = renormalized;
    range = shift_end(range, delta);

    if let Some((cut, shrink)) = duplicate_suffix_cut(&text, line_suffix) {
        text.truncate(cut);
        range = shift_end(range, -(shrink as isize));
    }

    CompletionCandidate::new(text, range, candidate.stop_reason.clone())
}

fn shift_end(range: TextRange, delta: isize) -> TextRange {
    let end = (range.end as isize + delta).max(range.start as isize) as usize;
    TextRange::new(range.start, end)
}

/// Drop a trailing fence marker and everything after it.
fn strip_trailing_fence(text: &str) -> String {
    match text.find("```") {
        Some(pos) => text[..pos].to_string(),
        None => text.to_string(),
    }
}

/// When the prompt prefix spans multiple lines the model may open with
/// stray whitespace; strip it all. When the candidate continues the
/// current line, strip only spaces and tabs before the first newline.
fn trim_leading(text: &str, prefix: &str) -> String {
    if prefix.trim().contains('\n') {
        text.trim_start().to_string()
    } else {
        let cut = text
            .char_indices()
            .find(|(_, c)| !matches!(c, ' ' | '\t'))
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        text[cut..].to_string()
    }
}

/// Re-express the candidate's leading indentation in the editor's indent
/// unit, preserving any newlines ahead of it. Returns the new text and
/// the length delta introduced.
fn renormalize_indent(text: &str, indent: &IndentConfig) -> (String, isize) {
    let tab_size = indent.tab_size.max(1);
    let pos = match text.find(|c: char| !c.is_whitespace()) {
        Some(p) if p > 0 => p,
        _ => return (text.to_string(), 0),
    };
    let run = &text[..pos];
    let (head, tail) = match run.rfind('\n') {
        Some(nl) => run.split_at(nl + 1),
        None => ("", run),
    };
    let width: usize = tail
        .chars()
        .map(|c| if c == '\t' { tab_size } else { 1 })
        .sum();
    let new_tail = if indent.use_tabs {
        let mut s = "\t".repeat(width / tab_size);
        s.push_str(&" ".repeat(width % tab_size));
        s
    } else {
        " ".repeat(width)
    };
    if new_tail == tail {
        return (text.to_string(), 0);
    }
    let delta = new_tail.len() as isize - tail.len() as isize;
    (format!("{}{}{}", head, new_tail, &text[pos..]), delta)
}

/// Known heuristic: the buffer's same-line suffix is cut wherever it
/// first appears in the candidate, which can over-truncate a candidate
/// that coincidentally contains the suffix text mid-completion. Matches
/// the trailing-duplication case as well as "contains anywhere".
fn duplicate_suffix_cut(text: &str, line_suffix: &str) -> Option<(usize, usize)> {
    if line_suffix.is_empty() || text.is_empty() {
        return None;
    }
    text.find(line_suffix).map(|pos| (pos, line_suffix.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, start: usize, end: usize) -> CompletionCandidate {
        CompletionCandidate::new(text.to_string(), TextRange::new(start, end), String::new())
    }

    fn spaces_indent() -> IndentConfig {
        IndentConfig {
            use_tabs: false,
            tab_size: 4,
        }
    }

    fn tabs_indent() -> IndentConfig {
        IndentConfig {
            use_tabs: true,
            tab_size: 4,
        }
    }

    #[test]
    fn test_fence_and_tail_stripped() {
        let c = candidate("x + 1\n```\nextra prose", 0, 0);
        let out = post_process(&c, "let y = ", "", &spaces_indent());
        assert_eq!(out.insert_text, "x + 1\n");
    }

    #[test]
    fn test_single_line_prefix_trims_only_before_newline() {
        let c = candidate("  x\n  y", 0, 0);
        let out = post_process(&c, "let y = ", "", &spaces_indent());
        assert_eq!(out.insert_text, "x\n  y");
    }

    #[test]
    fn test_multi_line_prefix_trims_all_leading_whitespace() {
        let c = candidate("\n  x", 0, 0);
        let out = post_process(&c, "fn f() {\n    let a = 1;\n    ", "", &spaces_indent());
        assert_eq!(out.insert_text, "x");
    }

    #[test]
    fn test_denied_chars_removed() {
        let c = candidate("x\u{200B} + \u{2028}1", 0, 0);
        let out = post_process(&c, "let y = ", "", &spaces_indent());
        assert_eq!(out.insert_text, "x + 1");
    }

    #[test]
    fn test_indent_renormalized_spaces_to_tabs() {
        // Leading newline survives the single-line trim, then the
        // 8-space indent becomes two tabs; range end shrinks by 6.
        let c = candidate("\n        done()", 10, 20);
        let out = post_process(&c, "let y = ", "", &tabs_indent());
        assert_eq!(out.insert_text, "\n\t\tdone()");
        assert_eq!(out.range, TextRange::new(10, 14));
    }

    #[test]
    fn test_indent_renormalized_tabs_to_spaces() {
        let c = candidate("\n\tdone()", 10, 20);
        let out = post_process(&c, "let y = ", "", &spaces_indent());
        assert_eq!(out.insert_text, "\n    done()");
        assert_eq!(out.range, TextRange::new(10, 23));
    }

    #[test]
    fn test_suffix_duplication_trailing() {
        // prefix "return ", suffix ";", raw "x;" -> "x", range end -1.
        let c = candidate("x;", 7, 8);
        let out = post_process(&c, "return ", ";", &spaces_indent());
        assert_eq!(out.insert_text, "x");
        assert_eq!(out.range, TextRange::new(7, 7));
    }

    #[test]
    fn test_suffix_duplication_contained_anywhere() {
        let c = candidate("foo); bar()", 5, 7);
        let out = post_process(&c, "call(", ");", &spaces_indent());
        assert_eq!(out.insert_text, "foo");
        assert_eq!(out.range, TextRange::new(5, 5));
    }

    #[test]
    fn test_range_never_shrinks_past_start() {
        let c = candidate(";", 7, 7);
        let out = post_process(&c, "return ", ";", &spaces_indent());
        assert_eq!(out.insert_text, "");
        assert_eq!(out.range, TextRange::new(7, 7));
    }

    #[test]
    fn test_idempotent() {
        let cases = [
            ("x + 1\n```rest", "let y = ", ";"),
            ("  indent\nmore;", "let y = ", ";"),
            ("\n\t\tbody()", "fn f() {\n    ", ""),
            ("x;", "return ", ";"),
        ];
        for (text, prefix, suffix) in cases {
            for indent in [spaces_indent(), tabs_indent()] {
                let c = candidate(text, 10, 10 + suffix.len());
                let once = post_process(&c, prefix, suffix, &indent);
                let twice = post_process(&once, prefix, suffix, &indent);
                assert_eq!(once, twice, "case {text:?} with {indent:?}");
            }
        }
    }
}
