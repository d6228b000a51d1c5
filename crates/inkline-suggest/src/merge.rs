use crate::candidate::CompletionCandidate;
use inkline_common::CompletionError;
use inkline_editor::{InlineSpan, RenderedSuggestion};
use similar::{DiffOp, TextDiff};

/// Reconcile a post-processed candidate against the buffer text currently
/// occupying its range.
///
/// The candidate's first line is diffed character-by-character (Myers)
/// against `original`. Only pure insertions are acceptable: any delete or
/// replace delta rejects the whole candidate, so the overlay can never
/// silently rewrite existing text. Each insertion becomes one inline span
/// anchored inside the range; remaining candidate lines become a single
/// block suggestion joined with the buffer's line separator.
pub fn merge(
    candidate: &CompletionCandidate,
    original: &str,
    line_separator: &str,
) -> Result<RenderedSuggestion, CompletionError> {
    let revised = candidate.first_line();

    let diff = TextDiff::from_chars(original, revised);
    let revised_chars: Vec<char> = revised.chars().collect();

    // Char index -> byte offset within `original`, so span anchors land
    // on buffer character boundaries.
    let mut old_byte_offsets: Vec<usize> = original.char_indices().map(|(i, _)| i).collect();
    old_byte_offsets.push(original.len());

    let mut inline_spans = Vec::new();
    for op in diff.ops() {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                let text: String = revised_chars[*new_index..*new_index + *new_len]
                    .iter()
                    .collect();
                inline_spans.push(InlineSpan {
                    offset: candidate.range.start + old_byte_offsets[*old_index],
                    text,
                });
            }
            DiffOp::Delete { .. } | DiffOp::Replace { .. } => {
                tracing::debug!(
                    original = original,
                    revised = revised,
                    "rejecting candidate: diff contains a non-insertion delta"
                );
                return Err(CompletionError::RenderRejected);
            }
        }
    }

    // Multi-line completions only fire where the rest of the buffer is
    // empty or irrelevant; the block is anchored at the trigger offset
    // and not re-verified against it.
    let block_text = candidate
        .remaining_lines()
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.split('\n').collect::<Vec<_>>().join(line_separator));

    Ok(RenderedSuggestion {
        inline_spans,
        block_text,
    })
}
