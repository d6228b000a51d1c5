use crate::snippet::ReferenceSnippet;
use crate::strategy::ProviderStrategy;
use inkline_common::CompletionError;
use inkline_context::DocumentContext;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// One model request. A cycle may carry several of these, differing only
/// in the injected continuation seed; the first non-empty result wins.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    /// Continuation seed the model is made to start from; prepended to
    /// the returned text when building the candidate.
    pub inject_prefix: String,
    pub stop_sequences: Vec<String>,
    pub max_tokens: usize,
}

const CURSOR_MARK: &str = "<cursor>";

fn render_user_content(strategy: ProviderStrategy, ctx: &DocumentContext, snippets: &str) -> String {
    let instruction = match strategy {
        ProviderStrategy::SingleLine => {
            "Finish the line at the cursor. Reply with only the inserted text, no explanation."
        }
        ProviderStrategy::MultiLine => {
            "Continue the code at the cursor. Reply with only the inserted text, no explanation."
        }
    };
    format!(
        "You are completing code inside an editor.\n\
         Reference snippets from the project:\n{}\n\
         {}\n\n{}{}{}",
        snippets, instruction, ctx.prefix, CURSOR_MARK, ctx.suffix
    )
}

/// Character cost of the prompt before any snippets are added.
pub fn fixed_overhead(strategy: ProviderStrategy, ctx: &DocumentContext) -> usize {
    render_user_content(strategy, ctx, "").len()
}

/// Render a strategy's template with placeholders, for debugging.
pub fn template_for(strategy: ProviderStrategy) -> String {
    let placeholder = DocumentContext {
        prefix: "{prefix}".to_string(),
        suffix: "{suffix}".to_string(),
        previous_line: String::new(),
        previous_non_empty_line: String::new(),
        next_non_empty_line: String::new(),
    };
    render_user_content(strategy, &placeholder, "{snippets}")
}

/// Build the model requests for one cycle.
///
/// Snippets are added in descending relevance order, each costing
/// `content.len() + 1` characters against what remains of the budget
/// after the fixed overhead. The first snippet that does not fit stops
/// the walk; it and everything after it are dropped, never truncated.
/// Fails with `PromptOverflow` when the fixed overhead alone exceeds the
/// budget.
pub fn assemble(
    ctx: &DocumentContext,
    snippets: &[ReferenceSnippet],
    strategy: ProviderStrategy,
    max_prompt_chars: usize,
    max_response_tokens: usize,
    default_n: usize,
) -> Result<Vec<CompletionRequest>, CompletionError> {
    let overhead = fixed_overhead(strategy, ctx);
    if overhead > max_prompt_chars {
        return Err(CompletionError::PromptOverflow {
            overhead,
            budget: max_prompt_chars,
        });
    }

    let mut ranked: Vec<&ReferenceSnippet> = snippets.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut remaining = max_prompt_chars - overhead;
    let mut block = String::new();
    for snippet in ranked {
        let cost = snippet.content.len() + 1;
        if cost > remaining {
            break;
        }
        block.push_str(&snippet.content);
        block.push('\n');
        remaining -= cost;
    }

    let content = render_user_content(strategy, ctx, &block);
    debug_assert!(content.len() <= max_prompt_chars);

    let params = strategy.params();
    let stop_sequences: Vec<String> = params
        .stop_sequences
        .iter()
        .map(|s| s.to_string())
        .collect();

    let requests = params
        .inject_seeds
        .iter()
        .take(default_n.max(1))
        .map(|seed| CompletionRequest {
            messages: vec![PromptMessage {
                role: Role::User,
                content: content.clone(),
            }],
            inject_prefix: seed.to_string(),
            stop_sequences: stop_sequences.clone(),
            max_tokens: max_response_tokens,
        })
        .collect();

    Ok(requests)
}
