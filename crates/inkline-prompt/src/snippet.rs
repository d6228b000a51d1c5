use inkline_context::DocumentContext;

/// A reference snippet retrieved by the host's context search, ranked by
/// relevance. The search itself is an external collaborator; this crate
/// only fits snippets into the prompt budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSnippet {
    /// Display label, usually a file path.
    pub label: String,
    pub content: String,
    pub score: f32,
}

/// Supplies ranked reference snippets for a trigger. Implementations must
/// return snippets in descending relevance order.
pub trait SnippetSource: Send + Sync {
    fn snippets(&self, session_id: &str, context: &DocumentContext) -> Vec<ReferenceSnippet>;
}

/// Default source: no snippets.
pub struct NoSnippets;

impl SnippetSource for NoSnippets {
    fn snippets(&self, _session_id: &str, _context: &DocumentContext) -> Vec<ReferenceSnippet> {
        Vec::new()
    }
}
