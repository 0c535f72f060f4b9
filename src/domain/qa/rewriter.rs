//! Query rewriting for failed retrieval attempts

use crate::domain::pipeline::{QueryRewriter, RewriteContext};

const DEFAULT_TEMPLATES: [&str; 3] = [
    "Detailed information about: {query}",
    "explain {query} in detail",
    "what are the requirements for {query}",
];

/// Rewrites the original query with a template chosen by attempt index
#[derive(Debug, Clone)]
pub struct TemplateRewriter {
    templates: Vec<String>,
}

impl TemplateRewriter {
    /// Templates must contain `{query}`; an empty list falls back to the defaults
    pub fn new(templates: Vec<String>) -> Self {
        if templates.is_empty() {
            return Self::default();
        }
        Self { templates }
    }
}

impl Default for TemplateRewriter {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl QueryRewriter for TemplateRewriter {
    fn rewrite(&self, original: &str, context: &RewriteContext<'_>) -> String {
        let index = context.attempt as usize % self.templates.len();
        self.templates[index].replace("{query}", original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(attempt: u32) -> RewriteContext<'static> {
        RewriteContext {
            attempt,
            candidates: &[],
        }
    }

    #[test]
    fn test_templates_rotate_by_attempt() {
        let rewriter = TemplateRewriter::default();

        assert_eq!(
            rewriter.rewrite("land mutation", &context(0)),
            "Detailed information about: land mutation"
        );
        assert_eq!(
            rewriter.rewrite("land mutation", &context(1)),
            "explain land mutation in detail"
        );
        assert_eq!(
            rewriter.rewrite("land mutation", &context(3)),
            "Detailed information about: land mutation"
        );
    }

    #[test]
    fn test_rewrites_from_original_query() {
        let rewriter = TemplateRewriter::new(vec!["more on {query}".to_string()]);

        assert_eq!(rewriter.rewrite("x", &context(5)), "more on x");
    }

    #[test]
    fn test_empty_template_list_uses_defaults() {
        let rewriter = TemplateRewriter::new(Vec::new());

        assert!(rewriter.rewrite("x", &context(2)).starts_with("what are"));
    }
}
