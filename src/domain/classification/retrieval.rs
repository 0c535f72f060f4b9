//! Policy knowledge retrieval for classification

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::knowledge::KnowledgeGraph;
use crate::domain::pipeline::{
    Evidence, QueryRewriter, RetrievalRequest, Retriever, RewriteContext,
};

/// First `max_chars` characters of `text`
pub fn char_window(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Queries the knowledge graph with a window of the document text
#[derive(Debug, Clone)]
pub struct GraphRetriever {
    graph: Arc<dyn KnowledgeGraph>,
    window_chars: usize,
    max_hops: usize,
}

impl GraphRetriever {
    pub fn new(graph: Arc<dyn KnowledgeGraph>, window_chars: usize, max_hops: usize) -> Self {
        Self {
            graph,
            window_chars,
            max_hops,
        }
    }
}

#[async_trait]
impl Retriever for GraphRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Evidence>, DomainError> {
        let window = char_window(&request.query, self.window_chars);
        let mut documents = self.graph.query(window, self.max_hops).await?;
        documents.truncate(request.top_k);
        Ok(documents)
    }
}

/// Slides the document window forward on every failed attempt
#[derive(Debug, Clone)]
pub struct WindowRewriter {
    window_chars: usize,
}

impl WindowRewriter {
    pub fn new(window_chars: usize) -> Self {
        Self {
            window_chars: window_chars.max(1),
        }
    }
}

impl QueryRewriter for WindowRewriter {
    fn rewrite(&self, original: &str, context: &RewriteContext<'_>) -> String {
        let offset = (context.attempt as usize + 1) * self.window_chars;

        match original.char_indices().nth(offset) {
            Some((start, _)) => original[start..].to_string(),
            // Document shorter than the next window: keep searching with all of it
            None => original.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::mock::MockKnowledgeGraph;

    #[test]
    fn test_char_window_respects_char_boundaries() {
        assert_eq!(char_window("héllo", 2), "hé");
        assert_eq!(char_window("abc", 10), "abc");
    }

    #[test]
    fn test_window_slides_forward() {
        let rewriter = WindowRewriter::new(3);
        let context = RewriteContext {
            attempt: 0,
            candidates: &[],
        };

        assert_eq!(rewriter.rewrite("abcdefgh", &context), "defgh");

        let context = RewriteContext {
            attempt: 5,
            candidates: &[],
        };
        assert_eq!(rewriter.rewrite("abcdefgh", &context), "abcdefgh");
    }

    #[tokio::test]
    async fn test_retriever_truncates_to_top_k() {
        let graph = MockKnowledgeGraph::new(vec![
            Evidence::new("p1", "one", 1.0),
            Evidence::new("p2", "two", 0.5),
        ]);
        let retriever = GraphRetriever::new(Arc::new(graph), 500, 2);

        let documents = retriever
            .retrieve(&RetrievalRequest::new("land survey", 1))
            .await
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "p1");
    }
}
