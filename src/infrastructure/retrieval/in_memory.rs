//! Keyword-overlap retriever over an in-memory corpus

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::corpus::CorpusDocument;
use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, RetrievalRequest, Retriever};
use crate::domain::scoring::text::terms;

#[derive(Debug)]
struct IndexedDocument {
    document: CorpusDocument,
    terms: HashSet<String>,
}

/// Ranks documents by the share of query terms they contain
#[derive(Debug, Default)]
pub struct InMemoryRetriever {
    documents: Vec<IndexedDocument>,
}

impl InMemoryRetriever {
    pub fn new(documents: impl IntoIterator<Item = CorpusDocument>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| IndexedDocument {
                terms: terms(&document.text),
                document,
            })
            .collect();

        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Evidence>, DomainError> {
        let query_terms = terms(&request.query);
        if query_terms.is_empty() || request.top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &CorpusDocument)> = self
            .documents
            .iter()
            .filter_map(|indexed| {
                let shared = query_terms.intersection(&indexed.terms).count();
                (shared > 0).then(|| {
                    (
                        shared as f32 / query_terms.len() as f32,
                        &indexed.document,
                    )
                })
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(request.top_k);

        debug!(
            query = %request.query,
            attempt = request.attempt,
            hits = scored.len(),
            "In-memory retrieval"
        );

        Ok(scored
            .into_iter()
            .map(|(score, document)| document.to_evidence(score))
            .collect())
    }
}
