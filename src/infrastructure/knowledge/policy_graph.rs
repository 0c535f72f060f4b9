//! In-memory knowledge graph linking policy documents through shared entities

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::knowledge::KnowledgeGraph;
use crate::domain::pipeline::Evidence;
use crate::domain::scoring::text::terms;
use crate::infrastructure::retrieval::CorpusDocument;

const MIN_ENTITY_CHARS: usize = 4;

/// Frequent policy boilerplate that would connect every document
const STOP_ENTITIES: [&str; 10] = [
    "requires",
    "managed",
    "department",
    "services",
    "includes",
    "under",
    "with",
    "from",
    "that",
    "this",
];

fn entities(text: &str) -> BTreeSet<String> {
    terms(text)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_ENTITY_CHARS && !STOP_ENTITIES.contains(&t.as_str()))
        .collect()
}

/// Bipartite graph of documents and the entities they mention.
///
/// A query reaches documents sharing an entity with it at hop 1, and documents
/// sharing an entity with those at hop 2 and beyond. Scores decay by half per hop.
#[derive(Debug, Default)]
pub struct PolicyGraph {
    documents: Vec<CorpusDocument>,
    document_entities: Vec<BTreeSet<String>>,
    entity_index: BTreeMap<String, Vec<usize>>,
}

impl PolicyGraph {
    pub fn new(documents: impl IntoIterator<Item = CorpusDocument>) -> Self {
        let mut graph = Self::default();
        for document in documents {
            graph.index(document);
        }
        graph
    }

    fn index(&mut self, document: CorpusDocument) {
        let position = self.documents.len();
        let document_entities = entities(&document.text);

        for entity in &document_entities {
            self.entity_index
                .entry(entity.clone())
                .or_default()
                .push(position);
        }

        self.document_entities.push(document_entities);
        self.documents.push(document);
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn neighbours<'a>(&self, frontier: impl Iterator<Item = &'a String>) -> BTreeSet<usize> {
        frontier
            .filter_map(|entity| self.entity_index.get(entity))
            .flatten()
            .copied()
            .collect()
    }
}

#[async_trait]
impl KnowledgeGraph for PolicyGraph {
    async fn query(&self, text: &str, max_hops: usize) -> Result<Vec<Evidence>, DomainError> {
        let seeds: BTreeSet<String> = entities(text)
            .into_iter()
            .filter(|e| self.entity_index.contains_key(e))
            .collect();

        if seeds.is_empty() || max_hops == 0 {
            return Ok(Vec::new());
        }

        let mut visited: HashSet<usize> = HashSet::new();
        let mut results: Vec<Evidence> = Vec::new();
        let mut frontier_entities = seeds.clone();

        for hop in 1..=max_hops {
            let reached: Vec<usize> = self
                .neighbours(frontier_entities.iter())
                .into_iter()
                .filter(|position| visited.insert(*position))
                .collect();

            if reached.is_empty() {
                break;
            }

            let decay = 0.5_f32.powi(hop as i32 - 1);
            let mut next_entities = BTreeSet::new();

            for position in reached {
                let document_entities = &self.document_entities[position];
                let shared: Vec<&String> = document_entities.intersection(&seeds).collect();
                let overlap = shared.len().max(1) as f32 / seeds.len() as f32;

                results.push(
                    self.documents[position]
                        .to_evidence((overlap * decay).min(1.0))
                        .with_metadata("hops", json!(hop))
                        .with_metadata("entities", json!(shared)),
                );
                next_entities.extend(document_entities.iter().cloned());
            }

            frontier_entities = next_entities;
        }

        results.sort_by(|a, b| {
            b.base_score
                .partial_cmp(&a.base_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            seeds = seeds.len(),
            max_hops,
            documents = results.len(),
            "Knowledge graph query"
        );

        Ok(results)
    }

    fn entity_count(&self) -> usize {
        self.entity_index.len()
    }
}
