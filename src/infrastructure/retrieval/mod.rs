//! Reference corpus and retrievers

mod corpus;
mod in_memory;

pub use corpus::{CorpusDocument, builtin_policies, load_corpus};
pub use in_memory::InMemoryRetriever;
