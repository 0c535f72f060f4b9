//! Document classification specialization
//!
//! Keyword routing against a fixed category table, policy knowledge-graph
//! retrieval graded by category support, and a validator that cross-checks the
//! generated category against an independent keyword classification.

mod category;
mod config;
mod generator;
mod grader;
mod result;
mod retrieval;
mod router;
mod validator;

pub use category::{Category, CategoryLabel, best_category};
pub use config::ClassificationConfig;
pub use generator::{CategoryGenerator, ranked_categories};
pub use grader::{CATEGORY_METADATA_KEY, CategoryGrader};
pub use result::{ClassificationMetadata, ClassificationResult, ClassificationTag};
pub use retrieval::{GraphRetriever, WindowRewriter, char_window};
pub use router::CategoryRouter;
pub use validator::CategoryValidator;
