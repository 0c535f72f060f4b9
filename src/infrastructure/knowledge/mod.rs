//! Knowledge graph implementations

mod policy_graph;

pub use policy_graph::PolicyGraph;
