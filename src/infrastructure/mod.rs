//! Infrastructure layer - Concrete collaborators, services and observability

pub mod backend;
pub mod completion;
pub mod extraction;
pub mod generation;
pub mod knowledge;
pub mod logging;
pub mod observability;
pub mod retrieval;
pub mod scoring;
pub mod services;
