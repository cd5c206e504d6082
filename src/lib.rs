pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod knowledge_graph;
pub mod templates;
pub mod utils;

pub use config::SiteConfig;
pub use core::{DocumentModel, RunSummary, SiteGenerator};
pub use error::DocError;
pub use knowledge_graph::OntologyGraph;
pub use templates::PageRenderer;
