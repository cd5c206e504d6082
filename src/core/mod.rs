pub mod generator;
pub mod loader;
pub mod projector;

pub use generator::{FileOutcome, FileReport, RunSummary, SiteGenerator};
pub use loader::load;
pub use projector::{project, DocumentModel};
