//! Ingestion and search orchestration over pluggable collaborators.
//!
//! The document processor and embedder are external components consumed
//! through narrow traits; the pipeline composes them with table handles.
//! Only the local filesystem document hub ships with the SDK — object
//! storage hubs implement the same trait elsewhere.

pub mod dochub;
pub mod embedder;
pub mod pipeline;
pub mod processor;

pub use dochub::{DocumentHub, DocumentHubEnv, LocalDocumentHub};
pub use embedder::Embedder;
pub use pipeline::{DefaultPipeline, Pipeline};
pub use processor::DocProcessor;
