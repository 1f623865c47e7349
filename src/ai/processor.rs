//! Document processing seam.

use crate::error::Result;
use crate::model::document::{Document, DocumentChunk};

/// Parses a document and splits it into chunks. Implementations wrap
/// whatever parsing/splitting stack the application uses; the pipeline
/// only needs the chunks.
pub trait DocProcessor {
    fn process(&self, doc: &Document) -> Result<Vec<DocumentChunk>>;
}
