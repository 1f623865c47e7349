//! Embedding seam.

use crate::error::Result;
use crate::model::document::DocumentChunk;

/// Turns text into vectors. Implementations typically batch their upstream
/// API calls and sleep between batches to respect rate limits; the
/// pipeline treats the call as one blocking operation either way.
pub trait Embedder {
    /// Fill the `embedding` field of every chunk, returning the chunks.
    fn embed(&self, chunks: Vec<DocumentChunk>) -> Result<Vec<DocumentChunk>>;

    /// Embed standalone query texts, one vector per input text.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
