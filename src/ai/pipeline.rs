//! Ingestion and search pipeline.

use std::collections::HashMap;

use tracing::debug;

use crate::ai::embedder::Embedder;
use crate::ai::processor::DocProcessor;
use crate::error::{Error, Result};
use crate::model::document::Document;
use crate::model::search::{
    Bm25SearchRequest, FloatVector, HybridSearchRequest, VectorSearchRequest,
};
use crate::model::table::{SearchOptions, SearchResponse, Table};
use crate::model::value::Row;

/// Ingests documents into a metadata + chunk table pair and runs searches
/// over them.
pub trait Pipeline {
    /// Write one metadata row for the document, then process it into
    /// chunks, embed them, and insert the chunk rows.
    fn ingest_doc(
        &self,
        doc: &Document,
        doc_processor: &dyn DocProcessor,
        embedder: &dyn Embedder,
        meta_table: &Table,
        doc_to_row_mapping: Option<&HashMap<String, String>>,
        chunk_table: &Table,
        chunk_to_row_mapping: Option<&HashMap<String, String>>,
    ) -> Result<()>;

    /// Embed the query text(s), attach the vectors to the request, and run
    /// the vector search.
    fn vector_search(
        &self,
        search_contents: &[String],
        embedder: &dyn Embedder,
        table: &Table,
        request: VectorSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;

    /// Run the text search as-is.
    fn bm25_search(
        &self,
        table: &Table,
        request: &Bm25SearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;

    /// Embed the query text(s), attach the vectors to the vector branch,
    /// and run the hybrid search.
    fn hybrid_search(
        &self,
        search_contents: &[String],
        embedder: &dyn Embedder,
        table: &Table,
        request: HybridSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;
}

/// Default pipeline. Chunk rows are inserted in fixed-size batches purely
/// to bound request payload size — there is no transactional grouping and
/// no rollback of earlier batches on failure.
#[derive(Debug, Clone, Copy)]
pub struct DefaultPipeline {
    batch_size: usize,
}

impl DefaultPipeline {
    pub fn new(batch_size: usize) -> Self {
        DefaultPipeline { batch_size }
    }
}

impl Default for DefaultPipeline {
    fn default() -> Self {
        DefaultPipeline { batch_size: 100 }
    }
}

/// Attach embeddings to the request, enforcing the variant/input-count
/// contract before any network call: one text requires a Topk or Range
/// request, several texts require a Batch request.
fn attach_vectors(
    mut request: VectorSearchRequest,
    embeddings: Vec<Vec<f32>>,
) -> Result<VectorSearchRequest> {
    if embeddings.len() == 1 {
        match &mut request {
            VectorSearchRequest::Topk(topk) => {
                topk.vector = embeddings.into_iter().next().map(FloatVector);
            }
            VectorSearchRequest::Range(range) => {
                range.vector = embeddings.into_iter().next().map(FloatVector);
            }
            VectorSearchRequest::Batch(_) => {
                return Err(Error::client(
                    "for a single search content, the request must be \
                     VectorTopkSearchRequest or VectorRangeSearchRequest",
                ));
            }
        }
    } else {
        match &mut request {
            VectorSearchRequest::Batch(batch) => {
                batch.vectors = embeddings.into_iter().map(FloatVector).collect();
            }
            _ => {
                return Err(Error::client(
                    "for multiple search contents, the request must be VectorBatchSearchRequest",
                ));
            }
        }
    }
    Ok(request)
}

fn embed_contents(search_contents: &[String], embedder: &dyn Embedder) -> Result<Vec<Vec<f32>>> {
    if search_contents.is_empty() {
        return Err(Error::client("search_contents must not be empty"));
    }
    let embeddings = embedder.embed_texts(search_contents)?;
    if embeddings.len() != search_contents.len() {
        return Err(Error::client(format!(
            "embedder returned {} vectors for {} texts",
            embeddings.len(),
            search_contents.len()
        )));
    }
    Ok(embeddings)
}

impl Pipeline for DefaultPipeline {
    fn ingest_doc(
        &self,
        doc: &Document,
        doc_processor: &dyn DocProcessor,
        embedder: &dyn Embedder,
        meta_table: &Table,
        doc_to_row_mapping: Option<&HashMap<String, String>>,
        chunk_table: &Table,
        chunk_to_row_mapping: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        meta_table.insert(&[doc.to_row(doc_to_row_mapping)], None)?;

        let chunks = embedder.embed(doc_processor.process(doc)?)?;
        let rows: Vec<Row> = chunks
            .iter()
            .map(|chunk| chunk.to_row(chunk_to_row_mapping))
            .collect();
        debug!(
            doc_name = %doc.doc_name,
            chunks = rows.len(),
            batch_size = self.batch_size,
            "ingesting chunks"
        );
        for batch in rows.chunks(self.batch_size) {
            chunk_table.insert(batch, None)?;
        }
        Ok(())
    }

    fn vector_search(
        &self,
        search_contents: &[String],
        embedder: &dyn Embedder,
        table: &Table,
        request: VectorSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let embeddings = embed_contents(search_contents, embedder)?;
        let request = attach_vectors(request, embeddings)?;
        table.vector_search(&request, options)
    }

    fn bm25_search(
        &self,
        table: &Table,
        request: &Bm25SearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        table.bm25_search(request, options)
    }

    fn hybrid_search(
        &self,
        search_contents: &[String],
        embedder: &dyn Embedder,
        table: &Table,
        mut request: HybridSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let embeddings = embed_contents(search_contents, embedder)?;
        request.vector_request = attach_vectors(request.vector_request, embeddings)?;
        table.hybrid_search(&request, options)
    }
}
