//! Pipeline tests with fake collaborators: ingest batching, the
//! search-variant/input-count contract (violations must fail before any
//! network call), and search delegation.

mod common;

use common::{ok_response, StubServer};
use mochow::ai::{DefaultPipeline, DocProcessor, Embedder, Pipeline};
use mochow::model::{
    Bm25SearchRequest, CreateTableOptions, Document, DocumentChunk, Field, FieldType,
    HybridSearchRequest, Partition, Schema, SearchOptions, Table, VectorBatchSearchRequest,
    VectorSearchRequest, VectorTopkSearchRequest,
};
use mochow::{ClientConfiguration, Credentials, Error, MochowClient, NoRetryPolicy};
use serde_json::json;

/// Deterministic embedder: every text becomes [0.1, 0.2, 0.3].
struct FakeEmbedder;

impl Embedder for FakeEmbedder {
    fn embed(&self, mut chunks: Vec<DocumentChunk>) -> mochow::Result<Vec<DocumentChunk>> {
        for chunk in &mut chunks {
            chunk.embedding = Some(vec![0.1, 0.2, 0.3]);
        }
        Ok(chunks)
    }

    fn embed_texts(&self, texts: &[String]) -> mochow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
    }
}

/// Splits a document into a fixed number of fake chunks.
struct FakeProcessor {
    chunk_count: usize,
}

impl DocProcessor for FakeProcessor {
    fn process(&self, doc: &Document) -> mochow::Result<Vec<DocumentChunk>> {
        (0..self.chunk_count)
            .map(|i| {
                Ok(DocumentChunk::new(
                    doc.kb_id.clone().unwrap_or_else(|| "kb".to_string()),
                    doc.doc_id.clone(),
                    doc.doc_name.clone(),
                )?
                .content(format!("chunk {i}"))
                .sequence_number(i as u32))
            })
            .collect()
    }
}

fn ok() -> String {
    ok_response(r#"{"code":0,"msg":"success"}"#)
}

/// Stub enough of the server to hand back a pair of table handles: one
/// create_database plus two create_table calls.
fn tables_for(server: &StubServer) -> (MochowClient, Table, Table) {
    let config = ClientConfiguration::new(Credentials::new("root", "secret"), &server.endpoint)
        .with_retry_policy(NoRetryPolicy);
    let client = MochowClient::new(config).expect("client");
    let db = client.create_database("kb", None).expect("create db");
    let schema = Schema::new(
        vec![Field::new("id", FieldType::String).primary_key().not_null()],
        vec![],
    );
    let meta = db
        .create_table(
            "meta",
            1,
            Partition::new(1),
            schema.clone(),
            &CreateTableOptions::default(),
        )
        .expect("meta table");
    let chunks = db
        .create_table(
            "chunks",
            1,
            Partition::new(1),
            schema,
            &CreateTableOptions::default(),
        )
        .expect("chunk table");
    (client, meta, chunks)
}

#[test]
fn test_ingest_batches_chunk_inserts() {
    // 3 setup requests + 1 meta insert + ceil(250/100) = 3 chunk inserts.
    let server = StubServer::start((0..7).map(|_| ok()).collect());
    let (_client, meta_table, chunk_table) = tables_for(&server);

    let doc = Document::new("test/doc.txt").expect("doc").kb_id("kb-1");
    let pipeline = DefaultPipeline::default();
    pipeline
        .ingest_doc(
            &doc,
            &FakeProcessor { chunk_count: 250 },
            &FakeEmbedder,
            &meta_table,
            None,
            &chunk_table,
            None,
        )
        .expect("ingest");

    let requests = server.finish();
    assert_eq!(requests.len(), 7);

    let row_requests: Vec<&String> = requests
        .iter()
        .filter(|request| request.starts_with("POST /v1/row?insert"))
        .collect();
    assert_eq!(row_requests.len(), 4);

    let batch_sizes: Vec<usize> = row_requests
        .iter()
        .map(|request| {
            let body = request.split("\r\n\r\n").nth(1).expect("body");
            let json: serde_json::Value = serde_json::from_str(body).expect("json body");
            json["rows"].as_array().expect("rows").len()
        })
        .collect();
    // One metadata row, then 100/100/50 chunk rows.
    assert_eq!(batch_sizes, vec![1, 100, 100, 50]);

    // Chunk rows carry the fake embedding.
    let last_body = row_requests[3].split("\r\n\r\n").nth(1).expect("body");
    let json: serde_json::Value = serde_json::from_str(last_body).expect("json");
    assert_eq!(
        json["rows"][0]["embedding"],
        json!([0.1, 0.2, 0.3]),
        "chunk row missing embedding"
    );
}

#[test]
fn test_single_text_against_batch_request_fails_before_network() {
    let server = StubServer::start((0..3).map(|_| ok()).collect());
    let (_client, table, _chunks) = tables_for(&server);
    let setup_requests = server.requests_so_far().len();

    let pipeline = DefaultPipeline::default();
    let err = pipeline
        .vector_search(
            &["one text".to_string()],
            &FakeEmbedder,
            &table,
            VectorSearchRequest::Batch(VectorBatchSearchRequest::new("vector")),
            &SearchOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::Client(_)));
    // No request beyond the setup calls was issued.
    assert_eq!(server.requests_so_far().len(), setup_requests);
}

#[test]
fn test_multiple_texts_against_topk_request_fails_before_network() {
    let server = StubServer::start((0..3).map(|_| ok()).collect());
    let (_client, table, _chunks) = tables_for(&server);
    let setup_requests = server.requests_so_far().len();

    let pipeline = DefaultPipeline::default();
    let err = pipeline
        .vector_search(
            &["text one".to_string(), "text two".to_string()],
            &FakeEmbedder,
            &table,
            VectorSearchRequest::Topk(VectorTopkSearchRequest::new("vector")),
            &SearchOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::Client(_)));
    assert_eq!(server.requests_so_far().len(), setup_requests);
}

#[test]
fn test_empty_search_contents_is_client_error() {
    let server = StubServer::start((0..3).map(|_| ok()).collect());
    let (_client, table, _chunks) = tables_for(&server);

    let pipeline = DefaultPipeline::default();
    let err = pipeline
        .vector_search(
            &[],
            &FakeEmbedder,
            &table,
            VectorSearchRequest::Topk(VectorTopkSearchRequest::new("vector")),
            &SearchOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Client(_)));
}

#[test]
fn test_single_text_vector_search_attaches_embedding() {
    let search_result = json!({
        "code": 0,
        "msg": "success",
        "rows": [{"row": {"id": "doc-1"}, "distance": 0.12}]
    });
    let mut responses: Vec<String> = (0..3).map(|_| ok()).collect();
    responses.push(ok_response(&search_result.to_string()));
    let server = StubServer::start(responses);
    let (_client, table, _chunks) = tables_for(&server);

    let pipeline = DefaultPipeline::default();
    let response = pipeline
        .vector_search(
            &["the query".to_string()],
            &FakeEmbedder,
            &table,
            VectorSearchRequest::Topk(VectorTopkSearchRequest::new("vector").limit(5)),
            &SearchOptions::default(),
        )
        .expect("search");

    assert_eq!(response.rows.len(), 1);
    assert_eq!(response.rows[0].distance, Some(0.12));

    let requests = server.finish();
    let search_request = requests.last().expect("search request");
    assert!(search_request.starts_with("POST /v1/row?search"));
    let body = search_request.split("\r\n\r\n").nth(1).expect("body");
    let json: serde_json::Value = serde_json::from_str(body).expect("json");
    assert_eq!(json["anns"]["vectorFloats"], json!([0.1, 0.2, 0.3]));
    assert_eq!(json["anns"]["params"]["limit"], 5);
}

#[test]
fn test_multi_text_search_uses_batch_discriminator() {
    let mut responses: Vec<String> = (0..3).map(|_| ok()).collect();
    responses.push(ok_response(r#"{"code":0,"msg":"success","results":[]}"#));
    let server = StubServer::start(responses);
    let (_client, table, _chunks) = tables_for(&server);

    let pipeline = DefaultPipeline::default();
    pipeline
        .vector_search(
            &["text one".to_string(), "text two".to_string()],
            &FakeEmbedder,
            &table,
            VectorSearchRequest::Batch(VectorBatchSearchRequest::new("vector").limit(3)),
            &SearchOptions::default(),
        )
        .expect("batch search");

    let requests = server.finish();
    let search_request = requests.last().expect("search request");
    assert!(
        search_request.starts_with("POST /v1/row?batchSearch"),
        "unexpected request line: {search_request}"
    );
}

#[test]
fn test_bm25_search_passes_through() {
    let mut responses: Vec<String> = (0..3).map(|_| ok()).collect();
    responses.push(ok_response(
        r#"{"code":0,"msg":"success","rows":[{"row":{"id":"doc-9"},"score":3.5}]}"#,
    ));
    let server = StubServer::start(responses);
    let (_client, table, _chunks) = tables_for(&server);

    let pipeline = DefaultPipeline::default();
    let response = pipeline
        .bm25_search(
            &table,
            &Bm25SearchRequest::new("text_idx", "vector database").limit(10),
            &SearchOptions::default(),
        )
        .expect("bm25");

    assert_eq!(response.rows[0].score, Some(3.5));
    let requests = server.finish();
    let body = requests
        .last()
        .expect("request")
        .split("\r\n\r\n")
        .nth(1)
        .expect("body")
        .to_string();
    let json: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["BM25SearchParams"]["indexName"], "text_idx");
    assert_eq!(json["BM25SearchParams"]["searchText"], "vector database");
    assert_eq!(json["limit"], 10);
}

#[test]
fn test_hybrid_search_through_pipeline() {
    let mut responses: Vec<String> = (0..3).map(|_| ok()).collect();
    responses.push(ok_response(r#"{"code":0,"msg":"success","rows":[]}"#));
    let server = StubServer::start(responses);
    let (_client, table, _chunks) = tables_for(&server);

    let pipeline = DefaultPipeline::default();
    let request = HybridSearchRequest::new(
        VectorTopkSearchRequest::new("vector"),
        Bm25SearchRequest::new("text_idx", "query"),
        0.4,
        0.6,
    )
    .limit(15);
    pipeline
        .hybrid_search(
            &["the query".to_string()],
            &FakeEmbedder,
            &table,
            request,
            &SearchOptions::default(),
        )
        .expect("hybrid");

    let requests = server.finish();
    let body = requests
        .last()
        .expect("request")
        .split("\r\n\r\n")
        .nth(1)
        .expect("body")
        .to_string();
    let json: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["anns"]["weight"], 0.4);
    assert_eq!(json["anns"]["vectorFloats"], json!([0.1, 0.2, 0.3]));
    assert_eq!(json["BM25SearchParams"]["weight"], 0.6);
    assert_eq!(json["limit"], 15);
}
