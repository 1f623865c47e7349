//! Wire-format tests: the exact JSON shapes of schema, table, and search
//! requests, including the round-trip through a described table.

mod common;

use common::{ok_response, StubServer};
use mochow::model::{
    Bm25SearchRequest, Field, FieldType, HnswParams, HybridSearchRequest, MetricType, Partition,
    Row, Schema, SearchRequest, SecondaryIndex, TableState, Value, VectorIndex,
    VectorTopkSearchRequest,
};
use mochow::{ClientConfiguration, Credentials, Error, MochowClient, NoRetryPolicy};
use serde_json::json;

fn client_for(endpoint: &str) -> MochowClient {
    let config = ClientConfiguration::new(Credentials::new("root", "secret"), endpoint)
        .with_retry_policy(NoRetryPolicy);
    MochowClient::new(config).expect("client")
}

fn book_table_description() -> serde_json::Value {
    json!({
        "database": "book",
        "table": "vectors",
        "description": "vector store",
        "replication": 3,
        "partition": {"partitionType": "HASH", "partitionNum": 10},
        "enableDynamicField": false,
        "schema": {
            "fields": [
                {"fieldName": "id", "fieldType": "STRING", "primaryKey": true,
                 "partitionKey": true, "notNull": true},
                {"fieldName": "year", "fieldType": "UINT32"},
                {"fieldName": "vector", "fieldType": "FLOAT_VECTOR", "notNull": true,
                 "dimension": 3}
            ],
            "indexes": [
                {"indexName": "vector_idx", "indexType": "HNSW", "field": "vector",
                 "metricType": "L2", "params": {"M": 32, "efConstruction": 200},
                 "autoBuild": true},
                {"indexName": "year_idx", "indexType": "SECONDARY", "field": "year"}
            ]
        },
        "aliases": ["latest"],
        "createTime": "2024-06-01T12:00:00Z",
        "state": "NORMAL"
    })
}

#[test]
fn test_describe_table_roundtrips_description() {
    let description = book_table_description();
    let body = json!({"code": 0, "msg": "success", "table": description});
    let server = StubServer::start(vec![
        ok_response(&json!({"code": 0, "msg": "success", "databases": ["book"]}).to_string()),
        ok_response(&body.to_string()),
    ]);
    let client = client_for(&server.endpoint);

    let db = client.database("book", None).expect("database");
    let table = db.describe_table("vectors", None).expect("describe");

    assert_eq!(table.database_name(), "book");
    assert_eq!(table.table_name(), "vectors");
    assert_eq!(table.replication, 3);
    assert_eq!(table.partition, Partition::new(10));
    assert_eq!(table.schema.fields.len(), 3);
    assert_eq!(table.schema.indexes.len(), 2);
    assert_eq!(table.description, "vector store");
    assert_eq!(table.create_time.as_deref(), Some("2024-06-01T12:00:00Z"));
    assert_eq!(table.state, Some(TableState::Normal));
    assert_eq!(table.aliases, vec!["latest"]);

    // Encoding the described table reproduces the server's JSON
    // field-for-field, server-populated fields included.
    let encoded = table.to_value().expect("encode");
    assert_eq!(encoded, description);
    server.finish();
}

#[test]
fn test_describe_index_unknown_tag_is_client_error() {
    let ok = json!({"code": 0, "msg": "success"});
    let desc = json!({
        "code": 0,
        "msg": "success",
        "index": {"indexName": "x", "indexType": "IVF_PQ", "field": "vector"}
    });
    let server = StubServer::start(vec![
        ok_response(&ok.to_string()),
        ok_response(&ok.to_string()),
        ok_response(&desc.to_string()),
    ]);
    let client = client_for(&server.endpoint);

    let db = client.create_database("book", None).expect("create db");
    let table = db
        .create_table(
            "vectors",
            1,
            Partition::new(1),
            minimal_schema(),
            &Default::default(),
        )
        .expect("create table");
    let err = table.describe_index("x", None).unwrap_err();
    assert!(matches!(err, Error::Client(message) if message.contains("IVF_PQ")));
    server.finish();
}

fn minimal_schema() -> Schema {
    Schema::new(
        vec![Field::new("id", FieldType::String).primary_key().not_null()],
        vec![],
    )
}

#[test]
fn test_hybrid_rendering_weights_and_global_limit() {
    // Vector branch weight 0.4, BM25 branch weight 0.6, top-level
    // limit 15: both weights land in their blocks and the single limit
    // sits at top level only.
    let vector = VectorTopkSearchRequest::new("vector").vector(vec![0.1_f32, 0.2]);
    let bm25 = Bm25SearchRequest::new("text_idx", "relativity");
    let request = HybridSearchRequest::new(vector, bm25, 0.4, 0.6).limit(15);

    let body = request.to_body().expect("render");
    assert_eq!(body["anns"]["weight"], 0.4);
    assert_eq!(body["BM25SearchParams"]["weight"], 0.6);
    assert_eq!(body["limit"], 15);
    assert!(body["anns"].get("limit").is_none());
    assert!(body["BM25SearchParams"].get("limit").is_none());
}

#[test]
fn test_schema_decode_defaults_optional_flags() {
    let schema: Schema = serde_json::from_value(json!({
        "fields": [{"fieldName": "year", "fieldType": "UINT32"}],
        "indexes": []
    }))
    .expect("decode");
    let field = &schema.fields[0];
    assert!(!field.primary_key);
    assert!(!field.partition_key);
    assert!(!field.not_null);
    assert_eq!(field.dimension, 0);
}

#[test]
fn test_vector_index_encode_decode_equality() {
    let index: mochow::model::Index = VectorIndex::hnsw(
        "vector_idx",
        "vector",
        MetricType::Cosine,
        HnswParams::new(16, 100),
    )
    .into();
    let encoded = index.to_value().expect("encode");
    let decoded = mochow::model::Index::from_value(&encoded).expect("decode");
    assert_eq!(decoded, index);

    let index: mochow::model::Index = SecondaryIndex::new("year_idx", "year").into();
    let encoded = index.to_value().expect("encode");
    assert_eq!(
        encoded,
        json!({"indexName": "year_idx", "indexType": "SECONDARY", "field": "year"})
    );
}

#[test]
fn test_row_wire_shapes() {
    let row = Row::new()
        .with_field("id", "doc-1")
        .with_field("stock", 120)
        .with_field("score", 0.95)
        .with_field("available", true)
        .with_field("vector", vec![0.5_f32, 1.0]);
    let encoded = serde_json::to_value(&row).expect("encode");
    assert_eq!(
        encoded,
        json!({
            "id": "doc-1",
            "stock": 120,
            "score": 0.95,
            "available": true,
            "vector": [0.5, 1.0]
        })
    );

    let decoded: Row = serde_json::from_value(encoded).expect("decode");
    assert_eq!(decoded.get("vector"), Some(&Value::FloatVector(vec![0.5, 1.0])));
    assert_eq!(decoded, row);
}
