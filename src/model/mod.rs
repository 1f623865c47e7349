//! Typed resource model: wire enums, row values, table schema, search
//! requests, and the database/table handles that issue the actual calls.

pub mod database;
pub mod document;
pub mod enums;
pub mod schema;
pub mod search;
pub mod table;
pub mod value;

pub use database::{CreateTableOptions, Database};
pub use document::{Document, DocumentChunk, DocumentLayout, Lang};
pub use enums::{
    AutoBuildPolicyType, FieldType, IndexState, IndexType, InvertedIndexAnalyzer,
    InvertedIndexParseMode, MetricType, PartitionType, ReadConsistency, RequestType, TableState,
};
pub use schema::{
    AutoBuildPolicy, Field, HnswParams, HnswPqParams, Index, InvertedIndex, InvertedIndexParams,
    PuckParams, Schema, SecondaryIndex, VectorIndex, VectorIndexParams,
};
pub use search::{
    Bm25SearchRequest, FloatVector, HybridSearchRequest, SearchRequest, VectorBatchSearchRequest,
    VectorRangeSearchRequest, VectorSearchConfig, VectorSearchRequest, VectorTopkSearchRequest,
};
pub use table::{
    BatchQueryKey, BatchQueryOptions, BatchSearchGroup, DeleteOptions, OpResponse, Partition,
    QueryOptions, QueryResponse, SearchOptions, SearchResponse, SearchResultRow, SelectOptions,
    SelectResponse, Table, TableStats, UpdateOptions,
};
pub use value::{Row, Value};
