//! Wire enums. Every serialized tag matches the service's string value
//! byte-for-byte.

use serde::{Deserialize, Serialize};

/// Distance metric of a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    L2,
    IP,
    #[serde(rename = "COSINE")]
    Cosine,
}

/// Index type tag reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    // Vector index types
    #[serde(rename = "HNSW")]
    Hnsw,
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "PUCK")]
    Puck,
    #[serde(rename = "HNSWPQ")]
    HnswPq,

    // Scalar index types
    #[serde(rename = "SECONDARY")]
    Secondary,
    #[serde(rename = "INVERTED")]
    Inverted,
}

impl IndexType {
    pub fn is_vector_index(self) -> bool {
        matches!(
            self,
            IndexType::Hnsw | IndexType::Flat | IndexType::Puck | IndexType::HnswPq
        )
    }
}

/// Column type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    // Scalar field types
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    Date,
    Datetime,
    Timestamp,
    String,
    Binary,
    Uuid,
    Text,
    #[serde(rename = "TEXT_GBK")]
    TextGbk,
    #[serde(rename = "TEXT_GB18030")]
    TextGb18030,

    // Vector field types
    #[serde(rename = "FLOAT_VECTOR")]
    FloatVector,
}

/// Partition scheme of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionType {
    Hash,
}

/// Server-driven table lifecycle: CREATING -> NORMAL -> DELETING. The
/// client only polls; waiting for NORMAL is a caller-level describe loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableState {
    Creating,
    Normal,
    Deleting,
}

/// Server-driven index lifecycle: BUILDING -> NORMAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexState {
    Building,
    Normal,
}

/// Read consistency carried on read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadConsistency {
    #[default]
    Eventual,
    Strong,
}

/// Trigger policy for automatic vector index builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoBuildPolicyType {
    #[serde(rename = "TIMING")]
    Timing,
    #[serde(rename = "PERIODICAL")]
    Periodical,
    #[serde(rename = "ROW_COUNT_INCREMENT")]
    RowCountIncrement,
}

/// Analyzer of an inverted (text) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvertedIndexAnalyzer {
    #[serde(rename = "DEFAULT_ANALYZER")]
    Default,
    #[serde(rename = "ENGLISH_ANALYZER")]
    English,
    #[serde(rename = "CHINESE_ANALYZER")]
    Chinese,
}

/// Parse mode of an inverted (text) index analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvertedIndexParseMode {
    #[serde(rename = "COARSE_MODE")]
    Coarse,
    #[serde(rename = "FINE_MODE")]
    Fine,
}

/// Operation discriminator, sent as an empty-valued query parameter
/// (`?insert`, `?upsert`, ...) — never as a body field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Insert,
    Upsert,
    Query,
    BatchQuery,
    Search,
    BatchSearch,
    Delete,
    Update,
    Select,
    AddField,
    Create,
    Modify,
    Rebuild,
    Desc,
    Stats,
    List,
}

impl RequestType {
    /// Exact query-key text on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Insert => "insert",
            RequestType::Upsert => "upsert",
            RequestType::Query => "query",
            RequestType::BatchQuery => "batchQuery",
            RequestType::Search => "search",
            RequestType::BatchSearch => "batchSearch",
            RequestType::Delete => "delete",
            RequestType::Update => "update",
            RequestType::Select => "select",
            RequestType::AddField => "addField",
            RequestType::Create => "create",
            RequestType::Modify => "modify",
            RequestType::Rebuild => "rebuild",
            RequestType::Desc => "desc",
            RequestType::Stats => "stats",
            RequestType::List => "list",
        }
    }
}
