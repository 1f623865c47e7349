//! Table schema: field descriptors and index descriptors.
//!
//! Exactly the fields and indexes declared are sent; the client validates
//! presence only — shape checking is the server's job. Optional flags are
//! omitted from the wire when unset, which is what makes an encode/decode
//! round-trip field-for-field stable.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::enums::{
    AutoBuildPolicyType, FieldType, IndexState, IndexType, InvertedIndexAnalyzer,
    InvertedIndexParseMode, MetricType,
};

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn is_zero(dimension: &u32) -> bool {
    *dimension == 0
}

fn default_true() -> bool {
    true
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub partition_key: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_null: bool,
    /// Vector dimension; 0 for scalar fields.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dimension: u32,
}

impl Field {
    pub fn new(field_name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            field_name: field_name.into(),
            field_type,
            primary_key: false,
            partition_key: false,
            auto_increment: false,
            not_null: false,
            dimension: 0,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn partition_key(mut self) -> Self {
        self.partition_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn dimension(mut self, dimension: u32) -> Self {
        self.dimension = dimension;
        self
    }
}

/// HNSW build parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswParams {
    #[serde(rename = "M")]
    pub m: u32,
    #[serde(rename = "efConstruction")]
    pub ef_construction: u32,
}

impl HnswParams {
    pub fn new(m: u32, ef_construction: u32) -> Self {
        HnswParams { m, ef_construction }
    }
}

/// HNSWPQ build parameters (HNSW plus product quantization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswPqParams {
    #[serde(rename = "M")]
    pub m: u32,
    #[serde(rename = "efConstruction")]
    pub ef_construction: u32,
    #[serde(rename = "NSQ")]
    pub nsq: u32,
    #[serde(rename = "sampleRate")]
    pub sample_rate: f64,
}

impl HnswPqParams {
    pub fn new(m: u32, ef_construction: u32, nsq: u32, sample_rate: f64) -> Self {
        HnswPqParams {
            m,
            ef_construction,
            nsq,
            sample_rate,
        }
    }
}

/// PUCK build parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuckParams {
    pub coarse_cluster_count: u32,
    pub fine_cluster_count: u32,
}

impl PuckParams {
    pub fn new(coarse_cluster_count: u32, fine_cluster_count: u32) -> Self {
        PuckParams {
            coarse_cluster_count,
            fine_cluster_count,
        }
    }
}

/// Algorithm-specific build parameters of a vector index.
///
/// Untagged on the wire; decode order matters because `HnswPqParams` is a
/// superset of `HnswParams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorIndexParams {
    HnswPq(HnswPqParams),
    Puck(PuckParams),
    Hnsw(HnswParams),
}

/// Trigger policy for automatic index rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoBuildPolicy {
    pub policy_type: AutoBuildPolicyType,
    /// Cron-like build timestamp, TIMING policy only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(
        rename = "periodInSecond",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub period_in_second: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count_increment: Option<u64>,
}

impl AutoBuildPolicy {
    pub fn timing(timing: impl Into<String>) -> Self {
        AutoBuildPolicy {
            policy_type: AutoBuildPolicyType::Timing,
            timing: Some(timing.into()),
            period_in_second: None,
            row_count_increment: None,
        }
    }

    pub fn periodical(period_in_second: u64) -> Self {
        AutoBuildPolicy {
            policy_type: AutoBuildPolicyType::Periodical,
            timing: None,
            period_in_second: Some(period_in_second),
            row_count_increment: None,
        }
    }

    pub fn row_count_increment(row_count_increment: u64) -> Self {
        AutoBuildPolicy {
            policy_type: AutoBuildPolicyType::RowCountIncrement,
            timing: None,
            period_in_second: None,
            row_count_increment: Some(row_count_increment),
        }
    }
}

/// A vector (ANN) index over one FLOAT_VECTOR field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndex {
    pub index_name: String,
    pub index_type: IndexType,
    pub field: String,
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<VectorIndexParams>,
    /// Always on the wire, matching the create-index body the service
    /// expects.
    #[serde(default = "default_true")]
    pub auto_build: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_build_policy: Option<AutoBuildPolicy>,
    /// Server-populated build state; decode-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IndexState>,
}

impl VectorIndex {
    pub fn hnsw(
        index_name: impl Into<String>,
        field: impl Into<String>,
        metric_type: MetricType,
        params: HnswParams,
    ) -> Self {
        Self::vector(index_name, IndexType::Hnsw, field, metric_type).params(
            VectorIndexParams::Hnsw(params),
        )
    }

    pub fn hnswpq(
        index_name: impl Into<String>,
        field: impl Into<String>,
        metric_type: MetricType,
        params: HnswPqParams,
    ) -> Self {
        Self::vector(index_name, IndexType::HnswPq, field, metric_type).params(
            VectorIndexParams::HnswPq(params),
        )
    }

    pub fn puck(
        index_name: impl Into<String>,
        field: impl Into<String>,
        metric_type: MetricType,
        params: PuckParams,
    ) -> Self {
        Self::vector(index_name, IndexType::Puck, field, metric_type).params(
            VectorIndexParams::Puck(params),
        )
    }

    /// FLAT carries no build parameters.
    pub fn flat(
        index_name: impl Into<String>,
        field: impl Into<String>,
        metric_type: MetricType,
    ) -> Self {
        Self::vector(index_name, IndexType::Flat, field, metric_type)
    }

    fn vector(
        index_name: impl Into<String>,
        index_type: IndexType,
        field: impl Into<String>,
        metric_type: MetricType,
    ) -> Self {
        VectorIndex {
            index_name: index_name.into(),
            index_type,
            field: field.into(),
            metric_type,
            params: None,
            auto_build: true,
            auto_build_policy: None,
            state: None,
        }
    }

    fn params(mut self, params: VectorIndexParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn auto_build(mut self, auto_build: bool) -> Self {
        self.auto_build = auto_build;
        self
    }

    pub fn auto_build_policy(mut self, policy: AutoBuildPolicy) -> Self {
        self.auto_build_policy = Some(policy);
        self
    }
}

/// A secondary index over one scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryIndex {
    pub index_name: String,
    pub index_type: IndexType,
    pub field: String,
}

impl SecondaryIndex {
    pub fn new(index_name: impl Into<String>, field: impl Into<String>) -> Self {
        SecondaryIndex {
            index_name: index_name.into(),
            index_type: IndexType::Secondary,
            field: field.into(),
        }
    }
}

/// Analyzer parameters of an inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvertedIndexParams {
    pub analyzer: InvertedIndexAnalyzer,
    pub parse_mode: InvertedIndexParseMode,
}

impl Default for InvertedIndexParams {
    fn default() -> Self {
        InvertedIndexParams {
            analyzer: InvertedIndexAnalyzer::Default,
            parse_mode: InvertedIndexParseMode::Coarse,
        }
    }
}

/// An inverted (BM25 text) index over one or more text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvertedIndex {
    pub index_name: String,
    pub index_type: IndexType,
    pub fields: Vec<String>,
    pub params: InvertedIndexParams,
}

impl InvertedIndex {
    pub fn new(
        index_name: impl Into<String>,
        fields: Vec<String>,
        params: InvertedIndexParams,
    ) -> Self {
        InvertedIndex {
            index_name: index_name.into(),
            index_type: IndexType::Inverted,
            fields,
            params,
        }
    }
}

/// Any index descriptor. Decoding dispatches on the server-reported
/// `indexType` tag; an unknown tag is a hard client error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Index {
    Vector(VectorIndex),
    Secondary(SecondaryIndex),
    Inverted(InvertedIndex),
}

impl Index {
    pub fn index_name(&self) -> &str {
        match self {
            Index::Vector(index) => &index.index_name,
            Index::Secondary(index) => &index.index_name,
            Index::Inverted(index) => &index.index_name,
        }
    }

    pub fn index_type(&self) -> IndexType {
        match self {
            Index::Vector(index) => index.index_type,
            Index::Secondary(index) => index.index_type,
            Index::Inverted(index) => index.index_type,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::client(format!("failed to encode index: {e}")))
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Index> {
        let tag = value
            .get("indexType")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::client("index description missing indexType"))?;
        let index_type: IndexType =
            serde_json::from_value(serde_json::Value::String(tag.to_string()))
                .map_err(|_| Error::client(format!("not supported index type:{tag}")))?;
        let decoded = if index_type.is_vector_index() {
            serde_json::from_value(value.clone()).map(Index::Vector)
        } else if index_type == IndexType::Secondary {
            serde_json::from_value(value.clone()).map(Index::Secondary)
        } else {
            serde_json::from_value(value.clone()).map(Index::Inverted)
        };
        decoded.map_err(|e| Error::client(format!("failed to decode {tag} index: {e}")))
    }
}

impl<'de> Deserialize<'de> for Index {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Index::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl From<VectorIndex> for Index {
    fn from(index: VectorIndex) -> Self {
        Index::Vector(index)
    }
}

impl From<SecondaryIndex> for Index {
    fn from(index: SecondaryIndex) -> Self {
        Index::Secondary(index)
    }
}

impl From<InvertedIndex> for Index {
    fn from(index: InvertedIndex) -> Self {
        Index::Inverted(index)
    }
}

/// Ordered field and index lists of a table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
    pub indexes: Vec<Index>,
}

impl Schema {
    pub fn new(fields: Vec<Field>, indexes: Vec<Index>) -> Self {
        Schema { fields, indexes }
    }
}
