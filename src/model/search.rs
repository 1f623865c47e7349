//! Search request variants.
//!
//! Every variant renders its own slice of the shared wire shape — vector
//! requests an `anns` block, BM25 a `BM25SearchParams` block, hybrid both —
//! and reports which operation discriminator the call maps to.

use serde_json::{json, Map, Value as Json};

use crate::error::{Error, Result};
use crate::model::enums::RequestType;

/// A dense query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatVector(pub Vec<f32>);

impl FloatVector {
    fn to_json(&self) -> Json {
        json!(self.0)
    }
}

impl From<Vec<f32>> for FloatVector {
    fn from(floats: Vec<f32>) -> Self {
        FloatVector(floats)
    }
}

/// Optional per-algorithm knobs of a vector search.
///
/// Which knobs apply depends on the index algorithm: `ef`/`pruning` for
/// HNSW and HNSWPQ, `search_coarse_count` for PUCK, none for FLAT.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorSearchConfig {
    pub ef: Option<u32>,
    pub pruning: Option<bool>,
    pub search_coarse_count: Option<u32>,
}

impl VectorSearchConfig {
    pub fn new() -> Self {
        VectorSearchConfig::default()
    }

    pub fn ef(mut self, ef: u32) -> Self {
        self.ef = Some(ef);
        self
    }

    pub fn pruning(mut self, pruning: bool) -> Self {
        self.pruning = Some(pruning);
        self
    }

    pub fn search_coarse_count(mut self, count: u32) -> Self {
        self.search_coarse_count = Some(count);
        self
    }

    fn write_params(&self, params: &mut Map<String, Json>) {
        if let Some(ef) = self.ef {
            params.insert("ef".to_string(), json!(ef));
        }
        if let Some(pruning) = self.pruning {
            params.insert("pruning".to_string(), json!(pruning));
        }
        if let Some(count) = self.search_coarse_count {
            params.insert("searchCoarseCount".to_string(), json!(count));
        }
    }
}

/// Top-K nearest-neighbor search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorTopkSearchRequest {
    pub vector_field: String,
    pub vector: Option<FloatVector>,
    pub limit: u32,
    pub filter: Option<String>,
    pub config: Option<VectorSearchConfig>,
}

impl VectorTopkSearchRequest {
    pub fn new(vector_field: impl Into<String>) -> Self {
        VectorTopkSearchRequest {
            vector_field: vector_field.into(),
            vector: None,
            limit: 50,
            filter: None,
            config: None,
        }
    }

    pub fn vector(mut self, vector: impl Into<FloatVector>) -> Self {
        self.vector = Some(vector.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn config(mut self, config: VectorSearchConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Distance-bounded search: rows whose distance falls within
/// `(distance_near, distance_far)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRangeSearchRequest {
    pub vector_field: String,
    pub vector: Option<FloatVector>,
    pub distance_range: (f64, f64),
    pub limit: Option<u32>,
    pub filter: Option<String>,
    pub config: Option<VectorSearchConfig>,
}

impl VectorRangeSearchRequest {
    pub fn new(vector_field: impl Into<String>, distance_range: (f64, f64)) -> Self {
        VectorRangeSearchRequest {
            vector_field: vector_field.into(),
            vector: None,
            distance_range,
            limit: None,
            filter: None,
            config: None,
        }
    }

    pub fn vector(mut self, vector: impl Into<FloatVector>) -> Self {
        self.vector = Some(vector.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn config(mut self, config: VectorSearchConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Several query vectors in one call; maps to the `batchSearch`
/// discriminator instead of `search`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorBatchSearchRequest {
    pub vector_field: String,
    pub vectors: Vec<FloatVector>,
    pub limit: Option<u32>,
    pub distance_range: Option<(f64, f64)>,
    pub filter: Option<String>,
    pub config: Option<VectorSearchConfig>,
}

impl VectorBatchSearchRequest {
    pub fn new(vector_field: impl Into<String>) -> Self {
        VectorBatchSearchRequest {
            vector_field: vector_field.into(),
            vectors: Vec::new(),
            limit: None,
            distance_range: None,
            filter: None,
            config: None,
        }
    }

    pub fn vectors(mut self, vectors: Vec<FloatVector>) -> Self {
        self.vectors = vectors;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn distance_range(mut self, near: f64, far: f64) -> Self {
        self.distance_range = Some((near, far));
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn config(mut self, config: VectorSearchConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// The three vector-search variants under one roof.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorSearchRequest {
    Topk(VectorTopkSearchRequest),
    Range(VectorRangeSearchRequest),
    Batch(VectorBatchSearchRequest),
}

impl From<VectorTopkSearchRequest> for VectorSearchRequest {
    fn from(request: VectorTopkSearchRequest) -> Self {
        VectorSearchRequest::Topk(request)
    }
}

impl From<VectorRangeSearchRequest> for VectorSearchRequest {
    fn from(request: VectorRangeSearchRequest) -> Self {
        VectorSearchRequest::Range(request)
    }
}

impl From<VectorBatchSearchRequest> for VectorSearchRequest {
    fn from(request: VectorBatchSearchRequest) -> Self {
        VectorSearchRequest::Batch(request)
    }
}

/// BM25 keyword search against an inverted index.
#[derive(Debug, Clone, PartialEq)]
pub struct Bm25SearchRequest {
    pub index_name: String,
    pub search_text: String,
    pub limit: Option<u32>,
    pub filter: Option<String>,
}

impl Bm25SearchRequest {
    pub fn new(index_name: impl Into<String>, search_text: impl Into<String>) -> Self {
        Bm25SearchRequest {
            index_name: index_name.into(),
            search_text: search_text.into(),
            limit: None,
            filter: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Weighted combination of a vector branch and a BM25 branch.
///
/// `limit` and `filter` here are global: they apply to both branches and
/// override any branch-level settings of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridSearchRequest {
    pub vector_request: VectorSearchRequest,
    pub bm25_request: Bm25SearchRequest,
    pub vector_weight: f64,
    pub bm25_weight: f64,
    pub limit: Option<u32>,
    pub filter: Option<String>,
}

impl HybridSearchRequest {
    pub fn new(
        vector_request: impl Into<VectorSearchRequest>,
        bm25_request: Bm25SearchRequest,
        vector_weight: f64,
        bm25_weight: f64,
    ) -> Self {
        HybridSearchRequest {
            vector_request: vector_request.into(),
            bm25_request,
            vector_weight,
            bm25_weight,
            limit: None,
            filter: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// One search request of any flavor: renders its body fragment and names
/// the operation discriminator it maps to.
pub trait SearchRequest {
    /// Render the request into its wire body fragment. Fails with a client
    /// error when a required vector was never attached.
    fn to_body(&self) -> Result<Json>;

    /// Operation discriminator for this request.
    fn request_type(&self) -> RequestType;
}

impl SearchRequest for VectorTopkSearchRequest {
    fn to_body(&self) -> Result<Json> {
        let vector = self
            .vector
            .as_ref()
            .ok_or_else(|| Error::client("topk search request has no vector"))?;
        let mut anns = Map::new();
        anns.insert("vectorField".to_string(), json!(self.vector_field));
        anns.insert("vectorFloats".to_string(), vector.to_json());
        if let Some(filter) = &self.filter {
            anns.insert("filter".to_string(), json!(filter));
        }

        let mut params = Map::new();
        if let Some(config) = &self.config {
            config.write_params(&mut params);
        }
        params.insert("limit".to_string(), json!(self.limit));
        anns.insert("params".to_string(), Json::Object(params));

        Ok(json!({ "anns": anns }))
    }

    fn request_type(&self) -> RequestType {
        RequestType::Search
    }
}

impl SearchRequest for VectorRangeSearchRequest {
    fn to_body(&self) -> Result<Json> {
        let vector = self
            .vector
            .as_ref()
            .ok_or_else(|| Error::client("range search request has no vector"))?;
        let mut anns = Map::new();
        anns.insert("vectorField".to_string(), json!(self.vector_field));
        anns.insert("vectorFloats".to_string(), vector.to_json());
        if let Some(filter) = &self.filter {
            anns.insert("filter".to_string(), json!(filter));
        }

        let mut params = Map::new();
        if let Some(config) = &self.config {
            config.write_params(&mut params);
        }
        params.insert("distanceNear".to_string(), json!(self.distance_range.0));
        params.insert("distanceFar".to_string(), json!(self.distance_range.1));
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), json!(limit));
        }
        anns.insert("params".to_string(), Json::Object(params));

        Ok(json!({ "anns": anns }))
    }

    fn request_type(&self) -> RequestType {
        RequestType::Search
    }
}

impl SearchRequest for VectorBatchSearchRequest {
    fn to_body(&self) -> Result<Json> {
        if self.vectors.is_empty() {
            return Err(Error::client("batch search request has no vectors"));
        }
        let mut anns = Map::new();
        anns.insert("vectorField".to_string(), json!(self.vector_field));
        anns.insert(
            "vectorFloats".to_string(),
            Json::Array(self.vectors.iter().map(FloatVector::to_json).collect()),
        );
        if let Some(filter) = &self.filter {
            anns.insert("filter".to_string(), json!(filter));
        }

        let mut params = Map::new();
        if let Some(config) = &self.config {
            config.write_params(&mut params);
        }
        if let Some((near, far)) = self.distance_range {
            params.insert("distanceNear".to_string(), json!(near));
            params.insert("distanceFar".to_string(), json!(far));
        }
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), json!(limit));
        }
        if !params.is_empty() {
            anns.insert("params".to_string(), Json::Object(params));
        }

        Ok(json!({ "anns": anns }))
    }

    fn request_type(&self) -> RequestType {
        RequestType::BatchSearch
    }
}

impl SearchRequest for VectorSearchRequest {
    fn to_body(&self) -> Result<Json> {
        match self {
            VectorSearchRequest::Topk(request) => request.to_body(),
            VectorSearchRequest::Range(request) => request.to_body(),
            VectorSearchRequest::Batch(request) => request.to_body(),
        }
    }

    fn request_type(&self) -> RequestType {
        match self {
            VectorSearchRequest::Topk(request) => request.request_type(),
            VectorSearchRequest::Range(request) => request.request_type(),
            VectorSearchRequest::Batch(request) => request.request_type(),
        }
    }
}

impl SearchRequest for Bm25SearchRequest {
    fn to_body(&self) -> Result<Json> {
        let mut body = Map::new();
        body.insert(
            "BM25SearchParams".to_string(),
            json!({
                "indexName": self.index_name,
                "searchText": self.search_text,
            }),
        );
        if let Some(limit) = self.limit {
            body.insert("limit".to_string(), json!(limit));
        }
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), json!(filter));
        }
        Ok(Json::Object(body))
    }

    fn request_type(&self) -> RequestType {
        RequestType::Search
    }
}

impl SearchRequest for HybridSearchRequest {
    fn to_body(&self) -> Result<Json> {
        let mut body = Map::new();

        let mut vector_body = self.vector_request.to_body()?;
        if let Some(anns) = vector_body.get_mut("anns").and_then(Json::as_object_mut) {
            anns.insert("weight".to_string(), json!(self.vector_weight));
        }
        let mut bm25_body = self.bm25_request.to_body()?;
        if let Some(bm25) = bm25_body
            .get_mut("BM25SearchParams")
            .and_then(Json::as_object_mut)
        {
            bm25.insert("weight".to_string(), json!(self.bm25_weight));
        }

        // Merge both fragments, then write the global settings last so they
        // override anything the branches set at top level.
        for fragment in [vector_body, bm25_body] {
            if let Json::Object(map) = fragment {
                body.extend(map);
            }
        }
        if let Some(limit) = self.limit {
            body.insert("limit".to_string(), json!(limit));
        }
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), json!(filter));
        }
        Ok(Json::Object(body))
    }

    fn request_type(&self) -> RequestType {
        RequestType::Search
    }
}
