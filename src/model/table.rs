//! Table resource: row operations, search, and index management.
//!
//! A `Table` is a handle plus the table description last seen from the
//! server. The client holds no authoritative cache — `describe_table`
//! re-fetches on every call and the server is the single source of truth.
//! Waiting for a lifecycle transition (CREATING -> NORMAL) is a
//! caller-level polling loop over `describe_table`, not SDK machinery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

use crate::config::ClientConfiguration;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpResponse, Method};
use crate::model::enums::{PartitionType, ReadConsistency, RequestType, TableState};
use crate::model::schema::{AutoBuildPolicy, Index, Schema};
use crate::model::search::{
    Bm25SearchRequest, HybridSearchRequest, SearchRequest, VectorSearchRequest,
};
use crate::model::value::Row;

/// Partition layout of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub partition_type: PartitionType,
    pub partition_num: u32,
}

impl Partition {
    pub fn new(partition_num: u32) -> Self {
        Partition {
            partition_type: PartitionType::Hash,
            partition_num,
        }
    }
}

/// One key of a batch query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQueryKey {
    pub primary_key: Row,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<Row>,
}

impl BatchQueryKey {
    pub fn new(primary_key: Row) -> Self {
        BatchQueryKey {
            primary_key,
            partition_key: None,
        }
    }

    pub fn partition_key(mut self, partition_key: Row) -> Self {
        self.partition_key = Some(partition_key);
        self
    }
}

// Per-call options. Each struct defaults to "nothing extra"; the embedded
// `config` override merges over the client-level configuration.

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub partition_key: Option<Row>,
    pub projections: Option<Vec<String>>,
    pub retrieve_vector: bool,
    pub read_consistency: ReadConsistency,
    pub config: Option<ClientConfiguration>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchQueryOptions {
    pub projections: Option<Vec<String>>,
    pub retrieve_vector: bool,
    pub read_consistency: ReadConsistency,
    pub config: Option<ClientConfiguration>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub partition_key: Option<Row>,
    pub projections: Option<Vec<String>>,
    pub read_consistency: ReadConsistency,
    pub config: Option<ClientConfiguration>,
}

#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub filter: Option<String>,
    /// Opaque continuation marker from the previous page's `next_marker`.
    pub marker: Option<Json>,
    pub projections: Option<Vec<String>>,
    pub read_consistency: ReadConsistency,
    pub limit: u32,
    pub config: Option<ClientConfiguration>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        SelectOptions {
            filter: None,
            marker: None,
            projections: None,
            read_consistency: ReadConsistency::default(),
            limit: 10,
            config: None,
        }
    }
}

/// Arguments of a row delete. Exactly one of `primary_key` and `filter`
/// must be set; `partition_key` cannot be combined with `filter`.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub primary_key: Option<Row>,
    pub partition_key: Option<Row>,
    pub filter: Option<String>,
    pub config: Option<ClientConfiguration>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub partition_key: Option<Row>,
    pub config: Option<ClientConfiguration>,
}

// Typed results decoded from the generic response envelope.

/// Result of a row mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub affected_count: u64,
}

/// Result of a primary-key query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub row: Row,
}

/// One scored row of a search result.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultRow {
    #[serde(default)]
    pub row: Row,
    /// Vector distance, vector searches only.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Relevance score, BM25/hybrid searches only.
    #[serde(default)]
    pub score: Option<f64>,
}

/// One per-vector result group of a batch search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSearchGroup {
    #[serde(default)]
    pub search_vector_floats: Vec<f32>,
    #[serde(default)]
    pub rows: Vec<SearchResultRow>,
}

/// Search result. `rows` is populated for single searches, `results` for
/// batch searches (one group per query vector).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub rows: Vec<SearchResultRow>,
    #[serde(default)]
    pub results: Vec<BatchSearchGroup>,
}

/// One page of a filtered scan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub is_truncated: bool,
    /// Marker for the next page, opaque to the client.
    #[serde(default)]
    pub next_marker: Option<Json>,
}

/// Table size counters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub memory_size_in_byte: u64,
    #[serde(default)]
    pub disk_size_in_byte: u64,
}

#[derive(Deserialize)]
struct RowsWire {
    #[serde(default)]
    rows: Vec<Row>,
}

/// Wire shape of a table description; the serialize side doubles as the
/// create-table body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableDescription {
    pub database: String,
    pub table: String,
    #[serde(default)]
    pub description: String,
    pub replication: u32,
    pub partition: Partition,
    #[serde(default)]
    pub enable_dynamic_field: bool,
    pub schema: Schema,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TableState>,
}

/// Handle to one table, carrying the description last seen from the server.
#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) conn: Arc<HttpClient>,
    pub(crate) config: ClientConfiguration,
    database_name: String,
    table_name: String,
    pub replication: u32,
    pub partition: Partition,
    pub schema: Schema,
    pub enable_dynamic_field: bool,
    pub description: String,
    /// Server-populated; present only on described tables.
    pub create_time: Option<String>,
    /// Server-populated lifecycle state; present only on described tables.
    pub state: Option<TableState>,
    pub aliases: Vec<String>,
}

impl Table {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        conn: Arc<HttpClient>,
        config: ClientConfiguration,
        database_name: String,
        table_name: String,
        replication: u32,
        partition: Partition,
        schema: Schema,
        enable_dynamic_field: bool,
        description: String,
    ) -> Self {
        Table {
            conn,
            config,
            database_name,
            table_name,
            replication,
            partition,
            schema,
            enable_dynamic_field,
            description,
            create_time: None,
            state: None,
            aliases: Vec::new(),
        }
    }

    pub(crate) fn from_description(
        conn: Arc<HttpClient>,
        config: ClientConfiguration,
        database_name: String,
        description: TableDescription,
    ) -> Self {
        Table {
            conn,
            config,
            database_name,
            table_name: description.table,
            replication: description.replication,
            partition: description.partition,
            schema: description.schema,
            enable_dynamic_field: description.enable_dynamic_field,
            description: description.description,
            create_time: description.create_time,
            state: description.state,
            aliases: description.aliases,
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Wire form of this table's description (the create-table body shape).
    pub fn to_value(&self) -> Result<Json> {
        let description = TableDescription {
            database: self.database_name.clone(),
            table: self.table_name.clone(),
            description: self.description.clone(),
            replication: self.replication,
            partition: self.partition,
            enable_dynamic_field: self.enable_dynamic_field,
            schema: self.schema.clone(),
            aliases: self.aliases.clone(),
            create_time: self.create_time.clone(),
            state: self.state,
        };
        serde_json::to_value(&description)
            .map_err(|e| Error::client(format!("failed to encode table: {e}")))
    }

    fn merge_config(&self, config: Option<&ClientConfiguration>) -> ClientConfiguration {
        match config {
            Some(over) => self.config.merge(over),
            None => self.config.clone(),
        }
    }

    fn base_body(&self) -> Map<String, Json> {
        let mut body = Map::new();
        body.insert("database".to_string(), json!(self.database_name));
        body.insert("table".to_string(), json!(self.table_name));
        body
    }

    fn send(
        &self,
        request_type: RequestType,
        resource: &str,
        body: &Json,
        config: Option<&ClientConfiguration>,
    ) -> Result<HttpResponse> {
        let config = self.merge_config(config);
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::client(format!("failed to encode request body: {e}")))?;
        self.conn.send_request(
            Method::Post,
            &crate::uri(resource),
            &[(request_type.as_str(), String::new())],
            Some(bytes),
            &config,
        )
    }

    // ── Row operations ──────────────────────────────────────────────────

    pub fn insert(&self, rows: &[Row], config: Option<&ClientConfiguration>) -> Result<OpResponse> {
        self.write_rows(RequestType::Insert, rows, config)
    }

    pub fn upsert(&self, rows: &[Row], config: Option<&ClientConfiguration>) -> Result<OpResponse> {
        self.write_rows(RequestType::Upsert, rows, config)
    }

    fn write_rows(
        &self,
        request_type: RequestType,
        rows: &[Row],
        config: Option<&ClientConfiguration>,
    ) -> Result<OpResponse> {
        if rows.is_empty() {
            return Err(Error::client("rows param not found"));
        }
        let mut body = self.base_body();
        body.insert("rows".to_string(), json!(rows));
        self.send(request_type, "row", &Json::Object(body), config)?
            .decode()
    }

    /// Fetch one row by primary key.
    pub fn query(&self, primary_key: &Row, options: &QueryOptions) -> Result<QueryResponse> {
        let mut body = self.base_body();
        body.insert("primaryKey".to_string(), json!(primary_key));
        if let Some(partition_key) = &options.partition_key {
            body.insert("partitionKey".to_string(), json!(partition_key));
        }
        if let Some(projections) = &options.projections {
            body.insert("projections".to_string(), json!(projections));
        }
        body.insert("retrieveVector".to_string(), json!(options.retrieve_vector));
        body.insert(
            "readConsistency".to_string(),
            json!(options.read_consistency),
        );
        self.send(
            RequestType::Query,
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?
        .decode()
    }

    /// Fetch several rows by key in one call.
    pub fn batch_query(
        &self,
        keys: &[BatchQueryKey],
        options: &BatchQueryOptions,
    ) -> Result<Vec<Row>> {
        if keys.is_empty() {
            return Err(Error::client("keys param not found"));
        }
        let mut body = self.base_body();
        body.insert("keys".to_string(), json!(keys));
        if let Some(projections) = &options.projections {
            body.insert("projections".to_string(), json!(projections));
        }
        body.insert("retrieveVector".to_string(), json!(options.retrieve_vector));
        body.insert(
            "readConsistency".to_string(),
            json!(options.read_consistency),
        );
        let response = self.send(
            RequestType::BatchQuery,
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?;
        Ok(response.decode::<RowsWire>()?.rows)
    }

    /// ANN search with any vector request variant. A batch request maps to
    /// the `batchSearch` discriminator and fills `results` instead of
    /// `rows` in the response.
    pub fn vector_search(
        &self,
        request: &VectorSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        self.search(request, options)
    }

    /// BM25 keyword search against an inverted index.
    pub fn bm25_search(
        &self,
        request: &Bm25SearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        self.search(request, options)
    }

    /// Weighted vector + BM25 search.
    pub fn hybrid_search(
        &self,
        request: &HybridSearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        self.search(request, options)
    }

    fn search(
        &self,
        request: &dyn SearchRequest,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let mut body = match request.to_body()? {
            Json::Object(map) => map,
            other => {
                return Err(Error::client(format!(
                    "search request rendered a non-object body: {other}"
                )))
            }
        };
        body.insert("database".to_string(), json!(self.database_name));
        body.insert("table".to_string(), json!(self.table_name));
        if let Some(partition_key) = &options.partition_key {
            body.insert("partitionKey".to_string(), json!(partition_key));
        }
        if let Some(projections) = &options.projections {
            body.insert("projections".to_string(), json!(projections));
        }
        body.insert(
            "readConsistency".to_string(),
            json!(options.read_consistency),
        );
        self.send(
            request.request_type(),
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?
        .decode()
    }

    /// Delete by primary key or by filter (exactly one of the two).
    pub fn delete(&self, options: &DeleteOptions) -> Result<OpResponse> {
        if options.primary_key.is_none() && options.filter.is_none() {
            return Err(Error::client("requiring primary_key or filter"));
        }
        if options.primary_key.is_some() && options.filter.is_some() {
            return Err(Error::client(
                "only one of primary_key and filter should exist",
            ));
        }
        if options.partition_key.is_some() && options.filter.is_some() {
            return Err(Error::client(
                "only one of partition_key and filter should exist",
            ));
        }
        let mut body = self.base_body();
        if let Some(primary_key) = &options.primary_key {
            body.insert("primaryKey".to_string(), json!(primary_key));
        }
        if let Some(partition_key) = &options.partition_key {
            body.insert("partitionKey".to_string(), json!(partition_key));
        }
        if let Some(filter) = &options.filter {
            body.insert("filter".to_string(), json!(filter));
        }
        self.send(
            RequestType::Delete,
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?
        .decode()
    }

    /// Update fields of one row addressed by primary key.
    pub fn update(
        &self,
        primary_key: &Row,
        update_fields: &Row,
        options: &UpdateOptions,
    ) -> Result<OpResponse> {
        let mut body = self.base_body();
        body.insert("primaryKey".to_string(), json!(primary_key));
        if let Some(partition_key) = &options.partition_key {
            body.insert("partitionKey".to_string(), json!(partition_key));
        }
        body.insert("update".to_string(), json!(update_fields));
        self.send(
            RequestType::Update,
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?
        .decode()
    }

    /// Filtered scan with marker pagination.
    pub fn select(&self, options: &SelectOptions) -> Result<SelectResponse> {
        let mut body = self.base_body();
        body.insert(
            "readConsistency".to_string(),
            json!(options.read_consistency),
        );
        body.insert("limit".to_string(), json!(options.limit));
        if let Some(filter) = &options.filter {
            body.insert("filter".to_string(), json!(filter));
        }
        if let Some(marker) = &options.marker {
            body.insert("marker".to_string(), marker.clone());
        }
        if let Some(projections) = &options.projections {
            body.insert("projections".to_string(), json!(projections));
        }
        self.send(
            RequestType::Select,
            "row",
            &Json::Object(body),
            options.config.as_ref(),
        )?
        .decode()
    }

    // ── Schema and index operations ─────────────────────────────────────

    /// Add fields to the table schema.
    pub fn add_fields(&self, schema: &Schema, config: Option<&ClientConfiguration>) -> Result<()> {
        let mut body = self.base_body();
        body.insert("schema".to_string(), json!(schema));
        self.send(RequestType::AddField, "table", &Json::Object(body), config)?;
        Ok(())
    }

    /// Create vector indexes. Only vector indexes can be created after the
    /// table exists; anything else is rejected client-side.
    pub fn create_indexes(
        &self,
        indexes: &[Index],
        config: Option<&ClientConfiguration>,
    ) -> Result<()> {
        let mut encoded = Vec::with_capacity(indexes.len());
        for index in indexes {
            match index {
                Index::Vector(_) => encoded.push(index.to_value()?),
                _ => return Err(Error::client("not supported index type")),
            }
        }
        let mut body = self.base_body();
        body.insert("indexes".to_string(), Json::Array(encoded));
        self.send(RequestType::Create, "index", &Json::Object(body), config)?;
        Ok(())
    }

    /// Switch automatic builds on or off for one index.
    pub fn modify_index(
        &self,
        index_name: &str,
        auto_build: bool,
        auto_build_policy: Option<AutoBuildPolicy>,
        config: Option<&ClientConfiguration>,
    ) -> Result<()> {
        let mut index = Map::new();
        index.insert("indexName".to_string(), json!(index_name));
        index.insert("autoBuild".to_string(), json!(auto_build));
        if auto_build {
            let policy =
                auto_build_policy.unwrap_or_else(|| AutoBuildPolicy::row_count_increment(10000));
            index.insert("autoBuildPolicy".to_string(), json!(policy));
        }
        let mut body = self.base_body();
        body.insert("index".to_string(), Json::Object(index));
        self.send(RequestType::Modify, "index", &Json::Object(body), config)?;
        Ok(())
    }

    /// Drop one index. DELETE with valued query parameters, no body.
    pub fn drop_index(&self, index_name: &str, config: Option<&ClientConfiguration>) -> Result<()> {
        let config = self.merge_config(config);
        self.conn.send_request(
            Method::Delete,
            &crate::uri("index"),
            &[
                ("database", self.database_name.clone()),
                ("table", self.table_name.clone()),
                ("indexName", index_name.to_string()),
            ],
            None,
            &config,
        )?;
        Ok(())
    }

    /// Kick off a rebuild of one vector index. Completion is observed by
    /// polling `describe_index` until the state is NORMAL again.
    pub fn rebuild_index(
        &self,
        index_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<()> {
        let mut body = self.base_body();
        body.insert("indexName".to_string(), json!(index_name));
        self.send(RequestType::Rebuild, "index", &Json::Object(body), config)?;
        Ok(())
    }

    /// Fetch one index description, reconstructing the typed variant from
    /// the server-reported index-type tag.
    pub fn describe_index(
        &self,
        index_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<Index> {
        let mut body = self.base_body();
        body.insert("indexName".to_string(), json!(index_name));
        let response = self.send(RequestType::Desc, "index", &Json::Object(body), config)?;
        let index = response
            .field("index")
            .ok_or_else(|| Error::client("index description missing from response"))?;
        Index::from_value(index)
    }

    /// Row-count and size counters.
    pub fn stats(&self, config: Option<&ClientConfiguration>) -> Result<TableStats> {
        let body = Json::Object(self.base_body());
        self.send(RequestType::Stats, "table", &body, config)?.decode()
    }
}
