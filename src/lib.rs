//! # Mochow Rust SDK
//!
//! Client SDK for the Mochow vector database: manage databases, tables and
//! indexes, upsert and query rows, and run vector/BM25/hybrid similarity
//! search over a signed, retrying HTTP transport.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mochow::{
//!     ClientConfiguration, Credentials, MochowClient,
//!     model::{Field, FieldType, Partition, Row, Schema, CreateTableOptions},
//! };
//!
//! let config = ClientConfiguration::new(
//!     Credentials::new("root", "your_api_key"),
//!     "http://127.0.0.1:5287",
//! );
//! let client = MochowClient::new(config)?;
//!
//! let db = client.create_database("book", None)?;
//! let schema = Schema::new(
//!     vec![
//!         Field::new("id", FieldType::String).primary_key().partition_key().not_null(),
//!         Field::new("vector", FieldType::FloatVector).not_null().dimension(3),
//!     ],
//!     vec![],
//! );
//! let table = db.create_table("vectors", 1, Partition::new(1), schema,
//!     &CreateTableOptions::default())?;
//! table.upsert(&[Row::new().with_field("id", "doc-1").with_field("vector", vec![0.1_f32, 0.2, 0.3])], None)?;
//! # Ok::<(), mochow::Error>(())
//! ```
//!
//! The transport is synchronous and blocking throughout; concurrency, if
//! any, is the caller's responsibility (the connection pool itself is
//! thread-safe).

pub mod ai;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod model;
pub mod retry;

pub use client::MochowClient;
pub use config::ClientConfiguration;
pub use credentials::Credentials;
pub use error::{Error, Result, ServerErrCode};
pub use retry::{BackOffRetryPolicy, NoRetryPolicy, RetryPolicy};

/// SDK version reported in the user-agent header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Versioned path prefix of every API call.
pub const URL_PREFIX: &str = "/v1";

/// Path of one resource under the versioned prefix.
pub(crate) fn uri(resource: &str) -> String {
    format!("{URL_PREFIX}/{resource}")
}
