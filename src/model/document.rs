//! Document model for the ingestion pipeline.
//!
//! A `Document` is the unit handed to a document hub and processor; a
//! `DocumentChunk` is one split piece of it, optionally carrying an
//! embedding. Both convert to a [`Row`] with an optional field mapping:
//! without a mapping every set field is emitted under its own name, with a
//! mapping only mapped fields are emitted under their mapped names.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::value::{Row, Value};

/// Layout hint handed to the document processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentLayout {
    #[default]
    General,
    Paper,
    Law,
}

/// Document language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl DocumentLayout {
    fn as_str(self) -> &'static str {
        match self {
            DocumentLayout::General => "GENERAL",
            DocumentLayout::Paper => "PAPER",
            DocumentLayout::Law => "LAW",
        }
    }
}

impl Lang {
    fn as_str(self) -> &'static str {
        match self {
            Lang::Zh => "ZH",
            Lang::En => "EN",
        }
    }
}

/// One document to ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Knowledge-base id the document belongs to.
    pub kb_id: Option<String>,
    /// Generated when not supplied.
    pub doc_id: String,
    /// Name relative to the hub root, e.g. `reports/2024/q1.pdf`.
    pub doc_name: String,
    /// File extension without the dot; filled by the hub on add.
    pub doc_type: Option<String>,
    pub layout: DocumentLayout,
    pub lang: Lang,
    /// Local filesystem path, when the document is available locally.
    pub file_path: Option<PathBuf>,
    /// Location in the hub, e.g. `local:///root_path/reports/2024/q1.pdf`.
    pub uri: Option<String>,
    pub size: Option<u64>,
    /// Creation time, Unix seconds.
    pub ctime: i64,
}

impl Document {
    /// A document with a generated id and the current time as ctime.
    pub fn new(doc_name: impl Into<String>) -> Result<Self> {
        let doc_name = doc_name.into();
        if doc_name.is_empty() {
            return Err(Error::client("doc_name is required"));
        }
        Ok(Document {
            kb_id: None,
            doc_id: uuid::Uuid::new_v4().to_string(),
            doc_name,
            doc_type: None,
            layout: DocumentLayout::default(),
            lang: Lang::default(),
            file_path: None,
            uri: None,
            size: None,
            ctime: chrono::Utc::now().timestamp(),
        })
    }

    pub fn kb_id(mut self, kb_id: impl Into<String>) -> Self {
        self.kb_id = Some(kb_id.into());
        self
    }

    pub fn file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn layout(mut self, layout: DocumentLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    /// Convert to a row, skipping unset fields and applying the mapping
    /// rules described at the module level.
    pub fn to_row(&self, field_mapping: Option<&HashMap<String, String>>) -> Row {
        let mut fields: Vec<(&str, Value)> = vec![
            ("doc_id", Value::from(self.doc_id.as_str())),
            ("doc_name", Value::from(self.doc_name.as_str())),
            ("layout", Value::from(self.layout.as_str())),
            ("lang", Value::from(self.lang.as_str())),
            ("ctime", Value::from(self.ctime)),
        ];
        if let Some(kb_id) = &self.kb_id {
            fields.push(("kb_id", Value::from(kb_id.as_str())));
        }
        if let Some(doc_type) = &self.doc_type {
            fields.push(("doc_type", Value::from(doc_type.as_str())));
        }
        if let Some(file_path) = &self.file_path {
            fields.push(("file_path", Value::from(file_path.to_string_lossy().into_owned())));
        }
        if let Some(uri) = &self.uri {
            fields.push(("uri", Value::from(uri.as_str())));
        }
        if let Some(size) = self.size {
            fields.push(("size", Value::from(size as i64)));
        }
        apply_mapping(fields, field_mapping)
    }
}

/// One chunk of a processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub kb_id: String,
    pub doc_id: String,
    /// Generated when not supplied.
    pub chunk_id: String,
    pub doc_name: String,
    /// Position of the chunk within the document.
    pub sequence_number: Option<u32>,
    pub content: Option<String>,
    pub content_len: Option<u32>,
    /// Filled by the embedder.
    pub embedding: Option<Vec<f32>>,
    /// Creation time, Unix seconds.
    pub ctime: i64,
}

impl DocumentChunk {
    pub fn new(
        kb_id: impl Into<String>,
        doc_id: impl Into<String>,
        doc_name: impl Into<String>,
    ) -> Result<Self> {
        let kb_id = kb_id.into();
        let doc_id = doc_id.into();
        let doc_name = doc_name.into();
        if kb_id.is_empty() {
            return Err(Error::client("kb_id cannot be empty"));
        }
        if doc_id.is_empty() {
            return Err(Error::client("doc_id cannot be empty"));
        }
        if doc_name.is_empty() {
            return Err(Error::client("doc_name cannot be empty"));
        }
        Ok(DocumentChunk {
            kb_id,
            doc_id,
            chunk_id: uuid::Uuid::new_v4().to_string(),
            doc_name,
            sequence_number: None,
            content: None,
            content_len: None,
            embedding: None,
            ctime: chrono::Utc::now().timestamp(),
        })
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.content_len = Some(content.chars().count() as u32);
        self.content = Some(content);
        self
    }

    pub fn sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Convert to a row, same mapping rules as [`Document::to_row`].
    pub fn to_row(&self, field_mapping: Option<&HashMap<String, String>>) -> Row {
        let mut fields: Vec<(&str, Value)> = vec![
            ("kb_id", Value::from(self.kb_id.as_str())),
            ("doc_id", Value::from(self.doc_id.as_str())),
            ("chunk_id", Value::from(self.chunk_id.as_str())),
            ("doc_name", Value::from(self.doc_name.as_str())),
            ("ctime", Value::from(self.ctime)),
        ];
        if let Some(sequence_number) = self.sequence_number {
            fields.push(("sequence_number", Value::from(sequence_number)));
        }
        if let Some(content) = &self.content {
            fields.push(("content", Value::from(content.as_str())));
        }
        if let Some(content_len) = self.content_len {
            fields.push(("content_len", Value::from(content_len)));
        }
        if let Some(embedding) = &self.embedding {
            fields.push(("embedding", Value::from(embedding.clone())));
        }
        apply_mapping(fields, field_mapping)
    }
}

fn apply_mapping(
    fields: Vec<(&str, Value)>,
    field_mapping: Option<&HashMap<String, String>>,
) -> Row {
    let mut row = Row::new();
    for (name, value) in fields {
        match field_mapping {
            None => row.set(name, value),
            Some(mapping) => {
                if let Some(mapped) = mapping.get(name) {
                    row.set(mapped.clone(), value);
                }
            }
        }
    }
    row
}
