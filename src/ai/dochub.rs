//! Document hubs: where documents live before ingestion.
//!
//! A hub is addressed by a `scheme://` rooted path. The SDK ships the
//! `local://` filesystem hub; object-storage hubs (e.g. `bos://bucket/...`)
//! implement the same trait against their blob store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::model::document::Document;

/// Environment of a document hub: storage endpoint and keys (object
/// storage only), the rooted work path, and a local cache directory for
/// downloaded documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentHubEnv {
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// `local://root_path/` or `bos://bucket/object_prefix`.
    pub root_path: Option<String>,
    pub local_cache_path: Option<String>,
}

impl DocumentHubEnv {
    pub fn new() -> Self {
        DocumentHubEnv::default()
    }

    pub fn root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn keys(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn local_cache_path(mut self, local_cache_path: impl Into<String>) -> Self {
        self.local_cache_path = Some(local_cache_path.into());
        self
    }
}

/// A store of documents: add, remove, list, load.
pub trait DocumentHub {
    /// Take the document under management and return it with its hub
    /// location (uri/size/ctime/doc_type) filled in.
    fn add(&self, doc: Document) -> Result<Document>;

    /// Remove the document from the hub.
    fn remove(&self, doc: &Document) -> Result<()>;

    /// All documents in the hub.
    fn list(&self) -> Result<Vec<Document>>;

    /// Make the document locally available and return it with `file_path`
    /// filled in.
    fn load(&self, doc: Document) -> Result<Document>;
}

const LOCAL_SCHEME: &str = "local://";

/// Filesystem-backed hub rooted at a `local://` path.
#[derive(Debug)]
pub struct LocalDocumentHub {
    root_path: PathBuf,
}

impl LocalDocumentHub {
    pub fn new(env: &DocumentHubEnv) -> Result<Self> {
        let root_path = env
            .root_path
            .as_deref()
            .ok_or_else(|| Error::client("root_path is not set"))?;
        let stripped = root_path.strip_prefix(LOCAL_SCHEME).ok_or_else(|| {
            Error::client(format!(
                "invalid root_path format: {root_path}. Expected 'local://xxx/xxx'"
            ))
        })?;
        if stripped.is_empty() {
            return Err(Error::client("root_path has no directory component"));
        }
        let root_path = PathBuf::from(stripped);
        fs::create_dir_all(&root_path)?;
        Ok(LocalDocumentHub { root_path })
    }

    fn target_path(&self, doc: &Document) -> PathBuf {
        self.root_path.join(&doc.doc_name)
    }

    fn document_at(&self, path: &Path) -> Result<Document> {
        let relative = path
            .strip_prefix(&self.root_path)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let metadata = fs::metadata(path)?;
        let mut doc = Document::new(relative)?;
        doc.doc_type = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        doc.file_path = Some(path.to_path_buf());
        doc.uri = Some(format!("{LOCAL_SCHEME}{}", path.display()));
        doc.size = Some(metadata.len());
        doc.ctime = file_ctime(&metadata);
        Ok(doc)
    }

    fn collect(&self, dir: &Path, docs: &mut Vec<Document>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect(&path, docs)?;
            } else {
                docs.push(self.document_at(&path)?);
            }
        }
        Ok(())
    }
}

fn file_ctime(metadata: &fs::Metadata) -> i64 {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or_else(|| chrono::Utc::now().timestamp(), |d| d.as_secs() as i64)
}

impl DocumentHub for LocalDocumentHub {
    fn add(&self, mut doc: Document) -> Result<Document> {
        let source = doc
            .file_path
            .clone()
            .ok_or_else(|| Error::client("document file path is not set"))?;
        let target = self.target_path(&doc);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &target)?;

        doc.doc_type = target
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        let metadata = fs::metadata(&target)?;
        doc.uri = Some(format!("{LOCAL_SCHEME}{}", target.display()));
        doc.size = Some(metadata.len());
        doc.ctime = file_ctime(&metadata);
        doc.file_path = Some(target);
        info!(doc_name = %doc.doc_name, "document added to hub");
        Ok(doc)
    }

    fn remove(&self, doc: &Document) -> Result<()> {
        let target = self.target_path(doc);
        if !target.exists() {
            info!(doc_name = %doc.doc_name, "document does not exist in hub");
            return Ok(());
        }
        fs::remove_file(&target)?;
        info!(doc_name = %doc.doc_name, "document removed from hub");

        // Prune now-empty parent directories up to the hub root.
        let mut dir = target.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == self.root_path {
                break;
            }
            if fs::read_dir(&current)?.next().is_some() {
                break;
            }
            fs::remove_dir(&current)?;
            dir = current.parent().map(Path::to_path_buf);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        self.collect(&self.root_path, &mut docs)?;
        Ok(docs)
    }

    fn load(&self, mut doc: Document) -> Result<Document> {
        let target = self.target_path(&doc);
        if !target.exists() {
            return Err(Error::client(format!(
                "document not in hub: {}",
                doc.doc_name
            )));
        }
        let metadata = fs::metadata(&target)?;
        doc.size = Some(metadata.len());
        doc.uri = Some(format!("{LOCAL_SCHEME}{}", target.display()));
        doc.file_path = Some(target);
        Ok(doc)
    }
}
