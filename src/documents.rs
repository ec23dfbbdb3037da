//! Document resolution for fact sources
//!
//! References starting with `http://` or `https://` are fetched over HTTP;
//! everything else is read from the filesystem, relative to a base directory.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A resolved document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The reference the document was resolved from
    pub reference: String,
    pub content: String,
}

/// Document resolution errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("IO error reading {reference}: {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch failed for {reference}: {message}")]
    Fetch { reference: String, message: String },
}

/// Resolves a document reference to its content
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Document, DocumentError>;
}

/// Filesystem and HTTP document store
pub struct FsDocumentStore {
    base_dir: PathBuf,
    http: Client,
}

impl FsDocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, DocumentError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocumentError::Fetch {
                reference: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_dir: base_dir.into(),
            http,
        })
    }

    fn resolve_path(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn fetch_file(&self, reference: &str) -> Result<Document, DocumentError> {
        let path = self.resolve_path(reference);
        debug!("Reading document from {}", path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Document {
                reference: reference.to_string(),
                content,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(format!("File not found at {}", path.display())))
            }
            Err(source) => Err(DocumentError::Io {
                reference: reference.to_string(),
                source,
            }),
        }
    }

    async fn fetch_url(&self, reference: &str) -> Result<Document, DocumentError> {
        debug!("Fetching document from {}", reference);

        let fetch_error = |message: String| DocumentError::Fetch {
            reference: reference.to_string(),
            message,
        };

        let response = self
            .http
            .get(reference)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(DocumentError::NotFound(reference.to_string()));
        }
        if !status.is_success() {
            return Err(fetch_error(format!("status {}", status)));
        }

        let content = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        Ok(Document {
            reference: reference.to_string(),
            content,
        })
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn fetch(&self, reference: &str) -> Result<Document, DocumentError> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch_url(reference).await
        } else {
            self.fetch_file(reference).await
        }
    }
}
