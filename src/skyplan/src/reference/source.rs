//! Document sources for reference data
//!
//! A source turns a document path (e.g. `races.json`) into its text. Where the
//! documents live is the source's business; the repository only sees paths.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors reported by a document source
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Something that can fetch a JSON document by path
pub trait DocumentSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch(path)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Arc<S> {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch(path)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch(path)
    }
}

/// Reads documents from a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSource for DirectorySource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        fs::read_to_string(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(full.display().to_string())
            } else {
                FetchError::Io {
                    path: full.display().to_string(),
                    source,
                }
            }
        })
    }
}

/// Documents held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, document: impl Into<String>) {
        self.documents.insert(path.into(), document.into());
    }

    pub fn with(mut self, path: impl Into<String>, document: impl Into<String>) -> Self {
        self.insert(path, document);
        self
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

/// Fetches documents over HTTP relative to a base URL
#[cfg(feature = "http")]
pub struct HttpSource {
    base_url: String,
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(feature = "http")]
impl DocumentSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        tracing::debug!(%url, "fetching reference document");
        match self.agent.get(&url).call() {
            Ok(response) => response.into_string().map_err(|source| FetchError::Io {
                path: url.clone(),
                source,
            }),
            Err(ureq::Error::Status(status, _)) => Err(FetchError::Status { url, status }),
            Err(e) => Err(FetchError::Transport(e.to_string())),
        }
    }
}
