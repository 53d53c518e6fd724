//! Documents repo, the remote per-user document service addressed by slash separated paths
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use failure::Error as FailureError;
use futures::future;
use serde_json;

use errors::Error;
use repos::types::{RepoFuture, RepoResult};

pub trait DocumentsRepo {
    /// Document stored at `path`
    fn get(&self, path: &str) -> RepoFuture<Option<serde_json::Value>>;

    /// Creates or replaces the document at `path`
    fn set(&self, path: &str, document: serde_json::Value) -> RepoFuture<()>;

    /// Removes the document at `path`, missing documents are fine
    fn delete(&self, path: &str) -> RepoFuture<()>;

    /// Documents directly below `prefix`
    fn list(&self, prefix: &str) -> RepoFuture<Vec<serde_json::Value>>;
}

/// Documents service kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryDocumentsRepo {
    inner: Arc<Mutex<BTreeMap<String, serde_json::Value>>>,
}

impl InMemoryDocumentsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> RepoResult<MutexGuard<BTreeMap<String, serde_json::Value>>> {
        self.inner
            .lock()
            .map_err(|_| FailureError::from(format_err!("Documents lock is poisoned").context(Error::Storage)))
    }
}

impl DocumentsRepo for InMemoryDocumentsRepo {
    fn get(&self, path: &str) -> RepoFuture<Option<serde_json::Value>> {
        Box::new(future::result(self.documents().map(|documents| documents.get(path).cloned())))
    }

    fn set(&self, path: &str, document: serde_json::Value) -> RepoFuture<()> {
        Box::new(future::result(self.documents().map(|mut documents| {
            documents.insert(path.to_string(), document);
        })))
    }

    fn delete(&self, path: &str) -> RepoFuture<()> {
        Box::new(future::result(self.documents().map(|mut documents| {
            documents.remove(path);
        })))
    }

    fn list(&self, prefix: &str) -> RepoFuture<Vec<serde_json::Value>> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        Box::new(future::result(self.documents().map(|documents| {
            documents
                .iter()
                .filter(|(path, _)| path.starts_with(&prefix) && !path[prefix.len()..].contains('/'))
                .map(|(_, document)| document.clone())
                .collect()
        })))
    }
}
