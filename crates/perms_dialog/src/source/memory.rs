//! In-memory resource source.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ResourceQuery, ResourceSource};
use crate::error::DialogError;
use crate::tree::wire::{parse_nodes, WireNode, ROOT_PARENT};

/// A request seen by a [`MemoryResourceSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Query string that would have been sent
    pub query: String,
    /// Parent id (`"#"` for the top-level load)
    pub parent: String,
}

/// Source that answers from canned JSON bodies keyed by parent id
///
/// Bodies are parsed on every request, so a malformed body surfaces as
/// [`DialogError::JsonDecode`] just like a broken endpoint would. Parents
/// without a body answer with an empty list.
///
/// Clones share the same request log.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceSource {
    bodies: HashMap<String, String>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MemoryResourceSource {
    /// Create a source with no bodies
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for loads below `parent` (`None` for the top level)
    pub fn with_body(mut self, parent: Option<&str>, body: impl Into<String>) -> Self {
        self.bodies
            .insert(parent.unwrap_or(ROOT_PARENT).to_string(), body.into());
        self
    }

    /// Requests served so far, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ResourceSource for MemoryResourceSource {
    async fn list(
        &self,
        query: &ResourceQuery,
        parent: Option<&str>,
    ) -> Result<Vec<WireNode>, DialogError> {
        let key = parent.unwrap_or(ROOT_PARENT);
        self.requests.lock().await.push(RecordedRequest {
            query: query.query_string(),
            parent: key.to_string(),
        });

        match self.bodies.get(key) {
            Some(body) => Ok(parse_nodes(body)?),
            None => {
                debug!("No canned resources below '{}'", key);
                Ok(Vec::new())
            }
        }
    }
}
