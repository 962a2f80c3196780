//! Resource listing sources
//!
//! This module provides the [`ResourceSource`] trait, the async seam through
//! which the tree adapter loads protected resources, and [`ResourceQuery`],
//! which turns a row's filter text and checked actions into the endpoint's
//! query string.
//!
//! # Implementations
//!
//! - [`HttpResourceSource`] - `GET`s the admin service's resource endpoint
//! - [`MemoryResourceSource`] - serves canned bodies from memory (tests, demos)
//!
//! # Query format
//!
//! ```
//! use perms_dialog::source::ResourceQuery;
//!
//! let query = ResourceQuery::new(Some("path=home/*,type=Room"), ["read", "write"]);
//! assert_eq!(query.query_string(), "path=home/*&type=Room&action=read,write");
//!
//! // A missing filter reads as empty
//! let query = ResourceQuery::new(None, ["read"]);
//! assert_eq!(query.query_string(), "&action=read");
//! ```

use async_trait::async_trait;

use crate::encoding::encode_checked_actions;
use crate::error::DialogError;
use crate::tree::wire::WireNode;

mod http;
mod memory;

pub use http::HttpResourceSource;
pub use memory::{MemoryResourceSource, RecordedRequest};

/// Filter and action parameters of a resource listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    /// Comma-separated filter fragments, passed through as query pairs
    pub filter: String,
    /// Checked action labels, in checkbox order
    pub actions: Vec<String>,
}

impl ResourceQuery {
    /// Build a query; a missing filter is treated as `""`
    pub fn new<I, S>(filter: Option<&str>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filter: filter.unwrap_or("").to_string(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Query string without the leading `?`
    ///
    /// Filter fragments are joined by `&` and followed by
    /// `&action=<comma-joined actions>`.
    pub fn query_string(&self) -> String {
        let fragments: Vec<&str> = self.filter.split(',').collect();
        format!(
            "{}&action={}",
            fragments.join("&"),
            encode_checked_actions(&self.actions)
        )
    }

    /// Full request URL for `endpoint_path` below `base_url`
    pub fn url(&self, base_url: &str, endpoint_path: &str) -> String {
        format!(
            "{}{}?{}",
            base_url.trim_end_matches('/'),
            endpoint_path,
            self.query_string()
        )
    }
}

/// Source of resource tree nodes
///
/// `parent` is `None` for the top-level load and the id of the expanded node
/// for lazy child loads.
///
/// # Example
///
/// ```
/// use perms_dialog::source::{MemoryResourceSource, ResourceQuery, ResourceSource};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), perms_dialog::error::DialogError> {
/// let source = MemoryResourceSource::new()
///     .with_body(None, r#"[{"id":"home","text":"Home"}]"#);
///
/// let nodes = source.list(&ResourceQuery::default(), None).await?;
/// assert_eq!(nodes[0].id, "home");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Fetch the nodes below `parent` matching `query`
    ///
    /// # Errors
    ///
    /// - [`DialogError::Http`] / [`DialogError::Endpoint`] for transport failures
    /// - [`DialogError::JsonDecode`] for bodies that are not a node list
    async fn list(
        &self,
        query: &ResourceQuery,
        parent: Option<&str>,
    ) -> Result<Vec<WireNode>, DialogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_with_filter_fragments() {
        let query = ResourceQuery::new(Some("path=a,type=b,owner=c"), ["read"]);
        assert_eq!(query.query_string(), "path=a&type=b&owner=c&action=read");
    }

    #[test]
    fn test_query_without_actions() {
        let query = ResourceQuery::new(Some("path=a"), Vec::<String>::new());
        assert_eq!(query.query_string(), "path=a&action=");
    }

    #[test]
    fn test_missing_filter_is_empty() {
        let query = ResourceQuery::new(None, ["read", "write"]);
        assert_eq!(query.filter, "");
        assert_eq!(query.query_string(), "&action=read,write");
        assert!(!query.query_string().contains("undefined"));
    }

    #[test]
    fn test_full_url() {
        let query = ResourceQuery::new(Some("path=x"), ["read"]);
        assert_eq!(
            query.url("http://localhost:8080/", "/service/filteredresources"),
            "http://localhost:8080/service/filteredresources?path=x&action=read"
        );
    }
}
