//! JSON node shape returned by the resource listing endpoint.
//!
//! The endpoint speaks the lazy-tree format: a flat array of nodes linked by
//! `parent` (`"#"` marks a root), or nested `children` arrays. A `children`
//! value of `true` means "has children, load on expand". The permission
//! payload (`method`, `recursive`) is accepted either on the node itself or
//! under `original`.

use serde::{Deserialize, Serialize};

use super::NodeKind;

/// Parent id the endpoint uses for top-level nodes
pub const ROOT_PARENT: &str = "#";

/// `children` field of a wire node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireChildren {
    /// Lazy-load hint
    Lazy(bool),
    /// Inline child nodes
    Nested(Vec<WireNode>),
}

/// Permission payload attached to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    /// Comma-joined granted actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Whether the grant applies to sub-resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
}

/// One node of an endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    /// Node id, unique within a tree
    pub id: String,
    /// Display text
    #[serde(default)]
    pub text: String,
    /// Parent id, `"#"` or absent for roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Node kind, used for icon selection
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Lazy-load hint or inline children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<WireChildren>,
    /// Top-level permission payload
    #[serde(flatten)]
    pub payload: WirePayload,
    /// Permission payload nested under `original`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<WirePayload>,
}

impl WireNode {
    /// Method string, preferring the top-level field over `original`
    pub fn method(&self) -> String {
        self.payload
            .method
            .clone()
            .or_else(|| self.original.as_ref().and_then(|o| o.method.clone()))
            .unwrap_or_default()
    }

    /// Recursive flag, preferring the top-level field over `original`
    pub fn recursive(&self) -> bool {
        self.payload
            .recursive
            .or_else(|| self.original.as_ref().and_then(|o| o.recursive))
            .unwrap_or(false)
    }

    /// Parent id, with `"#"` mapped to `None`
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| *p != ROOT_PARENT)
    }
}

/// Parse an endpoint response body
pub fn parse_nodes(body: &str) -> Result<Vec<WireNode>, serde_json::Error> {
    serde_json::from_str(body)
}
