//! In-memory resource tree.
//!
//! Nodes live in an arena (`Vec<ResourceNode>`) indexed by their string id.
//! Parent links are plain arena indices: the tree owns every node and a
//! child never keeps its parent alive.
//!
//! # Example
//!
//! ```
//! use perms_dialog::tree::{ResourceTree, wire::parse_nodes};
//!
//! let nodes = parse_nodes(r##"[
//!     {"id":"home","text":"home","parent":"#","type":"toplevel"},
//!     {"id":"home/temp","text":"temp","parent":"home","type":"leaf","method":"read"}
//! ]"##).unwrap();
//!
//! let tree = ResourceTree::from_wire(nodes);
//! assert_eq!(tree.children_of("home"), vec!["home/temp"]);
//! assert_eq!(tree.get("home/temp").unwrap().method, "read");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod wire;

use wire::{WireChildren, WireNode};

/// Kind of a resource node, drives the icon rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Top-level resource
    Toplevel,
    /// Resource without sub-resources
    Leaf,
    /// Reference to another resource
    Reference,
    /// Any other resource; unknown kinds fall back here
    #[default]
    #[serde(other)]
    Default,
}

impl NodeKind {
    /// Icon shown for nodes of this kind
    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Toplevel => "images/tree_small.png",
            NodeKind::Leaf => "images/leaf_small.png",
            NodeKind::Default => "images/branch_small.png",
            NodeKind::Reference => "images/link_small.png",
        }
    }
}

/// A protected resource with its granted actions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    /// Node id, unique within the tree
    pub id: String,
    /// Display text
    pub text: String,
    /// Node kind
    pub kind: NodeKind,
    /// Comma-joined granted actions (may be empty)
    pub method: String,
    /// Whether the grant applies to sub-resources
    pub recursive: bool,
    /// Endpoint reported children that have not been fetched yet
    pub has_children: bool,
    #[serde(skip)]
    parent: Option<usize>,
    #[serde(skip)]
    children: Vec<usize>,
    #[serde(skip)]
    children_loaded: bool,
}

impl ResourceNode {
    fn from_wire(node: &WireNode) -> Self {
        Self {
            id: node.id.clone(),
            text: node.text.clone(),
            kind: node.kind,
            method: node.method(),
            recursive: node.recursive(),
            has_children: matches!(node.children, Some(WireChildren::Lazy(true))),
            parent: None,
            children: Vec::new(),
            children_loaded: matches!(node.children, Some(WireChildren::Nested(_))),
        }
    }

    /// Whether the children of this node still need a lazy load
    pub fn needs_load(&self) -> bool {
        self.has_children && !self.children_loaded
    }
}

/// Arena-backed tree of [`ResourceNode`]s
#[derive(Debug, Clone, Default)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl ResourceTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from an endpoint response
    pub fn from_wire(nodes: Vec<WireNode>) -> Self {
        let mut tree = Self::new();
        tree.attach(None, nodes);
        tree
    }

    /// Attach a batch of nodes below `under` (or at the root when `None`)
    ///
    /// Nodes whose parent is `"#"`, absent or unknown are placed directly
    /// below `under`. Returns the number of nodes added or updated.
    pub fn attach(&mut self, under: Option<&str>, nodes: Vec<WireNode>) -> usize {
        let anchor = under.and_then(|id| self.index.get(id).copied());
        if let Some(slot) = anchor {
            self.nodes[slot].children_loaded = true;
        }

        let mut pending = Vec::new();
        Self::flatten(nodes, None, &mut pending);

        let mut count = 0;
        for (node, nested_parent) in &pending {
            let slot = self.upsert(node);
            let parent = nested_parent
                .as_deref()
                .or_else(|| node.parent_id())
                .and_then(|p| {
                    let found = self.index.get(p).copied();
                    if found.is_none() {
                        warn!("Node '{}' references unknown parent '{}'", node.id, p);
                    }
                    found
                })
                .or(anchor);
            self.link(slot, parent);
            count += 1;
        }
        count
    }

    fn flatten(
        nodes: Vec<WireNode>,
        parent: Option<String>,
        out: &mut Vec<(WireNode, Option<String>)>,
    ) {
        for mut node in nodes {
            let nested = match node.children.take() {
                Some(WireChildren::Nested(children)) => {
                    node.children = Some(WireChildren::Nested(Vec::new()));
                    children
                }
                other => {
                    node.children = other;
                    Vec::new()
                }
            };
            let id = node.id.clone();
            out.push((node, parent.clone()));
            Self::flatten(nested, Some(id), out);
        }
    }

    fn upsert(&mut self, wire: &WireNode) -> usize {
        let fresh = ResourceNode::from_wire(wire);
        match self.index.get(&wire.id) {
            Some(&slot) => {
                let existing = &mut self.nodes[slot];
                existing.text = fresh.text;
                existing.kind = fresh.kind;
                existing.method = fresh.method;
                existing.recursive = fresh.recursive;
                existing.has_children = fresh.has_children;
                slot
            }
            None => {
                let slot = self.nodes.len();
                self.index.insert(wire.id.clone(), slot);
                self.nodes.push(fresh);
                slot
            }
        }
    }

    fn link(&mut self, slot: usize, parent: Option<usize>) {
        if self.nodes[slot].parent == parent && (parent.is_some() || self.roots.contains(&slot)) {
            return;
        }
        match self.nodes[slot].parent {
            Some(old) => self.nodes[old].children.retain(|&c| c != slot),
            None => self.roots.retain(|&r| r != slot),
        }
        self.nodes[slot].parent = parent;
        match parent {
            Some(p) => self.nodes[p].children.push(slot),
            None => self.roots.push(slot),
        }
    }

    /// Look up a node by id
    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Look up a node by id for mutation
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResourceNode> {
        match self.index.get(id) {
            Some(&slot) => Some(&mut self.nodes[slot]),
            None => None,
        }
    }

    /// Whether the tree holds a node with this id
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of the top-level nodes in order
    pub fn roots(&self) -> Vec<&str> {
        self.roots.iter().map(|&s| self.nodes[s].id.as_str()).collect()
    }

    /// Ids of a node's children in order (empty for unknown ids)
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.index
            .get(id)
            .map(|&slot| {
                self.nodes[slot]
                    .children
                    .iter()
                    .map(|&c| self.nodes[c].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Id of a node's parent
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        let slot = *self.index.get(id)?;
        self.nodes[slot].parent.map(|p| self.nodes[p].id.as_str())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }
}
