//! Resource tree adapter
//!
//! Binds one lazily-loaded checkbox tree per permission row to a
//! [`ResourceSource`], and turns tree events (select, hover, expand) into
//! state the dialog controller can act on.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 ResourceTreeAdapter                  │
//! │                                                      │
//! │  widgets: HashMap<RowId, TreeWidget>                 │
//! │    ├─ ResourceTree (arena of nodes)                  │
//! │    ├─ selection                                      │
//! │    └─ QuickPreview (hover panel)                     │
//! │                                                      │
//! │  hover: HoverScheduler (cancelable settle timers)    │
//! │  source: Arc<dyn ResourceSource>                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The adapter never touches the dialog's state. [`select`](ResourceTreeAdapter::select)
//! returns a [`NodeRef`] and the controller takes it from there.
//!
//! Until a row's first load completes, node-addressed operations on that
//! row are no-ops.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::controls::{CheckboxGroup, RowId};
use crate::encoding::decode_methods;
use crate::error::DialogError;
use crate::source::{ResourceQuery, ResourceSource};
use crate::tree::{ResourceNode, ResourceTree};

pub mod hover;

pub use hover::{HoverScheduler, HoverSettled};

/// Reference to a node in a row's tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    /// Row owning the tree
    pub row: RowId,
    /// Node id within that tree
    pub node: String,
}

impl NodeRef {
    /// Create a reference
    pub fn new(row: RowId, node: impl Into<String>) -> Self {
        Self {
            row,
            node: node.into(),
        }
    }
}

/// Construction settings of a tree widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeWidgetSettings {
    /// Decorate nodes with checkboxes
    pub checkbox: bool,
    /// Clicking anywhere on the row selects the node
    pub whole_row: bool,
    /// Parent checkboxes derive their state from children
    pub three_state: bool,
    /// Keep the selected style on checked nodes
    pub keep_selected_style: bool,
    /// Striped row background
    pub stripes: bool,
    /// Open/close animation in milliseconds
    pub animation: u32,
}

impl Default for TreeWidgetSettings {
    fn default() -> Self {
        Self {
            checkbox: true,
            whole_row: true,
            three_state: false,
            keep_selected_style: false,
            stripes: true,
            animation: 0,
        }
    }
}

/// Hover-triggered read view of a node's methods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickPreview {
    /// Whether the panel is shown
    pub visible: bool,
    /// Action checkboxes of the panel
    pub checkboxes: CheckboxGroup,
    /// Node the panel was revealed for
    pub anchor: Option<String>,
    /// Caption text (the node's display text)
    pub caption: String,
    /// Top coordinate of the panel
    pub top: f32,
}

impl QuickPreview {
    fn new(actions: &[String]) -> Self {
        Self {
            visible: false,
            checkboxes: CheckboxGroup::new(actions.iter().cloned()),
            anchor: None,
            caption: String::new(),
            top: 0.0,
        }
    }

    fn hide_and_clear(&mut self) {
        self.visible = false;
        self.checkboxes.reset();
        self.anchor = None;
        self.caption.clear();
    }
}

/// Tree widget of one permission row
#[derive(Debug, Clone)]
pub struct TreeWidget {
    /// Construction settings
    pub settings: TreeWidgetSettings,
    /// Query used for the last load
    pub query: ResourceQuery,
    /// Loaded nodes
    pub tree: ResourceTree,
    /// Whether the first load has completed
    pub loaded: bool,
    /// Whether the tree container is shown
    pub visible: bool,
    /// Selected node ids
    pub selected: BTreeSet<String>,
    /// Hover preview panel
    pub preview: QuickPreview,
    /// Number of top-level loads issued (initial load plus refreshes)
    pub loads: u32,
}

impl TreeWidget {
    fn new(query: ResourceQuery, actions: &[String]) -> Self {
        Self {
            settings: TreeWidgetSettings::default(),
            query,
            tree: ResourceTree::new(),
            loaded: false,
            visible: false,
            selected: BTreeSet::new(),
            preview: QuickPreview::new(actions),
            loads: 0,
        }
    }
}

/// Adapter between permission rows and their resource trees
pub struct ResourceTreeAdapter {
    source: Arc<dyn ResourceSource>,
    widgets: HashMap<RowId, TreeWidget>,
    hover: HoverScheduler,
    actions: Vec<String>,
    preview_offset: f32,
}

impl ResourceTreeAdapter {
    /// Create an adapter
    ///
    /// `actions` are the preview panel's checkbox labels.
    pub fn new(
        source: Arc<dyn ResourceSource>,
        hover: HoverScheduler,
        actions: Vec<String>,
        preview_offset: f32,
    ) -> Self {
        Self {
            source,
            widgets: HashMap::new(),
            hover,
            actions,
            preview_offset,
        }
    }

    /// The widget of a row, if it was ever shown
    pub fn widget(&self, row: RowId) -> Option<&TreeWidget> {
        self.widgets.get(&row)
    }

    fn loaded_widget(&self, row: RowId) -> Option<&TreeWidget> {
        self.widgets.get(&row).filter(|w| w.loaded)
    }

    fn loaded_widget_mut(&mut self, row: RowId) -> Option<&mut TreeWidget> {
        self.widgets.get_mut(&row).filter(|w| w.loaded)
    }

    /// Look up a node
    pub fn node(&self, node: &NodeRef) -> Option<&ResourceNode> {
        self.widgets.get(&node.row)?.tree.get(&node.node)
    }

    pub(crate) fn node_mut(&mut self, node: &NodeRef) -> Result<&mut ResourceNode, DialogError> {
        self.widgets
            .get_mut(&node.row)
            .and_then(|w| w.tree.get_mut(&node.node))
            .ok_or_else(|| DialogError::UnknownNode {
                row: node.row,
                node: node.node.clone(),
            })
    }

    /// Show the row's resource tree, creating it on first use
    ///
    /// An existing widget is refreshed with `query`; a new one is built
    /// with the default [`TreeWidgetSettings`] and loaded. Either way the
    /// row keeps exactly one widget.
    ///
    /// # Errors
    ///
    /// Errors from the [`ResourceSource`]. The widget then stays unloaded
    /// (or keeps its previous nodes) and the next call retries.
    pub async fn show_resources(&mut self, row: RowId, query: ResourceQuery) -> Result<(), DialogError> {
        let source = self.source.clone();
        let widget = match self.widgets.entry(row) {
            Entry::Occupied(entry) => {
                debug!("Refreshing resource tree for row {}", row);
                let widget = entry.into_mut();
                widget.query = query;
                widget
            }
            Entry::Vacant(entry) => {
                debug!("Creating resource tree for row {}", row);
                entry.insert(TreeWidget::new(query, &self.actions))
            }
        };
        widget.visible = true;
        widget.loads += 1;

        let nodes = source.list(&widget.query, None).await?;
        debug!("Row {} loaded {} top-level nodes", row, nodes.len());

        widget.tree = ResourceTree::from_wire(nodes);
        widget.selected.clear();
        widget.loaded = true;
        Ok(())
    }

    /// Hide the row's tree container and clear its preview panel
    pub fn hide_resources(&mut self, row: RowId) {
        self.hover.cancel_row(row);
        if let Some(widget) = self.widgets.get_mut(&row) {
            widget.visible = false;
            widget.preview.hide_and_clear();
        }
    }

    /// Uncheck the preview panel's checkboxes without hiding anything
    pub fn clear_preview(&mut self, row: RowId) {
        if let Some(widget) = self.widgets.get_mut(&row) {
            widget.preview.checkboxes.reset();
        }
    }

    /// Lazily load the children of a node
    ///
    /// Returns the number of nodes added; `0` when the row is not loaded or
    /// the node's children are already present.
    pub async fn expand(&mut self, row: RowId, node: &str) -> Result<usize, DialogError> {
        let source = self.source.clone();
        let Some(widget) = self.loaded_widget_mut(row) else {
            debug!("Ignoring expand on row {} before its tree loaded", row);
            return Ok(0);
        };
        let needs_load = match widget.tree.get(node) {
            Some(n) => n.needs_load(),
            None => {
                return Err(DialogError::UnknownNode {
                    row,
                    node: node.to_string(),
                })
            }
        };
        if !needs_load {
            return Ok(0);
        }

        let children = source.list(&widget.query, Some(node)).await?;
        let added = widget.tree.attach(Some(node), children);
        debug!("Row {} node '{}' loaded {} children", row, node, added);
        Ok(added)
    }

    /// Select a node, returning the reference to hand to the dialog
    ///
    /// Returns `Ok(None)` when the row's tree has not loaded yet.
    pub fn select(&mut self, row: RowId, node: &str) -> Result<Option<NodeRef>, DialogError> {
        let Some(widget) = self.loaded_widget_mut(row) else {
            debug!("Ignoring select on row {} before its tree loaded", row);
            return Ok(None);
        };
        if !widget.tree.contains(node) {
            return Err(DialogError::UnknownNode {
                row,
                node: node.to_string(),
            });
        }
        widget.selected.insert(node.to_string());
        Ok(Some(NodeRef::new(row, node)))
    }

    /// Deselect a node (no-op when not selected)
    pub fn deselect(&mut self, node: &NodeRef) {
        if let Some(widget) = self.widgets.get_mut(&node.row) {
            widget.selected.remove(&node.node);
        }
    }

    /// Whether a node is selected
    pub fn is_selected(&self, node: &NodeRef) -> bool {
        self.widgets
            .get(&node.row)
            .is_some_and(|w| w.selected.contains(&node.node))
    }

    /// Start the hover settle timer for a node at `top`
    ///
    /// Returns whether a timer was scheduled.
    pub fn hover_enter(&mut self, row: RowId, node: &str, top: f32) -> bool {
        let known = self
            .loaded_widget(row)
            .is_some_and(|w| w.tree.contains(node));
        if !known {
            trace!("Ignoring hover on row {} node '{}'", row, node);
            return false;
        }
        self.hover.schedule(row, node, top);
        true
    }

    /// Cancel the node's timer and hide the preview immediately
    pub fn hover_leave(&mut self, row: RowId, node: &str) {
        self.hover.cancel(row, node);
        if let Some(widget) = self.widgets.get_mut(&row) {
            widget.preview.visible = false;
        }
    }

    /// Wait for the next hover timer until `deadline`
    pub async fn next_settled(&mut self, deadline: Instant) -> Option<HoverSettled> {
        self.hover.next_until(deadline).await
    }

    /// Reveal the preview for a fired timer
    ///
    /// Stale messages (node no longer focused, tree reloaded) are dropped.
    /// Returns whether the preview was revealed.
    pub fn reveal_preview(&mut self, settled: &HoverSettled) -> bool {
        if !self.hover.settle(settled) {
            return false;
        }
        let offset = self.preview_offset;
        let Some(widget) = self.loaded_widget_mut(settled.row) else {
            return false;
        };
        let Some(node) = widget.tree.get(&settled.node) else {
            warn!(
                "Hovered node '{}' vanished from row {}",
                settled.node, settled.row
            );
            return false;
        };

        let methods = decode_methods(&node.method);
        let caption = node.text.clone();
        let preview = &mut widget.preview;
        preview.checkboxes.reset();
        let unmatched = preview.checkboxes.check_all_in(&methods);
        if !unmatched.is_empty() {
            debug!("Preview has no checkbox for {:?}", unmatched);
        }
        preview.anchor = Some(settled.node.clone());
        preview.caption = caption;
        preview.top = settled.top + offset;
        preview.visible = true;
        true
    }

    /// Flip one action checkbox of the row's preview panel
    pub fn toggle_preview_action(&mut self, row: RowId, action: &str) -> Option<bool> {
        self.widgets.get_mut(&row)?.preview.checkboxes.toggle(action)
    }

    /// Encode the preview's checked actions, then hide and clear it
    pub(crate) fn take_preview_method(&mut self, row: RowId) -> Option<String> {
        let preview = &mut self.widgets.get_mut(&row)?.preview;
        let method = preview.checkboxes.encode();
        preview.hide_and_clear();
        Some(method)
    }

    /// Number of hover timers still pending
    pub fn pending_hovers(&self) -> usize {
        self.hover.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryResourceSource;
    use std::time::Duration;

    const TREE: &str = r##"[
        {"id":"home","text":"Home","parent":"#","type":"toplevel","children":true,"method":"read"},
        {"id":"garage","text":"Garage","parent":"#","method":"read,write"}
    ]"##;

    fn adapter(source: MemoryResourceSource) -> ResourceTreeAdapter {
        ResourceTreeAdapter::new(
            Arc::new(source),
            HoverScheduler::new(Duration::from_millis(1000)),
            vec!["read".to_string(), "write".to_string(), "delete".to_string()],
            33.0,
        )
    }

    #[tokio::test]
    async fn test_show_resources_is_idempotent() {
        let source = MemoryResourceSource::new().with_body(None, TREE);
        let mut adapter = adapter(source.clone());

        adapter
            .show_resources(RowId(1), ResourceQuery::new(Some("path=*"), ["read"]))
            .await
            .unwrap();
        adapter
            .show_resources(RowId(1), ResourceQuery::new(Some("path=*"), ["write"]))
            .await
            .unwrap();

        let widget = adapter.widget(RowId(1)).unwrap();
        assert_eq!(widget.loads, 2);
        assert!(widget.loaded);
        assert!(widget.visible);
        assert_eq!(widget.tree.roots(), vec!["home", "garage"]);
        assert!(widget.settings.checkbox && widget.settings.whole_row);
        assert!(!widget.settings.three_state);

        let requests = source.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].query, "path=*&action=write");
    }

    #[tokio::test]
    async fn test_failed_load_leaves_row_unloaded() {
        let mut adapter = adapter(MemoryResourceSource::new().with_body(None, "oops"));
        let result = adapter.show_resources(RowId(1), ResourceQuery::default()).await;
        assert!(matches!(result, Err(DialogError::JsonDecode(_))));
        assert!(!adapter.widget(RowId(1)).unwrap().loaded);
        assert_eq!(adapter.select(RowId(1), "home").unwrap(), None);
    }

    #[tokio::test]
    async fn test_operations_before_load_are_noops() {
        let mut adapter = adapter(MemoryResourceSource::new());
        assert_eq!(adapter.select(RowId(4), "home").unwrap(), None);
        assert!(!adapter.hover_enter(RowId(4), "home", 0.0));
        assert_eq!(adapter.expand(RowId(4), "home").await.unwrap(), 0);
        adapter.hover_leave(RowId(4), "home");
        adapter.hide_resources(RowId(4));
        assert!(adapter.widget(RowId(4)).is_none());
    }

    #[tokio::test]
    async fn test_select_unknown_node() {
        let mut adapter = adapter(MemoryResourceSource::new().with_body(None, TREE));
        adapter.show_resources(RowId(1), ResourceQuery::default()).await.unwrap();
        assert!(matches!(
            adapter.select(RowId(1), "attic"),
            Err(DialogError::UnknownNode { .. })
        ));

        let selected = adapter.select(RowId(1), "garage").unwrap().unwrap();
        assert!(adapter.is_selected(&selected));
        adapter.deselect(&selected);
        assert!(!adapter.is_selected(&selected));
    }

    #[tokio::test]
    async fn test_expand_loads_once() {
        let source = MemoryResourceSource::new()
            .with_body(None, TREE)
            .with_body(Some("home"), r#"[{"id":"home/room","text":"Room","type":"leaf"}]"#);
        let mut adapter = adapter(source.clone());
        adapter.show_resources(RowId(1), ResourceQuery::default()).await.unwrap();

        assert_eq!(adapter.expand(RowId(1), "home").await.unwrap(), 1);
        assert_eq!(adapter.expand(RowId(1), "home").await.unwrap(), 0);
        assert_eq!(adapter.expand(RowId(1), "garage").await.unwrap(), 0);

        let tree = &adapter.widget(RowId(1)).unwrap().tree;
        assert_eq!(tree.parent_of("home/room"), Some("home"));
        assert_eq!(source.requests().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_reveals_preview_below_node() {
        let mut adapter = adapter(MemoryResourceSource::new().with_body(None, TREE));
        adapter.show_resources(RowId(1), ResourceQuery::default()).await.unwrap();

        assert!(adapter.hover_enter(RowId(1), "garage", 100.0));
        let settled = adapter
            .next_settled(Instant::now() + Duration::from_secs(2))
            .await
            .unwrap();
        assert!(adapter.reveal_preview(&settled));

        let preview = &adapter.widget(RowId(1)).unwrap().preview;
        assert!(preview.visible);
        assert_eq!(preview.top, 133.0);
        assert_eq!(preview.caption, "Garage");
        assert_eq!(preview.anchor.as_deref(), Some("garage"));
        assert_eq!(preview.checkboxes.encode(), "read,write");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_timer_for_left_node_is_noop() {
        let mut adapter = adapter(MemoryResourceSource::new().with_body(None, TREE));
        adapter.show_resources(RowId(1), ResourceQuery::default()).await.unwrap();

        adapter.hover_enter(RowId(1), "home", 0.0);
        adapter.hover_leave(RowId(1), "home");
        adapter.hover_enter(RowId(1), "garage", 20.0);

        // A message for "home" that slipped through before the abort
        let late = HoverSettled {
            row: RowId(1),
            node: "home".to_string(),
            top: 0.0,
            ticket: 1,
        };
        assert!(!adapter.reveal_preview(&late));
        assert!(!adapter.widget(RowId(1)).unwrap().preview.visible);
    }

    #[tokio::test]
    async fn test_take_preview_method_clears_panel() {
        let mut adapter = adapter(MemoryResourceSource::new().with_body(None, TREE));
        adapter.show_resources(RowId(1), ResourceQuery::default()).await.unwrap();
        adapter.toggle_preview_action(RowId(1), "delete");
        adapter.toggle_preview_action(RowId(1), "read");

        assert_eq!(adapter.take_preview_method(RowId(1)).as_deref(), Some("read,delete"));
        let preview = &adapter.widget(RowId(1)).unwrap().preview;
        assert!(!preview.visible);
        assert_eq!(preview.checkboxes.checked_count(), 0);
        assert!(preview.caption.is_empty());
    }
}
