//! Permission dialog controller
//!
//! [`PermissionDialog`] owns the row registry, the resource tree adapter and
//! the modal editor state, and applies user events to them. A UI shell calls
//! one method per event (or hands a [`UiEvent`] to
//! [`dispatch`](PermissionDialog::dispatch)) and then reads the state back
//! to paint.
//!
//! # Flow
//!
//! ```text
//! select_node ──► open(node) ──► DialogState { actions, recursive, open }
//!                                    │
//!                toggle_action / set_recursive
//!                                    │
//!              save: encode ──► node.method / node.recursive
//!              cancel: discard, deselect node
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use perms_dialog::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), DialogError> {
//! let source = MemoryResourceSource::new()
//!     .with_body(None, r##"[{"id":"home","text":"Home","parent":"#","method":"read,write"}]"##);
//! let mut dialog = PermissionDialog::new(DialogOptions::default(), Arc::new(source));
//!
//! let row = dialog.register_row(RowSpec {
//!     id: 1,
//!     permission_name: "org.ogema.accesscontrol.ResourcePermission".into(),
//!     filter: Some("path=*".into()),
//!     actions: vec!["read".into(), "write".into()],
//! });
//! dialog.box_check(row).await?;
//! dialog.select_node(row, "home").await?;
//!
//! dialog.toggle_action("write");
//! assert_eq!(dialog.save()?, "read");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::adapter::{HoverScheduler, NodeRef, ResourceTreeAdapter};
use crate::controls::{CheckboxGroup, RowId, RowRegistry, RowSpec, ToggleState};
use crate::encoding::decode_methods;
use crate::error::DialogError;
use crate::options::DialogOptions;
use crate::source::{HttpResourceSource, ResourceQuery, ResourceSource};
use crate::tree::ResourceNode;

mod events;

pub use events::UiEvent;

/// State of the modal permission editor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogState {
    /// Id of the editing session, attached to log lines
    pub session: Uuid,
    /// Node being edited; survives `save` so quick-preview edits can follow
    pub current: Option<NodeRef>,
    /// Action checkboxes of the editor
    pub actions: CheckboxGroup,
    /// "recursive: yes" radio selection
    pub recursive: bool,
    /// Whether the editor is shown
    pub open: bool,
}

impl DialogState {
    fn new(actions: &[String]) -> Self {
        Self {
            session: Uuid::new_v4(),
            current: None,
            actions: CheckboxGroup::new(actions.iter().cloned()),
            recursive: false,
            open: false,
        }
    }
}

/// Controller of one permission-editing page
pub struct PermissionDialog {
    options: DialogOptions,
    rows: RowRegistry,
    adapter: ResourceTreeAdapter,
    state: DialogState,
}

impl PermissionDialog {
    /// Create a dialog loading resources from `source`
    ///
    /// Hover timers are spawned on the ambient tokio runtime.
    pub fn new(options: DialogOptions, source: Arc<dyn ResourceSource>) -> Self {
        let adapter = ResourceTreeAdapter::new(
            source,
            HoverScheduler::new(options.hover_settle_delay),
            options.dialog_actions.clone(),
            options.preview_offset,
        );
        let state = DialogState::new(&options.dialog_actions);
        debug!("Permission dialog session {} created", state.session);
        Self {
            options,
            rows: RowRegistry::new(),
            adapter,
            state,
        }
    }

    /// Create a dialog talking to the HTTP endpoint configured in `options`
    ///
    /// # Errors
    ///
    /// - [`DialogError::Http`] if the HTTP client cannot be built
    pub fn with_http(options: DialogOptions) -> Result<Self, DialogError> {
        let source = HttpResourceSource::new(&options)?;
        Ok(Self::new(options, Arc::new(source)))
    }

    /// Options the dialog was built with
    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    /// Permission rows
    pub fn rows(&self) -> &RowRegistry {
        &self.rows
    }

    /// Resource trees and preview panels
    pub fn adapter(&self) -> &ResourceTreeAdapter {
        &self.adapter
    }

    /// Modal editor state
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// Look up a node of a row's tree
    pub fn node(&self, row: RowId, node: &str) -> Option<&ResourceNode> {
        self.adapter.node(&NodeRef::new(row, node))
    }

    /// Register a server-rendered permission row
    pub fn register_row(&mut self, spec: RowSpec) -> RowId {
        self.rows.register(spec)
    }

    /// Replace a row's filter text
    pub fn set_filter(&mut self, row: RowId, filter: impl Into<String>) -> Result<(), DialogError> {
        self.rows.set_filter(row, filter)
    }

    fn query_for(&self, row: RowId) -> Result<ResourceQuery, DialogError> {
        let controls = self.rows.row(row)?;
        Ok(ResourceQuery::new(
            controls.filter.as_deref(),
            controls.checked_actions(),
        ))
    }

    async fn show_resources(&mut self, row: RowId) -> Result<(), DialogError> {
        let query = self.query_for(row)?;
        self.adapter.show_resources(row, query).await?;

        // The reload replaced every node of the row's tree
        if self.state.current.as_ref().is_some_and(|c| c.row == row) {
            debug!(
                "[{}] Row {} reloaded, closing the editor",
                self.state.session, row
            );
            self.state.current = None;
            self.state.open = false;
            self.state.actions.reset();
        }
        Ok(())
    }

    /// Flip the row's master checkbox and propagate it
    ///
    /// Checking shows (and loads or refreshes) the row's resource tree;
    /// unchecking hides it together with its preview panel. Returns the new
    /// master state.
    pub async fn box_check(&mut self, row: RowId) -> Result<bool, DialogError> {
        let checked = self.rows.toggle_master(row)?;
        debug!(
            "[{}] Row {} master checked={}",
            self.state.session, row, checked
        );
        if checked {
            self.show_resources(row).await?;
        } else {
            self.adapter.hide_resources(row);
        }
        Ok(checked)
    }

    /// Mark the row as edited from `control` and show its resources
    pub async fn customize_permission(&mut self, row: RowId, control: &str) -> Result<(), DialogError> {
        self.rows.customize_permission(row, control)?;
        self.show_resources(row).await
    }

    /// Set every method checkbox of the row; unchecking also clears its preview boxes
    pub fn set_children_checked(&mut self, row: RowId, checked: bool) -> Result<(), DialogError> {
        self.rows.set_children_checked(row, checked)?;
        if !checked {
            self.adapter.clear_preview(row);
        }
        Ok(())
    }

    /// Flip one method checkbox of a row
    pub fn toggle_method(&mut self, row: RowId, action: &str) -> Result<Option<bool>, DialogError> {
        self.rows.toggle_method(row, action)
    }

    /// Mirror one method checkbox on its label highlight
    pub fn single_highlight(&mut self, row: RowId, action: &str) -> Result<(), DialogError> {
        self.rows.single_highlight(row, action)
    }

    /// Flip the row's grant control
    pub fn toggle_grant(&mut self, row: RowId) -> Result<ToggleState, DialogError> {
        self.rows.toggle_grant(row)
    }

    /// Flip the row's deny control
    pub fn toggle_deny(&mut self, row: RowId) -> Result<ToggleState, DialogError> {
        self.rows.toggle_deny(row)
    }

    /// Permission name field changed; returns whether the detail panel is visible
    pub fn permission_name_changed(&mut self, row: RowId, value: &str) -> Result<bool, DialogError> {
        self.rows.all_perm_select(row, value)
    }

    /// Add an administrator-defined permission row for `app`
    pub fn add_additional_permission(&mut self, app: u64) -> Result<RowId, DialogError> {
        self.rows.add_additional_permission(app)
    }

    /// Insert the ad-hoc permission editor; `false` if already present
    pub fn insert_additional_mask(&mut self) -> bool {
        self.rows.insert_additional_mask()
    }

    /// Remove the ad-hoc permission editor
    pub fn remove_additional_mask(&mut self) -> bool {
        self.rows.remove_additional_mask().is_some()
    }

    /// Edit the name, filter and actions fields of an additional row
    pub fn set_additional_row_fields(
        &mut self,
        row: RowId,
        name: impl Into<String>,
        filter: impl Into<String>,
        actions: impl Into<String>,
    ) -> Result<(), DialogError> {
        self.rows.set_additional_row_fields(row, name, filter, actions)
    }

    /// Edit the ad-hoc permission editor's text fields
    pub fn set_additional_fields(
        &mut self,
        name: impl Into<String>,
        filter: impl Into<String>,
        actions: impl Into<String>,
    ) -> Result<(), DialogError> {
        self.rows.set_additional_fields(name, filter, actions)
    }

    /// Flip the ad-hoc editor's grant control
    pub fn toggle_additional_grant(&mut self) -> Result<ToggleState, DialogError> {
        self.rows.toggle_additional_grant()
    }

    /// Flip the ad-hoc editor's deny control
    pub fn toggle_additional_deny(&mut self) -> Result<ToggleState, DialogError> {
        self.rows.toggle_additional_deny()
    }

    /// Lazily load the children of a node
    pub async fn expand(&mut self, row: RowId, node: &str) -> Result<usize, DialogError> {
        self.adapter.expand(row, node).await
    }

    /// Select a node in a row's tree and open the editor for it
    ///
    /// Returns `false` when the row's tree has not loaded yet.
    pub async fn select_node(&mut self, row: RowId, node: &str) -> Result<bool, DialogError> {
        match self.adapter.select(row, node)? {
            Some(node) => {
                self.open(node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Open the editor for `node`, loading its method and recursive flag
    pub fn open(&mut self, node: NodeRef) -> Result<(), DialogError> {
        let resource = self
            .adapter
            .node(&node)
            .ok_or_else(|| DialogError::UnknownNode {
                row: node.row,
                node: node.node.clone(),
            })?;
        let methods = decode_methods(&resource.method);
        let recursive = resource.recursive;

        self.state.actions.reset();
        let unmatched = self.state.actions.check_all_in(&methods);
        if !unmatched.is_empty() {
            debug!(
                "[{}] Ignoring unknown actions {:?} of node '{}'",
                self.state.session, unmatched, node.node
            );
        }
        self.state.recursive = recursive;
        debug!(
            "[{}] Editing node '{}' of row {}",
            self.state.session, node.node, node.row
        );
        self.state.current = Some(node);
        self.state.open = true;
        Ok(())
    }

    /// Flip one action checkbox of the editor
    pub fn toggle_action(&mut self, action: &str) -> Option<bool> {
        self.state.actions.toggle(action)
    }

    /// Choose "recursive: yes" (`true`) or "no"
    pub fn set_recursive(&mut self, recursive: bool) {
        self.state.recursive = recursive;
    }

    /// Close the editor without committing and deselect its node
    pub fn cancel(&mut self) {
        self.state.open = false;
        self.state.actions.reset();
        if let Some(node) = self.state.current.take() {
            self.adapter.deselect(&node);
            debug!(
                "[{}] Edit of node '{}' canceled",
                self.state.session, node.node
            );
        }
    }

    /// Commit the editor into the current node and close it
    ///
    /// Returns the method string written to the node.
    ///
    /// # Errors
    ///
    /// - [`DialogError::NoSelection`] when no node is being edited
    pub fn save(&mut self) -> Result<String, DialogError> {
        let current = self.state.current.clone().ok_or(DialogError::NoSelection)?;
        let method = self.state.actions.encode();
        let recursive = self.state.recursive;

        let node = self.adapter.node_mut(&current)?;
        node.method = method.clone();
        node.recursive = recursive;
        self.state.open = false;
        debug!(
            "[{}] Saved node '{}': method='{}' recursive={}",
            self.state.session, current.node, method, recursive
        );
        Ok(method)
    }

    /// Start the hover timer for a node
    pub fn hover_enter(&mut self, row: RowId, node: &str, top: f32) -> bool {
        self.adapter.hover_enter(row, node, top)
    }

    /// Cancel a node's hover timer and hide the preview
    pub fn hover_leave(&mut self, row: RowId, node: &str) {
        self.adapter.hover_leave(row, node);
    }

    /// Drive hover timers for up to `wait`
    ///
    /// Returns the number of previews revealed.
    pub async fn settle(&mut self, wait: Duration) -> usize {
        let deadline = Instant::now() + wait;
        let mut revealed = 0;
        while let Some(settled) = self.adapter.next_settled(deadline).await {
            if self.adapter.reveal_preview(&settled) {
                revealed += 1;
            } else {
                trace!("Hover for node '{}' settled too late", settled.node);
            }
        }
        revealed
    }

    /// Flip one action checkbox of a row's preview panel
    pub fn toggle_preview_action(&mut self, row: RowId, action: &str) -> Option<bool> {
        self.adapter.toggle_preview_action(row, action)
    }

    /// Write the preview panel's actions into the node being edited
    ///
    /// The panel is hidden and cleared afterwards. Returns the method string
    /// written.
    ///
    /// # Errors
    ///
    /// - [`DialogError::NoSelection`] when no node is being edited; the
    ///   panel is left as it was
    /// - [`DialogError::UnknownRow`] when the row never showed its tree
    pub fn apply_preview(&mut self, row: RowId) -> Result<String, DialogError> {
        let current = self.state.current.clone().ok_or(DialogError::NoSelection)?;
        let method = self
            .adapter
            .take_preview_method(row)
            .ok_or(DialogError::UnknownRow(row))?;
        self.adapter.node_mut(&current)?.method = method.clone();
        debug!(
            "[{}] Preview applied to node '{}': method='{}'",
            self.state.session, current.node, method
        );
        Ok(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryResourceSource;

    const NODES: &str = r##"[
        {"id":"home","text":"Home","parent":"#","type":"toplevel","method":"read,write","recursive":true},
        {"id":"lamp","text":"Lamp","parent":"#","type":"leaf","method":""}
    ]"##;

    async fn dialog() -> (PermissionDialog, RowId) {
        let source = MemoryResourceSource::new().with_body(None, NODES);
        let options = DialogOptions::builder()
            .dialog_actions(vec!["read".into(), "write".into(), "execute".into()])
            .build();
        let mut dialog = PermissionDialog::new(options, Arc::new(source));
        let row = dialog.register_row(RowSpec {
            id: 1,
            permission_name: "org.ogema.accesscontrol.ResourcePermission".into(),
            filter: Some("path=*".into()),
            actions: vec!["read".into(), "write".into()],
        });
        dialog.box_check(row).await.unwrap();
        (dialog, row)
    }

    #[tokio::test]
    async fn test_open_decodes_method_and_recursive() {
        let (mut dialog, row) = dialog().await;
        assert!(dialog.select_node(row, "home").await.unwrap());

        let state = dialog.state();
        assert!(state.open);
        assert!(state.recursive);
        assert!(state.actions.is_checked("read"));
        assert!(state.actions.is_checked("write"));
        assert!(!state.actions.is_checked("execute"));
    }

    #[tokio::test]
    async fn test_reopen_resets_previous_checks() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "home").await.unwrap();
        dialog.select_node(row, "lamp").await.unwrap();
        assert_eq!(dialog.state().actions.checked_count(), 0);
        assert!(!dialog.state().recursive);
    }

    #[tokio::test]
    async fn test_save_writes_node() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "lamp").await.unwrap();
        dialog.toggle_action("execute");
        dialog.set_recursive(true);

        assert_eq!(dialog.save().unwrap(), "execute");
        let node = dialog.node(row, "lamp").unwrap();
        assert_eq!(node.method, "execute");
        assert!(node.recursive);
        assert!(!dialog.state().open);
    }

    #[tokio::test]
    async fn test_save_empty_selection() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "home").await.unwrap();
        dialog.toggle_action("read");
        dialog.toggle_action("write");
        dialog.set_recursive(false);

        assert_eq!(dialog.save().unwrap(), "");
        assert!(!dialog.node(row, "home").unwrap().recursive);
    }

    #[tokio::test]
    async fn test_cancel_discards_and_deselects() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "home").await.unwrap();
        dialog.toggle_action("write");
        dialog.cancel();

        assert!(!dialog.state().open);
        assert!(dialog.state().current.is_none());
        assert_eq!(dialog.state().actions.checked_count(), 0);
        assert!(!dialog.adapter().is_selected(&NodeRef::new(row, "home")));
        assert_eq!(dialog.node(row, "home").unwrap().method, "read,write");
        assert!(matches!(dialog.save(), Err(DialogError::NoSelection)));
    }

    #[tokio::test]
    async fn test_box_uncheck_hides_tree() {
        let (mut dialog, row) = dialog().await;
        assert!(dialog.adapter().widget(row).unwrap().visible);
        assert!(!dialog.box_check(row).await.unwrap());
        assert!(!dialog.adapter().widget(row).unwrap().visible);
        assert_eq!(dialog.rows().row(row).unwrap().methods.checked_count(), 0);
    }

    #[tokio::test]
    async fn test_apply_preview_without_selection() {
        let (mut dialog, row) = dialog().await;
        dialog.toggle_preview_action(row, "read");
        assert!(matches!(
            dialog.apply_preview(row),
            Err(DialogError::NoSelection)
        ));
        let preview = &dialog.adapter().widget(row).unwrap().preview;
        assert!(preview.checkboxes.is_checked("read"));
    }

    #[tokio::test]
    async fn test_apply_preview_writes_current_node() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "lamp").await.unwrap();
        dialog.toggle_preview_action(row, "write");

        assert_eq!(dialog.apply_preview(row).unwrap(), "write");
        assert_eq!(dialog.node(row, "lamp").unwrap().method, "write");
        let preview = &dialog.adapter().widget(row).unwrap().preview;
        assert_eq!(preview.checkboxes.checked_count(), 0);
    }

    #[tokio::test]
    async fn test_reload_drops_node_being_edited() {
        let (mut dialog, row) = dialog().await;
        dialog.select_node(row, "home").await.unwrap();

        // Uncheck then check again: the second check reloads the tree
        dialog.box_check(row).await.unwrap();
        dialog.box_check(row).await.unwrap();

        assert!(dialog.state().current.is_none());
        assert!(!dialog.state().open);
        assert!(matches!(dialog.save(), Err(DialogError::NoSelection)));
    }

    #[tokio::test]
    async fn test_reload_of_other_row_keeps_editor() {
        let (mut dialog, row) = dialog().await;
        let other = dialog.register_row(RowSpec {
            id: 2,
            actions: vec!["read".into()],
            ..Default::default()
        });
        dialog.select_node(row, "lamp").await.unwrap();
        dialog.customize_permission(other, "customize2").await.unwrap();

        assert_eq!(dialog.state().current, Some(NodeRef::new(row, "lamp")));
        assert!(dialog.state().open);
    }

    #[tokio::test]
    async fn test_additional_row_fields() {
        let (mut dialog, _) = dialog().await;
        let extra = dialog.add_additional_permission(3).unwrap();
        dialog
            .set_additional_row_fields(extra, "java.io.FilePermission", "/tmp/*", "read,write")
            .unwrap();

        let row = dialog.rows().row(extra).unwrap();
        assert_eq!(row.permission_name, "java.io.FilePermission");
        assert_eq!(row.filter_text(), "/tmp/*");
        assert_eq!(row.actions_text, "read,write");
        assert!(matches!(
            dialog.set_additional_row_fields(RowId(4), "x", "", ""),
            Err(DialogError::UnknownRow(RowId(4)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_row_errors() {
        let (mut dialog, _) = dialog().await;
        assert!(matches!(
            dialog.box_check(RowId(99)).await,
            Err(DialogError::UnknownRow(RowId(99)))
        ));
        assert!(matches!(
            dialog.permission_name_changed(RowId(99), "x"),
            Err(DialogError::UnknownRow(_))
        ));
    }
}
