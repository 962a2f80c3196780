//! UI events and their dispatch.
//!
//! Events are plain serde values so a shell can forward them as JSON:
//!
//! ```
//! use perms_dialog::dialog::UiEvent;
//! use perms_dialog::controls::RowId;
//!
//! let event: UiEvent = serde_json::from_str(r#"{"type":"box_check","row":4}"#).unwrap();
//! assert_eq!(event, UiEvent::BoxCheck { row: RowId(4) });
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::PermissionDialog;
use crate::controls::RowId;
use crate::error::DialogError;

/// A user interaction with the dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Master checkbox of a row clicked
    BoxCheck {
        /// Row
        row: RowId,
    },
    /// A non-master control of a row edited
    Customize {
        /// Row
        row: RowId,
        /// Name of the edited control
        control: String,
    },
    /// Set all method checkboxes of a row
    SetChildrenChecked {
        /// Row
        row: RowId,
        /// New state
        checked: bool,
    },
    /// A method checkbox of a row clicked
    ToggleMethod {
        /// Row
        row: RowId,
        /// Action label
        action: String,
    },
    /// Grant checkbox of a row clicked
    ToggleGrant {
        /// Row
        row: RowId,
    },
    /// Deny checkbox of a row clicked
    ToggleDeny {
        /// Row
        row: RowId,
    },
    /// Permission name field of a row changed
    PermissionNameChanged {
        /// Row
        row: RowId,
        /// New field value
        value: String,
    },
    /// Filter field of a row changed
    SetFilter {
        /// Row
        row: RowId,
        /// New filter text
        filter: String,
    },
    /// "Add permission" clicked for an app
    AddAdditionalPermission {
        /// App number
        app: u64,
    },
    /// Text fields of an additional permission row changed
    SetAdditionalRowFields {
        /// Row
        row: RowId,
        /// Permission name
        name: String,
        /// Resource filter
        filter: String,
        /// Comma-separated actions
        actions: String,
    },
    /// Ad-hoc permission editor requested
    InsertAdditionalMask,
    /// Ad-hoc permission editor closed
    RemoveAdditionalMask,
    /// Ad-hoc permission editor fields changed
    SetAdditionalFields {
        /// Permission name
        name: String,
        /// Resource filter
        filter: String,
        /// Comma-separated actions
        actions: String,
    },
    /// Ad-hoc grant checkbox clicked
    ToggleAdditionalGrant,
    /// Ad-hoc deny checkbox clicked
    ToggleAdditionalDeny,
    /// Tree node opened
    Expand {
        /// Row
        row: RowId,
        /// Node id
        node: String,
    },
    /// Tree node selected
    SelectNode {
        /// Row
        row: RowId,
        /// Node id
        node: String,
    },
    /// Pointer entered a tree node
    HoverEnter {
        /// Row
        row: RowId,
        /// Node id
        node: String,
        /// Top coordinate of the node
        top: f32,
    },
    /// Pointer left a tree node
    HoverLeave {
        /// Row
        row: RowId,
        /// Node id
        node: String,
    },
    /// Preview panel checkbox clicked
    TogglePreviewAction {
        /// Row
        row: RowId,
        /// Action label
        action: String,
    },
    /// Preview panel "apply" clicked
    ApplyPreview {
        /// Row
        row: RowId,
    },
    /// Editor action checkbox clicked
    ToggleAction {
        /// Action label
        action: String,
    },
    /// Editor recursive radio changed
    SetRecursive {
        /// "yes" selected
        recursive: bool,
    },
    /// Editor "save" clicked
    Save,
    /// Editor "cancel" clicked
    Cancel,
}

impl PermissionDialog {
    /// Apply one UI event
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<(), DialogError> {
        trace!("[{}] Dispatching {:?}", self.state.session, event);
        match event {
            UiEvent::BoxCheck { row } => {
                self.box_check(row).await?;
            }
            UiEvent::Customize { row, control } => {
                self.customize_permission(row, &control).await?;
            }
            UiEvent::SetChildrenChecked { row, checked } => {
                self.set_children_checked(row, checked)?;
            }
            UiEvent::ToggleMethod { row, action } => {
                self.toggle_method(row, &action)?;
            }
            UiEvent::ToggleGrant { row } => {
                self.toggle_grant(row)?;
            }
            UiEvent::ToggleDeny { row } => {
                self.toggle_deny(row)?;
            }
            UiEvent::PermissionNameChanged { row, value } => {
                self.permission_name_changed(row, &value)?;
            }
            UiEvent::SetFilter { row, filter } => {
                self.set_filter(row, filter)?;
            }
            UiEvent::AddAdditionalPermission { app } => {
                self.add_additional_permission(app)?;
            }
            UiEvent::SetAdditionalRowFields {
                row,
                name,
                filter,
                actions,
            } => {
                self.set_additional_row_fields(row, name, filter, actions)?;
            }
            UiEvent::InsertAdditionalMask => {
                self.insert_additional_mask();
            }
            UiEvent::RemoveAdditionalMask => {
                self.remove_additional_mask();
            }
            UiEvent::SetAdditionalFields {
                name,
                filter,
                actions,
            } => {
                self.set_additional_fields(name, filter, actions)?;
            }
            UiEvent::ToggleAdditionalGrant => {
                self.toggle_additional_grant()?;
            }
            UiEvent::ToggleAdditionalDeny => {
                self.toggle_additional_deny()?;
            }
            UiEvent::Expand { row, node } => {
                self.expand(row, &node).await?;
            }
            UiEvent::SelectNode { row, node } => {
                self.select_node(row, &node).await?;
            }
            UiEvent::HoverEnter { row, node, top } => {
                self.hover_enter(row, &node, top);
            }
            UiEvent::HoverLeave { row, node } => {
                self.hover_leave(row, &node);
            }
            UiEvent::TogglePreviewAction { row, action } => {
                self.toggle_preview_action(row, &action);
            }
            UiEvent::ApplyPreview { row } => {
                self.apply_preview(row)?;
            }
            UiEvent::ToggleAction { action } => {
                self.toggle_action(&action);
            }
            UiEvent::SetRecursive { recursive } => {
                self.set_recursive(recursive);
            }
            UiEvent::Save => {
                self.save()?;
            }
            UiEvent::Cancel => self.cancel(),
        }
        Ok(())
    }
}
