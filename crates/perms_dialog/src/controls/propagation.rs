//! Master/child checkbox propagation and row highlighting.

use tracing::{debug, trace, warn};

use super::{HeadingStyle, RowId, RowRegistry};
use crate::error::DialogError;

/// Permission name that grants everything and has no editable sub-options
pub const ALL_PERMISSION: &str = "java.security.AllPermission";

impl RowRegistry {
    /// Set every method checkbox of the row, and all of its highlights, to `checked`
    pub fn set_children_checked(&mut self, id: RowId, checked: bool) -> Result<(), DialogError> {
        let row = self.row_mut(id)?;
        row.methods.set_all(checked);
        row.inputs_highlighted = checked;
        row.detail_highlighted = checked;
        trace!("Row {} children checked={}", id, checked);
        Ok(())
    }

    /// Set the master checkbox and propagate it to the row's children
    pub fn check_master(&mut self, id: RowId, checked: bool) -> Result<(), DialogError> {
        self.row_mut(id)?.master = checked;
        self.set_children_checked(id, checked)
    }

    /// Flip the master checkbox, propagate, and return its new state
    pub fn toggle_master(&mut self, id: RowId) -> Result<bool, DialogError> {
        let checked = !self.row(id)?.master;
        self.check_master(id, checked)?;
        Ok(checked)
    }

    /// Check and highlight the row's children from a control other than the master box
    ///
    /// The master flag is force-checked so the row counts as edited.
    pub fn customize_permission(&mut self, id: RowId, control: &str) -> Result<(), DialogError> {
        debug!("Row {} customized via '{}'", id, control);
        self.check_master(id, true)
    }

    /// Mirror one method checkbox's state on its label highlight
    pub fn single_highlight(&mut self, id: RowId, action: &str) -> Result<(), DialogError> {
        let methods = &mut self.row_mut(id)?.methods;
        let checked = methods.is_checked(action);
        if !methods.set_highlighted(action, checked) {
            warn!("Row {} has no method checkbox '{}'", id, action);
        }
        Ok(())
    }

    /// Flip one method checkbox and update its label highlight
    ///
    /// Returns the new checked state, or `None` when the row has no such checkbox.
    pub fn toggle_method(&mut self, id: RowId, action: &str) -> Result<Option<bool>, DialogError> {
        let toggled = self.row_mut(id)?.methods.toggle(action);
        self.single_highlight(id, action)?;
        Ok(toggled)
    }

    /// Update the permission name field and its all-permission styling
    ///
    /// Returns whether the detail sub-panel is visible afterwards.
    pub fn all_perm_select(&mut self, id: RowId, value: &str) -> Result<bool, DialogError> {
        let row = self.row_mut(id)?;
        row.permission_name = value.to_string();
        if value == ALL_PERMISSION {
            row.heading = HeadingStyle::AllPermHeadLine;
            row.detail_visible = false;
        } else {
            row.heading = HeadingStyle::HeadLine;
            row.detail_visible = true;
        }
        Ok(row.detail_visible)
    }
}
