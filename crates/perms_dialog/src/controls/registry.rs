//! Row arena keyed by [`RowId`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CheckboxGroup, GrantDenyPair, HeadingStyle, RowId, ToggleState};
use crate::error::DialogError;

/// First value handed out by the additional-permission counter, minus one
const ADDITIONAL_INDEX_START: u32 = 10;

/// Origin of a permission row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Permission requested by an app, rendered by the server
    Permission,
    /// Row added by the administrator through "add permission"
    Additional,
}

/// Everything needed to register a permission row
#[derive(Debug, Clone, Default)]
pub struct RowSpec {
    /// Row id
    pub id: u64,
    /// Permission class name shown in the row heading
    pub permission_name: String,
    /// Filter text (comma-separated `key=value` fragments), if the row has one
    pub filter: Option<String>,
    /// Action labels of the row's method checkboxes, in display order
    pub actions: Vec<String>,
}

/// State of every control belonging to one permission row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowControls {
    /// Row id
    pub id: RowId,
    /// Row origin
    pub kind: RowKind,
    /// Master checkbox (also the hidden "customized" flag)
    pub master: bool,
    /// Grant/deny controls of the row
    pub grant_deny: GrantDenyPair,
    /// Permission name field
    pub permission_name: String,
    /// Heading style class
    pub heading: HeadingStyle,
    /// Whether the editable detail sub-panel is shown
    pub detail_visible: bool,
    /// Whether the detail sub-panel carries the selection background
    pub detail_highlighted: bool,
    /// Whether the detail text inputs carry the highlight class
    pub inputs_highlighted: bool,
    /// Method checkboxes of the detail sub-panel
    pub methods: CheckboxGroup,
    /// Filter field; `None` when the row has no filter input
    pub filter: Option<String>,
    /// Free-text actions field (additional rows only)
    pub actions_text: String,
}

impl RowControls {
    fn from_spec(spec: RowSpec, kind: RowKind) -> Self {
        Self {
            id: RowId(spec.id),
            kind,
            master: false,
            grant_deny: GrantDenyPair::new(),
            permission_name: spec.permission_name,
            heading: HeadingStyle::HeadLine,
            detail_visible: true,
            detail_highlighted: false,
            inputs_highlighted: false,
            methods: CheckboxGroup::new(spec.actions),
            filter: spec.filter,
            actions_text: String::new(),
        }
    }

    /// Filter text used for resource queries; a missing field reads as `""`
    pub fn filter_text(&self) -> &str {
        self.filter.as_deref().unwrap_or("")
    }

    /// Checked method labels, used as the `action` query parameter
    pub fn checked_actions(&self) -> Vec<String> {
        self.methods.checked_labels().map(str::to_string).collect()
    }
}

/// The single ad-hoc "additional permission" editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalMask {
    /// Permission name field
    pub name: String,
    /// Resource filter field
    pub filter: String,
    /// Comma-separated actions field
    pub actions: String,
    /// Grant/deny controls
    pub grant_deny: GrantDenyPair,
}

/// Arena of permission rows with keyed lookup
///
/// # Examples
///
/// ```
/// use perms_dialog::controls::{RowRegistry, RowSpec, RowId, ToggleState};
///
/// let mut rows = RowRegistry::new();
/// rows.register(RowSpec {
///     id: 1,
///     permission_name: "org.ogema.accesscontrol.ResourcePermission".into(),
///     filter: Some("path=devices/*".into()),
///     actions: vec!["read".into(), "write".into()],
/// });
///
/// assert_eq!(rows.toggle_grant(RowId(1)).unwrap(), ToggleState::Granted);
/// ```
#[derive(Debug, Clone)]
pub struct RowRegistry {
    rows: Vec<RowControls>,
    index: HashMap<RowId, usize>,
    additional_index: u32,
    mask: Option<AdditionalMask>,
}

impl Default for RowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RowRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            additional_index: ADDITIONAL_INDEX_START,
            mask: None,
        }
    }

    /// Register a server-rendered permission row
    ///
    /// Registering an id twice replaces the earlier row's controls.
    pub fn register(&mut self, spec: RowSpec) -> RowId {
        self.insert(RowControls::from_spec(spec, RowKind::Permission))
    }

    fn insert(&mut self, controls: RowControls) -> RowId {
        let id = controls.id;
        match self.index.get(&id) {
            Some(&slot) => {
                warn!("Row {} registered twice, replacing its controls", id);
                self.rows[slot] = controls;
            }
            None => {
                self.index.insert(id, self.rows.len());
                self.rows.push(controls);
            }
        }
        id
    }

    /// Look up a row
    pub fn row(&self, id: RowId) -> Result<&RowControls, DialogError> {
        self.index
            .get(&id)
            .map(|&slot| &self.rows[slot])
            .ok_or(DialogError::UnknownRow(id))
    }

    pub(crate) fn row_mut(&mut self, id: RowId) -> Result<&mut RowControls, DialogError> {
        match self.index.get(&id) {
            Some(&slot) => Ok(&mut self.rows[slot]),
            None => Err(DialogError::UnknownRow(id)),
        }
    }

    /// All rows in registration order
    pub fn rows(&self) -> &[RowControls] {
        &self.rows
    }

    /// Number of registered rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row is registered
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace a row's filter text
    pub fn set_filter(&mut self, id: RowId, filter: impl Into<String>) -> Result<(), DialogError> {
        self.row_mut(id)?.filter = Some(filter.into());
        Ok(())
    }

    /// Flip the row's grant control
    pub fn toggle_grant(&mut self, id: RowId) -> Result<ToggleState, DialogError> {
        let state = self.row_mut(id)?.grant_deny.toggle_grant();
        debug!("Row {} grant toggled -> {:?}", id, state);
        Ok(state)
    }

    /// Flip the row's deny control
    pub fn toggle_deny(&mut self, id: RowId) -> Result<ToggleState, DialogError> {
        let state = self.row_mut(id)?.grant_deny.toggle_deny();
        debug!("Row {} deny toggled -> {:?}", id, state);
        Ok(state)
    }

    /// Add an administrator-defined permission row for `app`
    ///
    /// The counter is shared by every app in the session, so ids stay unique
    /// across dialogs.
    ///
    /// # Errors
    ///
    /// - [`DialogError::RowIdOverflow`] when `app` is too large; the counter
    ///   is left unchanged
    pub fn add_additional_permission(&mut self, app: u64) -> Result<RowId, DialogError> {
        let index = self.additional_index + 1;
        let id = RowId::additional(app, index).ok_or(DialogError::RowIdOverflow { app })?;
        self.additional_index = index;
        let spec = RowSpec {
            id: id.0,
            filter: Some(String::new()),
            ..Default::default()
        };
        debug!("Adding additional permission row {} for app {}", id, app);
        Ok(self.insert(RowControls::from_spec(spec, RowKind::Additional)))
    }

    /// Set the free-text fields of an additional row
    pub fn set_additional_row_fields(
        &mut self,
        id: RowId,
        name: impl Into<String>,
        filter: impl Into<String>,
        actions: impl Into<String>,
    ) -> Result<(), DialogError> {
        let row = self.row_mut(id)?;
        row.permission_name = name.into();
        row.filter = Some(filter.into());
        row.actions_text = actions.into();
        Ok(())
    }

    /// Insert the ad-hoc additional permission editor
    ///
    /// Returns `false` when it is already inserted.
    pub fn insert_additional_mask(&mut self) -> bool {
        if self.mask.is_some() {
            return false;
        }
        self.mask = Some(AdditionalMask::default());
        true
    }

    /// Remove the ad-hoc editor, returning its last state
    pub fn remove_additional_mask(&mut self) -> Option<AdditionalMask> {
        self.mask.take()
    }

    /// The ad-hoc editor, if inserted
    pub fn additional_mask(&self) -> Option<&AdditionalMask> {
        self.mask.as_ref()
    }

    fn mask_mut(&mut self) -> Result<&mut AdditionalMask, DialogError> {
        self.mask.as_mut().ok_or(DialogError::NoAdditionalMask)
    }

    /// Set the ad-hoc editor's text fields
    pub fn set_additional_fields(
        &mut self,
        name: impl Into<String>,
        filter: impl Into<String>,
        actions: impl Into<String>,
    ) -> Result<(), DialogError> {
        let mask = self.mask_mut()?;
        mask.name = name.into();
        mask.filter = filter.into();
        mask.actions = actions.into();
        Ok(())
    }

    /// Flip the ad-hoc editor's grant control
    pub fn toggle_additional_grant(&mut self) -> Result<ToggleState, DialogError> {
        Ok(self.mask_mut()?.grant_deny.toggle_grant())
    }

    /// Flip the ad-hoc editor's deny control
    pub fn toggle_additional_deny(&mut self) -> Result<ToggleState, DialogError> {
        Ok(self.mask_mut()?.grant_deny.toggle_deny())
    }
}
