//! Control state for permission rows.
//!
//! Every visual control a row owns (master checkbox, grant/deny pair,
//! method checkboxes, text fields) is plain state here. Rows are stored in a
//! [`RowRegistry`] arena and looked up by [`RowId`], so paired controls are
//! found by key instead of by their position next to each other.
//!
//! # Key types
//!
//! - [`RowId`] - numeric id of a permission row
//! - [`CheckboxGroup`] - ordered, labelled checkboxes (method lists, dialog actions)
//! - [`GrantDenyPair`] - mutually exclusive grant/deny controls
//! - [`RowRegistry`] - arena of [`RowControls`] plus the additional-permission state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{encode_checked_actions, ActionSet};

mod propagation;
mod registry;
mod toggle;

pub use propagation::ALL_PERMISSION;
pub use registry::{AdditionalMask, RowControls, RowKind, RowRegistry, RowSpec};
pub use toggle::{GrantDenyPair, ToggleState};

/// Numeric identifier of a permission row (the app/dialog number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl RowId {
    /// Id of an additional-permission row: the counter digits appended to the app number
    ///
    /// Returns `None` when the result does not fit in a `u64`.
    ///
    /// ```
    /// use perms_dialog::controls::RowId;
    ///
    /// assert_eq!(RowId::additional(3, 11), Some(RowId(311)));
    /// assert_eq!(RowId::additional(12, 105), Some(RowId(12105)));
    /// assert_eq!(RowId::additional(u64::MAX / 10, 11), None);
    /// ```
    pub fn additional(app: u64, index: u32) -> Option<Self> {
        let index = u64::from(index);
        let mut shift = 10u64;
        while index >= shift {
            shift *= 10;
        }
        app.checked_mul(shift)?.checked_add(index).map(RowId)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Font weight of a grant/deny label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Regular weight
    #[default]
    Normal,
    /// Emphasized, shown while the paired control is checked
    Bold,
}

/// Style class of a row heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// Regular editable permission
    #[default]
    HeadLine,
    /// `java.security.AllPermission` row without sub-options
    AllPermHeadLine,
}

/// A checkbox with its label text and label highlight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCheckbox {
    /// Label text, also the action token the checkbox stands for
    pub label: String,
    /// Checked state
    pub checked: bool,
    /// Whether the label carries the highlight class
    pub highlighted: bool,
}

impl LabeledCheckbox {
    /// Create an unchecked, unhighlighted checkbox
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: false,
            highlighted: false,
        }
    }
}

/// Ordered group of labelled checkboxes
///
/// Order is the display order; [`encode`](Self::encode) joins checked labels
/// in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxGroup {
    boxes: Vec<LabeledCheckbox>,
}

impl CheckboxGroup {
    /// Create a group with one unchecked box per label
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            boxes: labels.into_iter().map(LabeledCheckbox::new).collect(),
        }
    }

    /// All checkboxes in display order
    pub fn boxes(&self) -> &[LabeledCheckbox] {
        &self.boxes
    }

    /// Look up a checkbox by label
    pub fn get(&self, label: &str) -> Option<&LabeledCheckbox> {
        self.boxes.iter().find(|b| b.label == label)
    }

    fn get_mut(&mut self, label: &str) -> Option<&mut LabeledCheckbox> {
        self.boxes.iter_mut().find(|b| b.label == label)
    }

    /// Whether the box with `label` is checked (`false` if absent)
    pub fn is_checked(&self, label: &str) -> bool {
        self.get(label).is_some_and(|b| b.checked)
    }

    /// Set one box, returning `false` when no box has that label
    pub fn set_checked(&mut self, label: &str, checked: bool) -> bool {
        match self.get_mut(label) {
            Some(b) => {
                b.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Flip one box and return its new state, `None` when absent
    pub fn toggle(&mut self, label: &str) -> Option<bool> {
        self.get_mut(label).map(|b| {
            b.checked = !b.checked;
            b.checked
        })
    }

    /// Set the label highlight of one box
    pub fn set_highlighted(&mut self, label: &str, highlighted: bool) -> bool {
        match self.get_mut(label) {
            Some(b) => {
                b.highlighted = highlighted;
                true
            }
            None => false,
        }
    }

    /// Check and highlight every box, or clear them all
    pub fn set_all(&mut self, checked: bool) {
        for b in &mut self.boxes {
            b.checked = checked;
            b.highlighted = checked;
        }
    }

    /// Uncheck every box without touching highlights
    pub fn reset(&mut self) {
        for b in &mut self.boxes {
            b.checked = false;
        }
    }

    /// Check every box whose label is in `actions`.
    ///
    /// Returns the tokens that have no matching checkbox; they are left out
    /// of the visible state.
    pub fn check_all_in(&mut self, actions: &ActionSet) -> Vec<String> {
        let mut unmatched = Vec::new();
        for token in actions.iter() {
            if !self.set_checked(token, true) {
                unmatched.push(token.to_string());
            }
        }
        unmatched
    }

    /// Labels of checked boxes in display order
    pub fn checked_labels(&self) -> impl Iterator<Item = &str> {
        self.boxes
            .iter()
            .filter(|b| b.checked)
            .map(|b| b.label.as_str())
    }

    /// Number of checked boxes
    pub fn checked_count(&self) -> usize {
        self.checked_labels().count()
    }

    /// Encode the checked labels as a method string
    pub fn encode(&self) -> String {
        encode_checked_actions(self.checked_labels())
    }
}
