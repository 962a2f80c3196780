//! Mutually exclusive grant/deny controls.

use serde::{Deserialize, Serialize};

use super::LabelStyle;

/// Which side of a [`GrantDenyPair`] is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    /// Neither control checked
    #[default]
    None,
    /// Grant checked
    Granted,
    /// Deny checked
    Denied,
}

/// A grant checkbox and a deny checkbox where at most one is checked
///
/// # Examples
///
/// ```
/// use perms_dialog::controls::{GrantDenyPair, LabelStyle, ToggleState};
///
/// let mut pair = GrantDenyPair::new();
/// pair.toggle_grant();
/// pair.toggle_deny();
/// assert_eq!(pair.state(), ToggleState::Denied);
/// assert_eq!(pair.grant_label(), LabelStyle::Normal);
/// assert_eq!(pair.deny_label(), LabelStyle::Bold);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDenyPair {
    grant: bool,
    deny: bool,
    grant_label: LabelStyle,
    deny_label: LabelStyle,
}

impl GrantDenyPair {
    /// Create a pair in [`ToggleState::None`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the pair
    pub fn state(&self) -> ToggleState {
        match (self.grant, self.deny) {
            (true, _) => ToggleState::Granted,
            (false, true) => ToggleState::Denied,
            (false, false) => ToggleState::None,
        }
    }

    /// Whether the grant control is checked
    pub fn is_granted(&self) -> bool {
        self.grant
    }

    /// Whether the deny control is checked
    pub fn is_denied(&self) -> bool {
        self.deny
    }

    /// Style of the grant label
    pub fn grant_label(&self) -> LabelStyle {
        self.grant_label
    }

    /// Style of the deny label
    pub fn deny_label(&self) -> LabelStyle {
        self.deny_label
    }

    /// Flip the grant control and apply the exclusion rules
    pub fn toggle_grant(&mut self) -> ToggleState {
        self.set_grant(!self.grant)
    }

    /// Flip the deny control and apply the exclusion rules
    pub fn toggle_deny(&mut self) -> ToggleState {
        self.set_deny(!self.deny)
    }

    /// Apply a grant `change` event that left the control `checked`.
    ///
    /// Checking emphasizes the grant label and clears deny. Unchecking only
    /// resets the grant label.
    pub fn set_grant(&mut self, checked: bool) -> ToggleState {
        self.grant = checked;
        if checked {
            self.grant_label = LabelStyle::Bold;
            self.deny = false;
            self.deny_label = LabelStyle::Normal;
        } else {
            self.grant_label = LabelStyle::Normal;
        }
        self.state()
    }

    /// Apply a deny `change` event that left the control `checked`
    pub fn set_deny(&mut self, checked: bool) -> ToggleState {
        self.deny = checked;
        if checked {
            self.deny_label = LabelStyle::Bold;
            self.grant = false;
            self.grant_label = LabelStyle::Normal;
        } else {
            self.deny_label = LabelStyle::Normal;
        }
        self.state()
    }
}
