//! Configuration options and builder for a permission dialog session
//!
//! # Example
//!
//! ```
//! use perms_dialog::options::DialogOptions;
//! use std::time::Duration;
//!
//! let options = DialogOptions::builder()
//!     .base_url("http://localhost:8080")
//!     .hover_settle_delay(Duration::from_millis(500))
//!     .dialog_actions(vec!["read".into(), "write".into()])
//!     .build();
//!
//! assert_eq!(options.endpoint_path, "/service/filteredresources");
//! ```

use std::time::Duration;

/// Endpoint that lists protected resources for a filter/action query
pub const DEFAULT_ENDPOINT_PATH: &str = "/service/filteredresources";

/// Delay a hovered node must stay focused before its quick preview shows
pub const DEFAULT_HOVER_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Vertical distance (px) between a hovered node and its quick preview panel
pub const DEFAULT_PREVIEW_OFFSET: f32 = 33.0;

/// Resource actions offered by the dialog, in checkbox order
pub const DEFAULT_DIALOG_ACTIONS: [&str; 6] =
    ["read", "write", "addsub", "create", "delete", "activity"];

/// Configuration for a [`PermissionDialog`](crate::dialog::PermissionDialog)
#[derive(Debug, Clone)]
pub struct DialogOptions {
    /// Base URL of the admin service (e.g., "http://localhost:8080")
    pub base_url: String,
    /// Path of the resource listing endpoint
    pub endpoint_path: String,
    /// Settle delay before a hovered node's preview is revealed
    pub hover_settle_delay: Duration,
    /// Offset added to a node's top coordinate to place the preview panel
    pub preview_offset: f32,
    /// Action labels shown as checkboxes in the dialog and preview panel
    pub dialog_actions: Vec<String>,
    /// Timeout for a single resource listing request
    pub request_timeout: Duration,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            hover_settle_delay: DEFAULT_HOVER_SETTLE_DELAY,
            preview_offset: DEFAULT_PREVIEW_OFFSET,
            dialog_actions: DEFAULT_DIALOG_ACTIONS
                .iter()
                .map(|a| a.to_string())
                .collect(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl DialogOptions {
    /// Create a new options builder
    pub fn builder() -> DialogOptionsBuilder {
        DialogOptionsBuilder::default()
    }
}

/// Builder for [`DialogOptions`]
#[derive(Debug, Default)]
pub struct DialogOptionsBuilder {
    base_url: Option<String>,
    endpoint_path: Option<String>,
    hover_settle_delay: Option<Duration>,
    preview_offset: Option<f32>,
    dialog_actions: Option<Vec<String>>,
    request_timeout: Option<Duration>,
}

impl DialogOptionsBuilder {
    /// Set the base URL of the admin service
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the resource listing endpoint path
    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = Some(path.into());
        self
    }

    /// Set the hover settle delay
    pub fn hover_settle_delay(mut self, delay: Duration) -> Self {
        self.hover_settle_delay = Some(delay);
        self
    }

    /// Set the preview panel offset below the hovered node
    pub fn preview_offset(mut self, offset: f32) -> Self {
        self.preview_offset = Some(offset);
        self
    }

    /// Set the action labels offered by the dialog
    pub fn dialog_actions(mut self, actions: Vec<String>) -> Self {
        self.dialog_actions = Some(actions);
        self
    }

    /// Set the per-request timeout for resource listing
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the options, filling unset fields with defaults
    pub fn build(self) -> DialogOptions {
        let defaults = DialogOptions::default();
        DialogOptions {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            endpoint_path: self.endpoint_path.unwrap_or(defaults.endpoint_path),
            hover_settle_delay: self
                .hover_settle_delay
                .unwrap_or(defaults.hover_settle_delay),
            preview_offset: self.preview_offset.unwrap_or(defaults.preview_offset),
            dialog_actions: self.dialog_actions.unwrap_or(defaults.dialog_actions),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DialogOptions::default();
        assert_eq!(options.endpoint_path, DEFAULT_ENDPOINT_PATH);
        assert_eq!(options.hover_settle_delay, Duration::from_millis(1000));
        assert_eq!(options.preview_offset, 33.0);
        assert_eq!(options.dialog_actions.len(), 6);
        assert_eq!(options.dialog_actions[0], "read");
    }

    #[test]
    fn test_builder_overrides() {
        let options = DialogOptions::builder()
            .base_url("http://admin:9000")
            .endpoint_path("/resources")
            .preview_offset(10.0)
            .dialog_actions(vec!["execute".to_string()])
            .build();

        assert_eq!(options.base_url, "http://admin:9000");
        assert_eq!(options.endpoint_path, "/resources");
        assert_eq!(options.preview_offset, 10.0);
        assert_eq!(options.dialog_actions, vec!["execute".to_string()]);
        // Unset fields keep defaults
        assert_eq!(options.hover_settle_delay, DEFAULT_HOVER_SETTLE_DELAY);
    }
}
