//! perms_dialog - headless view-model for a permission-editing dialog
//!
//! This crate holds the state of an administrative dialog that edits
//! permission grants (actions, grant/deny, recursive flag) against a tree of
//! protected resources, and applies user events to it. It renders nothing: a
//! UI shell feeds it events and paints the state it reads back.
//!
//! # Overview
//!
//! - Permission rows with master/method checkboxes and grant/deny pairs
//! - One lazily-loaded resource tree per row, fetched from the admin service
//! - A hover-triggered quick preview with a settle delay
//! - A modal editor that commits checked actions back into the selected node
//!
//! # Architecture
//!
//! - `encoding`: method string <-> action set conversion
//! - `controls`: row controls, grant/deny toggles and checkbox propagation
//! - `tree`: arena-backed resource tree and the endpoint's JSON node shape
//! - `source`: the `ResourceSource` trait with HTTP and in-memory implementations
//! - `adapter`: per-row tree widgets, selection and hover preview
//! - `dialog`: the controller tying everything together
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! use perms_dialog::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DialogError> {
//!     let options = DialogOptions::builder()
//!         .base_url("http://localhost:8080")
//!         .build();
//!     let mut dialog = PermissionDialog::with_http(options)?;
//!
//!     let row = dialog.register_row(RowSpec {
//!         id: 1,
//!         permission_name: "org.ogema.accesscontrol.ResourcePermission".into(),
//!         filter: Some("path=home/*".into()),
//!         actions: vec!["read".into(), "write".into()],
//!     });
//!
//!     // Checking the row loads its resource tree
//!     dialog.box_check(row).await?;
//!
//!     dialog.dispatch(UiEvent::SelectNode { row, node: "home".into() }).await?;
//!     dialog.dispatch(UiEvent::ToggleAction { action: "write".into() }).await?;
//!     dialog.dispatch(UiEvent::Save).await?;
//!
//!     println!("{:?}", dialog.node(row, "home").map(|n| &n.method));
//!     Ok(())
//! }
//! ```
//!
//! # License
//!
//! Licensed under MIT.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Resource tree adapter
///
/// One tree widget per permission row, created on first use and refreshed
/// afterwards, plus the hover settle scheduler that drives quick previews.
pub mod adapter;

/// Row controls
///
/// Checkbox groups, grant/deny pairs and the [`RowRegistry`](controls::RowRegistry)
/// arena holding every row's control state.
pub mod controls;

/// Permission dialog controller
///
/// [`PermissionDialog`](dialog::PermissionDialog) owns rows, trees and the
/// modal editor and applies [`UiEvent`](dialog::UiEvent)s to them.
pub mod dialog;

/// Method string encoding
pub mod encoding;

/// Error types and utilities
///
/// This module defines the `DialogError` enum, which covers all error cases:
///
/// - `UnknownRow` / `UnknownNode` - lookups that found nothing
/// - `NoSelection` - commit with no node being edited
/// - `NoAdditionalMask` - ad-hoc editor not inserted
/// - `Http` / `Endpoint` - resource endpoint failures
/// - `JsonDecode` - malformed node lists (auto-converts from `serde_json::Error`)
/// - `RowIdOverflow` - app number too large for an additional row id
/// - `InvalidUrl` - base URL cannot be joined with the endpoint
pub mod error;

/// Configuration options and builder
pub mod options;

/// Resource listing sources
pub mod source;

/// Resource tree model
pub mod tree;

/// Common imports for perms_dialog users
///
/// ```
/// use perms_dialog::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::{NodeRef, QuickPreview, ResourceTreeAdapter, TreeWidget};
    pub use crate::controls::{
        CheckboxGroup, GrantDenyPair, RowControls, RowId, RowKind, RowRegistry, RowSpec,
        ToggleState, ALL_PERMISSION,
    };
    pub use crate::dialog::{DialogState, PermissionDialog, UiEvent};
    pub use crate::encoding::{decode_methods, encode_checked_actions, ActionSet};
    pub use crate::error::DialogError;
    pub use crate::options::DialogOptions;
    pub use crate::source::{
        HttpResourceSource, MemoryResourceSource, ResourceQuery, ResourceSource,
    };
    pub use crate::tree::{NodeKind, ResourceNode, ResourceTree};
}
