//! Error types for the perms_dialog crate
//!
//! This module defines the error hierarchy using `thiserror`. Every dialog,
//! registry and adapter operation that can fail returns
//! `Result<T, DialogError>`.
//!
//! # Error Variants
//!
//! - [`DialogError::UnknownRow`]: no permission row registered under the id
//! - [`DialogError::UnknownNode`]: the row's tree has no node with the id
//! - [`DialogError::NoSelection`]: a commit was attempted with no current node
//! - [`DialogError::NoAdditionalMask`]: the ad-hoc permission row is not inserted
//! - [`DialogError::Http`]: transport failure talking to the resource endpoint
//!   (auto-converts from `reqwest::Error`)
//! - [`DialogError::Endpoint`]: the endpoint answered with a non-success status
//! - [`DialogError::JsonDecode`]: the node list could not be parsed
//!   (auto-converts from `serde_json::Error`)
//! - [`DialogError::RowIdOverflow`]: an app number too large to derive a row id
//! - [`DialogError::InvalidUrl`]: the configured base URL cannot be joined
//!
//! # Example
//!
//! ```rust
//! use perms_dialog::error::DialogError;
//! use perms_dialog::controls::RowId;
//!
//! fn example() -> Result<(), DialogError> {
//!     return Err(DialogError::UnknownRow(RowId(7)));
//! }
//! ```

use thiserror::Error;

use crate::controls::RowId;

/// The main error type for all perms_dialog operations
#[derive(Error, Debug)]
pub enum DialogError {
    /// No row is registered under the given id
    #[error("Unknown permission row {0}")]
    UnknownRow(RowId),

    /// The row's resource tree has no node with the given id
    ///
    /// Also returned when the tree for the row has not been loaded yet and
    /// the caller asked for a node that must exist.
    #[error("Unknown resource node '{node}' in row {row}")]
    UnknownNode {
        /// Row whose tree was searched
        row: RowId,
        /// The node id that was not found
        node: String,
    },

    /// A commit was attempted while no resource node is selected
    #[error("No resource node is selected")]
    NoSelection,

    /// The ad-hoc additional permission row is not currently inserted
    #[error("Additional permission mask is not inserted")]
    NoAdditionalMask,

    /// HTTP transport failure while fetching resources
    #[error("Resource request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource endpoint answered with a non-success status
    #[error("Resource endpoint {url} returned HTTP {status}")]
    Endpoint {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// The request URL
        url: String,
    },

    /// The resource node list could not be parsed
    #[error("Failed to parse resource list: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// The app number is too large to derive an additional row id from
    #[error("App number {app} is too large for an additional permission row")]
    RowIdOverflow {
        /// App number that was passed in
        app: u64,
    },

    /// The configured base URL and endpoint path do not form a valid URL
    #[error("Invalid resource URL: {0}")]
    InvalidUrl(String),
}
