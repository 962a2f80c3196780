//! Conversion between checked action checkboxes and method strings.
//!
//! A resource node stores its granted actions as a comma-joined *method
//! string* (`"read,write"`). The dialog and the quick preview panel show the
//! same information as a row of checkboxes. Only set semantics survive a
//! round trip: duplicated or reordered tokens are not preserved.
//!
//! ```
//! use perms_dialog::encoding::{decode_methods, encode_checked_actions};
//!
//! let set = decode_methods("read,write");
//! assert!(set.contains("read") && set.contains("write"));
//!
//! assert_eq!(encode_checked_actions(["read", "write"]), "read,write");
//! assert_eq!(encode_checked_actions(Vec::<String>::new()), "");
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// Separator between action tokens in a method string
pub const METHOD_SEPARATOR: char = ',';

/// A set of distinct action tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    tokens: BTreeSet<String>,
}

impl ActionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token, returning `false` if it was already present
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    /// Whether the set holds `token`
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_checked_actions(self.iter()))
    }
}

/// Decode a method string into its action tokens.
///
/// An empty string yields an empty set and a string without a separator is
/// a single token. Tokens are trimmed; empty tokens are dropped.
pub fn decode_methods(method: &str) -> ActionSet {
    method
        .split(METHOD_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Encode checked checkbox labels into a method string.
///
/// Labels are joined in the order given, which callers take from checkbox
/// order. Zero labels give `""` and a single label is returned verbatim.
pub fn encode_checked_actions<I, S>(labels: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, label) in labels.into_iter().enumerate() {
        if i > 0 {
            out.push(METHOD_SEPARATOR);
        }
        out.push_str(label.as_ref());
    }
    out
}
