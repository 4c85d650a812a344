use serde::{Deserialize, Serialize};

/// A member account of the organization, as returned by the directory API.
///
/// The id is an opaque unique string; the display name is free-form text and
/// must be escaped before it lands in HTML output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
