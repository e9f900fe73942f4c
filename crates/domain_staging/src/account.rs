//! Payment account registry

use serde::{Deserialize, Serialize};

/// An account that payments can be received in (e.g. `G1`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Short code used in bank text
    pub code: String,
    pub name: String,
    pub active: bool,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            active: true,
        }
    }
}
