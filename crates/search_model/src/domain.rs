use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Composite identifier of an indexed item, rendered as `id~type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ItemId {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.id, self.kind)
    }
}

impl FromStr for ItemId {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once('~') {
            Some((id, kind)) if !id.is_empty() && !kind.is_empty() && !kind.contains('~') => {
                Ok(Self::new(id, kind))
            }
            _ => Err(ModelError::InvalidItemId(raw.to_string())),
        }
    }
}
