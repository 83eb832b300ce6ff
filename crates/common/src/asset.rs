//! User-editable asset fields

use serde::{Deserialize, Serialize};

/// Free-form descriptive fields of an asset draft.
///
/// Empty values are permitted; deciding whether the content is meaningful
/// is up to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFields {
    pub name: String,
    pub symbol: String,
    pub description: String,
}

impl AssetFields {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
        }
    }
}
