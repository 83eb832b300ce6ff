//! The on-chain asset record

use mintflow_common::{AssetFields, ContentRef};
use serde::{Deserialize, Serialize};

/// Creator royalty applied to every minted asset (5%)
pub const SELLER_FEE_BASIS_POINTS: u16 = 500;

/// Token metadata program limits
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    pub share: u8,
}

/// Creation record submitted to the ledger.
///
/// `is_mutable` is always false: once minted, the metadata pointer can never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub uri: ContentRef,
    pub name: String,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
    pub is_mutable: bool,
}

impl AssetRecord {
    /// Record with the fixed policy: single creator at 100%, 500 bps, immutable
    pub fn new(uri: &ContentRef, fields: &AssetFields, creator: impl Into<String>) -> Self {
        Self {
            uri: uri.clone(),
            name: fields.name.clone(),
            symbol: fields.symbol.clone(),
            seller_fee_basis_points: SELLER_FEE_BASIS_POINTS,
            creators: vec![Creator {
                address: creator.into(),
                share: 100,
            }],
            is_mutable: false,
        }
    }

    /// Check the record fits the program's field limits (byte lengths)
    pub fn validate(&self) -> Result<(), String> {
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(format!(
                "Name exceeds {} bytes ({} bytes)",
                MAX_NAME_LENGTH,
                self.name.len()
            ));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(format!(
                "Symbol exceeds {} bytes ({} bytes)",
                MAX_SYMBOL_LENGTH,
                self.symbol.len()
            ));
        }
        if self.uri.as_str().len() > MAX_URI_LENGTH {
            return Err(format!(
                "Metadata URI exceeds {} bytes ({} bytes)",
                MAX_URI_LENGTH,
                self.uri.as_str().len()
            ));
        }
        let total_share: u32 = self.creators.iter().map(|c| u32::from(c.share)).sum();
        if total_share != 100 {
            return Err(format!("Creator shares must total 100, got {}", total_share));
        }
        Ok(())
    }
}
