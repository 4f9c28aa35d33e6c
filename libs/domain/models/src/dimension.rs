use crate::ids::{Hash12, ProductId};
use serde::{Deserialize, Serialize};

/// `(productid, dimension_position)` → shape metadata, parsed straight out of a
/// cube's metadata JSON. `has_uom` records whether any member in this raw
/// dimension carries a unit-of-measure code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDimension {
    pub productid: ProductId,
    pub dimension_position: i32,
    pub name_en: String,
    pub name_fr: String,
    pub has_uom: bool,
}

/// `(productid, dimension_position, member_id)` → one discrete value on a
/// cube's axis, as published. Optional fields mirror WDS's own optionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    pub productid: ProductId,
    pub dimension_position: i32,
    pub member_id: i64,
    pub parent_member_id: Option<i64>,
    pub classification_code: Option<String>,
    pub name_en: String,
    pub name_fr: String,
    pub uom_code: Option<String>,
    pub geo_level: Option<String>,
    pub vintage: Option<String>,
    pub terminated: Option<bool>,
}

/// A `RawMember` plus its normalized label and content hash (Stage 1 of the
/// Dimension Registry Builder, §4.G).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMember {
    pub productid: ProductId,
    pub dimension_position: i32,
    pub member_id: i64,
    pub parent_member_id: Option<i64>,
    pub uom_code: Option<String>,
    pub name_en: String,
    pub name_fr: String,
    pub member_label_norm: String,
    pub member_hash: Hash12,
    /// Backfilled once the dimension as a whole is hashed (Stage 2).
    pub dimension_hash: Option<Hash12>,
}

/// `(productid, dimension_position)` → the hash identifying this dimension's
/// exact member composition (Stage 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDimension {
    pub productid: ProductId,
    pub dimension_position: i32,
    pub dimension_hash: Hash12,
    pub name_en: String,
    pub name_fr: String,
    pub has_uom: bool,
}

/// The deduplicated, cross-product view of a dimension shape (`dimension_set`,
/// Stage 3). Keyed by `dimension_hash` alone: any number of `(productid,
/// dimension_position)` pairs may contribute to one canonical row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDimension {
    pub dimension_hash: Hash12,
    pub name_en: String,
    pub name_fr: String,
    pub usage_count: i64,
    pub has_uom: bool,
    pub is_tree: bool,
    pub is_hetero: bool,
    pub has_total: bool,
}

/// The deduplicated view of one member within a canonical dimension
/// (`dimension_set_member`, Stage 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMember {
    pub dimension_hash: Hash12,
    pub member_id: i64,
    pub name_en: String,
    pub name_fr: String,
    pub parent_member_id: Option<i64>,
    pub uom_code: Option<String>,
    pub usage_count: i64,
    pub tree_level: Option<i32>,
    pub base_name: String,
}
