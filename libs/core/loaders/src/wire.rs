//! Wire shapes for the two JSON documents this crate parses: the spine
//! snapshot (a bare array) and per-product cube metadata (wrapped in a
//! `{status, object}` envelope, same shape `wds-client` sees on the wire).
//! Kept local rather than shared with `wds-client` since this crate parses
//! bytes already persisted to the Content Store, not live responses.

use serde::Deserialize;
use wds_domain_models::UnknownFields;

#[derive(Debug, Deserialize)]
pub(crate) struct CubeWire {
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "cansimId")]
    pub cansim_id: Option<String>,
    #[serde(rename = "cubeTitleEn")]
    pub cube_title_en: String,
    #[serde(rename = "cubeTitleFr")]
    pub cube_title_fr: String,
    #[serde(rename = "cubeStartDate")]
    pub cube_start_date: Option<String>,
    #[serde(rename = "cubeEndDate")]
    pub cube_end_date: Option<String>,
    #[serde(rename = "releaseTime")]
    pub release_time: Option<String>,
    pub archived: Option<String>,
    #[serde(rename = "frequencyCode")]
    pub frequency_code: Option<serde_json::Value>,
    #[serde(rename = "issueDate")]
    pub issue_date: Option<String>,
    #[serde(default, rename = "subjectCode")]
    pub subject_code: Vec<String>,
    #[serde(default, rename = "surveyCode")]
    pub survey_code: Vec<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataEnvelope {
    pub status: String,
    pub object: MetadataObjectWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataObjectWire {
    #[serde(default, rename = "dimension")]
    pub dimensions: Vec<DimensionWire>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DimensionWire {
    #[serde(rename = "dimensionPositionId")]
    pub dimension_position_id: i32,
    #[serde(rename = "dimensionNameEn")]
    pub dimension_name_en: String,
    #[serde(rename = "dimensionNameFr")]
    pub dimension_name_fr: String,
    #[serde(default, rename = "hasUom")]
    pub has_uom: bool,
    #[serde(default, rename = "member")]
    pub members: Vec<MemberWire>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberWire {
    #[serde(rename = "memberId")]
    pub member_id: i64,
    #[serde(rename = "parentMemberId")]
    pub parent_member_id: Option<i64>,
    #[serde(rename = "classificationCode")]
    pub classification_code: Option<String>,
    #[serde(rename = "memberNameEn")]
    pub member_name_en: String,
    #[serde(rename = "memberNameFr")]
    pub member_name_fr: String,
    #[serde(rename = "memberUomCode")]
    pub member_uom_code: Option<String>,
    #[serde(rename = "geoLevel")]
    pub geo_level: Option<String>,
    pub vintage: Option<String>,
    pub terminated: Option<bool>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}
