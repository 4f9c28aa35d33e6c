use crate::ids::ProductId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single row of the WDS spine: the master list of published cubes.
///
/// Truth source is the spine snapshot; rows are fully replaced on each refresh
/// rather than diffed in place (see the Spine Loader, component E).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub productid: ProductId,
    pub cansim_id: Option<String>,
    pub title_en: String,
    pub title_fr: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub release_date: Option<DateTime<Utc>>,
    pub archived_flag: bool,
    pub frequency_code: Option<String>,
    pub issue_date: Option<NaiveDate>,
}

/// `Cube` ↔ subject-code membership, many-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeSubjectLink {
    pub productid: ProductId,
    pub subject_code: String,
}

/// `Cube` ↔ survey-code membership, many-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeSurveyLink {
    pub productid: ProductId,
    pub survey_code: String,
}
