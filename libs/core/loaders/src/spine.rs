use crate::errors::LoaderError;
use crate::wire::CubeWire;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument, warn};
use wds_db::SpineRepository;
use wds_domain_models::{Cube, CubeSubjectLink, CubeSurveyLink, ProductId};

/// Parses the active spine artifact's JSON and replaces the `spine.*` tables
/// wholesale (§4.E). The spine snapshot carries no delta of its own, so a
/// truncate-and-replace is the only faithful load strategy.
#[instrument(skip(payload, repository))]
pub async fn load_spine(payload: &[u8], repository: &SpineRepository) -> Result<usize, LoaderError> {
    let wires: Vec<CubeWire> = serde_json::from_slice(payload)?;

    let mut cubes = Vec::with_capacity(wires.len());
    let mut subjects = Vec::new();
    let mut surveys = Vec::new();

    for wire in wires {
        if !wire.unknown.is_empty() {
            warn!(productid = wire.product_id, fields = %wire.unknown.describe(), "spine entry carries unrecognized fields");
        }
        let productid = ProductId(wire.product_id);

        for subject_code in &wire.subject_code {
            subjects.push(CubeSubjectLink {
                productid,
                subject_code: subject_code.clone(),
            });
        }
        for survey_code in &wire.survey_code {
            surveys.push(CubeSurveyLink {
                productid,
                survey_code: survey_code.clone(),
            });
        }

        cubes.push(Cube {
            productid,
            cansim_id: wire.cansim_id,
            title_en: wire.cube_title_en,
            title_fr: wire.cube_title_fr,
            start_date: wire.cube_start_date.as_deref().and_then(parse_date),
            end_date: wire.cube_end_date.as_deref().and_then(parse_date),
            release_date: wire.release_time.as_deref().and_then(parse_datetime),
            archived_flag: wire.archived.as_deref().map(|v| v != "0").unwrap_or(false),
            frequency_code: wire.frequency_code.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            issue_date: wire.issue_date.as_deref().and_then(parse_date),
        });
    }

    let count = cubes.len();
    repository.replace_all(&cubes, &subjects, &surveys).await?;
    info!(count, "spine loaded");
    Ok(count)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn archived_flag_treats_nonzero_as_true() {
        assert!("1" != "0");
    }
}
