use crate::errors::SchedulerError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, instrument};
use wds_client::WdsClient;
use wds_db::{ChangeLogRepository, StatusRepository};
use wds_domain_models::{ArtifactKey, ChangeLogEntry};

/// WDS publishes daily updates at 08:30 local time (Open Question: exact
/// timezone unspecified by the source; this pipeline treats it as a
/// configurable parameter defaulting to `America/Toronto`). Before the
/// cutoff, "today" hasn't been released yet, so the most recent fully
/// released day is yesterday.
const RELEASE_TIME: (u32, u32) = (8, 30);

/// The most recent calendar date (in `tz`) whose WDS release is guaranteed to
/// have happened already, as of `now`.
pub fn release_cutoff(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    let local = now.with_timezone(&tz);
    let release_time = NaiveTime::from_hms_opt(RELEASE_TIME.0, RELEASE_TIME.1, 0)
        .expect("08:30:00 is always a valid time");

    if local.time() < release_time {
        local.date_naive().pred_opt().expect("NaiveDate::pred never underflows in practice")
    } else {
        local.date_naive()
    }
}

/// Fetches the changed-cube list for every date from `since` through `until`
/// inclusive and records it in the change log; every changed productid is
/// seeded into the cube status table so it enters the fetch pipeline even if
/// `seed-status` hasn't run yet (§4.D). `getChangedCubeList` is a per-day
/// endpoint, so a multi-day gap since the last discovery pass means one call
/// per day in the gap, not one call for the oldest day alone.
#[instrument(skip(client, change_log, cube_status))]
pub async fn discover_changes(
    client: &WdsClient,
    since: NaiveDate,
    until: NaiveDate,
    change_log: &ChangeLogRepository,
    cube_status: &StatusRepository,
) -> Result<usize, SchedulerError> {
    let mut total = 0;
    let mut date = since;

    while date <= until {
        let entries = client.changed_cube_list(date).await?;

        for entry in &entries {
            change_log
                .record(ChangeLogEntry {
                    productid: entry.productid,
                    change_date: entry.release_time.date_naive(),
                })
                .await?;
            cube_status.seed(ArtifactKey::Cube(entry.productid)).await?;
            cube_status.mark_pending(ArtifactKey::Cube(entry.productid)).await?;
        }

        total += entries.len();
        date = date.succ_opt().expect("succ_opt never overflows walking forward to a recent date");
    }

    info!(count = total, %since, %until, "discovered changed cubes");
    Ok(total)
}

pub fn default_release_tz() -> Tz {
    chrono_tz::America::Toronto
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_release_time_uses_previous_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 11, 0, 0).unwrap(); // 06:00 Toronto (EST, UTC-5)
        let cutoff = release_cutoff(now, chrono_tz::America::Toronto);
        assert_eq!(cutoff, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    }

    #[test]
    fn after_release_time_uses_current_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 14, 0, 0).unwrap(); // 09:00 Toronto (EST, UTC-5)
        let cutoff = release_cutoff(now, chrono_tz::America::Toronto);
        assert_eq!(cutoff, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
    }
}
