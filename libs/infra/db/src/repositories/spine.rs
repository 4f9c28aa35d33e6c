use crate::errors::DbError;
use libsql::{params, Connection};
use tracing::{info, instrument};
use wds_domain_models::{Cube, CubeSubjectLink, CubeSurveyLink};

/// Backs the Spine Loader (§4.E): the active spine artifact is parsed wholesale
/// and replaces the prior snapshot in one transaction, since the spine JSON has
/// no incremental delta of its own.
pub struct SpineRepository {
    connection: Connection,
}

impl SpineRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, cubes, subjects, surveys))]
    pub async fn replace_all(
        &self,
        cubes: &[Cube],
        subjects: &[CubeSubjectLink],
        surveys: &[CubeSurveyLink],
    ) -> Result<(), DbError> {
        let txn = self
            .connection
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        txn.execute("DELETE FROM spine_cube_subjects", ())
            .await
            .map_err(DbError::Query)?;
        txn.execute("DELETE FROM spine_cube_surveys", ())
            .await
            .map_err(DbError::Query)?;
        txn.execute("DELETE FROM spine_cubes", ())
            .await
            .map_err(DbError::Query)?;

        for cube in cubes {
            txn.execute(
                "INSERT INTO spine_cubes \
                 (productid, cansim_id, title_en, title_fr, start_date, end_date, release_date, \
                  archived_flag, frequency_code, issue_date) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    cube.productid.0,
                    cube.cansim_id.clone(),
                    cube.title_en.clone(),
                    cube.title_fr.clone(),
                    cube.start_date.map(|d| d.to_string()),
                    cube.end_date.map(|d| d.to_string()),
                    cube.release_date.map(|dt| dt.to_rfc3339()),
                    cube.archived_flag as i64,
                    cube.frequency_code.clone(),
                    cube.issue_date.map(|d| d.to_string()),
                ],
            )
            .await
            .map_err(DbError::Query)?;
        }

        for link in subjects {
            txn.execute(
                "INSERT INTO spine_cube_subjects (productid, subject_code) VALUES (?1, ?2)",
                params![link.productid.0, link.subject_code.clone()],
            )
            .await
            .map_err(DbError::Query)?;
        }

        for link in surveys {
            txn.execute(
                "INSERT INTO spine_cube_surveys (productid, survey_code) VALUES (?1, ?2)",
                params![link.productid.0, link.survey_code.clone()],
            )
            .await
            .map_err(DbError::Query)?;
        }

        txn.commit().await.map_err(|e| DbError::Transaction(e.to_string()))?;
        info!(cubes = cubes.len(), subjects = subjects.len(), surveys = surveys.len(), "spine replaced");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn all_productids(&self) -> Result<Vec<i64>, DbError> {
        let mut rows = self
            .connection
            .query("SELECT productid FROM spine_cubes ORDER BY productid", ())
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?);
        }
        Ok(ids)
    }
}
