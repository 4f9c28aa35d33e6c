use crate::context::AppContext;
use anyhow::{Context, Result};
use tracing::info;
use wds_db::{ArtifactRepository, StatusRepository};
use wds_domain_models::ArtifactFamily;
use wds_scheduler::verify_family;

pub async fn verify_files(context: &AppContext) -> Result<()> {
    for family in [ArtifactFamily::Spine, ArtifactFamily::Cube, ArtifactFamily::Metadata] {
        let artifacts = ArtifactRepository::new(
            context.db.connection().context("opening artifact connection")?,
            family,
        );
        let status = StatusRepository::new(
            context.db.connection().context("opening status connection")?,
            family,
        );

        let report = verify_family(&context.content_store, &artifacts, &status)
            .await
            .with_context(|| format!("verifying {family} artifacts"))?;
        info!(
            %family,
            checked = report.checked,
            ok = report.ok,
            repaired = report.repaired,
            "verification pass complete"
        );
    }
    Ok(())
}
