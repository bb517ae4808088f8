//! Database-backed [`SnapshotProvider`].

use async_trait::async_trait;
use meal_core::snapshot::{
    Branding, EntitySnapshot, EvaluationData, MonitoringData, PdmData, SnapshotError,
    SnapshotProvider,
};
use sqlx::PgPool;

use crate::repositories::record_repo::TitledTable;
use crate::repositories::{BrandingRepo, ComplaintRepo, ProjectRepo, RecordRepo};

/// Loads a full [`EntitySnapshot`] from PostgreSQL on every call.
#[derive(Debug, Clone)]
pub struct PgSnapshotProvider {
    pool: PgPool,
}

impl PgSnapshotProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read every table inside one `REPEATABLE READ` transaction so the
    /// snapshot reflects a single committed state.
    async fn load(&self) -> Result<EntitySnapshot, LoadError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let projects = ProjectRepo::list(&mut *tx)
            .await?
            .iter()
            .map(|row| {
                row.to_domain().map_err(|e| {
                    LoadError::Corrupt(format!("project {} beneficiaries: {e}", row.id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let branding = BrandingRepo::get(&mut *tx)
            .await?
            .map(Branding::from)
            .unwrap_or_default();

        let monitoring = MonitoringData {
            baseline_surveys: collect_checked(
                RecordRepo::baseline_surveys(&mut *tx).await?,
                |r| r.to_domain(),
            )?,
            monthly_reports: collect_checked(
                RecordRepo::monthly_reports(&mut *tx).await?,
                |r| r.to_domain(),
            )?,
            field_visits: into_all(RecordRepo::field_visits(&mut *tx).await?),
            enumerators: into_all(RecordRepo::enumerators(&mut *tx).await?),
        };

        let evaluation = EvaluationData {
            evaluations: collect_checked(RecordRepo::evaluations(&mut *tx).await?, |r| {
                r.to_domain()
            })?,
            stories: into_all(RecordRepo::titled(&mut *tx, TitledTable::SuccessStories).await?),
        };

        let findings =
            collect_checked(RecordRepo::findings(&mut *tx).await?, |r| r.to_domain())?;

        let pdm = PdmData {
            distributions: into_all(RecordRepo::distributions(&mut *tx).await?),
            surveys: into_all(RecordRepo::titled(&mut *tx, TitledTable::PdmSurveys).await?),
            reports: into_all(RecordRepo::titled(&mut *tx, TitledTable::PdmReports).await?),
        };

        let complaints = collect_checked(
            ComplaintRepo::list(&mut *tx, None).await?,
            |r| r.to_domain(),
        )?;
        let crm_awareness = into_all(RecordRepo::crm_awareness(&mut *tx).await?);

        tx.commit().await?;

        Ok(EntitySnapshot {
            projects,
            monitoring,
            evaluation,
            findings,
            pdm,
            branding,
            complaints,
            crm_awareness,
        })
    }
}

#[async_trait]
impl SnapshotProvider for PgSnapshotProvider {
    async fn fetch_snapshot(&self) -> Result<EntitySnapshot, SnapshotError> {
        let snapshot = self.load().await.map_err(SnapshotError::from)?;
        tracing::debug!(
            projects = snapshot.projects.len(),
            findings = snapshot.findings.len(),
            complaints = snapshot.complaints.len(),
            "Loaded entity snapshot",
        );
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error("{0}")]
    Corrupt(String),
}

impl From<LoadError> for SnapshotError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Db(e) => SnapshotError::Unavailable(e.to_string()),
            LoadError::Corrupt(msg) => SnapshotError::Corrupt(msg),
        }
    }
}

fn into_all<R, T: From<R>>(rows: Vec<R>) -> Vec<T> {
    rows.into_iter().map(T::from).collect()
}

fn collect_checked<R, T>(
    rows: Vec<R>,
    convert: impl Fn(&R) -> Result<T, meal_core::error::CoreError>,
) -> Result<Vec<T>, LoadError> {
    rows.iter()
        .map(|r| convert(r).map_err(|e| LoadError::Corrupt(e.to_string())))
        .collect()
}
