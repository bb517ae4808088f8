//! Read-only queries over the MEAL record tables.
//!
//! Used only to assemble report snapshots; rows come back in id order.
//! Every query takes any executor so the snapshot loader can run them
//! inside one transaction.

use sqlx::PgExecutor;

use crate::models::records::{
    BaselineSurveyRow, CrmAwarenessRow, DistributionRow, EnumeratorRow, EvaluationRow,
    FieldVisitRow, FindingRow, MonthlyReportRow, TitledRow,
};

/// Tables that share the [`TitledRow`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitledTable {
    SuccessStories,
    PdmSurveys,
    PdmReports,
}

impl TitledTable {
    fn table_name(self) -> &'static str {
        match self {
            TitledTable::SuccessStories => "success_stories",
            TitledTable::PdmSurveys => "pdm_surveys",
            TitledTable::PdmReports => "pdm_reports",
        }
    }
}

pub struct RecordRepo;

impl RecordRepo {
    pub async fn baseline_surveys<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<BaselineSurveyRow>, sqlx::Error> {
        sqlx::query_as::<_, BaselineSurveyRow>(
            "SELECT id, project_id, title, status FROM baseline_surveys ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn monthly_reports<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<MonthlyReportRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyReportRow>(
            "SELECT id, project_id, period, status FROM monthly_reports ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn field_visits<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<FieldVisitRow>, sqlx::Error> {
        sqlx::query_as::<_, FieldVisitRow>(
            "SELECT id, project_id, visit_date, location FROM field_visits ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn enumerators<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<EnumeratorRow>, sqlx::Error> {
        sqlx::query_as::<_, EnumeratorRow>(
            "SELECT id, project_id, name FROM enumerators ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn evaluations<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<EvaluationRow>, sqlx::Error> {
        sqlx::query_as::<_, EvaluationRow>(
            "SELECT id, project_id, title, evaluation_type FROM evaluations ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    /// Rows of one of the title-only tables.
    pub async fn titled<'e, E: PgExecutor<'e>>(
        executor: E,
        table: TitledTable,
    ) -> Result<Vec<TitledRow>, sqlx::Error> {
        let query = format!(
            "SELECT id, project_id, title FROM {} ORDER BY id",
            table.table_name()
        );
        sqlx::query_as::<_, TitledRow>(&query).fetch_all(executor).await
    }

    pub async fn findings<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<FindingRow>, sqlx::Error> {
        sqlx::query_as::<_, FindingRow>(
            "SELECT id, project_id, title, status, severity FROM findings ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn crm_awareness<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<CrmAwarenessRow>, sqlx::Error> {
        sqlx::query_as::<_, CrmAwarenessRow>(
            "SELECT id, project_id, community, participants FROM crm_awareness_sessions ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn distributions<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<DistributionRow>, sqlx::Error> {
        sqlx::query_as::<_, DistributionRow>(
            "SELECT id, project_id, item, distribution_date FROM distributions ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }
}
