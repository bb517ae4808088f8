//! Repository for the `projects` table.

use meal_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, code, name, sector, donor, country, start_date, end_date, budget, \
    staff_count, goal, objectives, achievements, provinces, districts, \
    communities, clusters, standard_sectors, beneficiaries, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (code, name, sector, donor, country, start_date, end_date, budget, \
                 staff_count, goal, objectives, achievements, provinces, districts, \
                 communities, clusters, standard_sectors, beneficiaries) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.sector)
            .bind(&input.donor)
            .bind(&input.country)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.staff_count)
            .bind(&input.goal)
            .bind(&input.objectives)
            .bind(&input.achievements)
            .bind(&input.provinces)
            .bind(&input.districts)
            .bind(&input.communities)
            .bind(&input.clusters)
            .bind(&input.standard_sectors)
            .bind(Json(&input.beneficiaries))
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by code.
    pub async fn list<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY code, id");
        sqlx::query_as::<_, Project>(&query)
            .fetch_all(executor)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                sector = COALESCE($4, sector),
                donor = COALESCE($5, donor),
                country = COALESCE($6, country),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                budget = COALESCE($9, budget),
                staff_count = COALESCE($10, staff_count),
                goal = COALESCE($11, goal),
                objectives = COALESCE($12, objectives),
                achievements = COALESCE($13, achievements),
                provinces = COALESCE($14, provinces),
                districts = COALESCE($15, districts),
                communities = COALESCE($16, communities),
                clusters = COALESCE($17, clusters),
                standard_sectors = COALESCE($18, standard_sectors),
                beneficiaries = COALESCE($19, beneficiaries),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.sector)
            .bind(&input.donor)
            .bind(&input.country)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.staff_count)
            .bind(&input.goal)
            .bind(&input.objectives)
            .bind(&input.achievements)
            .bind(&input.provinces)
            .bind(&input.districts)
            .bind(&input.communities)
            .bind(&input.clusters)
            .bind(&input.standard_sectors)
            .bind(input.beneficiaries.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }
}
