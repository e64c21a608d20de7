//! Repository for the `projects` and `project_developers` tables.

use std::collections::HashMap;

use sqlx::{Sqlite, SqlitePool, Transaction};
use timetrack_core::types::DbId;

use crate::models::project::{CreateProject, Project, ProjectDeveloper, UpdateProject};

/// Projects joined with client and leader names.
const SELECT: &str = "SELECT p.id, p.name, p.client_id, p.leader_id, p.tasks, p.created_at, \
                      c.name AS client_name, u.name AS leader_name \
                      FROM projects p \
                      LEFT JOIN clients c ON c.id = p.client_id \
                      LEFT JOIN users u ON u.id = p.leader_id";

/// Provides CRUD operations for projects and their developer assignments.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project and its developer assignments in one transaction.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateProject,
        developer_ids: &[DbId],
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = sqlx::query(
            "INSERT INTO projects (name, client_id, leader_id, tasks) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&input.name)
        .bind(input.client_id)
        .bind(input.leader_id)
        .bind(&input.tasks)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        Self::replace_developers_in(&mut tx, id, developer_ids).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a project by ID, with names and developer assignments attached.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.id = ?1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match project {
            Some(mut project) => {
                project.developer_ids = Self::developer_ids(pool, id).await?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// List all projects ordered by name.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("{SELECT} ORDER BY p.name, p.id");
        let projects = sqlx::query_as::<_, Project>(&query).fetch_all(pool).await?;
        Self::attach_developers(pool, projects).await
    }

    /// Projects led by `leader_id`.
    pub async fn list_by_leader(
        pool: &SqlitePool,
        leader_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.leader_id = ?1 ORDER BY p.name, p.id");
        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(leader_id)
            .fetch_all(pool)
            .await?;
        Self::attach_developers(pool, projects).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// When `developer_ids` is `Some`, the assignment list is replaced in the
    /// same transaction. Returns `None` if the project does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateProject,
        developer_ids: Option<&[DbId]>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "UPDATE projects SET
                name = COALESCE(?2, name),
                client_id = COALESCE(?3, client_id),
                leader_id = COALESCE(?4, leader_id),
                tasks = COALESCE(?5, tasks)
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.client_id)
        .bind(input.leader_id)
        .bind(&input.tasks)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(developer_ids) = developer_ids {
            Self::replace_developers_in(&mut tx, id, developer_ids).await?;
        }
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    /// Delete a project and its time entries. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Developer assignment
    // -----------------------------------------------------------------------

    /// User IDs assigned to `project_id`, ascending.
    pub async fn developer_ids(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM project_developers WHERE project_id = ?1 ORDER BY user_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the developer assignment of a project.
    pub async fn set_developers(
        pool: &SqlitePool,
        project_id: DbId,
        developer_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::replace_developers_in(&mut tx, project_id, developer_ids).await?;
        tx.commit().await?;
        Self::developer_ids(pool, project_id).await
    }

    async fn replace_developers_in(
        tx: &mut Transaction<'_, Sqlite>,
        project_id: DbId,
        developer_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_developers WHERE project_id = ?1")
            .bind(project_id)
            .execute(&mut **tx)
            .await?;
        for user_id in developer_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO project_developers (project_id, user_id) VALUES (?1, ?2)",
            )
            .bind(project_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn attach_developers(
        pool: &SqlitePool,
        mut projects: Vec<Project>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectDeveloper>(
            "SELECT project_id, user_id FROM project_developers ORDER BY project_id, user_id",
        )
        .fetch_all(pool)
        .await?;

        let mut by_project: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for row in rows {
            by_project.entry(row.project_id).or_default().push(row.user_id);
        }
        for project in &mut projects {
            project.developer_ids = by_project.remove(&project.id).unwrap_or_default();
        }
        Ok(projects)
    }
}
