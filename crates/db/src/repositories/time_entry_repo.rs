//! Repository for the `time_entries` table.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use timetrack_core::types::DbId;

use crate::models::time_entry::{NewTimeEntry, TimeEntry};

/// Entries joined with user and project names plus the owning client.
const SELECT: &str = "SELECT t.id, t.user_id, t.project_id, t.task_name, t.date, \
                      t.start_time, t.end_time, t.hours, t.description, t.created_at, \
                      u.name AS user_name, p.name AS project_name, p.client_id AS client_id \
                      FROM time_entries t \
                      LEFT JOIN users u ON u.id = t.user_id \
                      LEFT JOIN projects p ON p.id = t.project_id";

/// Newest day first, latest start first within a day.
const ORDER: &str = "ORDER BY t.date DESC, t.start_time DESC, t.id DESC";

/// Provides CRUD and range queries for time entries.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Insert an entry, returning the joined row.
    pub async fn create(pool: &SqlitePool, input: &NewTimeEntry) -> Result<TimeEntry, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO time_entries
                (user_id, project_id, task_name, date, start_time, end_time, hours, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(input.user_id)
        .bind(input.project_id)
        .bind(&input.task_name)
        .bind(input.date)
        .bind(&input.start_time)
        .bind(&input.end_time)
        .bind(input.hours)
        .bind(&input.description)
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!("{SELECT} WHERE t.id = ?1");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!("{SELECT} {ORDER}");
        sqlx::query_as::<_, TimeEntry>(&query).fetch_all(pool).await
    }

    pub async fn list_by_user(
        pool: &SqlitePool,
        user_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!("{SELECT} WHERE t.user_id = ?1 {ORDER}");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!("{SELECT} WHERE t.project_id = ?1 {ORDER}");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Entries with `start <= date <= end`. Either bound may be open.
    pub async fn list_by_date_range(
        pool: &SqlitePool,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE (?1 IS NULL OR t.date >= ?1) AND (?2 IS NULL OR t.date <= ?2) {ORDER}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// A user's entries with `start <= date <= end`.
    pub async fn list_by_user_between(
        pool: &SqlitePool,
        user_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE t.user_id = ?1 AND t.date >= ?2 AND t.date <= ?3 {ORDER}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Entries on projects led by `leader_id` with `start <= date <= end`.
    pub async fn list_by_leader_between(
        pool: &SqlitePool,
        leader_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE p.leader_id = ?1 AND t.date >= ?2 AND t.date <= ?3 {ORDER}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(leader_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// A user's other entries on `date`, excluding `exclude_id` when editing.
    pub async fn list_same_day(
        pool: &SqlitePool,
        user_id: DbId,
        date: NaiveDate,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE t.user_id = ?1 AND t.date = ?2 AND (?3 IS NULL OR t.id <> ?3) \
             ORDER BY t.start_time"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .bind(date)
            .bind(exclude_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every editable column of an entry.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &NewTimeEntry,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE time_entries SET
                user_id = ?2,
                project_id = ?3,
                task_name = ?4,
                date = ?5,
                start_time = ?6,
                end_time = ?7,
                hours = ?8,
                description = ?9
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.user_id)
        .bind(input.project_id)
        .bind(&input.task_name)
        .bind(input.date)
        .bind(&input.start_time)
        .bind(&input.end_time)
        .bind(input.hours)
        .bind(&input.description)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
