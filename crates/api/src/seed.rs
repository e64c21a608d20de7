//! Demo data for local development.
//!
//! Seeding only runs against an empty `users` table, so restarting the
//! server never duplicates rows.

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use timetrack_core::calendar::WorkingCalendar;
use timetrack_core::hours::{compute_hours, format_clock_time, parse_clock_time};
use timetrack_core::roles::Role;
use timetrack_core::types::DbId;
use timetrack_db::models::client::CreateClient;
use timetrack_db::models::project::CreateProject;
use timetrack_db::models::template::CreateTemplate;
use timetrack_db::models::time_entry::NewTimeEntry;
use timetrack_db::models::user::CreateUser;
use timetrack_db::repositories::{ClientRepo, ProjectRepo, TemplateRepo, TimeEntryRepo, UserRepo};
use timetrack_db::DbPool;

use crate::auth::password::hash_password;

/// Calendar days of history generated for each developer.
const HISTORY_DAYS: i64 = 14;

const USERS: &[(&str, &str, &str, Role)] = &[
    ("Admin User", "admin@timetracker.com", "admin123", Role::Admin),
    ("Maria Garcia", "maria@timetracker.com", "leader123", Role::Leader),
    ("Carlos Lopez", "carlos@timetracker.com", "dev123", Role::Developer),
    ("Ana Martinez", "ana@timetracker.com", "dev123", Role::Developer),
    ("Juan Perez", "juan@timetracker.com", "leader123", Role::Leader),
];

const CLIENTS: &[(&str, &str)] = &[
    ("Tech Solutions Inc.", "Technology solutions provider"),
    ("Digital Marketing Co.", "Digital marketing agency"),
    ("Finance Corp", "Corporate financial services"),
];

const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "Standard Web Project",
        "Typical web application delivery",
        "Frontend,Backend,Testing,Documentation,Deployment",
    ),
    (
        "Marketing Campaign",
        "Campaign planning and execution",
        "Research,Design,Content,Analysis,Reporting",
    ),
    (
        "Mobile Development",
        "Native mobile application",
        "UI/UX,iOS Development,Android Development,Testing,Release",
    ),
];

/// One recurring block of work: (developer email, project index, task, start, end, description).
type WorkBlock = (&'static str, usize, &'static str, &'static str, &'static str, &'static str);

const WORK_BLOCKS: &[WorkBlock] = &[
    ("carlos@timetracker.com", 0, "Frontend", "09:00", "13:00", "Portal components"),
    ("carlos@timetracker.com", 2, "Testing", "14:00", "17:30", "Regression suite"),
    ("ana@timetracker.com", 1, "Design", "09:30", "12:30", "Campaign visuals"),
    ("ana@timetracker.com", 1, "Content", "13:30", "16:00", "Copy review"),
];

/// Insert the demo dataset when the database has no users.
///
/// Returns `true` when data was written and `false` when the database was
/// already populated.
pub async fn seed_demo_data(pool: &DbPool) -> anyhow::Result<bool> {
    let existing = UserRepo::count(pool).await.context("counting users")?;
    if existing > 0 {
        tracing::info!(existing, "Demo data skipped; users already present");
        return Ok(false);
    }

    let mut user_ids = Vec::with_capacity(USERS.len());
    for &(name, email, password, role) in USERS {
        let password_hash = hash_password(password)
            .map_err(|e| anyhow::anyhow!("hashing demo password for {email}: {e}"))?;
        let user = UserRepo::create(
            pool,
            &CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            },
        )
        .await
        .with_context(|| format!("creating demo user {email}"))?;
        user_ids.push((email, user.id));
    }
    let user_id = |email: &str| -> anyhow::Result<DbId> {
        user_ids
            .iter()
            .find(|(e, _)| *e == email)
            .map(|(_, id)| *id)
            .with_context(|| format!("demo user {email} missing"))
    };

    let mut client_ids = Vec::with_capacity(CLIENTS.len());
    for &(name, description) in CLIENTS {
        let client = ClientRepo::create(
            pool,
            &CreateClient {
                name: name.to_string(),
                description: Some(description.to_string()),
            },
        )
        .await
        .with_context(|| format!("creating demo client {name}"))?;
        client_ids.push(client.id);
    }

    for &(name, description, tasks) in TEMPLATES {
        TemplateRepo::create(
            pool,
            &CreateTemplate {
                name: name.to_string(),
                description: Some(description.to_string()),
                tasks: tasks.to_string(),
            },
        )
        .await
        .with_context(|| format!("creating demo template {name}"))?;
    }

    let carlos = user_id("carlos@timetracker.com")?;
    let ana = user_id("ana@timetracker.com")?;
    let projects: [(&str, DbId, DbId, &str, Vec<DbId>); 3] = [
        (
            "Web Portal",
            client_ids[0],
            user_id("maria@timetracker.com")?,
            "Frontend,Backend,Testing,Documentation",
            vec![carlos],
        ),
        (
            "Q1 Digital Campaign",
            client_ids[1],
            user_id("juan@timetracker.com")?,
            "Design,Content,Analysis,Reporting",
            vec![ana],
        ),
        (
            "Mobile Banking App",
            client_ids[2],
            user_id("maria@timetracker.com")?,
            "UI/UX,Development,Testing,Deployment",
            vec![carlos, ana],
        ),
    ];

    let mut project_ids = Vec::with_capacity(projects.len());
    for (name, client_id, leader_id, tasks, developers) in &projects {
        let project = ProjectRepo::create(
            pool,
            &CreateProject {
                name: name.to_string(),
                client_id: *client_id,
                leader_id: *leader_id,
                tasks: tasks.to_string(),
            },
            developers,
        )
        .await
        .with_context(|| format!("creating demo project {name}"))?;
        project_ids.push(project.id);
    }

    let today = Local::now().date_naive();
    let mut entries = 0usize;
    for date in history(today) {
        for &(email, project_idx, task, start, end, description) in WORK_BLOCKS {
            let entry = demo_entry(
                user_id(email)?,
                project_ids[project_idx],
                task,
                date,
                start,
                end,
                description,
            )?;
            TimeEntryRepo::create(pool, &entry)
                .await
                .with_context(|| format!("creating demo entry for {email} on {date}"))?;
            entries += 1;
        }
    }

    tracing::info!(
        users = USERS.len(),
        clients = CLIENTS.len(),
        projects = project_ids.len(),
        templates = TEMPLATES.len(),
        entries,
        "Demo data seeded"
    );
    Ok(true)
}

/// Weekdays in the `HISTORY_DAYS` ending today, oldest first.
fn history(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..HISTORY_DAYS)
        .rev()
        .map(move |offset| today - Duration::days(offset))
        .filter(|date| !WorkingCalendar::is_weekend(*date))
}

fn demo_entry(
    user_id: DbId,
    project_id: DbId,
    task: &str,
    date: NaiveDate,
    start: &str,
    end: &str,
    description: &str,
) -> anyhow::Result<NewTimeEntry> {
    let start = parse_clock_time(start).with_context(|| format!("bad demo start time {start}"))?;
    let end = parse_clock_time(end).with_context(|| format!("bad demo end time {end}"))?;
    Ok(NewTimeEntry {
        user_id,
        project_id,
        task_name: task.to_string(),
        date,
        start_time: format_clock_time(start),
        end_time: format_clock_time(end),
        hours: compute_hours(start, end),
        description: Some(description.to_string()),
    })
}
