//! Hour rollups over time entries for dashboards and reports.
//!
//! Everything here is a pure function over a slice of records. Nothing can
//! fail: an empty input yields zero totals and empty groups.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::hours::{hours_to_tenths, tenths_to_hours};
use crate::types::DbId;

/// Read-only view of a time entry, as needed for aggregation.
///
/// Implemented by the persistence row type so rollups can run directly over
/// query results.
pub trait HoursRecord {
    fn entry_id(&self) -> DbId;
    fn user_id(&self) -> DbId;
    fn project_id(&self) -> DbId;
    /// Client owning the entry's project, when known.
    fn client_id(&self) -> Option<DbId>;
    fn date(&self) -> NaiveDate;
    fn hours(&self) -> f64;
    fn user_name(&self) -> &str;
    fn project_name(&self) -> &str;
}

fn total_of<'a, R, I>(records: I) -> f64
where
    R: HoursRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    tenths_to_hours(records.into_iter().map(|r| hours_to_tenths(r.hours())).sum())
}

// ---------------------------------------------------------------------------
// Period totals
// ---------------------------------------------------------------------------

/// Sunday..=Saturday bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    let sunday = date - Days::new(offset);
    (sunday, sunday + Days::new(6))
}

/// Whether `a` and `b` fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Hours `user_id` logged on `date`.
pub fn daily_total<R: HoursRecord>(records: &[R], user_id: DbId, date: NaiveDate) -> f64 {
    total_of(
        records
            .iter()
            .filter(|r| r.user_id() == user_id && r.date() == date),
    )
}

/// Hours `user_id` logged in the Sunday–Saturday week containing `date`.
pub fn weekly_total<R: HoursRecord>(records: &[R], user_id: DbId, date: NaiveDate) -> f64 {
    let (start, end) = week_bounds(date);
    total_of(
        records
            .iter()
            .filter(|r| r.user_id() == user_id && r.date() >= start && r.date() <= end),
    )
}

/// Hours `user_id` logged in the calendar month containing `date`.
pub fn monthly_total<R: HoursRecord>(records: &[R], user_id: DbId, date: NaiveDate) -> f64 {
    total_of(
        records
            .iter()
            .filter(|r| r.user_id() == user_id && same_month(r.date(), date)),
    )
}

/// Day / week / month totals for one user around a reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub user_id: DbId,
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub day_hours: f64,
    pub week_hours: f64,
    pub month_hours: f64,
}

pub fn period_totals<R: HoursRecord>(records: &[R], user_id: DbId, date: NaiveDate) -> PeriodTotals {
    let (week_start, week_end) = week_bounds(date);
    PeriodTotals {
        user_id,
        date,
        week_start,
        week_end,
        day_hours: daily_total(records, user_id, date),
        week_hours: weekly_total(records, user_id, date),
        month_hours: monthly_total(records, user_id, date),
    }
}

// ---------------------------------------------------------------------------
// Report filtering
// ---------------------------------------------------------------------------

/// Optional report filters. Dates are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn matches<R: HoursRecord>(&self, record: &R) -> bool {
        if let Some(client_id) = self.client_id {
            if record.client_id() != Some(client_id) {
                return false;
            }
        }
        if self.project_id.is_some_and(|id| record.project_id() != id) {
            return false;
        }
        if self.user_id.is_some_and(|id| record.user_id() != id) {
            return false;
        }
        if self.start_date.is_some_and(|d| record.date() < d) {
            return false;
        }
        if self.end_date.is_some_and(|d| record.date() > d) {
            return false;
        }
        true
    }

    pub fn apply<'a, R: HoursRecord>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Grouped rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRollup {
    pub project_id: DbId,
    pub project_name: String,
    pub hours: f64,
    pub entries: usize,
    /// Distinct users who logged time on the project.
    pub developers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRollup {
    pub user_id: DbId,
    pub user_name: String,
    pub hours: f64,
    pub entries: usize,
}

#[derive(Default)]
struct Bucket {
    name: String,
    tenths: i64,
    entries: usize,
    users: BTreeSet<DbId>,
}

fn bucket_by<'a, R, F>(records: &[&'a R], key: F) -> BTreeMap<DbId, Bucket>
where
    R: HoursRecord + 'a,
    F: Fn(&R) -> (DbId, &str),
{
    let mut groups: BTreeMap<DbId, Bucket> = BTreeMap::new();
    for record in records {
        let (id, name) = key(*record);
        let bucket = groups.entry(id).or_default();
        if bucket.name.is_empty() {
            bucket.name = name.to_string();
        }
        bucket.tenths += hours_to_tenths(record.hours());
        bucket.entries += 1;
        bucket.users.insert(record.user_id());
    }
    groups
}

/// Group by project, sorted by hours descending (ties by name).
pub fn rollup_by_project<R: HoursRecord>(records: &[&R]) -> Vec<ProjectRollup> {
    let mut rows: Vec<ProjectRollup> = bucket_by(records, |r| (r.project_id(), r.project_name()))
        .into_iter()
        .map(|(project_id, b)| ProjectRollup {
            project_id,
            project_name: b.name,
            hours: tenths_to_hours(b.tenths),
            entries: b.entries,
            developers: b.users.len(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.project_name.cmp(&b.project_name))
    });
    rows
}

/// Group by user, sorted by hours descending (ties by name).
pub fn rollup_by_user<R: HoursRecord>(records: &[&R]) -> Vec<UserRollup> {
    let mut rows: Vec<UserRollup> = bucket_by(records, |r| (r.user_id(), r.user_name()))
        .into_iter()
        .map(|(user_id, b)| UserRollup {
            user_id,
            user_name: b.name,
            hours: tenths_to_hours(b.tenths),
            entries: b.entries,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.user_name.cmp(&b.user_name))
    });
    rows
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStats {
    pub total_hours: f64,
    pub total_entries: usize,
    pub avg_hours_per_entry: f64,
    /// Average over distinct days that have at least one entry.
    pub avg_hours_per_day: f64,
    /// Day with the most hours (earliest on ties). `None` when empty.
    pub most_productive_day: Option<NaiveDate>,
}

pub fn summarize<R: HoursRecord>(records: &[&R]) -> TimeStats {
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in records {
        *per_day.entry(record.date()).or_default() += hours_to_tenths(record.hours());
    }
    let total_tenths: i64 = per_day.values().sum();
    let total_hours = tenths_to_hours(total_tenths);

    let average = |count: usize| {
        if count == 0 {
            0.0
        } else {
            // Round the quotient to one decimal.
            tenths_to_hours((total_tenths as f64 / count as f64).round() as i64)
        }
    };

    let most_productive_day = per_day
        .iter()
        .fold(None::<(NaiveDate, i64)>, |best, (&day, &tenths)| match best {
            Some((_, best_tenths)) if best_tenths >= tenths => best,
            _ => Some((day, tenths)),
        })
        .map(|(day, _)| day);

    TimeStats {
        total_hours,
        total_entries: records.len(),
        avg_hours_per_entry: average(records.len()),
        avg_hours_per_day: average(per_day.len()),
        most_productive_day,
    }
}

/// Report payload: summary plus both groupings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub filter: ReportFilterEcho,
    pub stats: TimeStats,
    pub by_project: Vec<ProjectRollup>,
    pub by_user: Vec<UserRollup>,
}

/// The filter as applied, echoed back in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilterEcho {
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&ReportFilter> for ReportFilterEcho {
    fn from(f: &ReportFilter) -> Self {
        Self {
            client_id: f.client_id,
            project_id: f.project_id,
            user_id: f.user_id,
            start_date: f.start_date,
            end_date: f.end_date,
        }
    }
}

/// Filter `records` and compute the full report.
pub fn build_report<R: HoursRecord>(records: &[R], filter: &ReportFilter) -> ReportSummary {
    let selected = filter.apply(records);
    ReportSummary {
        filter: filter.into(),
        stats: summarize(&selected),
        by_project: rollup_by_project(&selected),
        by_user: rollup_by_user(&selected),
    }
}
