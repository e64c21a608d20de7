//! Month calendars, working days and heat-map bands.
//!
//! The leader dashboard shows, for every developer and every day of a month,
//! the hours logged that day colour-coded by [`HeatBand`], with weekends and
//! configured holidays flagged as non-working.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::CoreError;
use crate::hours::{hours_to_tenths, tenths_to_hours};
use crate::rollup::HoursRecord;
use crate::types::DbId;

/// Upper bound (inclusive, in hours) of the light band.
pub const LIGHT_MAX_HOURS: f64 = 4.0;
/// Upper bound (inclusive, in hours) of the normal band.
pub const NORMAL_MAX_HOURS: f64 = 8.0;

// ---------------------------------------------------------------------------
// Heat-map bands
// ---------------------------------------------------------------------------

/// Colour band of a developer's daily total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatBand {
    /// Nothing logged.
    Empty,
    /// Up to 4 hours.
    Light,
    /// More than 4, up to 8 hours.
    Normal,
    /// More than 8 hours.
    Overtime,
}

impl HeatBand {
    pub fn classify(hours: f64) -> Self {
        let tenths = hours_to_tenths(hours);
        if tenths <= 0 {
            HeatBand::Empty
        } else if tenths <= hours_to_tenths(LIGHT_MAX_HOURS) {
            HeatBand::Light
        } else if tenths <= hours_to_tenths(NORMAL_MAX_HOURS) {
            HeatBand::Normal
        } else {
            HeatBand::Overtime
        }
    }
}

// ---------------------------------------------------------------------------
// Working days
// ---------------------------------------------------------------------------

/// Weekends plus a static list of holiday dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WorkingCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(holidays: I) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of `YYYY-MM-DD` dates. Blank tokens are ignored.
    pub fn parse_holidays(raw: &str) -> Result<Self, CoreError> {
        let mut holidays = BTreeSet::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let date = NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| {
                CoreError::Validation(format!("Invalid holiday date '{token}', expected YYYY-MM-DD"))
            })?;
            holidays.insert(date);
        }
        Ok(Self { holidays })
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        Self::is_weekend(date) || self.is_holiday(date)
    }
}

// ---------------------------------------------------------------------------
// Months
// ---------------------------------------------------------------------------

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days().last().copied().unwrap_or(self.first)
    }

    /// Every day of the month in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.first.month())
            .collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.first.year() && date.month() == self.first.month()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl FromStr for Month {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Invalid month '{s}', expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

// ---------------------------------------------------------------------------
// Month calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub non_working: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub hours: f64,
    pub band: HeatBand,
    pub non_working: bool,
    pub entry_ids: Vec<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperRow {
    pub user_id: DbId,
    pub user_name: String,
    pub total_hours: f64,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendar {
    pub month: String,
    pub days: Vec<CalendarDay>,
    pub developers: Vec<DeveloperRow>,
}

#[derive(Default)]
struct DayCell {
    tenths: i64,
    entry_ids: Vec<DbId>,
}

/// Build the heat-map calendar for `month`.
///
/// One row per user with at least one entry in the month, ordered by name.
/// Records outside the month are ignored.
pub fn build_month_calendar<R: HoursRecord>(
    month: Month,
    records: &[R],
    working: &WorkingCalendar,
) -> MonthCalendar {
    let days = month.days();

    // user_id -> (name, date -> cell)
    let mut users: BTreeMap<DbId, (String, BTreeMap<NaiveDate, DayCell>)> = BTreeMap::new();
    for record in records.iter().filter(|r| month.contains(r.date())) {
        let (_, cells) = users
            .entry(record.user_id())
            .or_insert_with(|| (record.user_name().to_string(), BTreeMap::new()));
        let cell = cells.entry(record.date()).or_default();
        cell.tenths += hours_to_tenths(record.hours());
        cell.entry_ids.push(record.entry_id());
    }

    let mut developers: Vec<DeveloperRow> = users
        .into_iter()
        .map(|(user_id, (user_name, mut by_day))| {
            let total: i64 = by_day.values().map(|c| c.tenths).sum();
            let cells = days
                .iter()
                .map(|&date| {
                    let cell = by_day.remove(&date).unwrap_or_default();
                    let hours = tenths_to_hours(cell.tenths);
                    CalendarCell {
                        date,
                        hours,
                        band: HeatBand::classify(hours),
                        non_working: working.is_non_working(date),
                        entry_ids: cell.entry_ids,
                    }
                })
                .collect();
            DeveloperRow {
                user_id,
                user_name,
                total_hours: tenths_to_hours(total),
                cells,
            }
        })
        .collect();
    developers.sort_by(|a, b| a.user_name.cmp(&b.user_name).then(a.user_id.cmp(&b.user_id)));

    MonthCalendar {
        month: month.to_string(),
        days: days
            .iter()
            .map(|&date| CalendarDay {
                date,
                non_working: working.is_non_working(date),
            })
            .collect(),
        developers,
    }
}
