//! Weekly Plan Grid
//!
//! A plan is a table with one row per week and one column per weekday.
//! This module holds the grid, the location of each cell, and the date
//! arithmetic that places a cell on the calendar.

use std::fmt;

use chrono::{Days, NaiveDate, Weekday};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weekday columns in grid order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name, as used for column headers.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Days after Monday, 0..=6.
pub fn day_offset(day: Weekday) -> u64 {
    u64::from(day.num_days_from_monday())
}

/// Position of a cell in the plan.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellLocation {
    /// 1-based week index
    pub week: u32,
    pub day: Weekday,
}

impl CellLocation {
    pub fn new(week: u32, day: Weekday) -> Self {
        Self { week, day }
    }

    /// Calendar date of this cell for a plan starting on `start`.
    ///
    /// `start` is expected to be the Monday of week 1. Returns `None` for
    /// week 0 or when the date overflows the calendar.
    pub fn date_from(&self, start: NaiveDate) -> Option<NaiveDate> {
        let weeks = u64::from(self.week.checked_sub(1)?);
        start.checked_add_days(Days::new(weeks * 7 + day_offset(self.day)))
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Week {}, {}", self.week, day_name(self.day))
    }
}

/// Errors turning spreadsheet records into a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("no day columns found (expected some of Monday..Sunday), got: {}", .columns.join(", "))]
    NoDayColumns { columns: Vec<String> },
}

/// One row of the plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanWeek {
    /// 1-based week index
    pub week: u32,

    /// Populated cells of this week
    pub cells: Vec<(Weekday, String)>,
}

impl PlanWeek {
    pub fn new(week: u32) -> Self {
        Self {
            week,
            cells: Vec::new(),
        }
    }

    /// Sets a day's cell text. Blank text is ignored.
    pub fn with_cell(mut self, day: Weekday, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return self;
        }
        self.cells.retain(|(d, _)| *d != day);
        self.cells.push((day, text));
        self
    }
}

/// The whole plan, week rows in source order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PlanGrid {
    pub weeks: Vec<PlanWeek>,
}

impl PlanGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self { weeks: Vec::new() }
    }

    /// Appends a week row.
    pub fn add_week(&mut self, week: PlanWeek) {
        self.weeks.push(week);
    }

    /// Populated cells in traversal order: row by row, Monday to Sunday.
    pub fn cells(&self) -> Vec<(CellLocation, &str)> {
        let mut cells = Vec::new();
        for week in &self.weeks {
            let mut row: Vec<_> = week
                .cells
                .iter()
                .filter(|(_, text)| !text.trim().is_empty())
                .collect();
            row.sort_by_key(|(day, _)| day.num_days_from_monday());

            for (day, text) in row {
                cells.push((CellLocation::new(week.week, *day), text.trim()));
            }
        }
        cells
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.cells().len()
    }

    /// Returns true if no cell is populated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a grid from spreadsheet records.
    ///
    /// Day columns are matched case-insensitively by full weekday name. An
    /// optional `WEEK` column gives the week index; rows without a usable
    /// week number get their 1-based row position instead.
    ///
    /// # Example
    ///
    /// ```
    /// use planparse::plan::PlanGrid;
    ///
    /// let headers = ["WEEK", "Monday", "Wednesday"];
    /// let rows = vec![vec!["1", "running: Easy\n- run: 30:00", ""]];
    /// let grid = PlanGrid::from_records(&headers, &rows).unwrap();
    /// assert_eq!(grid.len(), 1);
    /// ```
    pub fn from_records<H, C>(headers: &[H], rows: &[Vec<C>]) -> Result<Self, GridError>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let names: Vec<String> = headers.iter().map(|h| h.as_ref().trim().to_string()).collect();

        let week_column = names.iter().position(|n| n.eq_ignore_ascii_case("week"));

        let day_columns: Vec<(usize, Weekday)> = names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                WEEKDAYS
                    .iter()
                    .find(|day| name.eq_ignore_ascii_case(day_name(**day)))
                    .map(|day| (index, *day))
            })
            .collect();

        if day_columns.is_empty() {
            return Err(GridError::NoDayColumns { columns: names });
        }

        debug!(
            "Found day columns: {:?}",
            day_columns.iter().map(|(_, d)| day_name(*d)).collect::<Vec<_>>()
        );

        let mut grid = PlanGrid::new();

        for (row_index, row) in rows.iter().enumerate() {
            let fallback = u32::try_from(row_index + 1).unwrap_or(u32::MAX);

            let week = match week_column {
                Some(column) => {
                    let raw = row.get(column).map(|c| c.as_ref().trim()).unwrap_or("");
                    raw.parse::<u32>().ok().filter(|w| *w > 0).unwrap_or_else(|| {
                        warn!(
                            "Invalid week number at row {}: '{}', using {}",
                            row_index + 1,
                            raw,
                            fallback
                        );
                        fallback
                    })
                }
                None => fallback,
            };

            let mut plan_week = PlanWeek::new(week);
            for (column, day) in &day_columns {
                if let Some(cell) = row.get(*column) {
                    plan_week = plan_week.with_cell(*day, cell.as_ref());
                }
            }
            grid.add_week(plan_week);
        }

        Ok(grid)
    }
}
