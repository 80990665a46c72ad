//! Plan Grid Walker
//!
//! Parses every populated cell of a plan and collects one entry per cell.
//! A failing cell is recorded with its location and the walk continues, so
//! a caller can report every broken cell after a single pass.

use std::thread;

use chrono::{Datelike, NaiveDate, Weekday};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::ParserConfig;
use crate::workout::{parse_workout_text, ParseError, Workout};

use super::grid::{CellLocation, PlanGrid};

/// Failure of one plan cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("week index must be 1 or greater, got {week}")]
    InvalidWeek { week: u32 },

    #[error("scheduled date for {location} is out of range")]
    DateOutOfRange { location: CellLocation },

    #[error("parser worker panicked")]
    WorkerPanicked,
}

/// Outcome of one populated cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub location: CellLocation,
    /// Missing only when the date could not be computed
    pub scheduled_date: Option<NaiveDate>,
    pub outcome: Result<Workout, CellError>,
}

impl PlanEntry {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Human-readable description of a failed cell.
    pub fn diagnostic(&self) -> Option<String> {
        let err = self.outcome.as_ref().err()?;
        let date = self
            .scheduled_date
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        Some(format!("{}{}: {}", self.location, date, err))
    }
}

/// Outcomes for a whole plan, in grid traversal order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanParseResult {
    pub entries: Vec<PlanEntry>,
}

impl PlanParseResult {
    /// Successfully parsed workouts ordered by scheduled date.
    ///
    /// Workouts on the same date keep their grid order.
    pub fn workouts(&self) -> Vec<&Workout> {
        let mut workouts: Vec<&Workout> = self
            .entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok())
            .collect();
        workouts.sort_by_key(|w| w.scheduled_date);
        workouts
    }

    /// Consumes the result, keeping only the workouts, ordered by date.
    pub fn into_workouts(self) -> Vec<Workout> {
        let mut workouts: Vec<Workout> = self
            .entries
            .into_iter()
            .filter_map(|e| e.outcome.ok())
            .collect();
        workouts.sort_by_key(|w| w.scheduled_date);
        workouts
    }

    /// Entries whose cell failed.
    pub fn failures(&self) -> Vec<&PlanEntry> {
        self.entries.iter().filter(|e| !e.is_ok()).collect()
    }

    /// Returns true if every cell parsed.
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(PlanEntry::is_ok)
    }

    /// One line per failed cell.
    pub fn diagnostics(&self) -> Vec<String> {
        self.entries.iter().filter_map(PlanEntry::diagnostic).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a single cell at `location`.
pub fn parse_cell(
    location: CellLocation,
    text: &str,
    start_date: NaiveDate,
    config: &ParserConfig,
) -> PlanEntry {
    if location.week == 0 {
        return PlanEntry {
            location,
            scheduled_date: None,
            outcome: Err(CellError::InvalidWeek { week: 0 }),
        };
    }

    let Some(date) = location.date_from(start_date) else {
        return PlanEntry {
            location,
            scheduled_date: None,
            outcome: Err(CellError::DateOutOfRange { location }),
        };
    };

    let outcome = parse_workout_text(text, date, config).map_err(CellError::from);

    if let Err(ref e) = outcome {
        warn!("Failed to parse workout at {}: {}", location, e);
    } else {
        debug!("Parsed cell {} for {}", location, date);
    }

    PlanEntry {
        location,
        scheduled_date: Some(date),
        outcome,
    }
}

fn log_start(grid: &PlanGrid, start_date: NaiveDate) -> Vec<(CellLocation, &str)> {
    if start_date.weekday() != Weekday::Mon {
        warn!(
            "Plan start date {} is a {:?}, expected a Monday",
            start_date,
            start_date.weekday()
        );
    }

    let cells = grid.cells();
    info!(
        "Walking plan: {} weeks, {} populated cells, starting {}",
        grid.weeks.len(),
        cells.len(),
        start_date
    );
    cells
}

fn log_finish(result: &PlanParseResult) {
    info!(
        "Parsed {} workouts from training plan ({} failed)",
        result.len() - result.failures().len(),
        result.failures().len()
    );
}

/// Walks the grid sequentially, parsing every populated cell.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use planparse::config::ParserConfig;
/// use planparse::plan::{walk_plan, PlanGrid, PlanWeek};
///
/// let mut grid = PlanGrid::new();
/// grid.add_week(
///     PlanWeek::new(1)
///         .with_cell(Weekday::Mon, "running: Easy\n- run: 30:00 @z1")
///         .with_cell(Weekday::Wed, "running: Broken\n- sprint: 5:00"),
/// );
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let result = walk_plan(&grid, start, &ParserConfig::default());
/// assert_eq!(result.workouts().len(), 1);
/// assert_eq!(result.failures().len(), 1);
/// ```
pub fn walk_plan(grid: &PlanGrid, start_date: NaiveDate, config: &ParserConfig) -> PlanParseResult {
    let cells = log_start(grid, start_date);

    let entries = cells
        .into_iter()
        .map(|(location, text)| parse_cell(location, text, start_date, config))
        .collect();

    let result = PlanParseResult { entries };
    log_finish(&result);
    result
}

/// Walks the grid with worker threads, keeping grid order in the result.
///
/// Uses `config.parallelism()` workers; each takes a contiguous run of cells.
pub fn walk_plan_parallel(
    grid: &PlanGrid,
    start_date: NaiveDate,
    config: &ParserConfig,
) -> PlanParseResult {
    let cells = log_start(grid, start_date);
    if cells.is_empty() {
        return PlanParseResult::default();
    }

    let workers = config.parallelism().clamp(1, cells.len());
    let chunk_size = cells.len().div_ceil(workers);
    debug!("Parsing {} cells on {} workers", cells.len(), workers);

    let mut entries = Vec::with_capacity(cells.len());

    thread::scope(|scope| {
        let handles: Vec<_> = cells
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|(location, text)| parse_cell(*location, text, start_date, config))
                        .collect::<Vec<_>>()
                });
                (chunk, handle)
            })
            .collect();

        for (chunk, handle) in handles {
            match handle.join() {
                Ok(chunk_entries) => entries.extend(chunk_entries),
                Err(_) => {
                    warn!("Parser worker panicked on {} cells", chunk.len());
                    entries.extend(chunk.iter().map(|(location, _)| PlanEntry {
                        location: *location,
                        scheduled_date: location.date_from(start_date),
                        outcome: Err(CellError::WorkerPanicked),
                    }));
                }
            }
        }
    });

    let result = PlanParseResult { entries };
    log_finish(&result);
    result
}
