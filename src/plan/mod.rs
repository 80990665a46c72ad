//! Training Plan Module
//!
//! Places workout cells on the calendar and parses a whole plan with
//! per-cell fault isolation.
//!
//! # Components
//!
//! - [`grid`]: Week/weekday grid, cell locations and date arithmetic
//! - [`walker`]: Sequential and parallel plan walks

pub mod grid;
pub mod walker;

pub use grid::{day_name, day_offset, CellLocation, GridError, PlanGrid, PlanWeek, WEEKDAYS};
pub use walker::{parse_cell, walk_plan, walk_plan_parallel, CellError, PlanEntry, PlanParseResult};
