//! PlanParse - Training Plan Cell Parser
//!
//! Turns the free-form workout text people type into training-plan
//! spreadsheets into validated, structured workouts that a scheduling
//! client can upload to a fitness platform.
//!
//! # Architecture
//!
//! The library is organized into four modules:
//!
//! - [`workout`]: Cell grammar, step tree model, parsing and validation
//! - [`plan`]: Weekly grid, calendar placement and per-cell fault isolation
//! - [`config`]: Parser settings and YAML loading
//! - [`export`]: Platform workout payloads
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use planparse::{walk_plan, ParserConfig, PlanGrid, PlanWeek};
//!
//! let mut grid = PlanGrid::new();
//! grid.add_week(PlanWeek::new(1).with_cell(
//!     Weekday::Tue,
//!     "running: 10K Intervals\n- warmup: 15:00 @z2\n- repeat: 5\n  - run: 3:00 @z4\n  - recover: 2:00 @z1\n- cooldown: 10:00",
//! ));
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let result = walk_plan(&grid, start, &ParserConfig::default());
//!
//! for line in result.diagnostics() {
//!     eprintln!("{}", line);
//! }
//! assert!(result.is_clean());
//! ```

pub mod config;
pub mod export;
pub mod plan;
pub mod workout;

// Re-export commonly used types
pub use config::{load_config, ParserConfig};
pub use plan::{walk_plan, walk_plan_parallel, CellLocation, PlanGrid, PlanParseResult, PlanWeek};
pub use workout::{parse_workout_text, ParseError, Step, Workout};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "PlanParse";
