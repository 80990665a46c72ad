//! Workout Cell Parsing Module
//!
//! Turns the text of one spreadsheet cell into a validated [`Workout`].
//!
//! # Structure
//!
//! - [`model`]: Core data structures (Duration, Target, Step, Workout)
//! - [`duration`]: Duration token resolution
//! - [`target`]: Target token resolution
//! - [`lexer`]: Line splitting and classification
//! - [`parser`]: Step tree construction and the cell entry point
//! - [`validator`]: Workout assembly and invariant checks
//! - [`error`]: Cell-level error taxonomy

pub mod duration;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod target;
pub mod validator;

pub use duration::resolve_duration;
pub use error::ParseError;
pub use lexer::{tokenize, LineKind, LogicalLine};
pub use model::{Duration, Step, StepKind, Target, Workout, WorkoutType};
pub use parser::{parse_steps, parse_workout_text, WorkoutHeader};
pub use target::resolve_target;
pub use validator::{assemble_workout, quick_validate};
