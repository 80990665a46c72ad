//! Workout Assembly and Validation
//!
//! Wraps a parsed step tree with its header and date, checking:
//! - The workout type is supported
//! - There is at least one top-level step
//! - Every step is either a well-formed leaf or a non-empty repeat

use chrono::NaiveDate;
use log::{debug, warn};

use crate::config::ParserConfig;

use super::error::ParseError;
use super::model::{Step, Workout, WorkoutType};
use super::parser::WorkoutHeader;

/// Resolves the header's workout type.
pub fn check_header(header: &WorkoutHeader) -> Result<WorkoutType, ParseError> {
    WorkoutType::from_name(&header.workout_type).ok_or_else(|| {
        ParseError::UnsupportedWorkoutType {
            workout_type: header.workout_type.clone(),
        }
    })
}

/// Collects every invariant violation in a step subtree.
///
/// `path` is the dotted 1-based position of the step, e.g. `2.1`.
fn validate_step(step: &Step, path: &str, issues: &mut Vec<String>) {
    let label = format!("step {} ({})", path, step.kind);

    if step.is_repeat() {
        if step.duration.is_some() {
            issues.push(format!("{}: repeat cannot have a duration", label));
        }
        if step.target.is_some() {
            issues.push(format!("{}: repeat cannot have a target", label));
        }
        match step.repeat_count {
            Some(count) if count > 0 => {}
            _ => issues.push(format!("{}: repeat count must be positive", label)),
        }
        if step.children.is_empty() {
            issues.push(format!("{}: repeat has no steps", label));
        }
        for (index, child) in step.children.iter().enumerate() {
            validate_step(child, &format!("{}.{}", path, index + 1), issues);
        }
        return;
    }

    match step.duration {
        Some(duration) if duration.is_positive() => {}
        Some(_) => issues.push(format!("{}: duration must be positive", label)),
        None => issues.push(format!("{}: leaf step has no duration", label)),
    }

    if let Some(target) = step.target {
        if !target.is_valid() {
            issues.push(format!("{}: invalid target {:?}", label, target));
        }
    }

    if step.repeat_count.is_some() {
        issues.push(format!("{}: only repeats carry a count", label));
    }

    if !step.children.is_empty() {
        issues.push(format!("{}: only repeats have child steps", label));
    }
}

/// Lists invariant violations across top-level steps without failing.
///
/// Useful for editors that show every problem at once.
pub fn quick_validate(steps: &[Step]) -> Vec<String> {
    let mut issues = Vec::new();

    if steps.is_empty() {
        issues.push("Workout has no steps".to_string());
        return issues;
    }

    for (index, step) in steps.iter().enumerate() {
        validate_step(step, &(index + 1).to_string(), &mut issues);
    }

    issues
}

/// Builds an immutable workout from a header and its top-level steps.
pub fn assemble_workout(
    header: &WorkoutHeader,
    steps: Vec<Step>,
    scheduled_date: NaiveDate,
    config: &ParserConfig,
) -> Result<Workout, ParseError> {
    let workout_type = check_header(header)?;

    if steps.is_empty() {
        return Err(ParseError::EmptyWorkout);
    }

    let issues = quick_validate(&steps);
    if !issues.is_empty() {
        return Err(ParseError::InvalidStep {
            reason: issues.join("; "),
        });
    }

    let name = if header.name.trim().is_empty() {
        warn!(
            "Workout on {} has no name, using '{}'",
            scheduled_date, config.default_workout_name
        );
        config.default_workout_name.clone()
    } else {
        header.name.trim().to_string()
    };

    debug!("Assembled '{}' with {} top-level steps", name, steps.len());

    Ok(Workout {
        workout_type,
        name,
        steps,
        scheduled_date,
    })
}
