//! Cell Parse Errors
//!
//! Every failure while turning one cell into a workout. Errors are local to
//! the cell: the plan walker records them and moves on.

use thiserror::Error;

/// Failure parsing or validating a single workout cell.
///
/// Line numbers are 1-based positions in the raw cell text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{}invalid duration '{token}': {reason}", line_prefix(.line))]
    DurationSyntax {
        line: Option<usize>,
        token: String,
        reason: &'static str,
    },

    #[error("{}invalid target '{token}': {reason}", line_prefix(.line))]
    TargetSyntax {
        line: Option<usize>,
        token: String,
        reason: &'static str,
    },

    #[error("line {line}: malformed line `{text}`: {reason}")]
    MalformedLine {
        line: usize,
        text: String,
        reason: &'static str,
    },

    #[error("line {line}: note has no preceding step to attach to: `{text}`")]
    OrphanNote { line: usize, text: String },

    #[error("line {line}: unknown step keyword '{keyword}' in `{text}`")]
    UnknownStepKeyword {
        line: usize,
        keyword: String,
        text: String,
    },

    #[error("unsupported workout type '{workout_type}' (only 'running' is supported)")]
    UnsupportedWorkoutType { workout_type: String },

    #[error("workout has no steps")]
    EmptyWorkout,

    #[error("line {line}: repeat block has no steps: `{text}`")]
    EmptyRepeat { line: usize, text: String },

    #[error("invalid step: {reason}")]
    InvalidStep { reason: String },
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("line {}: ", l)).unwrap_or_default()
}

impl ParseError {
    pub(crate) fn duration(token: &str, reason: &'static str) -> Self {
        Self::DurationSyntax {
            line: None,
            token: token.to_string(),
            reason,
        }
    }

    pub(crate) fn target(token: &str, reason: &'static str) -> Self {
        Self::TargetSyntax {
            line: None,
            token: token.to_string(),
            reason,
        }
    }

    pub(crate) fn malformed(line: usize, text: &str, reason: &'static str) -> Self {
        Self::MalformedLine {
            line,
            text: text.trim().to_string(),
            reason,
        }
    }

    /// Attaches a line number to token-level errors that lack one.
    pub fn at_line(self, at: usize) -> Self {
        match self {
            Self::DurationSyntax {
                line: None,
                token,
                reason,
            } => Self::DurationSyntax {
                line: Some(at),
                token,
                reason,
            },
            Self::TargetSyntax {
                line: None,
                token,
                reason,
            } => Self::TargetSyntax {
                line: Some(at),
                token,
                reason,
            },
            other => other,
        }
    }

    /// The cell line this error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::DurationSyntax { line, .. } | Self::TargetSyntax { line, .. } => *line,
            Self::MalformedLine { line, .. }
            | Self::OrphanNote { line, .. }
            | Self::UnknownStepKeyword { line, .. }
            | Self::EmptyRepeat { line, .. } => Some(*line),
            Self::UnsupportedWorkoutType { .. } | Self::EmptyWorkout | Self::InvalidStep { .. } => {
                None
            }
        }
    }
}
