//! Workout Data Model
//!
//! Core data structures representing a parsed workout cell: durations,
//! targets, steps (leaves and repeat groups) and the workout itself.
//!
//! # Example Cell Text
//!
//! ```text
//! running: 10K Intervals
//! - warmup: 15:00 @z2; Easy pace, loosen up
//! - repeat: 5
//!   - run: 3:00 @z4
//!   - note: Strong but controlled effort
//!   - recover: 2:00 @z1
//! - cooldown: 10:00 @z2
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Meters in one yard.
pub const METERS_PER_YARD: f64 = 0.9144;

/// Fixed note carried by steps written with the `other` keyword.
pub const CROSS_TRAINING_TAG: &str = "cross-training";

/// Fixed note carried by steps written with the `stair` keyword.
pub const STAIR_MACHINE_TAG: &str = "stair machine";

/// How a leaf step ends.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Duration {
    /// Ends after a fixed number of seconds
    Timed { seconds: u32 },
    /// Ends after covering a distance
    Distance { meters: f64 },
    /// Ends when the athlete presses the lap button
    LapButton,
}

impl Duration {
    /// Returns true if the payload is strictly positive (always true for lap-button).
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Timed { seconds } => *seconds > 0,
            Self::Distance { meters } => meters.is_finite() && *meters > 0.0,
            Self::LapButton => true,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timed { seconds } => write!(f, "{}:{:02}", seconds / 60, seconds % 60),
            Self::Distance { meters } if *meters >= 1000.0 => write!(f, "{}km", meters / 1000.0),
            Self::Distance { meters } => write!(f, "{}m", meters),
            Self::LapButton => write!(f, "lap-button"),
        }
    }
}

/// Intensity goal for a leaf step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    /// Heart-rate zone 1..=5
    HeartRateZone { zone: u8 },
    /// Pace band, both bounds in seconds per kilometer (low = faster)
    PaceRange {
        low_sec_per_km: f64,
        high_sec_per_km: f64,
    },
}

impl Target {
    /// Builds a pace range, ordering the bounds so the faster pace is `low`.
    pub fn pace_range(a_sec_per_km: f64, b_sec_per_km: f64) -> Self {
        let (low, high) = if a_sec_per_km <= b_sec_per_km {
            (a_sec_per_km, b_sec_per_km)
        } else {
            (b_sec_per_km, a_sec_per_km)
        };
        Self::PaceRange {
            low_sec_per_km: low,
            high_sec_per_km: high,
        }
    }

    /// Checks the zone range and pace ordering/positivity.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::HeartRateZone { zone } => (1..=5).contains(zone),
            Self::PaceRange {
                low_sec_per_km,
                high_sec_per_km,
            } => *low_sec_per_km > 0.0 && low_sec_per_km <= high_sec_per_km,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRateZone { zone } => write!(f, "@z{}", zone),
            Self::PaceRange {
                low_sec_per_km,
                high_sec_per_km,
            } => {
                let low = low_sec_per_km.round() as u32;
                let high = high_sec_per_km.round() as u32;
                write!(
                    f,
                    "@{}:{:02}-{}:{:02}/km",
                    low / 60,
                    low % 60,
                    high / 60,
                    high % 60
                )
            }
        }
    }
}

/// The kind of a step, derived from the line keyword.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Warmup,
    Run,
    Interval,
    Recover,
    Rest,
    Cooldown,
    Other,
    Stair,
    Repeat,
}

impl StepKind {
    /// Maps a lowercase line keyword to a leaf step kind.
    ///
    /// `repeat` and `note` are structural keywords and are not mapped here.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "warmup" => Some(Self::Warmup),
            "cooldown" => Some(Self::Cooldown),
            "run" => Some(Self::Run),
            "interval" | "go" => Some(Self::Interval),
            "recover" | "recovery" => Some(Self::Recover),
            "rest" => Some(Self::Rest),
            "other" => Some(Self::Other),
            "stair" => Some(Self::Stair),
            _ => None,
        }
    }

    /// Fixed note tag identifying keywords that have no platform equivalent.
    pub fn tag_note(&self) -> Option<&'static str> {
        match self {
            Self::Other => Some(CROSS_TRAINING_TAG),
            Self::Stair => Some(STAIR_MACHINE_TAG),
            _ => None,
        }
    }

    /// Returns true for `Other` and `Stair`.
    pub fn is_cross_training(&self) -> bool {
        self.tag_note().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Run => "run",
            Self::Interval => "interval",
            Self::Recover => "recover",
            Self::Rest => "rest",
            Self::Cooldown => "cooldown",
            Self::Other => "other",
            Self::Stair => "stair",
            Self::Repeat => "repeat",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leaf instruction or one repeat group.
///
/// A leaf has a `duration` and no children; a repeat group has a
/// `repeat_count` and at least one child. The assembler checks this
/// before a [`Workout`] is produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,

    /// Inline note first, then continuation notes in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Step>,
}

impl Step {
    /// Creates a leaf step. `Other` and `Stair` start with their tag note.
    ///
    /// # Example
    ///
    /// ```
    /// use planparse::workout::{Duration, Step, StepKind, Target};
    ///
    /// let step = Step::leaf(StepKind::Run, Duration::Timed { seconds: 180 })
    ///     .with_target(Target::HeartRateZone { zone: 4 })
    ///     .with_note("Strong but controlled effort");
    /// assert!(step.is_leaf());
    /// ```
    pub fn leaf(kind: StepKind, duration: Duration) -> Self {
        Self {
            kind,
            duration: Some(duration),
            target: None,
            notes: kind.tag_note().map(str::to_string).into_iter().collect(),
            repeat_count: None,
            children: Vec::new(),
        }
    }

    /// Creates a repeat group.
    pub fn repeat(count: u32, children: Vec<Step>) -> Self {
        Self {
            kind: StepKind::Repeat,
            duration: None,
            target: None,
            notes: Vec::new(),
            repeat_count: Some(count),
            children,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_repeat(&self) -> bool {
        self.kind == StepKind::Repeat
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_repeat()
    }

    /// Number of step nodes in this subtree, this step included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Step::node_count).sum::<usize>()
    }

    /// Number of leaf steps in this subtree.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Step::leaf_count).sum()
        }
    }

    /// The step emitted last in source order within this subtree.
    pub fn last_emitted_mut(&mut self) -> &mut Step {
        if self.children.is_empty() {
            return self;
        }
        let last = self.children.len() - 1;
        self.children[last].last_emitted_mut()
    }
}

/// Supported workout sports.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Running,
}

impl WorkoutType {
    /// Case-insensitive lookup of a header type word.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "running" => Some(Self::Running),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated workout bound to its calendar date.
///
/// Only produced by the assembler, so a `Workout` always holds a
/// non-empty, well-formed step tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub workout_type: WorkoutType,

    /// Free text from the header line
    pub name: String,

    /// Top-level steps in source order
    pub steps: Vec<Step>,

    pub scheduled_date: NaiveDate,
}

impl Workout {
    /// Number of step nodes in the whole tree.
    ///
    /// Equals the number of step and repeat lines in the source.
    pub fn step_line_count(&self) -> usize {
        self.steps.iter().map(Step::node_count).sum()
    }

    /// Number of leaf steps in the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.steps.iter().map(Step::leaf_count).sum()
    }

    /// Returns the number of top-level steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for an assembled workout.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scheduled_date, self.name)
    }
}
