//! Step Parser
//!
//! Builds the step tree from tokenized lines and turns whole cells into
//! workouts.
//!
//! Nesting is driven by depth: a `repeat` line opens a frame that collects
//! the deeper lines following it, and the frame closes when a line returns
//! to the repeat's own depth or shallower. Notes attach to the step emitted
//! most recently, which may sit inside a block that just closed.

use chrono::NaiveDate;
use log::{debug, info};

use crate::config::ParserConfig;

use super::duration::resolve_duration;
use super::error::ParseError;
use super::lexer::{tokenize, LineKind, LogicalLine};
use super::model::{Step, StepKind, Workout};
use super::target::resolve_target;
use super::validator::{assemble_workout, check_header};

/// The header line of a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutHeader {
    pub line: usize,
    pub workout_type: String,
    pub name: String,
}

/// A repeat whose body is still being read.
struct OpenRepeat {
    line: usize,
    text: String,
    count: u32,
    notes: Vec<String>,
}

/// One insertion point: the top level, or an open repeat.
struct Frame {
    group: Option<OpenRepeat>,
    steps: Vec<Step>,
}

impl Frame {
    fn root() -> Self {
        Self {
            group: None,
            steps: Vec::new(),
        }
    }

    fn into_repeat(self) -> Result<Step, ParseError> {
        let Some(group) = self.group else {
            return Err(ParseError::InvalidStep {
                reason: "top level closed as a repeat".to_string(),
            });
        };

        if self.steps.is_empty() {
            return Err(ParseError::EmptyRepeat {
                line: group.line,
                text: group.text,
            });
        }

        let mut step = Step::repeat(group.count, self.steps);
        step.notes = group.notes;
        Ok(step)
    }
}

/// Closes open repeats until the innermost frame sits at `depth`.
fn close_to(stack: &mut Vec<Frame>, depth: usize) -> Result<(), ParseError> {
    while stack.len() > depth + 1 {
        let Some(frame) = stack.pop() else { break };
        let step = frame.into_repeat()?;
        debug!(
            "closed repeat x{} with {} steps",
            step.repeat_count.unwrap_or_default(),
            step.children.len()
        );
        if let Some(parent) = stack.last_mut() {
            parent.steps.push(step);
        }
    }
    Ok(())
}

fn attach_note(stack: &mut [Frame], line: &LogicalLine, text: &str) -> Result<(), ParseError> {
    let Some(top) = stack.last_mut() else {
        return Err(orphan(line));
    };

    if let Some(last) = top.steps.last_mut() {
        last.last_emitted_mut().notes.push(text.to_string());
    } else if let Some(group) = top.group.as_mut() {
        group.notes.push(text.to_string());
    } else {
        return Err(orphan(line));
    }

    debug!("line {}: attached note '{}'", line.number, text);
    Ok(())
}

fn orphan(line: &LogicalLine) -> ParseError {
    ParseError::OrphanNote {
        line: line.number,
        text: line.raw.trim().to_string(),
    }
}

/// Builds a leaf step from a step line.
fn build_leaf(
    line: &LogicalLine,
    keyword: &str,
    duration: &str,
    target: Option<&str>,
    note: Option<&str>,
) -> Result<Step, ParseError> {
    let kind = StepKind::from_keyword(keyword).ok_or_else(|| ParseError::UnknownStepKeyword {
        line: line.number,
        keyword: keyword.to_string(),
        text: line.raw.trim().to_string(),
    })?;

    let duration = resolve_duration(duration).map_err(|e| e.at_line(line.number))?;
    let mut step = Step::leaf(kind, duration);

    if let Some(target) = target {
        step = step.with_target(resolve_target(target).map_err(|e| e.at_line(line.number))?);
    }

    if let Some(note) = note {
        step = step.with_note(note);
    }

    Ok(step)
}

/// Fails step and repeat lines nested `max_depth` levels or deeper.
fn check_depth(line: &LogicalLine, level: usize, max_depth: usize) -> Result<(), ParseError> {
    if line.depth >= max_depth {
        return Err(ParseError::malformed(line.number, &line.raw, "nesting too deep"));
    }
    if line.depth > level {
        return Err(ParseError::malformed(line.number, &line.raw, "unexpected indentation"));
    }
    Ok(())
}

/// Builds the ordered top-level steps from the body lines of a cell.
///
/// `lines` must not include the header. Step and repeat lines may nest at
/// most `max_depth` levels.
pub fn parse_steps(lines: &[LogicalLine], max_depth: usize) -> Result<Vec<Step>, ParseError> {
    let mut stack = vec![Frame::root()];

    for line in lines {
        let level = stack.len() - 1;

        match &line.kind {
            LineKind::Header { .. } => {
                return Err(ParseError::malformed(
                    line.number,
                    &line.raw,
                    "header is only allowed on the first line",
                ));
            }
            LineKind::Note { text } => {
                close_to(&mut stack, line.depth)?;
                attach_note(&mut stack, line, text)?;
            }
            LineKind::Step {
                keyword,
                duration,
                target,
                note,
            } => {
                check_depth(line, level, max_depth)?;
                close_to(&mut stack, line.depth)?;

                let step = build_leaf(line, keyword, duration, target.as_deref(), note.as_deref())?;
                if let Some(top) = stack.last_mut() {
                    top.steps.push(step);
                }
            }
            LineKind::RepeatOpen { count, note } => {
                check_depth(line, level, max_depth)?;
                close_to(&mut stack, line.depth)?;

                stack.push(Frame {
                    group: Some(OpenRepeat {
                        line: line.number,
                        text: line.raw.trim().to_string(),
                        count: *count,
                        notes: note.iter().cloned().collect(),
                    }),
                    steps: Vec::new(),
                });
            }
        }
    }

    close_to(&mut stack, 0)?;

    Ok(stack.pop().map(|root| root.steps).unwrap_or_default())
}

/// Splits tokenized lines into the header and the body.
fn split_header(lines: &[LogicalLine]) -> Result<(WorkoutHeader, &[LogicalLine]), ParseError> {
    let Some((first, body)) = lines.split_first() else {
        return Err(ParseError::EmptyWorkout);
    };

    match &first.kind {
        LineKind::Header { workout_type, name } => Ok((
            WorkoutHeader {
                line: first.number,
                workout_type: workout_type.clone(),
                name: name.clone(),
            },
            body,
        )),
        _ => Err(ParseError::malformed(
            first.number,
            &first.raw,
            "cell must start with a 'type: name' header",
        )),
    }
}

/// Parses one cell into a validated workout scheduled on `scheduled_date`.
///
/// Any malformed line fails the whole cell; there is no partial workout.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use planparse::config::ParserConfig;
/// use planparse::workout::{parse_workout_text, Duration, StepKind, Target};
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let text = "running: Easy Recovery\n- run: 30:00 @z1\n- note: Keep it easy!";
/// let workout = parse_workout_text(text, date, &ParserConfig::default()).unwrap();
///
/// assert_eq!(workout.steps.len(), 1);
/// assert_eq!(workout.steps[0].kind, StepKind::Run);
/// assert_eq!(workout.steps[0].duration, Some(Duration::Timed { seconds: 1800 }));
/// assert_eq!(workout.steps[0].target, Some(Target::HeartRateZone { zone: 1 }));
/// assert_eq!(workout.steps[0].notes, vec!["Keep it easy!"]);
/// ```
pub fn parse_workout_text(
    text: &str,
    scheduled_date: NaiveDate,
    config: &ParserConfig,
) -> Result<Workout, ParseError> {
    let lines = tokenize(text, config.indent_width)?;
    let (header, body) = split_header(&lines)?;

    // Reject other sports before their keywords produce confusing errors.
    check_header(&header)?;

    let steps = parse_steps(body, config.max_depth)?;
    let workout = assemble_workout(&header, steps, scheduled_date, config)?;

    info!(
        "Parsed workout '{}' for {}: {} top-level steps",
        workout.name,
        scheduled_date,
        workout.steps.len()
    );
    Ok(workout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_DEPTH;
    use crate::workout::model::{Duration, Target, CROSS_TRAINING_TAG, STAIR_MACHINE_TAG};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn parse(text: &str) -> Result<Workout, ParseError> {
        parse_workout_text(text, date(), &ParserConfig::default())
    }

    fn body(text: &str) -> Result<Vec<Step>, ParseError> {
        let lines = tokenize(&format!("running: Test\n{}", text), 2)?;
        parse_steps(&lines[1..], DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn test_easy_recovery() {
        let workout = parse("running: Easy Recovery\n- run: 30:00 @z1\n- note: Keep it easy!").unwrap();

        assert_eq!(workout.name, "Easy Recovery");
        assert_eq!(workout.scheduled_date, date());
        assert_eq!(
            workout.steps,
            vec![Step::leaf(StepKind::Run, Duration::Timed { seconds: 1800 })
                .with_target(Target::HeartRateZone { zone: 1 })
                .with_note("Keep it easy!")]
        );
    }

    #[test]
    fn test_intervals_with_repeat() {
        let text = "running: 10K Intervals\n\
                    - warmup: 15:00 @z2; Easy pace, loosen up\n\
                    - repeat: 5\n  \
                      - run: 3:00 @z4\n  \
                      - note: Strong but controlled effort\n  \
                      - recover: 2:00 @z1\n\
                    - cooldown: 10:00 @z2";
        let workout = parse(text).unwrap();

        let expected = vec![
            Step::leaf(StepKind::Warmup, Duration::Timed { seconds: 900 })
                .with_target(Target::HeartRateZone { zone: 2 })
                .with_note("Easy pace, loosen up"),
            Step::repeat(
                5,
                vec![
                    Step::leaf(StepKind::Run, Duration::Timed { seconds: 180 })
                        .with_target(Target::HeartRateZone { zone: 4 })
                        .with_note("Strong but controlled effort"),
                    Step::leaf(StepKind::Recover, Duration::Timed { seconds: 120 })
                        .with_target(Target::HeartRateZone { zone: 1 }),
                ],
            ),
            Step::leaf(StepKind::Cooldown, Duration::Timed { seconds: 600 })
                .with_target(Target::HeartRateZone { zone: 2 }),
        ];
        assert_eq!(workout.steps, expected);
    }

    #[test]
    fn test_distance_only_step() {
        let workout = parse("running: Long Run\n- run: 46km").unwrap();

        assert_eq!(workout.steps.len(), 1);
        let step = &workout.steps[0];
        assert_eq!(step.kind, StepKind::Run);
        assert_eq!(step.duration, Some(Duration::Distance { meters: 46000.0 }));
        assert!(step.target.is_none());
        assert!(step.notes.is_empty());
    }

    #[test]
    fn test_unknown_keyword_references_line() {
        let err = parse("running: Speed\n- sprint: 5:00").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownStepKeyword {
                line: 2,
                keyword: "sprint".to_string(),
                text: "- sprint: 5:00".to_string()
            }
        );
    }

    #[test]
    fn test_consecutive_notes_attach_in_order() {
        let steps = body("- run: 10:00\n- note: first\n- note: second\n- rest: 1:00").unwrap();

        assert_eq!(steps[0].notes, vec!["first", "second"]);
        assert!(steps[1].notes.is_empty());
    }

    #[test]
    fn test_inline_note_precedes_continuations() {
        let steps = body("- run: 10:00; inline\n- note: continued").unwrap();
        assert_eq!(steps[0].notes, vec!["inline", "continued"]);
    }

    #[test]
    fn test_note_after_block_attaches_to_last_nested_step() {
        let steps = body("- repeat: 3\n  - run: 1:00\n  - rest: 0:30\n- note: walk it off").unwrap();

        assert!(steps[0].notes.is_empty());
        assert_eq!(steps[0].children[1].notes, vec!["walk it off"]);
    }

    #[test]
    fn test_note_directly_after_repeat_attaches_to_repeat() {
        let steps = body("- repeat: 3\n  - note: hill reps\n  - run: 1:00").unwrap();

        assert_eq!(steps[0].notes, vec!["hill reps"]);
        assert!(steps[0].children[0].notes.is_empty());
    }

    #[test]
    fn test_indented_note_under_leaf() {
        let steps = body("- run: 20:00\n  - note: relaxed\n- cooldown: 5:00").unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].notes, vec!["relaxed"]);
    }

    #[test]
    fn test_orphan_note() {
        let err = body("- note: too early\n- run: 5:00").unwrap_err();
        assert_eq!(
            err,
            ParseError::OrphanNote {
                line: 2,
                text: "- note: too early".to_string()
            }
        );
    }

    #[test]
    fn test_nested_repeats() {
        let text = "- repeat: 2\n  - repeat: 3\n    - run: 0:30 @z5\n    - rest: 0:30\n  - recover: 3:00\n- cooldown: 10:00";
        let steps = body(text).unwrap();

        assert_eq!(steps.len(), 2);
        let outer = &steps[0];
        assert_eq!(outer.repeat_count, Some(2));
        assert_eq!(outer.children.len(), 2);

        let inner = &outer.children[0];
        assert_eq!(inner.repeat_count, Some(3));
        assert_eq!(inner.children.len(), 2);
        assert_eq!(outer.children[1].kind, StepKind::Recover);
        assert_eq!(steps[1].kind, StepKind::Cooldown);
    }

    #[test]
    fn test_block_closes_across_several_levels() {
        let steps = body("- repeat: 2\n  - repeat: 2\n    - run: 1:00\n- rest: 2:00").unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].children[0].children.len(), 1);
        assert_eq!(steps[1].kind, StepKind::Rest);
    }

    #[test]
    fn test_node_count_matches_step_lines() {
        let text = "running: Mix\n\
                    - warmup: 10:00\n\
                    - repeat: 4\n  \
                      - run: 400m @4:00-4:10\n  \
                      - note: smooth\n  \
                      - repeat: 2\n    \
                        - rest: 0:30\n    \
                        - note: shake out\n\
                    - note: last rest gets this too\n\
                    - cooldown: lap-button";
        let workout = parse(text).unwrap();

        assert_eq!(workout.step_line_count(), 6);
        assert_eq!(workout.leaf_count(), 4);
        let rest = &workout.steps[1].children[1].children[0];
        assert_eq!(rest.notes, vec!["shake out", "last rest gets this too"]);
    }

    #[test]
    fn test_empty_repeat_fails() {
        let err = body("- repeat: 5\n- run: 5:00").unwrap_err();
        assert_eq!(
            err,
            ParseError::EmptyRepeat {
                line: 2,
                text: "- repeat: 5".to_string()
            }
        );

        let err = body("- run: 5:00\n- repeat: 5").unwrap_err();
        assert!(matches!(err, ParseError::EmptyRepeat { line: 3, .. }));
    }

    #[test]
    fn test_unexpected_indentation() {
        let err = body("- run: 5:00\n    - run: 5:00").unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn test_deep_repeat_chain_is_rejected() {
        let mut text = String::from("running: Deep\n");
        for depth in 0..3000 {
            text.push_str(&"\t".repeat(depth));
            text.push_str("- repeat: 2\n");
        }
        text.push_str(&"\t".repeat(3000));
        text.push_str("- run: 1:00");

        let err = parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedLine {
                line: 66,
                reason: "nesting too deep",
                ..
            }
        ));
    }

    #[test]
    fn test_max_depth_from_config() {
        let config = ParserConfig {
            max_depth: 2,
            ..ParserConfig::default()
        };

        let ok = "running: Shallow\n- repeat: 2\n  - run: 1:00";
        assert!(parse_workout_text(ok, date(), &config).is_ok());

        let deep = "running: Deep\n- repeat: 2\n  - repeat: 2\n    - run: 1:00";
        let err = parse_workout_text(deep, date(), &config).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine {
                line: 4,
                text: "- run: 1:00".to_string(),
                reason: "nesting too deep",
            }
        );
    }

    #[test]
    fn test_duration_and_target_errors_carry_line() {
        let err = parse("running: X\n- run: 5:00\n- run: 5:75").unwrap_err();
        assert!(matches!(err, ParseError::DurationSyntax { line: Some(3), .. }));

        let err = parse("running: X\n- run: 5:00 @z9").unwrap_err();
        assert!(matches!(err, ParseError::TargetSyntax { line: Some(2), .. }));
    }

    #[test]
    fn test_cross_training_tags_precede_user_notes() {
        let steps = body("- other: 30:00; elliptical\n- stair: 10:00\n- note: steady climb").unwrap();

        assert_eq!(steps[0].kind, StepKind::Other);
        assert_eq!(steps[0].notes, vec![CROSS_TRAINING_TAG, "elliptical"]);
        assert_eq!(steps[1].kind, StepKind::Stair);
        assert_eq!(steps[1].notes, vec![STAIR_MACHINE_TAG, "steady climb"]);
    }

    #[test]
    fn test_unsupported_type_reported_before_body() {
        let err = parse("cycling: Bike Ride\n- warmup: 10:00\n- bike: 60:00").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedWorkoutType {
                workout_type: "cycling".to_string()
            }
        );
    }

    #[test]
    fn test_header_only_is_empty_workout() {
        assert_eq!(parse("running: Nothing").unwrap_err(), ParseError::EmptyWorkout);
        assert_eq!(parse("").unwrap_err(), ParseError::EmptyWorkout);
        assert_eq!(parse("   \n  ").unwrap_err(), ParseError::EmptyWorkout);
    }

    #[test]
    fn test_empty_name_uses_default() {
        let workout = parse("Running:\n- run: 5:00").unwrap();
        assert_eq!(workout.name, "Workout");
    }

    #[test]
    fn test_pace_target_and_lap_button() {
        let workout = parse("running: Tempo\n- run: 20:00 @4:30-4:15\n- cooldown: lap-button").unwrap();

        assert_eq!(
            workout.steps[0].target,
            Some(Target::PaceRange {
                low_sec_per_km: 255.0,
                high_sec_per_km: 270.0
            })
        );
        assert_eq!(workout.steps[1].duration, Some(Duration::LapButton));
    }
}
