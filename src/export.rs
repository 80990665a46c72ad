//! Workout Payload Export
//!
//! Renders a [`Workout`] as the JSON document the remote fitness platform
//! accepts for workout creation: one segment holding executable steps and
//! repeat groups. No I/O happens here; the upload collaborator sends the
//! value as-is.

use log::debug;
use serde_json::{json, Value};

use crate::workout::{Duration, Step, StepKind, Target, Workout, WorkoutType};

/// Platform step type ids and keys.
fn step_type(kind: StepKind) -> (u8, &'static str) {
    match kind {
        StepKind::Warmup => (1, "warmup"),
        StepKind::Cooldown => (2, "cooldown"),
        StepKind::Run | StepKind::Interval | StepKind::Other | StepKind::Stair => (3, "interval"),
        StepKind::Recover => (4, "recovery"),
        StepKind::Rest => (5, "rest"),
        StepKind::Repeat => (6, "repeat"),
    }
}

fn sport_type(workout_type: WorkoutType) -> Value {
    match workout_type {
        WorkoutType::Running => json!({ "sportTypeId": 1, "sportTypeKey": "running" }),
    }
}

fn end_condition(duration: &Duration, payload: &mut serde_json::Map<String, Value>) {
    let (id, key, value, unit) = match duration {
        Duration::LapButton => (1, "lap.button", Value::Null, None),
        Duration::Timed { seconds } => (2, "time", json!(seconds), Some("second")),
        Duration::Distance { meters } => (3, "distance", json!(meters), Some("meter")),
    };

    payload.insert(
        "endCondition".to_string(),
        json!({ "conditionTypeId": id, "conditionTypeKey": key }),
    );
    payload.insert("endConditionValue".to_string(), value);
    if let Some(unit) = unit {
        payload.insert(
            "preferredEndConditionUnit".to_string(),
            json!({ "unitKey": unit }),
        );
    }
}

/// Speed in meters per second for a pace in seconds per kilometer.
fn speed_mps(sec_per_km: f64) -> f64 {
    1000.0 / sec_per_km
}

fn target(target: Option<&Target>, payload: &mut serde_json::Map<String, Value>) {
    match target {
        None => {
            payload.insert(
                "targetType".to_string(),
                json!({ "workoutTargetTypeId": 1, "workoutTargetTypeKey": "no.target" }),
            );
        }
        Some(Target::HeartRateZone { zone }) => {
            payload.insert(
                "targetType".to_string(),
                json!({ "workoutTargetTypeId": 4, "workoutTargetTypeKey": "heart.rate.zone" }),
            );
            payload.insert("zoneNumber".to_string(), json!(zone));
        }
        Some(Target::PaceRange {
            low_sec_per_km,
            high_sec_per_km,
        }) => {
            payload.insert(
                "targetType".to_string(),
                json!({ "workoutTargetTypeId": 6, "workoutTargetTypeKey": "pace.zone" }),
            );
            // Slower pace is the lower speed.
            payload.insert("targetValueOne".to_string(), json!(speed_mps(*high_sec_per_km)));
            payload.insert("targetValueTwo".to_string(), json!(speed_mps(*low_sec_per_km)));
        }
    }
}

/// Renders one step. `carried` holds notes of enclosing repeats, which the
/// platform's repeat groups cannot show; they lead the first executable
/// step's description.
fn step_payload(step: &Step, order: usize, carried: &[String]) -> Value {
    let (type_id, type_key) = step_type(step.kind);

    if step.is_repeat() {
        let mut group_notes = carried.to_vec();
        group_notes.extend(step.notes.iter().cloned());
        if !step.notes.is_empty() {
            debug!(
                "moving {} repeat note(s) onto the first step of the group",
                step.notes.len()
            );
        }

        let children: Vec<Value> = step
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let inherited: &[String] = if i == 0 { &group_notes } else { &[] };
                step_payload(child, i, inherited)
            })
            .collect();

        return json!({
            "type": "RepeatGroupDTO",
            "stepId": null,
            "stepOrder": order,
            "childStepId": null,
            "numberOfIterations": step.repeat_count,
            "stepType": { "stepTypeId": type_id, "stepTypeKey": type_key },
            "workoutSteps": children,
        });
    }

    let notes: Vec<&str> = carried
        .iter()
        .chain(step.notes.iter())
        .map(String::as_str)
        .collect();
    let description = (!notes.is_empty()).then(|| notes.join("\n"));

    let mut payload = serde_json::Map::new();
    payload.insert("type".to_string(), json!("ExecutableStepDTO"));
    payload.insert("stepId".to_string(), Value::Null);
    payload.insert("stepOrder".to_string(), json!(order));
    payload.insert("childStepId".to_string(), Value::Null);
    payload.insert("description".to_string(), json!(description));
    payload.insert(
        "stepType".to_string(),
        json!({ "stepTypeId": type_id, "stepTypeKey": type_key }),
    );

    if let Some(duration) = &step.duration {
        end_condition(duration, &mut payload);
    }
    target(step.target.as_ref(), &mut payload);

    Value::Object(payload)
}

/// Builds the workout-creation payload for the remote platform.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use planparse::config::ParserConfig;
/// use planparse::export::workout_payload;
/// use planparse::workout::parse_workout_text;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let workout = parse_workout_text("running: Easy\n- run: 30:00 @z1", date, &ParserConfig::default()).unwrap();
/// let payload = workout_payload(&workout);
///
/// assert_eq!(payload["workoutName"], "Easy");
/// assert_eq!(payload["workoutSegments"][0]["workoutSteps"][0]["zoneNumber"], 1);
/// ```
pub fn workout_payload(workout: &Workout) -> Value {
    let steps: Vec<Value> = workout
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| step_payload(step, i, &[]))
        .collect();

    let sport = sport_type(workout.workout_type);

    json!({
        "sportType": sport.clone(),
        "workoutName": workout.name,
        "description": null,
        "workoutSegments": [{
            "segmentOrder": 1,
            "sportType": sport,
            "workoutSteps": steps,
        }],
    })
}
