use chrono::{DateTime, Local, NaiveDate};
use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::models::log::{NewWorkoutLog, WorkoutLogUpdate};

const REQUIRED_FIELDS: [&str; 5] = ["date", "exercise", "weight", "reps", "sets"];
const MUTABLE_FIELDS: [&str; 4] = ["exercise", "weight", "reps", "sets"];

/// Validates a create payload and normalizes it into a `NewWorkoutLog`.
///
/// Checks run in a fixed order (missing fields, then the date, then the
/// value fields) so a payload with several problems always reports the same
/// single reason.
pub fn validate_new_log(payload: &Value) -> Result<NewWorkoutLog, ValidationError> {
    let empty = Map::new();
    let body = payload.as_object().unwrap_or(&empty);

    for field in REQUIRED_FIELDS {
        if !is_present(body, field) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let date = match body.get("date") {
        Some(Value::String(raw)) => parse_log_date(raw)?,
        _ => return Err(ValidationError::InvalidDate),
    };

    let exercise = exercise_name(&body["exercise"])?;
    let weight = weight_value(&body["weight"])?;
    let reps = count_value(&body["reps"], "reps")?;
    let sets = count_value(&body["sets"], "sets")?;

    Ok(NewWorkoutLog {
        date,
        exercise,
        weight,
        reps,
        sets,
    })
}

/// Validates a partial update payload. The unknown-field check runs last,
/// so a bad value in a known field wins over a stray key.
pub fn validate_log_update(payload: &Value) -> Result<WorkoutLogUpdate, ValidationError> {
    let empty = Map::new();
    let body = payload.as_object().unwrap_or(&empty);

    if body.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let mut update = WorkoutLogUpdate::default();
    if let Some(value) = body.get("exercise") {
        update.exercise = Some(exercise_name(value)?);
    }
    if let Some(value) = body.get("weight") {
        update.weight = Some(weight_value(value)?);
    }
    if let Some(value) = body.get("reps") {
        update.reps = Some(count_value(value, "reps")?);
    }
    if let Some(value) = body.get("sets") {
        update.sets = Some(count_value(value, "sets")?);
    }

    // `date` is immutable after creation, so it is not in the mutable set.
    for key in body.keys() {
        if !MUTABLE_FIELDS.contains(&key.as_str()) {
            return Err(ValidationError::UnknownField(key.clone()));
        }
    }

    Ok(update)
}

fn is_present(body: &Map<String, Value>, field: &str) -> bool {
    match body.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) if field == "date" || field == "exercise" => !s.is_empty(),
        Some(_) => true,
    }
}

// Accepts plain dates and RFC 3339 timestamps. Only the calendar day is
// compared, so entries dated today pass regardless of the clock.
fn parse_log_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::InvalidDate)?;

    if date > Local::now().date_naive() {
        return Err(ValidationError::InvalidDate);
    }
    Ok(date)
}

fn exercise_name(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::InvalidType("exercise")),
    }
}

fn weight_value(value: &Value) -> Result<f64, ValidationError> {
    let weight = value
        .as_f64()
        .ok_or(ValidationError::InvalidType("weight"))?;
    // Zero is allowed so body-weight exercises can be logged.
    if weight < 0.0 {
        return Err(ValidationError::InvalidRange("weight"));
    }
    Ok(weight)
}

fn count_value(value: &Value, field: &'static str) -> Result<i32, ValidationError> {
    let count = value.as_f64().ok_or(ValidationError::InvalidType(field))?;
    if count <= 0.0 || count.fract() != 0.0 || count > i32::MAX as f64 {
        return Err(ValidationError::InvalidRange(field));
    }
    Ok(count as i32)
}
