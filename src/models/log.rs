use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub exercise: String,
    pub weight: f64,
    pub reps: i32,
    pub sets: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub date: NaiveDate,
    pub exercises: Vec<WorkoutLog>,
}

/// Normalized create payload, produced by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutLog {
    pub date: NaiveDate,
    pub exercise: String,
    pub weight: f64,
    pub reps: i32,
    pub sets: i32,
}

/// Normalized partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutLogUpdate {
    pub exercise: Option<String>,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub sets: Option<i32>,
}
