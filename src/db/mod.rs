pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::log::{NewWorkoutLog, WorkoutLog, WorkoutLogUpdate, WorkoutSession};

/// Storage backend for workout logs and their per-date sessions.
///
/// Implementations must keep exactly one session per distinct date and drop
/// a session the moment its last log is removed.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Every session with its nested logs, in creation order.
    async fn list_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError>;

    /// Appends a log to the session for its date, creating the session if
    /// this is the first log on that date.
    async fn create_log(&self, new_log: NewWorkoutLog) -> Result<WorkoutLog, StoreError>;

    /// Replaces only the supplied fields. `None` when no log matches the id.
    async fn update_log(
        &self,
        id: Uuid,
        update: WorkoutLogUpdate,
    ) -> Result<Option<WorkoutLog>, StoreError>;

    /// Removes a log by id. `false` when no log matches.
    async fn remove_log(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Backend(sqlx::Error),
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(err) => write!(f, "database error: {}", err),
            StoreError::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err)
    }
}
