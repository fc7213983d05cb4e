use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use uuid::Uuid;

use super::{LogStore, StoreError};
use crate::models::log::{NewWorkoutLog, WorkoutLog, WorkoutLogUpdate, WorkoutSession};

/// SQLite-backed store. Dates and exercise names live in small catalog
/// tables (`workout`, `exercise`); each `exercise_log` row references both
/// by surrogate key.
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct LogRow {
    exercise: String,
    weight: f64,
    reps: i32,
    sets: i32,
}

#[derive(FromRow)]
struct SessionLogRow {
    workout_id: String,
    workout_date: NaiveDate,
    log_id: String,
    exercise: String,
    weight: f64,
    reps: i32,
    sets: i32,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection keeps every mutation serialized through SQLite, so
        // two concurrent creates for a date cannot both win the catalog
        // insert.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS workout (
                workout_id TEXT PRIMARY KEY,
                workout_date TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS exercise (
                exercise_id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS exercise_log (
                log_id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workout(workout_id),
                exercise_id TEXT NOT NULL REFERENCES exercise(exercise_id),
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                sets INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Insert-if-absent, then resolve the surrogate key by its natural key.
    async fn ensure_workout(
        tx: &mut Transaction<'_, Sqlite>,
        date: NaiveDate,
    ) -> Result<String, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO workout (workout_id, workout_date) VALUES (?1, ?2)")
            .bind(Uuid::new_v4().to_string())
            .bind(date)
            .execute(&mut **tx)
            .await?;

        let (workout_id,): (String,) =
            sqlx::query_as("SELECT workout_id FROM workout WHERE workout_date = ?1")
                .bind(date)
                .fetch_one(&mut **tx)
                .await?;
        Ok(workout_id)
    }

    async fn ensure_exercise(
        tx: &mut Transaction<'_, Sqlite>,
        name: &str,
    ) -> Result<String, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO exercise (exercise_id, name) VALUES (?1, ?2)")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .execute(&mut **tx)
            .await?;

        let (exercise_id,): (String,) =
            sqlx::query_as("SELECT exercise_id FROM exercise WHERE name = ?1")
                .bind(name)
                .fetch_one(&mut **tx)
                .await?;
        Ok(exercise_id)
    }
}

#[async_trait]
impl LogStore for SqliteStore {
    async fn list_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError> {
        let rows: Vec<SessionLogRow> = sqlx::query_as(
            "SELECT w.workout_id, w.workout_date, l.log_id, e.name AS exercise,
                    l.weight, l.reps, l.sets
             FROM workout w
             JOIN exercise_log l ON l.workout_id = w.workout_id
             JOIN exercise e ON e.exercise_id = l.exercise_id
             ORDER BY w.rowid, l.rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sessions: Vec<WorkoutSession> = Vec::new();
        for row in rows {
            let log = WorkoutLog {
                id: parse_id(&row.log_id)?,
                exercise: row.exercise,
                weight: row.weight,
                reps: row.reps,
                sets: row.sets,
            };
            match sessions.last_mut() {
                Some(session) if session.date == row.workout_date => session.exercises.push(log),
                _ => sessions.push(WorkoutSession {
                    id: parse_id(&row.workout_id)?,
                    date: row.workout_date,
                    exercises: vec![log],
                }),
            }
        }
        Ok(sessions)
    }

    async fn create_log(&self, new_log: NewWorkoutLog) -> Result<WorkoutLog, StoreError> {
        // Catalog rows first, then the log row, all in one transaction so a
        // failed insert never leaves a workout without logs behind.
        let mut tx = self.pool.begin().await?;

        let workout_id = Self::ensure_workout(&mut tx, new_log.date).await?;
        let exercise_id = Self::ensure_exercise(&mut tx, &new_log.exercise).await?;

        let log_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO exercise_log (log_id, workout_id, exercise_id, weight, reps, sets)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(log_id.to_string())
        .bind(&workout_id)
        .bind(&exercise_id)
        .bind(new_log.weight)
        .bind(new_log.reps)
        .bind(new_log.sets)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WorkoutLog {
            id: log_id,
            exercise: new_log.exercise,
            weight: new_log.weight,
            reps: new_log.reps,
            sets: new_log.sets,
        })
    }

    async fn update_log(
        &self,
        id: Uuid,
        update: WorkoutLogUpdate,
    ) -> Result<Option<WorkoutLog>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<LogRow> = sqlx::query_as(
            "SELECT e.name AS exercise, l.weight, l.reps, l.sets
             FROM exercise_log l
             JOIN exercise e ON e.exercise_id = l.exercise_id
             WHERE l.log_id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let exercise = update.exercise.unwrap_or(row.exercise);
        let weight = update.weight.unwrap_or(row.weight);
        let reps = update.reps.unwrap_or(row.reps);
        let sets = update.sets.unwrap_or(row.sets);

        // A renamed exercise may need a fresh catalog row.
        let exercise_id = Self::ensure_exercise(&mut tx, &exercise).await?;
        sqlx::query(
            "UPDATE exercise_log
             SET exercise_id = ?1, weight = ?2, reps = ?3, sets = ?4
             WHERE log_id = ?5",
        )
        .bind(&exercise_id)
        .bind(weight)
        .bind(reps)
        .bind(sets)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(WorkoutLog {
            id,
            exercise,
            weight,
            reps,
            sets,
        }))
    }

    async fn remove_log(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT workout_id FROM exercise_log WHERE log_id = ?1")
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await?;

        let workout_id = match row {
            Some((workout_id,)) => workout_id,
            None => return Ok(false),
        };

        sqlx::query("DELETE FROM exercise_log WHERE log_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM exercise_log WHERE workout_id = ?1")
                .bind(&workout_id)
                .fetch_one(&mut *tx)
                .await?;
        if remaining == 0 {
            sqlx::query("DELETE FROM workout WHERE workout_id = ?1")
                .bind(&workout_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::Corrupt(format!("invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    fn new_log(date: &str, exercise: &str) -> NewWorkoutLog {
        NewWorkoutLog {
            date: date.parse().unwrap(),
            exercise: exercise.to_string(),
            weight: 100.0,
            reps: 5,
            sets: 3,
        }
    }

    async fn count(store: &SqliteStore, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn creates_share_a_workout_row_per_date() {
        let store = test_store().await;
        store.create_log(new_log("2024-01-01", "Squat")).await.unwrap();
        store.create_log(new_log("2024-01-01", "Bench")).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exercises.len(), 2);
        assert_eq!(sessions[0].exercises[0].exercise, "Squat");
        assert_eq!(sessions[0].exercises[1].exercise, "Bench");
        assert_eq!(count(&store, "workout").await, 1);
    }

    #[tokio::test]
    async fn exercise_catalog_deduplicates_by_name() {
        let store = test_store().await;
        store.create_log(new_log("2024-01-01", "Squat")).await.unwrap();
        store.create_log(new_log("2024-01-02", "Squat")).await.unwrap();

        assert_eq!(count(&store, "exercise").await, 1);
        assert_eq!(count(&store, "exercise_log").await, 2);
    }

    #[tokio::test]
    async fn removing_the_last_log_removes_the_workout_row() {
        let store = test_store().await;
        let first = store.create_log(new_log("2024-01-01", "Squat")).await.unwrap();
        let second = store.create_log(new_log("2024-01-01", "Bench")).await.unwrap();

        assert!(store.remove_log(first.id).await.unwrap());
        assert_eq!(count(&store, "workout").await, 1);

        assert!(store.remove_log(second.id).await.unwrap());
        assert_eq!(count(&store, "workout").await, 0);
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_persists_only_the_supplied_fields() {
        let store = test_store().await;
        let created = store.create_log(new_log("2024-01-01", "Squat")).await.unwrap();

        let update = WorkoutLogUpdate {
            exercise: Some("Front Squat".to_string()),
            weight: Some(80.0),
            ..Default::default()
        };
        let updated = store.update_log(created.id, update).await.unwrap().unwrap();
        assert_eq!(updated.exercise, "Front Squat");
        assert_eq!(updated.weight, 80.0);
        assert_eq!(updated.reps, 5);

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions[0].exercises[0].exercise, "Front Squat");
        assert_eq!(sessions[0].exercises[0].weight, 80.0);
    }

    #[tokio::test]
    async fn unknown_ids_report_not_found() {
        let store = test_store().await;
        store.create_log(new_log("2024-01-01", "Squat")).await.unwrap();

        assert!(!store.remove_log(Uuid::new_v4()).await.unwrap());
        let result = store
            .update_log(Uuid::new_v4(), WorkoutLogUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(count(&store, "exercise_log").await, 1);
    }

    #[tokio::test]
    async fn sessions_list_in_creation_order() {
        let store = test_store().await;
        store.create_log(new_log("2024-02-01", "Squat")).await.unwrap();
        store.create_log(new_log("2024-01-15", "Bench")).await.unwrap();
        store.create_log(new_log("2024-02-01", "Deadlift")).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].date, "2024-02-01".parse().unwrap());
        assert_eq!(sessions[1].date, "2024-01-15".parse().unwrap());
    }
}
