use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{LogStore, StoreError};
use crate::models::log::{NewWorkoutLog, WorkoutLog, WorkoutLogUpdate, WorkoutSession};

/// In-memory store. Data lives for the process lifetime only; the lock
/// serializes mutations so two creates for one date cannot race into two
/// sessions.
pub struct MemoryStore {
    sessions: Mutex<Vec<WorkoutSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn list_sessions(&self) -> Result<Vec<WorkoutSession>, StoreError> {
        Ok(self.sessions.lock().await.clone())
    }

    async fn create_log(&self, new_log: NewWorkoutLog) -> Result<WorkoutLog, StoreError> {
        let mut sessions = self.sessions.lock().await;

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            exercise: new_log.exercise,
            weight: new_log.weight,
            reps: new_log.reps,
            sets: new_log.sets,
        };

        match sessions.iter_mut().find(|s| s.date == new_log.date) {
            Some(session) => session.exercises.push(log.clone()),
            None => sessions.push(WorkoutSession {
                id: Uuid::new_v4(),
                date: new_log.date,
                exercises: vec![log.clone()],
            }),
        }

        Ok(log)
    }

    async fn update_log(
        &self,
        id: Uuid,
        update: WorkoutLogUpdate,
    ) -> Result<Option<WorkoutLog>, StoreError> {
        let mut sessions = self.sessions.lock().await;

        for session in sessions.iter_mut() {
            if let Some(log) = session.exercises.iter_mut().find(|l| l.id == id) {
                if let Some(exercise) = update.exercise {
                    log.exercise = exercise;
                }
                if let Some(weight) = update.weight {
                    log.weight = weight;
                }
                if let Some(reps) = update.reps {
                    log.reps = reps;
                }
                if let Some(sets) = update.sets {
                    log.sets = sets;
                }
                return Ok(Some(log.clone()));
            }
        }

        Ok(None)
    }

    async fn remove_log(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().await;

        for idx in 0..sessions.len() {
            if let Some(pos) = sessions[idx].exercises.iter().position(|l| l.id == id) {
                sessions[idx].exercises.remove(pos);
                if sessions[idx].exercises.is_empty() {
                    // Last log gone, the session goes with it.
                    sessions.remove(idx);
                }
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_log(date: NaiveDate, exercise: &str) -> NewWorkoutLog {
        NewWorkoutLog {
            date,
            exercise: exercise.to_string(),
            weight: 100.0,
            reps: 5,
            sets: 3,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn creates_group_into_one_session_per_date() {
        let store = MemoryStore::new();
        store.create_log(new_log(date("2024-01-01"), "Squat")).await.unwrap();
        store.create_log(new_log(date("2024-01-01"), "Bench")).await.unwrap();
        store.create_log(new_log(date("2024-01-02"), "Deadlift")).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].date, date("2024-01-01"));
        assert_eq!(sessions[0].exercises.len(), 2);
        assert_eq!(sessions[0].exercises[0].exercise, "Squat");
        assert_eq!(sessions[0].exercises[1].exercise, "Bench");
        assert_eq!(sessions[1].date, date("2024-01-02"));
    }

    #[tokio::test]
    async fn removing_the_last_log_removes_the_session() {
        let store = MemoryStore::new();
        let first = store.create_log(new_log(date("2024-01-01"), "Squat")).await.unwrap();
        let second = store.create_log(new_log(date("2024-01-01"), "Bench")).await.unwrap();

        assert!(store.remove_log(first.id).await.unwrap());
        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exercises.len(), 1);
        assert_eq!(sessions[0].exercises[0].exercise, "Bench");

        assert!(store.remove_log(second.id).await.unwrap());
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_only_the_supplied_fields() {
        let store = MemoryStore::new();
        let created = store.create_log(new_log(date("2024-01-01"), "Squat")).await.unwrap();

        let update = WorkoutLogUpdate {
            weight: Some(120.0),
            reps: Some(3),
            ..Default::default()
        };
        let updated = store.update_log(created.id, update).await.unwrap().unwrap();
        assert_eq!(updated.exercise, "Squat");
        assert_eq!(updated.weight, 120.0);
        assert_eq!(updated.reps, 3);
        assert_eq!(updated.sets, 3);
    }

    #[tokio::test]
    async fn unknown_ids_do_not_mutate_the_store() {
        let store = MemoryStore::new();
        store.create_log(new_log(date("2024-01-01"), "Squat")).await.unwrap();

        assert!(!store.remove_log(Uuid::new_v4()).await.unwrap());
        let result = store
            .update_log(Uuid::new_v4(), WorkoutLogUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exercises.len(), 1);
    }
}
