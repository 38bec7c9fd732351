//! Today's view of the tracker, loaded in one go and replaced wholesale.

use time::Date;

use crate::api::{ServiceError, Store};
use crate::types::{Activity, Log, Streak};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: Date,
    pub activities: Vec<Activity>,
    pub streaks: Vec<Streak>,
    pub logs: Vec<Log>,
    pub score: f64,
    /// Reads that failed and were replaced by an empty collection.
    pub failed_reads: Vec<&'static str>,
}

impl Snapshot {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            activities: Vec::new(),
            streaks: Vec::new(),
            logs: Vec::new(),
            score: 0.0,
            failed_reads: Vec::new(),
        }
    }

    pub fn is_logged(&self, activity_id: &str) -> bool {
        self.logs.iter().any(|log| log.activity_id == activity_id)
    }

    pub fn streak_for(&self, activity_id: &str) -> u32 {
        self.streaks
            .iter()
            .find(|streak| streak.activity_id == activity_id)
            .map(|streak| streak.current_count)
            .unwrap_or(0)
    }

    pub fn logged_count(&self) -> usize {
        self.logs.len()
    }

    /// Echo a log the service just accepted, until the next reload replaces it.
    pub fn record_log(&mut self, log: Log) {
        if !self.logs.iter().any(|l| l.id == log.id) {
            self.logs.push(log);
        }
    }

    pub fn forget_log(&mut self, log_id: &str) {
        self.logs.retain(|log| log.id != log_id);
    }
}

fn or_empty<T: Default>(
    read: &'static str,
    result: Result<T, ServiceError>,
    failed: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(read, error = %e, "snapshot read failed, using empty data");
            failed.push(read);
            T::default()
        }
    }
}

/// Issue the four reads concurrently and combine them positionally.
pub async fn load_snapshot(store: &Store, user_id: &str, today: Date) -> Snapshot {
    let (activities, streaks, logs, score) = tokio::join!(
        store.activities(),
        store.active_streaks(),
        store.logs_on(today),
        store.consistency_score(user_id),
    );

    let mut failed_reads = Vec::new();
    let snapshot = Snapshot {
        date: today,
        activities: or_empty("activities", activities, &mut failed_reads),
        streaks: or_empty("streaks", streaks, &mut failed_reads),
        logs: or_empty("logs", logs, &mut failed_reads),
        score: or_empty("score", score, &mut failed_reads).unwrap_or(0.0),
        failed_reads,
    };

    tracing::debug!(
        activities = snapshot.activities.len(),
        logs = snapshot.logs.len(),
        score = snapshot.score,
        "snapshot loaded"
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DataService, DevBackend, IdentityService, Query};
    use crate::types::Importance;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use time::macros::date;

    /// Serves activities but fails every other read.
    struct ActivitiesOnly(DevBackend);

    #[async_trait]
    impl DataService for ActivitiesOnly {
        async fn select(&self, query: &Query) -> Result<Vec<Value>, ServiceError> {
            if query.collection == "activities" {
                self.0.select(query).await
            } else {
                Err(ServiceError::transport("GET", "connection reset"))
            }
        }
        async fn insert(&self, c: &str, r: Value) -> Result<Value, ServiceError> {
            self.0.insert(c, r).await
        }
        async fn update(&self, c: &str, id: &str, p: Value) -> Result<(), ServiceError> {
            self.0.update(c, id, p).await
        }
        async fn delete(&self, c: &str, id: &str) -> Result<(), ServiceError> {
            self.0.delete(c, id).await
        }
        async fn invoke(&self, f: &str, b: Value) -> Result<Value, ServiceError> {
            self.0.invoke(f, b).await
        }
    }

    #[tokio::test]
    async fn combines_all_four_reads() {
        let dev = DevBackend::empty()
            .with_activity("Read", Importance::Low, 7)
            .with_score(81.0);
        let id = dev.activity_ids()[0].clone();
        let dev = dev.with_streak(&id, 5).with_inactive_streak("other");
        let store = Store::new(Arc::new(dev.clone()));
        let user = dev.current_user().await.expect("user").expect("signed in");
        store
            .insert_log(&user.id, &id, date!(2025 - 03 - 07))
            .await
            .expect("insert");

        let snapshot = load_snapshot(&store, &user.id, date!(2025 - 03 - 07)).await;

        assert_eq!(snapshot.activities.len(), 1);
        assert_eq!(snapshot.streaks.len(), 1, "only active streaks are read");
        assert_eq!(snapshot.streak_for(&id), 5);
        assert!(snapshot.is_logged(&id));
        assert_eq!(snapshot.score, 81.0);
        assert!(snapshot.failed_reads.is_empty());
    }

    #[tokio::test]
    async fn failed_reads_degrade_to_empty_collections() {
        let dev = DevBackend::empty().with_activity("Read", Importance::Low, 7);
        let store = Store::new(Arc::new(ActivitiesOnly(dev)));

        let snapshot = load_snapshot(&store, "u", date!(2025 - 03 - 07)).await;

        assert_eq!(snapshot.activities.len(), 1);
        assert!(snapshot.logs.is_empty());
        assert_eq!(snapshot.score, 0.0);
        assert_eq!(snapshot.failed_reads, vec!["streaks", "logs", "score"]);
    }

    #[test]
    fn record_log_ignores_repeats() {
        let mut snapshot = Snapshot::empty(date!(2025 - 03 - 07));
        let log = Log {
            id: "l1".to_string(),
            activity_id: "a1".to_string(),
            log_date: None,
        };
        snapshot.record_log(log.clone());
        snapshot.record_log(log);
        assert_eq!(snapshot.logged_count(), 1);
        snapshot.forget_log("l1");
        assert!(!snapshot.is_logged("a1"));
    }
}
