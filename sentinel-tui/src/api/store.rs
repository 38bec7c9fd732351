use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use time::Date;

use super::dto::{
    ActivityPatch, CompleteTaskRequest, NewActivity, NewLogRequest, NewMaintenanceTask, ProfileDto,
};
use super::{DataService, Query, ServiceError};
use crate::time_utils::format_date;
use crate::types::{Activity, Log, MaintenanceTask, Streak};

const ACTIVITIES: &str = "activities";
const STREAKS: &str = "streaks";
const LOGS: &str = "logs";
const PROFILES: &str = "profiles";
const MAINTENANCE_TASKS: &str = "maintenance_tasks";
const COMPLETE_TASK_FUNCTION: &str = "maintenance-complete";

/// Typed access to the collections the tracker reads and writes.
#[derive(Clone)]
pub struct Store {
    service: Arc<dyn DataService>,
}

fn decode_rows<T: DeserializeOwned>(what: &str, rows: Vec<Value>) -> Result<Vec<T>, ServiceError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| ServiceError::decode(what, e)))
        .collect()
}

fn encode<T: Serialize>(what: &str, value: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::decode(what, e))
}

impl Store {
    pub fn new(service: Arc<dyn DataService>) -> Self {
        Self { service }
    }

    /// Non-archived activities, sorted by name.
    pub async fn activities(&self) -> Result<Vec<Activity>, ServiceError> {
        let query = Query::new(ACTIVITIES)
            .eq("is_archived", false)
            .order_by("name");
        decode_rows(ACTIVITIES, self.service.select(&query).await?)
    }

    pub async fn active_streaks(&self) -> Result<Vec<Streak>, ServiceError> {
        let query = Query::new(STREAKS).eq("status", "active");
        decode_rows(STREAKS, self.service.select(&query).await?)
    }

    pub async fn logs_on(&self, date: Date) -> Result<Vec<Log>, ServiceError> {
        let query = Query::new(LOGS)
            .columns("id,activity_id,log_date")
            .eq("log_date", format_date(date));
        decode_rows(LOGS, self.service.select(&query).await?)
    }

    /// `Ok(None)` when the profile row or its score is missing.
    pub async fn consistency_score(&self, user_id: &str) -> Result<Option<f64>, ServiceError> {
        let query = Query::new(PROFILES)
            .columns("consistency_score")
            .eq("id", user_id);
        let profiles: Vec<ProfileDto> = decode_rows(PROFILES, self.service.select(&query).await?)?;
        Ok(profiles.into_iter().next().and_then(|p| p.consistency_score))
    }

    pub async fn insert_log(
        &self,
        user_id: &str,
        activity_id: &str,
        date: Date,
    ) -> Result<Log, ServiceError> {
        let record = encode(
            LOGS,
            &NewLogRequest {
                user_id,
                activity_id,
                log_date: format_date(date),
            },
        )?;
        let row = self.service.insert(LOGS, record).await?;
        serde_json::from_value(row).map_err(|e| ServiceError::decode(LOGS, e))
    }

    pub async fn delete_log(&self, log_id: &str) -> Result<(), ServiceError> {
        self.service.delete(LOGS, log_id).await
    }

    pub async fn create_activity(&self, activity: &NewActivity) -> Result<Activity, ServiceError> {
        let row = self
            .service
            .insert(ACTIVITIES, encode(ACTIVITIES, activity)?)
            .await?;
        serde_json::from_value(row).map_err(|e| ServiceError::decode(ACTIVITIES, e))
    }

    pub async fn update_activity(
        &self,
        activity_id: &str,
        patch: &ActivityPatch,
    ) -> Result<(), ServiceError> {
        self.service
            .update(ACTIVITIES, activity_id, encode(ACTIVITIES, patch)?)
            .await
    }

    pub async fn delete_activity(&self, activity_id: &str) -> Result<(), ServiceError> {
        self.service.delete(ACTIVITIES, activity_id).await
    }

    /// Non-archived tasks by next due date, undated ones last.
    pub async fn maintenance_tasks(&self) -> Result<Vec<MaintenanceTask>, ServiceError> {
        let query = Query::new(MAINTENANCE_TASKS)
            .eq("is_archived", false)
            .order_by_nulls_last("next_due_date");
        decode_rows(MAINTENANCE_TASKS, self.service.select(&query).await?)
    }

    pub async fn create_maintenance_task(
        &self,
        task: &NewMaintenanceTask,
    ) -> Result<MaintenanceTask, ServiceError> {
        let row = self
            .service
            .insert(MAINTENANCE_TASKS, encode(MAINTENANCE_TASKS, task)?)
            .await?;
        serde_json::from_value(row).map_err(|e| ServiceError::decode(MAINTENANCE_TASKS, e))
    }

    /// Completion (and rescheduling) is computed remotely.
    pub async fn complete_maintenance_task(&self, task_id: &str) -> Result<(), ServiceError> {
        let body = encode(COMPLETE_TASK_FUNCTION, &CompleteTaskRequest { task_id })?;
        self.service.invoke(COMPLETE_TASK_FUNCTION, body).await?;
        Ok(())
    }
}
