use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{DataService, IdentityService, Query, ServiceError};
use crate::time_utils::{add_days, format_date, parse_date, today_local};
use crate::types::{Identity, Importance, Recurrence, Session};

pub const DEV_USER_ID: &str = "dev-user";

type Tables = HashMap<String, Vec<Value>>;

/// In-memory stand-in for both the identity provider and the data service.
#[derive(Debug, Clone)]
pub struct DevBackend {
    tables: Arc<Mutex<Tables>>,
    next_id: Arc<AtomicU64>,
    reject_writes: Arc<AtomicBool>,
    user: Identity,
}

impl Default for DevBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl DevBackend {
    /// Backend seeded with a handful of habits and chores.
    pub fn new() -> Self {
        let today = today_local();
        let backend = Self::empty()
            .with_activity("Meditate", Importance::High, 7)
            .with_activity("Read", Importance::Medium, 5)
            .with_activity("Reflect", Importance::Low, 3)
            .with_activity("Run", Importance::Critical, 4)
            .with_activity("Stretch", Importance::Low, 7)
            .with_maintenance_task("Haircut", Recurrence::Monthly, None, add_days(today, -3))
            .with_maintenance_task("Water plants", Recurrence::CustomDays, Some(3), today)
            .with_maintenance_task("Renew passport", Recurrence::Once, None, add_days(today, 40))
            .with_score(72.0);

        let ids = backend.activity_ids();
        match ids.as_slice() {
            [meditate, read, _, run, ..] => backend
                .with_streak(read, 4)
                .with_streak(run, 12)
                .with_inactive_streak(meditate),
            _ => backend,
        }
    }

    pub fn empty() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            reject_writes: Arc::new(AtomicBool::new(false)),
            user: Identity {
                id: DEV_USER_ID.to_string(),
                email: Some("dev@localhost".to_string()),
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_id(&self, collection: &str) -> String {
        let n = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        format!("dev-{}-{}", collection, n)
    }

    fn push(&self, collection: &str, mut row: Value) -> Value {
        if let Some(obj) = row.as_object_mut() {
            if !obj.contains_key("id") {
                obj.insert("id".to_string(), Value::String(self.next_id(collection)));
            }
            if matches!(collection, "activities" | "maintenance_tasks") {
                obj.entry("is_archived").or_insert(Value::Bool(false));
            }
        }
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    pub fn with_activity(self, name: &str, importance: Importance, target_frequency: u8) -> Self {
        self.push(
            "activities",
            json!({
                "user_id": DEV_USER_ID,
                "name": name,
                "description": null,
                "importance": importance,
                "target_frequency": target_frequency,
            }),
        );
        self
    }

    pub fn with_streak(self, activity_id: &str, current_count: u32) -> Self {
        self.push(
            "streaks",
            json!({
                "activity_id": activity_id,
                "current_count": current_count,
                "status": "active",
            }),
        );
        self
    }

    pub fn with_inactive_streak(self, activity_id: &str) -> Self {
        self.push(
            "streaks",
            json!({ "activity_id": activity_id, "current_count": 0, "status": "inactive" }),
        );
        self
    }

    pub fn with_maintenance_task(
        self,
        name: &str,
        recurrence: Recurrence,
        recurrence_interval: Option<u32>,
        next_due: time::Date,
    ) -> Self {
        self.push(
            "maintenance_tasks",
            json!({
                "user_id": DEV_USER_ID,
                "name": name,
                "recurrence": recurrence,
                "recurrence_interval": recurrence_interval,
                "next_due_date": format_date(next_due),
                "last_completed_at": null,
            }),
        );
        self
    }

    pub fn with_score(self, score: f64) -> Self {
        self.push(
            "profiles",
            json!({ "id": DEV_USER_ID, "consistency_score": score }),
        );
        self
    }

    /// Ids of all activities, in insertion order.
    pub fn activity_ids(&self) -> Vec<String> {
        self.rows("activities")
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    /// Make every write fail as if the service denied it.
    #[cfg(test)]
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, AtomicOrdering::SeqCst);
    }

    fn check_writable(&self, operation: &str) -> Result<(), ServiceError> {
        if self.reject_writes.load(AtomicOrdering::SeqCst) {
            return Err(ServiceError::Rejected {
                operation: operation.to_string(),
                status: 403,
                message: "row-level security policy violation".to_string(),
            });
        }
        Ok(())
    }

    fn complete_task(&self, task_id: &str) -> Result<Value, ServiceError> {
        let today = today_local();
        let mut tables = self.lock();
        let task = tables
            .get_mut("maintenance_tasks")
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(task_id)))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ServiceError::NotFound {
                collection: "maintenance_tasks".to_string(),
                id: task_id.to_string(),
            })?;

        let recurrence: Recurrence = task
            .get("recurrence")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let interval = task
            .get("recurrence_interval")
            .and_then(Value::as_i64)
            .unwrap_or(7)
            .max(1);

        task.insert(
            "last_completed_at".to_string(),
            Value::String(format_date(today)),
        );
        let step = match recurrence {
            Recurrence::Once => None,
            Recurrence::Daily => Some(1),
            Recurrence::Weekly => Some(7),
            Recurrence::Monthly => Some(30),
            Recurrence::CustomDays => Some(interval),
        };
        match step {
            Some(days) => {
                task.insert(
                    "next_due_date".to_string(),
                    Value::String(format_date(add_days(today, days))),
                );
            }
            None => {
                task.insert("is_archived".to_string(), Value::Bool(true));
            }
        }

        Ok(json!({ "ok": true }))
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// Compare a stored value with a filter operand the way the REST dialect does.
fn value_matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        None | Some(Value::Null) => expected == "null",
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
    }
}

/// Case-insensitive text order, falling back to byte order for ties.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => collate(x, y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn project(row: &Value, columns: &str) -> Value {
    let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
    if wanted.contains(&"*") {
        return row.clone();
    }
    let mut out = Map::new();
    for column in wanted {
        if let Some(value) = row.get(column) {
            out.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

#[async_trait]
impl DataService for DevBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ServiceError> {
        let mut rows: Vec<Value> = self
            .rows(&query.collection)
            .into_iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(field, expected)| value_matches(row.get(field), expected))
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| compare_field(a, b, &order.field));
        }

        Ok(match &query.columns {
            Some(columns) => rows.iter().map(|row| project(row, columns)).collect(),
            None => rows,
        })
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, ServiceError> {
        self.check_writable(&format!("POST {}", collection))?;

        if collection == "logs" {
            let duplicate = self.rows("logs").iter().any(|row| {
                row.get("activity_id") == record.get("activity_id")
                    && row.get("log_date") == record.get("log_date")
            });
            if duplicate {
                return Err(ServiceError::Rejected {
                    operation: "POST logs".to_string(),
                    status: 409,
                    message: "duplicate key value violates unique constraint".to_string(),
                });
            }
        }

        Ok(self.push(collection, record))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), ServiceError> {
        self.check_writable(&format!("PATCH {}", collection))?;

        let mut tables = self.lock();
        let row = tables
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id)))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ServiceError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let Value::Object(fields) = patch {
            for (key, value) in fields {
                row.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        self.check_writable(&format!("DELETE {}", collection))?;

        let mut tables = self.lock();
        let rows = tables.entry(collection.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        // Like a filtered REST delete, matching nothing is still a success.
        if rows.len() == before {
            return Ok(());
        }

        // Cascade like the foreign keys on the hosted schema.
        if collection == "activities" {
            for dependent in ["logs", "streaks"] {
                if let Some(rows) = tables.get_mut(dependent) {
                    rows.retain(|row| row.get("activity_id").and_then(Value::as_str) != Some(id));
                }
            }
        }
        Ok(())
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, ServiceError> {
        match function {
            "maintenance-complete" => {
                self.check_writable("POST function maintenance-complete")?;
                let task_id = body
                    .get("task_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ServiceError::Rejected {
                        operation: "POST function maintenance-complete".to_string(),
                        status: 400,
                        message: "task_id is required".to_string(),
                    })?;
                self.complete_task(task_id)
            }
            other => Err(ServiceError::Rejected {
                operation: format!("POST function {}", other),
                status: 404,
                message: "function not found".to_string(),
            }),
        }
    }
}

#[async_trait]
impl IdentityService for DevBackend {
    async fn current_user(&self) -> Result<Option<Identity>, ServiceError> {
        Ok(Some(self.user.clone()))
    }

    async fn refresh_session(&self) -> Result<Option<Session>, ServiceError> {
        Ok(None)
    }

    fn session(&self) -> Option<Session> {
        Some(Session {
            access_token: "dev-token".to_string(),
            refresh_token: None,
            expires_in: None,
            user: self.user.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> DevBackend {
        DevBackend::empty()
            .with_activity("Run", Importance::High, 3)
            .with_activity("Read", Importance::Low, 7)
            .with_activity("Reflect", Importance::Medium, 5)
    }

    fn names(rows: &[Value]) -> Vec<&str> {
        rows.iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .collect()
    }

    #[tokio::test]
    async fn select_filters_and_orders_rows() {
        let dev = backend();
        let rows = dev
            .select(&Query::new("activities").eq("is_archived", false).order_by("name"))
            .await
            .expect("select");
        assert_eq!(names(&rows), vec!["Read", "Reflect", "Run"]);

        let none = dev
            .select(&Query::new("activities").eq("is_archived", true))
            .await
            .expect("select");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn select_projects_requested_columns() {
        let dev = backend();
        let rows = dev
            .select(&Query::new("activities").columns("id,name"))
            .await
            .expect("select");
        let keys: Vec<&String> = rows[0].as_object().expect("object").keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn log_insert_enforces_one_row_per_activity_and_day() {
        let dev = backend();
        let record = json!({ "user_id": DEV_USER_ID, "activity_id": "a", "log_date": "2025-03-07" });
        let stored = dev.insert("logs", record.clone()).await.expect("insert");
        assert!(stored.get("id").is_some());

        let err = dev.insert("logs", record).await.expect_err("duplicate");
        assert!(matches!(err, ServiceError::Rejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn deleting_an_activity_cascades_to_logs_and_streaks() {
        let dev = backend();
        let id = dev.activity_ids()[0].clone();
        let dev = dev.with_streak(&id, 3);
        dev.insert(
            "logs",
            json!({ "activity_id": id, "log_date": "2025-03-07", "user_id": DEV_USER_ID }),
        )
        .await
        .expect("insert");

        dev.delete("activities", &id).await.expect("delete");
        assert!(dev.rows("logs").is_empty());
        assert!(dev.rows("streaks").is_empty());
        assert_eq!(dev.rows("activities").len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_missing_row_is_a_no_op() {
        let dev = backend();
        dev.delete("logs", "nope").await.expect("missing row");
        dev.delete("activities", "nope").await.expect("missing row");
        assert_eq!(dev.rows("activities").len(), 3);
    }

    #[tokio::test]
    async fn text_ordering_ignores_case() {
        let dev = DevBackend::empty()
            .with_activity("Zebra crossing", Importance::Low, 1)
            .with_activity("apple a day", Importance::Low, 1)
            .with_activity("Meditate", Importance::Low, 1);
        let rows = dev
            .select(&Query::new("activities").order_by("name"))
            .await
            .expect("select");
        assert_eq!(names(&rows), vec!["apple a day", "Meditate", "Zebra crossing"]);
        assert_eq!(collate("abc", "ABC"), Ordering::Greater);
    }

    #[tokio::test]
    async fn update_merges_patch_fields() {
        let dev = backend();
        let id = dev.activity_ids()[0].clone();
        dev.update("activities", &id, json!({ "target_frequency": 2 }))
            .await
            .expect("update");
        let row = dev
            .rows("activities")
            .into_iter()
            .find(|row| row_id(row) == Some(id.as_str()))
            .expect("row");
        assert_eq!(row["target_frequency"], json!(2));
        assert_eq!(row["name"], json!("Run"));
    }

    #[tokio::test]
    async fn completing_a_task_advances_its_due_date() {
        let today = today_local();
        let dev = DevBackend::empty()
            .with_maintenance_task("Water plants", Recurrence::CustomDays, Some(3), today)
            .with_maintenance_task("Passport", Recurrence::Once, None, today);
        let rows = dev.rows("maintenance_tasks");
        let plants = row_id(&rows[0]).expect("id").to_string();
        let passport = row_id(&rows[1]).expect("id").to_string();

        dev.invoke("maintenance-complete", json!({ "task_id": plants }))
            .await
            .expect("complete");
        dev.invoke("maintenance-complete", json!({ "task_id": passport }))
            .await
            .expect("complete");

        let rows = dev.rows("maintenance_tasks");
        let due = rows[0]["next_due_date"].as_str().and_then(parse_date);
        assert_eq!(due, Some(add_days(today, 3)));
        assert_eq!(rows[1]["is_archived"], json!(true));
    }

    #[tokio::test]
    async fn rejected_writes_leave_rows_untouched() {
        let dev = backend();
        dev.set_reject_writes(true);
        let err = dev
            .insert("logs", json!({ "activity_id": "a", "log_date": "d" }))
            .await
            .expect_err("rejected");
        assert!(matches!(err, ServiceError::Rejected { status: 403, .. }));
        assert!(dev.rows("logs").is_empty());
    }

    #[test]
    fn seeded_backend_has_demo_data() {
        let dev = DevBackend::new();
        assert_eq!(dev.activity_ids().len(), 5);
        assert_eq!(dev.rows("streaks").len(), 3);
        assert_eq!(dev.rows("maintenance_tasks").len(), 3);
    }
}
