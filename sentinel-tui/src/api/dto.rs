use serde::{Deserialize, Serialize};

use crate::types::{Importance, Recurrence};

#[derive(Serialize)]
pub struct NewLogRequest<'a> {
    pub user_id: &'a str,
    pub activity_id: &'a str,
    pub log_date: String,
}

/// Every editable field of an activity. `description: None` is sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPatch {
    pub name: String,
    pub description: Option<String>,
    pub importance: Importance,
    pub target_frequency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewActivity {
    pub user_id: String,
    pub name: String,
    pub importance: Importance,
    pub target_frequency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMaintenanceTask {
    pub user_id: String,
    pub name: String,
    pub recurrence: Recurrence,
    pub recurrence_interval: Option<u32>,
    pub next_due_date: String,
}

#[derive(Serialize)]
pub struct CompleteTaskRequest<'a> {
    pub task_id: &'a str,
}

#[derive(Deserialize)]
pub struct ProfileDto {
    #[serde(default)]
    pub consistency_score: Option<f64>,
}

#[derive(Serialize)]
pub struct OtpRequest<'a> {
    pub email: &'a str,
    pub create_user: bool,
}

#[derive(Serialize)]
pub struct VerifyOtpRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub email: &'a str,
    pub token: &'a str,
}

#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}
