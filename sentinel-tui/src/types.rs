use serde::{Deserialize, Serialize};

pub const MIN_TARGET_FREQUENCY: u8 = 1;
pub const MAX_TARGET_FREQUENCY: u8 = 7;

/// How much a habit weighs in the consistency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn label(self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
            Importance::Critical => "critical",
        }
    }

    /// Next level up, saturating at `Critical`.
    pub fn raise(self) -> Self {
        match self {
            Importance::Low => Importance::Medium,
            Importance::Medium => Importance::High,
            Importance::High | Importance::Critical => Importance::Critical,
        }
    }

    /// Next level down, saturating at `Low`.
    pub fn lower(self) -> Self {
        match self {
            Importance::Critical => Importance::High,
            Importance::High => Importance::Medium,
            Importance::Medium | Importance::Low => Importance::Low,
        }
    }
}

/// A recurring habit as stored in the `activities` collection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default = "default_target_frequency")]
    pub target_frequency: u8,
}

pub fn default_target_frequency() -> u8 {
    MAX_TARGET_FREQUENCY
}

pub fn clamp_frequency(value: i32) -> u8 {
    value.clamp(MIN_TARGET_FREQUENCY as i32, MAX_TARGET_FREQUENCY as i32) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakStatus {
    #[default]
    Active,
    Inactive,
}

/// Externally computed run of consecutive completions for one activity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Streak {
    pub id: String,
    pub activity_id: String,
    #[serde(default)]
    pub current_count: u32,
    #[serde(default)]
    pub status: StreakStatus,
}

/// One completion of an activity on a calendar day.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Log {
    pub id: String,
    pub activity_id: String,
    #[serde(default)]
    pub log_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Once,
    Daily,
    #[default]
    Weekly,
    Monthly,
    CustomDays,
}

impl Recurrence {
    pub const ALL: [Recurrence; 5] = [
        Recurrence::Once,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::CustomDays,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Recurrence::Once => "once",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::CustomDays => "custom days",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1).min(Self::ALL.len() - 1)]
    }

    pub fn previous(self) -> Self {
        Self::ALL[self.position().saturating_sub(1)]
    }
}

/// A non-habit recurring chore (haircut, renewals, errands).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MaintenanceTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub next_due_date: Option<String>,
    #[serde(default)]
    pub last_completed_at: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub recurrence_interval: Option<u32>,
}

/// The signed-in user, as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by the identity provider after a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: Identity,
}
