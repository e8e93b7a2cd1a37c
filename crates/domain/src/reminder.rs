use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Display, str::FromStr};
use thiserror::Error;

/// The reminder options a user can pick for a `PushEvent`.
///
/// Short-lead kinds are scheduled as local notifications on the device and
/// are never delivered by the push scheduler. Only `OneDay` and `OneWeek`
/// go through the push gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderKind {
    #[serde(rename = "at_time")]
    AtTime,
    #[serde(rename = "15_minutes")]
    FifteenMinutes,
    #[serde(rename = "30_minutes")]
    ThirtyMinutes,
    #[serde(rename = "1_hour")]
    OneHour,
    #[serde(rename = "2_hours")]
    TwoHours,
    #[serde(rename = "1_day")]
    OneDay,
    #[serde(rename = "1_week")]
    OneWeek,
}

/// Template pool a `PushTemplate` belongs to. Only the long-lead kinds have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateType {
    #[serde(rename = "day_before")]
    DayBefore,
    #[serde(rename = "week_before")]
    WeekBefore,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayBefore => "day_before",
            Self::WeekBefore => "week_before",
        }
    }
}

impl FromStr for TemplateType {
    type Err = InvalidReminderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_before" => Ok(Self::DayBefore),
            "week_before" => Ok(Self::WeekBefore),
            other => Err(InvalidReminderKindError::Unknown(other.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidReminderKindError {
    #[error("Unknown reminder kind: {0}")]
    Unknown(String),
    #[error("Reminder disabled")]
    Disabled,
}

impl ReminderKind {
    pub const LONG_LEAD: [ReminderKind; 2] = [ReminderKind::OneDay, ReminderKind::OneWeek];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtTime => "at_time",
            Self::FifteenMinutes => "15_minutes",
            Self::ThirtyMinutes => "30_minutes",
            Self::OneHour => "1_hour",
            Self::TwoHours => "2_hours",
            Self::OneDay => "1_day",
            Self::OneWeek => "1_week",
        }
    }

    /// Whether the push scheduler is responsible for this kind
    pub fn is_long_lead(&self) -> bool {
        matches!(self, Self::OneDay | Self::OneWeek)
    }

    /// Key in `SentStatus` recording delivery of this kind
    pub fn sent_key(&self) -> String {
        format!("{}_sent", self.as_str())
    }

    /// Key used by the superseded boolean-flag scheme
    pub fn legacy_sent_key(&self) -> Option<&'static str> {
        match self {
            Self::OneDay => Some("day_before_sent"),
            Self::OneWeek => Some("week_before_sent"),
            _ => None,
        }
    }

    pub fn template_type(&self) -> Option<TemplateType> {
        match self {
            Self::OneDay => Some(TemplateType::DayBefore),
            Self::OneWeek => Some(TemplateType::WeekBefore),
            _ => None,
        }
    }

    /// Value stored in the `type` column of the push log
    pub fn log_type(&self) -> &'static str {
        self.template_type()
            .map(|t| t.as_str())
            .unwrap_or_else(|| self.as_str())
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = InvalidReminderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "at_time" => Ok(Self::AtTime),
            "15_minutes" => Ok(Self::FifteenMinutes),
            "30_minutes" => Ok(Self::ThirtyMinutes),
            "1_hour" => Ok(Self::OneHour),
            "2_hours" => Ok(Self::TwoHours),
            "1_day" => Ok(Self::OneDay),
            "1_week" => Ok(Self::OneWeek),
            "none" => Err(InvalidReminderKindError::Disabled),
            other => Err(InvalidReminderKindError::Unknown(other.to_string())),
        }
    }
}

/// Per-kind delivery flags of a `PushEvent` (the `push_status` column).
///
/// Values are kept as raw JSON so rows written by older clients with
/// unexpected shapes still load; only a literal `true` counts as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentStatus(BTreeMap<String, Value>);

impl SentStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    /// Either the new-scheme key or the legacy key suppresses a re-send
    pub fn is_sent(&self, kind: ReminderKind) -> bool {
        if self.flag(&kind.sent_key()) {
            return true;
        }
        match kind.legacy_sent_key() {
            Some(legacy_key) => self.flag(legacy_key),
            None => false,
        }
    }

    /// The flags to merge into `push_status` once `kind` has been delivered.
    /// The legacy key is mirrored so older readers agree.
    pub fn sent_patch(kind: ReminderKind) -> Self {
        let mut patch = Self::new();
        patch.0.insert(kind.sent_key(), Value::Bool(true));
        if let Some(legacy_key) = kind.legacy_sent_key() {
            patch.0.insert(legacy_key.to_string(), Value::Bool(true));
        }
        patch
    }

    pub fn merge(&mut self, patch: &SentStatus) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for SentStatus {
    fn from(flags: BTreeMap<String, Value>) -> Self {
        Self(flags)
    }
}
