//! Review API payloads: shape validation and status messages

use std::{fmt, str::FromStr};

use compact_str::CompactString;
use serde::Deserialize;
use serde_json::Value;

use crate::result::{BotError, Result};

pub const HOMEWORKS_KEY: &str = "homeworks";
pub const CURRENT_DATE_KEY: &str = "current_date";

/// Review status of a homework, keyed by the API status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    /// Every status the verdict table knows about
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Status code as sent by the API
    pub fn code(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Verdict text shown to the user
    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| BotError::unknown_status(Some(s)))
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One submission as returned by the API.
///
/// Both fields are optional here; the formatter decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub homework_name: Option<CompactString>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<CompactString>,
}

impl HomeworkRecord {
    pub fn new(name: impl Into<CompactString>, status: impl Into<CompactString>) -> Self {
        Self {
            homework_name: Some(name.into()),
            status: Some(status.into()),
        }
    }

    /// Reads the known fields from a raw entry; anything else maps to an empty record
    pub fn from_value(value: &Value) -> Self {
        HomeworkRecord::deserialize(value).unwrap_or_default()
    }
}

/// A response that passed shape validation
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Raw homework entries, most recent first
    pub homeworks: Vec<Value>,
    /// Server time to poll from next
    pub current_date: i64,
}

impl ApiResponse {
    /// The most recent homework, if any
    pub fn latest(&self) -> Option<HomeworkRecord> {
        self.homeworks.first().map(HomeworkRecord::from_value)
    }
}

/// Check that a decoded payload has the expected shape.
///
/// An empty `homeworks` list is valid and means nothing changed.
pub fn validate_response(response: Value) -> Result<ApiResponse> {
    let Value::Object(mut map) = response else {
        return Err(BotError::shape(format!(
            "ожидался словарь, получено: {}",
            type_name(&response)
        )));
    };

    let homeworks = match map.remove(HOMEWORKS_KEY) {
        None => return Err(BotError::missing_field(HOMEWORKS_KEY)),
        Some(Value::Array(homeworks)) => homeworks,
        Some(other) => {
            return Err(BotError::shape(format!(
                "значение {HOMEWORKS_KEY} не список, получено: {}",
                type_name(&other)
            )));
        },
    };

    let current_date = match map.get(CURRENT_DATE_KEY) {
        None => return Err(BotError::missing_field(CURRENT_DATE_KEY)),
        Some(value) => value.as_i64().ok_or_else(|| {
            BotError::shape(format!(
                "значение {CURRENT_DATE_KEY} не целое число, получено: {}",
                type_name(value)
            ))
        })?,
    };

    Ok(ApiResponse { homeworks, current_date })
}

/// Build the status change message for one homework
pub fn format_status(record: &HomeworkRecord) -> Result<String> {
    let name = record
        .homework_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BotError::missing_field("homework_name"))?;

    let status = match record.status.as_deref() {
        Some(code) if !code.is_empty() => code.parse::<HomeworkStatus>()?,
        _ => return Err(BotError::unknown_status(None)),
    };

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.verdict()
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// Non-string values are treated as absent so the formatter reports them
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<CompactString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s.into()),
        _ => None,
    })
}
