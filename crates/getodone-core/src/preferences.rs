//! User preferences: how often to nudge, in which tone, with which model.
//!
//! A single record per installation, replaced wholesale on every save.
//! Field names and enum literals match the persisted settings blob.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{StoreError, ValidationError};

pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Time of day used by [`FrequencyMode::OneShotAtTime`] when none is set (10:00).
pub fn fallback_time() -> WallClockTime {
    WallClockTime(NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyMode {
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "3-per-day")]
    ThreePerDay,
    #[serde(rename = "daily")]
    Daily,
    /// A single nudge shortly after saving.
    #[serde(rename = "1-min", alias = "5-mins")]
    OneShotSoon,
    /// A single nudge at the next occurrence of `custom_time`.
    #[serde(rename = "custom")]
    OneShotAtTime,
}

impl FrequencyMode {
    pub fn is_one_shot(self) -> bool {
        matches!(self, Self::OneShotSoon | Self::OneShotAtTime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::ThreePerDay => "3-per-day",
            Self::Daily => "daily",
            Self::OneShotSoon => "1-min",
            Self::OneShotAtTime => "custom",
        }
    }
}

impl fmt::Display for FrequencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencyMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "3-per-day" | "three-per-day" => Ok(Self::ThreePerDay),
            "daily" => Ok(Self::Daily),
            "1-min" | "5-mins" | "soon" => Ok(Self::OneShotSoon),
            "custom" | "at-time" => Ok(Self::OneShotAtTime),
            other => Err(ValidationError::InvalidValue {
                field: "frequency".into(),
                message: format!(
                    "'{other}' is not one of hourly, 3-per-day, daily, 1-min, custom"
                ),
            }),
        }
    }
}

/// Message style requested from the text-generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Soft,
    Hard,
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Soft, Tone::Hard, Tone::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            "neutral" => Ok(Self::Neutral),
            other => Err(ValidationError::InvalidValue {
                field: "tone".into(),
                message: format!("'{other}' is not one of soft, hard, neutral"),
            }),
        }
    }
}

/// Wall-clock `HH:MM`, 24h, no date or zone attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallClockTime(NaiveTime);

impl WallClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for WallClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl Serialize for WallClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The persisted settings record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "notificationFrequency")]
    pub frequency_mode: FrequencyMode,
    #[serde(
        rename = "customNotificationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_time: Option<WallClockTime>,
    #[serde(rename = "aiTone")]
    pub tone: Tone,
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
    #[serde(rename = "model", default)]
    pub model_id: String,
    #[serde(rename = "notificationsEnabled", default)]
    pub notifications_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            frequency_mode: FrequencyMode::Daily,
            custom_time: None,
            tone: Tone::Neutral,
            api_key: String::new(),
            model_id: DEFAULT_MODEL.to_string(),
            notifications_enabled: false,
        }
    }
}

impl Preferences {
    /// True when both the API key and the model id are set.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.model_id.is_empty()
    }

    /// The configured time of day, or [`fallback_time`].
    pub fn effective_custom_time(&self) -> WallClockTime {
        self.custom_time.unwrap_or_else(fallback_time)
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("frequency_mode", &self.frequency_mode)
            .field("custom_time", &self.custom_time)
            .field("tone", &self.tone)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("model_id", &self.model_id)
            .field("notifications_enabled", &self.notifications_enabled)
            .finish()
    }
}

/// Single-record preference storage.
pub trait PreferenceStore: Send + Sync {
    /// `None` until the first save.
    fn get_preferences(&self) -> Result<Option<Preferences>, StoreError>;

    fn set_preferences(&self, prefs: &Preferences) -> Result<(), StoreError>;
}
