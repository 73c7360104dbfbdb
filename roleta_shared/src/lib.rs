use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One active lot as shown to overlays.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub color: String,
    pub amount: f64,
}

/// Outbound overlay events. The `type` tag and the field names are the wire
/// contract consumed by overlay pages; renaming them breaks existing scenes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BroadcastEvent {
    Spin {
        angle: f64,
        duration: f64,
        winner: String,
    },
    ParticipantsChanged {
        participants: Vec<Participant>,
    },
}

/// Selection format of the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFormat {
    #[default]
    Normal,
    Dropout,
    BattleRoyal,
}

/// Which elimination algorithm runs when `SelectionFormat::Dropout` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DropoutVariant {
    #[default]
    Classic,
    Simulated,
}

/// Externally persisted wheel configuration. The engine reads it; the host
/// application owns storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelSettings {
    #[serde(default)]
    pub format: SelectionFormat,
    #[serde(default)]
    pub dropout_variant: DropoutVariant,
    #[serde(default = "default_spin_time")]
    pub spin_time_secs: u64,
    /// Maximum share of the wheel one rendered wedge may take; larger lots
    /// get split into interleaved sub-wedges. `None` disables splitting.
    #[serde(default)]
    pub split: Option<f64>,
    /// Draw a fresh ease curve per spin instead of the standard one.
    #[serde(default)]
    pub random_curve_enabled: bool,
    #[serde(default)]
    pub broadcast_enabled: bool,
}

fn default_spin_time() -> u64 {
    20
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            format: SelectionFormat::Normal,
            dropout_variant: DropoutVariant::Classic,
            spin_time_secs: default_spin_time(),
            split: None,
            random_curve_enabled: false,
            broadcast_enabled: false,
        }
    }
}

/// One draw from the verifiable randomness service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeedResponse {
    pub seed: f64,
    pub nonce: u64,
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RotateSeedRequest {
    pub new_seed: String,
}

/// Persisted spin-log row.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinLogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub winner: String,
    pub angle: f64,
    pub duration: f64,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;
