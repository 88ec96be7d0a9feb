use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /api/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(rename = "uptime", default)]
    pub uptime_seconds: u64,
    #[serde(rename = "wifiConnected", default)]
    pub wifi_connected: bool,
    #[serde(rename = "wifiRSSI", default)]
    pub wifi_rssi: Option<i32>,
    #[serde(rename = "localIP", default)]
    pub local_ip: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(rename = "freeMem", default)]
    pub free_memory_bytes: u64,
    #[serde(rename = "gpsLocked", default)]
    pub gps_locked: Option<bool>,
}

/// `GET /api/gps`
///
/// `locked` is the fix state shown on the lock card; `gps_locked` is the
/// separate flag used as the time-source indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSnapshot {
    #[serde(default)]
    pub locked: bool,
    #[serde(rename = "gpsLocked", default)]
    pub gps_locked: bool,
    #[serde(rename = "satellites", default)]
    pub satellite_count: Option<u32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(rename = "lastUpdate", default)]
    pub last_update_seconds: Option<u64>,
}

/// `GET /api/ntp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NtpSnapshot {
    #[serde(rename = "requests", default)]
    pub request_count: u64,
    #[serde(rename = "currentTime", default)]
    pub current_time_epoch: Option<i64>,
    #[serde(default)]
    pub synchronized: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTimeSample {
    pub epoch: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One producer emission, applied by the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Status(StatusSnapshot),
    Gps(GpsSnapshot),
    Ntp(NtpSnapshot),
    LiveTime(LiveTimeSample),
    Connection(ConnectionState),
}

/// Latest known value of every input. Each field is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub status: Option<StatusSnapshot>,
    pub gps: Option<GpsSnapshot>,
    pub ntp: Option<NtpSnapshot>,
    pub live_time: Option<LiveTimeSample>,
    pub connection: ConnectionState,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: None,
            gps: None,
            ntp: None,
            live_time: None,
            connection: ConnectionState::Disconnected,
        }
    }
}

impl ViewState {
    /// The pushed sample wins; the polled NTP clock is the fallback.
    pub fn displayed_epoch(&self) -> Option<i64> {
        self.live_time
            .map(|sample| sample.epoch)
            .or_else(|| self.ntp.as_ref().and_then(|ntp| ntp.current_time_epoch))
    }

    pub fn displayed_time(&self) -> Option<DateTime<Utc>> {
        self.displayed_epoch()
            .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
    }
}
