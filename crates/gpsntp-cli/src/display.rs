use gpsntp_core::ViewState;

/// Shown for any value that has never been received.
pub const UNKNOWN: &str = "—";

// The firmware reports 0 for counters it has not filled yet, so a zero
// uptime, RSSI, free memory, altitude or GPS age renders as `UNKNOWN`.

pub fn uptime(view: &ViewState) -> String {
    view.status
        .as_ref()
        .map(|status| status.uptime_seconds)
        .filter(|secs| *secs > 0)
        .map(|secs| format!("{}h {}m", secs / 3600, (secs % 3600) / 60))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn rssi(view: &ViewState) -> String {
    view.status
        .as_ref()
        .and_then(|status| status.wifi_rssi)
        .filter(|dbm| *dbm != 0)
        .map(|dbm| format!("{dbm} dBm"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn link(view: &ViewState) -> &'static str {
    if view.status.as_ref().is_some_and(|status| status.wifi_connected) {
        "Online"
    } else {
        "Offline"
    }
}

pub fn local_ip(view: &ViewState) -> String {
    view.status
        .as_ref()
        .and_then(|status| status.local_ip.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn gateway(view: &ViewState) -> String {
    view.status
        .as_ref()
        .and_then(|status| status.gateway.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn free_memory(view: &ViewState) -> String {
    view.status
        .as_ref()
        .map(|status| status.free_memory_bytes)
        .filter(|bytes| *bytes > 0)
        .map(|bytes| format!("{} KB", (bytes as f64 / 1024.0).round() as u64))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn lock(view: &ViewState) -> &'static str {
    if view.gps.as_ref().is_some_and(|gps| gps.locked) {
        "Locked"
    } else {
        "Searching"
    }
}

pub fn satellites(view: &ViewState) -> String {
    view.gps
        .as_ref()
        .and_then(|gps| gps.satellite_count)
        .map(|count| count.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn coordinate(value: Option<f64>) -> String {
    value
        .map(|deg| format!("{deg:.6}"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn latitude(view: &ViewState) -> String {
    coordinate(view.gps.as_ref().and_then(|gps| gps.latitude))
}

pub fn longitude(view: &ViewState) -> String {
    coordinate(view.gps.as_ref().and_then(|gps| gps.longitude))
}

pub fn altitude(view: &ViewState) -> String {
    view.gps
        .as_ref()
        .and_then(|gps| gps.altitude)
        .filter(|meters| *meters != 0.0)
        .map(|meters| format!("{meters:.1} m"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn last_gps_update(view: &ViewState) -> String {
    view.gps
        .as_ref()
        .and_then(|gps| gps.last_update_seconds)
        .filter(|secs| *secs > 0)
        .map(|secs| format!("{secs}s"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// 24h wall clock of the displayed time, UTC.
pub fn clock(view: &ViewState) -> String {
    view.displayed_time()
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn date(view: &ViewState) -> String {
    view.displayed_time()
        .map(|time| time.format("%b %-d, %Y, %H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn gps_synced(view: &ViewState) -> bool {
    view.gps.as_ref().is_some_and(|gps| gps.gps_locked)
}

pub fn time_source(view: &ViewState) -> &'static str {
    if gps_synced(view) {
        "GPS"
    } else {
        "Syncing..."
    }
}

pub fn synced(view: &ViewState) -> &'static str {
    if gps_synced(view) {
        "Yes"
    } else {
        "No"
    }
}

pub fn ntp_requests(view: &ViewState) -> String {
    let count = view.ntp.as_ref().map(|ntp| ntp.request_count).unwrap_or(0);
    format!("{count} req")
}

pub fn socket(view: &ViewState) -> &'static str {
    view.connection.as_str()
}
