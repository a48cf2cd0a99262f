use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current-conditions payload returned by the weather provider for one query.
///
/// Mirrors the WeatherAPI `current.json` response shape. Transient: only the
/// fields that survive into an [`Observation`] are kept across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub location: LocationInfo,
    pub current: CurrentConditions,
}

/// Location identity as reported by the provider.
///
/// `name` is the canonical city name and is authoritative: cached
/// observations are keyed by it, not by the raw search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f32,
    pub condition: Condition,
    pub humidity: i32,
    pub uv: f32,
    #[serde(rename = "feelslike_c")]
    pub feels_like_c: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Partial icon URL as served by the provider (e.g. `//cdn...`).
    pub icon: String,
}

/// Persisted last-known weather for one location key.
///
/// At most one row exists per `location_key`; a new write for the same key
/// fully replaces the old row. Rows are never deleted and carry no TTL —
/// staleness is surfaced to the user, not enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location_key: String,
    pub temperature_c: f32,
    pub feels_like_c: f32,
    pub humidity_pct: i32,
    pub uv_index: f32,
    pub condition_text: String,
    pub condition_icon: String,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    /// Build an observation from a provider snapshot, stamped with the
    /// current time. The canonical location name becomes the key.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            location_key: snapshot.location.name.clone(),
            temperature_c: snapshot.current.temp_c,
            feels_like_c: snapshot.current.feels_like_c,
            humidity_pct: snapshot.current.humidity,
            uv_index: snapshot.current.uv,
            condition_text: snapshot.current.condition.text.clone(),
            condition_icon: snapshot.current.condition.icon.clone(),
            observed_at: Utc::now(),
        }
    }

    /// Convert back to snapshot form for display.
    ///
    /// Lossy: region, country, coordinates and local time were not persisted
    /// and come back empty/zero.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            location: LocationInfo {
                name: self.location_key,
                region: String::new(),
                country: String::new(),
                lat: 0.0,
                lon: 0.0,
                localtime: String::new(),
            },
            current: CurrentConditions {
                temp_c: self.temperature_c,
                condition: Condition {
                    text: self.condition_text,
                    icon: self.condition_icon,
                },
                humidity: self.humidity_pct,
                uv: self.uv_index,
                feels_like_c: self.feels_like_c,
            },
        }
    }
}
