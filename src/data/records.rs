//! Serde models for the static JSON documents.
//!
//! Every display field is optional and defaulted field-by-field; the only
//! thing a record must carry to be rendered is a usable coordinate pair.
//! Coordinates are kept as raw JSON values so a malformed value drops the
//! single record instead of failing the whole document.

use serde::Deserialize;
use serde_json::Value;

use crate::geo::GeoPoint;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_SPECIFIED: &str = "Not specified";

/// One entry of `venture_capitals.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct VcRecord {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Ciudad", default)]
    pub city: Option<String>,
    #[serde(rename = "Direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "Longitud", default)]
    pub longitude: Value,
    #[serde(rename = "Latitud", default)]
    pub latitude: Value,
    #[serde(rename = "Info", default)]
    pub info: Option<String>,
    #[serde(rename = "Platform", default)]
    pub platform: Option<String>,
    #[serde(rename = "Use_Cases", default)]
    pub use_cases: Option<String>,
    #[serde(rename = "Resources", default)]
    pub resources: Option<String>,
    #[serde(rename = "Fondos", default)]
    pub funds: Vec<FundRecord>,
}

/// A fund owned by a single VC record. No identity of its own.
#[derive(Debug, Clone, Deserialize)]
pub struct FundRecord {
    #[serde(rename = "Nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "Fecha", default)]
    pub date: Option<String>,
    #[serde(rename = "Tamaño", default)]
    pub size: Option<String>,
    #[serde(rename = "Enfoque", default)]
    pub focus: Option<String>,
}

/// One entry of `startups.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupRecord {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub longitud: Value,
    #[serde(default)]
    pub latitud: Value,
    #[serde(rename = "Info", default)]
    pub info: Option<String>,
    #[serde(rename = "Website", default)]
    pub website: Option<String>,
}

/// One entry of `connections.json`: a VC position linked to a startup
/// position, both as `[lon, lat]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionRecord {
    pub vc: [f64; 2],
    pub startup: [f64; 2],
}

impl ConnectionRecord {
    pub fn vc_point(&self) -> GeoPoint {
        GeoPoint::new(self.vc[0], self.vc[1])
    }

    pub fn startup_point(&self) -> GeoPoint {
        GeoPoint::new(self.startup[0], self.startup[1])
    }
}

impl VcRecord {
    /// Usable position, or `None` when either coordinate is absent or
    /// non-numeric. Records without one are skipped, never an error.
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(
            coordinate(&self.longitude)?,
            coordinate(&self.latitude)?,
        ))
    }
}

impl StartupRecord {
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(
            coordinate(&self.longitud)?,
            coordinate(&self.latitud)?,
        ))
    }
}

/// Read a coordinate from a raw JSON value. Numbers pass through;
/// numeric strings are accepted the way the original page's loose
/// coercion did; everything else is rejected.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Fallback for identity-ish fields (name, city, address).
pub fn or_unknown(value: Option<String>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Fallback for descriptive fields.
pub fn or_not_specified(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}
