//! Marker components and the record-to-marker conversion.
//!
//! A validated record becomes one ECS entity carrying its position, kind,
//! and display fields. The spawned `Entity` id doubles as the stable popup
//! key, so two same-named firms never share popup state.

use bevy::prelude::*;
use egui::Color32;

use crate::data::records::{or_not_specified, or_unknown, StartupRecord, VcRecord};
use crate::geo::GeoPoint;
use crate::layers::LayerId;

/// The two kinds of entity the map knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    VentureCapital,
    Startup,
}

impl EntityKind {
    /// Text inside the circular badge.
    pub fn badge_label(self) -> &'static str {
        match self {
            EntityKind::VentureCapital => "VC",
            EntityKind::Startup => "S",
        }
    }

    /// Layer a marker of this kind belongs to.
    pub fn layer(self) -> LayerId {
        match self {
            EntityKind::VentureCapital => LayerId::VentureCapitals,
            EntityKind::Startup => LayerId::Startups,
        }
    }

    /// Badge fill color; the VC blue matches the original page.
    pub fn badge_fill(self) -> Color32 {
        match self {
            EntityKind::VentureCapital => Color32::from_rgb(0x34, 0x98, 0xdb),
            EntityKind::Startup => Color32::from_rgb(0xe7, 0x4c, 0x3c),
        }
    }
}

/// Core marker component shared by both kinds.
#[derive(Component, Debug, Clone)]
pub struct MapMarker {
    pub name: String,
    pub kind: EntityKind,
    pub position: GeoPoint,
}

/// Popup content for a VC marker, funds included.
#[derive(Component, Debug, Clone)]
pub struct VcDetails {
    pub city: String,
    pub address: String,
    pub info: String,
    pub platform: String,
    pub use_cases: String,
    pub resources: String,
    pub funds: Vec<Fund>,
}

/// A fund as displayed in the popup, fully defaulted.
#[derive(Debug, Clone)]
pub struct Fund {
    pub name: String,
    pub date: String,
    pub size: String,
    pub focus: String,
}

/// Popup content for a startup marker.
#[derive(Component, Debug, Clone)]
pub struct StartupDetails {
    pub info: String,
    pub website: String,
}

/// Build the components for a VC record, or `None` when the record has no
/// usable coordinates.
pub fn vc_marker_bundle(record: VcRecord) -> Option<(MapMarker, VcDetails)> {
    let position = record.position()?;
    let marker = MapMarker {
        name: or_unknown(record.name),
        kind: EntityKind::VentureCapital,
        position,
    };
    let details = VcDetails {
        city: or_unknown(record.city),
        address: or_unknown(record.address),
        info: or_not_specified(record.info),
        platform: or_not_specified(record.platform),
        use_cases: or_not_specified(record.use_cases),
        resources: or_not_specified(record.resources),
        funds: record
            .funds
            .into_iter()
            .map(|fund| Fund {
                name: or_unknown(fund.name),
                date: or_not_specified(fund.date),
                size: or_not_specified(fund.size),
                focus: or_not_specified(fund.focus),
            })
            .collect(),
    };
    Some((marker, details))
}

/// Build the components for a startup record, or `None` without coordinates.
pub fn startup_marker_bundle(record: StartupRecord) -> Option<(MapMarker, StartupDetails)> {
    let position = record.position()?;
    let marker = MapMarker {
        name: or_unknown(record.name),
        kind: EntityKind::Startup,
        position,
    };
    let details = StartupDetails {
        info: or_not_specified(record.info),
        website: or_not_specified(record.website),
    };
    Some((marker, details))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vc_json(body: &str) -> VcRecord {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn valid_record_produces_marker() {
        let record = vc_json(r#"{ "Name": "Seaya", "Longitud": -3.70, "Latitud": 40.42 }"#);
        let (marker, details) = vc_marker_bundle(record).unwrap();
        assert_eq!(marker.kind, EntityKind::VentureCapital);
        assert_eq!(marker.position, GeoPoint::new(-3.70, 40.42));
        assert!(details.funds.is_empty());
        assert_eq!(details.city, "Unknown");
        assert_eq!(details.info, "Not specified");
    }

    #[test]
    fn non_numeric_latitude_produces_no_marker() {
        let record = vc_json(r#"{ "Name": "Bad", "Longitud": -3.70, "Latitud": "abc" }"#);
        assert!(vc_marker_bundle(record).is_none());
    }

    #[test]
    fn funds_are_defaulted_per_field() {
        let record = vc_json(
            r#"{ "Name": "Kfund", "Longitud": -3.70, "Latitud": 40.42,
                 "Fondos": [{ "Nombre": "Fund I" }] }"#,
        );
        let (_, details) = vc_marker_bundle(record).unwrap();
        assert_eq!(details.funds.len(), 1);
        assert_eq!(details.funds[0].name, "Fund I");
        assert_eq!(details.funds[0].size, "Not specified");
    }

    #[test]
    fn startup_marker_carries_kind_and_defaults() {
        let record: StartupRecord =
            serde_json::from_str(r#"{ "longitud": -3.71, "latitud": 40.40 }"#).unwrap();
        let (marker, details) = startup_marker_bundle(record).unwrap();
        assert_eq!(marker.kind, EntityKind::Startup);
        assert_eq!(marker.name, "Unknown");
        assert_eq!(details.website, "Not specified");
    }

    #[test]
    fn each_kind_maps_to_its_own_layer() {
        assert_eq!(EntityKind::VentureCapital.layer(), LayerId::VentureCapitals);
        assert_eq!(EntityKind::Startup.layer(), LayerId::Startups);
    }

    #[test]
    fn badge_styles_differ_by_kind() {
        assert_eq!(EntityKind::VentureCapital.badge_label(), "VC");
        assert_eq!(EntityKind::Startup.badge_label(), "S");
        assert_ne!(
            EntityKind::VentureCapital.badge_fill(),
            EntityKind::Startup.badge_fill()
        );
    }
}
