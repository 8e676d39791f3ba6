// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation hooks for map and list surfaces.
//!
//! Nothing here touches a UI toolkit; it turns assembled data into values a
//! map or list view can draw directly.

use crate::models::{ActivityKind, ActivityRecord, AssembledRoute};
use crate::services::ActivityGroup;
use crate::time_utils::{format_duration, format_medium};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;

/// One route prepared for a map overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverlay {
    pub kind: ActivityKind,
    /// Stroke color as `#RRGGBBAA`
    pub color: String,
    /// Encoded polyline, precision 5
    pub polyline: String,
    #[serde(skip)]
    route: AssembledRoute,
}

/// Stroke color for a kind, at 50% opacity.
pub fn kind_color(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Cycling => "#FF950080",
        ActivityKind::Hiking => "#34C75980",
        ActivityKind::Running => "#FF3B3080",
        ActivityKind::Swimming => "#007AFF80",
        ActivityKind::Walking => "#AF52DE80",
        ActivityKind::Other => "#8E8E9380",
    }
}

/// Overlays for every route that covers some ground. Routes with zero
/// extent (empty or a single repeated point) are skipped.
pub fn map_overlays(routes: &[AssembledRoute]) -> Vec<RouteOverlay> {
    routes
        .iter()
        .filter(|route| route.has_extent())
        .filter_map(|route| match route.encoded_polyline() {
            Ok(polyline) => Some(RouteOverlay {
                kind: route.kind,
                color: kind_color(route.kind).to_string(),
                polyline,
                route: route.clone(),
            }),
            Err(e) => {
                tracing::warn!(kind = %route.kind, error = %e, "Skipping route overlay");
                None
            }
        })
        .collect()
}

/// Render overlays as a GeoJSON FeatureCollection of LineStrings.
pub fn overlays_geojson(overlays: &[RouteOverlay]) -> FeatureCollection {
    let features = overlays
        .iter()
        .map(|overlay| {
            let mut properties = JsonObject::new();
            properties.insert("kind".to_string(), overlay.kind.label().into());
            properties.insert("color".to_string(), overlay.color.clone().into());
            properties.insert("points".to_string(), overlay.route.len().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(
                    &overlay.route.line_string(),
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// One row of the activity list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub duration: String,
    pub distance: Option<String>,
}

impl From<&ActivityRecord> for ListRow {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: format_medium(record.start),
            kind: record.kind.label().to_string(),
            duration: format_duration(record.duration()),
            distance: record
                .distance_meters
                .map(|m| format!("{:.2} km", m / 1000.0)),
        }
    }
}

/// A titled list section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// Convert grouped activities into list sections.
pub fn list_sections(groups: &[ActivityGroup]) -> Vec<ListSection> {
    groups
        .iter()
        .map(|group| ListSection {
            title: group.key.clone(),
            rows: group.activities.iter().map(ListRow::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationSample;
    use chrono::{Duration, TimeZone, Utc};

    fn route(kind: ActivityKind, coords: &[(f64, f64)]) -> AssembledRoute {
        let base = Utc.with_ymd_and_hms(2024, 7, 4, 6, 0, 0).unwrap();
        AssembledRoute::from_unsorted(
            kind,
            coords
                .iter()
                .enumerate()
                .map(|(i, (lat, lon))| {
                    LocationSample::new(*lat, *lon, base + Duration::seconds(i as i64))
                })
                .collect(),
        )
    }

    #[test]
    fn test_map_overlays_skip_zero_extent() {
        let routes = vec![
            route(ActivityKind::Running, &[(37.0, -122.0), (37.01, -122.01)]),
            route(ActivityKind::Swimming, &[(37.5, -122.5), (37.5, -122.5)]),
            AssembledRoute::empty(ActivityKind::Walking),
        ];

        let overlays = map_overlays(&routes);

        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].kind, ActivityKind::Running);
        assert_eq!(overlays[0].color, "#FF3B3080");
        assert!(!overlays[0].polyline.is_empty());
    }

    #[test]
    fn test_overlays_geojson() {
        let overlays = map_overlays(&[route(
            ActivityKind::Cycling,
            &[(37.0, -122.0), (37.1, -122.1), (37.2, -122.0)],
        )]);

        let collection = overlays_geojson(&overlays);
        assert_eq!(collection.features.len(), 1);

        let json = collection.to_string();
        assert!(json.contains("\"LineString\""));
        assert!(json.contains("\"kind\":\"Cycling\""));
    }

    #[test]
    fn test_list_row() {
        let start = Utc.with_ymd_and_hms(2024, 7, 4, 6, 0, 0).unwrap();
        let mut record = ActivityRecord::new(
            "w1",
            ActivityKind::Walking,
            start,
            start + Duration::seconds(2707),
        );
        record.distance_meters = Some(3210.0);

        let row = ListRow::from(&record);
        assert_eq!(row.date, "Jul 4, 2024 at 6:00 AM");
        assert_eq!(row.kind, "Walking");
        assert_eq!(row.duration, "45:07");
        assert_eq!(row.distance.as_deref(), Some("3.21 km"));
    }
}
