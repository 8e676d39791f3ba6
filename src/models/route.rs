// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Route segments as stored by the source, and the assembled route.

use crate::models::{ActivityId, ActivityKind, LocationSample};
use geo::{BoundingRect, Coord, LineString, Rect};
use serde::{Deserialize, Serialize};

/// Handle to one independently paginated sub-series of an activity's route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Store identifier of the segment
    pub id: String,
    /// Activity the segment belongs to
    pub activity_id: ActivityId,
}

impl RouteSegment {
    pub fn new(id: impl Into<String>, activity_id: ActivityId) -> Self {
        Self {
            id: id.into(),
            activity_id,
        }
    }
}

/// One delivery from a segment's page query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePage {
    pub samples: Vec<LocationSample>,
    /// True on the last page of the segment
    pub is_final: bool,
}

impl RoutePage {
    pub fn new(samples: Vec<LocationSample>, is_final: bool) -> Self {
        Self { samples, is_final }
    }
}

/// An activity's complete route, ordered by ascending timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledRoute {
    pub kind: ActivityKind,
    samples: Vec<LocationSample>,
}

impl AssembledRoute {
    /// Build a route from a single series of samples.
    ///
    /// The sort is stable, so samples sharing a timestamp keep their input
    /// order. Samples gathered from concurrent deliveries go through
    /// `from_keyed` instead.
    pub fn from_unsorted(kind: ActivityKind, mut samples: Vec<LocationSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { kind, samples }
    }

    /// Build a route from samples tagged with where they were delivered.
    ///
    /// Ties on timestamp are broken by key, so the result does not depend on
    /// the order deliveries happened to arrive in.
    pub fn from_keyed<K: Ord>(kind: ActivityKind, mut samples: Vec<(K, LocationSample)>) -> Self {
        samples.sort_by(|(ka, a), (kb, b)| a.timestamp.cmp(&b.timestamp).then_with(|| ka.cmp(kb)));
        Self {
            kind,
            samples: samples.into_iter().map(|(_, s)| s).collect(),
        }
    }

    pub fn empty(kind: ActivityKind) -> Self {
        Self {
            kind,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[LocationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Route as a line string (x = longitude, y = latitude).
    pub fn line_string(&self) -> LineString<f64> {
        self.samples
            .iter()
            .map(|s| Coord {
                x: s.longitude,
                y: s.latitude,
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Bounding box of the route, `None` when there are no samples.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.line_string().bounding_rect()
    }

    /// Whether the route covers any ground at all.
    ///
    /// A route with no samples, or whose samples all sit on one point, has
    /// zero extent. That is still valid data; renderers may skip it.
    pub fn has_extent(&self) -> bool {
        self.bounds()
            .is_some_and(|rect| rect.width() > 0.0 || rect.height() > 0.0)
    }

    /// Encoded polyline (precision 5) for map surfaces.
    pub fn encoded_polyline(&self) -> Result<String, String> {
        polyline::encode_coordinates(self.line_string(), 5).map_err(|e| e.to_string())
    }
}
