// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Time-series samples recorded during an activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic fix. Immutable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level
    #[serde(default)]
    pub elevation: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            timestamp,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// A heart rate reading in beats per minute. Immutable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub bpm: f64,
    pub timestamp: DateTime<Utc>,
}

impl HeartRateSample {
    pub fn new(bpm: f64, timestamp: DateTime<Utc>) -> Self {
        Self { bpm, timestamp }
    }
}
