// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Consolidated activity: metadata, route and heart rate series.

use crate::models::{ActivityRecord, AssembledRoute, HeartRateSample};
use crate::time_utils::format_medium;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One fully assembled activity.
///
/// Only constructed once both the heart rate query and the route assembly
/// for the activity have completed, so neither series is ever observed
/// half-populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledActivity {
    record: ActivityRecord,
    route: AssembledRoute,
    heart_rate: Vec<HeartRateSample>,
}

impl AssembledActivity {
    /// Build from completed parts. Heart rate samples are ordered by
    /// timestamp regardless of the order they are passed in.
    pub fn new(
        record: ActivityRecord,
        route: AssembledRoute,
        mut heart_rate: Vec<HeartRateSample>,
    ) -> Self {
        heart_rate.sort_by_key(|s| s.timestamp);
        Self {
            record,
            route,
            heart_rate,
        }
    }

    pub fn record(&self) -> &ActivityRecord {
        &self.record
    }

    pub fn route(&self) -> &AssembledRoute {
        &self.route
    }

    pub fn heart_rate_samples(&self) -> &[HeartRateSample] {
        &self.heart_rate
    }

    /// Timestamp of the first route sample, or the record's start when the
    /// route is empty.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.route
            .samples()
            .first()
            .map(|s| s.timestamp)
            .unwrap_or(self.record.start)
    }

    /// Display name, e.g. "Running - Jan 15, 2024 at 10:30 AM".
    pub fn name(&self) -> String {
        format!("{} - {}", self.record.kind, self.formatted_date())
    }

    pub fn formatted_date(&self) -> String {
        format_medium(self.start_date())
    }

    pub fn duration(&self) -> Duration {
        self.record.duration()
    }

    /// Highest reading in bpm, truncated; 0 without samples.
    pub fn max_heart_rate(&self) -> u32 {
        self.heart_rate
            .iter()
            .map(|s| s.bpm)
            .fold(None, |max: Option<f64>, bpm| Some(max.map_or(bpm, |m| m.max(bpm))))
            .map_or(0, |max| max as u32)
    }

    /// Arithmetic mean in bpm truncated toward zero; 0 without samples.
    pub fn average_heart_rate(&self) -> u32 {
        if self.heart_rate.is_empty() {
            return 0;
        }
        let sum: f64 = self.heart_rate.iter().map(|s| s.bpm).sum();
        (sum / self.heart_rate.len() as f64) as u32
    }

    pub fn formatted_max_heart_rate(&self) -> String {
        format!("{} bpm", self.max_heart_rate())
    }

    pub fn formatted_average_heart_rate(&self) -> String {
        format!("{} bpm", self.average_heart_rate())
    }

    /// Latest heart rate reading taken at or before `at`.
    pub fn heart_rate_at(&self, at: DateTime<Utc>) -> Option<f64> {
        let idx = self.heart_rate.partition_point(|s| s.timestamp <= at);
        idx.checked_sub(1).map(|i| self.heart_rate[i].bpm)
    }
}
