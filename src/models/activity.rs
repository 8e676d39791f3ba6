// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity identity and metadata as listed by the query source.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque activity identifier assigned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of fitness activity.
///
/// Kinds the store knows but this crate does not (golf, yoga, ...) all
/// deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Walking,
    Running,
    Hiking,
    Cycling,
    Swimming,
    #[serde(other)]
    Other,
}

impl ActivityKind {
    /// Kinds the listing stage queries for.
    pub const SUPPORTED: [ActivityKind; 5] = [
        ActivityKind::Walking,
        ActivityKind::Running,
        ActivityKind::Hiking,
        ActivityKind::Cycling,
        ActivityKind::Swimming,
    ];

    /// Human-readable label, e.g. "Cycling".
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Walking => "Walking",
            ActivityKind::Running => "Running",
            ActivityKind::Hiking => "Hiking",
            ActivityKind::Cycling => "Cycling",
            ActivityKind::Swimming => "Swimming",
            ActivityKind::Other => "Other",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded fitness session. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Store identifier
    pub id: ActivityId,
    /// Activity kind (walking, running, ...)
    pub kind: ActivityKind,
    /// Session start
    pub start: DateTime<Utc>,
    /// Session end
    pub end: DateTime<Utc>,
    /// Recording device product name (e.g. "Watch6,2")
    #[serde(default)]
    pub source_device: Option<String>,
    /// Total distance in meters, if the store recorded one
    #[serde(default)]
    pub distance_meters: Option<f64>,
}

impl ActivityRecord {
    pub fn new(
        id: impl Into<ActivityId>,
        kind: ActivityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            start,
            end,
            source_device: None,
            distance_meters: None,
        }
    }

    /// Elapsed time between start and end; never negative.
    pub fn duration(&self) -> Duration {
        (self.end - self.start).max(Duration::zero())
    }
}

impl From<String> for ActivityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
