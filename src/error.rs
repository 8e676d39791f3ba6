// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for query sources and the assembly pipeline.

use crate::models::ActivityId;

/// Failure reported by a query source for a single query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("Query source unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed source data: {0}")]
    Decode(String),
}

/// Terminal failure of one fan-out in the assembly pipeline.
///
/// Failures stay local to the smallest enclosing fan-out: a segment failure
/// fails its route, a route failure fails its activity, and an activity
/// failure is recorded in the batch next to its successful siblings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("Listing route segments for activity {activity_id} failed: {source}")]
    SegmentListingFailed {
        activity_id: ActivityId,
        source: SourceError,
    },

    #[error("Route page query for segment {segment_id} of activity {activity_id} failed: {source}")]
    PageQueryFailed {
        activity_id: ActivityId,
        segment_id: String,
        source: SourceError,
    },

    #[error("Heart rate query for activity {activity_id} failed: {source}")]
    HeartRateQueryFailed {
        activity_id: ActivityId,
        source: SourceError,
    },

    #[error("Listing activities failed: {0}")]
    ActivityListingFailed(SourceError),

    #[error("Activity {0} has no route data")]
    NoRouteData(ActivityId),

    #[error("Assembly interrupted: {0}")]
    Interrupted(String),
}

impl AssemblyError {
    /// Activity this failure belongs to, if it is scoped to one.
    pub fn activity_id(&self) -> Option<&ActivityId> {
        match self {
            AssemblyError::SegmentListingFailed { activity_id, .. }
            | AssemblyError::PageQueryFailed { activity_id, .. }
            | AssemblyError::HeartRateQueryFailed { activity_id, .. }
            | AssemblyError::NoRouteData(activity_id) => Some(activity_id),
            AssemblyError::ActivityListingFailed(_) | AssemblyError::Interrupted(_) => None,
        }
    }

    /// Short machine-readable tag, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AssemblyError::SegmentListingFailed { .. } => "segment_listing_failed",
            AssemblyError::PageQueryFailed { .. } => "page_query_failed",
            AssemblyError::HeartRateQueryFailed { .. } => "heart_rate_query_failed",
            AssemblyError::ActivityListingFailed(_) => "activity_listing_failed",
            AssemblyError::NoRouteData(_) => "no_route_data",
            AssemblyError::Interrupted(_) => "interrupted",
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AssemblyError>;
