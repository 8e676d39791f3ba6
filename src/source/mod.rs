// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Query source boundary.
//!
//! The pipeline never talks to a store directly; every assembler is handed
//! a `QuerySource` so a deterministic double can stand in for the real one.

pub mod memory;

pub use memory::{MemorySource, StoreError, StoreSnapshot, StoredActivity, StoredSegment};

use crate::error::SourceError;
use crate::models::{ActivityKind, ActivityRecord, HeartRateSample, RoutePage, RouteSegment};
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

/// Single-shot query result.
pub type SourceFuture<T> = BoxFuture<'static, Result<T, SourceError>>;

/// Multi-shot page delivery for one route segment. A well-behaved source
/// ends each stream with exactly one page whose `is_final` is set, or with
/// an error.
pub type PageStream = BoxStream<'static, Result<RoutePage, SourceError>>;

/// External telemetry store.
///
/// Returned futures and streams are `'static` so assemblers can drive them
/// on spawned tasks.
pub trait QuerySource: Send + Sync + 'static {
    /// List activities whose kind is one of `kinds`.
    fn list_activities(&self, kinds: &[ActivityKind]) -> SourceFuture<Vec<ActivityRecord>>;

    /// List the route segments backing an activity's route.
    fn list_route_segments(&self, activity: &ActivityRecord) -> SourceFuture<Vec<RouteSegment>>;

    /// Stream the location pages of one segment.
    fn query_route_pages(&self, segment: &RouteSegment) -> PageStream;

    /// Heart rate samples within the activity's time window, ascending.
    fn list_heart_rate(&self, activity: &ActivityRecord) -> SourceFuture<Vec<HeartRateSample>>;
}
