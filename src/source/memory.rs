// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-backed query source.
//!
//! Serves a snapshot of the store exported to disk. Route segments are cut
//! into pages of a fixed size so consumers see the same multi-page delivery
//! a live store produces.

use crate::error::SourceError;
use crate::models::{
    ActivityId, ActivityKind, ActivityRecord, HeartRateSample, LocationSample, RoutePage,
    RouteSegment,
};
use crate::source::{PageStream, QuerySource, SourceFuture};
use futures_util::{stream, FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// On-disk store layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub activities: Vec<StoredActivity>,
}

/// One activity with its facets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredActivity {
    #[serde(flatten)]
    pub record: ActivityRecord,
    #[serde(default)]
    pub route_segments: Vec<StoredSegment>,
    #[serde(default)]
    pub heart_rate: Vec<HeartRateSample>,
}

/// One route segment with its location samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSegment {
    pub id: String,
    #[serde(default)]
    pub samples: Vec<LocationSample>,
}

struct StoreInner {
    activities: Vec<StoredActivity>,
    /// Activity id -> index into `activities`
    by_id: HashMap<ActivityId, usize>,
    /// Segment id -> (activity index, segment index)
    segments: HashMap<String, (usize, usize)>,
}

/// In-memory query source over a `StoreSnapshot`.
#[derive(Clone)]
pub struct MemorySource {
    inner: Arc<StoreInner>,
    page_size: usize,
}

impl MemorySource {
    /// Load a snapshot from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self, StoreError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| StoreError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data, page_size)
    }

    /// Load a snapshot from a JSON string.
    pub fn load_from_json(json_data: &str, page_size: usize) -> Result<Self, StoreError> {
        let snapshot: StoreSnapshot =
            serde_json::from_str(json_data).map_err(|e| StoreError::ParseError(e.to_string()))?;
        Self::from_snapshot(snapshot, page_size)
    }

    pub fn from_snapshot(snapshot: StoreSnapshot, page_size: usize) -> Result<Self, StoreError> {
        if page_size == 0 {
            return Err(StoreError::InvalidPageSize);
        }

        let mut by_id = HashMap::new();
        let mut segments = HashMap::new();

        for (a_idx, activity) in snapshot.activities.iter().enumerate() {
            if by_id.insert(activity.record.id.clone(), a_idx).is_some() {
                return Err(StoreError::DuplicateId(activity.record.id.to_string()));
            }
            for (s_idx, segment) in activity.route_segments.iter().enumerate() {
                if segments.insert(segment.id.clone(), (a_idx, s_idx)).is_some() {
                    return Err(StoreError::DuplicateId(segment.id.clone()));
                }
            }
        }

        tracing::info!(
            activities = snapshot.activities.len(),
            segments = segments.len(),
            page_size,
            "Loaded workout store"
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                activities: snapshot.activities,
                by_id,
                segments,
            }),
            page_size,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn stored(&self, id: &ActivityId) -> Result<&StoredActivity, SourceError> {
        self.inner
            .by_id
            .get(id)
            .map(|idx| &self.inner.activities[*idx])
            .ok_or_else(|| SourceError::NotFound(format!("activity {}", id)))
    }

    fn segment_pages(&self, segment: &RouteSegment) -> Result<Vec<RoutePage>, SourceError> {
        let (a_idx, s_idx) = self
            .inner
            .segments
            .get(&segment.id)
            .copied()
            .ok_or_else(|| SourceError::NotFound(format!("route segment {}", segment.id)))?;
        let samples = &self.inner.activities[a_idx].route_segments[s_idx].samples;
        Ok(paginate(samples, self.page_size))
    }
}

/// Split samples into pages; the last page is flagged final. An empty
/// segment still produces one (empty) final page.
fn paginate(samples: &[LocationSample], page_size: usize) -> Vec<RoutePage> {
    if samples.is_empty() {
        return vec![RoutePage::new(Vec::new(), true)];
    }
    let page_count = samples.len().div_ceil(page_size);
    samples
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| RoutePage::new(chunk.to_vec(), i + 1 == page_count))
        .collect()
}

impl QuerySource for MemorySource {
    fn list_activities(&self, kinds: &[ActivityKind]) -> SourceFuture<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .inner
            .activities
            .iter()
            .filter(|a| kinds.contains(&a.record.kind))
            .map(|a| a.record.clone())
            .collect();
        records.sort_by(|a, b| b.end.cmp(&a.end));
        async move { Ok(records) }.boxed()
    }

    fn list_route_segments(&self, activity: &ActivityRecord) -> SourceFuture<Vec<RouteSegment>> {
        let result = self.stored(&activity.id).map(|stored| {
            stored
                .route_segments
                .iter()
                .map(|s| RouteSegment::new(s.id.clone(), activity.id.clone()))
                .collect()
        });
        async move { result }.boxed()
    }

    fn query_route_pages(&self, segment: &RouteSegment) -> PageStream {
        match self.segment_pages(segment) {
            // Yield between pages so deliveries from sibling segments interleave.
            Ok(pages) => stream::iter(pages)
                .then(|page| async move {
                    tokio::task::yield_now().await;
                    Ok(page)
                })
                .boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    fn list_heart_rate(&self, activity: &ActivityRecord) -> SourceFuture<Vec<HeartRateSample>> {
        let (start, end) = (activity.start, activity.end);
        let result = self.stored(&activity.id).map(|stored| {
            let mut samples: Vec<HeartRateSample> = stored
                .heart_rate
                .iter()
                .filter(|s| s.timestamp >= start && s.timestamp <= end)
                .copied()
                .collect();
            samples.sort_by_key(|s| s.timestamp);
            samples
        });
        async move { result }.boxed()
    }
}

/// Errors from loading a store snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse store JSON: {0}")]
    ParseError(String),

    #[error("Duplicate id in store: {0}")]
    DuplicateId(String),

    #[error("Page size must be at least 1")]
    InvalidPageSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn samples(n: usize) -> Vec<LocationSample> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                LocationSample::new(
                    37.0 + i as f64 * 1e-4,
                    -122.0,
                    base + Duration::seconds(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_paginate_flags_only_last_page_final() {
        let pages = paginate(&samples(5), 2);
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|p| p.samples.len()).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert_eq!(
            pages.iter().map(|p| p.is_final).collect::<Vec<_>>(),
            vec![false, false, true]
        );
    }

    #[test]
    fn test_paginate_exact_multiple() {
        let pages = paginate(&samples(4), 2);
        assert_eq!(pages.len(), 2);
        assert!(pages[1].is_final);
    }

    #[test]
    fn test_paginate_empty_segment() {
        let pages = paginate(&[], 10);
        assert_eq!(pages, vec![RoutePage::new(vec![], true)]);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = MemorySource::from_snapshot(StoreSnapshot::default(), 0);
        assert!(matches!(result, Err(StoreError::InvalidPageSize)));
    }

    #[test]
    fn test_duplicate_segment_rejected() {
        let json = r#"{
            "activities": [
                {"id": "a", "kind": "running",
                 "start": "2024-05-01T07:00:00Z", "end": "2024-05-01T08:00:00Z",
                 "route_segments": [{"id": "s1"}, {"id": "s1"}]}
            ]
        }"#;
        let result = MemorySource::load_from_json(json, 10);
        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == "s1"));
    }
}
