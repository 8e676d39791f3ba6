// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing of candidate activities and grouping for presentation.

use crate::error::{AssemblyError, Result};
use crate::models::{ActivityKind, ActivityRecord};
use crate::source::QuerySource;
use crate::time_utils::format_day_label;
use std::collections::HashMap;
use std::sync::Arc;

/// Queries the activity set, restricted to the supported kinds, most recent
/// first.
#[derive(Clone)]
pub struct ListingStage {
    source: Arc<dyn QuerySource>,
    device_filter: Option<String>,
}

impl ListingStage {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self {
            source,
            device_filter: None,
        }
    }

    /// Keep only activities recorded by a device whose name contains `filter`
    /// (e.g. "Watch"). Activities without a device name are dropped.
    pub fn with_device_filter(mut self, filter: impl Into<String>) -> Self {
        self.device_filter = Some(filter.into());
        self
    }

    /// List activities of the supported kinds, sorted descending by end time.
    pub async fn list(&self) -> Result<Vec<ActivityRecord>> {
        let kinds = ActivityKind::SUPPORTED;
        let mut activities = self
            .source
            .list_activities(&kinds)
            .await
            .map_err(AssemblyError::ActivityListingFailed)?;

        let fetched = activities.len();
        activities.retain(|a| kinds.contains(&a.kind) && self.matches_device(a));
        activities.sort_by(|a, b| b.end.cmp(&a.end));

        tracing::info!(
            fetched,
            listed = activities.len(),
            device_filter = self.device_filter.as_deref(),
            "Listed activities"
        );
        Ok(activities)
    }

    fn matches_device(&self, activity: &ActivityRecord) -> bool {
        match &self.device_filter {
            None => true,
            Some(filter) => activity
                .source_device
                .as_deref()
                .is_some_and(|device| device.contains(filter.as_str())),
        }
    }
}

/// Activities sharing one presentation bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityGroup {
    pub key: String,
    pub activities: Vec<ActivityRecord>,
}

/// Partition activities by `key`, keeping input order within each bucket
/// and ordering buckets by first appearance.
pub fn group_by<F>(activities: &[ActivityRecord], key: F) -> Vec<ActivityGroup>
where
    F: Fn(&ActivityRecord) -> String,
{
    let mut groups: Vec<ActivityGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for activity in activities {
        let k = key(activity);
        match index.get(&k) {
            Some(&i) => groups[i].activities.push(activity.clone()),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(ActivityGroup {
                    key: k,
                    activities: vec![activity.clone()],
                });
            }
        }
    }

    groups
}

/// Default bucket key: the calendar day the activity started.
pub fn day_label(activity: &ActivityRecord) -> String {
    format_day_label(activity.start)
}
