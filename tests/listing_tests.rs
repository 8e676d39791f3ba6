// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing stage: supported kinds only, most recent first.

mod common;

use common::{record, ScriptedSource};
use std::sync::Arc;
use workout_export::error::{AssemblyError, SourceError};
use workout_export::models::ActivityKind;
use workout_export::render::list_sections;
use workout_export::services::{day_label, group_by, ListingStage};

#[tokio::test]
async fn test_unsupported_kinds_dropped_and_sorted_by_end() {
    let source = ScriptedSource::new().with_activities(vec![
        record("walk-old", ActivityKind::Walking, 48),
        record("golf", ActivityKind::Other, 1),
        record("run-new", ActivityKind::Running, 2),
        record("walk-new", ActivityKind::Walking, 5),
        record("run-old", ActivityKind::Running, 30),
    ]);
    let listing = ListingStage::new(Arc::new(source));

    let activities = listing.list().await.unwrap();

    let ids: Vec<&str> = activities.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["run-new", "walk-new", "run-old", "walk-old"]);
    assert!(activities.windows(2).all(|w| w[0].end >= w[1].end));
}

#[tokio::test]
async fn test_device_filter() {
    let mut watch = record("watch", ActivityKind::Hiking, 3);
    watch.source_device = Some("Watch6,2".to_string());
    let mut phone = record("phone", ActivityKind::Hiking, 4);
    phone.source_device = Some("iPhone15,3".to_string());
    let unknown = record("unknown", ActivityKind::Hiking, 5);

    let source = ScriptedSource::new().with_activities(vec![phone, unknown, watch]);
    let listing = ListingStage::new(Arc::new(source)).with_device_filter("Watch");

    let activities = listing.list().await.unwrap();

    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].id.as_str(), "watch");
}

#[tokio::test]
async fn test_listing_failure() {
    let error = SourceError::Unavailable("not authorized".to_string());
    let source = ScriptedSource::new().with_listing_error(error.clone());
    let listing = ListingStage::new(Arc::new(source));

    let result = listing.list().await;

    assert_eq!(result, Err(AssemblyError::ActivityListingFailed(error)));
}

#[tokio::test]
async fn test_listing_feeds_list_sections() {
    let source = ScriptedSource::new().with_activities(vec![
        record("a", ActivityKind::Walking, 1),
        record("b", ActivityKind::Cycling, 3),
        record("c", ActivityKind::Swimming, 30),
    ]);
    let activities = ListingStage::new(Arc::new(source)).list().await.unwrap();

    let sections = list_sections(&group_by(&activities, day_label));

    // Reference time is Saturday 08:00 UTC; "c" started the day before.
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Saturday, March 9, 2024");
    assert_eq!(sections[0].rows.len(), 2);
    assert_eq!(sections[1].title, "Friday, March 8, 2024");
    assert_eq!(sections[1].rows[0].kind, "Swimming");
    assert_eq!(sections[1].rows[0].duration, "1:00:00");
}
