// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-Export command line tool
//!
//! Lists the workouts in a store snapshot, assembles the selected ones and
//! writes each as a GPX or FIT file.

use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_export::{
    config::{Config, LogFormat},
    export::ActivityExporter,
    models::ActivityRecord,
    services::{day_label, group_by, BatchCoordinator, ListingStage},
    source::{MemorySource, QuerySource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;

    init_logging(config.log_format);
    tracing::info!(
        format = %config.export_format,
        export_dir = %config.export_dir.display(),
        "Starting Workout-Export"
    );

    // Load the store snapshot
    let store_path = config.require_store_path()?;
    tracing::info!(path = %store_path.display(), "Loading workout store");
    let source: Arc<dyn QuerySource> = Arc::new(
        MemorySource::load_from_file(store_path, config.route_page_size)
            .with_context(|| format!("Failed to load store {}", store_path.display()))?,
    );

    // List candidate activities
    let mut listing = ListingStage::new(Arc::clone(&source));
    if let Some(filter) = &config.device_filter {
        listing = listing.with_device_filter(filter.clone());
    }
    let activities = listing.list().await.context("Failed to list activities")?;

    for group in group_by(&activities, day_label) {
        tracing::info!(
            day = %group.key,
            activities = group.activities.len(),
            "Activities by day"
        );
    }

    let selected = select(activities, config.export_activity_ids.as_deref());
    if selected.is_empty() {
        tracing::warn!("No activities selected for export");
        return Ok(());
    }

    // Assemble and export
    let coordinator = BatchCoordinator::with_concurrency(source, config.max_concurrent_assemblies);
    let report = coordinator.aggregate(selected).await;

    for (activity_id, error) in report.failed() {
        tracing::error!(
            activity_id = %activity_id,
            kind = error.kind(),
            error = %error,
            "Skipping activity"
        );
    }

    let exporter = ActivityExporter::new(&config.export_dir);
    let summary = exporter
        .export_all(report.succeeded(), config.export_format)
        .await;

    tracing::info!(
        requested = report.len(),
        exported = summary.exported,
        assembly_failed = report.failure_count(),
        export_failed = summary.failed,
        "Export finished"
    );
    Ok(())
}

/// Restrict `activities` to `ids` when given, keeping listing order.
fn select(activities: Vec<ActivityRecord>, ids: Option<&[String]>) -> Vec<ActivityRecord> {
    let Some(ids) = ids else {
        return activities;
    };
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let selected: Vec<ActivityRecord> = activities
        .into_iter()
        .filter(|a| wanted.contains(a.id.as_str()))
        .collect();

    if selected.len() < wanted.len() {
        tracing::warn!(
            requested = wanted.len(),
            found = selected.len(),
            "Some requested activities were not listed"
        );
    }
    selected
}

/// Initialize structured logging, JSON by default.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("workout_export=debug,info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}
