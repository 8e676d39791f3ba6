// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity assembly.
//!
//! Runs the heart rate query and the route assembly for one activity
//! concurrently and joins them. The activity is only built once both have
//! succeeded; either failure is reported as the activity's failure.

use crate::error::{AssemblyError, Result};
use crate::models::{ActivityRecord, AssembledActivity, HeartRateSample};
use crate::services::RouteAssembler;
use crate::source::QuerySource;
use std::sync::Arc;

/// Assembles one activity from its heart rate series and route.
#[derive(Clone)]
pub struct ActivityAssembler {
    source: Arc<dyn QuerySource>,
    routes: RouteAssembler,
}

impl ActivityAssembler {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self {
            routes: RouteAssembler::new(Arc::clone(&source)),
            source,
        }
    }

    /// Assemble `activity`.
    pub async fn assemble(&self, activity: ActivityRecord) -> Result<AssembledActivity> {
        tracing::debug!(activity_id = %activity.id, kind = %activity.kind, "Assembling activity");

        let (heart_rate, route) = tokio::try_join!(
            self.heart_rate(&activity),
            self.routes.assemble(&activity),
        )?;

        tracing::info!(
            activity_id = %activity.id,
            route_samples = route.len(),
            heart_rate_samples = heart_rate.len(),
            "Activity assembled"
        );

        Ok(AssembledActivity::new(activity, route, heart_rate))
    }

    async fn heart_rate(&self, activity: &ActivityRecord) -> Result<Vec<HeartRateSample>> {
        self.source
            .list_heart_rate(activity)
            .await
            .map_err(|source| AssemblyError::HeartRateQueryFailed {
                activity_id: activity.id.clone(),
                source,
            })
    }
}
