// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch aggregation across selected activities.
//!
//! One assembly runs per selected activity. Failures are isolated: each
//! activity lands in its own slot of the batch gate, success or failure, and
//! the report is produced once every slot is filled. Results keep request
//! order.

use crate::error::{AssemblyError, Result};
use crate::models::{
    ActivityId, ActivityRecord, AggregationOutcome, AssembledActivity, AssembledRoute, BatchReport,
};
use crate::services::gate::{FanIn, GateStatus};
use crate::services::{ActivityAssembler, RouteAssembler};
use crate::source::QuerySource;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_CONCURRENT_ASSEMBLIES: usize = 8;

type Slots<T> = Vec<Option<Result<T>>>;

/// Runs assemblies for a batch of activities and collects every outcome.
#[derive(Clone)]
pub struct BatchCoordinator {
    activities: ActivityAssembler,
    routes: RouteAssembler,
    max_concurrency: usize,
}

impl BatchCoordinator {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self::with_concurrency(source, DEFAULT_MAX_CONCURRENT_ASSEMBLIES)
    }

    /// Create a coordinator that runs at most `max_concurrency` assemblies
    /// at once (clamped to at least 1).
    pub fn with_concurrency(source: Arc<dyn QuerySource>, max_concurrency: usize) -> Self {
        Self {
            activities: ActivityAssembler::new(Arc::clone(&source)),
            routes: RouteAssembler::new(source),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Assemble every record. The report holds exactly one outcome per
    /// record, in the order given.
    pub async fn aggregate(&self, records: Vec<ActivityRecord>) -> BatchReport<AssembledActivity> {
        let assembler = self.activities.clone();
        let report = self
            .fan_out(records, move |record| {
                let assembler = assembler.clone();
                async move { assembler.assemble(record).await }
            })
            .await;

        tracing::info!(
            requested = report.len(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Batch aggregation complete"
        );
        report
    }

    /// Assemble only the routes of every record, for map surfaces.
    pub async fn aggregate_routes(
        &self,
        records: Vec<ActivityRecord>,
    ) -> BatchReport<AssembledRoute> {
        let routes = self.routes.clone();
        let report = self
            .fan_out(records, move |record| {
                let routes = routes.clone();
                async move { routes.assemble(&record).await }
            })
            .await;

        tracing::info!(
            requested = report.len(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Route batch complete"
        );
        report
    }

    async fn fan_out<T, F, Fut>(&self, records: Vec<ActivityRecord>, assemble: F) -> BatchReport<T>
    where
        T: Send + 'static,
        F: Fn(ActivityRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let ids: Vec<ActivityId> = records.iter().map(|r| r.id.clone()).collect();
        let slots: Slots<T> = (0..records.len()).map(|_| None).collect();

        let (gate, done) = FanIn::<Slots<T>, AssemblyError>::new(records.len(), slots);
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let assemble = Arc::new(assemble);
        let mut tasks = JoinSet::new();

        for (slot, record) in records.into_iter().enumerate() {
            let gate = gate.clone();
            let permits = Arc::clone(&permits);
            let assemble = Arc::clone(&assemble);

            tasks.spawn(async move {
                let id = record.id.clone();
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => AssertUnwindSafe((*assemble)(record))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            tracing::error!(activity_id = %id, "Activity assembly panicked");
                            Err(AssemblyError::Interrupted(format!(
                                "assembly of activity {} panicked",
                                id
                            )))
                        }),
                    Err(_) => Err(AssemblyError::Interrupted(
                        "batch concurrency limiter closed".to_string(),
                    )),
                };

                if let Err(e) = &result {
                    tracing::warn!(
                        activity_id = %id,
                        error = %e,
                        kind = e.kind(),
                        "Activity failed"
                    );
                }
                gate.contribute(slot, true, |slots| slots[slot] = Some(result));
                if let GateStatus::Pending { remaining } = gate.status() {
                    tracing::debug!(activity_id = %id, remaining, "Batch slot filled");
                }
            });
        }
        drop(gate);

        let outcomes = match done.wait().await {
            Ok(slots) => ids
                .into_iter()
                .zip(slots)
                .map(|(activity_id, slot)| AggregationOutcome {
                    result: slot.unwrap_or_else(|| {
                        Err(AssemblyError::Interrupted(format!(
                            "no outcome recorded for activity {}",
                            activity_id
                        )))
                    }),
                    activity_id,
                })
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Batch gate abandoned");
                ids.into_iter()
                    .map(|activity_id| AggregationOutcome {
                        activity_id,
                        result: Err(e.clone()),
                    })
                    .collect()
            }
        };

        drop(tasks);
        BatchReport::new(outcomes)
    }
}
