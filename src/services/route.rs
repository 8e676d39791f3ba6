// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route assembly.
//!
//! An activity's route may be split across any number of segments, each
//! delivered in pages. The assembler:
//! 1. Lists the segments (zero segments is an empty, successful route)
//! 2. Drains every segment's pages on its own task into one shared gate
//! 3. Completes once every listed segment has delivered its final page
//! 4. Sorts the collected samples by timestamp
//!
//! Any page failure fails the whole route; deliveries that arrive after that
//! are dropped by the gate.

use crate::error::{AssemblyError, Result};
use crate::models::{
    ActivityId, ActivityKind, ActivityRecord, AssembledRoute, LocationSample, RouteSegment,
};
use crate::services::gate::{Delivery, FanIn, GateObserver, GateReceiver, GateStatus};
use crate::source::{PageStream, QuerySource};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Segment index, page number within the segment, position within the page.
type DeliveryKey = (usize, usize, usize);
type RouteSamples = Vec<(DeliveryKey, LocationSample)>;
type RouteGate = FanIn<RouteSamples, AssemblyError>;

/// Assembles one activity's route from its segments.
#[derive(Clone)]
pub struct RouteAssembler {
    source: Arc<dyn QuerySource>,
}

impl RouteAssembler {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self { source }
    }

    /// Assemble the route for `activity`.
    ///
    /// An activity without segments yields an empty route, not an error.
    /// A segment whose page query never finishes leaves this future pending;
    /// use `start` to see which segment is holding it up.
    pub async fn assemble(&self, activity: &ActivityRecord) -> Result<AssembledRoute> {
        self.start(activity).await?.finish().await
    }

    /// List the segments of `activity` and start draining them.
    ///
    /// Returns once every segment task is spawned. The returned assembly
    /// reports progress while in flight.
    pub async fn start(&self, activity: &ActivityRecord) -> Result<RouteAssembly> {
        let segments = self
            .source
            .list_route_segments(activity)
            .await
            .map_err(|source| AssemblyError::SegmentListingFailed {
                activity_id: activity.id.clone(),
                source,
            })?;

        if segments.is_empty() {
            tracing::debug!(activity_id = %activity.id, "Activity has no route segments");
        } else {
            tracing::debug!(
                activity_id = %activity.id,
                segments = segments.len(),
                "Assembling route"
            );
        }

        // Member count is fixed here, before any segment task can run.
        // With no segments the gate completes at once with no samples.
        let (gate, done) = RouteGate::new(segments.len(), Vec::new());
        let segment_ids: Arc<[String]> = segments.iter().map(|s| s.id.clone()).collect();
        let progress = gate.observer();
        let mut tasks = JoinSet::new();

        for (member, segment) in segments.into_iter().enumerate() {
            let pages = self.source.query_route_pages(&segment);
            tasks.spawn(drain_segment(
                gate.clone(),
                Arc::clone(&segment_ids),
                member,
                segment,
                pages,
            ));
        }
        drop(gate);

        Ok(RouteAssembly {
            activity_id: activity.id.clone(),
            kind: activity.kind,
            segment_ids,
            progress,
            done,
            tasks,
        })
    }

    /// Like `assemble`, but an empty route is a `NoRouteData` failure.
    pub async fn assemble_required(&self, activity: &ActivityRecord) -> Result<AssembledRoute> {
        let route = self.assemble(activity).await?;
        if route.is_empty() {
            return Err(AssemblyError::NoRouteData(activity.id.clone()));
        }
        Ok(route)
    }
}

/// A route assembly whose segments are being drained.
///
/// Dropping it aborts any segment still in flight.
pub struct RouteAssembly {
    activity_id: ActivityId,
    kind: ActivityKind,
    segment_ids: Arc<[String]>,
    progress: GateObserver<RouteSamples, AssemblyError>,
    done: GateReceiver<RouteSamples, AssemblyError>,
    tasks: JoinSet<()>,
}

impl RouteAssembly {
    pub fn activity_id(&self) -> &ActivityId {
        &self.activity_id
    }

    /// Gate status, or `None` once every segment task has exited.
    pub fn status(&self) -> Option<GateStatus> {
        self.progress.status()
    }

    /// Ids of segments that have not delivered their final page.
    pub fn pending_segments(&self) -> Vec<String> {
        pending_ids(&self.segment_ids, self.progress.pending_members())
    }

    /// Wait for every segment and build the route.
    pub async fn finish(self) -> Result<AssembledRoute> {
        let Self {
            activity_id,
            kind,
            done,
            tasks,
            ..
        } = self;

        let samples = done.wait().await.inspect_err(|e| {
            tracing::warn!(activity_id = %activity_id, error = %e, "Route assembly failed");
        })?;
        // Aborts segments still in flight after a failure.
        drop(tasks);

        let route = AssembledRoute::from_keyed(kind, samples);
        tracing::debug!(
            activity_id = %activity_id,
            samples = route.len(),
            "Route assembled"
        );
        Ok(route)
    }
}

fn pending_ids(segment_ids: &[String], members: Vec<usize>) -> Vec<String> {
    members
        .into_iter()
        .filter_map(|m| segment_ids.get(m).cloned())
        .collect()
}

/// Feed one segment's pages into the gate until its final page, a failure,
/// or the gate going terminal.
async fn drain_segment(
    gate: RouteGate,
    segment_ids: Arc<[String]>,
    member: usize,
    segment: RouteSegment,
    mut pages: PageStream,
) {
    let mut page_seq = 0;
    while let Some(delivery) = pages.next().await {
        match delivery {
            Ok(page) => {
                let is_final = page.is_final;
                let count = page.samples.len();
                let outcome = gate.contribute(member, is_final, |acc| {
                    acc.extend(
                        page.samples
                            .into_iter()
                            .enumerate()
                            .map(|(i, sample)| ((member, page_seq, i), sample)),
                    )
                });
                page_seq += 1;

                if outcome == Delivery::Ignored {
                    tracing::debug!(
                        activity_id = %segment.activity_id,
                        segment_id = %segment.id,
                        samples = count,
                        "Ignoring route page after route reached a terminal state"
                    );
                    return;
                }
                if is_final {
                    if let GateStatus::Pending { remaining } = gate.status() {
                        tracing::debug!(
                            activity_id = %segment.activity_id,
                            segment_id = %segment.id,
                            remaining,
                            pending = ?pending_ids(&segment_ids, gate.pending_members()),
                            "Segment complete"
                        );
                    }
                    return;
                }
            }
            Err(source) => {
                gate.fail(AssemblyError::PageQueryFailed {
                    activity_id: segment.activity_id.clone(),
                    segment_id: segment.id.clone(),
                    source,
                });
                return;
            }
        }
    }

    gate.fail(AssemblyError::Interrupted(format!(
        "page stream for segment {} of activity {} ended before its final page",
        segment.id, segment.activity_id
    )));
}
