// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for integration tests: a scripted `QuerySource` whose
//! deliveries can be delayed, failed, reordered, held open forever, or
//! driven by hand from the test body.

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::{stream, FutureExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use workout_export::error::SourceError;
use workout_export::models::{
    ActivityId, ActivityKind, ActivityRecord, HeartRateSample, LocationSample, RoutePage,
    RouteSegment,
};
use workout_export::source::{PageStream, QuerySource, SourceFuture};

/// Sender half for a hand-driven segment.
#[allow(dead_code)]
pub type PageSender = mpsc::UnboundedSender<Result<RoutePage, SourceError>>;

/// One step of a scripted page stream.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Step {
    Page(RoutePage),
    Delay(std::time::Duration),
    Fail(SourceError),
}

#[allow(dead_code)]
enum SegmentScript {
    /// Play the steps, then end the stream.
    Steps(Vec<Step>),
    /// Play the steps, then never deliver again.
    Hang(Vec<Step>),
    /// Forward whatever the test sends.
    Manual(mpsc::UnboundedReceiver<Result<RoutePage, SourceError>>),
}

/// Deterministic `QuerySource` double.
#[derive(Default)]
pub struct ScriptedSource {
    activities: Vec<ActivityRecord>,
    listing_error: Option<SourceError>,
    segments: HashMap<ActivityId, Result<Vec<String>, SourceError>>,
    scripts: Mutex<HashMap<String, SegmentScript>>,
    heart_rate: HashMap<ActivityId, Result<Vec<HeartRateSample>, SourceError>>,
    heart_rate_delay: Option<std::time::Duration>,
    page_queries: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities returned by `list_activities`, verbatim.
    pub fn with_activities(mut self, activities: Vec<ActivityRecord>) -> Self {
        self.activities = activities;
        self
    }

    pub fn with_listing_error(mut self, error: SourceError) -> Self {
        self.listing_error = Some(error);
        self
    }

    /// Declare the segment ids of an activity. Each segment still needs a
    /// script, or its page query reports `NotFound`.
    pub fn with_segments(mut self, activity: &str, segment_ids: &[&str]) -> Self {
        self.segments.insert(
            ActivityId::from(activity),
            Ok(segment_ids.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn with_segment_listing_error(mut self, activity: &str, error: SourceError) -> Self {
        self.segments.insert(ActivityId::from(activity), Err(error));
        self
    }

    pub fn with_pages(self, segment: &str, steps: Vec<Step>) -> Self {
        self.script(segment, SegmentScript::Steps(steps))
    }

    /// Deliver `steps`, then stay silent forever without a final page.
    pub fn with_hanging_pages(self, segment: &str, steps: Vec<Step>) -> Self {
        self.script(segment, SegmentScript::Hang(steps))
    }

    /// Hand control of a segment's deliveries to the test. Dropping the
    /// sender ends the stream.
    pub fn with_manual_pages(self, segment: &str) -> (Self, PageSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.script(segment, SegmentScript::Manual(rx)), tx)
    }

    pub fn with_heart_rate(mut self, activity: &str, samples: Vec<HeartRateSample>) -> Self {
        self.heart_rate.insert(ActivityId::from(activity), Ok(samples));
        self
    }

    pub fn with_heart_rate_error(mut self, activity: &str, error: SourceError) -> Self {
        self.heart_rate.insert(ActivityId::from(activity), Err(error));
        self
    }

    /// Delay every heart rate response.
    pub fn with_heart_rate_delay(mut self, delay: std::time::Duration) -> Self {
        self.heart_rate_delay = Some(delay);
        self
    }

    /// Number of page queries issued so far.
    pub fn page_queries(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }

    fn script(self, segment: &str, script: SegmentScript) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(segment.to_string(), script);
        self
    }
}

impl QuerySource for ScriptedSource {
    fn list_activities(&self, _kinds: &[ActivityKind]) -> SourceFuture<Vec<ActivityRecord>> {
        let result = match &self.listing_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.activities.clone()),
        };
        async move { result }.boxed()
    }

    fn list_route_segments(&self, activity: &ActivityRecord) -> SourceFuture<Vec<RouteSegment>> {
        let result = match self.segments.get(&activity.id) {
            Some(Ok(ids)) => Ok(ids
                .iter()
                .map(|id| RouteSegment::new(id.clone(), activity.id.clone()))
                .collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Vec::new()),
        };
        async move {
            // Let sibling work start before segments come back.
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }

    fn query_route_pages(&self, segment: &RouteSegment) -> PageStream {
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().remove(&segment.id);

        match script {
            Some(SegmentScript::Steps(steps)) => play(steps).boxed(),
            Some(SegmentScript::Hang(steps)) => play(steps).chain(stream::pending()).boxed(),
            Some(SegmentScript::Manual(rx)) => {
                stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
                    .boxed()
            }
            None => {
                let error = SourceError::NotFound(format!("no script for segment {}", segment.id));
                stream::once(async move { Err(error) }).boxed()
            }
        }
    }

    fn list_heart_rate(&self, activity: &ActivityRecord) -> SourceFuture<Vec<HeartRateSample>> {
        let result = self
            .heart_rate
            .get(&activity.id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        let delay = self.heart_rate_delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
        .boxed()
    }
}

fn play(
    steps: Vec<Step>,
) -> impl futures_util::Stream<Item = Result<RoutePage, SourceError>> + Send + 'static {
    stream::unfold(steps.into_iter(), |mut steps| async move {
        loop {
            match steps.next()? {
                Step::Delay(d) => tokio::time::sleep(d).await,
                Step::Page(page) => return Some((Ok(page), steps)),
                Step::Fail(e) => return Some((Err(e), steps)),
            }
        }
    })
}

/// Fixed reference time for fixtures.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap()
}

/// Reference time plus `secs` seconds.
#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(secs)
}

/// A location sample at `at(secs)`; latitude encodes the offset so order is
/// easy to read back.
#[allow(dead_code)]
pub fn sample(secs: i64) -> LocationSample {
    LocationSample::new(37.0 + secs as f64 * 1e-3, -122.0, at(secs))
}

/// A page step holding samples at the given offsets.
#[allow(dead_code)]
pub fn page(secs: &[i64], is_final: bool) -> Step {
    Step::Page(RoutePage::new(
        secs.iter().map(|s| sample(*s)).collect(),
        is_final,
    ))
}

#[allow(dead_code)]
pub fn delay_ms(ms: u64) -> Step {
    Step::Delay(std::time::Duration::from_millis(ms))
}

/// A one-hour activity starting `hours_ago` hours before the reference time.
#[allow(dead_code)]
pub fn record(id: &str, kind: ActivityKind, hours_ago: i64) -> ActivityRecord {
    let start = base_time() - Duration::hours(hours_ago);
    ActivityRecord::new(id, kind, start, start + Duration::hours(1))
}

/// A record whose time window covers every `at(..)` fixture offset used in
/// these tests.
#[allow(dead_code)]
pub fn current_record(id: &str, kind: ActivityKind) -> ActivityRecord {
    ActivityRecord::new(id, kind, base_time(), base_time() + Duration::hours(1))
}

/// Timestamps of the given samples as offsets from the reference time.
#[allow(dead_code)]
pub fn offsets(samples: &[LocationSample]) -> Vec<i64> {
    samples
        .iter()
        .map(|s| (s.timestamp - base_time()).num_seconds())
        .collect()
}
