// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-activity outcomes of a batch aggregation.

use crate::error::AssemblyError;
use crate::models::{ActivityId, AssembledActivity};

/// Terminal state of one requested activity: its assembled value or the
/// reason it failed.
#[derive(Debug, Clone)]
pub struct AggregationOutcome<T = AssembledActivity> {
    pub activity_id: ActivityId,
    pub result: Result<T, AssemblyError>,
}

impl<T> AggregationOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of one batch, one entry per requested activity, in request order.
#[derive(Debug, Clone)]
pub struct BatchReport<T = AssembledActivity> {
    outcomes: Vec<AggregationOutcome<T>>,
}

impl<T> BatchReport<T> {
    pub fn new(outcomes: Vec<AggregationOutcome<T>>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[AggregationOutcome<T>] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<AggregationOutcome<T>> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successfully assembled values, in request order.
    pub fn succeeded(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed activities with their failure reason.
    pub fn failed(&self) -> impl Iterator<Item = (&ActivityId, &AssemblyError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.activity_id, e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// Returns true if every requested activity assembled.
    pub fn is_complete_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Consume the report, keeping only successful values.
    pub fn into_successes(self) -> Vec<T> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .collect()
    }
}
