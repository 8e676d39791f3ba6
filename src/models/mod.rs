// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the assembly pipeline.

pub mod activity;
pub mod outcome;
pub mod route;
pub mod sample;
pub mod workout;

pub use activity::{ActivityId, ActivityKind, ActivityRecord};
pub use outcome::{AggregationOutcome, BatchReport};
pub use route::{AssembledRoute, RoutePage, RouteSegment};
pub use sample::{HeartRateSample, LocationSample};
pub use workout::AssembledActivity;
