// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the assembly pipeline.

pub mod activity;
pub mod batch;
pub mod gate;
pub mod listing;
pub mod route;

pub use activity::ActivityAssembler;
pub use batch::{BatchCoordinator, DEFAULT_MAX_CONCURRENT_ASSEMBLIES};
pub use gate::{Delivery, FanIn, GateObserver, GateReceiver, GateStatus};
pub use listing::{day_label, group_by, ActivityGroup, ListingStage};
pub use route::{RouteAssembler, RouteAssembly};
