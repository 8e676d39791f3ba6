// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout-Export: assemble recorded workouts and export them as GPX or FIT.
//!
//! Activities are listed from a [`source::QuerySource`], their routes are
//! gathered from paginated location queries across any number of segments,
//! heart rate is attached, and the result is encoded for upload to other
//! fitness platforms.

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod render;
pub mod services;
pub mod source;
pub mod time_utils;
