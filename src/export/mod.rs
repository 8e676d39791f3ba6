// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File export of assembled activities.
//!
//! Two interchange formats are supported:
//! - GPX 1.1 with Garmin TrackPointExtension heart rate
//! - FIT activity files

pub mod fit;
pub mod gpx;

use crate::models::AssembledActivity;
use crate::time_utils::format_file_stamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Gpx,
    Fit,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Gpx => "gpx",
            ExportFormat::Fit => "fit",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpx" => Ok(ExportFormat::Gpx),
            "fit" => Ok(ExportFormat::Fit),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Encode an activity in the given format.
pub fn encode(activity: &AssembledActivity, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Gpx => gpx::encode(activity),
        ExportFormat::Fit => fit::encode(activity),
    }
}

/// File name for an exported activity, e.g.
/// "Running 2024-01-15 10.30.00 morning-run.gpx".
///
/// The activity id keeps names unique when two activities of one kind start
/// in the same second. Characters outside `[A-Za-z0-9_-]` in the id become
/// `_`.
pub fn file_name(activity: &AssembledActivity, format: ExportFormat) -> String {
    let id: String = activity
        .record()
        .id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{} {} {}.{}",
        activity.record().kind,
        format_file_stamp(activity.start_date()),
        id,
        format.extension()
    )
}

/// Writes encoded activities into an output directory.
#[derive(Debug, Clone)]
pub struct ActivityExporter {
    dir: PathBuf,
}

impl ActivityExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode `activity` and write it into the export directory, returning
    /// the written file's path.
    pub async fn export(
        &self,
        activity: &AssembledActivity,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let bytes = encode(activity, format)?;
        let path = self.dir.join(file_name(activity, format));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::Io(format!("{}: {}", self.dir.display(), e)))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            activity_id = %activity.record().id,
            format = %format,
            path = %path.display(),
            bytes = bytes.len(),
            "Exported activity"
        );
        Ok(path)
    }

    /// Export every activity, logging and counting failures instead of
    /// stopping at the first one.
    pub async fn export_all<'a>(
        &self,
        activities: impl IntoIterator<Item = &'a AssembledActivity>,
        format: ExportFormat,
    ) -> ExportSummary {
        let mut summary = ExportSummary::default();
        for activity in activities {
            match self.export(activity, format).await {
                Ok(_) => summary.exported += 1,
                Err(e) => {
                    tracing::error!(
                        activity_id = %activity.record().id,
                        error = %e,
                        "Export failed"
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Outcome counts of an `export_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: usize,
}

/// Errors from encoding or writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unknown export format: {0} (expected gpx or fit)")]
    UnknownFormat(String),

    #[error("Failed to encode activity: {0}")]
    Encode(String),

    #[error("Failed to write export: {0}")]
    Io(String),
}
