// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX 1.1 encoder.
//!
//! Written as an XML event stream so each track point can carry a Garmin
//! TrackPointExtension heart rate.

use crate::export::ExportError;
use crate::models::AssembledActivity;
use crate::time_utils::format_utc_rfc3339;
use std::io::Write;
use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const GPXTPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";

/// Render an activity as a GPX document with a single track.
pub fn encode(activity: &AssembledActivity) -> Result<Vec<u8>, ExportError> {
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .create_writer(Vec::new());

    write_document(&mut writer, activity).map_err(|e| ExportError::Encode(e.to_string()))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_document<W: Write>(
    w: &mut EventWriter<W>,
    activity: &AssembledActivity,
) -> xml::writer::Result<()> {
    let name = activity.name();
    let start = format_utc_rfc3339(activity.start_date());
    let kind = activity.record().kind.label().to_lowercase();

    w.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;
    w.write(
        XmlEvent::start_element("gpx")
            .attr("version", "1.1")
            .attr("creator", "workout-export")
            .default_ns(GPX_NS)
            .ns("gpxtpx", GPXTPX_NS)
            .ns("xsi", XSI_NS)
            .attr("xsi:schemaLocation", SCHEMA_LOCATION),
    )?;

    w.write(XmlEvent::start_element("metadata"))?;
    text_element(w, "name", &name)?;
    text_element(w, "time", &start)?;
    w.write(XmlEvent::end_element())?;

    w.write(XmlEvent::start_element("trk"))?;
    text_element(w, "name", &name)?;
    text_element(w, "type", &kind)?;
    w.write(XmlEvent::start_element("trkseg"))?;

    for sample in activity.route().samples() {
        let lat = format!("{:.7}", sample.latitude);
        let lon = format!("{:.7}", sample.longitude);
        w.write(
            XmlEvent::start_element("trkpt")
                .attr("lat", &lat)
                .attr("lon", &lon),
        )?;
        if let Some(ele) = sample.elevation {
            text_element(w, "ele", &format!("{:.1}", ele))?;
        }
        text_element(w, "time", &format_utc_rfc3339(sample.timestamp))?;
        if let Some(bpm) = activity.heart_rate_at(sample.timestamp) {
            w.write(XmlEvent::start_element("extensions"))?;
            w.write(XmlEvent::start_element("gpxtpx:TrackPointExtension"))?;
            text_element(w, "gpxtpx:hr", &(bpm.round() as u32).to_string())?;
            w.write(XmlEvent::end_element())?;
            w.write(XmlEvent::end_element())?;
        }
        w.write(XmlEvent::end_element())?;
    }

    // trkseg, trk, gpx
    w.write(XmlEvent::end_element())?;
    w.write(XmlEvent::end_element())?;
    w.write(XmlEvent::end_element())
}

fn text_element<W: Write>(
    w: &mut EventWriter<W>,
    name: &str,
    text: &str,
) -> xml::writer::Result<()> {
    w.write(XmlEvent::start_element(name))?;
    w.write(XmlEvent::characters(text))?;
    w.write(XmlEvent::end_element())
}
