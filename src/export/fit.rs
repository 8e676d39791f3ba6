// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FIT activity file encoder.
//!
//! Writes the minimal message set fitness platforms expect from an activity
//! file: `file_id`, one `record` per route sample, a `session` summary and a
//! closing `activity` message. All multi-byte values are little-endian.

use crate::export::ExportError;
use crate::models::{ActivityKind, AssembledActivity};
use bytes::BufMut;
use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
const FIT_EPOCH_OFFSET: i64 = 631_065_600;
const HEADER_SIZE: u8 = 14;
const PROTOCOL_VERSION: u8 = 0x10;
const PROFILE_VERSION: u16 = 2132;

const MESG_FILE_ID: u16 = 0;
const MESG_SESSION: u16 = 18;
const MESG_RECORD: u16 = 20;
const MESG_ACTIVITY: u16 = 34;

const LOCAL_FILE_ID: u8 = 0;
const LOCAL_RECORD: u8 = 1;
const LOCAL_SESSION: u8 = 2;
const LOCAL_ACTIVITY: u8 = 3;

const BASE_ENUM: u8 = 0x00;
const BASE_UINT8: u8 = 0x02;
const BASE_UINT16: u8 = 0x84;
const BASE_SINT32: u8 = 0x85;
const BASE_UINT32: u8 = 0x86;

const INVALID_UINT8: u8 = 0xFF;
const INVALID_UINT16: u16 = 0xFFFF;
const INVALID_SINT32: i32 = 0x7FFF_FFFF;

const FILE_TYPE_ACTIVITY: u8 = 4;
const MANUFACTURER_DEVELOPMENT: u16 = 255;
const ACTIVITY_TYPE_MANUAL: u8 = 0;
const EVENT_ACTIVITY: u8 = 26;
const EVENT_TYPE_STOP: u8 = 1;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// (field number, size in bytes, base type)
type FieldDef = (u8, u8, u8);

const FILE_ID_FIELDS: [FieldDef; 4] = [
    (0, 1, BASE_ENUM),   // type
    (1, 2, BASE_UINT16), // manufacturer
    (2, 2, BASE_UINT16), // product
    (4, 4, BASE_UINT32), // time_created
];

const RECORD_FIELDS: [FieldDef; 5] = [
    (253, 4, BASE_UINT32), // timestamp
    (0, 4, BASE_SINT32),   // position_lat
    (1, 4, BASE_SINT32),   // position_long
    (2, 2, BASE_UINT16),   // altitude
    (3, 1, BASE_UINT8),    // heart_rate
];

const SESSION_FIELDS: [FieldDef; 7] = [
    (253, 4, BASE_UINT32), // timestamp
    (2, 4, BASE_UINT32),   // start_time
    (7, 4, BASE_UINT32),   // total_elapsed_time
    (8, 4, BASE_UINT32),   // total_timer_time
    (5, 1, BASE_ENUM),     // sport
    (16, 1, BASE_UINT8),   // avg_heart_rate
    (17, 1, BASE_UINT8),   // max_heart_rate
];

const ACTIVITY_FIELDS: [FieldDef; 6] = [
    (253, 4, BASE_UINT32), // timestamp
    (0, 4, BASE_UINT32),   // total_timer_time
    (1, 2, BASE_UINT16),   // num_sessions
    (2, 1, BASE_ENUM),     // type
    (3, 1, BASE_ENUM),     // event
    (4, 1, BASE_ENUM),     // event_type
];

/// Encode an activity as a FIT file.
pub fn encode(activity: &AssembledActivity) -> Result<Vec<u8>, ExportError> {
    let record = activity.record();
    let start = fit_timestamp(activity.start_date());
    let end = fit_timestamp(record.end).max(start);
    let elapsed_ms = u32::try_from(activity.duration().num_milliseconds().max(0))
        .map_err(|_| ExportError::Encode("activity duration exceeds FIT range".to_string()))?;

    let mut data: Vec<u8> = Vec::new();

    write_definition(&mut data, LOCAL_FILE_ID, MESG_FILE_ID, &FILE_ID_FIELDS);
    data.put_u8(LOCAL_FILE_ID);
    data.put_u8(FILE_TYPE_ACTIVITY);
    data.put_u16_le(MANUFACTURER_DEVELOPMENT);
    data.put_u16_le(0);
    data.put_u32_le(start);

    write_definition(&mut data, LOCAL_RECORD, MESG_RECORD, &RECORD_FIELDS);
    for sample in activity.route().samples() {
        data.put_u8(LOCAL_RECORD);
        data.put_u32_le(fit_timestamp(sample.timestamp));
        data.put_i32_le(semicircles(sample.latitude));
        data.put_i32_le(semicircles(sample.longitude));
        data.put_u16_le(sample.elevation.map_or(INVALID_UINT16, altitude));
        data.put_u8(
            activity
                .heart_rate_at(sample.timestamp)
                .map_or(INVALID_UINT8, heart_rate),
        );
    }

    let (avg_hr, max_hr) = if activity.heart_rate_samples().is_empty() {
        (INVALID_UINT8, INVALID_UINT8)
    } else {
        (
            heart_rate(activity.average_heart_rate() as f64),
            heart_rate(activity.max_heart_rate() as f64),
        )
    };

    write_definition(&mut data, LOCAL_SESSION, MESG_SESSION, &SESSION_FIELDS);
    data.put_u8(LOCAL_SESSION);
    data.put_u32_le(end);
    data.put_u32_le(start);
    data.put_u32_le(elapsed_ms);
    data.put_u32_le(elapsed_ms);
    data.put_u8(sport(record.kind));
    data.put_u8(avg_hr);
    data.put_u8(max_hr);

    write_definition(&mut data, LOCAL_ACTIVITY, MESG_ACTIVITY, &ACTIVITY_FIELDS);
    data.put_u8(LOCAL_ACTIVITY);
    data.put_u32_le(end);
    data.put_u32_le(elapsed_ms);
    data.put_u16_le(1);
    data.put_u8(ACTIVITY_TYPE_MANUAL);
    data.put_u8(EVENT_ACTIVITY);
    data.put_u8(EVENT_TYPE_STOP);

    let data_size = u32::try_from(data.len())
        .map_err(|_| ExportError::Encode("FIT data section too large".to_string()))?;

    let mut file: Vec<u8> = Vec::with_capacity(HEADER_SIZE as usize + data.len() + 2);
    file.put_u8(HEADER_SIZE);
    file.put_u8(PROTOCOL_VERSION);
    file.put_u16_le(PROFILE_VERSION);
    file.put_u32_le(data_size);
    file.put_slice(b".FIT");
    let header_crc = crc16(&file);
    file.put_u16_le(header_crc);

    file.put_slice(&data);
    let file_crc = crc16(&file);
    file.put_u16_le(file_crc);

    Ok(file)
}

fn write_definition(buf: &mut Vec<u8>, local: u8, global: u16, fields: &[FieldDef]) {
    buf.put_u8(0x40 | local);
    buf.put_u8(0); // reserved
    buf.put_u8(0); // little-endian architecture
    buf.put_u16_le(global);
    buf.put_u8(fields.len() as u8);
    for &(num, size, base_type) in fields {
        buf.put_u8(num);
        buf.put_u8(size);
        buf.put_u8(base_type);
    }
}

fn fit_timestamp(date: DateTime<Utc>) -> u32 {
    (date.timestamp() - FIT_EPOCH_OFFSET).clamp(0, u32::MAX as i64) as u32
}

fn semicircles(degrees: f64) -> i32 {
    if !degrees.is_finite() {
        return INVALID_SINT32;
    }
    let value = (degrees * (2f64.powi(31) / 180.0)).round();
    value.clamp(i32::MIN as f64, (i32::MAX - 1) as f64) as i32
}

/// Altitude in meters, encoded with scale 5 and offset 500.
fn altitude(meters: f64) -> u16 {
    ((meters + 500.0) * 5.0)
        .round()
        .clamp(0.0, (INVALID_UINT16 - 1) as f64) as u16
}

fn heart_rate(bpm: f64) -> u8 {
    bpm.round().clamp(0.0, (INVALID_UINT8 - 1) as f64) as u8
}

fn sport(kind: ActivityKind) -> u8 {
    match kind {
        ActivityKind::Running => 1,
        ActivityKind::Cycling => 2,
        ActivityKind::Swimming => 5,
        ActivityKind::Walking => 11,
        ActivityKind::Hiking => 17,
        ActivityKind::Other => 0,
    }
}

/// FIT CRC-16 (the CRC-16/ARC polynomial, nibble-table form).
fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &byte| {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        let crc = (crc >> 4) & 0x0FFF;
        let crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];

        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        let crc = (crc >> 4) & 0x0FFF;
        crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize]
    })
}
