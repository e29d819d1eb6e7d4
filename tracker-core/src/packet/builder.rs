//! Argos uplink frame encoding (spec §4.2): short/long/doppler/certification
//! frames, CRC-8 and the physical-to-wire scale conversions.
//!
//! Grounded on `argos_tx_service.hpp`'s `ArgosPacketBuilder`: its constants
//! (`SHORT_PACKET_BITS`, `REF_BATT_MV`, `MV_PER_UNIT`, `METRES_PER_UNIT`,
//! `DEGREES_PER_UNIT`, `LON_LAT_RESOLUTION`, `MIN/MAX/INVALID_ALTITUDE`) are
//! copied verbatim; the `convert_*`/`build_*` method *bodies* aren't in the
//! filtered original source (only their declarations are), and spec.md's own
//! field-width prose doesn't sum to the stated 120/248-bit frame sizes
//! either (it lists 121 bits of short-packet fields against a 112-bit
//! payload budget, and a 248-bit long packet's literal field list sums to
//! 323 bits). The field widths below are the minimal, documented
//! reconciliation that keeps every fully-specified field's native width and
//! physical scale (all point values in spec §8's round-trip tests) while
//! fitting exactly inside the two real frame sizes; see DESIGN.md.
//!
//! Field *order* within the short/long packet payload follows spec §4.2's
//! prose literally: timestamp, battery, latitude, longitude, altitude,
//! flags, heading, speed, counter — the flags field sits between the fix
//! fields and heading/speed, not after them.

use alloc::vec::Vec;

use crate::gps::{FixType, GpsLogEntry};
use crate::{Error, Result};

pub const SHORT_PACKET_BITS: usize = 120;
pub const SHORT_PACKET_BYTES: usize = 15;
pub const LONG_PACKET_BITS: usize = 248;
pub const LONG_PACKET_BYTES: usize = 31;
pub const DOPPLER_PACKET_BITS: usize = 24;
pub const DOPPLER_PACKET_BYTES: usize = 3;

const FIXTYPE_3D: bool = true;

const MV_PER_UNIT: u32 = 20;
const REF_BATT_MV: u32 = 2700;
const METRES_PER_UNIT: f64 = 40.0;
const DEGREES_PER_UNIT: f64 = 1.0 / 1.42;
const MIN_ALTITUDE_M: f64 = 0.0;
const MAX_ALTITUDE: u32 = 254;
const INVALID_ALTITUDE: u32 = 255;
const LON_LAT_RESOLUTION: f64 = 10000.0;

/// Epoch the compact 25-bit timestamp counts from (`dte_protocol.hpp`'s
/// zone encoding uses the same 2020 epoch for its BCD year field).
const TIMESTAMP_EPOCH_UNIX: i64 = 1_577_836_800; // 2020-01-01T00:00:00Z
const TIMESTAMP_DAY_BITS: u32 = 9;
const TIMESTAMP_SECOND_OF_DAY_BITS: u32 = 16;
const SECONDS_PER_DAY: i64 = 86_400;

use crate::bitstream::{BitReader, BitWriter};

bitflags::bitflags! {
    /// The short/long packet's 3 flag bits (spec §4.2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameFlags: u8 {
        const LOW_BATTERY    = 0b001;
        const OUT_OF_ZONE    = 0b010;
        const LAST_KNOWN_POS = 0b100;
    }
}

/// The long packet's delta-time-location tag (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTimeLocationTag {
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    NoHistory,
}

impl DeltaTimeLocationTag {
    fn to_bits(self) -> u64 {
        match self {
            DeltaTimeLocationTag::TenMinutes => 0,
            DeltaTimeLocationTag::ThirtyMinutes => 1,
            DeltaTimeLocationTag::OneHour => 2,
            DeltaTimeLocationTag::ThreeHours => 3,
            DeltaTimeLocationTag::SixHours => 4,
            DeltaTimeLocationTag::TwelveHours => 5,
            DeltaTimeLocationTag::OneDay => 6,
            DeltaTimeLocationTag::NoHistory => 7,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits {
            0 => DeltaTimeLocationTag::TenMinutes,
            1 => DeltaTimeLocationTag::ThirtyMinutes,
            2 => DeltaTimeLocationTag::OneHour,
            3 => DeltaTimeLocationTag::ThreeHours,
            4 => DeltaTimeLocationTag::SixHours,
            5 => DeltaTimeLocationTag::TwelveHours,
            6 => DeltaTimeLocationTag::OneDay,
            _ => DeltaTimeLocationTag::NoHistory,
        }
    }
}

fn convert_battery_voltage(battery_mv: u32) -> u32 {
    battery_mv.saturating_sub(REF_BATT_MV) / MV_PER_UNIT
}

fn convert_latitude(lat_deg: f64) -> u32 {
    (((lat_deg + 90.0) * LON_LAT_RESOLUTION).round()).clamp(0.0, (1u32 << 22) as f64 - 1.0) as u32
}

fn convert_longitude(lon_deg: f64) -> u32 {
    (((lon_deg + 180.0) * LON_LAT_RESOLUTION).round()).clamp(0.0, (1u32 << 23) as f64 - 1.0) as u32
}

fn convert_altitude(height_msl_mm: i32, fix_type: FixType) -> u32 {
    if !matches!(fix_type, FixType::Fix3D) {
        return INVALID_ALTITUDE;
    }
    let metres = height_msl_mm as f64 / 1000.0;
    metres.clamp(MIN_ALTITUDE_M, MAX_ALTITUDE as f64).round() as u32
}

fn convert_heading(heading_deg: f64) -> u32 {
    ((heading_deg / (1.0 / DEGREES_PER_UNIT)).round() as i64).rem_euclid(256) as u32
}

fn convert_speed(ground_speed_mm_s: u32) -> u32 {
    let m_per_s = ground_speed_mm_s as f64 / 1000.0;
    (m_per_s * METRES_PER_UNIT).round() as u32
}

fn encode_timestamp(unix_time: i64) -> u64 {
    let elapsed = (unix_time - TIMESTAMP_EPOCH_UNIX).max(0);
    let day = (elapsed / SECONDS_PER_DAY) as u64 % (1 << TIMESTAMP_DAY_BITS);
    let second_of_day = (elapsed % SECONDS_PER_DAY) as u64 / 2;
    (day << TIMESTAMP_SECOND_OF_DAY_BITS) | second_of_day
}

/// Inverse of [`encode_timestamp`], resolved against a caller-supplied
/// approximate "current" unix time to pick the correct 512-day wrap cycle.
pub fn decode_timestamp(raw: u64, near_unix: i64) -> i64 {
    let day = (raw >> TIMESTAMP_SECOND_OF_DAY_BITS) & ((1 << TIMESTAMP_DAY_BITS) - 1);
    let second_of_day = (raw & ((1 << TIMESTAMP_SECOND_OF_DAY_BITS) - 1)) * 2;
    let cycle_len = (1i64 << TIMESTAMP_DAY_BITS) * SECONDS_PER_DAY;
    let base_elapsed = (near_unix - TIMESTAMP_EPOCH_UNIX).max(0) / cycle_len * cycle_len;
    TIMESTAMP_EPOCH_UNIX + base_elapsed + day as i64 * SECONDS_PER_DAY + second_of_day as i64
}

fn crc8(bytes: &[u8], total_bits: usize) -> u8 {
    const POLY: u8 = 0x31; // CRC-8/MAXIM-style polynomial
    let mut crc: u8 = 0;
    let mut bits_done = 0usize;
    for &byte in bytes {
        let bits_this_byte = (total_bits - bits_done).min(8);
        for i in 0..bits_this_byte {
            let bit = (byte >> (7 - i)) & 1;
            let mix = ((crc >> 7) ^ bit) & 1;
            crc <<= 1;
            if mix != 0 {
                crc ^= POLY;
            }
        }
        bits_done += bits_this_byte;
        if bits_done >= total_bits {
            break;
        }
    }
    crc
}

/// Writes the position/altitude fields shared by the short and long packet
/// (spec §4.2 field order: ... latitude, longitude, altitude, flags,
/// heading, speed ...). Heading and speed are written separately by
/// [`write_heading_speed`] so callers can interleave the flags field
/// between them, per the spec's literal field order.
fn write_fix_fields(w: &mut BitWriter, fix: &GpsLogEntry) {
    w.push_bits(convert_latitude(fix.latitude) as u64, 22);
    w.push_bits(convert_longitude(fix.longitude) as u64, 23);
    w.push_bits(convert_altitude(fix.height_msl_mm, fix.fix_type) as u64, 8);
}

fn write_heading_speed(w: &mut BitWriter, fix: &GpsLogEntry) {
    w.push_bits(convert_heading(fix.heading_deg) as u64, 8);
    w.push_bits(convert_speed(fix.ground_speed_mm_s) as u64, 8);
}

/// Builds a 120-bit (15-byte) short packet from a single fix (spec §4.2).
pub fn build_short_packet(fix: &GpsLogEntry, flags: FrameFlags, tx_counter: u32) -> [u8; SHORT_PACKET_BYTES] {
    let mut payload = BitWriter::new();
    payload.push_bits(encode_timestamp(fix.acquired_at_unix), 25);
    payload.push_bits(convert_battery_voltage(fix.battery_voltage_mv) as u64, 7);
    write_fix_fields(&mut payload, fix);
    payload.push_bits(flags.bits() as u64, 3);
    write_heading_speed(&mut payload, fix);
    payload.push_bits((tx_counter & 0xFF) as u64, 8);
    let payload_bytes = payload.into_bytes();

    let crc = crc8(&payload_bytes, SHORT_PACKET_BITS - 8);

    let mut out = [0u8; SHORT_PACKET_BYTES];
    let mut w = BitWriter::new();
    w.push_bits(crc as u64, 8);
    for byte in &payload_bytes {
        w.push_bits(*byte as u64, 8);
    }
    let bytes = w.into_bytes();
    out.copy_from_slice(&bytes[..SHORT_PACKET_BYTES]);
    out
}

/// Reads a fix back out of the bits that [`write_fix_fields`] wrote.
fn read_fix_fields(r: &mut BitReader<'_>) -> (u32, u32, u32) {
    let lat_raw = r.read_bits(22) as u32;
    let lon_raw = r.read_bits(23) as u32;
    let alt_raw = r.read_bits(8) as u32;
    (lat_raw, lon_raw, alt_raw)
}

/// Reads the heading/speed fields [`write_heading_speed`] wrote.
fn read_heading_speed(r: &mut BitReader<'_>) -> (u32, u32) {
    let heading_raw = r.read_bits(8) as u32;
    let speed_raw = r.read_bits(8) as u32;
    (heading_raw, speed_raw)
}

/// A decoded short packet (spec §8 scenario 4's round-trip check). Physical
/// values are recovered to the same quantisation the encoder applied, not
/// bit-identical `f64`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedShortPacket {
    pub timestamp_raw: u64,
    pub battery_mv: u32,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: Option<f64>,
    pub flags: FrameFlags,
    pub heading_deg: f64,
    pub speed_m_s: f64,
    pub tx_counter: u32,
}

/// Decodes a short packet, verifying its CRC first.
pub fn decode_short_packet(bytes: &[u8; SHORT_PACKET_BYTES]) -> Result<DecodedShortPacket> {
    let expected_crc = crc8(&bytes[1..], SHORT_PACKET_BITS - 8);
    if bytes[0] != expected_crc {
        return Err(Error::BadFormat);
    }

    let mut r = BitReader::new(&bytes[1..], SHORT_PACKET_BITS - 8);
    let timestamp_raw = r.read_bits(25);
    let battery_raw = r.read_bits(7) as u32;
    let (lat_raw, lon_raw, alt_raw) = read_fix_fields(&mut r);
    let flags = FrameFlags::from_bits_truncate(r.read_bits(3) as u8);
    let (heading_raw, speed_raw) = read_heading_speed(&mut r);
    let tx_counter = r.read_bits(8) as u32;

    Ok(DecodedShortPacket {
        timestamp_raw,
        battery_mv: REF_BATT_MV + battery_raw * MV_PER_UNIT,
        latitude_deg: lat_raw as f64 / LON_LAT_RESOLUTION - 90.0,
        longitude_deg: lon_raw as f64 / LON_LAT_RESOLUTION - 180.0,
        altitude_m: if alt_raw == INVALID_ALTITUDE {
            None
        } else {
            Some(alt_raw as f64)
        },
        flags,
        heading_deg: heading_raw as f64 / DEGREES_PER_UNIT,
        speed_m_s: speed_raw as f64 / METRES_PER_UNIT,
        tx_counter,
    })
}

const DELTA_LAT_BITS: u32 = 9;
const DELTA_LON_BITS: u32 = 9;
const DELTA_ALT_BITS: u32 = 8;
const DELTA_HEADING_BITS: u32 = 8;

fn delta_speed_bits(slot: usize) -> u32 {
    if slot == 2 {
        7
    } else {
        8
    }
}

fn clamp_signed(value: i64, bits: u32) -> u64 {
    let half = 1i64 << (bits - 1);
    let clamped = value.clamp(-half, half - 1);
    (clamped & ((1i64 << bits) - 1)) as u64
}

/// Builds a 248-bit (31-byte) long packet from an anchor fix plus up to 3
/// older fixes encoded as deltas against it, newest-delta-first (spec
/// §4.2). A missing delta slot is filled with all-ones.
pub fn build_long_packet(
    fixes: &[GpsLogEntry],
    tag: DeltaTimeLocationTag,
    flags: FrameFlags,
    tx_counter: u32,
) -> Result<[u8; LONG_PACKET_BYTES]> {
    if fixes.is_empty() {
        return Err(Error::MissingArg);
    }
    let anchor = &fixes[0];
    let deltas = &fixes[1..fixes.len().min(4)];

    let mut payload = BitWriter::new();
    payload.push_bits(encode_timestamp(anchor.acquired_at_unix), 25);
    payload.push_bits(convert_battery_voltage(anchor.battery_voltage_mv) as u64, 7);
    write_fix_fields(&mut payload, anchor);
    payload.push_bits(flags.bits() as u64, 3);
    write_heading_speed(&mut payload, anchor);
    payload.push_bits((tx_counter & 0xFF) as u64, 8);

    payload.push_bits(tag.to_bits(), 3);

    for slot in 0..3 {
        let speed_bits = delta_speed_bits(slot);
        match deltas.get(slot) {
            Some(fix) => {
                let lat_delta = (convert_latitude(fix.latitude) as i64)
                    - (convert_latitude(anchor.latitude) as i64);
                let lon_delta = (convert_longitude(fix.longitude) as i64)
                    - (convert_longitude(anchor.longitude) as i64);
                payload.push_bits(clamp_signed(lat_delta, DELTA_LAT_BITS), DELTA_LAT_BITS);
                payload.push_bits(clamp_signed(lon_delta, DELTA_LON_BITS), DELTA_LON_BITS);
                payload.push_bits(
                    convert_altitude(fix.height_msl_mm, fix.fix_type) as u64,
                    DELTA_ALT_BITS,
                );
                payload.push_bits(convert_heading(fix.heading_deg) as u64, DELTA_HEADING_BITS);
                payload.push_bits(
                    convert_speed(fix.ground_speed_mm_s) as u64 & ((1 << speed_bits) - 1),
                    speed_bits,
                );
            }
            None => {
                payload.push_ones(DELTA_LAT_BITS + DELTA_LON_BITS + DELTA_ALT_BITS + DELTA_HEADING_BITS + speed_bits);
            }
        }
    }

    let payload_bytes = payload.into_bytes();
    let crc = crc8(&payload_bytes, LONG_PACKET_BITS - 8);

    let mut w = BitWriter::new();
    w.push_bits(crc as u64, 8);
    for byte in &payload_bytes {
        w.push_bits(*byte as u64, 8);
    }
    let bytes = w.into_bytes();
    let mut out = [0u8; LONG_PACKET_BYTES];
    out.copy_from_slice(&bytes[..LONG_PACKET_BYTES]);
    Ok(out)
}

/// Builds a 24-bit (3-byte) doppler-only packet carrying just battery state
/// (spec §4.2: "used when no GPS fix is available").
pub fn build_doppler_packet(battery_mv: u32, is_low_battery: bool, tx_counter: u32) -> [u8; DOPPLER_PACKET_BYTES] {
    let mut w = BitWriter::new();
    w.push_bits(convert_battery_voltage(battery_mv) as u64, 7);
    w.push_bits(is_low_battery as u64, 1);
    w.push_bits((tx_counter & 0xFF) as u64, 8);
    w.push_bits(0, 8); // reserved
    let bytes = w.into_bytes();
    let mut out = [0u8; DOPPLER_PACKET_BYTES];
    out.copy_from_slice(&bytes[..DOPPLER_PACKET_BYTES]);
    out
}

/// Frames an opaque certification-test payload, left-justified and
/// zero-padded to a whole number of bytes (spec §4.2: "certification bursts
/// carry a caller-supplied payload verbatim").
pub fn build_certification_packet(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() * 8 > LONG_PACKET_BITS {
        return Err(Error::PayloadTooLarge);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fix() -> GpsLogEntry {
        GpsLogEntry {
            longitude: 10.5,
            latitude: -33.25,
            height_msl_mm: 12_000,
            ground_speed_mm_s: 2_500,
            fix_type: FixType::Fix3D,
            h_acc_mm: 5_000,
            hdop_scaled: 120,
            battery_voltage_mv: 3_300,
            heading_deg: 271.0,
            scheduled_for_unix: 1_750_000_000,
            acquired_at_unix: 1_750_000_010,
        }
    }

    #[test]
    fn short_packet_round_trips_within_quantisation() {
        let fix = sample_fix();
        let bytes = build_short_packet(&fix, FrameFlags::OUT_OF_ZONE, 42);
        let decoded = decode_short_packet(&bytes).expect("valid crc");

        assert!((decoded.latitude_deg - fix.latitude).abs() < 1e-3);
        assert!((decoded.longitude_deg - fix.longitude).abs() < 1e-3);
        assert_eq!(decoded.altitude_m, Some(12.0));
        assert_eq!(decoded.flags, FrameFlags::OUT_OF_ZONE);
        assert_eq!(decoded.tx_counter, 42);
        assert_eq!(decoded.battery_mv, fix.battery_voltage_mv - (fix.battery_voltage_mv - REF_BATT_MV) % MV_PER_UNIT);
    }

    #[test]
    fn corrupted_short_packet_fails_crc_check() {
        let fix = sample_fix();
        let mut bytes = build_short_packet(&fix, FrameFlags::empty(), 1);
        bytes[5] ^= 0xFF;
        assert_eq!(decode_short_packet(&bytes), Err(Error::BadFormat));
    }

    #[test]
    fn invalid_altitude_sentinel_used_without_3d_fix() {
        let mut fix = sample_fix();
        fix.fix_type = FixType::Fix2D;
        let bytes = build_short_packet(&fix, FrameFlags::empty(), 0);
        let decoded = decode_short_packet(&bytes).unwrap();
        assert_eq!(decoded.altitude_m, None);
    }

    #[test]
    fn long_packet_has_the_correct_total_size() {
        let fix = sample_fix();
        let bytes = build_long_packet(&[fix], DeltaTimeLocationTag::NoHistory, FrameFlags::empty(), 7)
            .expect("builds");
        assert_eq!(bytes.len(), LONG_PACKET_BYTES);
    }

    #[test]
    fn doppler_packet_carries_battery_state_only() {
        let bytes = build_doppler_packet(2_900, true, 3);
        assert_eq!(bytes.len(), DOPPLER_PACKET_BYTES);
    }

    #[test]
    fn certification_payload_over_long_frame_size_is_rejected() {
        let payload = alloc::vec![0u8; LONG_PACKET_BYTES + 1];
        assert_eq!(build_certification_packet(&payload), Err(Error::PayloadTooLarge));
    }
}
