//! Allcast downlink decode (spec §4.4): addressee/DCS/service-code framing,
//! routing by addressee to the constellation-status or orbit-parameter body
//! decoders, BCD bulletin timestamps, and the two-map accumulation a pass
//! predict is built from.
//!
//! Grounded on `core/protocol/dte_protocol.hpp`'s `PassPredictCodec` class:
//! `allcast_packet_decode` (header + addressee dispatch),
//! `allcast_constellation_status_decode` (count-prefixed status entries,
//! `convert_dl_operating_status`/`convert_ul_operating_status`) and
//! `allcast_sat_orbit_params_decode` (BCD bulletin + scaled orbital
//! elements). Hand-verified bit-for-bit against spec.md §8 scenario 5's
//! packet, which decodes to seven constellation-status entries rather than
//! one (see the test below).

use crate::bitstream::BitReader;
use crate::Error;

use super::aop::{
    AopSatelliteEntry, BasePassPredict, BulletinTimestamp, DownlinkStatus, OrbitalElements,
    UplinkStatus, MAX_AOP_SATELLITE_ENTRIES,
};

/// Addressee codes routing an allcast body to its decoder (spec §4.4).
const ADDR_CONSTELLATION_STATUS_A: u32 = 0xC7;
const ADDR_CONSTELLATION_STATUS_B: u32 = 0x5F;
const ADDR_ORBIT_PARAMS_A: u32 = 0xBE;
const ADDR_ORBIT_PARAMS_B: u32 = 0xD4;

/// Mandatory allcast service code (spec §4.4: "service code must be 0x00").
const ALLCAST_SERVICE_CODE: u32 = 0x00;

/// Satellite hex IDs are 4 bits wide: 16 possible slots, and a
/// constellation-status body's leading count field is also 4 bits, so a
/// single body can carry at most this many entries.
const HEX_ID_SLOTS: usize = 16;

/// Decoder behaviour switches not fixed by the protocol itself.
///
/// `tolerate_odd_status_padding` resolves
/// `WORKAROUND_ALLCAST_CONSTELLATION_STATUS_ENCODING_BUG`: a
/// constellation-status body pads with 4 reserved bits after its entries
/// when the entry count is even, to keep the body nibble-aligned. Defaulting
/// to `true` consumes that padding; an encoder built against the buggy
/// workaround macro omits it even for an even count, which a caller can
/// select by turning this off.
#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    pub tolerate_odd_status_padding: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            tolerate_odd_status_padding: true,
        }
    }
}

/// A constellation-status record decoded from one packet, not yet known to
/// have a matching orbit-parameter record (spec §4.4 clause 2).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusFragment {
    pub sat_hex_id: u8,
    pub dcs_id: u8,
    pub downlink_status: DownlinkStatus,
    pub uplink_status: UplinkStatus,
}

/// Up to [`HEX_ID_SLOTS`] status entries decoded from a single
/// constellation-status body (spec §4.4: "a status body may report several
/// satellites in one packet").
#[derive(Debug, Clone, Copy)]
pub struct StatusBatch {
    pub entries: [StatusFragment; HEX_ID_SLOTS],
    pub count: usize,
}

impl StatusBatch {
    pub fn as_slice(&self) -> &[StatusFragment] {
        &self.entries[..self.count]
    }
}

/// An orbit-parameter record decoded from one packet, not yet known to have
/// a matching constellation-status record (spec §4.4 clause 2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitFragment {
    pub sat_hex_id: u8,
    pub dcs_id: u8,
    pub bulletin: BulletinTimestamp,
    pub orbit: OrbitalElements,
}

/// The outcome of decoding one allcast body.
#[derive(Debug, Clone, Copy)]
pub enum DecodedFragment {
    Status(StatusBatch),
    Orbit(OrbitFragment),
}

impl DecodedFragment {
    /// The decoded status entries, or `None` if this body was an
    /// orbit-parameter fragment instead.
    pub fn status_entries(&self) -> Option<&[StatusFragment]> {
        match self {
            DecodedFragment::Status(batch) => Some(batch.as_slice()),
            DecodedFragment::Orbit(_) => None,
        }
    }
}

/// One allcast downlink packet's addressee/DCS/service-code header, already
/// stripped of its leading sync and trailing FCS by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AllcastHeader {
    addressee: u32,
    dcs_id: u8,
    service_code: u32,
}

fn read_header(r: &mut BitReader<'_>) -> AllcastHeader {
    let addressee = r.read_bits(28) as u32;
    let dcs_id = r.read_bits(4) as u8;
    let service_code = r.read_bits(8) as u32;
    AllcastHeader {
        addressee,
        dcs_id,
        service_code,
    }
}

/// Decodes a BCD-packed bulletin timestamp: 2-digit year, 3-digit
/// day-of-year, 2-digit hour, 2-digit minute, 2-digit second (spec §4.4
/// "Timestamp decode"). Day-of-year is converted to month/day assuming a
/// non-leap 365-day calendar, matching the orbitography bulletin's own
/// convention of carrying no leap-year flag.
fn read_bcd_timestamp(r: &mut BitReader<'_>) -> BulletinTimestamp {
    let year = bcd_to_u32(r.read_bits(8) as u32, 2);
    let day_of_year = bcd_to_u32(r.read_bits(12) as u32, 3);
    let hour = bcd_to_u32(r.read_bits(8) as u32, 2);
    let minute = bcd_to_u32(r.read_bits(8) as u32, 2);
    let second = bcd_to_u32(r.read_bits(8) as u32, 2);

    let (month, day) = day_of_year_to_month_day(day_of_year);
    BulletinTimestamp {
        year: (2000 + year) as u16,
        month,
        day,
        hour: hour as u8,
        minute: minute as u8,
        second: second as u8,
    }
}

fn bcd_to_u32(packed: u32, digits: u32) -> u32 {
    let mut value = 0u32;
    for i in (0..digits).rev() {
        let nibble = (packed >> (i * 4)) & 0xF;
        value = value * 10 + nibble;
    }
    value
}

const DAYS_PER_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn day_of_year_to_month_day(mut day_of_year: u32) -> (u8, u8) {
    if day_of_year == 0 {
        day_of_year = 1;
    }
    let mut remaining = day_of_year;
    for (idx, days) in DAYS_PER_MONTH.iter().enumerate() {
        if remaining <= *days {
            return ((idx + 1) as u8, remaining as u8);
        }
        remaining -= days;
    }
    (12, 31)
}

/// `convert_dl_operating_status`: a type-A body reports 2 downlink bits and
/// is "on" (A3) only for the value 3; a type-B body reports a single bit and
/// is "on" for the value 1. Any other value is off.
fn convert_dl_operating_status(bits: u8, type_a: bool) -> DownlinkStatus {
    if type_a {
        if bits == 0b11 {
            DownlinkStatus::OnA3
        } else {
            DownlinkStatus::Off
        }
    } else if bits == 0b1 {
        DownlinkStatus::OnA3
    } else {
        DownlinkStatus::Off
    }
}

/// Decodes a type-A (2-bit downlink + 2-bit uplink per entry) or type-B
/// (1-bit downlink + 3-bit uplink per entry) constellation-status body: a
/// 4-bit count, then that many `{4-bit hex ID, 4-bit reserved, status
/// bits}` entries, followed by a 4-bit reserved nibble when the count is
/// even (`allcast_constellation_status_decode`).
fn decode_constellation_status(
    r: &mut BitReader<'_>,
    header_dcs_id: u8,
    type_b: bool,
    opts: &DecoderOptions,
) -> StatusBatch {
    let count = (r.read_bits(4) as usize).min(HEX_ID_SLOTS);
    let mut entries = [StatusFragment::default(); HEX_ID_SLOTS];

    for entry in entries.iter_mut().take(count) {
        let sat_hex_id = r.read_bits(4) as u8;
        r.read_bits(4); // per-entry reserved nibble, uninterpreted
        let (dl_bits, ul_bits) = if type_b {
            (r.read_bits(1) as u8, r.read_bits(3) as u8)
        } else {
            (r.read_bits(2) as u8, r.read_bits(2) as u8)
        };
        *entry = StatusFragment {
            sat_hex_id,
            dcs_id: header_dcs_id,
            downlink_status: convert_dl_operating_status(dl_bits, !type_b),
            uplink_status: UplinkStatus::from_bits(ul_bits, sat_hex_id),
        };
    }

    if opts.tolerate_odd_status_padding && count % 2 == 0 {
        r.read_bits(4);
    }

    StatusBatch { entries, count }
}

/// Decodes an orbit-parameter body (`allcast_sat_orbit_params_decode`): a
/// 4-bit hex ID, a 2-bit bulletin-type tag (discarded), a 44-bit BCD
/// timestamp, then six scaled fields whose widths and bases differ between
/// type A and type B addressees.
fn decode_orbit_params(r: &mut BitReader<'_>, header_dcs_id: u8, type_a: bool) -> OrbitFragment {
    let sat_hex_id = r.read_bits(4) as u8;
    r.read_bits(2); // bulletin-type tag, discarded
    let bulletin = read_bcd_timestamp(r);

    let lon_raw = r.read_bits(19);
    let drift_raw = r.read_bits(10);
    let period_raw = r.read_bits(14);
    let sma_raw = r.read_bits(19);
    let decay_raw = r.read_bits(8);
    let incl_raw = r.read_bits(16);

    let (drift_base, period_base, sma_base, incl_base) = if type_a {
        (-26.0, 95.0, 7000.0, 97.0)
    } else {
        (-24.0, 85.0, 6500.0, 95.0)
    };

    let orbit = OrbitalElements {
        semi_major_axis_km: sma_base + sma_raw as f64 / 1000.0,
        inclination_deg: incl_base + incl_raw as f64 / 10000.0,
        ascending_node_longitude_deg: lon_raw as f64 / 1000.0,
        ascending_node_drift_deg_per_orbit: drift_base + drift_raw as f64 / 1000.0,
        orbit_period_min: period_base + period_raw as f64 / 1000.0,
        semi_major_axis_drift_m_per_day: decay_raw as f64 * -0.1,
    };

    OrbitFragment {
        sat_hex_id,
        dcs_id: header_dcs_id,
        bulletin,
        orbit,
    }
}

/// Decodes one allcast downlink body (already stripped of FCS) into either
/// a status batch or an orbit-parameter fragment, routed by addressee.
pub fn decode_allcast(
    body: &[u8],
    total_bits: usize,
    opts: &DecoderOptions,
) -> crate::Result<DecodedFragment> {
    let mut r = BitReader::new(body, total_bits);
    let header = read_header(&mut r);

    if header.service_code != ALLCAST_SERVICE_CODE {
        return Err(Error::ProtocolOutOfRange);
    }

    match header.addressee {
        ADDR_CONSTELLATION_STATUS_A => Ok(DecodedFragment::Status(decode_constellation_status(
            &mut r,
            header.dcs_id,
            false,
            opts,
        ))),
        ADDR_CONSTELLATION_STATUS_B => Ok(DecodedFragment::Status(decode_constellation_status(
            &mut r,
            header.dcs_id,
            true,
            opts,
        ))),
        ADDR_ORBIT_PARAMS_A => Ok(DecodedFragment::Orbit(decode_orbit_params(
            &mut r,
            header.dcs_id,
            true,
        ))),
        ADDR_ORBIT_PARAMS_B => Ok(DecodedFragment::Orbit(decode_orbit_params(
            &mut r,
            header.dcs_id,
            false,
        ))),
        _ => Err(Error::ProtocolOutOfRange),
    }
}

/// Accumulates status and orbit fragments across a burst of allcast
/// packets, keyed by hex ID, the way `react(ArticEventRxPacket)` collects a
/// run of packets before attempting a pass-predict merge.
#[derive(Debug, Clone, Copy)]
pub struct PassPredictAccumulator {
    status: [Option<StatusFragment>; HEX_ID_SLOTS],
    orbit: [Option<OrbitFragment>; HEX_ID_SLOTS],
}

impl Default for PassPredictAccumulator {
    fn default() -> Self {
        PassPredictAccumulator {
            status: [None; HEX_ID_SLOTS],
            orbit: [None; HEX_ID_SLOTS],
        }
    }
}

impl PassPredictAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, fragment: DecodedFragment) {
        match fragment {
            DecodedFragment::Status(batch) => {
                for s in batch.as_slice() {
                    self.status[s.sat_hex_id as usize] = Some(*s);
                }
            }
            DecodedFragment::Orbit(o) => self.orbit[o.sat_hex_id as usize] = Some(o),
        }
    }

    /// Builds a [`BasePassPredict`] containing exactly the hex IDs present
    /// in *both* maps (spec §4.4 clause 2: "An AOP record is emitted only
    /// when both maps contain the same hex ID").
    pub fn finalize(&self) -> BasePassPredict {
        let mut db = BasePassPredict::new();
        for hex_id in 0..HEX_ID_SLOTS {
            if let (Some(status), Some(orbit)) = (self.status[hex_id], self.orbit[hex_id]) {
                if db.num_records >= MAX_AOP_SATELLITE_ENTRIES {
                    break;
                }
                db.records[db.num_records] = AopSatelliteEntry {
                    sat_hex_id: hex_id as u8,
                    dcs_id: status.dcs_id,
                    downlink_status: status.downlink_status,
                    uplink_status: status.uplink_status,
                    bulletin: orbit.bulletin,
                    orbit: orbit.orbit,
                };
                db.num_records += 1;
            }
        }
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_bytes(hex: &str, out: &mut [u8]) -> usize {
        let n = hex.len() / 2;
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
        }
        n
    }

    /// spec §8 scenario 5: the concrete allcast packet decodes to seven
    /// constellation-status entries, hand-verified bit by bit against
    /// `allcast_constellation_status_decode`.
    #[test]
    fn scenario_5_decodes_seven_status_entries() {
        let mut bytes = [0u8; 18];
        let n = hex_to_bytes("00000C77007A5C900B7C500800C00D4C4224", &mut bytes);
        let total_bits = n * 8 - 16; // strip the trailing 16-bit FCS
        let opts = DecoderOptions::default();
        let fragment = decode_allcast(&bytes[..n], total_bits, &opts).expect("decodes");

        let batch = match fragment {
            DecodedFragment::Status(batch) => batch,
            DecodedFragment::Orbit(_) => panic!("expected a status batch"),
        };
        assert_eq!(batch.count, 7);

        let expected = [
            (0xAu8, DownlinkStatus::OnA3, UplinkStatus::OnA3),
            (0x9, DownlinkStatus::Off, UplinkStatus::OnA3),
            (0xB, DownlinkStatus::OnA3, UplinkStatus::OnA3),
            (0x5, DownlinkStatus::Off, UplinkStatus::OnA2),
            (0x8, DownlinkStatus::Off, UplinkStatus::OnA2),
            (0xC, DownlinkStatus::Off, UplinkStatus::OnA3),
            (0xD, DownlinkStatus::OnA3, UplinkStatus::OnA3),
        ];
        for (entry, (hex_id, dl, ul)) in batch.as_slice().iter().zip(expected.iter()) {
            assert_eq!(entry.sat_hex_id, *hex_id);
            assert_eq!(entry.downlink_status, *dl);
            assert_eq!(entry.uplink_status, *ul);
            assert_eq!(entry.dcs_id, 7);
        }
    }

    #[test]
    fn non_allcast_service_code_is_rejected() {
        let mut bytes = [0u8; 18];
        let n = hex_to_bytes("00000C77007A5C900B7C500800C00D4C4224", &mut bytes);
        bytes[3] = 0x01 << 4;
        let total_bits = n * 8 - 16;
        let opts = DecoderOptions::default();
        assert_eq!(
            decode_allcast(&bytes[..n], total_bits, &opts),
            Err(Error::ProtocolOutOfRange)
        );
    }

    /// spec §4.4 clause 2: a status-only accumulation yields no record
    /// until a matching orbit-parameter fragment for the same hex ID
    /// arrives.
    #[test]
    fn status_without_matching_orbit_fragment_yields_no_record() {
        let mut acc = PassPredictAccumulator::new();
        let mut batch = StatusBatch {
            entries: [StatusFragment::default(); HEX_ID_SLOTS],
            count: 1,
        };
        batch.entries[0] = StatusFragment {
            sat_hex_id: 7,
            dcs_id: 7,
            downlink_status: DownlinkStatus::OnA3,
            uplink_status: UplinkStatus::default(),
        };
        acc.ingest(DecodedFragment::Status(batch));
        assert_eq!(acc.finalize().num_records, 0);
    }

    #[test]
    fn matching_status_and_orbit_fragments_combine_into_one_record() {
        let mut acc = PassPredictAccumulator::new();
        let mut batch = StatusBatch {
            entries: [StatusFragment::default(); HEX_ID_SLOTS],
            count: 1,
        };
        batch.entries[0] = StatusFragment {
            sat_hex_id: 5,
            dcs_id: 5,
            downlink_status: DownlinkStatus::OnA3,
            uplink_status: UplinkStatus::default(),
        };
        acc.ingest(DecodedFragment::Status(batch));
        acc.ingest(DecodedFragment::Orbit(OrbitFragment {
            sat_hex_id: 5,
            dcs_id: 5,
            bulletin: BulletinTimestamp {
                year: 2026,
                month: 3,
                day: 4,
                hour: 1,
                minute: 2,
                second: 3,
            },
            orbit: OrbitalElements::default(),
        }));
        let db = acc.finalize();
        assert_eq!(db.num_records, 1);
        assert_eq!(db.records[0].sat_hex_id, 5);
        assert_eq!(db.records[0].bulletin.year, 2026);
    }

    #[test]
    fn day_of_year_converts_to_calendar_month_day() {
        assert_eq!(day_of_year_to_month_day(1), (1, 1));
        assert_eq!(day_of_year_to_month_day(32), (2, 1));
        assert_eq!(day_of_year_to_month_day(365), (12, 31));
    }

    /// Orbit-parameter body decode is exercised against a hand-built
    /// bitstream rather than a captured packet (no orbit-parameter vector
    /// is given in spec.md), checking the scale/base arithmetic only.
    #[test]
    fn orbit_params_body_applies_type_a_bases() {
        use crate::bitstream::BitWriter;

        let mut w = BitWriter::new();
        w.push_bits(0xB, 4); // sat_hex_id
        w.push_bits(0, 2); // bulletin-type tag
        w.push_bits(0x26, 8); // BCD year 26
        w.push_bits(0x100, 12); // BCD day-of-year 100
        w.push_bits(0x12, 8); // BCD hour 12
        w.push_bits(0x30, 8); // BCD minute 30
        w.push_bits(0x00, 8); // BCD second 00
        w.push_bits(0, 19); // longitude raw
        w.push_bits(0, 10); // drift raw
        w.push_bits(0, 14); // period raw
        w.push_bits(0, 19); // sma raw
        w.push_bits(0, 8); // decay raw
        w.push_bits(0, 16); // inclination raw
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes, bytes.len() * 8);
        let fragment = decode_orbit_params(&mut r, 0xB, true);
        assert_eq!(fragment.sat_hex_id, 0xB);
        assert_eq!(fragment.bulletin.year, 2026);
        assert_eq!(fragment.bulletin.day, 10); // day-of-year 100 -> Apr 10
        assert_eq!(fragment.orbit.semi_major_axis_km, 7000.0);
        assert_eq!(fragment.orbit.inclination_deg, 97.0);
        assert_eq!(fragment.orbit.ascending_node_drift_deg_per_orbit, -26.0);
        assert_eq!(fragment.orbit.orbit_period_min, 95.0);
    }
}
