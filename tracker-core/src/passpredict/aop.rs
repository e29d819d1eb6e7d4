//! The AOP (Argos Orbitography Parameters) database (spec §3 "Pass-predict
//! database"), grounded on `argos_rx_service.cpp`'s `BasePassPredict`/
//! `AopSatelliteEntry` (dense array, insertion order, no hash table —
//! spec §9 "AOP database capacity is small").

/// At most this many distinct satellites are tracked at once.
pub const MAX_AOP_SATELLITE_ENTRIES: usize = 8;

/// Downlink operating status, 2 bits on a type-A constellation-status
/// entry, 1 bit on type-B (spec §4.4 addressee routing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownlinkStatus {
    #[default]
    Off,
    OnA2,
    OnA3,
    OnA4,
}

impl DownlinkStatus {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => DownlinkStatus::Off,
            1 => DownlinkStatus::OnA2,
            2 => DownlinkStatus::OnA3,
            _ => DownlinkStatus::OnA4,
        }
    }

    pub fn to_bits(self) -> u8 {
        match self {
            DownlinkStatus::Off => 0,
            DownlinkStatus::OnA2 => 1,
            DownlinkStatus::OnA3 => 2,
            DownlinkStatus::OnA4 => 3,
        }
    }

    pub fn is_on(self) -> bool {
        !matches!(self, DownlinkStatus::Off)
    }
}

/// Uplink operating status (spec §4.4). Satellites 5 and 8 report uplink
/// state on a 2-bit A2-only scale; every other satellite reports on a
/// 3-value A3/Neo/A4 scale — `from_bits` takes the satellite's hex ID to
/// pick the right table, mirroring `convert_ul_operating_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UplinkStatus {
    #[default]
    Off,
    OnA2,
    OnA3,
    OnNeo,
    OnA4,
}

impl UplinkStatus {
    pub fn from_bits(bits: u8, sat_hex_id: u8) -> Self {
        if sat_hex_id == 5 || sat_hex_id == 8 {
            match bits {
                0 | 1 | 2 => UplinkStatus::OnA2,
                _ => UplinkStatus::Off,
            }
        } else {
            match bits {
                0 => UplinkStatus::OnA3,
                1 => UplinkStatus::OnNeo,
                2 => UplinkStatus::OnA4,
                _ => UplinkStatus::Off,
            }
        }
    }

    pub fn is_on(self) -> bool {
        !matches!(self, UplinkStatus::Off)
    }
}

/// A bulletin timestamp (spec §4.4 "Timestamp decode"). `year == 0` means
/// "no bulletin", matching the original's use of a zero year as the
/// empty/unset sentinel in the merge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulletinTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl BulletinTimestamp {
    pub fn is_empty(&self) -> bool {
        self.year == 0
    }
}

/// Orbital elements for one satellite (spec §3: "six orbital scalars").
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitalElements {
    pub semi_major_axis_km: f64,
    pub inclination_deg: f64,
    pub ascending_node_longitude_deg: f64,
    pub ascending_node_drift_deg_per_orbit: f64,
    pub orbit_period_min: f64,
    pub semi_major_axis_drift_m_per_day: f64,
}

/// One satellite's AOP record (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AopSatelliteEntry {
    /// 4-bit satellite hex ID.
    pub sat_hex_id: u8,
    /// 4-bit Data Collection System group tag.
    pub dcs_id: u8,
    pub downlink_status: DownlinkStatus,
    pub uplink_status: UplinkStatus,
    pub bulletin: BulletinTimestamp,
    pub orbit: OrbitalElements,
}

impl AopSatelliteEntry {
    pub fn is_off(&self) -> bool {
        !self.downlink_status.is_on() && !self.uplink_status.is_on()
    }
}

/// The AOP database: a dense, insertion-ordered array of at most
/// [`MAX_AOP_SATELLITE_ENTRIES`] records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePassPredict {
    pub records: [AopSatelliteEntry; MAX_AOP_SATELLITE_ENTRIES],
    pub num_records: usize,
}

impl Default for BasePassPredict {
    fn default() -> Self {
        BasePassPredict {
            records: [AopSatelliteEntry::default(); MAX_AOP_SATELLITE_ENTRIES],
            num_records: 0,
        }
    }
}

impl BasePassPredict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[AopSatelliteEntry] {
        &self.records[..self.num_records]
    }

    pub fn find(&self, sat_hex_id: u8) -> Option<&AopSatelliteEntry> {
        self.as_slice().iter().find(|r| r.sat_hex_id == sat_hex_id)
    }

    /// Flat little-endian encoding of the database for `pass_predict.dat`
    /// (spec §4.7 leaves this on-disk shape to the pass-prediction module;
    /// `ConfigurationStore` itself only shuttles the bytes).
    #[cfg(feature = "alloc")]
    pub fn to_bytes(&self) -> alloc::vec::Vec<u8> {
        let mut out = alloc::vec::Vec::with_capacity(1 + self.num_records * RECORD_BYTES);
        out.push(self.num_records as u8);
        for r in self.as_slice() {
            out.push(r.sat_hex_id);
            out.push(r.dcs_id);
            out.push(r.downlink_status.to_bits());
            out.push(match r.uplink_status {
                UplinkStatus::Off => 0,
                UplinkStatus::OnA2 => 1,
                UplinkStatus::OnA3 => 2,
                UplinkStatus::OnNeo => 3,
                UplinkStatus::OnA4 => 4,
            });
            out.extend_from_slice(&r.bulletin.year.to_le_bytes());
            out.push(r.bulletin.month);
            out.push(r.bulletin.day);
            out.push(r.bulletin.hour);
            out.push(r.bulletin.minute);
            out.push(r.bulletin.second);
            out.extend_from_slice(&r.orbit.semi_major_axis_km.to_le_bytes());
            out.extend_from_slice(&r.orbit.inclination_deg.to_le_bytes());
            out.extend_from_slice(&r.orbit.ascending_node_longitude_deg.to_le_bytes());
            out.extend_from_slice(&r.orbit.ascending_node_drift_deg_per_orbit.to_le_bytes());
            out.extend_from_slice(&r.orbit.orbit_period_min.to_le_bytes());
            out.extend_from_slice(&r.orbit.semi_major_axis_drift_m_per_day.to_le_bytes());
        }
        out
    }

    /// Inverse of [`Self::to_bytes`]. A malformed or truncated buffer
    /// yields an empty database rather than an error, matching this
    /// module's general fault-tolerant read posture (spec §8 scenario 6's
    /// sibling behaviour for the parameter store).
    #[cfg(feature = "alloc")]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut db = Self::new();
        let Some(&count) = bytes.first() else {
            return db;
        };
        let mut pos = 1usize;
        for _ in 0..(count as usize).min(MAX_AOP_SATELLITE_ENTRIES) {
            if pos + RECORD_BYTES > bytes.len() {
                break;
            }
            let b = &bytes[pos..pos + RECORD_BYTES];
            pos += RECORD_BYTES;
            let uplink = match b[3] {
                1 => UplinkStatus::OnA2,
                2 => UplinkStatus::OnA3,
                3 => UplinkStatus::OnNeo,
                4 => UplinkStatus::OnA4,
                _ => UplinkStatus::Off,
            };
            let entry = AopSatelliteEntry {
                sat_hex_id: b[0],
                dcs_id: b[1],
                downlink_status: DownlinkStatus::from_bits(b[2]),
                uplink_status: uplink,
                bulletin: BulletinTimestamp {
                    year: u16::from_le_bytes([b[4], b[5]]),
                    month: b[6],
                    day: b[7],
                    hour: b[8],
                    minute: b[9],
                    second: b[10],
                },
                orbit: OrbitalElements {
                    semi_major_axis_km: f64::from_le_bytes(b[11..19].try_into().unwrap()),
                    inclination_deg: f64::from_le_bytes(b[19..27].try_into().unwrap()),
                    ascending_node_longitude_deg: f64::from_le_bytes(b[27..35].try_into().unwrap()),
                    ascending_node_drift_deg_per_orbit: f64::from_le_bytes(b[35..43].try_into().unwrap()),
                    orbit_period_min: f64::from_le_bytes(b[43..51].try_into().unwrap()),
                    semi_major_axis_drift_m_per_day: f64::from_le_bytes(b[51..59].try_into().unwrap()),
                },
            };
            db.records[db.num_records] = entry;
            db.num_records += 1;
        }
        db
    }
}

#[cfg(feature = "alloc")]
const RECORD_BYTES: usize = 11 + 6 * 8;
