//! GPS fix data model (spec §3, "GPS log entry"). Produced by the GNSS
//! driver (out of scope here), consumed by the TX service and the
//! configuration store.

/// Fix quality as reported by the GNSS receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixType {
    NoFix,
    Fix2D,
    Fix3D,
}

/// A single timestamped GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsLogEntry {
    /// Longitude, degrees, positive east.
    pub longitude: f64,
    /// Latitude, degrees, positive north.
    pub latitude: f64,
    /// Height above mean sea level, millimetres.
    pub height_msl_mm: i32,
    /// Ground speed, millimetres/second.
    pub ground_speed_mm_s: u32,
    pub fix_type: FixType,
    /// Horizontal accuracy, millimetres.
    pub h_acc_mm: u32,
    /// Horizontal dilution of precision, scaled by 100.
    pub hdop_scaled: u16,
    /// Battery voltage at time of fix, millivolts.
    pub battery_voltage_mv: u32,
    /// Heading over ground, degrees.
    pub heading_deg: f64,
    /// Unix time this fix was scheduled for.
    pub scheduled_for_unix: i64,
    /// Unix time this fix was actually acquired.
    pub acquired_at_unix: i64,
}

impl GpsLogEntry {
    /// A fix is usable for positioning purposes when it carries at least a
    /// 2D solution.
    pub fn is_valid(&self) -> bool {
        !matches!(self.fix_type, FixType::NoFix)
    }
}
