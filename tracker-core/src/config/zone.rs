//! Geofence zones and their per-zone shadow profiles (spec §3 "Zone",
//! §4.7), grounded on `core/configuration/config_store_fs.hpp`'s
//! `read_zone`/`write_zone` pair and the original's `BaseZone` record.

/// The one zone shape the original supports; kept as an enum so a future
/// polygon zone slots in without breaking the on-disk record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneType {
    Circle,
}

/// Per-zone overrides applied to the nominal Argos/GNSS profile while the
/// tag is judged to be inside the zone (spec §3 "a per-zone shadow profile
/// for Argos and GPS parameters").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowProfile {
    pub argos_mode: u32,
    pub argos_power: u32,
    pub tr_nom: u32,
    pub duty_cycle: u32,
    pub gnss_en: bool,
    pub dloc_arg_nom: u32,
}

/// A geofence zone (spec §3 "Zone"). Coordinates are in degrees, radius in
/// metres, matching the original's `BaseZone` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub zone_type: ZoneType,
    pub zone_id: u16,
    /// Unix seconds; the zone has no effect before this instant (spec §3
    /// "Zone ... becomes active at an activation date").
    pub activation_time: i64,
    pub centre_longitude: f64,
    pub centre_latitude: f64,
    pub radius_metres: f64,
    /// `true` once the zone is a known out-of-zone exclusion rather than an
    /// inclusion area (spec §4.7 "zone-exclusion detection").
    pub is_exclusion: bool,
    pub shadow: ShadowProfile,
}

const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

fn deg_to_rad(deg: f64) -> f64 {
    deg * core::f64::consts::PI / 180.0
}

/// Great-circle distance between two lon/lat points in degrees, using the
/// haversine formula (spec §4.7 is silent on the exact geometry; this is
/// the usual flat-earth-safe choice for km-scale exclusion radii).
pub fn haversine_metres(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (deg_to_rad(lat1), deg_to_rad(lat2));
    let dphi = deg_to_rad(lat2 - lat1);
    let dlambda = deg_to_rad(lon2 - lon1);
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_METRES * c
}

impl Zone {
    /// Whether `(longitude, latitude)` falls inside this zone's circle,
    /// given it is already active at `now_unix`.
    pub fn contains(&self, now_unix: i64, longitude: f64, latitude: f64) -> bool {
        if now_unix < self.activation_time {
            return false;
        }
        let ZoneType::Circle = self.zone_type;
        haversine_metres(self.centre_longitude, self.centre_latitude, longitude, latitude)
            <= self.radius_metres
    }
}
