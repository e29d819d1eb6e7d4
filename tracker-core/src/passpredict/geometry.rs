//! Pass-prediction geometry (spec §9 design note: "treat orbit propagation
//! as an external dependency with a pure function signature"). The real
//! firmware links the CNES/CLS PREVIPASS library; this crate exposes the
//! same call shape behind a trait and ships a documented, non-bit-exact
//! approximation so the scheduler and tests have something to run against.
//!
//! Grounded on `argos_rx_service.cpp`'s call to
//! `PREVIPASS_compute_next_pass_with_status` for the trait's signature
//! (location + search window + elevation/duration/pass-count/margin/step
//! parameters in, next pass epoch + duration out).

use crate::passpredict::aop::OrbitalElements;

/// A satellite pass window: `(start_unix, end_unix)`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassWindow {
    pub start_unix: i64,
    pub end_unix: i64,
}

impl PassWindow {
    pub fn duration_secs(&self) -> i64 {
        self.end_unix - self.start_unix
    }
}

/// Search parameters for the next overhead pass (spec §4.6 "pass
/// prediction" parameters: `PP_MIN_ELEVATION`, `PP_MAX_ELEVATION`,
/// `PP_MIN_DURATION`, `PP_MAX_PASSES`, `PP_LINEAR_MARGIN`, `PP_COMP_STEP`).
#[derive(Debug, Clone, Copy)]
pub struct PassSearchParams {
    pub min_elevation_deg: f64,
    pub max_elevation_deg: f64,
    pub min_duration_secs: i64,
    pub max_passes: u32,
    pub linear_margin_secs: i64,
    pub comp_step_secs: i64,
}

/// Abstracts orbit propagation and pass search so the scheduler can be
/// tested without a bit-exact SGP4/PREVIPASS implementation.
pub trait PrepassGeometry {
    /// Finds the next pass of `orbit` overhead of `(longitude, latitude)`
    /// within `[window_start, window_end]` satisfying `params`. Returns
    /// `None` if no qualifying pass exists in the window.
    fn next_pass(
        &self,
        orbit: &OrbitalElements,
        longitude: f64,
        latitude: f64,
        window_start: i64,
        window_end: i64,
        params: &PassSearchParams,
    ) -> Option<PassWindow>;
}

/// A simplified Keplerian propagator: treats the satellite's ground track
/// as a great circle inclined at `orbit.inclination_deg`, precessing at
/// `orbit.ascending_node_drift_deg_per_orbit` per revolution, and searches
/// for the interval where the topocentric elevation of that ground track
/// from `(longitude, latitude)` exceeds `min_elevation_deg`.
///
/// This is explicitly NOT bit-exact with CNES PREVIPASS (see SPEC_FULL.md
/// §9); it exists so the RX/TX schedulers have a real, testable
/// implementation to run against rather than a stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrepassGeometry;

const EARTH_RADIUS_KM: f64 = 6371.0;

impl DefaultPrepassGeometry {
    /// Elevation (degrees) of a satellite at `orbit.semi_major_axis_km`
    /// altitude above a ground track point, as seen from `(longitude,
    /// latitude)`, given the great-circle angular separation
    /// `central_angle_deg` between the two.
    fn elevation_deg(&self, altitude_km: f64, central_angle_deg: f64) -> f64 {
        let psi = central_angle_deg.to_radians();
        let r_sat = EARTH_RADIUS_KM + altitude_km;
        let numerator = (r_sat / EARTH_RADIUS_KM) * psi.cos() - 1.0;
        let denominator = ((r_sat / EARTH_RADIUS_KM).powi(2) - 2.0 * (r_sat / EARTH_RADIUS_KM) * psi.cos() + 1.0).sqrt();
        if denominator == 0.0 {
            return 90.0;
        }
        (numerator / denominator).atan().to_degrees()
    }

    /// Ground-track sub-satellite point at time `t`, given the orbit's
    /// period and a starting ascending-node longitude that drifts linearly.
    fn subsatellite_point(&self, orbit: &OrbitalElements, t: i64) -> (f64, f64) {
        let period_secs = (orbit.orbit_period_min * 60.0).max(1.0);
        let phase = ((t as f64 % period_secs) / period_secs) * 360.0;
        let inclination = orbit.inclination_deg;
        let lat = inclination * (phase.to_radians()).sin();
        let drift_per_sec = orbit.ascending_node_drift_deg_per_orbit / period_secs;
        let lon = orbit.ascending_node_longitude_deg + phase + drift_per_sec * t as f64;
        (normalize_deg(lon), lat.clamp(-90.0, 90.0))
    }
}

fn normalize_deg(mut deg: f64) -> f64 {
    deg %= 360.0;
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

fn great_circle_deg(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    crate::config::haversine_metres(lon1, lat1, lon2, lat2) / (EARTH_RADIUS_KM * 1000.0)
        * (180.0 / core::f64::consts::PI)
}

impl PrepassGeometry for DefaultPrepassGeometry {
    fn next_pass(
        &self,
        orbit: &OrbitalElements,
        longitude: f64,
        latitude: f64,
        window_start: i64,
        window_end: i64,
        params: &PassSearchParams,
    ) -> Option<PassWindow> {
        let step = params.comp_step_secs.max(1);
        let mut t = window_start;
        let mut pass_start: Option<i64> = None;

        while t <= window_end {
            let (sub_lon, sub_lat) = self.subsatellite_point(orbit, t);
            let central_angle = great_circle_deg(longitude, latitude, sub_lon, sub_lat);
            let elevation = self.elevation_deg(orbit.semi_major_axis_km - EARTH_RADIUS_KM, central_angle);

            let visible = elevation >= params.min_elevation_deg && elevation <= params.max_elevation_deg;

            match (visible, pass_start) {
                (true, None) => pass_start = Some(t),
                (false, Some(start)) => {
                    let end = t - step + params.linear_margin_secs;
                    let window = PassWindow {
                        start_unix: start,
                        end_unix: end,
                    };
                    if window.duration_secs() >= params.min_duration_secs {
                        return Some(window);
                    }
                    pass_start = None;
                }
                _ => {}
            }
            t += step;
        }

        pass_start.map(|start| PassWindow {
            start_unix: start,
            end_unix: window_end,
        })
        .filter(|w| w.duration_secs() >= params.min_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_orbit() -> OrbitalElements {
        OrbitalElements {
            semi_major_axis_km: 7200.0,
            inclination_deg: 98.0,
            ascending_node_longitude_deg: 0.0,
            ascending_node_drift_deg_per_orbit: -25.0,
            orbit_period_min: 101.0,
            semi_major_axis_drift_m_per_day: 0.0,
        }
    }

    #[test]
    fn finds_some_pass_within_a_24_hour_window() {
        let geom = DefaultPrepassGeometry;
        let params = PassSearchParams {
            min_elevation_deg: 5.0,
            max_elevation_deg: 90.0,
            min_duration_secs: 60,
            max_passes: 1,
            linear_margin_secs: 30,
            comp_step_secs: 30,
        };
        let pass = geom.next_pass(&sample_orbit(), 2.35, 48.85, 0, 86_400, &params);
        assert!(pass.is_some());
        let pass = pass.unwrap();
        assert!(pass.duration_secs() >= params.min_duration_secs);
    }

    #[test]
    fn no_pass_found_outside_the_window() {
        let geom = DefaultPrepassGeometry;
        let params = PassSearchParams {
            min_elevation_deg: 89.9,
            max_elevation_deg: 90.0,
            min_duration_secs: 3600,
            max_passes: 1,
            linear_margin_secs: 0,
            comp_step_secs: 30,
        };
        let pass = geom.next_pass(&sample_orbit(), 2.35, 48.85, 0, 600, &params);
        assert!(pass.is_none());
    }
}
