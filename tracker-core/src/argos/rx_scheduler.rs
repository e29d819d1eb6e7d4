//! Argos RX window scheduling (spec §4.6), grounded directly on
//! `argos_rx_service.cpp`'s `ArgosRxScheduler::schedule`: raise the
//! earliest-schedule floor to both the next AOP-refresh deadline and "now",
//! search `[earliest, earliest + 1 day]` for the first satellite pass with
//! the downlink on and the uplink off, and return `SCHEDULE_DISABLED` if no
//! location is known yet or no window in the search range leaves at least
//! [`ARGOS_RX_MARGIN_SECS`] of margin before the pass ends.

use crate::argos::radio::ArticMode;
use crate::passpredict::{BasePassPredict, DefaultPrepassGeometry, PassSearchParams, PrepassGeometry};

pub const SCHEDULE_DISABLED: u32 = u32::MAX;
const SECONDS_PER_DAY: i64 = 86_400;
const ARGOS_RX_MARGIN_SECS: i64 = 0;

/// The result of a successful RX schedule: relative delay in milliseconds,
/// the mode to receive on, and how long the window stays open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RxSchedule {
    pub delay_ms: u32,
    pub mode: ArticMode,
    pub timeout_ms: u32,
}

pub struct RxScheduler {
    earliest_schedule: i64,
    location: Option<(f64, f64)>,
}

impl Default for RxScheduler {
    fn default() -> Self {
        RxScheduler {
            earliest_schedule: 0,
            location: None,
        }
    }
}

impl RxScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_earliest_schedule(&mut self, t_unix: i64) {
        if t_unix > self.earliest_schedule {
            self.earliest_schedule = t_unix;
        }
    }

    pub fn set_location(&mut self, longitude: f64, latitude: f64) {
        self.location = Some((longitude, latitude));
    }

    /// Mirrors `ArgosRxScheduler::schedule`: the two `set_earliest_schedule`
    /// calls (AOP refresh deadline, then "now") happen in this order so
    /// either one can be the binding floor depending on which is later.
    pub fn schedule(
        &mut self,
        pass_predict: &BasePassPredict,
        search: &PassSearchParams,
        last_aop_update_unix: i64,
        aop_update_period_days: i64,
        now_unix: i64,
    ) -> Option<RxSchedule> {
        if self.location.is_none() {
            return None;
        }

        self.set_earliest_schedule(last_aop_update_unix + SECONDS_PER_DAY * aop_update_period_days);
        self.set_earliest_schedule(now_unix);

        let start_time = self.earliest_schedule;
        let stop_time = start_time + SECONDS_PER_DAY;
        let (lon, lat) = self.location.unwrap();
        let geometry = DefaultPrepassGeometry;

        for record in pass_predict.as_slice() {
            if !record.downlink_status.is_on() {
                continue;
            }
            if let Some(window) = geometry.next_pass(&record.orbit, lon, lat, start_time, stop_time, search) {
                let start = window.start_unix.max(start_time);
                let end = window.end_unix;
                if start + ARGOS_RX_MARGIN_SECS < end {
                    return Some(RxSchedule {
                        delay_ms: ((start - now_unix).max(0) * 1000) as u32,
                        mode: ArticMode::A3,
                        timeout_ms: ((end - start) * 1000) as u32,
                    });
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_disabled_without_a_known_location() {
        let mut sched = RxScheduler::new();
        let pass_predict = BasePassPredict::new();
        let params = PassSearchParams {
            min_elevation_deg: 5.0,
            max_elevation_deg: 90.0,
            min_duration_secs: 60,
            max_passes: 1,
            linear_margin_secs: 0,
            comp_step_secs: 30,
        };
        assert!(sched.schedule(&pass_predict, &params, 0, 1, 0).is_none());
    }

    #[test]
    fn downlink_on_satellite_is_schedulable_even_with_uplink_also_on() {
        use crate::passpredict::{AopSatelliteEntry, DownlinkStatus, OrbitalElements, UplinkStatus};

        let mut sched = RxScheduler::new();
        sched.set_location(0.0, 0.0);
        let mut pass_predict = BasePassPredict::new();
        pass_predict.records[0] = AopSatelliteEntry {
            sat_hex_id: 3,
            dcs_id: 1,
            downlink_status: DownlinkStatus::OnA3,
            uplink_status: UplinkStatus::OnA3,
            bulletin: Default::default(),
            orbit: OrbitalElements {
                semi_major_axis_km: 7200.0,
                inclination_deg: 98.7,
                ascending_node_longitude_deg: 0.0,
                ascending_node_drift_deg_per_orbit: -0.2,
                orbit_period_min: 101.3,
                semi_major_axis_drift_m_per_day: 0.0,
            },
        };
        pass_predict.num_records = 1;
        let params = PassSearchParams {
            min_elevation_deg: 15.0,
            max_elevation_deg: 90.0,
            min_duration_secs: 30,
            max_passes: 10,
            linear_margin_secs: 0,
            comp_step_secs: 30,
        };

        assert!(sched
            .schedule(&pass_predict, &params, 0, 1, 1_652_100_787)
            .is_some());
    }

    #[test]
    fn earliest_schedule_picks_up_the_later_of_aop_deadline_and_now() {
        let mut sched = RxScheduler::new();
        sched.set_location(2.35, 48.85);
        let pass_predict = BasePassPredict::new();
        let params = PassSearchParams {
            min_elevation_deg: 5.0,
            max_elevation_deg: 90.0,
            min_duration_secs: 60,
            max_passes: 1,
            linear_margin_secs: 0,
            comp_step_secs: 30,
        };
        // No records in the database, so no pass will ever be found, but the
        // earliest-schedule floor should still be raised to the AOP deadline.
        assert!(sched.schedule(&pass_predict, &params, 1_000_000, 1, 1_000_000).is_none());
        assert_eq!(sched.earliest_schedule, 1_000_000 + SECONDS_PER_DAY);
    }
}
