//! Argos TX scheduling: legacy fixed-period, duty-cycle-gated and
//! pass-prediction strategies (spec §4.5).
//!
//! Grounded on `argos_tx_service.hpp`'s `ArgosTxScheduler` — the field
//! names (`m_last_schedule_abs`/`m_curr_schedule_abs`/`m_earliest_schedule`),
//! `DUTYCYCLE_24HRS`, `INVALID_SCHEDULE` and the `[-5000, 5000]` ms jitter
//! bound are declared there, but `schedule_legacy`/`schedule_duty_cycle`/
//! `schedule_prepass`'s bodies are not in the filtered source, so the
//! control flow below is built from spec.md §4.5's prose plus those
//! constants, not transcribed from a read method body.

use crate::argos::radio::ArticMode;
use crate::passpredict::{BasePassPredict, DefaultPrepassGeometry, PassSearchParams, PrepassGeometry};

pub const DUTYCYCLE_24HRS: u32 = 0xFF_FFFF;
pub const INVALID_SCHEDULE: u32 = u32::MAX;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// A small xorshift generator (spec.md's "bounded integer, not a general
/// PRNG surface" note in DESIGN.md): seeded once via [`TxScheduler::reset`],
/// matching the original's `std::mt19937` used only for jitter.
struct Xorshift32(u32);

impl Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

fn compute_random_jitter(rng: &mut Xorshift32, jitter_en: bool, min: i32, max: i32) -> i32 {
    if !jitter_en || max <= min {
        return 0;
    }
    let span = (max - min) as u32 + 1;
    min + (rng.next_u32() % span) as i32
}

/// Whether `time_ms` falls inside the duty-cycle bitmask's "on" window:
/// the low 24 bits of `duty_cycle` are a 24-hour bitmap, one bit per hour,
/// `1` meaning "transmit enabled this hour" (spec §4.5 "duty cycle mode").
/// Hour 0 is the mask's most significant bit (bit 23), counting down as
/// the hour of day increases, per spec §8 scenario 2 (`0xAAAAAA` enables
/// hour 0 and disables hour 1).
pub fn is_in_duty_cycle(time_ms: u64, duty_cycle: u32) -> bool {
    if duty_cycle == DUTYCYCLE_24HRS {
        return true;
    }
    let hour_of_day = ((time_ms / 1000) % SECONDS_PER_DAY as u64) / SECONDS_PER_HOUR as u64;
    (duty_cycle >> (23 - hour_of_day)) & 1 != 0
}

/// Argos TX scheduling state: the monotonic `earliest_schedule` floor plus
/// the last/current computed absolute schedule times, seeded jitter and
/// the last known GNSS location (used only by the prepass strategy).
pub struct TxScheduler {
    last_schedule_abs: Option<i64>,
    curr_schedule_abs: Option<i64>,
    earliest_schedule: i64,
    rng: Xorshift32,
    location: Option<(f64, f64)>,
}

impl Default for TxScheduler {
    fn default() -> Self {
        TxScheduler {
            last_schedule_abs: None,
            curr_schedule_abs: None,
            earliest_schedule: 0,
            rng: Xorshift32(0x9E3779B9),
            location: None,
        }
    }
}

impl TxScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, seed: u32) {
        self.rng = Xorshift32(seed | 1);
    }

    /// Raises the earliest-permitted schedule time; never lowers it
    /// (`ArgosTxScheduler::set_earliest_schedule`).
    pub fn set_earliest_schedule(&mut self, t_unix: i64) {
        if t_unix > self.earliest_schedule {
            self.earliest_schedule = t_unix;
        }
    }

    pub fn set_last_location(&mut self, longitude: f64, latitude: f64) {
        self.location = Some((longitude, latitude));
    }

    pub fn notify_tx_complete(&mut self) {
        self.last_schedule_abs = self.curr_schedule_abs;
    }

    pub fn get_last_schedule(&self) -> Option<i64> {
        self.last_schedule_abs
    }

    fn schedule_periodic(&mut self, now_unix: i64, period_secs: i64, jitter_en: bool, duty_cycle: u32) -> u32 {
        if period_secs <= 0 {
            return INVALID_SCHEDULE;
        }
        // The next periodic slot is `period_secs` after the last completed
        // transmission, or `now` if none has happened yet (spec §8
        // scenario 1).
        let next_periodic = match self.last_schedule_abs {
            Some(last) => last + period_secs,
            None => now_unix,
        };
        let mut candidate = next_periodic.max(self.earliest_schedule).max(now_unix);
        let jitter = compute_random_jitter(&mut self.rng, jitter_en, -5000, 5000) as i64;
        let mut candidate_ms = candidate * 1000 + jitter;
        if candidate_ms < now_unix * 1000 {
            candidate_ms = now_unix * 1000;
        }
        candidate = candidate_ms / 1000;

        // Advance in `period_secs` steps, rechecking the hour-of-day bit
        // each time, until the duty cycle admits the candidate (spec
        // §4.5). The step guard only needs to cover one full day's worth
        // of steps; smaller periods than an hour need proportionally more
        // of them to reach an enabled hour.
        let max_steps = (SECONDS_PER_DAY / period_secs.max(1)) as u32 + 1;
        let mut guard = 0;
        while !is_in_duty_cycle((candidate * 1000) as u64, duty_cycle) && guard < max_steps {
            candidate += period_secs;
            guard += 1;
        }

        self.curr_schedule_abs = Some(candidate);
        let delay_ms = (candidate - now_unix).max(0) * 1000;
        delay_ms as u32
    }

    /// Fixed-period transmission, gated by the duty-cycle bitmask (spec
    /// §4.5 "legacy mode").
    pub fn schedule_legacy(&mut self, tr_nom_secs: u32, jitter_en: bool, duty_cycle: u32, now_unix: i64) -> u32 {
        self.schedule_periodic(now_unix, tr_nom_secs as i64, jitter_en, duty_cycle)
    }

    /// Identical cadence to legacy mode; kept as a distinct entry point
    /// because the original exposes two separate methods with the same
    /// periodic-retry shape but different config fields upstream.
    pub fn schedule_duty_cycle(&mut self, tr_nom_secs: u32, jitter_en: bool, duty_cycle: u32, now_unix: i64) -> u32 {
        self.schedule_periodic(now_unix, tr_nom_secs as i64, jitter_en, duty_cycle)
    }

    /// Schedules the next transmission against the AOP database's
    /// predicted satellite passes (spec §4.5 "pass-prediction mode"):
    /// finds the next pass of any known-active satellite overhead the
    /// last known GNSS fix and schedules for its start.
    pub fn schedule_prepass(
        &mut self,
        pass_predict: &BasePassPredict,
        search: &PassSearchParams,
        now_unix: i64,
    ) -> (u32, Option<ArticMode>) {
        let Some((lon, lat)) = self.location else {
            return (INVALID_SCHEDULE, None);
        };

        let start_time = self.earliest_schedule.max(now_unix);
        let stop_time = start_time + SECONDS_PER_DAY;
        let geometry = DefaultPrepassGeometry;

        let mut best: Option<i64> = None;
        for record in pass_predict.as_slice() {
            if !record.downlink_status.is_on() {
                continue;
            }
            if let Some(window) = geometry.next_pass(&record.orbit, lon, lat, start_time, stop_time, search) {
                let start = window.start_unix.max(start_time);
                best = Some(best.map_or(start, |b: i64| b.min(start)));
            }
        }

        match best {
            Some(start) => {
                self.curr_schedule_abs = Some(start);
                ((start - now_unix).max(0) as u32 * 1000, Some(ArticMode::A3))
            }
            None => (INVALID_SCHEDULE, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_duty_cycle_mask_is_always_on() {
        assert!(is_in_duty_cycle(0, DUTYCYCLE_24HRS));
        assert!(is_in_duty_cycle(23 * 3_600_000, DUTYCYCLE_24HRS));
    }

    #[test]
    fn duty_cycle_respects_the_hour_bitmask() {
        // Only hour 0 enabled (bit 23, the mask's MSB).
        assert!(is_in_duty_cycle(0, 1 << 23));
        assert!(!is_in_duty_cycle(3_600_000, 1 << 23));
    }

    #[test]
    fn duty_cycle_scenario_hour_zero_on_hour_one_off() {
        // spec §8 scenario 2: 0xAAAAAA enables hour 0, disables hour 1.
        assert!(is_in_duty_cycle(0, 0xAAAAAA));
        assert!(!is_in_duty_cycle(3_600_000, 0xAAAAAA));
        assert!(is_in_duty_cycle(2 * 3_600_000, 0xAAAAAA));
    }

    #[test]
    fn earliest_schedule_is_monotonic() {
        let mut sched = TxScheduler::new();
        sched.set_earliest_schedule(1000);
        sched.set_earliest_schedule(500);
        assert_eq!(sched.earliest_schedule, 1000);
        sched.set_earliest_schedule(2000);
        assert_eq!(sched.earliest_schedule, 2000);
    }

    #[test]
    fn legacy_schedule_advances_from_now_when_earliest_is_unset() {
        let mut sched = TxScheduler::new();
        let delay = sched.schedule_legacy(60, false, DUTYCYCLE_24HRS, 1_000_000);
        assert_eq!(delay, 0);
    }

    #[test]
    fn scenario_1_legacy_tr_nom_60_no_jitter() {
        let mut sched = TxScheduler::new();
        assert_eq!(sched.schedule_legacy(60, false, DUTYCYCLE_24HRS, 0), 0);
        sched.notify_tx_complete();

        let mut sched_at_60 = TxScheduler::new();
        sched_at_60.schedule_legacy(60, false, DUTYCYCLE_24HRS, 0);
        sched_at_60.notify_tx_complete();
        assert_eq!(sched_at_60.schedule_legacy(60, false, DUTYCYCLE_24HRS, 60), 0);

        let mut sched_at_35 = TxScheduler::new();
        sched_at_35.schedule_legacy(60, false, DUTYCYCLE_24HRS, 0);
        sched_at_35.notify_tx_complete();
        assert_eq!(sched_at_35.schedule_legacy(60, false, DUTYCYCLE_24HRS, 35), 25_000);
    }

    #[test]
    fn scenario_2_duty_cycle_aaaaaa_tr_nom_3600() {
        let mut sched = TxScheduler::new();
        assert_eq!(sched.schedule_legacy(3600, false, 0xAAAAAA, 0), 0);
        sched.notify_tx_complete();
        assert_eq!(sched.schedule_legacy(3600, false, 0xAAAAAA, 3600), 3_600_000);
    }

    #[test]
    fn prepass_schedule_is_disabled_without_a_known_location() {
        let mut sched = TxScheduler::new();
        let pass_predict = BasePassPredict::new();
        let params = PassSearchParams {
            min_elevation_deg: 5.0,
            max_elevation_deg: 90.0,
            min_duration_secs: 60,
            max_passes: 1,
            linear_margin_secs: 0,
            comp_step_secs: 30,
        };
        let (delay, mode) = sched.schedule_prepass(&pass_predict, &params, 0);
        assert_eq!(delay, INVALID_SCHEDULE);
        assert!(mode.is_none());
    }
}
