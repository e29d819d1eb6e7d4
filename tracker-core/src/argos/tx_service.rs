//! The Argos TX service: reacts to GPS fixes and the underwater sensor,
//! drives the TX scheduler, builds the wire frame for the currently active
//! profile and hands it to the radio (spec §4.7).
//!
//! Grounded on `argos_tx_service.hpp`/`.cpp`'s `ArgosTxService` reactive
//! structure: `notify_peer_event`'s GNSS-fix and underwater-sensor
//! branches, `handle_schedule`'s profile-then-build-then-send sequence, and
//! `react(ArticEventTxComplete/DeviceError)`'s counter/bookkeeping/
//! reschedule steps. The per-schedule state machine
//! (`Idle -> Scheduled -> Transmitting -> TxComplete -> Idle`, with a
//! `Deferred` branch on submergence) is spec §4.7's diagram; the original
//! encodes the same shape as a `switch` over an internal enum rather than a
//! named state machine type.

use alloc::vec::Vec;

use crate::argos::radio::{ArticMode, Radio};
use crate::argos::tx_scheduler::{TxScheduler, INVALID_SCHEDULE};
use crate::config::{ActiveProfile, ArgosMode, ConfigurationStore, ParamId, ParamValue};
use crate::event_bus::{EventData, ServiceEvent, ServiceEventKind, ServiceIdentifier};
use crate::gps::GpsLogEntry;
use crate::nvstore::NvStore;
use crate::packet::{
    build_certification_packet, build_doppler_packet, build_long_packet, build_short_packet,
    DepthPile, DeltaTimeLocationTag, FrameFlags, BURST_COUNTER_INFINITE, DEFAULT_MAX_SIZE,
    DOPPLER_PACKET_BITS, LONG_PACKET_BITS, SHORT_PACKET_BITS,
};
use crate::passpredict::{BasePassPredict, PassSearchParams};
use crate::Result;

/// Minimum certification-burst repetition period (spec §4.7: "minimum
/// allowed repetition is 2 s").
const CERT_TX_MIN_REPETITION_SECS: u32 = 2;

/// The radio needs this long powered before a transmission is accurate
/// (spec §6 "TCXO warm-up"). Not one of spec §3's recognised parameters,
/// so it is a fixed constant here rather than a config entry.
const TCXO_WARMUP_SECS: u32 = 5;

/// A built frame ready to hand to the radio: its bytes, significant bit
/// length and the Argos mode to transmit it on.
#[derive(Debug, Clone, PartialEq)]
pub struct TxFrame {
    pub bytes: Vec<u8>,
    pub size_bits: usize,
    pub mode: ArticMode,
}

/// Per-attempt TX state (spec §4.7's diagram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Idle,
    Scheduled,
    Transmitting,
    Deferred,
}

/// The Argos TX service's state: the scheduler, the depth pile of
/// not-yet-exhausted fixes, the current state-machine position and whether
/// the one-shot time-sync burst has already fired.
pub struct TxService {
    scheduler: TxScheduler,
    depth_pile: DepthPile<GpsLogEntry>,
    state: TxState,
    time_sync_burst_sent: bool,
}

impl Default for TxService {
    fn default() -> Self {
        TxService {
            scheduler: TxScheduler::new(),
            depth_pile: DepthPile::new(DEFAULT_MAX_SIZE),
            state: TxState::Idle,
            time_sync_burst_sent: false,
        }
    }
}

impl TxService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// `ArgosTxService::start`: configures the radio for the nominal Argos
    /// frequency and power before the first schedule is ever computed.
    pub fn init(&mut self, store: &ConfigurationStore, radio: &mut dyn Radio) {
        let freq = store.read(ParamId::ArgosFreq).as_float().unwrap_or(401.65);
        radio.set_frequency(freq);
        radio.set_tcxo_warmup_time(TCXO_WARMUP_SECS);
        let profile = store.active_profile(false, 0, None);
        radio.set_tx_power(profile.argos_power);
    }

    /// `ArgosTxService::notify_peer_event`'s GNSS-fix branch: stores the fix
    /// in the depth pile with the active profile's burst count (`0` maps to
    /// the infinite sentinel, spec §4.3), updates the scheduler's last known
    /// location, and — the first time a fix ever arrives with the
    /// time-sync-burst parameter enabled — returns a short packet to
    /// transmit immediately, bypassing the schedule entirely (spec §4.7).
    pub fn notify_gps_fix(
        &mut self,
        store: &ConfigurationStore,
        profile: &ActiveProfile,
        fix: GpsLogEntry,
        tx_counter: u32,
    ) -> Option<TxFrame> {
        self.scheduler.set_last_location(fix.longitude, fix.latitude);

        let burst = store
            .read(ParamId::NtryPerMessage)
            .as_unsigned()
            .unwrap_or(0);
        self.depth_pile.store(fix, if burst == 0 { BURST_COUNTER_INFINITE } else { burst });

        let time_sync_en = store
            .read(ParamId::ArgosTimeSyncBurstEn)
            .as_bool()
            .unwrap_or(false);
        if time_sync_en && !self.time_sync_burst_sent {
            self.time_sync_burst_sent = true;
            let flags = profile_flags(profile, &fix);
            let bytes = build_short_packet(&fix, flags, tx_counter).to_vec();
            return Some(TxFrame {
                bytes,
                size_bits: SHORT_PACKET_BITS,
                mode: ArticMode::A2,
            });
        }
        None
    }

    /// `ArgosTxService::notify_peer_event`'s underwater-sensor branch:
    /// submerging aborts any in-flight transmission and defers scheduling;
    /// surfacing raises the earliest-schedule floor by `DRY_TIME_BEFORE_TX`
    /// (spec §4.7, §4.8's shared deferral rule).
    pub fn notify_underwater_event(
        &mut self,
        event: &ServiceEvent,
        radio: &mut dyn Radio,
        dry_time_before_tx_secs: i64,
        now_unix: i64,
    ) {
        if event.source != ServiceIdentifier::UwDetect || event.kind != ServiceEventKind::LogUpdated {
            return;
        }
        match event.data {
            EventData::Bool(true) => {
                radio.stop_send();
                self.state = TxState::Deferred;
            }
            EventData::Bool(false) => {
                self.scheduler
                    .set_earliest_schedule(now_unix + dry_time_before_tx_secs);
                if self.state == TxState::Deferred {
                    self.state = TxState::Idle;
                }
            }
            _ => {}
        }
    }

    /// Computes the next transmit delay and mode for the active profile
    /// (spec §4.5): legacy and duty-cycle modes share the periodic
    /// scheduler, pass-prediction mode consults the AOP database, and `Off`
    /// disables the service entirely.
    pub fn next_schedule(
        &mut self,
        profile: &ActiveProfile,
        jitter_en: bool,
        pass_predict: &BasePassPredict,
        search: &PassSearchParams,
        now_unix: i64,
    ) -> Option<(u32, ArticMode)> {
        match profile.argos_mode {
            ArgosMode::Off => None,
            ArgosMode::Legacy => {
                let delay = self
                    .scheduler
                    .schedule_legacy(profile.tr_nom, jitter_en, profile.duty_cycle, now_unix);
                if delay == INVALID_SCHEDULE {
                    None
                } else {
                    self.state = TxState::Scheduled;
                    Some((delay, ArticMode::A2))
                }
            }
            ArgosMode::DutyCycle => {
                let delay = self
                    .scheduler
                    .schedule_duty_cycle(profile.tr_nom, jitter_en, profile.duty_cycle, now_unix);
                if delay == INVALID_SCHEDULE {
                    None
                } else {
                    self.state = TxState::Scheduled;
                    Some((delay, ArticMode::A2))
                }
            }
            ArgosMode::PassPrediction => {
                let (delay, mode) = self.scheduler.schedule_prepass(pass_predict, search, now_unix);
                match mode {
                    Some(mode) => {
                        self.state = TxState::Scheduled;
                        Some((delay, mode))
                    }
                    None => None,
                }
            }
        }
    }

    /// Builds the frame for the firing schedule (spec §4.2, §4.7): a
    /// certification payload when certification mode is enabled, otherwise
    /// whatever the depth pile's retrieval policy yields — a doppler packet
    /// when GNSS is disabled for the active profile, a short packet for a
    /// single retrieved fix, or a long packet for 2-4.
    pub fn build_tx_packet(
        &mut self,
        store: &ConfigurationStore,
        profile: &ActiveProfile,
        tx_counter: u32,
        mode: ArticMode,
    ) -> Result<Option<TxFrame>> {
        let cert_en = store.read(ParamId::CertTxEnable).as_bool().unwrap_or(false);
        if cert_en {
            let bytes = match store.read(ParamId::CertTxPayload) {
                ParamValue::Base64(b) => b.clone(),
                _ => Vec::new(),
            };
            let built = build_certification_packet(&bytes)?;
            let size_bits = if built.len() * 8 <= SHORT_PACKET_BITS {
                SHORT_PACKET_BITS
            } else {
                LONG_PACKET_BITS
            };
            return Ok(Some(TxFrame {
                bytes: built,
                size_bits,
                mode: ArticMode::A2,
            }));
        }

        if !profile.gnss_en {
            let battery_mv = store.read(ParamId::BattSoc).as_unsigned().unwrap_or(0);
            let bytes = build_doppler_packet(battery_mv, profile.low_battery, tx_counter).to_vec();
            return Ok(Some(TxFrame {
                bytes,
                size_bits: DOPPLER_PACKET_BITS,
                mode,
            }));
        }

        let depth = if profile.depth_pile == 0 { 1 } else { profile.depth_pile };
        let retrieved = self.depth_pile.retrieve(depth, 4);
        if retrieved.is_empty() {
            return Ok(None);
        }

        if retrieved.len() == 1 {
            let flags = profile_flags(profile, &retrieved[0]);
            let bytes = build_short_packet(&retrieved[0], flags, tx_counter).to_vec();
            return Ok(Some(TxFrame {
                bytes,
                size_bits: SHORT_PACKET_BITS,
                mode,
            }));
        }

        let anchor = &retrieved[0];
        let flags = profile_flags(profile, anchor);
        let tag = delta_time_location_tag(anchor, retrieved.get(retrieved.len() - 1));
        let bytes = build_long_packet(&retrieved, tag, flags, tx_counter)?.to_vec();
        Ok(Some(TxFrame {
            bytes,
            size_bits: LONG_PACKET_BITS,
            mode,
        }))
    }

    /// `ArticEventTxComplete`: advances the message counter, persists the
    /// configuration store (spec §5 "after every successful TX"), notifies
    /// the scheduler and returns to `Idle`.
    pub fn on_tx_complete(
        &mut self,
        store: &mut ConfigurationStore,
        nv: &mut dyn NvStore,
        now_unix: i64,
    ) -> Result<()> {
        let counter = store.read(ParamId::TxCounter).as_unsigned().unwrap_or(0);
        store.write_internal(ParamId::TxCounter, ParamValue::Unsigned(counter.wrapping_add(1)));
        store.write_internal(ParamId::LastTx, ParamValue::DateString(now_unix));
        store.save(nv)?;
        self.scheduler.notify_tx_complete();
        self.state = TxState::Idle;
        Ok(())
    }

    /// `ArticEventDeviceError`: always recoverable (spec §5) — the current
    /// attempt completes as if it had succeeded for scheduling purposes,
    /// without advancing `TX_COUNTER`.
    pub fn on_device_error(&mut self) {
        log::warn!("argos tx: device error, abandoning current schedule");
        self.scheduler.notify_tx_complete();
        self.state = TxState::Idle;
    }

    /// Whether `CERT_TX_REPETITION` (clamped to its spec-mandated 2s floor)
    /// has elapsed since `last_cert_tx_unix`, for the certification-mode
    /// bypass described in spec §4.7.
    pub fn cert_due(&self, store: &ConfigurationStore, last_cert_tx_unix: i64, now_unix: i64) -> bool {
        let period = store
            .read(ParamId::CertTxRepetition)
            .as_unsigned()
            .unwrap_or(CERT_TX_MIN_REPETITION_SECS)
            .max(CERT_TX_MIN_REPETITION_SECS);
        now_unix - last_cert_tx_unix >= period as i64
    }
}

/// Derives the 3 frame flag bits from the active profile and the fix being
/// transmitted (spec §4.2): low-battery and out-of-zone come straight from
/// profile selection, and "last known position" is set when the fix being
/// sent is older than the schedule that requested it (i.e. no fresher fix
/// was acquired in time).
fn profile_flags(profile: &ActiveProfile, fix: &GpsLogEntry) -> FrameFlags {
    let mut flags = FrameFlags::empty();
    if profile.low_battery {
        flags |= FrameFlags::LOW_BATTERY;
    }
    if profile.zone_shadowed {
        flags |= FrameFlags::OUT_OF_ZONE;
    }
    if fix.acquired_at_unix > fix.scheduled_for_unix {
        flags |= FrameFlags::LAST_KNOWN_POS;
    }
    flags
}

/// Classifies the long packet's delta-time-location tag (spec §4.2) from
/// the age of the oldest fix included relative to the anchor.
fn delta_time_location_tag(anchor: &GpsLogEntry, oldest: Option<&GpsLogEntry>) -> DeltaTimeLocationTag {
    let Some(oldest) = oldest else {
        return DeltaTimeLocationTag::NoHistory;
    };
    let age_secs = anchor.acquired_at_unix - oldest.acquired_at_unix;
    match age_secs {
        i64::MIN..=600 => DeltaTimeLocationTag::TenMinutes,
        601..=1_800 => DeltaTimeLocationTag::ThirtyMinutes,
        1_801..=3_600 => DeltaTimeLocationTag::OneHour,
        3_601..=10_800 => DeltaTimeLocationTag::ThreeHours,
        10_801..=21_600 => DeltaTimeLocationTag::SixHours,
        21_601..=43_200 => DeltaTimeLocationTag::TwelveHours,
        43_201..=86_400 => DeltaTimeLocationTag::OneDay,
        _ => DeltaTimeLocationTag::NoHistory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArgosPower;
    use crate::gps::FixType;

    fn sample_fix(acquired_at: i64) -> GpsLogEntry {
        GpsLogEntry {
            longitude: 2.35,
            latitude: 48.85,
            height_msl_mm: 10_000,
            ground_speed_mm_s: 0,
            fix_type: FixType::Fix3D,
            h_acc_mm: 3_000,
            hdop_scaled: 100,
            battery_voltage_mv: 3_900,
            heading_deg: 0.0,
            scheduled_for_unix: acquired_at,
            acquired_at_unix: acquired_at,
        }
    }

    fn sample_profile() -> ActiveProfile {
        ActiveProfile {
            argos_mode: ArgosMode::Legacy,
            argos_power: ArgosPower::Power500mW,
            tr_nom: 60,
            duty_cycle: 0xFF_FFFF,
            depth_pile: 1,
            dloc_arg_nom: 1,
            gnss_en: true,
            gnss_acq_timeout: 60,
            low_battery: false,
            zone_shadowed: false,
        }
    }

    #[test]
    fn first_fix_with_time_sync_burst_enabled_transmits_immediately() {
        let mut store = ConfigurationStore::new();
        store
            .write(ParamId::ArgosTimeSyncBurstEn, ParamValue::Boolean(true))
            .unwrap();
        let mut svc = TxService::new();
        let profile = sample_profile();
        let fix = sample_fix(1_000);

        let frame = svc.notify_gps_fix(&store, &profile, fix, 0);
        assert!(frame.is_some());
        assert_eq!(frame.unwrap().size_bits, SHORT_PACKET_BITS);

        // A second fix does not re-trigger the one-shot burst.
        let frame2 = svc.notify_gps_fix(&store, &profile, sample_fix(1_060), 0);
        assert!(frame2.is_none());
    }

    #[test]
    fn single_eligible_fix_builds_a_short_packet() {
        let store = ConfigurationStore::new();
        let profile = sample_profile();
        let mut svc = TxService::new();
        svc.notify_gps_fix(&store, &profile, sample_fix(1_000), 0);

        let frame = svc
            .build_tx_packet(&store, &profile, 0, ArticMode::A2)
            .unwrap()
            .expect("one eligible fix");
        assert_eq!(frame.size_bits, SHORT_PACKET_BITS);
    }

    #[test]
    fn empty_depth_pile_yields_no_frame() {
        let store = ConfigurationStore::new();
        let profile = sample_profile();
        let mut svc = TxService::new();
        let frame = svc.build_tx_packet(&store, &profile, 0, ArticMode::A2).unwrap();
        assert!(frame.is_none());
    }

    #[test]
    fn gnss_disabled_profile_builds_a_doppler_packet() {
        let store = ConfigurationStore::new();
        let mut profile = sample_profile();
        profile.gnss_en = false;
        let mut svc = TxService::new();
        let frame = svc
            .build_tx_packet(&store, &profile, 0, ArticMode::A2)
            .unwrap()
            .expect("doppler packet always available");
        assert_eq!(frame.size_bits, DOPPLER_PACKET_BITS);
    }

    #[test]
    fn submerging_defers_and_surfacing_raises_the_earliest_schedule() {
        struct NullRadio;
        impl Radio for NullRadio {
            fn send(&mut self, _mode: ArticMode, _packet: &[u8], _size_bits: usize) {}
            fn send_ack(&mut self, _mode: ArticMode, _dcs_id: u32, _dl_msg_id: u32, _exec_report: u32) {}
            fn stop_send(&mut self) {}
            fn start_receive(&mut self, _mode: ArticMode) {}
            fn stop_receive(&mut self) {}
            fn set_frequency(&mut self, _freq_mhz: f64) {}
            fn set_tcxo_warmup_time(&mut self, _time_secs: u32) {}
            fn set_tx_power(&mut self, _power: crate::config::ArgosPower) {}
            fn cumulative_receive_time(&mut self) -> u32 {
                0
            }
        }

        let mut radio = NullRadio;
        let mut svc = TxService::new();
        let event = ServiceEvent {
            source: ServiceIdentifier::UwDetect,
            kind: ServiceEventKind::LogUpdated,
            data: EventData::Bool(true),
            originator_id: 0,
        };
        svc.notify_underwater_event(&event, &mut radio, 600, 1_000);
        assert_eq!(svc.state(), TxState::Deferred);

        let surface_event = ServiceEvent {
            data: EventData::Bool(false),
            ..event
        };
        svc.notify_underwater_event(&surface_event, &mut radio, 600, 1_000);
        assert_eq!(svc.state(), TxState::Idle);
    }

    #[test]
    fn certification_period_is_floored_at_two_seconds() {
        let mut store = ConfigurationStore::new();
        store.write(ParamId::CertTxRepetition, ParamValue::Unsigned(2)).unwrap();
        let svc = TxService::new();
        assert!(!svc.cert_due(&store, 100, 101));
        assert!(svc.cert_due(&store, 100, 102));
    }
}
