//! Host-side simulation harness: wires an in-memory `NvStore`, a synthetic
//! battery and a logging-only `Radio` around `tracker-core` and drives a
//! handful of GPS fixes through it, printing the resulting TX schedule.
//!
//! Grounded on `ports/linux/main.cpp`'s role as the reference desktop
//! wiring for the firmware core.

use std::collections::BTreeMap;

use anyhow::Result;
use tracker_core::argos::{ArticMode, Radio, TxService};
use tracker_core::battery::BatteryMonitor;
use tracker_core::config::{ConfigurationStore, ParamId, ParamValue};
use tracker_core::gps::{FixType, GpsLogEntry};
use tracker_core::nvstore::NvStore;
use tracker_core::passpredict::{BasePassPredict, PassSearchParams};

struct MemStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemStore {
    fn new() -> Self {
        MemStore {
            files: BTreeMap::new(),
        }
    }
}

impl NvStore for MemStore {
    fn read(&mut self, path: &str) -> tracker_core::Result<Option<Vec<u8>>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &str, data: &[u8]) -> tracker_core::Result<()> {
        self.files.insert(path.to_owned(), data.to_vec());
        Ok(())
    }

    fn format(&mut self) -> tracker_core::Result<()> {
        self.files.clear();
        Ok(())
    }
}

/// A battery that discharges a fixed amount per simulated fix.
struct DischargingBattery {
    level: u8,
}

impl BatteryMonitor for DischargingBattery {
    fn level(&self) -> u8 {
        self.level
    }

    fn voltage_mv(&self) -> u32 {
        3_000 + self.level as u32 * 9
    }

    fn is_critical(&self) -> bool {
        self.level < 5
    }
}

/// A `Radio` that just logs what it would have done; there is no real
/// Argos transceiver in this simulation.
struct LoggingRadio;

impl Radio for LoggingRadio {
    fn send(&mut self, mode: ArticMode, packet: &[u8], size_bits: usize) {
        log::info!("radio: send {mode:?} {size_bits} bits, {} bytes on the wire", packet.len());
    }

    fn send_ack(&mut self, mode: ArticMode, dcs_id: u32, dl_msg_id: u32, exec_report: u32) {
        log::info!("radio: ack {mode:?} dcs={dcs_id} msg={dl_msg_id} report={exec_report}");
    }

    fn stop_send(&mut self) {
        log::info!("radio: stop_send");
    }

    fn start_receive(&mut self, mode: ArticMode) {
        log::info!("radio: start_receive {mode:?}");
    }

    fn stop_receive(&mut self) {
        log::info!("radio: stop_receive");
    }

    fn set_frequency(&mut self, freq_mhz: f64) {
        log::info!("radio: set_frequency {freq_mhz} MHz");
    }

    fn set_tcxo_warmup_time(&mut self, time_secs: u32) {
        log::info!("radio: set_tcxo_warmup_time {time_secs}s");
    }

    fn set_tx_power(&mut self, power: tracker_core::config::ArgosPower) {
        log::info!("radio: set_tx_power {power:?}");
    }

    fn cumulative_receive_time(&mut self) -> u32 {
        0
    }
}

fn sample_fix(index: u32, now_unix: i64) -> GpsLogEntry {
    GpsLogEntry {
        longitude: 2.35 + index as f64 * 0.01,
        latitude: 48.85 + index as f64 * 0.01,
        height_msl_mm: 8_000,
        ground_speed_mm_s: 1_200,
        fix_type: FixType::Fix3D,
        h_acc_mm: 4_000,
        hdop_scaled: 110,
        battery_voltage_mv: 3_900,
        heading_deg: 90.0,
        scheduled_for_unix: now_unix,
        acquired_at_unix: now_unix,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut nv = MemStore::new();
    let mut store = ConfigurationStore::new();
    store.load(&mut nv)?;

    let battery = DischargingBattery { level: 80 };
    let mut radio = LoggingRadio;
    let mut tx = TxService::new();
    tx.init(&store, &mut radio);

    let pass_predict = BasePassPredict::new();
    let search = PassSearchParams {
        min_elevation_deg: store.read(ParamId::PpMinElevation).as_float().unwrap_or(15.0),
        max_elevation_deg: store.read(ParamId::PpMaxElevation).as_float().unwrap_or(90.0),
        min_duration_secs: store.read(ParamId::PpMinDuration).as_unsigned().unwrap_or(30) as i64,
        max_passes: store.read(ParamId::PpMaxPasses).as_unsigned().unwrap_or(1000),
        linear_margin_secs: store.read(ParamId::PpLinearMargin).as_unsigned().unwrap_or(300) as i64,
        comp_step_secs: store.read(ParamId::PpCompStep).as_unsigned().unwrap_or(10) as i64,
    };

    let mut now_unix: i64 = 1_750_000_000;
    let mut tx_counter: u32 = store.read(ParamId::TxCounter).as_unsigned().unwrap_or(0);

    for fix_index in 0..5 {
        let low_battery = store.is_battery_low(&battery);
        let profile = store.active_profile(low_battery, now_unix, Some((2.35, 48.85)));

        let fix = sample_fix(fix_index, now_unix);
        if let Some(frame) = tx.notify_gps_fix(&store, &profile, fix, tx_counter) {
            log::info!("time-sync burst fired immediately: {} bytes", frame.bytes.len());
            radio.send(frame.mode, &frame.bytes, frame.size_bits);
        }

        match tx.next_schedule(&profile, true, &pass_predict, &search, now_unix) {
            Some((delay_ms, mode)) => {
                log::info!("fix {fix_index}: next TX in {delay_ms} ms via {mode:?}");
                if let Some(frame) = tx.build_tx_packet(&store, &profile, tx_counter, mode)? {
                    radio.send(frame.mode, &frame.bytes, frame.size_bits);
                    tx_counter = tx_counter.wrapping_add(1);
                    store.write_internal(ParamId::TxCounter, ParamValue::Unsigned(tx_counter));
                    tx.on_tx_complete(&mut store, &mut nv, now_unix)?;
                }
            }
            None => log::info!("fix {fix_index}: Argos TX disabled for the active profile"),
        }

        now_unix += 60;
    }

    store.save(&mut nv)?;
    println!("simulation complete, final TX_COUNTER = {tx_counter}");
    Ok(())
}
