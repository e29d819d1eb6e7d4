//! The Argos radio transceiver: an external collaborator (spec §1, §9) this
//! crate only defines the trait for.
//!
//! Grounded on `artic_device.hpp`'s `ArticDevice`/`ArticEventListener`: the
//! method surface below is `ArticDevice`'s public interface minus the
//! listener subscription bookkeeping, which the scheduler glue in
//! `tx_service`/`rx_service` owns instead of the radio itself.

use crate::config::ArgosPower;

/// Uplink/downlink signalling mode, as selected by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticMode {
    A2,
    A3,
    A4,
}

/// An event the radio reports asynchronously. The scheduler glue turns
/// these into [`crate::event_bus::ServiceEvent`]s or service-local state
/// transitions as appropriate.
#[derive(Debug, Clone)]
pub enum RadioEvent {
    PowerOn,
    PowerOff,
    TxStarted,
    TxComplete,
    RxStarted,
    /// A downlink packet, with its bit-exact length (the payload may not
    /// be a whole number of bytes).
    #[cfg(feature = "alloc")]
    RxPacket {
        packet: alloc::vec::Vec<u8>,
        size_bits: usize,
    },
    DeviceIdle,
    DeviceReady,
    DeviceError,
}

/// The Argos satellite transceiver (`ArticDevice`). All methods are
/// fire-and-forget from the caller's perspective: completion and failure
/// are reported later as [`RadioEvent`]s, not return values.
pub trait Radio {
    /// Transmits `packet` (`size_bits` of it are significant; the frame
    /// may be padded to a whole byte).
    fn send(&mut self, mode: ArticMode, packet: &[u8], size_bits: usize);
    fn send_ack(&mut self, mode: ArticMode, dcs_id: u32, dl_msg_id: u32, exec_report: u32);
    fn stop_send(&mut self);
    fn start_receive(&mut self, mode: ArticMode);
    fn stop_receive(&mut self);
    fn set_frequency(&mut self, freq_mhz: f64);
    fn set_tcxo_warmup_time(&mut self, time_secs: u32);
    fn set_tx_power(&mut self, power: ArgosPower);
    /// Cumulative receive time, in seconds, since the last call (the
    /// original resets this counter as a side effect of reading it — see
    /// `ArgosRxService::service_cancel`).
    fn cumulative_receive_time(&mut self) -> u32;
}
