//! # tracker-core
//!
//! Satellite communication and scheduling core of a marine wildlife tracker:
//! Argos transmit/receive scheduling, bit-exact uplink frame encoding,
//! pass-prediction (AOP) downlink decoding, the depth pile and a
//! configuration store with runtime profile selection.
//!
//! The UART command parser, GNSS driver, board-support package, filesystem
//! driver, top-level state machine and sensor-specific services are external
//! collaborators: this crate only defines the traits (`Radio`,
//! `BatteryMonitor`, `NvStore`, clocks) they must implement.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::error::Error;

mod error;

#[cfg(feature = "alloc")]
pub mod argos;
pub mod battery;
pub mod bitstream;
pub mod clock;
pub mod config;
pub mod event_bus;
pub mod gps;
pub mod nvstore;
#[cfg(feature = "alloc")]
pub mod packet;
pub mod passpredict;
pub mod scheduler;

/// Result alias used throughout the core.
pub type Result<T> = core::result::Result<T, Error>;
