//! Argos radio glue: the TX/RX service state machines built on top of the
//! schedulers, the packet builder and the pass-predict decoder (spec §4.7,
//! §4.8), plus the `Radio` trait they drive.

mod radio;
mod rx_scheduler;
mod rx_service;
mod tx_scheduler;
mod tx_service;

pub use radio::{ArticMode, Radio, RadioEvent};
pub use rx_scheduler::{RxSchedule, RxScheduler, SCHEDULE_DISABLED};
pub use rx_service::RxService;
pub use tx_scheduler::{is_in_duty_cycle, TxScheduler, DUTYCYCLE_24HRS, INVALID_SCHEDULE};
pub use tx_service::{TxFrame, TxService, TxState};
