//! Pass prediction: the AOP database, allcast downlink decode, the
//! merge-commit rule and the pass-search geometry trait (spec §3, §4.4,
//! §4.6, §9).

mod aop;
mod codec;
mod geometry;
mod merge;

pub use aop::{
    AopSatelliteEntry, BasePassPredict, BulletinTimestamp, DownlinkStatus, OrbitalElements,
    UplinkStatus, MAX_AOP_SATELLITE_ENTRIES,
};
pub use codec::{
    decode_allcast, DecodedFragment, DecoderOptions, OrbitFragment, PassPredictAccumulator,
    StatusBatch, StatusFragment,
};
pub use geometry::{DefaultPrepassGeometry, PassSearchParams, PassWindow, PrepassGeometry};
pub use merge::commit_pass_predict;
