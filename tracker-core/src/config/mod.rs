//! Configuration store (spec §4.7): the parameter table, zones and the
//! non-volatile persistence/profile-selection logic built on top of them.

mod params;
mod store;
mod value;
mod zone;

pub use params::{
    default_value, is_protected, meta, ArgosMode, ArgosPower, ParamId, ParamMeta, ParamRange,
    MAX_CONFIG_ITEMS, PARAM_TABLE,
};
pub use store::{ActiveProfile, ConfigurationStore, LOW_BATTERY_HYSTERESIS_PCT};
pub use value::{ParamEncoding, ParamValue};
pub use zone::{haversine_metres, ShadowProfile, Zone, ZoneType};
