//! `ConfigurationStore`: parameter persistence, zone persistence and
//! profile selection, grounded on
//! `core/configuration/config_store_fs.hpp`'s `LFSConfigurationStore`
//! (`serialize_config`/`deserialize_config`, `is_battery_level_low`,
//! `get_argos_configuration`/`get_gnss_configuration`, `factory_reset`).

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::battery::BatteryMonitor;
use crate::nvstore::NvStore;
use crate::Error;

use super::params::{self, ArgosMode, ArgosPower, ParamId, MAX_CONFIG_ITEMS, PARAM_TABLE};
use super::value::ParamValue;
use super::zone::Zone;

const CONFIG_PATH: &str = "config.dat";
const ZONE_PATH: &str = "zone.dat";
const PASS_PREDICT_PATH: &str = "pass_predict.dat";

const CONFIG_FORMAT_VERSION: u32 = 1;
/// Fixed value-field width: 1-byte encoding tag + 127 bytes of payload,
/// zero-padded. Matches the original's fixed 128-byte value slot per
/// record so a single corrupted record never shifts the ones after it.
const VALUE_FIELD_LEN: usize = 128;
const RECORD_LEN: usize = 5 + VALUE_FIELD_LEN;

/// Margin (percentage points) below `LB_TRESHOLD` the state of charge must
/// recover past before the low-battery profile is dropped, so the active
/// profile doesn't chatter back and forth across the raw threshold
/// (spec §4.7 "hysteretic low-battery detection").
pub const LOW_BATTERY_HYSTERESIS_PCT: u8 = 5;

/// The Argos/GNSS parameters that actually drive scheduling, resolved from
/// whichever profile currently has precedence (spec §4.7: low-battery >
/// zone-exclusion > nominal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveProfile {
    pub argos_mode: ArgosMode,
    pub argos_power: ArgosPower,
    pub tr_nom: u32,
    pub duty_cycle: u32,
    pub depth_pile: u32,
    pub dloc_arg_nom: u32,
    pub gnss_en: bool,
    pub gnss_acq_timeout: u32,
    /// `true` when the low-battery profile is currently in force.
    pub low_battery: bool,
    /// `true` when a zone-exclusion shadow profile is currently in force
    /// (only possible when `low_battery` is `false`).
    pub zone_shadowed: bool,
}

/// Parameter table, zone table and profile-selection state, backed by an
/// [`NvStore`].
pub struct ConfigurationStore {
    params: [ParamValue; MAX_CONFIG_ITEMS],
    #[cfg(feature = "alloc")]
    zones: Vec<Zone>,
    low_battery_latched: bool,
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        ConfigurationStore {
            params: core::array::from_fn(|i| params::default_value(PARAM_TABLE[i].id)),
            #[cfg(feature = "alloc")]
            zones: Vec::new(),
            low_battery_latched: false,
        }
    }
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, id: ParamId) -> &ParamValue {
        &self.params[id as usize]
    }

    /// Validates `value` against `id`'s encoding, range and permitted-value
    /// set (spec §3) before committing it. On rejection the store is left
    /// unmodified.
    pub fn write(&mut self, id: ParamId, value: ParamValue) -> crate::Result<()> {
        let meta = params::meta(id);
        if !meta.writable {
            return Err(Error::UnexpectedArg);
        }
        if value.encoding() != meta.encoding {
            return Err(Error::BadFormat);
        }
        match meta.range {
            super::params::ParamRange::Int(min, max) => {
                let v = value
                    .as_unsigned()
                    .map(|v| v as i64)
                    .or_else(|| value.as_signed().map(|v| v as i64))
                    .ok_or(Error::BadFormat)?;
                if v < min || v > max {
                    return Err(Error::OutOfRange);
                }
            }
            super::params::ParamRange::Float(min, max) => {
                let v = value.as_float().ok_or(Error::BadFormat)?;
                if v < min || v > max {
                    return Err(Error::OutOfRange);
                }
            }
            super::params::ParamRange::None => {}
        }
        if !meta.permitted_values.is_empty() {
            let discriminant = value.as_enum().ok_or(Error::BadFormat)?;
            if !meta.permitted_values.contains(&discriminant) {
                return Err(Error::OutOfRange);
            }
        }
        self.params[id as usize] = value;
        Ok(())
    }

    /// Serialises every parameter as a fixed `[5-byte key][128-byte value
    /// field]` record (`VALUE_FIELD_LEN`: 1-byte encoding tag + zero-padded
    /// payload), in `ParamId` order, behind a 4-byte version code — exactly
    /// `config_store_fs.hpp`'s on-disk shape (spec §6). Integers and floats
    /// are little-endian, per spec §6.
    #[cfg(feature = "alloc")]
    fn serialize_config(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CONFIG_FORMAT_VERSION.to_le_bytes());

        for meta in PARAM_TABLE.iter() {
            out.extend_from_slice(meta.key.as_bytes());
            let value = &self.params[meta.id as usize];
            let (tag, payload) = encode_value(value);
            debug_assert!(payload.len() <= VALUE_FIELD_LEN - 1);
            out.push(tag);
            out.extend_from_slice(&payload);
            out.resize(out.len() + (VALUE_FIELD_LEN - 1 - payload.len().min(VALUE_FIELD_LEN - 1)), 0);
        }
        out
    }

    /// Loads `config.dat`. Missing file: parameters stay at compiled
    /// defaults. The 4-byte version header is skipped positionally but not
    /// otherwise validated, and every fixed-width record after it is
    /// decoded independently: a record whose key or value doesn't parse
    /// leaves that one parameter at its compiled default rather than
    /// aborting the whole load, and a truncated final record is simply
    /// dropped (spec §8 scenario 6: corrupting only the version bytes
    /// leaves every parameter intact; corrupting a span of whole records
    /// resets exactly the parameters in that span).
    #[cfg(feature = "alloc")]
    pub fn load(&mut self, nv: &mut dyn NvStore) -> crate::Result<()> {
        let bytes = match nv.read(CONFIG_PATH)? {
            Some(b) => b,
            None => return Ok(()),
        };
        if bytes.len() < 4 {
            return Ok(());
        }

        let mut pos = 4usize;
        while pos + RECORD_LEN <= bytes.len() {
            let record = &bytes[pos..pos + RECORD_LEN];
            pos += RECORD_LEN;

            let Ok(key) = core::str::from_utf8(&record[0..5]) else {
                continue;
            };
            let Some(id) = PARAM_TABLE.iter().find(|m| m.key == key).map(|m| m.id) else {
                continue;
            };
            let tag = record[5];
            let field = &record[6..RECORD_LEN];
            if let Some(value) = decode_value(tag, field) {
                self.params[id as usize] = value;
            }
        }
        Ok(())
    }

    #[cfg(feature = "alloc")]
    pub fn save(&self, nv: &mut dyn NvStore) -> crate::Result<()> {
        nv.write(CONFIG_PATH, &self.serialize_config())
    }

    #[cfg(feature = "alloc")]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[cfg(feature = "alloc")]
    pub fn set_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
    }

    #[cfg(feature = "alloc")]
    pub fn load_zones(&mut self, nv: &mut dyn NvStore) -> crate::Result<()> {
        let bytes = match nv.read(ZONE_PATH)? {
            Some(b) => b,
            None => return Ok(()),
        };
        self.zones = decode_zones(&bytes).ok_or(Error::CorruptedStore)?;
        Ok(())
    }

    #[cfg(feature = "alloc")]
    pub fn save_zones(&self, nv: &mut dyn NvStore) -> crate::Result<()> {
        nv.write(ZONE_PATH, &encode_zones(&self.zones))
    }

    /// Pass-predict state is opaque here: the AOP database owns its own
    /// on-disk shape, this just shuttles bytes (spec §4.7 leaves the
    /// pass-predict record format to the pass-prediction module).
    #[cfg(feature = "alloc")]
    pub fn read_pass_predict_raw(&self, nv: &mut dyn NvStore) -> crate::Result<Option<Vec<u8>>> {
        nv.read(PASS_PREDICT_PATH)
    }

    #[cfg(feature = "alloc")]
    pub fn write_pass_predict_raw(&mut self, nv: &mut dyn NvStore, bytes: &[u8]) -> crate::Result<()> {
        nv.write(PASS_PREDICT_PATH, bytes)
    }

    /// Reformats the backing store and restores only the two protected
    /// identity parameters, matching `factory_reset`'s
    /// `serialize_protected_config` round trip.
    #[cfg(feature = "alloc")]
    pub fn factory_reset(
        &mut self,
        nv: &mut dyn NvStore,
        argos_dec_id: u32,
        argos_hex_id: u32,
    ) -> crate::Result<()> {
        nv.format()?;
        *self = Self::new();
        self.params[ParamId::ArgosDecId as usize] = ParamValue::Unsigned(argos_dec_id);
        self.params[ParamId::ArgosHexId as usize] = ParamValue::Unsigned(argos_hex_id);
        self.save(nv)
    }

    /// Firmware-internal write for bookkeeping fields the DTE command
    /// surface can read but never set directly (`ARGOS_RX_COUNTER`,
    /// `ARGOS_RX_TIME`, `ARGOS_AOP_DATE`, `ART01`/`ART02` tx bookkeeping):
    /// bypasses the `writable` gate in [`Self::write`], mirroring the
    /// original's direct `configuration_store->write_param(...)` calls
    /// from inside a service rather than through the DTE write path.
    pub fn write_internal(&mut self, id: ParamId, value: ParamValue) {
        self.params[id as usize] = value;
    }

    /// `ArgosRxService::react(ArticEventRxPacket)`'s RX counter bump.
    pub fn increment_rx_counter(&mut self) {
        let n = self.param_u32(ParamId::ArgosRxCounter);
        self.write_internal(ParamId::ArgosRxCounter, ParamValue::Unsigned(n + 1));
    }

    /// `ArgosRxService::service_cancel`'s cumulative RX time accounting.
    pub fn increment_rx_time(&mut self, secs: u32) {
        let n = self.param_u32(ParamId::ArgosRxTime);
        self.write_internal(ParamId::ArgosRxTime, ParamValue::Unsigned(n.saturating_add(secs)));
    }

    /// Updates and returns the hysteretic low-battery latch (spec §4.7).
    pub fn is_battery_low(&mut self, battery: &dyn BatteryMonitor) -> bool {
        let enabled = self.params[ParamId::LbEn as usize].as_bool().unwrap_or(true);
        if !enabled {
            self.low_battery_latched = false;
            return false;
        }
        let threshold = self.params[ParamId::LbThreshold as usize]
            .as_unsigned()
            .unwrap_or(0) as u8;
        let level = battery.level();
        if battery.is_critical() {
            self.low_battery_latched = true;
        } else if !self.low_battery_latched && level <= threshold {
            self.low_battery_latched = true;
        } else if self.low_battery_latched
            && level > threshold.saturating_add(LOW_BATTERY_HYSTERESIS_PCT)
        {
            self.low_battery_latched = false;
        }
        self.low_battery_latched
    }

    /// Finds the first active exclusion zone containing `position`, if any.
    #[cfg(feature = "alloc")]
    fn matching_zone(&self, now_unix: i64, position: Option<(f64, f64)>) -> Option<&Zone> {
        let (lon, lat) = position?;
        self.zones
            .iter()
            .find(|z| z.is_exclusion && z.contains(now_unix, lon, lat))
    }

    fn param_u32(&self, id: ParamId) -> u32 {
        self.params[id as usize].as_unsigned().unwrap_or(0)
    }

    fn param_enum(&self, id: ParamId) -> u32 {
        self.params[id as usize].as_enum().unwrap_or(0)
    }

    fn param_bool(&self, id: ParamId) -> bool {
        self.params[id as usize].as_bool().unwrap_or(false)
    }

    /// Resolves the profile currently in force, applying spec §4.7's
    /// precedence: low-battery overrides everything; otherwise an active
    /// zone-exclusion shadow profile overrides the Argos/GNSS fields it
    /// names; otherwise the nominal parameters apply.
    #[cfg_attr(not(feature = "alloc"), allow(unused_variables))]
    pub fn active_profile(
        &self,
        low_battery: bool,
        now_unix: i64,
        position: Option<(f64, f64)>,
    ) -> ActiveProfile {
        if low_battery {
            return ActiveProfile {
                argos_mode: ArgosMode::from_u32(self.param_enum(ParamId::LbArgosMode)),
                argos_power: argos_power_from_u32(self.param_enum(ParamId::LbArgosPower)),
                tr_nom: self.param_u32(ParamId::TrLb),
                duty_cycle: self.param_u32(ParamId::LbArgosDutyCycle),
                depth_pile: self.param_enum(ParamId::LbArgosDepthPile),
                dloc_arg_nom: self.param_enum(ParamId::DlocArgLb),
                gnss_en: self.param_bool(ParamId::LbGnssEn),
                gnss_acq_timeout: self.param_u32(ParamId::LbGnssAcqTimeout),
                low_battery: true,
                zone_shadowed: false,
            };
        }

        #[cfg(feature = "alloc")]
        let shadow = self.matching_zone(now_unix, position).map(|z| z.shadow);
        #[cfg(not(feature = "alloc"))]
        let shadow: Option<super::zone::ShadowProfile> = None;

        let nominal = ActiveProfile {
            argos_mode: ArgosMode::from_u32(self.param_enum(ParamId::ArgosMode)),
            argos_power: argos_power_from_u32(self.param_enum(ParamId::ArgosPower)),
            tr_nom: self.param_u32(ParamId::TrNom),
            duty_cycle: self.param_u32(ParamId::DutyCycle),
            depth_pile: self.param_enum(ParamId::ArgosDepthPile),
            dloc_arg_nom: self.param_enum(ParamId::DlocArgNom),
            gnss_en: self.param_bool(ParamId::GnssEn),
            gnss_acq_timeout: self.param_u32(ParamId::GnssAcqTimeout),
            low_battery: false,
            zone_shadowed: false,
        };

        match shadow {
            Some(s) => ActiveProfile {
                argos_mode: ArgosMode::from_u32(s.argos_mode),
                argos_power: argos_power_from_u32(s.argos_power),
                tr_nom: s.tr_nom,
                duty_cycle: s.duty_cycle,
                gnss_en: s.gnss_en,
                dloc_arg_nom: s.dloc_arg_nom,
                zone_shadowed: true,
                ..nominal
            },
            None => nominal,
        }
    }
}

fn argos_power_from_u32(v: u32) -> ArgosPower {
    match v {
        0 => ArgosPower::Power3mW,
        1 => ArgosPower::Power40mW,
        2 => ArgosPower::Power200mW,
        _ => ArgosPower::Power500mW,
    }
}

/// `Text`/`Base64` are variable-length, so their wire payload is a 1-byte
/// length followed by the data; every other tag has a width implied by the
/// tag itself. Both are zero-padded out to `VALUE_FIELD_LEN - 1` bytes by
/// the caller.
#[cfg(feature = "alloc")]
fn encode_value(value: &ParamValue) -> (u8, Vec<u8>) {
    match value {
        ParamValue::Unsigned(v) => (0, v.to_le_bytes().to_vec()),
        ParamValue::Signed(v) => (1, v.to_le_bytes().to_vec()),
        ParamValue::Boolean(v) => (2, alloc::vec![*v as u8]),
        ParamValue::Float(v) => (3, v.to_le_bytes().to_vec()),
        ParamValue::DateString(v) => (4, v.to_le_bytes().to_vec()),
        ParamValue::Text(v) => {
            let bytes = v.as_bytes();
            let len = bytes.len().min(VALUE_FIELD_LEN - 2) as u8;
            let mut out = alloc::vec![len];
            out.extend_from_slice(&bytes[..len as usize]);
            (5, out)
        }
        ParamValue::Base64(v) => {
            let len = v.len().min(VALUE_FIELD_LEN - 2) as u8;
            let mut out = alloc::vec![len];
            out.extend_from_slice(&v[..len as usize]);
            (6, out)
        }
        ParamValue::EnumVariant(v) => (7, v.to_le_bytes().to_vec()),
    }
}

#[cfg(feature = "alloc")]
fn decode_value(tag: u8, field: &[u8]) -> Option<ParamValue> {
    use alloc::string::String;
    Some(match tag {
        0 => ParamValue::Unsigned(u32::from_le_bytes(field.get(..4)?.try_into().ok()?)),
        1 => ParamValue::Signed(i32::from_le_bytes(field.get(..4)?.try_into().ok()?)),
        2 => ParamValue::Boolean(*field.first()? != 0),
        3 => ParamValue::Float(f64::from_le_bytes(field.get(..8)?.try_into().ok()?)),
        4 => ParamValue::DateString(i64::from_le_bytes(field.get(..8)?.try_into().ok()?)),
        5 => {
            let len = *field.first()? as usize;
            ParamValue::Text(String::from_utf8(field.get(1..1 + len)?.to_vec()).ok()?)
        }
        6 => {
            let len = *field.first()? as usize;
            ParamValue::Base64(field.get(1..1 + len)?.to_vec())
        }
        7 => ParamValue::EnumVariant(u32::from_le_bytes(field.get(..4)?.try_into().ok()?)),
        _ => return None,
    })
}

#[cfg(feature = "alloc")]
fn encode_zones(zones: &[Zone]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(zones.len() as u32).to_be_bytes());
    for z in zones {
        out.extend_from_slice(&z.zone_id.to_be_bytes());
        out.push(z.is_exclusion as u8);
        out.extend_from_slice(&z.activation_time.to_be_bytes());
        out.extend_from_slice(&z.centre_longitude.to_be_bytes());
        out.extend_from_slice(&z.centre_latitude.to_be_bytes());
        out.extend_from_slice(&z.radius_metres.to_be_bytes());
        out.extend_from_slice(&z.shadow.argos_mode.to_be_bytes());
        out.extend_from_slice(&z.shadow.argos_power.to_be_bytes());
        out.extend_from_slice(&z.shadow.tr_nom.to_be_bytes());
        out.extend_from_slice(&z.shadow.duty_cycle.to_be_bytes());
        out.push(z.shadow.gnss_en as u8);
        out.extend_from_slice(&z.shadow.dloc_arg_nom.to_be_bytes());
    }
    out
}

#[cfg(feature = "alloc")]
fn decode_zones(bytes: &[u8]) -> Option<Vec<Zone>> {
    use super::zone::{ShadowProfile, ZoneType};

    if bytes.len() < 4 {
        return None;
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().ok()?) as usize;
    let mut pos = 4;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let rec_len = 2 + 1 + 8 + 8 + 8 + 8 + 4 + 4 + 4 + 4 + 1 + 4;
        if pos + rec_len > bytes.len() {
            return None;
        }
        let zone_id = u16::from_be_bytes(bytes[pos..pos + 2].try_into().ok()?);
        pos += 2;
        let is_exclusion = bytes[pos] != 0;
        pos += 1;
        let activation_time = i64::from_be_bytes(bytes[pos..pos + 8].try_into().ok()?);
        pos += 8;
        let centre_longitude = f64::from_be_bytes(bytes[pos..pos + 8].try_into().ok()?);
        pos += 8;
        let centre_latitude = f64::from_be_bytes(bytes[pos..pos + 8].try_into().ok()?);
        pos += 8;
        let radius_metres = f64::from_be_bytes(bytes[pos..pos + 8].try_into().ok()?);
        pos += 8;
        let argos_mode = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?);
        pos += 4;
        let argos_power = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?);
        pos += 4;
        let tr_nom = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?);
        pos += 4;
        let duty_cycle = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?);
        pos += 4;
        let gnss_en = bytes[pos] != 0;
        pos += 1;
        let dloc_arg_nom = u32::from_be_bytes(bytes[pos..pos + 4].try_into().ok()?);
        pos += 4;
        out.push(Zone {
            zone_type: ZoneType::Circle,
            zone_id,
            activation_time,
            centre_longitude,
            centre_latitude,
            radius_metres,
            is_exclusion,
            shadow: ShadowProfile {
                argos_mode,
                argos_power,
                tr_nom,
                duty_cycle,
                gnss_en,
                dloc_arg_nom,
            },
        });
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvstore::NvStore;

    #[derive(Default)]
    struct MemStore {
        files: alloc::collections::BTreeMap<alloc::string::String, Vec<u8>>,
    }

    impl NvStore for MemStore {
        fn read(&mut self, path: &str) -> crate::Result<Option<Vec<u8>>> {
            Ok(self.files.get(path).cloned())
        }
        fn write(&mut self, path: &str, data: &[u8]) -> crate::Result<()> {
            self.files.insert(path.into(), data.to_vec());
            Ok(())
        }
        fn format(&mut self) -> crate::Result<()> {
            self.files.clear();
            Ok(())
        }
    }

    struct FixedBattery(u8);
    impl BatteryMonitor for FixedBattery {
        fn level(&self) -> u8 {
            self.0
        }
        fn voltage_mv(&self) -> u32 {
            3700
        }
        fn is_critical(&self) -> bool {
            false
        }
    }

    #[test]
    fn write_rejects_out_of_range_and_keeps_old_value() {
        let mut store = ConfigurationStore::new();
        let before = store.read(ParamId::TrNom).clone();
        let err = store.write(ParamId::TrNom, ParamValue::Unsigned(5)).unwrap_err();
        assert_eq!(err, Error::OutOfRange);
        assert_eq!(*store.read(ParamId::TrNom), before);
    }

    #[test]
    fn round_trips_through_a_backing_store() {
        let mut store = ConfigurationStore::new();
        store.write(ParamId::TrNom, ParamValue::Unsigned(120)).unwrap();
        store
            .write(ParamId::ArgosHexId, ParamValue::Unsigned(0xABCDEF))
            .unwrap();

        let mut nv = MemStore::default();
        store.save(&mut nv).unwrap();

        let mut reloaded = ConfigurationStore::new();
        reloaded.load(&mut nv).unwrap();
        assert_eq!(reloaded.read(ParamId::TrNom).as_unsigned(), Some(120));
        assert_eq!(reloaded.read(ParamId::ArgosHexId).as_unsigned(), Some(0xABCDEF));
    }

    /// spec §8 scenario 6.
    #[test]
    fn clobbering_the_leading_span_resets_the_params_stored_there() {
        let mut store = ConfigurationStore::new();
        store
            .write(ParamId::ArgosDecId, ParamValue::Unsigned(1234))
            .unwrap();
        store
            .write(ParamId::ArgosHexId, ParamValue::Unsigned(0x1234567))
            .unwrap();

        let mut nv = MemStore::default();
        store.save(&mut nv).unwrap();
        let mut bytes = nv.read(CONFIG_PATH).unwrap().unwrap();
        for b in bytes.iter_mut().take(1024) {
            *b = 0xFF;
        }
        nv.write(CONFIG_PATH, &bytes).unwrap();

        let mut reloaded = ConfigurationStore::new();
        reloaded.load(&mut nv).unwrap();
        assert_eq!(reloaded.read(ParamId::ArgosDecId).as_unsigned(), Some(0));
        assert_eq!(reloaded.read(ParamId::ArgosHexId).as_unsigned(), Some(0));
    }

    /// spec §8 scenario 6.
    #[test]
    fn clobbering_only_the_version_header_leaves_params_intact() {
        let mut store = ConfigurationStore::new();
        store
            .write(ParamId::ArgosDecId, ParamValue::Unsigned(1234))
            .unwrap();
        store
            .write(ParamId::ArgosHexId, ParamValue::Unsigned(0x1234567))
            .unwrap();

        let mut nv = MemStore::default();
        store.save(&mut nv).unwrap();
        let mut bytes = nv.read(CONFIG_PATH).unwrap().unwrap();
        for b in bytes.iter_mut().take(4) {
            *b = 0xFF;
        }
        nv.write(CONFIG_PATH, &bytes).unwrap();

        let mut reloaded = ConfigurationStore::new();
        reloaded.load(&mut nv).unwrap();
        assert_eq!(reloaded.read(ParamId::ArgosDecId).as_unsigned(), Some(1234));
        assert_eq!(
            reloaded.read(ParamId::ArgosHexId).as_unsigned(),
            Some(0x1234567)
        );
    }

    #[test]
    fn low_battery_latch_has_hysteresis() {
        let mut store = ConfigurationStore::new();
        store.write(ParamId::LbThreshold, ParamValue::Unsigned(20)).unwrap();

        assert!(!store.is_battery_low(&FixedBattery(50)));
        assert!(store.is_battery_low(&FixedBattery(18)));
        // Still latched just above the threshold, inside the hysteresis band.
        assert!(store.is_battery_low(&FixedBattery(23)));
        assert!(!store.is_battery_low(&FixedBattery(30)));
    }

    #[test]
    fn low_battery_takes_precedence_over_zone_shadow() {
        let mut store = ConfigurationStore::new();
        let profile = store.active_profile(true, 0, None);
        assert!(profile.low_battery);
        assert!(!profile.zone_shadowed);
    }
}
