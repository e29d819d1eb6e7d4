//! The parameter table (spec §3 "Parameter"), grounded field-for-field on
//! `core/protocol/dte_params.hpp`'s `param_map` static array: same 5-char
//! key convention, same encoding/min/max/permitted-values/readable/writable
//! shape, extended with the zone, pass-predict, RX and certification
//! parameters spec.md names but the filtered original source doesn't carry
//! a table for (see SPEC_FULL.md "Supplemented from original_source").

#[cfg(feature = "alloc")]
use alloc::string::String;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use super::value::{ParamEncoding, ParamValue};

/// Stable identifier for every recognised parameter (spec §3). The
/// discriminant order is also the on-disk serialisation order (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum ParamId {
    ArgosDecId = 0,
    ArgosHexId,
    DeviceModel,
    FwAppVersion,
    LastTx,
    TxCounter,
    BattSoc,
    LastFullChargeDate,
    ProfileName,
    ArgosAopDate,
    ArgosFreq,
    ArgosPower,
    TrNom,
    ArgosMode,
    NtryPerMessage,
    DutyCycle,
    GnssEn,
    DlocArgNom,
    ArgosDepthPile,
    GnssAcqTimeout,
    GnssColdAcqTimeout,
    UnderwaterEn,
    DryTimeBeforeTx,
    LbEn,
    LbThreshold,
    LbArgosPower,
    TrLb,
    LbArgosMode,
    LbArgosDutyCycle,
    LbGnssEn,
    DlocArgLb,
    LbArgosDepthPile,
    LbGnssAcqTimeout,
    ZoneEnableOozMode,
    PpMinElevation,
    PpMaxElevation,
    PpMinDuration,
    PpMaxPasses,
    PpLinearMargin,
    PpCompStep,
    ArgosRxEn,
    ArgosRxAopUpdatePeriod,
    ArgosRxMaxWindow,
    ArgosRxCounter,
    ArgosRxTime,
    CertTxEnable,
    CertTxPayload,
    CertTxRepetition,
    ArgosTimeSyncBurstEn,
}

/// Number of recognised parameters; every index `0..MAX_CONFIG_ITEMS` has
/// an entry in [`PARAM_TABLE`] (spec §3 "Every parameter index present").
pub const MAX_CONFIG_ITEMS: usize = 47;

/// Argos power classes (spec §3 "power class").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ArgosPower {
    Power3mW = 0,
    Power40mW = 1,
    Power200mW = 2,
    Power500mW = 3,
}

/// Argos transmit mode (spec §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ArgosMode {
    Legacy = 0,
    DutyCycle = 1,
    PassPrediction = 2,
    Off = 3,
}

impl ArgosMode {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => ArgosMode::Legacy,
            1 => ArgosMode::DutyCycle,
            2 => ArgosMode::PassPrediction,
            _ => ArgosMode::Off,
        }
    }
}

/// A parameter's permitted value range, by encoding kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// No range check beyond the encoding itself (text/base64/protected
    /// identity fields).
    None,
    Int(i64, i64),
    Float(f64, f64),
}

/// Static metadata for one parameter (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct ParamMeta {
    pub id: ParamId,
    /// 5-character ASCII on-disk key, as in `config_store_fs.hpp`'s
    /// `serialize_config_entry`.
    pub key: &'static str,
    pub encoding: ParamEncoding,
    pub range: ParamRange,
    /// Finite set of permitted discriminants for `EnumVariants`-encoded
    /// parameters; empty when the range check above is sufficient.
    pub permitted_values: &'static [u32],
    pub readable: bool,
    pub writable: bool,
}

/// `ARGOS_DECID` and `ARGOS_HEXID` are the two parameters `factory_reset`
/// restores after reformatting the backing store (spec §4.1).
pub fn is_protected(id: ParamId) -> bool {
    matches!(id, ParamId::ArgosDecId | ParamId::ArgosHexId)
}

macro_rules! meta {
    ($id:ident, $key:literal, $enc:ident, $range:expr, $permitted:expr, $r:literal, $w:literal) => {
        ParamMeta {
            id: ParamId::$id,
            key: $key,
            encoding: ParamEncoding::$enc,
            range: $range,
            permitted_values: $permitted,
            readable: $r,
            writable: $w,
        }
    };
}

const ARGOS_MODE_VARIANTS: &[u32] = &[0, 1, 2, 3];
const ARGOS_POWER_VARIANTS: &[u32] = &[0, 1, 2, 3];
const DEPTH_PILE_VARIANTS: &[u32] = &[1, 2, 3, 4, 8, 9, 10, 11, 12];
const DLOC_VARIANTS: &[u32] = &[1, 2, 3, 4, 5, 6, 7, 8];

/// The parameter table, indexed by `ParamId` discriminant. Grounded on
/// `dte_params.hpp`'s `param_map`.
pub const PARAM_TABLE: [ParamMeta; MAX_CONFIG_ITEMS] = [
    meta!(ArgosDecId, "IDP12", Unsigned, ParamRange::Int(0, 0xFFFFFFF), &[], true, true),
    meta!(ArgosHexId, "IDT06", Unsigned, ParamRange::Int(0, 0xFFFFFFF), &[], true, true),
    meta!(DeviceModel, "IDT02", Text, ParamRange::None, &[], true, true),
    meta!(FwAppVersion, "IDT03", Text, ParamRange::None, &[], true, false),
    meta!(LastTx, "ART01", DateString, ParamRange::None, &[], true, false),
    meta!(TxCounter, "ART02", Unsigned, ParamRange::Int(0, u32::MAX as i64), &[], true, false),
    meta!(BattSoc, "POT03", Unsigned, ParamRange::Int(0, 100), &[], true, false),
    meta!(LastFullChargeDate, "POT05", DateString, ParamRange::None, &[], true, false),
    meta!(ProfileName, "IDP11", Text, ParamRange::None, &[], true, true),
    meta!(ArgosAopDate, "ART03", DateString, ParamRange::None, &[], true, false),
    meta!(ArgosFreq, "ARP03", Float, ParamRange::Float(401.6200, 401.6800), &[], true, true),
    meta!(ArgosPower, "ARP04", EnumVariants, ParamRange::None, ARGOS_POWER_VARIANTS, true, true),
    meta!(TrNom, "ARP05", Unsigned, ParamRange::Int(45, 1200), &[], true, true),
    meta!(ArgosMode, "ARP01", EnumVariants, ParamRange::None, ARGOS_MODE_VARIANTS, true, true),
    meta!(NtryPerMessage, "ARP19", Unsigned, ParamRange::Int(0, 86400), &[], true, true),
    meta!(DutyCycle, "ARP18", Unsigned, ParamRange::Int(0, 0xFFFFFF), &[], true, true),
    meta!(GnssEn, "GNP01", Boolean, ParamRange::None, &[], true, true),
    meta!(DlocArgNom, "ARP11", EnumVariants, ParamRange::None, DLOC_VARIANTS, true, true),
    meta!(ArgosDepthPile, "ARP16", EnumVariants, ParamRange::None, DEPTH_PILE_VARIANTS, true, true),
    meta!(GnssAcqTimeout, "GNP05", Unsigned, ParamRange::Int(10, 600), &[], true, true),
    meta!(GnssColdAcqTimeout, "GNP09", Unsigned, ParamRange::Int(10, 600), &[], true, true),
    meta!(UnderwaterEn, "UNP01", Boolean, ParamRange::None, &[], true, true),
    meta!(DryTimeBeforeTx, "UNP02", Unsigned, ParamRange::Int(1, 1440), &[], true, true),
    meta!(LbEn, "LBP01", Boolean, ParamRange::None, &[], true, true),
    meta!(LbThreshold, "LBP02", Unsigned, ParamRange::Int(0, 100), &[], true, true),
    meta!(LbArgosPower, "LBP03", EnumVariants, ParamRange::None, ARGOS_POWER_VARIANTS, true, true),
    meta!(TrLb, "ARP06", Unsigned, ParamRange::Int(45, 1200), &[], true, true),
    meta!(LbArgosMode, "LBP04", EnumVariants, ParamRange::None, ARGOS_MODE_VARIANTS, true, true),
    meta!(LbArgosDutyCycle, "LBP05", Unsigned, ParamRange::Int(0, 0xFFFFFF), &[], true, true),
    meta!(LbGnssEn, "LBP06", Boolean, ParamRange::None, &[], true, true),
    meta!(DlocArgLb, "ARP12", EnumVariants, ParamRange::None, DLOC_VARIANTS, true, true),
    meta!(LbArgosDepthPile, "LBP08", EnumVariants, ParamRange::None, DEPTH_PILE_VARIANTS, true, true),
    meta!(LbGnssAcqTimeout, "LBP09", Unsigned, ParamRange::Int(10, 600), &[], true, true),
    meta!(ZoneEnableOozMode, "ZNP01", Boolean, ParamRange::None, &[], true, true),
    meta!(PpMinElevation, "PPP01", Float, ParamRange::Float(0.0, 90.0), &[], true, true),
    meta!(PpMaxElevation, "PPP02", Float, ParamRange::Float(0.0, 90.0), &[], true, true),
    meta!(PpMinDuration, "PPP03", Unsigned, ParamRange::Int(20, 3600), &[], true, true),
    meta!(PpMaxPasses, "PPP04", Unsigned, ParamRange::Int(1, 10000), &[], true, true),
    meta!(PpLinearMargin, "PPP05", Unsigned, ParamRange::Int(1, 3600), &[], true, true),
    meta!(PpCompStep, "PPP06", Unsigned, ParamRange::Int(1, 1000), &[], true, true),
    meta!(ArgosRxEn, "RXP01", Boolean, ParamRange::None, &[], true, true),
    meta!(ArgosRxAopUpdatePeriod, "RXP02", Unsigned, ParamRange::Int(1, 90), &[], true, true),
    meta!(ArgosRxMaxWindow, "RXP03", Unsigned, ParamRange::Int(1, 86400), &[], true, true),
    meta!(ArgosRxCounter, "ART04", Unsigned, ParamRange::Int(0, u32::MAX as i64), &[], true, false),
    meta!(ArgosRxTime, "ART05", Unsigned, ParamRange::Int(0, u32::MAX as i64), &[], true, false),
    meta!(CertTxEnable, "CTP01", Boolean, ParamRange::None, &[], true, true),
    meta!(CertTxPayload, "CTP02", Base64, ParamRange::None, &[], true, true),
    meta!(CertTxRepetition, "CTP03", Unsigned, ParamRange::Int(2, 3600), &[], true, true),
    meta!(ArgosTimeSyncBurstEn, "ARP30", Boolean, ParamRange::None, &[], true, true),
];

pub fn meta(id: ParamId) -> &'static ParamMeta {
    &PARAM_TABLE[id as usize]
}

/// The compiled-in default for a parameter (spec §3: "uninitialised
/// entries hold the compiled default").
pub fn default_value(id: ParamId) -> ParamValue {
    use ParamId::*;
    match id {
        ArgosDecId | ArgosHexId => ParamValue::Unsigned(0),
        #[cfg(feature = "alloc")]
        DeviceModel | FwAppVersion | ProfileName => ParamValue::Text(String::new()),
        #[cfg(not(feature = "alloc"))]
        DeviceModel | FwAppVersion | ProfileName => ParamValue::Unsigned(0),
        LastTx | LastFullChargeDate | ArgosAopDate => ParamValue::DateString(0),
        TxCounter | ArgosRxCounter | ArgosRxTime => ParamValue::Unsigned(0),
        BattSoc => ParamValue::Unsigned(0),
        ArgosFreq => ParamValue::Float(401.6500),
        ArgosPower => ParamValue::EnumVariant(ArgosPower::Power500mW as u32),
        TrNom | TrLb => ParamValue::Unsigned(60),
        ArgosMode | LbArgosMode => ParamValue::EnumVariant(ArgosMode::Legacy as u32),
        NtryPerMessage => ParamValue::Unsigned(0),
        DutyCycle | LbArgosDutyCycle => ParamValue::Unsigned(0),
        GnssEn | LbGnssEn => ParamValue::Boolean(true),
        DlocArgNom | DlocArgLb => ParamValue::EnumVariant(1),
        ArgosDepthPile | LbArgosDepthPile => ParamValue::EnumVariant(4),
        GnssAcqTimeout | LbGnssAcqTimeout => ParamValue::Unsigned(60),
        GnssColdAcqTimeout => ParamValue::Unsigned(120),
        UnderwaterEn => ParamValue::Boolean(false),
        DryTimeBeforeTx => ParamValue::Unsigned(10),
        LbEn => ParamValue::Boolean(true),
        LbThreshold => ParamValue::Unsigned(20),
        LbArgosPower => ParamValue::EnumVariant(ArgosPower::Power200mW as u32),
        ZoneEnableOozMode => ParamValue::Boolean(false),
        PpMinElevation => ParamValue::Float(15.0),
        PpMaxElevation => ParamValue::Float(90.0),
        PpMinDuration => ParamValue::Unsigned(30),
        PpMaxPasses => ParamValue::Unsigned(1000),
        PpLinearMargin => ParamValue::Unsigned(300),
        PpCompStep => ParamValue::Unsigned(10),
        ArgosRxEn => ParamValue::Boolean(false),
        ArgosRxAopUpdatePeriod => ParamValue::Unsigned(1),
        ArgosRxMaxWindow => ParamValue::Unsigned(600),
        CertTxEnable => ParamValue::Boolean(false),
        #[cfg(feature = "alloc")]
        CertTxPayload => ParamValue::Base64(Vec::new()),
        #[cfg(not(feature = "alloc"))]
        CertTxPayload => ParamValue::Unsigned(0),
        CertTxRepetition => ParamValue::Unsigned(20),
        ArgosTimeSyncBurstEn => ParamValue::Boolean(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_has_metadata_matching_its_own_id() {
        for i in 0..MAX_CONFIG_ITEMS {
            assert_eq!(PARAM_TABLE[i].id as usize, i);
        }
    }

    #[test]
    fn protected_params_default_to_zero() {
        assert_eq!(default_value(ParamId::ArgosDecId).as_unsigned(), Some(0));
        assert_eq!(default_value(ParamId::ArgosHexId).as_unsigned(), Some(0));
    }

    #[test]
    fn default_variant_tag_matches_table_encoding() {
        for i in 0..MAX_CONFIG_ITEMS {
            let id = PARAM_TABLE[i].id;
            assert_eq!(default_value(id).encoding(), PARAM_TABLE[i].encoding);
        }
    }

    #[test]
    fn default_enum_values_are_themselves_permitted() {
        for i in 0..MAX_CONFIG_ITEMS {
            let meta = &PARAM_TABLE[i];
            if meta.permitted_values.is_empty() {
                continue;
            }
            let discriminant = default_value(meta.id).as_enum().expect("enum default");
            assert!(
                meta.permitted_values.contains(&discriminant),
                "{} default {} not in permitted set",
                meta.key,
                discriminant
            );
        }
    }
}
