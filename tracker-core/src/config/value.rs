//! Tagged parameter values (spec §3, §9: the source's `std::variant` maps
//! to "a tagged union / enum with per-variant accessors").

#[cfg(feature = "alloc")]
use alloc::string::String;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// The encoding kind a parameter is stored and validated as (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEncoding {
    Unsigned,
    Signed,
    Boolean,
    Float,
    DateString,
    Text,
    Base64,
    EnumVariants,
}

/// A parameter's current value. Reading with the wrong variant does not
/// panic: callers go through `ParamValue::as_*` accessors that return
/// `None` on a type mismatch (spec §9).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Unsigned(u32),
    Signed(i32),
    Boolean(bool),
    Float(f64),
    /// Seconds since the Unix epoch.
    DateString(i64),
    #[cfg(feature = "alloc")]
    Text(String),
    #[cfg(feature = "alloc")]
    Base64(Vec<u8>),
    /// A discriminant into a parameter's `permitted_values` set (e.g. the
    /// Argos mode or power class).
    EnumVariant(u32),
}

impl ParamValue {
    pub fn encoding(&self) -> ParamEncoding {
        match self {
            ParamValue::Unsigned(_) => ParamEncoding::Unsigned,
            ParamValue::Signed(_) => ParamEncoding::Signed,
            ParamValue::Boolean(_) => ParamEncoding::Boolean,
            ParamValue::Float(_) => ParamEncoding::Float,
            ParamValue::DateString(_) => ParamEncoding::DateString,
            #[cfg(feature = "alloc")]
            ParamValue::Text(_) => ParamEncoding::Text,
            #[cfg(feature = "alloc")]
            ParamValue::Base64(_) => ParamEncoding::Base64,
            ParamValue::EnumVariant(_) => ParamEncoding::EnumVariants,
        }
    }

    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            ParamValue::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i32> {
        match self {
            ParamValue::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<i64> {
        match self {
            ParamValue::DateString(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<u32> {
        match self {
            ParamValue::EnumVariant(v) => Some(*v),
            _ => None,
        }
    }

    #[cfg(feature = "alloc")]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}
