use core::fmt;

/// Errors returned across the core's API boundary (spec §7).
///
/// Every path is value-returning; there is no unwinding across a service
/// boundary. A service that hits an internal consistency violation instead
/// asserts (`debug_assert!`) and lets the caller's watchdog reset the
/// device.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A write was outside `[min, max]` or outside `permitted_values`.
    /// The configuration store is left unmodified.
    OutOfRange,
    /// A downlink packet violated the allcast protocol (bad service code,
    /// unknown addressee, truncated body). The decoder drops it and
    /// continues with the next packet.
    ProtocolOutOfRange,
    /// A certification payload exceeded 248 bits.
    PayloadTooLarge,
    /// A value could not be parsed according to its parameter's encoding.
    BadFormat,
    /// DTE command surface: a required argument was missing.
    MissingArg,
    /// DTE command surface: an unexpected argument was supplied.
    UnexpectedArg,
    /// DTE command surface: the command name was not recognised.
    UnknownCommand,
    /// Non-volatile state could not be recovered; every protected
    /// parameter was lost. Non-recoverable at this layer — surfaced to
    /// the top-level state machine, which reformats and restores
    /// protected parameters via `factory_reset`.
    CorruptedStore,
    /// The radio reported a failure. Always recoverable: the current
    /// service is cancelled as if it had completed, and the next
    /// schedule is computed normally.
    DeviceError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange => f.write_str("value out of range for parameter"),
            Error::ProtocolOutOfRange => f.write_str("downlink packet violates allcast protocol"),
            Error::PayloadTooLarge => f.write_str("payload exceeds maximum frame size"),
            Error::BadFormat => f.write_str("value does not match parameter encoding"),
            Error::MissingArg => f.write_str("missing required argument"),
            Error::UnexpectedArg => f.write_str("unexpected argument"),
            Error::UnknownCommand => f.write_str("unknown command"),
            Error::CorruptedStore => f.write_str("non-volatile configuration store is corrupted"),
            Error::DeviceError => f.write_str("radio device error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
