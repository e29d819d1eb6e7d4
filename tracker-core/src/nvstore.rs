//! Non-volatile backing store. The flash filesystem driver is out of scope
//! (spec §1); the configuration store only depends on this trait to
//! persist `config.dat`, `zone.dat` and `pass_predict.dat` (spec §6).

use crate::Error;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// A minimal content-addressed blob store, modelling the log-structured
/// flash filesystem the original firmware runs on.
pub trait NvStore {
    /// Reads the full contents of `path`. Returns `Ok(None)` if the file
    /// does not exist. An I/O failure is reported as `Error::CorruptedStore`.
    #[cfg(feature = "alloc")]
    fn read(&mut self, path: &str) -> crate::Result<Option<Vec<u8>>>;

    /// Overwrites `path` with `data` in full (create-or-truncate). An I/O
    /// failure is reported as `Error::CorruptedStore`.
    fn write(&mut self, path: &str, data: &[u8]) -> crate::Result<()>;

    /// Unmounts, reformats and remounts the backing filesystem, destroying
    /// all files. Used by `factory_reset`.
    fn format(&mut self) -> crate::Result<()>;
}

/// Maps a short-read or I/O failure onto the shared error type.
pub(crate) fn io_err<T>(_: T) -> Error {
    Error::CorruptedStore
}
