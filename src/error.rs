//! Stable error taxonomy shared by the driver, the SPI engine model and the
//! flash device model.

/// Errors returned by the driver's public entry points.
///
/// Each variant carries a stable integer code (see [`Error::code`]) matching
/// the register-level ABI this crate models, so callers that bridge to other
/// languages can match on the numeric value instead of the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Programmer error: a null/zero-length request, or zero device geometry.
    EInval,
    /// The controller did not make progress (FIFO starvation or stuck
    /// STATUS) within a generous per-operation budget.
    EIo,
    /// Reserved for future use; not returned by any operation today.
    EBusy,
    /// WIP remained set beyond the caller-supplied or driver-chosen tick
    /// budget.
    ETime,
    /// The requested address or range exceeds the device's capacity.
    EOob,
}

impl Error {
    /// The stable integer code for this error: `EInval=-1, EIO=-2, EBusy=-3,
    /// ETime=-4, EOOB=-5` (`OK` is `0` and is not an `Error` variant).
    pub const fn code(&self) -> i32 {
        match self {
            Error::EInval => -1,
            Error::EIo => -2,
            Error::EBusy => -3,
            Error::ETime => -4,
            Error::EOob => -5,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::EInval => defmt::write!(fmt, "Error::EInval"),
            Error::EIo => defmt::write!(fmt, "Error::EIo"),
            Error::EBusy => defmt::write!(fmt, "Error::EBusy"),
            Error::ETime => defmt::write!(fmt, "Error::ETime"),
            Error::EOob => defmt::write!(fmt, "Error::EOob"),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
