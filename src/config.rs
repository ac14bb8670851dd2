//! Configuration types for the flash device model and the driver.
//!
//! All geometry is validated once at construction time, the same way the
//! ancestor driver validates its pin/SPI wiring in `init()` before the
//! device is considered usable.

use crate::error::Error;

/// Device geometry shared by the flash model and the driver's bounds
/// checking / page-chunking logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    /// Total device capacity in bytes.
    pub mem_size: u32,
    /// Page granularity for program operations.
    pub page_size: u32,
    /// Sector granularity for erase operations.
    pub sector_size: u32,
}

impl FlashGeometry {
    /// Builds a geometry, rejecting any zero dimension.
    pub fn new(mem_size: u32, page_size: u32, sector_size: u32) -> Result<Self, Error> {
        if mem_size == 0 || page_size == 0 || sector_size == 0 {
            return Err(Error::EInval);
        }
        Ok(Self {
            mem_size,
            page_size,
            sector_size,
        })
    }
}

/// Simulated busy latency, in ticks, for the two operations that set WIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FdmTiming {
    /// Ticks the model stays busy after a page program.
    pub prog_busy_ticks: u32,
    /// Ticks the model stays busy after a sector erase.
    pub erase_busy_ticks: u32,
}

/// Full configuration for a [`crate::fdm::FlashDeviceModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdmConfig {
    pub geometry: FlashGeometry,
    pub timing: FdmTiming,
}

/// Configuration consumed by [`crate::driver::Driver::init`]. Mirrors the
/// device geometry; the driver never sees the timing parameters, which are
/// purely a property of the simulated model on the other side of the
/// register interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub geometry: FlashGeometry,
}

impl DriverConfig {
    pub fn new(mem_size: u32, page_size: u32, sector_size: u32) -> Result<Self, Error> {
        Ok(Self {
            geometry: FlashGeometry::new(mem_size, page_size, sector_size)?,
        })
    }
}
