//! Driver, SPI engine model, and flash device model for a single-bank,
//! 24-bit-address SPI NOR flash part.
//!
//! The three pieces form a strict one-way ownership chain:
//!
//! ```text
//! Caller -> Driver -> (RegisterIo) -> SpiEngineModel -> FlashDeviceModel
//!                                          ^ tick                ^ tick
//! ```
//!
//! [`driver::Driver`] is generic over [`driver::RegisterIo`], so the exact
//! same chunking/polling/bounds-checking code runs against the in-process
//! [`sem::SpiEngineModel`] used by this crate's tests, or against a real
//! MMIO backend that implements the same trait.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod driver;
pub mod error;
pub mod fdm;
pub mod fifo;
pub mod regs;
pub mod sem;

pub use config::{DriverConfig, FdmConfig, FdmTiming, FlashGeometry};
pub use driver::{Driver, RegisterIo};
pub use error::{Error, Result};
pub use fdm::FlashDeviceModel;
pub use sem::SpiEngineModel;

#[cfg(test)]
mod scenarios {
    //! End-to-end scenarios run through the full Driver -> SpiEngineModel ->
    //! FlashDeviceModel stack rather than poking engine registers directly.
    use crate::config::{DriverConfig, FdmConfig, FdmTiming, FlashGeometry};
    use crate::driver::{Driver, RegisterIo};
    use crate::fdm::FlashDeviceModel;
    use crate::sem::SpiEngineModel;

    const MEM_SIZE: u32 = 4096;
    const PAGE_SIZE: u32 = 256;
    const SECTOR_SIZE: u32 = 4096;

    struct SimIo(SpiEngineModel);

    impl RegisterIo for SimIo {
        fn read(&mut self, offset: u32) -> u32 {
            self.0.read(offset)
        }
        fn write(&mut self, offset: u32, value: u32) {
            self.0.write(offset, value)
        }
        fn tick(&mut self, n: u32) {
            self.0.tick(n)
        }
    }

    fn rig() -> (SimIo, DriverConfig) {
        let flash = FlashDeviceModel::init(FdmConfig {
            geometry: FlashGeometry::new(MEM_SIZE, PAGE_SIZE, SECTOR_SIZE).unwrap(),
            timing: FdmTiming {
                prog_busy_ticks: 4,
                erase_busy_ticks: 64,
            },
        })
        .unwrap();
        (
            SimIo(SpiEngineModel::new(flash, crate::sem::DEFAULT_FIFO_CAPACITY)),
            DriverConfig::new(MEM_SIZE, PAGE_SIZE, SECTOR_SIZE).unwrap(),
        )
    }

    #[test]
    fn s1_rdsr_at_reset() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        let mut status = 0xFFu8;
        drv.rdsr(&mut status).unwrap();
        assert_eq!(status & 0b11, 0);
    }

    #[test]
    fn s2_pp_and_readback() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        drv.program(0x10, &data).unwrap();
        let mut out = [0u8; 4];
        drv.read(0x10, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn s4_page_boundary_truncation_is_compensated_by_chunking() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        let data = [0xAA, 0xBB, 0xCC, 0xDD];
        drv.program(0xFE, &data).unwrap();
        let mut out = [0u8; 4];
        drv.read(0xFE, &mut out).unwrap();
        // Unlike a single raw PP dispatch (which would truncate at the page
        // boundary, see sem::tests::s4_*), the driver re-issues WREN+PP for
        // the second page and all four bytes land.
        assert_eq!(out, data);
    }

    #[test]
    fn s5_and_reprogram() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        drv.program(0x100, &[0xAA]).unwrap();
        // A second `program` call at the same address issues its own
        // WREN/PP; the device applies 1->0 AND semantics against whatever
        // is already there, without an erase in between.
        drv.program(0x100, &[0x55]).unwrap();
        let mut out = [0u8; 1];
        drv.read(0x100, &mut out).unwrap();
        assert_eq!(out, [0x00]);
    }

    #[test]
    fn s6_sector_erase() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        drv.program(0x200, &[0x00, 0x11, 0x22]).unwrap();
        drv.sector_erase(0x200).unwrap();
        let mut out = [0u8; 3];
        drv.read(0x200, &mut out).unwrap();
        assert_eq!(out, [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn s7_driver_page_chunking() {
        let (mut io, cfg) = rig();
        let mut drv = Driver::init(cfg, &mut io).unwrap();
        let data = [0xAA, 0xBB, 0xCC, 0xDD];
        drv.program(0xFE, &data).unwrap();
        let mut out = [0u8; 4];
        drv.read(0xFE, &mut out).unwrap();
        assert_eq!(out, data);
    }
}
