//! Driver: turns logical read/program/erase requests into register
//! transactions against an abstract, polymorphic I/O backend.
//!
//! The driver never touches the flash model directly — everything goes
//! through [`RegisterIo`], so the same driver code runs unmodified against
//! the in-process [`crate::sem::SpiEngineModel`] or a real MMIO backend.

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::regs;

/// Budget, in simulated ticks, the driver grants `wait_busy` while polling
/// STATUS after a page program dispatch.
pub const PROGRAM_WAIT_BUDGET: u32 = 100_000;
/// Budget, in simulated ticks, the driver grants `wait_busy` while polling
/// STATUS after a sector erase dispatch.
pub const ERASE_WAIT_BUDGET: u32 = 1_000_000;

/// The polymorphic I/O capability set the driver is generic over.
///
/// `tick` has a default no-op implementation: real hardware typically has no
/// notion of simulated time, so the driver busy-spins on STATUS until its
/// budget is exhausted when `tick` is absent, exactly as the ancestor C
/// representation tolerates a `NULL` tick function pointer.
pub trait RegisterIo {
    /// Reads the 32-bit register at `offset`.
    fn read(&mut self, offset: u32) -> u32;
    /// Writes `value` to the 32-bit register at `offset`.
    fn write(&mut self, offset: u32, value: u32);
    /// Advances simulated time by `n` ticks. No-op by default.
    fn tick(&mut self, _n: u32) {}
}

/// Host-side driver context. Borrows its I/O backend; does not own it.
pub struct Driver<'io, IO: RegisterIo> {
    cfg: DriverConfig,
    io: &'io mut IO,
}

impl<'io, IO: RegisterIo> Driver<'io, IO> {
    /// Builds a driver bound to `io`. Fails with `EInval` for zero geometry.
    pub fn init(cfg: DriverConfig, io: &'io mut IO) -> Result<Self> {
        if cfg.geometry.mem_size == 0
            || cfg.geometry.page_size == 0
            || cfg.geometry.sector_size == 0
        {
            return Err(Error::EInval);
        }
        Ok(Self { cfg, io })
    }

    fn start_cmd(&mut self, cmd: u8, addr: u32, len: u32) {
        self.io.write(regs::REG_CMD, cmd as u32);
        self.io.write(regs::REG_ADDR, addr & regs::ADDR_MASK);
        self.io.write(regs::REG_LEN, len);
        self.io
            .write(regs::REG_CTRL, regs::CTRL_CS_EN | regs::CTRL_START);
    }

    fn rdsr_once(&mut self) -> u8 {
        self.start_cmd(0x05, 0, 1);
        (self.io.read(regs::REG_DOUT) & 0xFF) as u8
    }

    /// Issues a WREN command, setting the flash's write enable latch.
    pub fn wren(&mut self) -> Result<()> {
        self.start_cmd(0x06, 0, 0);
        Ok(())
    }

    /// Reads the current status byte into `status_out`.
    pub fn rdsr(&mut self, status_out: &mut u8) -> Result<()> {
        *status_out = self.rdsr_once();
        Ok(())
    }

    /// Polls STATUS.WIP until it clears, ticking simulated time between
    /// polls. Returns `ETime` if `max_ticks` is exhausted first.
    pub fn wait_busy(&mut self, mut max_ticks: u32) -> Result<()> {
        loop {
            let st = self.rdsr_once();
            if st & 0x1 == 0 {
                return Ok(());
            }
            if max_ticks == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("driver: wait_busy budget exhausted");
                return Err(Error::ETime);
            }
            self.io.tick(1);
            max_ticks -= 1;
        }
    }

    fn check_oob(&self, addr: u32, len: u32) -> Result<()> {
        if addr >= self.cfg.geometry.mem_size {
            return Err(Error::EOob);
        }
        if len > self.cfg.geometry.mem_size - addr {
            return Err(Error::EOob);
        }
        Ok(())
    }

    /// Reads `buf.len()` bytes starting at `addr` into `buf`.
    ///
    /// Dispatches a single READ command, then drains RX into `buf`,
    /// ticking simulated time whenever RX_AVAIL is momentarily clear.
    /// Returns `EIo` if the budget of `len * 8 + 1024` poll iterations is
    /// exhausted before the buffer is filled.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Err(Error::EInval);
        }
        self.check_oob(addr, buf.len() as u32)?;
        self.start_cmd(0x03, addr, buf.len() as u32);

        let mut read_count = 0usize;
        let mut budget = buf.len() as u64 * 8 + 1024;
        while read_count < buf.len() && budget > 0 {
            let st = self.io.read(regs::REG_STATUS);
            if st & regs::STATUS_RX_AVAIL != 0 {
                buf[read_count] = (self.io.read(regs::REG_DOUT) & 0xFF) as u8;
                read_count += 1;
            } else {
                self.io.tick(1);
            }
            budget -= 1;
        }
        if read_count == buf.len() {
            Ok(())
        } else {
            Err(Error::EIo)
        }
    }

    fn tx_write_all(&mut self, data: &[u8]) -> usize {
        let mut sent = 0usize;
        let mut budget = data.len() as u64 * 8 + 1024;
        while sent < data.len() && budget > 0 {
            let st = self.io.read(regs::REG_STATUS);
            if st & regs::STATUS_TX_SPACE != 0 {
                self.io.write(regs::REG_DIN, data[sent] as u32);
                sent += 1;
            } else {
                self.io.tick(1);
            }
            budget -= 1;
        }
        sent
    }

    /// Programs `data` at `addr`, chunking at page boundaries and
    /// re-issuing WREN before every chunk (the device clears WEL on every
    /// PP, so WREN can never be hoisted out of this loop).
    ///
    /// No atomic rollback: if an intermediate page succeeds and a later
    /// page times out, the prior pages remain programmed.
    pub fn program(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EInval);
        }
        self.check_oob(addr, data.len() as u32)?;

        let mut addr = addr;
        let mut remaining = data.len();
        let mut offset = 0usize;
        while remaining > 0 {
            let page_off = addr % self.cfg.geometry.page_size;
            let room = (self.cfg.geometry.page_size - page_off) as usize;
            let chunk = remaining.min(room);

            self.wren()?;
            #[cfg(feature = "defmt")]
            defmt::trace!("driver: wren before chunk at addr {=u32:#x}", addr);

            let sent = self.tx_write_all(&data[offset..offset + chunk]);
            if sent != chunk {
                return Err(Error::EIo);
            }

            self.start_cmd(0x02, addr, chunk as u32);
            self.wait_busy(PROGRAM_WAIT_BUDGET)?;

            addr += chunk as u32;
            offset += chunk;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Erases the sector containing `addr`.
    pub fn sector_erase(&mut self, addr: u32) -> Result<()> {
        if addr >= self.cfg.geometry.mem_size {
            return Err(Error::EOob);
        }
        self.wren()?;
        self.start_cmd(0x20, addr, 0);
        self.wait_busy(ERASE_WAIT_BUDGET)
    }
}
