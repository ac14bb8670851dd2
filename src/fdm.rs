//! Flash Device Model: a behavioral, bit-accurate model of one SPI NOR flash
//! part — the byte array, the WIP/WEL status bits, and the busy countdown.
//!
//! This has no notion of registers or FIFOs; it is the leaf the SPI Engine
//! Model dispatches into.

use alloc::vec;
use alloc::vec::Vec;

use crate::config::FdmConfig;
use crate::error::Error;

const STATUS_WIP: u8 = 1 << 0;
const STATUS_WEL: u8 = 1 << 1;

/// In-process model of a single SPI NOR flash die.
pub struct FlashDeviceModel {
    cfg: FdmConfig,
    mem: Vec<u8>,
    status: u8,
    busy_ticks: u32,
}

impl FlashDeviceModel {
    /// Builds a model with `mem` filled to 0xFF and status clear (WIP=0,
    /// WEL=0). Fails if any geometry dimension is zero.
    pub fn init(cfg: FdmConfig) -> Result<Self, Error> {
        let mem_size = cfg.geometry.mem_size as usize;
        if mem_size == 0 || cfg.geometry.page_size == 0 || cfg.geometry.sector_size == 0 {
            return Err(Error::EInval);
        }
        Ok(Self {
            cfg,
            mem: vec![0xFFu8; mem_size],
            status: 0,
            busy_ticks: 0,
        })
    }

    pub fn geometry(&self) -> crate::config::FlashGeometry {
        self.cfg.geometry
    }

    /// Advances simulated time by `n` ticks, decrementing the busy countdown
    /// and clearing WIP once it reaches zero.
    pub fn tick(&mut self, n: u32) {
        if self.busy_ticks > 0 {
            self.busy_ticks = self.busy_ticks.saturating_sub(n);
            if self.busy_ticks == 0 {
                self.status &= !STATUS_WIP;
            }
        }
    }

    /// Sets the write enable latch unconditionally.
    pub fn wren(&mut self) {
        self.status |= STATUS_WEL;
    }

    /// Returns the current status byte (bit0=WIP, bit1=WEL).
    pub fn rdsr(&self) -> u8 {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status & STATUS_WIP != 0
    }

    pub fn is_write_enabled(&self) -> bool {
        self.status & STATUS_WEL != 0
    }

    /// Reads up to `len` bytes starting at `addr` into `out`, returning the
    /// number of bytes actually read. Always permitted regardless of WIP;
    /// clamps to the device's capacity and returns 0 if `addr` is already
    /// out of range.
    pub fn read(&self, addr: u32, out: &mut [u8]) -> usize {
        let mem_size = self.mem.len() as u32;
        if addr >= mem_size || out.is_empty() {
            return 0;
        }
        let max = (mem_size - addr) as usize;
        let len = out.len().min(max);
        out[..len].copy_from_slice(&self.mem[addr as usize..addr as usize + len]);
        len
    }

    /// Programs up to a page's worth of `data` at `addr` using 1->0 AND
    /// semantics, returning the number of bytes actually programmed (0 on
    /// any precondition failure: busy, WEL clear, or out of bounds).
    pub fn page_program(&mut self, addr: u32, data: &[u8]) -> usize {
        if self.is_busy() || !self.is_write_enabled() {
            return 0;
        }
        let mem_size = self.mem.len() as u32;
        if addr >= mem_size || data.is_empty() {
            return 0;
        }
        let page_size = self.cfg.geometry.page_size;
        let page_off = addr % page_size;
        let room_in_page = (page_size - page_off) as usize;
        let room_in_device = (mem_size - addr) as usize;
        let n = data.len().min(room_in_page).min(room_in_device);

        for i in 0..n {
            self.mem[addr as usize + i] &= data[i];
        }

        self.status |= STATUS_WIP;
        self.status &= !STATUS_WEL;
        self.busy_ticks = self.cfg.timing.prog_busy_ticks;
        n
    }

    /// Erases the sector containing `addr` to 0xFF.
    pub fn sector_erase(&mut self, addr: u32) -> Result<(), Error> {
        if self.is_busy() {
            return Err(Error::EBusy);
        }
        if !self.is_write_enabled() {
            return Err(Error::EInval);
        }
        let mem_size = self.mem.len() as u32;
        if addr >= mem_size {
            return Err(Error::EOob);
        }
        let sector_size = self.cfg.geometry.sector_size;
        let base = (addr / sector_size) * sector_size;
        let n = (sector_size as usize).min(self.mem.len() - base as usize);
        self.mem[base as usize..base as usize + n].fill(0xFF);

        self.status |= STATUS_WIP;
        self.status &= !STATUS_WEL;
        self.busy_ticks = self.cfg.timing.erase_busy_ticks;
        Ok(())
    }
}
