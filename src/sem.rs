//! SPI Engine Model: a memory-mapped register interface fronting a
//! [`FlashDeviceModel`] with two byte FIFOs (TX for program data, RX for
//! read/status data). Dispatches exactly one flash operation per START
//! pulse.

use crate::fdm::FlashDeviceModel;
use crate::fifo::ByteFifo;
use crate::regs::{self, Opcode, ADDR_MASK, PP_STAGING_BOUND};

/// Default FIFO depth, matching the reference controller instantiation.
/// Large enough that a single READ/PP dispatch can carry a multi-page
/// transfer without the driver's single-dispatch-per-call design starving
/// against FIFO depth.
pub const DEFAULT_FIFO_CAPACITY: usize = 1024;

/// A memory-mapped SPI controller in front of one [`FlashDeviceModel`].
///
/// Owns its FIFOs; owns the flash model it dispatches into (the ownership
/// chain Driver -> SpiEngineModel -> FlashDeviceModel is strictly one-way,
/// so the model is held by value rather than by a shared reference).
pub struct SpiEngineModel {
    flash: FlashDeviceModel,
    cmd: u8,
    addr: u32,
    len: u32,
    ctrl: u32,
    tx: ByteFifo,
    rx: ByteFifo,
}

impl SpiEngineModel {
    /// Wraps `flash` with FIFOs of `fifo_capacity` bytes each.
    pub fn new(flash: FlashDeviceModel, fifo_capacity: usize) -> Self {
        Self {
            flash,
            cmd: 0,
            addr: 0,
            len: 0,
            ctrl: 0,
            tx: ByteFifo::new(fifo_capacity),
            rx: ByteFifo::new(fifo_capacity),
        }
    }

    /// Gives back the flash model, consuming the engine.
    pub fn into_flash(self) -> FlashDeviceModel {
        self.flash
    }

    pub fn flash(&self) -> &FlashDeviceModel {
        &self.flash
    }

    fn status(&self) -> u32 {
        let mut s = 0u32;
        if self.flash.is_busy() {
            s |= regs::STATUS_BUSY;
        }
        if !self.rx.is_empty() {
            s |= regs::STATUS_RX_AVAIL;
        }
        if self.tx.has_space() {
            s |= regs::STATUS_TX_SPACE;
        }
        s
    }

    /// Handles a register write. Writing CTRL with START set dispatches the
    /// latched command synchronously and clears START before returning.
    pub fn write(&mut self, offset: u32, value: u32) {
        match offset {
            regs::REG_CMD => self.cmd = (value & 0xFF) as u8,
            regs::REG_ADDR => self.addr = value & ADDR_MASK,
            regs::REG_LEN => self.len = value,
            regs::REG_DIN => {
                #[cfg(feature = "defmt")]
                if !self.tx.push((value & 0xFF) as u8) {
                    defmt::trace!("sem: DIN dropped, TX FIFO full");
                }
                #[cfg(not(feature = "defmt"))]
                {
                    self.tx.push((value & 0xFF) as u8);
                }
            }
            regs::REG_CTRL => {
                self.ctrl = value;
                if self.ctrl & regs::CTRL_START != 0 {
                    self.dispatch();
                    self.ctrl &= !regs::CTRL_START;
                }
            }
            _ => {}
        }
    }

    /// Handles a register read. Popping DOUT drains one RX byte (0 if
    /// empty); reading STATUS recomputes the three live flags.
    pub fn read(&mut self, offset: u32) -> u32 {
        match offset {
            regs::REG_CMD => self.cmd as u32,
            regs::REG_ADDR => self.addr,
            regs::REG_LEN => self.len,
            regs::REG_DOUT => self.rx.pop().unwrap_or(0) as u32,
            regs::REG_CTRL => self.ctrl,
            regs::REG_STATUS => self.status(),
            _ => 0,
        }
    }

    /// Advances simulated time, forwarding to the flash model.
    pub fn tick(&mut self, n: u32) {
        self.flash.tick(n);
    }

    fn dispatch(&mut self) {
        let Some(op) = Opcode::from_byte(self.cmd) else {
            #[cfg(feature = "defmt")]
            defmt::trace!("sem: no-op dispatch for unknown cmd {=u8:#x}", self.cmd);
            return;
        };
        #[cfg(feature = "defmt")]
        defmt::trace!("sem: dispatch {=u8:#x}", self.cmd);
        match op {
            Opcode::WriteEnable => self.flash.wren(),
            Opcode::ReadStatus => self.dispatch_rdsr(),
            Opcode::Read => self.dispatch_read(),
            Opcode::PageProg => self.dispatch_page_program(),
            Opcode::SectorErase => {
                let _ = self.flash.sector_erase(self.addr);
            }
        }
    }

    fn dispatch_rdsr(&mut self) {
        for _ in 0..self.len {
            if self.rx.is_full() {
                break;
            }
            self.rx.push(self.flash.rdsr());
        }
    }

    fn dispatch_read(&mut self) {
        let mut addr = self.addr;
        let mut remaining = self.len;
        let mut chunk = [0u8; PP_STAGING_BOUND];
        while remaining > 0 {
            let want = (remaining as usize).min(chunk.len());
            let got = self.flash.read(addr, &mut chunk[..want]);
            if got == 0 {
                break;
            }
            for &b in &chunk[..got] {
                if !self.rx.push(b) {
                    return; // RX full
                }
            }
            addr += got as u32;
            remaining -= got as u32;
        }
    }

    fn dispatch_page_program(&mut self) {
        let want = (self.len as usize).min(PP_STAGING_BOUND);
        let mut staged = [0u8; PP_STAGING_BOUND];
        let mut n = 0usize;
        while n < want {
            match self.tx.pop() {
                Some(b) => {
                    staged[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        let _ = self.flash.page_program(self.addr, &staged[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FdmConfig, FdmTiming, FlashGeometry};

    fn small_engine() -> SpiEngineModel {
        let flash = FlashDeviceModel::init(FdmConfig {
            geometry: FlashGeometry::new(4096, 256, 4096).unwrap(),
            timing: FdmTiming {
                prog_busy_ticks: 4,
                erase_busy_ticks: 64,
            },
        })
        .unwrap();
        SpiEngineModel::new(flash, DEFAULT_FIFO_CAPACITY)
    }

    fn start(e: &mut SpiEngineModel, cmd: u8, addr: u32, len: u32) {
        e.write(regs::REG_CMD, cmd as u32);
        e.write(regs::REG_ADDR, addr);
        e.write(regs::REG_LEN, len);
        e.write(regs::REG_CTRL, regs::CTRL_CS_EN | regs::CTRL_START);
    }

    #[test]
    fn s1_rdsr_at_reset_is_all_zero() {
        let mut e = small_engine();
        start(&mut e, 0x05, 0, 4);
        for _ in 0..4 {
            let b = e.read(regs::REG_DOUT);
            assert_eq!(b & 0b11, 0);
        }
    }

    #[test]
    fn s2_pp_then_readback() {
        let mut e = small_engine();
        start(&mut e, 0x06, 0, 0); // WREN
        for b in [0xDE, 0xAD, 0xBE, 0xEF] {
            e.write(regs::REG_DIN, b);
        }
        start(&mut e, 0x02, 0x10, 4); // PP
        e.tick(10);
        start(&mut e, 0x03, 0x10, 4); // READ
        let got: Vec<u32> = (0..4).map(|_| e.read(regs::REG_DOUT)).collect();
        assert_eq!(got, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn s3_pp_without_wren_leaves_memory_unchanged() {
        let mut e = small_engine();
        start(&mut e, 0x03, 0x20, 2);
        assert_eq!(
            (0..2).map(|_| e.read(regs::REG_DOUT)).collect::<Vec<_>>(),
            vec![0xFF, 0xFF]
        );
        e.write(regs::REG_DIN, 0x12);
        e.write(regs::REG_DIN, 0x34);
        start(&mut e, 0x02, 0x20, 2); // PP, no WREN issued first
        e.tick(10);
        start(&mut e, 0x03, 0x20, 2);
        assert_eq!(
            (0..2).map(|_| e.read(regs::REG_DOUT)).collect::<Vec<_>>(),
            vec![0xFF, 0xFF]
        );
    }

    #[test]
    fn s4_engine_level_page_boundary_truncation() {
        let mut e = small_engine();
        start(&mut e, 0x06, 0, 0);
        for b in [0xAA, 0xBB, 0xCC, 0xDD] {
            e.write(regs::REG_DIN, b);
        }
        start(&mut e, 0x02, 0xFE, 4);
        e.tick(10);
        start(&mut e, 0x03, 0xFE, 4);
        let got: Vec<u32> = (0..4).map(|_| e.read(regs::REG_DOUT)).collect();
        assert_eq!(got, vec![0xAA, 0xBB, 0xFF, 0xFF]);
    }

    #[test]
    fn s5_and_reprogram() {
        let mut e = small_engine();
        start(&mut e, 0x06, 0, 0);
        e.write(regs::REG_DIN, 0xAA);
        start(&mut e, 0x02, 0x100, 1);
        e.tick(10);
        start(&mut e, 0x06, 0, 0);
        e.write(regs::REG_DIN, 0x55);
        start(&mut e, 0x02, 0x100, 1);
        e.tick(10);
        start(&mut e, 0x03, 0x100, 1);
        assert_eq!(e.read(regs::REG_DOUT), 0x00);
    }

    #[test]
    fn s6_sector_erase() {
        let mut e = small_engine();
        start(&mut e, 0x06, 0, 0);
        for b in [0x00, 0x11, 0x22] {
            e.write(regs::REG_DIN, b);
        }
        start(&mut e, 0x02, 0x200, 3);
        e.tick(10);
        start(&mut e, 0x06, 0, 0);
        start(&mut e, 0x20, 0x200, 0);
        e.tick(100);
        start(&mut e, 0x03, 0x200, 3);
        let got: Vec<u32> = (0..3).map(|_| e.read(regs::REG_DOUT)).collect();
        assert_eq!(got, vec![0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn status_bit_ordering_matches_the_register_contract() {
        let mut e = small_engine();
        // RX empty, TX has room, not busy: only TX_SPACE set.
        assert_eq!(e.read(regs::REG_STATUS), regs::STATUS_TX_SPACE);
        start(&mut e, 0x05, 0, 1);
        assert_eq!(
            e.read(regs::REG_STATUS),
            regs::STATUS_TX_SPACE | regs::STATUS_RX_AVAIL
        );
    }
}
