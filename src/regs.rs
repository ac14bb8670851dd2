//! Register map and command byte constants for the memory-mapped SPI engine.
//!
//! Offsets are byte offsets into a 32-bit, word-addressed register block;
//! only the low bits are semantically significant for the byte-oriented
//! fields (CMD, DIN, DOUT).

/// Command byte (low 8 bits significant).
pub const REG_CMD: u32 = 0x00;
/// 24-bit flash address (low 24 bits significant).
pub const REG_ADDR: u32 = 0x04;
/// Transfer length in bytes.
pub const REG_LEN: u32 = 0x08;
/// Push one byte into the TX FIFO (low 8 bits significant). Write-only.
pub const REG_DIN: u32 = 0x0C;
/// Pop one byte from the RX FIFO (low 8 bits valid), or 0 if empty. Read-only.
pub const REG_DOUT: u32 = 0x10;
/// Bit 0 = CS_EN (informational), bit 1 = START (write-1-to-launch,
/// self-clears after dispatch).
pub const REG_CTRL: u32 = 0x14;
/// Bit 0 = BUSY, bit 1 = RX_AVAIL, bit 2 = TX_SPACE. Read-only.
pub const REG_STATUS: u32 = 0x18;

/// `CTRL` bit: chip-select enable (informational only).
pub const CTRL_CS_EN: u32 = 1 << 0;
/// `CTRL` bit: launch the command latched in CMD/ADDR/LEN. Self-clears.
pub const CTRL_START: u32 = 1 << 1;

/// `STATUS` bit: write-in-progress, mirrors the flash's WIP.
pub const STATUS_BUSY: u32 = 1 << 0;
/// `STATUS` bit: the RX FIFO has at least one byte available.
pub const STATUS_RX_AVAIL: u32 = 1 << 1;
/// `STATUS` bit: the TX FIFO has room for at least one more byte.
pub const STATUS_TX_SPACE: u32 = 1 << 2;

/// 25-series command opcodes understood by the engine's dispatch table.
///
/// These must match on the wire exactly: they are the same values a real
/// SPI NOR part expects on its instruction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Set the write enable latch (WEL).
    WriteEnable = 0x06,
    /// Read the 8-bit status register.
    ReadStatus = 0x05,
    /// Read data starting at the latched address.
    Read = 0x03,
    /// Page-program up to a page's worth of data at the latched address.
    PageProg = 0x02,
    /// Erase the sector containing the latched address.
    SectorErase = 0x20,
}

impl Opcode {
    /// Decode a raw command byte, if it names one of the commands this
    /// engine dispatches. Unknown command bytes are a silent no-op per the
    /// dispatch table, so this returns `None` rather than an error.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x06 => Some(Opcode::WriteEnable),
            0x05 => Some(Opcode::ReadStatus),
            0x03 => Some(Opcode::Read),
            0x02 => Some(Opcode::PageProg),
            0x20 => Some(Opcode::SectorErase),
            _ => None,
        }
    }
}

/// Controller-imposed staging bound for a single Page Program dispatch: the
/// engine only drains up to this many bytes from the TX FIFO per PP command,
/// regardless of what LEN claims.
pub const PP_STAGING_BOUND: usize = 256;

/// Address mask applied to ADDR on latch and on dispatch (24-bit address
/// space).
pub const ADDR_MASK: u32 = 0x00FF_FFFF;
