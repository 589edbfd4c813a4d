use crate::error::Fault;
use crate::quirks::FontLocation;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Fault> {
        let bytes = self.get_rw_slice(addr, data.len())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a single byte
    fn get_byte(&self, addr: u16) -> Result<u8, Fault> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16, Fault> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded; everything below is reserved for the interpreter
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest ROM that fits between the program address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// bytes per font glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x01ff  interpreter (font table lives here)
///   0x0200-0x0fff  program
///
/// programs can read anywhere but may only write from 0x200 upwards
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
    font_addr: u16,
}

/// range check shared by both slice accessors
fn checked_range(addr: u16, len: usize) -> Result<std::ops::Range<usize>, Fault> {
    let a = addr as usize;
    let end = a + len;
    if end > CHIP8_RAM_SIZE_BYTES {
        return Err(Fault::OutOfBoundsAccess(a.max(CHIP8_RAM_SIZE_BYTES)));
    }
    Ok(a..end)
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        let range = checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        let range = checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font table baked in
    pub fn new(font: FontLocation) -> Self {
        let font_addr = font.addr();
        let mut bytes = Box::new([0u8; CHIP8_RAM_SIZE_BYTES]);
        let start = font_addr as usize;
        bytes[start..start + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes, font_addr }
    }

    /// load a CHIP-8 program at 0x200; oversized programs are rejected whole
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Fault> {
        if rom.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Fault::RomTooLarge {
                size: rom.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(rom, CHIP8_PROGRAM_ADDR)
    }

    /// slice a running program may write to. The reserved interpreter area
    /// (and so the font table) is off limits.
    pub fn get_program_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        if addr < CHIP8_PROGRAM_ADDR {
            return Err(Fault::OutOfBoundsAccess(addr as usize));
        }
        self.get_rw_slice(addr, len)
    }

    /// address of the glyph for a hex digit
    pub fn font_glyph_addr(&self, digit: u8) -> Result<u16, Fault> {
        if digit > 0xf {
            return Err(Fault::InvalidDigit(digit));
        }
        Ok(self.font_addr + CHIP8_FONT_GLYPH_BYTES * digit as u16)
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
