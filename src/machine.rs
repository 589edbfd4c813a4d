use crate::error::Fault;
use crate::framebuffer::Framebuffer;
use crate::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use crate::quirks::Quirks;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

/// VF doubles as carry, borrow, shifted-out bit and sprite collision output
pub const FLAG_REGISTER: usize = 0xf;

/// Complete machine state. Only the executor mutates it while running; the
/// host may load a ROM (which resets everything) and set the key matrix
/// between steps.
pub struct Machine {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) v: [u8; REGISTER_COUNT],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) sp: u8,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) keypad: [bool; KEY_COUNT],
    pub(crate) framebuffer: Framebuffer,
    pub(crate) dirty: bool,
    pub(crate) quirks: Quirks,
    pub(crate) rng: StdRng,
}

impl Machine {
    /// fresh machine with an entropy-seeded random source
    pub fn new(quirks: Quirks) -> Self {
        Machine::with_rng(quirks, StdRng::from_entropy())
    }

    /// fresh machine with a reproducible random source
    pub fn with_seed(quirks: Quirks, seed: u64) -> Self {
        Machine::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Self {
        Machine {
            memory: Chip8MemoryMap::new(quirks.font),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; KEY_COUNT],
            framebuffer: Framebuffer::new(),
            dirty: false,
            quirks,
            rng,
        }
    }

    /// Reset the whole machine and load a program at 0x200. An oversized ROM
    /// is rejected before anything is touched, so a failed load leaves the
    /// running machine as it was.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Fault> {
        let mut memory = Chip8MemoryMap::new(self.quirks.font);
        memory.load_program(rom)?;

        // the random source carries over; everything else starts again
        let rng = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(0));
        *self = Machine {
            memory,
            ..Machine::with_rng(self.quirks, rng)
        };
        self.dirty = true;
        debug!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    /// replace the whole key matrix; call between steps, never mid-instruction
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keypad = keys;
    }

    /// set one key
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), Fault> {
        let slot = self
            .keypad
            .get_mut(key as usize)
            .ok_or(Fault::InvalidKeyIndex(key))?;
        *slot = pressed;
        Ok(())
    }

    /// decrement both timers once, stopping at zero. Driven at 60Hz by the
    /// clock, not by instruction count.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Checks and clears the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn stack_depth(&self) -> usize {
        self.sp as usize
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryMap, CHIP8_MAX_PROGRAM_BYTES};
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let m = Machine::with_seed(Quirks::default(), 1);
        assert_eq!(m.pc(), 0x200);
        assert_eq!(m.index(), 0);
        assert_eq!(m.registers(), &[0; REGISTER_COUNT]);
        assert_eq!(m.stack_depth(), 0);
        assert_eq!(m.delay_timer(), 0);
        assert_eq!(m.sound_timer(), 0);
        assert!(!m.is_sound_active());
    }

    #[test]
    fn test_load_rom_places_program() -> Result<(), Fault> {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0x12, 0x34, 0x56])?;
        assert_eq!(m.memory.get_word(m.pc())?, 0x1234);
        assert!(m.take_dirty());
        assert!(!m.take_dirty());
        Ok(())
    }

    #[test]
    fn test_load_rom_resets_everything() -> Result<(), Fault> {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0xaa; 16])?;
        m.v[3] = 9;
        m.i = 0x345;
        m.pc = 0x280;
        m.sp = 2;
        m.delay_timer = 10;
        m.sound_timer = 10;
        m.keypad[4] = true;
        m.framebuffer.draw_sprite(0, 0, &[0xff]);

        m.load_rom(&[0x00, 0xe0])?;
        assert_eq!(m.registers(), &[0; REGISTER_COUNT]);
        assert_eq!(m.index(), 0);
        assert_eq!(m.pc(), 0x200);
        assert_eq!(m.stack_depth(), 0);
        assert_eq!(m.delay_timer(), 0);
        assert_eq!(m.sound_timer(), 0);
        assert!(!m.keypad[4]);
        assert_eq!(m.framebuffer(), &Framebuffer::new());
        // previous ROM bytes beyond the new one are gone
        assert_eq!(m.memory.get_ro_slice(0x202, 14)?, &[0; 14]);
        Ok(())
    }

    #[test]
    fn test_failed_load_keeps_running_machine() -> Result<(), Fault> {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0x12, 0x00])?;
        m.v[1] = 7;
        let err = m.load_rom(&vec![0; 5000]);
        assert_eq!(err, Err(Fault::RomTooLarge { size: 5000, max: 3584 }));
        assert_eq!(m.v[1], 7);
        assert_eq!(m.memory.get_word(0x200)?, 0x1200);
        Ok(())
    }

    #[test]
    fn test_timers_stop_at_zero() {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.delay_timer = 2;
        m.sound_timer = 1;
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (1, 0));
        m.tick_timers();
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
    }

    #[test]
    fn test_set_key_bounds() {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        assert_eq!(m.set_key(0xf, true), Ok(()));
        assert!(m.keypad[0xf]);
        assert_eq!(m.set_key(0x10, true), Err(Fault::InvalidKeyIndex(0x10)));
    }

    proptest! {
        #[test]
        fn first_fetch_comes_from_program_start(
            rom in proptest::collection::vec(any::<u8>(), 2..=CHIP8_MAX_PROGRAM_BYTES),
        ) {
            let mut m = Machine::with_seed(Quirks::default(), 1);
            m.load_rom(&rom).unwrap();
            prop_assert_eq!(m.pc(), 0x200);
            let word = m.memory.get_word(m.pc()).unwrap();
            prop_assert_eq!(word, u16::from_be_bytes([rom[0], rom[1]]));
        }
    }
}
