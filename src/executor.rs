use crate::error::Fault;
use crate::instruction::Instruction;
use crate::machine::{Machine, FLAG_REGISTER, KEY_COUNT, STACK_DEPTH};
use crate::memory::MemoryMap;
use log::{debug, trace};
use rand::Rng;

/// What an executed instruction means for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// the framebuffer changed
    DisplayDirty,
    /// Fx0A found no key down; pc was left on the same instruction
    WaitingForKey,
}

/// the 12-bit address space I is meant to stay inside
const ADDRESS_LIMIT: u32 = 0x0fff;

impl Machine {
    /// Fetch, decode and execute one instruction. On a fault the machine is
    /// left exactly as it was, with pc on the faulting instruction.
    pub fn step(&mut self) -> Result<Effect, Fault> {
        let addr = self.pc;
        let word = self.memory.get_word(addr)?;
        let instruction = Instruction::decode(word);
        trace!("{:#05x}: {:04x} {:?}", addr, word, instruction);

        self.pc += 2;
        self.execute(instruction).map_err(|fault| {
            self.pc = addr;
            fault
        })
    }

    /// Apply one decoded instruction. Expects pc to already point past it.
    /// Every bounds check happens before the first write, so an error leaves
    /// registers, memory and the stack untouched.
    pub(crate) fn execute(&mut self, instruction: Instruction) -> Result<Effect, Fault> {
        match instruction {
            Instruction::MachineCall(addr) => {
                debug!("ignoring machine code call to {:#05x}", addr);
            }
            Instruction::ClearScreen => {
                self.framebuffer.clear();
                return Ok(self.mark_dirty());
            }
            Instruction::Return => self.pc = self.pop_stack()?,
            Instruction::Jump(nnn) => self.pc = nnn,
            Instruction::Call(nnn) => {
                self.push_stack(self.pc)?;
                self.pc = nnn;
            }
            Instruction::SkipIfEqualImmediate { x, kk } => self.skip_if(self.reg(x) == kk),
            Instruction::SkipIfNotEqualImmediate { x, kk } => self.skip_if(self.reg(x) != kk),
            Instruction::SkipIfEqualRegisters { x, y } => self.skip_if(self.reg(x) == self.reg(y)),
            Instruction::SkipIfNotEqualRegisters { x, y } => {
                self.skip_if(self.reg(x) != self.reg(y))
            }
            Instruction::LoadImmediate { x, kk } => self.set_reg(x, kk),
            // no carry out of 7xkk
            Instruction::AddImmediate { x, kk } => self.set_reg(x, self.reg(x).wrapping_add(kk)),
            Instruction::Load { x, y } => self.set_reg(x, self.reg(y)),
            Instruction::Or { x, y } => self.set_reg(x, self.reg(x) | self.reg(y)),
            Instruction::And { x, y } => self.set_reg(x, self.reg(x) & self.reg(y)),
            Instruction::Xor { x, y } => self.set_reg(x, self.reg(x) ^ self.reg(y)),
            Instruction::Add { x, y } => {
                let (sum, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_reg_and_flag(x, sum, carry);
            }
            Instruction::Sub { x, y } => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_reg_and_flag(x, vx.wrapping_sub(vy), vx >= vy);
            }
            Instruction::SubN { x, y } => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_reg_and_flag(x, vy.wrapping_sub(vx), vy >= vx);
            }
            Instruction::ShiftRight { x, y } => {
                let value = self.shift_source(x, y);
                self.set_reg_and_flag(x, value >> 1, value & 0x01 != 0);
            }
            Instruction::ShiftLeft { x, y } => {
                let value = self.shift_source(x, y);
                self.set_reg_and_flag(x, value << 1, value & 0x80 != 0);
            }
            Instruction::LoadIndex(nnn) => self.i = nnn,
            Instruction::JumpOffset(nnn) => self.pc = nnn + self.reg(0) as u16,
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.gen();
                self.set_reg(x, byte & kk);
            }
            Instruction::Draw { x, y, n } => {
                let (vx, vy) = (self.reg(x) as usize, self.reg(y) as usize);
                let rows = self.memory.get_ro_slice(self.i, n as usize)?;
                let collision = self.framebuffer.draw_sprite(vx, vy, rows);
                self.v[FLAG_REGISTER] = collision as u8;
                return Ok(self.mark_dirty());
            }
            Instruction::SkipIfKeyPressed { x } => {
                let pressed = self.key(self.reg(x))?;
                self.skip_if(pressed);
            }
            Instruction::SkipIfKeyNotPressed { x } => {
                let pressed = self.key(self.reg(x))?;
                self.skip_if(!pressed);
            }
            Instruction::LoadDelayTimer { x } => self.set_reg(x, self.delay_timer),
            Instruction::WaitForKey { x } => match self.keypad.iter().position(|&k| k) {
                Some(key) => self.set_reg(x, key as u8),
                None => {
                    // fetch again next cycle; timers keep running meanwhile
                    self.pc = self.pc.wrapping_sub(2);
                    return Ok(Effect::WaitingForKey);
                }
            },
            Instruction::SetDelayTimer { x } => self.delay_timer = self.reg(x),
            Instruction::SetSoundTimer { x } => self.sound_timer = self.reg(x),
            Instruction::AddToIndex { x } => {
                // saturate so an out-of-range I stays out of range and faults on use
                let sum = self.i as u32 + self.reg(x) as u32;
                if self.quirks.index_overflow_sets_flag {
                    self.v[FLAG_REGISTER] = (sum > ADDRESS_LIMIT) as u8;
                }
                self.i = sum.min(u16::MAX as u32) as u16;
            }
            Instruction::LoadFontAddress { x } => self.i = self.memory.font_glyph_addr(self.reg(x))?,
            Instruction::StoreBcd { x } => {
                let value = self.reg(x);
                let digits = self.memory.get_program_rw_slice(self.i, 3)?;
                digits[0] = value / 100;
                digits[1] = value / 10 % 10;
                digits[2] = value % 10;
            }
            Instruction::StoreRegisters { x } => {
                let count = x as usize + 1;
                let dst = self.memory.get_program_rw_slice(self.i, count)?;
                dst.copy_from_slice(&self.v[..count]);
                self.advance_index(count);
            }
            Instruction::LoadRegisters { x } => {
                let count = x as usize + 1;
                let src = self.memory.get_ro_slice(self.i, count)?;
                self.v[..count].copy_from_slice(src);
                self.advance_index(count);
            }
            Instruction::Unknown(word) => return Err(Fault::UnknownOpcode(word)),
        }
        Ok(Effect::None)
    }

    fn reg(&self, x: u8) -> u8 {
        self.v[x as usize]
    }

    fn set_reg(&mut self, x: u8, value: u8) {
        self.v[x as usize] = value;
    }

    /// Write a result and then VF. Operands are read by the caller first, and
    /// the flag goes last, so with x = F the register ends up holding the flag.
    fn set_reg_and_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.v[x as usize] = value;
        self.v[FLAG_REGISTER] = flag as u8;
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        if self.quirks.shift_reads_vy {
            self.reg(y)
        } else {
            self.reg(x)
        }
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc += 2;
        }
    }

    fn key(&self, key: u8) -> Result<bool, Fault> {
        if key as usize >= KEY_COUNT {
            return Err(Fault::InvalidKeyIndex(key));
        }
        Ok(self.keypad[key as usize])
    }

    fn advance_index(&mut self, count: usize) {
        if self.quirks.load_store_advances_index {
            self.i += count as u16;
        }
    }

    fn mark_dirty(&mut self) -> Effect {
        self.dirty = true;
        Effect::DisplayDirty
    }

    fn push_stack(&mut self, addr: u16) -> Result<(), Fault> {
        if self.sp as usize >= STACK_DEPTH {
            return Err(Fault::StackOverflow);
        }
        self.stack[self.sp as usize] = addr;
        self.sp += 1;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }
}
