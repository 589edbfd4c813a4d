//! # interpreter
//!
//! The host side of the machine: owns the one `Machine`, paces it with a
//! `Clock`, feeds it key snapshots and passes frames and beeps out to the
//! attached devices. Everything runs on one thread, so the machine is never
//! observed half way through an instruction and keys only change between
//! batches of instructions.
use crate::clock::Clock;
use crate::display::Display;
use crate::error::{Chip8Error, Fault};
use crate::input::{HostCommand, Input};
use crate::machine::Machine;
use crate::sound::Sound;
use log::{debug, error};
use std::io;
use std::time::{Duration, Instant};

/// how long to idle between polls once the machine has faulted
const HALTED_POLL: Duration = Duration::from_millis(16);

pub struct Chip8Interpreter<'a> {
    machine: Machine,
    clock: Clock,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    rom: Vec<u8>,
    beeping: bool,
    halted: Option<Fault>,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        machine: Machine,
        clock: Clock,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        Chip8Interpreter {
            machine,
            clock,
            display,
            input,
            sound,
            rom: Vec::new(),
            beeping: false,
            halted: None,
        }
    }

    /// load a chip8 program, resetting the machine; the program is kept so
    /// it can be reloaded later
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.machine.load_rom(&rom)?;
        self.rom = rom;
        self.restart();
        Ok(())
    }

    /// start the current program again from a clean machine
    pub fn reload(&mut self) -> Result<(), Chip8Error> {
        debug!("reloading ROM");
        self.machine.load_rom(&self.rom)?;
        self.restart();
        Ok(())
    }

    fn restart(&mut self) {
        self.clock.reset();
        self.halted = None;
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// the fault that stopped the machine, if it has stopped
    pub fn halted(&self) -> Option<Fault> {
        self.halted
    }

    /// One pass of the host loop covering `elapsed` of wall time. Returns
    /// false once the user has asked to quit.
    ///
    /// A fault freezes the machine: no more instructions or timer ticks, the
    /// last frame stays up, but quit and reload still work.
    pub fn run_slice(&mut self, elapsed: Duration) -> Result<bool, Chip8Error> {
        match self.input.poll()? {
            Some(HostCommand::Quit) => return Ok(false),
            Some(HostCommand::Reload) => self.reload()?,
            None => {}
        }

        if self.halted.is_none() {
            self.machine.set_keys(self.input.key_state());
            if let Err(fault) = self.clock.drive(&mut self.machine, elapsed) {
                error!("machine halted at {:#05x}: {}", self.machine.pc(), fault);
                self.halted = Some(fault);
            }
        }

        if self.machine.take_dirty() {
            let frame = self.machine.framebuffer().packed();
            let expected = self.display.get_display_size_bytes();
            if frame.len() != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("display wants {} bytes a frame, got {}", expected, frame.len()),
                )
                .into());
            }
            self.display.draw(&frame)?;
        }
        self.update_sound()?;
        Ok(true)
    }

    fn update_sound(&mut self) -> Result<(), io::Error> {
        let wanted = self.halted.is_none() && self.machine.is_sound_active();
        if wanted && !self.beeping {
            self.sound.beep()?;
        } else if !wanted && self.beeping {
            self.sound.stop()?;
        }
        self.beeping = wanted;
        Ok(())
    }

    /// run until the user quits
    pub fn main_loop(&mut self) -> Result<(), Chip8Error> {
        let mut last = Instant::now();
        loop {
            let now = Instant::now();
            if !self.run_slice(now - last)? {
                break;
            }
            last = now;
            let pause = match self.halted {
                Some(_) => HALTED_POLL,
                None => self.clock.until_next(),
            };
            spin_sleep::sleep(pause);
        }
        if self.beeping {
            self.sound.stop()?;
            self.beeping = false;
        }
        Ok(())
    }
}
