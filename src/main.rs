use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chip8vm::display::MonoTermDisplay;
use chip8vm::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8vm::input::TermInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::{Clock, FontLocation, Machine, Quirks};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Modern,
    CosmacVip,
}

#[derive(Parser, Debug)]
#[command(name = "chip8vm")]
#[command(about = "CHIP-8 interpreter for the terminal", long_about = None)]
struct Args {
    /// Terminal cells per CHIP-8 pixel
    scale: u16,

    /// Milliseconds between instructions
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    delay: u64,

    /// Path to the ROM image
    rom: PathBuf,

    /// Quirk profile to start from
    #[arg(long, value_enum, default_value_t = Profile::Modern)]
    quirks: Profile,

    /// Put the font at 0x000 instead of 0x050
    #[arg(long)]
    font_low: bool,

    /// Fx55/Fx65 advance I past the registers copied
    #[arg(long)]
    advance_index: bool,

    /// Fx1E sets VF when I leaves the 12-bit address space
    #[arg(long)]
    index_overflow_flag: bool,

    /// 8xy6/8xyE shift Vy into Vx
    #[arg(long)]
    shift_vy: bool,

    /// No beeping
    #[arg(long)]
    mute: bool,
}

impl Args {
    fn quirks(&self) -> Quirks {
        let mut quirks = match self.quirks {
            Profile::Modern => Quirks::modern(),
            Profile::CosmacVip => Quirks::cosmac_vip(),
        };
        if self.font_low {
            quirks.font = FontLocation::Low;
        }
        quirks.load_store_advances_index |= self.advance_index;
        quirks.index_overflow_sets_flag |= self.index_overflow_flag;
        quirks.shift_reads_vy |= self.shift_vy;
        quirks
    }
}

/// Read the ROM and load it into a fresh machine, so a missing or oversized
/// ROM is reported before the terminal is taken over.
fn boot(path: &Path, quirks: Quirks) -> Result<(Machine, Vec<u8>)> {
    let rom = fs::read(path).with_context(|| format!("failed to open ROM {}", path.display()))?;
    let mut machine = Machine::new(quirks);
    machine
        .load_rom(&rom)
        .with_context(|| format!("failed to load ROM {}", path.display()))?;
    Ok((machine, rom))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let quirks = args.quirks();
    let (machine, rom) = boot(&args.rom, quirks)?;
    let clock = Clock::with_cycle_period(Duration::from_millis(args.delay));
    log::info!(
        "running {} with {:?}, one instruction every {:?}",
        args.rom.display(),
        quirks,
        clock.cycle_period()
    );

    let mut display = MonoTermDisplay::new(SCREEN_WIDTH, SCREEN_HEIGHT, args.scale)?;
    let mut input = TermInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter = Chip8Interpreter::new(
        machine,
        clock,
        &mut display,
        &mut input,
        sound.as_mut(),
    );

    interpreter
        .load_program(&mut rom.as_slice())
        .with_context(|| format!("failed to load ROM {}", args.rom.display()))?;
    interpreter.main_loop()?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    Ok(())
}
