//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the core is a plain state machine: `Machine` holds memory, registers,
//!   stack, timers, keys and the framebuffer; `Machine::step` fetches,
//!   decodes and executes one instruction
//! * faults come back as `Fault` values, the core never exits the process
//! * instruction rate and the 60Hz timers are paced separately by `Clock`
//!   from elapsed wall time, so timers run at the same speed whatever the
//!   instruction rate
//! * interpreter quirks are explicit config (`Quirks`), fixed for a run
//! * display, input and audio sit behind traits so alternatives can plug in;
//!   the default ones use the terminal
//!
//! Model
//!
//! Environment (main)
//!  |-- display, input, sound, quirks, clock
//!  |-- interpreter(machine, clock, display, input, sound)
//!  `-- main loop
//!       |-- poll input; quit, reload, or snapshot the key matrix
//!       |-- clock.drive(machine, elapsed)
//!       |     interleaves machine.step() and machine.tick_timers() in time order
//!       |-- redraw if the framebuffer is dirty; beep while the sound timer runs
//!       `-- sleep until the clock's next event
pub mod clock;
pub mod display;
pub mod error;
pub mod executor;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod quirks;
pub mod sound;

pub use clock::Clock;
pub use error::{Chip8Error, Fault};
pub use executor::Effect;
pub use instruction::Instruction;
pub use machine::Machine;
pub use quirks::{FontLocation, Quirks};
