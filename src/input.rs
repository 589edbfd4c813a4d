use crate::machine::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// map of keys on the left-hand side of a qwerty keyboard to the COSMAC
/// hex keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// most terminals never say when a key goes up, so a key counts as held for
/// this long after its last press (or auto-repeat)
const KEY_HOLD: Duration = Duration::from_millis(200);

/// Requests from the user to the emulator itself, rather than to the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    /// reset the machine and start the current ROM again
    Reload,
}

/// reads keypresses
pub trait Input {
    /// take in pending host events; returns a command for the emulator if the
    /// user asked for one
    fn poll(&mut self) -> Result<Option<HostCommand>, io::Error>;

    /// which of the 16 keys are down right now
    fn key_state(&self) -> [bool; KEY_COUNT];
}

/// Remembers when each key was last seen going down, and turns that into a
/// held/not-held snapshot.
#[derive(Debug, Default)]
struct KeyLatch {
    pressed_at: [Option<Instant>; KEY_COUNT],
}

impl KeyLatch {
    fn press(&mut self, key: u8, at: Instant) {
        self.pressed_at[key as usize] = Some(at);
    }

    fn release(&mut self, key: u8) {
        self.pressed_at[key as usize] = None;
    }

    fn state_at(&self, now: Instant) -> [bool; KEY_COUNT] {
        self.pressed_at
            .map(|at| at.map_or(false, |at| now.saturating_duration_since(at) < KEY_HOLD))
    }
}

/// Input from the terminal, via crossterm in raw mode.
/// Esc or ctrl-c quits, F1 reloads the ROM.
pub struct TermInput {
    latch: KeyLatch,
    keymap: HashMap<char, u8>,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            latch: KeyLatch::default(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn handle_key(&mut self, evt: KeyEvent) -> Option<HostCommand> {
        match evt.code {
            KeyCode::Esc => return Some(HostCommand::Quit),
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(HostCommand::Quit)
            }
            KeyCode::F(1) => return Some(HostCommand::Reload),
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(&mapped_key) => match evt.kind {
                    KeyEventKind::Release => self.latch.release(mapped_key),
                    _ => self.latch.press(mapped_key, Instant::now()),
                },
                None => warn!("can't map {:?} to a COSMAC key", key),
            },
            other => warn!("unmapped key event {:?}", other),
        }
        None
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<Option<HostCommand>, io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if let Some(command) = self.handle_key(evt) {
                    return Ok(Some(command));
                }
            }
        }
        Ok(None)
    }

    fn key_state(&self) -> [bool; KEY_COUNT] {
        self.latch.state_at(Instant::now())
    }
}

/// scripted Input implementation for testing. Each poll hands out the next
/// scripted step; once the script runs out it asks to quit.
pub struct DummyInput {
    keys: [bool; KEY_COUNT],
    script: VecDeque<Option<HostCommand>>,
}

impl DummyInput {
    pub fn new(keys: &[u8], script: &[Option<HostCommand>]) -> Self {
        let mut state = [false; KEY_COUNT];
        for &k in keys {
            state[k as usize & 0xf] = true;
        }
        DummyInput {
            keys: state,
            script: script.iter().copied().collect(),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Option<HostCommand>, io::Error> {
        Ok(self.script.pop_front().unwrap_or(Some(HostCommand::Quit)))
    }

    fn key_state(&self) -> [bool; KEY_COUNT] {
        self.keys
    }
}
