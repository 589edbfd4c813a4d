use beep::beep;
use std::io;

/// makes the one noise a CHIP-8 can make, for as long as the sound timer runs
pub trait Sound {
    fn beep(&mut self) -> Result<(), io::Error>;
    fn stop(&mut self) -> Result<(), io::Error>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker beep
pub struct SimpleBeep {}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep {}
    }

    fn set_pitch(pitch: u16) -> Result<(), io::Error> {
        beep(pitch).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), io::Error> {
        SimpleBeep::set_pitch(SIMPLEBEEP_PITCH)
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        SimpleBeep::set_pitch(0)
    }
}

pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

/// counts beeps and stops, for tests
#[cfg(test)]
#[derive(Default)]
pub struct CountingSound {
    pub beeps: usize,
    pub stops: usize,
}

#[cfg(test)]
impl Sound for CountingSound {
    fn beep(&mut self) -> Result<(), io::Error> {
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        self.stops += 1;
        Ok(())
    }
}
