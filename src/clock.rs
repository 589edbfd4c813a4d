use crate::error::Fault;
use crate::executor::Effect;
use crate::machine::Machine;
use std::num::NonZeroU32;
use std::time::Duration;

/// the delay and sound timers count down at this rate, whatever the CPU speed
pub const TIMER_HZ: u32 = 60;

/// never try to catch up on more than this much wall time in one go; a host
/// that was suspended for a minute shouldn't then burn through a minute of
/// instructions
pub const MAX_CATCH_UP: Duration = Duration::from_secs(1);

/// What happened during one call to `Clock::drive`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub cycles: u32,
    pub timer_ticks: u32,
    /// the framebuffer changed at least once
    pub dirty: bool,
    /// the last executed instruction was a wait for key with nothing pressed
    pub waiting_for_key: bool,
}

/// Fixed-rate scheduler for two independent periodic events: instruction
/// issue (configurable) and timer decrement (always 60Hz). Both are paced
/// by elapsed time handed in by the caller, never by counting each other.
#[derive(Debug, Clone)]
pub struct Clock {
    cycle_period: Duration,
    timer_period: Duration,
    // time accumulated towards the next event of each kind; always less than
    // the matching period between calls
    cycle_debt: Duration,
    timer_debt: Duration,
}

impl Clock {
    /// clock issuing `cycles_per_second` instructions
    pub fn new(cycles_per_second: NonZeroU32) -> Self {
        Clock::with_cycle_period(Duration::from_secs(1) / cycles_per_second.get())
    }

    /// clock issuing one instruction every `period`
    pub fn with_cycle_period(period: Duration) -> Self {
        Clock {
            cycle_period: period.max(Duration::from_nanos(1)),
            timer_period: Duration::from_secs(1) / TIMER_HZ,
            cycle_debt: Duration::ZERO,
            timer_debt: Duration::ZERO,
        }
    }

    pub fn cycle_period(&self) -> Duration {
        self.cycle_period
    }

    /// time until whichever event falls due first
    pub fn until_next(&self) -> Duration {
        (self.cycle_period - self.cycle_debt).min(self.timer_period - self.timer_debt)
    }

    /// forget any partially accumulated time, e.g. after a ROM reload
    pub fn reset(&mut self) {
        self.cycle_debt = Duration::ZERO;
        self.timer_debt = Duration::ZERO;
    }

    /// Run the machine for `elapsed` of wall time: every instruction and
    /// timer tick that falls due is applied in time order, one at a time.
    /// A fault stops the run immediately; time up to the fault is kept.
    pub fn drive(&mut self, machine: &mut Machine, elapsed: Duration) -> Result<Frame, Fault> {
        let mut remaining = elapsed.min(MAX_CATCH_UP);
        let mut frame = Frame::default();
        loop {
            let next = self.until_next();
            if next > remaining {
                self.cycle_debt += remaining;
                self.timer_debt += remaining;
                return Ok(frame);
            }
            remaining -= next;
            self.cycle_debt += next;
            self.timer_debt += next;

            if self.timer_debt >= self.timer_period {
                self.timer_debt -= self.timer_period;
                machine.tick_timers();
                frame.timer_ticks += 1;
            }
            if self.cycle_debt >= self.cycle_period {
                self.cycle_debt -= self.cycle_period;
                let effect = machine.step()?;
                frame.cycles += 1;
                frame.dirty |= effect == Effect::DisplayDirty;
                frame.waiting_for_key = effect == Effect::WaitingForKey;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quirks::Quirks;

    fn looping_machine() -> Machine {
        // 0x200: jp 0x200
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0x12, 0x00]).unwrap();
        m
    }

    fn hz(rate: u32) -> NonZeroU32 {
        NonZeroU32::new(rate).unwrap()
    }

    /// drive for one simulated second in uneven slices
    fn drive_one_second(clock: &mut Clock, m: &mut Machine) -> Result<Frame, Fault> {
        let mut total = Frame::default();
        let mut left = Duration::from_secs(1);
        let slices = [3, 7, 11, 2, 17].map(Duration::from_millis);
        for slice in slices.iter().cycle() {
            if left.is_zero() {
                break;
            }
            let step = (*slice).min(left);
            left -= step;
            let frame = clock.drive(m, step)?;
            total.cycles += frame.cycles;
            total.timer_ticks += frame.timer_ticks;
        }
        Ok(total)
    }

    #[test]
    fn test_timer_rate_independent_of_cpu_rate() -> Result<(), Fault> {
        for rate in [1, 10, 500, 700, 5000] {
            let mut m = looping_machine();
            m.delay_timer = 120;
            let mut clock = Clock::new(hz(rate));
            let frame = drive_one_second(&mut clock, &mut m)?;
            assert!(
                (59..=61).contains(&m.delay_timer()),
                "rate {} left delay at {}",
                rate,
                m.delay_timer()
            );
            assert_eq!(frame.timer_ticks, 60);
            assert_eq!(frame.cycles, rate);
        }
        Ok(())
    }

    #[test]
    fn test_single_long_drive() -> Result<(), Fault> {
        let mut m = looping_machine();
        m.delay_timer = 120;
        m.sound_timer = 30;
        let mut clock = Clock::new(hz(700));
        let frame = clock.drive(&mut m, Duration::from_secs(1))?;
        assert_eq!(frame.timer_ticks, 60);
        assert_eq!(m.delay_timer(), 60);
        assert_eq!(m.sound_timer(), 0);
        Ok(())
    }

    #[test]
    fn test_catch_up_is_capped() -> Result<(), Fault> {
        let mut m = looping_machine();
        let mut clock = Clock::new(hz(100));
        let frame = clock.drive(&mut m, Duration::from_secs(30))?;
        assert_eq!(frame.cycles, 100);
        assert_eq!(frame.timer_ticks, 60);
        Ok(())
    }

    #[test]
    fn test_short_drive_runs_nothing() -> Result<(), Fault> {
        let mut m = looping_machine();
        let mut clock = Clock::new(hz(100));
        let frame = clock.drive(&mut m, Duration::from_millis(5))?;
        assert_eq!(frame, Frame::default());
        assert_eq!(clock.until_next(), Duration::from_millis(5));
        let frame = clock.drive(&mut m, Duration::from_millis(5))?;
        assert_eq!(frame.cycles, 1);
        Ok(())
    }

    #[test]
    fn test_timers_run_while_waiting_for_key() -> Result<(), Fault> {
        // 0x200: ld v0, k
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0xf0, 0x0a])?;
        m.delay_timer = 30;
        let mut clock = Clock::new(hz(500));
        let frame = clock.drive(&mut m, Duration::from_millis(500))?;
        assert!(frame.waiting_for_key);
        assert_eq!(m.pc(), 0x200);
        assert_eq!(m.delay_timer(), 0);

        m.set_key(0x5, true)?;
        let frame = clock.drive(&mut m, clock.cycle_period())?;
        assert!(!frame.waiting_for_key);
        assert_eq!(m.registers()[0], 0x5);
        assert_eq!(m.pc(), 0x202);
        Ok(())
    }

    #[test]
    fn test_fault_stops_drive() {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0x60, 0x01, 0x00, 0xee]).unwrap();
        let mut clock = Clock::new(hz(100));
        assert_eq!(
            clock.drive(&mut m, Duration::from_secs(1)),
            Err(Fault::StackUnderflow)
        );
        assert_eq!(m.pc(), 0x202);
        assert_eq!(m.registers()[0], 1);
    }

    #[test]
    fn test_dirty_reported() -> Result<(), Fault> {
        let mut m = Machine::with_seed(Quirks::default(), 1);
        m.load_rom(&[0x00, 0xe0, 0x12, 0x02])?;
        let mut clock = Clock::new(hz(100));
        let frame = clock.drive(&mut m, Duration::from_millis(100))?;
        assert!(frame.dirty);
        let frame = clock.drive(&mut m, Duration::from_millis(100))?;
        assert!(!frame.dirty);
        Ok(())
    }
}
