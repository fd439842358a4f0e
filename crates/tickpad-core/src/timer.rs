use crate::registers::{DIV, Interrupt, RegisterFile, TAC, TIMA, TMA};

#[cfg(feature = "timer-trace")]
macro_rules! timer_trace {
    ($($arg:tt)*) => {
        println!($($arg)*);
    };
}
#[cfg(not(feature = "timer-trace"))]
macro_rules! timer_trace {
    ($($arg:tt)*) => {};
}

/// DIV increments once every 256 cycles.
pub const DIV_PERIOD: u32 = 256;

/// Longest TIMA period, selected by TAC clock 0.
pub const MAX_TIMA_PERIOD: u32 = 1024;

/// TAC bits 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSelect {
    /// 4096 Hz
    Div1024,
    /// 262144 Hz
    Div16,
    /// 65536 Hz
    Div64,
    /// 16384 Hz
    Div256,
}

impl ClockSelect {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0x00 => ClockSelect::Div1024,
            0x01 => ClockSelect::Div16,
            0x02 => ClockSelect::Div64,
            _ => ClockSelect::Div256,
        }
    }

    /// Cycles per TIMA tick.
    pub const fn period(self) -> u32 {
        match self {
            ClockSelect::Div1024 => 1024,
            ClockSelect::Div16 => 16,
            ClockSelect::Div64 => 64,
            ClockSelect::Div256 => 256,
        }
    }
}

/// Decoded timer control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerControl {
    pub enabled: bool,
    pub clock: ClockSelect,
}

impl From<u8> for TimerControl {
    fn from(tac: u8) -> Self {
        Self {
            enabled: tac & 0x04 != 0,
            clock: ClockSelect::from_bits(tac),
        }
    }
}

impl From<TimerControl> for u8 {
    fn from(ctrl: TimerControl) -> Self {
        let bits = match ctrl.clock {
            ClockSelect::Div1024 => 0x00,
            ClockSelect::Div16 => 0x01,
            ClockSelect::Div64 => 0x02,
            ClockSelect::Div256 => 0x03,
        };
        bits | if ctrl.enabled { 0x04 } else { 0 }
    }
}

/// Sub-cycle accumulators carried between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerState {
    /// Cycles not yet folded into DIV. Always below [`DIV_PERIOD`].
    pub div_cycles: u32,
    /// Cycles not yet folded into TIMA. Always below the selected period.
    pub tima_cycles: u32,
}

impl TimerState {
    /// Whether both remainders are below the longest period they can hold.
    pub fn in_range(&self) -> bool {
        self.div_cycles < DIV_PERIOD && self.tima_cycles < MAX_TIMA_PERIOD
    }
}

/// Divider/timer unit.
///
/// DIV, TIMA, TMA and TAC live in the register file; the timer only keeps the
/// cycle remainders between calls to [`Timer::step`].
#[derive(Debug, Default)]
pub struct Timer {
    state: TimerState,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::default(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Load saved remainders. Out-of-range values wrap into their periods.
    pub fn restore(&mut self, state: TimerState) {
        self.state = TimerState {
            div_cycles: state.div_cycles % DIV_PERIOD,
            tima_cycles: state.tima_cycles % MAX_TIMA_PERIOD,
        };
    }

    pub fn reset(&mut self) {
        self.state = TimerState::default();
    }

    /// Advance the timer by `cycles` CPU cycles, updating DIV and TIMA and
    /// raising the timer interrupt when TIMA overflows.
    pub fn step<R: RegisterFile + ?Sized>(&mut self, cycles: u16, regs: &mut R) {
        if cycles == 0 {
            return;
        }
        let cycles = u32::from(cycles);

        self.state.div_cycles += cycles;
        if self.state.div_cycles >= DIV_PERIOD {
            let mut div = regs.get(DIV);
            while self.state.div_cycles >= DIV_PERIOD {
                self.state.div_cycles -= DIV_PERIOD;
                div = div.wrapping_add(1);
            }
            regs.set(DIV, div);
        }

        let ctrl = TimerControl::from(regs.get(TAC));
        let period = ctrl.clock.period();
        self.state.tima_cycles += cycles;

        if !ctrl.enabled {
            // The accumulator keeps running while the timer is off, so a later
            // enable can tick early.
            self.state.tima_cycles %= period;
            return;
        }

        while self.state.tima_cycles >= period {
            self.state.tima_cycles -= period;
            self.increment(regs);
        }
    }

    /// CPU write to DIV: the register and the divider remainder both clear.
    pub fn reset_divider<R: RegisterFile + ?Sized>(&mut self, regs: &mut R) {
        self.state.div_cycles = 0;
        regs.set(DIV, 0);
    }

    fn increment<R: RegisterFile + ?Sized>(&mut self, regs: &mut R) {
        let tima = regs.get(TIMA);
        if tima == 0xFF {
            let tma = regs.get(TMA);
            timer_trace!("[TIMER] overflow, reload {:02X}", tma);
            regs.set(TIMA, tma);
            regs.raise(Interrupt::Timer);
        } else {
            regs.set(TIMA, tima + 1);
        }
    }
}
