use thiserror::Error;

use crate::{
    input::{Button, Haptics, Joypad, JoypadState},
    input_queue::{self, InputReceiver, InputSender},
    registers::{DIV, IF, IoRegisters, P1, RegisterFile, TAC},
    timer::{Timer, TimerState},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("I/O image has {0} bytes, expected 256")]
    IoLength(usize),
    #[error("timer remainders out of range (div {div_cycles}, tima {tima_cycles})")]
    Accumulator { div_cycles: u32, tima_cycles: u32 },
}

/// Save-state payload for the I/O page, the timer remainders and the buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Raw contents of `0xFF00..=0xFFFF`.
    pub io: Vec<u8>,
    pub timer: TimerState,
    pub joypad: JoypadState,
}

/// Owner of the I/O register page and the units that mutate it.
#[derive(Debug)]
pub struct Mmu {
    pub io: IoRegisters,
    pub timer: Timer,
    pub input: Joypad,
    input_rx: Option<InputReceiver>,
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            io: IoRegisters::new(),
            timer: Timer::new(),
            input: Joypad::new(),
            input_rx: None,
        }
    }

    pub fn set_haptics(&mut self, haptics: Option<Box<dyn Haptics>>) {
        self.input.set_haptics(haptics);
    }

    /// Route button events from another thread through a queue. Replaces any
    /// previously attached queue.
    pub fn attach_input(&mut self) -> InputSender {
        let (tx, rx) = input_queue::channel();
        self.input_rx = Some(rx);
        tx
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            P1 => self.input.read(&self.io),
            TAC => self.io.get(TAC) | 0xF8,
            IF => self.io.get(IF) | 0xE0,
            0xFF00..=0xFFFF => self.io.get(addr),
            _ => {
                log::trace!("read outside I/O page at {addr:04X}");
                0xFF
            }
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            P1 => self.io.set(P1, val & 0x30),
            DIV => self.timer.reset_divider(&mut self.io),
            TAC => self.io.set(TAC, val & 0x07),
            IF => {
                let flags = self.io.get(IF);
                self.io.set(IF, (val & 0x1F) | (flags & 0xE0));
            }
            0xFF00..=0xFFFF => self.io.set(addr, val),
            _ => log::trace!("ignored write {val:02X} outside I/O page at {addr:04X}"),
        }
    }

    pub fn press(&mut self, button: Button) {
        self.input.press(button, &mut self.io);
    }

    pub fn release(&mut self, button: Button) {
        self.input.release(button);
    }

    /// Apply queued input, then advance the timer by `cycles`.
    pub fn step(&mut self, cycles: u16) {
        self.poll_input();
        self.timer.step(cycles, &mut self.io);
    }

    fn poll_input(&mut self) {
        let Some(rx) = self.input_rx.as_ref().filter(|rx| !rx.is_empty()) else {
            return;
        };
        for event in rx.drain() {
            if event.pressed {
                self.input.press(event.button, &mut self.io);
            } else {
                self.input.release(event.button);
            }
        }
    }

    /// Power-on register values with the timer and buttons cleared. Haptics and
    /// any attached input queue survive the reset.
    pub fn reset(&mut self) {
        self.io = IoRegisters::new();
        self.timer.reset();
        self.input.restore(JoypadState::default());
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            io: self.io.as_bytes().to_vec(),
            timer: self.timer.state(),
            joypad: self.input.state(),
        }
    }

    /// Restore a snapshot. Nothing changes if the I/O image or the timer
    /// remainders are malformed.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let regs = <[u8; 0x100]>::try_from(snapshot.io.as_slice())
            .map_err(|_| SnapshotError::IoLength(snapshot.io.len()))?;
        if !snapshot.timer.in_range() {
            return Err(SnapshotError::Accumulator {
                div_cycles: snapshot.timer.div_cycles,
                tima_cycles: snapshot.timer.tima_cycles,
            });
        }
        self.io = IoRegisters::from_bytes(regs);
        self.timer.restore(snapshot.timer);
        self.input.restore(snapshot.joypad);
        Ok(())
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
