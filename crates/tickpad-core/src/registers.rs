//! Memory-mapped I/O registers shared by the timer and the joypad.

/// Joypad select/output register.
pub const P1: u16 = 0xFF00;
/// Divider register.
pub const DIV: u16 = 0xFF04;
/// Timer counter.
pub const TIMA: u16 = 0xFF05;
/// Timer modulo.
pub const TMA: u16 = 0xFF06;
/// Timer control.
pub const TAC: u16 = 0xFF07;
/// Interrupt flag.
pub const IF: u16 = 0xFF0F;
/// Interrupt enable.
pub const IE: u16 = 0xFFFF;

const IO_BASE: u16 = 0xFF00;

/// Interrupt sources, in IF bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    Stat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::Stat => 0x02,
            Interrupt::Timer => 0x04,
            Interrupt::Serial => 0x08,
            Interrupt::Joypad => 0x10,
        }
    }
}

/// Byte-addressable access to the I/O register page.
///
/// The memory subsystem owns the storage; the timer and joypad only borrow it
/// for the duration of a single operation.
pub trait RegisterFile {
    fn get(&self, addr: u16) -> u8;

    fn set(&mut self, addr: u16, val: u8);

    /// Set the IF bit for `interrupt`. Raising an already pending interrupt
    /// leaves IF untouched.
    fn raise(&mut self, interrupt: Interrupt) {
        let flags = self.get(IF);
        let raised = flags | interrupt.mask();
        if raised != flags {
            log::debug!("raising {interrupt:?} interrupt (IF={raised:02X})");
            self.set(IF, raised);
        }
    }
}

/// Flat backing store for `0xFF00..=0xFFFF`.
#[derive(Clone, PartialEq, Eq)]
pub struct IoRegisters {
    regs: [u8; 0x100],
}

impl IoRegisters {
    pub fn new() -> Self {
        let mut regs = [0u8; 0x100];
        regs[(P1 - IO_BASE) as usize] = 0x30;
        regs[(IF - IO_BASE) as usize] = 0xE1;
        Self { regs }
    }

    pub fn as_bytes(&self) -> &[u8; 0x100] {
        &self.regs
    }

    pub fn from_bytes(regs: [u8; 0x100]) -> Self {
        Self { regs }
    }
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IoRegisters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoRegisters")
            .field("p1", &format_args!("{:02X}", self.get(P1)))
            .field("div", &format_args!("{:02X}", self.get(DIV)))
            .field("tima", &format_args!("{:02X}", self.get(TIMA)))
            .field("tma", &format_args!("{:02X}", self.get(TMA)))
            .field("tac", &format_args!("{:02X}", self.get(TAC)))
            .field("if", &format_args!("{:02X}", self.get(IF)))
            .finish_non_exhaustive()
    }
}

impl RegisterFile for IoRegisters {
    #[inline]
    fn get(&self, addr: u16) -> u8 {
        match addr.checked_sub(IO_BASE) {
            Some(offset) => self.regs[offset as usize],
            None => {
                log::trace!("read outside I/O page at {addr:04X}");
                0xFF
            }
        }
    }

    #[inline]
    fn set(&mut self, addr: u16, val: u8) {
        match addr.checked_sub(IO_BASE) {
            Some(offset) => self.regs[offset as usize] = val,
            None => log::trace!("ignored write {val:02X} outside I/O page at {addr:04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_values() {
        let regs = IoRegisters::new();
        assert_eq!(regs.get(P1), 0x30);
        assert_eq!(regs.get(IF), 0xE1);
        assert_eq!(regs.get(DIV), 0);
    }

    #[test]
    fn raise_is_idempotent() {
        let mut regs = IoRegisters::new();
        regs.set(IF, 0xE0);
        regs.raise(Interrupt::Timer);
        assert_eq!(regs.get(IF), 0xE4);
        regs.raise(Interrupt::Timer);
        assert_eq!(regs.get(IF), 0xE4);
        regs.raise(Interrupt::Joypad);
        assert_eq!(regs.get(IF), 0xF4);
    }

    #[test]
    fn outside_io_page_is_open_bus() {
        let mut regs = IoRegisters::new();
        regs.set(0xC000, 0x12);
        assert_eq!(regs.get(0xC000), 0xFF);
    }
}
