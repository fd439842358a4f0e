//! Cycle-accurate divider/timer and joypad emulation for a Game Boy class
//! handheld.
//!
//! The CPU, PPU, APU and cartridge live elsewhere. They drive this crate
//! through the [`mmu`] facade: one [`mmu::Mmu::step`] per retired instruction
//! and byte reads/writes for the I/O page.

/// Joypad input register and edge-triggered interrupt behavior.
pub mod input;

/// Cross-thread button event queue drained between steps.
pub mod input_queue;

/// I/O page ownership and register routing.
pub mod mmu;

/// Register file capability and I/O addresses.
pub mod registers;

/// Divider/timer unit.
pub mod timer;
