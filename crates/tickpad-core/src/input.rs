use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::registers::{Interrupt, P1, RegisterFile};

/// P1 bit 4: direction keys selected when clear.
const SELECT_DIRECTIONS: u8 = 0x10;
/// P1 bit 5: action keys selected when clear.
const SELECT_ACTIONS: u8 = 0x20;
const SELECT_MASK: u8 = SELECT_DIRECTIONS | SELECT_ACTIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    /// Bit in the packed pressed-state byte. Directions occupy the low nibble,
    /// actions the high nibble.
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Button::Right => 0x01,
            Button::Left => 0x02,
            Button::Up => 0x04,
            Button::Down => 0x08,
            Button::A => 0x10,
            Button::B => 0x20,
            Button::Select => 0x40,
            Button::Start => 0x80,
        }
    }

    pub const fn is_direction(self) -> bool {
        matches!(
            self,
            Button::Right | Button::Left | Button::Up | Button::Down
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Right => "right",
            Button::Left => "left",
            Button::Up => "up",
            Button::Down => "down",
            Button::A => "a",
            Button::B => "b",
            Button::Select => "select",
            Button::Start => "start",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown button '{0}'")]
pub struct ParseButtonError(pub String);

impl FromStr for Button {
    type Err = ParseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseButtonError(s.to_string()))
    }
}

/// Pressed/released flags for the eight buttons, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoypadState {
    pressed: u8,
}

impl JoypadState {
    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed & button.mask() != 0
    }

    /// Returns whether the button was released before this call.
    #[inline]
    fn set_pressed(&mut self, button: Button) -> bool {
        let was_released = !self.is_pressed(button);
        self.pressed |= button.mask();
        was_released
    }

    #[inline]
    fn set_released(&mut self, button: Button) {
        self.pressed &= !button.mask();
    }

    /// Active-high pressed bits for the direction keys (right..down in bits 0-3).
    #[inline]
    fn directions(&self) -> u8 {
        self.pressed & 0x0F
    }

    /// Active-high pressed bits for the action keys (a..start in bits 0-3).
    #[inline]
    fn actions(&self) -> u8 {
        self.pressed >> 4
    }
}

#[derive(Error, Debug)]
pub enum HapticError {
    #[error("haptic device unavailable")]
    Unavailable,
    #[error("haptic pulse failed: {0}")]
    Failed(String),
}

/// Best-effort feedback fired on every press.
pub trait Haptics: Send {
    fn pulse(&mut self, button: Button) -> Result<(), HapticError>;
}

/// Joypad input register and edge-triggered interrupt behavior.
#[derive(Default)]
pub struct Joypad {
    state: JoypadState,
    haptics: Option<Box<dyn Haptics>>,
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_haptics(haptics: Box<dyn Haptics>) -> Self {
        Self {
            state: JoypadState::default(),
            haptics: Some(haptics),
        }
    }

    pub fn set_haptics(&mut self, haptics: Option<Box<dyn Haptics>>) {
        self.haptics = haptics;
    }

    pub fn state(&self) -> JoypadState {
        self.state
    }

    pub fn restore(&mut self, state: JoypadState) {
        self.state = state;
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state.is_pressed(button)
    }

    /// Mark `button` as held. Only a released -> pressed transition requests
    /// the joypad interrupt.
    pub fn press<R: RegisterFile + ?Sized>(&mut self, button: Button, regs: &mut R) {
        if self.state.set_pressed(button) {
            regs.raise(Interrupt::Joypad);
        }
        if let Some(haptics) = self.haptics.as_mut() {
            if let Err(e) = haptics.pulse(button) {
                log::debug!("haptic pulse for {button} failed: {e}");
            }
        }
    }

    pub fn release(&mut self, button: Button) {
        self.state.set_released(button);
    }

    /// Value the CPU sees at P1.
    ///
    /// Bits 7-6 read as 1 and bits 5-4 echo the select lines. The low nibble is
    /// active-low: a bit is 0 when a pressed button in any selected group maps
    /// onto it.
    pub fn read<R: RegisterFile + ?Sized>(&self, regs: &R) -> u8 {
        let select = regs.get(P1) & SELECT_MASK;
        let mut pressed = 0u8;
        if select & SELECT_ACTIONS == 0 {
            pressed |= self.state.actions();
        }
        if select & SELECT_DIRECTIONS == 0 {
            pressed |= self.state.directions();
        }
        0xC0 | select | (!pressed & 0x0F)
    }
}

impl fmt::Debug for Joypad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Joypad")
            .field("state", &self.state)
            .field("haptics", &self.haptics.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        assert_eq!("a".parse::<Button>(), Ok(Button::A));
        assert_eq!("Start".parse::<Button>(), Ok(Button::Start));
        assert_eq!(" down ".parse::<Button>(), Ok(Button::Down));
        assert_eq!(
            "turbo".parse::<Button>(),
            Err(ParseButtonError("turbo".to_string()))
        );
    }

    #[test]
    fn groups_split_the_state_byte() {
        let mut state = JoypadState::default();
        state.set_pressed(Button::Start);
        state.set_pressed(Button::Left);
        assert_eq!(state.actions(), 0x08);
        assert_eq!(state.directions(), 0x02);
        assert!(Button::Left.is_direction());
        assert!(!Button::Start.is_direction());
    }
}
