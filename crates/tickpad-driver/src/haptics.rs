use log::info;
use tickpad_core::input::{Button, HapticError, Haptics};

/// Headless stand-in for a vibration motor: every pulse becomes a log line.
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&mut self, button: Button) -> Result<(), HapticError> {
        info!("haptic pulse ({button})");
        Ok(())
    }
}
