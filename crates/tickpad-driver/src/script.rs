//! Scripted sessions: a timeline of register accesses and button events played
//! against the core in place of a CPU and an input device.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ConfigError;
use tickpad_core::input::{Button, Haptics};
use tickpad_core::input_queue::InputSender;
use tickpad_core::mmu::{Mmu, Snapshot, SnapshotError};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Event {
    Write { cycle: u64, addr: u16, value: u8 },
    Read { cycle: u64, addr: u16 },
    Press { cycle: u64, button: Button },
    Release { cycle: u64, button: Button },
}

impl Event {
    pub fn cycle(&self) -> u64 {
        match self {
            Event::Write { cycle, .. }
            | Event::Read { cycle, .. }
            | Event::Press { cycle, .. }
            | Event::Release { cycle, .. } => *cycle,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Cycles per simulated instruction.
    pub step: Option<u16>,
    /// Keep running after the last event until this cycle.
    pub run_until: Option<u64>,
    #[serde(rename = "event")]
    pub events: Vec<Event>,
}

impl Script {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ScriptError> {
        toml::from_str(text).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}

/// One `read` action's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResult {
    pub cycle: u64,
    pub addr: u16,
    pub value: u8,
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), ScriptError> {
    let text = toml::to_string(snapshot)?;
    std::fs::write(path, text).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Stands in for the CPU loop: advances the clock in fixed instruction-sized
/// steps and performs each event once the clock reaches it.
///
/// Button events travel through the input queue like they would from a host
/// input thread, and a zero-cycle step drains them before the next access.
pub struct Runner {
    pub mmu: Mmu,
    input: InputSender,
    step: u16,
    clock: u64,
}

impl Runner {
    pub fn new(step: u16) -> Self {
        let mut mmu = Mmu::new();
        let input = mmu.attach_input();
        Self {
            mmu,
            input,
            step: step.max(1),
            clock: 0,
        }
    }

    pub fn with_haptics(mut self, haptics: Box<dyn Haptics>) -> Self {
        self.mmu.set_haptics(Some(haptics));
        self
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), ScriptError> {
        self.mmu.restore(snapshot)?;
        Ok(())
    }

    /// Run the clock forward to `target`. The final step is shortened so the
    /// clock lands exactly on it.
    pub fn advance_to(&mut self, target: u64) {
        while self.clock < target {
            let n = (target - self.clock).min(u64::from(self.step)) as u16;
            self.mmu.step(n);
            self.clock += u64::from(n);
        }
    }

    pub fn run(&mut self, script: &Script) -> Vec<ReadResult> {
        let mut events = script.events.clone();
        events.sort_by_key(Event::cycle);

        let mut reads = Vec::new();
        for event in &events {
            if event.cycle() < self.clock {
                log::warn!(
                    "event at cycle {} is behind the clock ({}); running it now",
                    event.cycle(),
                    self.clock
                );
            }
            self.advance_to(event.cycle());
            match *event {
                Event::Write { addr, value, .. } => self.mmu.write_byte(addr, value),
                Event::Read { addr, .. } => {
                    let value = self.mmu.read_byte(addr);
                    log::debug!("[{}] read {addr:04X} -> {value:02X}", self.clock);
                    reads.push(ReadResult {
                        cycle: self.clock,
                        addr,
                        value,
                    });
                }
                Event::Press { button, .. } => {
                    self.input.press(button);
                    self.mmu.step(0);
                }
                Event::Release { button, .. } => {
                    self.input.release(button);
                    self.mmu.step(0);
                }
            }
        }

        if let Some(end) = script.run_until {
            self.advance_to(end);
        }
        reads
    }
}
