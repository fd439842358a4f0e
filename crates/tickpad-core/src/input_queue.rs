use crossbeam_channel as cb;

use crate::input::Button;

/// A press or release reported by the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub button: Button,
    pub pressed: bool,
}

/// Producer half, handed to whatever thread polls the keyboard, touch screen
/// or gamepad.
///
/// Events are only applied when the emulation thread drains the queue between
/// steps, so a transition never lands in the middle of a step.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: cb::Sender<InputEvent>,
}

/// Consumer half, owned by the emulation thread.
#[derive(Debug)]
pub struct InputReceiver {
    rx: cb::Receiver<InputEvent>,
}

pub fn channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = cb::unbounded();
    (InputSender { tx }, InputReceiver { rx })
}

impl InputSender {
    /// Returns false once the emulator side has been dropped.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn press(&self, button: Button) -> bool {
        self.send(InputEvent {
            button,
            pressed: true,
        })
    }

    pub fn release(&self, button: Button) -> bool {
        self.send(InputEvent {
            button,
            pressed: false,
        })
    }
}

impl InputReceiver {
    /// Pending events in arrival order. Never blocks.
    pub fn drain(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.rx.try_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
