use serde::{Deserialize, Serialize};

/// Abstract response input, decoupled from any physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEventKind {
    /// Candidate direction 0..7.
    DirectionSelected(u8),
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub device: String,
}

impl InputEvent {
    pub fn new(kind: InputEventKind, device: impl Into<String>) -> Self {
        Self {
            kind,
            device: device.into(),
        }
    }
}

/// Non-blocking source of response events, polled once per simulation tick
/// while a response window is open.
pub trait InputSource {
    fn poll(&mut self) -> Option<InputEvent>;
}
