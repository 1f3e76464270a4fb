use serde::{Deserialize, Serialize};

use crate::event::InputEvent;
use crate::stimulus::FieldColor;
use crate::SUBFIELDS;

/// One planned trial. Created by the planner, immutable afterwards; a
/// canceled or timed-out trial is re-enqueued as the same value, so its dot
/// seeds reproduce the original layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDescriptor {
    pub index: usize,
    pub condition_label: String,
    pub heading_deg: f32,
    pub onset_frame: u32,
    /// First frame of the translation window (inclusive).
    pub translation_start_frame: u32,
    /// End of the translation window (exclusive).
    pub translation_end_frame: u32,
    pub total_frames: u32,
    /// One dot seed per subfield, drawn in subfield order.
    pub seeds: [u32; SUBFIELDS],
    pub delayed_color: FieldColor,
}

/// How a response window ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Confirmed,
    Canceled,
    TimedOut,
}

impl ResponseStatus {
    /// End-event label written to the session log.
    pub fn label(self) -> &'static str {
        match self {
            ResponseStatus::Confirmed => "Confirm",
            ResponseStatus::Canceled => "Cancel",
            ResponseStatus::TimedOut => "Timeout",
        }
    }
}

/// Summary of one response window, produced once per trial attempt and
/// consumed immediately by the session sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status: ResponseStatus,
    /// Selected direction 0..7, or -1 when the window ended without a valid
    /// confirmed selection.
    pub choice_index: i32,
    /// Whole simulation ticks from response-window onset to the ending check.
    pub rt_frames: u32,
    pub selection_event: Option<InputEvent>,
    pub end_event: Option<InputEvent>,
    pub device_label: String,
}
