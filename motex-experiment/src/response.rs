use motex_core::{InputEvent, InputEventKind, ResponseRecord, ResponseStatus};

/// The 8-way response capture state machine.
///
/// Driven once per simulation tick while the response window is open. A
/// direction event only revises the candidate choice; cancel always ends the
/// window as canceled; confirm ends it with the candidate, or as canceled if
/// none exists; the timeout fires only on ticks that carried no event. RT is
/// counted in whole ticks from window onset, never wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct ResponseMachine {
    active: bool,
    onset_frame: u32,
    frame: u32,
    candidate: Option<u8>,
    selection_event: Option<InputEvent>,
}

impl ResponseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a response window at the given onset frame.
    pub fn begin(&mut self, onset_frame: u32) {
        self.active = true;
        self.onset_frame = onset_frame;
        self.frame = onset_frame;
        self.candidate = None;
        self.selection_event = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ticks elapsed since the window opened.
    pub fn response_frames(&self) -> u32 {
        self.frame - self.onset_frame
    }

    /// Advance the window by one simulation tick, applying at most one of
    /// the four checks: selection, cancel, confirm, timeout.
    pub fn tick(
        &mut self,
        event: Option<InputEvent>,
        max_response_frames: u32,
    ) -> Option<ResponseRecord> {
        if !self.active {
            return None;
        }

        if let Some(event) = event {
            match event.kind {
                InputEventKind::DirectionSelected(index) => {
                    // revisable any number of times; never ends the window
                    self.candidate = Some(index);
                    self.selection_event = Some(event);
                    self.frame += 1;
                    return None;
                }
                InputEventKind::Cancel => {
                    return Some(self.finish(ResponseStatus::Canceled, -1, Some(event)));
                }
                InputEventKind::Confirm => {
                    return Some(match self.candidate {
                        Some(index) => {
                            self.finish(ResponseStatus::Confirmed, index as i32, Some(event))
                        }
                        // confirming with no selection is not a valid response
                        None => self.finish(ResponseStatus::Canceled, -1, Some(event)),
                    });
                }
            }
        }

        if max_response_frames > 0 && self.frame - self.onset_frame >= max_response_frames {
            let mut record = self.finish(ResponseStatus::TimedOut, -1, None);
            record.rt_frames = max_response_frames;
            return Some(record);
        }

        self.frame += 1;
        None
    }

    fn finish(
        &mut self,
        status: ResponseStatus,
        choice_index: i32,
        end_event: Option<InputEvent>,
    ) -> ResponseRecord {
        self.active = false;
        let device_label = end_event
            .as_ref()
            .map(|e| e.device.clone())
            .or_else(|| self.selection_event.as_ref().map(|e| e.device.clone()))
            .unwrap_or_default();
        ResponseRecord {
            status,
            choice_index,
            rt_frames: self.frame - self.onset_frame,
            selection_event: self.selection_event.take(),
            end_event,
            device_label,
        }
    }
}
