use glam::Vec2;
use motex_core::{
    InputEvent, InputEventKind, InputSource, Rgba, StimulusCondition, TrialDescriptor, DIRECTIONS,
    SUBFIELDS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ExperimentConfig;

/// Per-trial session log contract. The runner guarantees the call order
/// `begin_trial`, payload rows, `log_response`, `end_trial` for every opened
/// trial — including trials torn down mid-flight, which are closed with an
/// `ABORT` end-event label so the log stays row-consistent.
///
/// Writes must not stall the simulation loop; a sink that can block owns its
/// own buffering.
pub trait SessionSink {
    fn begin_trial(
        &mut self,
        descriptor: &TrialDescriptor,
        config: &ExperimentConfig,
        condition: &StimulusCondition,
    );
    fn log_motion_payload(&mut self, trial_index: usize, payload: &str);
    fn log_color_payload(&mut self, trial_index: usize, payload: &str);
    fn log_response(&mut self, choice_index: i32, rt_frames: u32, end_event: &str, device: &str);
    fn end_trial(&mut self);
}

impl<T: SessionSink + ?Sized> SessionSink for &mut T {
    fn begin_trial(
        &mut self,
        descriptor: &TrialDescriptor,
        config: &ExperimentConfig,
        condition: &StimulusCondition,
    ) {
        (**self).begin_trial(descriptor, config, condition);
    }

    fn log_motion_payload(&mut self, trial_index: usize, payload: &str) {
        (**self).log_motion_payload(trial_index, payload);
    }

    fn log_color_payload(&mut self, trial_index: usize, payload: &str) {
        (**self).log_color_payload(trial_index, payload);
    }

    fn log_response(&mut self, choice_index: i32, rt_frames: u32, end_event: &str, device: &str) {
        (**self).log_response(choice_index, rt_frames, end_event, device);
    }

    fn end_trial(&mut self) {
        (**self).end_trial();
    }
}

/// Per-tick view of one subfield handed to the presentation collaborator.
/// Positions are local stimulus-plane meters; nothing flows back.
pub struct SubfieldFrame<'a> {
    pub positions: &'a [Vec2],
    pub visible: bool,
    pub color: Rgba,
}

pub trait FramePresenter {
    fn present(&mut self, tick: u32, subfields: &[SubfieldFrame<'_>; SUBFIELDS]);
}

/// Presenter that discards every frame. For headless blocks and tests.
pub struct NullPresenter;

impl FramePresenter for NullPresenter {
    fn present(&mut self, _tick: u32, _subfields: &[SubfieldFrame<'_>; SUBFIELDS]) {}
}

/// Deterministic stand-in observer for headless runs: in every response
/// window it selects a (seeded) random direction after `select_after` polls
/// and confirms `confirm_after` polls later, forever.
pub struct ScriptedObserver {
    select_after: u32,
    confirm_after: u32,
    polls: u32,
    rng: ChaCha8Rng,
}

impl ScriptedObserver {
    pub fn new(select_after: u32, confirm_after: u32, seed: u64) -> Self {
        Self {
            select_after,
            confirm_after,
            polls: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl InputSource for ScriptedObserver {
    fn poll(&mut self) -> Option<InputEvent> {
        let polls = self.polls;
        self.polls += 1;
        if polls == self.select_after {
            let direction = self.rng.random_range(0..DIRECTIONS as u8);
            Some(InputEvent::new(
                InputEventKind::DirectionSelected(direction),
                "scripted",
            ))
        } else if polls == self.select_after + self.confirm_after {
            self.polls = 0;
            Some(InputEvent::new(InputEventKind::Confirm, "scripted"))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_observer_selects_then_confirms_every_window() {
        let mut observer = ScriptedObserver::new(2, 3, 0);
        for _ in 0..2 {
            assert!(observer.poll().is_none());
            assert!(observer.poll().is_none());
            let select = observer.poll().unwrap();
            assert!(matches!(
                select.kind,
                InputEventKind::DirectionSelected(_)
            ));
            assert!(observer.poll().is_none());
            assert!(observer.poll().is_none());
            let confirm = observer.poll().unwrap();
            assert_eq!(confirm.kind, InputEventKind::Confirm);
            assert_eq!(confirm.device, "scripted");
        }
    }
}
