use std::collections::VecDeque;
use std::time::Duration;

use motex_core::{
    ExperimentError, InputSource, MotionKind, ResponseRecord, ResponseStatus, RotationDir,
    StimulusCondition, TrialDescriptor, TrialPhase, SUBFIELDS,
};
use motex_motion::{step_coherent, step_non_coherent, step_rotation, DotField};
use motex_timing::FixedStep;
use tracing::{error, info, warn};

use crate::config::ExperimentConfig;
use crate::ports::{FramePresenter, SessionSink, SubfieldFrame};
use crate::response::ResponseMachine;
use crate::synth::synthesize;

/// Host-level events fed into the block. The raw device beneath the start
/// event is a collaborator's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent {
    StartRequested,
    AbortRequested,
}

/// Runtime state of the trial currently on screen. Lives for exactly one
/// attempt; a requeued trial is rebuilt from its descriptor, seeds included.
struct ActiveTrial {
    descriptor: TrialDescriptor,
    condition: StimulusCondition,
    fields: [DotField; SUBFIELDS],
    frame: u32,
    motion_payload: String,
    color_payload: String,
}

/// Drives one block of trials through
/// WaitingForStart -> Stimulus -> TargetsResponse -> Done on a fixed-step
/// clock, feeding the motion kernels, the response machine, the presenter
/// and the session sink. Single-threaded and tick-driven; cancellation only
/// takes effect on tick boundaries.
pub struct BlockRunner<S: SessionSink, I: InputSource, P: FramePresenter> {
    config: ExperimentConfig,
    clock: FixedStep,
    queue: VecDeque<TrialDescriptor>,
    original: Vec<TrialDescriptor>,
    phase: TrialPhase,
    current: Option<ActiveTrial>,
    response: ResponseMachine,
    sink: S,
    input: I,
    presenter: P,
    trial_open: bool,
    finished: bool,
    dt: f32,
    aperture_radius_m: f32,
    translation_speed_mps: f32,
}

impl<S: SessionSink, I: InputSource, P: FramePresenter> BlockRunner<S, I, P> {
    pub fn new(
        config: ExperimentConfig,
        trials: Vec<TrialDescriptor>,
        sink: S,
        input: I,
        presenter: P,
    ) -> Result<Self, ExperimentError> {
        config.validate()?;
        let rate = config.sim_rate()?;
        let finished = trials.is_empty();
        Ok(Self {
            clock: FixedStep::new(rate),
            queue: trials.iter().cloned().collect(),
            original: trials,
            phase: TrialPhase::WaitingForStart,
            current: None,
            response: ResponseMachine::new(),
            sink,
            input,
            presenter,
            trial_open: false,
            finished,
            dt: rate.dt_secs() as f32,
            aperture_radius_m: config.aperture_radius_m(),
            translation_speed_mps: config.translation_speed_mps(),
            config,
        })
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn trials_remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn queued(&self) -> impl Iterator<Item = &TrialDescriptor> {
        self.queue.iter()
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn handle_event(&mut self, event: BlockEvent) {
        match event {
            BlockEvent::StartRequested => {
                if self.phase == TrialPhase::WaitingForStart && !self.finished {
                    self.begin_trial();
                }
            }
            BlockEvent::AbortRequested => self.abort(),
        }
    }

    /// Feed elapsed wall time. While waiting for the start event no
    /// simulation time accumulates; otherwise every whole tick now due is
    /// executed in order.
    pub fn update(&mut self, elapsed: Duration) {
        if self.finished || !self.phase.ticks() {
            return;
        }
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            match self.phase {
                TrialPhase::Stimulus => self.tick_stimulus(),
                TrialPhase::TargetsResponse => self.tick_response(),
                _ => break,
            }
        }
    }

    /// Finalize an externally torn-down block. An open trial is closed with
    /// an ABORT response row so the session log stays row-consistent.
    pub fn abort(&mut self) {
        if self.trial_open {
            let rt = if self.phase == TrialPhase::TargetsResponse {
                self.response.response_frames()
            } else {
                0
            };
            if let Some(trial) = self.current.take() {
                self.sink
                    .log_motion_payload(trial.descriptor.index, &trial.motion_payload);
                self.sink
                    .log_color_payload(trial.descriptor.index, &trial.color_payload);
            }
            self.sink.log_response(-1, rt, "ABORT", "");
            self.sink.end_trial();
            self.trial_open = false;
            warn!(rt, "trial aborted before completion");
        }
        self.current = None;
        self.finished = true;
        self.phase = TrialPhase::Done;
    }

    /// Pop descriptors until one synthesizes cleanly; contract violations
    /// are logged and skipped, never retried.
    fn begin_trial(&mut self) {
        while let Some(descriptor) = self.queue.pop_front() {
            let condition = match synthesize(&descriptor, &self.config) {
                Ok(condition) => condition,
                Err(err) => {
                    error!(trial = descriptor.index, %err, "condition synthesis failed, trial skipped");
                    continue;
                }
            };
            if !condition.is_consistent() || condition.total_frames != descriptor.total_frames {
                let err = ExperimentError::FrameCountMismatch {
                    name: condition.name.clone(),
                    condition_frames: condition.total_frames,
                    trial: descriptor.index,
                    trial_frames: descriptor.total_frames,
                };
                error!(trial = descriptor.index, %err, "trial skipped");
                continue;
            }

            let count = self.config.dots_per_subfield;
            let radius = self.aperture_radius_m;
            let fields: [DotField; SUBFIELDS] =
                std::array::from_fn(|slot| DotField::new(count, radius, descriptor.seeds[slot]));

            self.sink.begin_trial(&descriptor, &self.config, &condition);
            self.trial_open = true;
            info!(
                trial = descriptor.index,
                condition = %descriptor.condition_label,
                heading = descriptor.heading_deg as f64,
                "trial started"
            );

            let frames = descriptor.total_frames as usize;
            self.current = Some(ActiveTrial {
                descriptor,
                condition,
                fields,
                frame: 0,
                motion_payload: String::with_capacity(frames * 2 * SUBFIELDS),
                color_payload: String::with_capacity(frames * 2 * SUBFIELDS),
            });
            self.phase = TrialPhase::Stimulus;
            self.clock.reset();
            return;
        }
        // every queued descriptor failed synthesis
        self.advance();
    }

    fn tick_stimulus(&mut self) {
        let dt = self.dt;
        let radius = self.aperture_radius_m;
        let rotation_speed = self.config.rotation_speed_degps;
        let translation_speed = self.translation_speed_mps;

        let Some(trial) = self.current.as_mut() else {
            self.phase = TrialPhase::Done;
            return;
        };

        let total = trial.descriptor.total_frames;
        if trial.frame >= total {
            let err = ExperimentError::FrameOutOfRange {
                frame: trial.frame,
                trial: trial.descriptor.index,
                total_frames: total,
            };
            error!(%err, "stimulus overrun, ending trial now");
            self.enter_response();
            return;
        }

        let f = trial.frame as usize;
        let heading = trial.descriptor.heading_deg;

        for slot in 0..SUBFIELDS {
            let kind = trial.condition.subfields[slot].motion[f];
            let dots = trial.fields[slot].positions_mut();
            match kind {
                MotionKind::None => {}
                MotionKind::RotationCw => {
                    step_rotation(dots, radius, rotation_speed, RotationDir::Cw, dt)
                }
                MotionKind::RotationCcw => {
                    step_rotation(dots, radius, rotation_speed, RotationDir::Ccw, dt)
                }
                MotionKind::Linear => step_coherent(dots, radius, heading, translation_speed, dt),
                MotionKind::NonCoherent => {
                    step_non_coherent(dots, radius, translation_speed, dt)
                }
            }
        }

        if f > 0 {
            trial.motion_payload.push(';');
            trial.color_payload.push(';');
        }
        for slot in 0..SUBFIELDS {
            if slot > 0 {
                trial.motion_payload.push('|');
                trial.color_payload.push('|');
            }
            trial
                .motion_payload
                .push(trial.condition.subfields[slot].motion[f].code());
            trial
                .color_payload
                .push(trial.condition.subfields[slot].color[f].letter());
        }

        let views: [SubfieldFrame<'_>; SUBFIELDS] = std::array::from_fn(|slot| SubfieldFrame {
            positions: trial.fields[slot].positions(),
            visible: trial.condition.subfields[slot].visible[f],
            color: trial.condition.subfields[slot].color[f],
        });
        self.presenter.present(trial.frame, &views);

        trial.frame += 1;
        if trial.frame >= total {
            self.enter_response();
        }
    }

    fn enter_response(&mut self) {
        self.phase = TrialPhase::TargetsResponse;
        self.response.begin(0);
        if let Some(trial) = &self.current {
            info!(trial = trial.descriptor.index, "response window opened");
        }
    }

    fn tick_response(&mut self) {
        let event = self.input.poll();
        if let Some(record) = self.response.tick(event, self.config.max_response_frames) {
            self.finalize(record);
        }
    }

    fn finalize(&mut self, record: ResponseRecord) {
        self.phase = TrialPhase::Done;
        let Some(trial) = self.current.take() else {
            return;
        };

        self.sink
            .log_motion_payload(trial.descriptor.index, &trial.motion_payload);
        self.sink
            .log_color_payload(trial.descriptor.index, &trial.color_payload);
        self.sink.log_response(
            record.choice_index,
            record.rt_frames,
            record.status.label(),
            &record.device_label,
        );
        self.sink.end_trial();
        self.trial_open = false;

        match record.status {
            ResponseStatus::Confirmed => {
                info!(
                    trial = trial.descriptor.index,
                    choice = record.choice_index,
                    rt = record.rt_frames,
                    "trial confirmed"
                );
            }
            ResponseStatus::Canceled | ResponseStatus::TimedOut => {
                // back of the queue: a failed trial is never re-presented
                // immediately
                info!(
                    trial = trial.descriptor.index,
                    end = record.status.label(),
                    "trial requeued"
                );
                self.queue.push_back(trial.descriptor);
            }
        }
        self.advance();
    }

    fn advance(&mut self) {
        if self.queue.is_empty() {
            if self.config.loop_block && !self.original.is_empty() {
                info!("queue drained, rewinding block");
                self.queue.extend(self.original.iter().cloned());
            } else {
                info!("block finished");
                self.finished = true;
                return;
            }
        }
        self.phase = TrialPhase::WaitingForStart;
        self.clock.reset();
    }
}

impl<S: SessionSink, I: InputSource, P: FramePresenter> Drop for BlockRunner<S, I, P> {
    fn drop(&mut self) {
        if self.trial_open {
            self.abort();
        }
    }
}
