use thiserror::Error;

/// Abnormal paths of the experiment core. Configuration errors are fatal at
/// block start; synthesis errors skip the offending trial; an out-of-range
/// frame force-ends the running trial.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExperimentError {
    #[error(
        "experiment plan is empty ({conditions} conditions x {headings} headings x {repetitions} repetitions)"
    )]
    EmptyPlan {
        conditions: usize,
        headings: usize,
        repetitions: usize,
    },

    #[error("invalid simulation rate: {0} Hz")]
    InvalidRate(f64),

    #[error("field layout must cover each of the four subfield slots exactly once")]
    InvalidLayout,

    #[error("subfields must hold at least one dot")]
    NoDots,

    #[error("aperture radius must be positive, got {0} deg")]
    InvalidAperture(f32),

    #[error("unknown condition label `{0}`")]
    UnknownCondition(String),

    #[error(
        "condition `{name}` spans {condition_frames} frames, trial {trial} expects {trial_frames}"
    )]
    FrameCountMismatch {
        name: String,
        condition_frames: u32,
        trial: usize,
        trial_frames: u32,
    },

    #[error("frame {frame} out of range for trial {trial} ({total_frames} frames)")]
    FrameOutOfRange {
        frame: u32,
        trial: usize,
        total_frames: u32,
    },
}
