pub mod error;
pub mod event;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use error::ExperimentError;
pub use event::{InputEvent, InputEventKind, InputSource};
pub use phase::TrialPhase;
pub use stimulus::{
    DepthPlane, Eye, FieldColor, MotionKind, Rgba, RotationDir, StimulusCondition, SubfieldTracks,
};
pub use trial::{ResponseRecord, ResponseStatus, TrialDescriptor};

/// Number of independently animated dot subfields (two per perceptual field).
pub const SUBFIELDS: usize = 4;

/// Number of response directions, 45 degrees apart.
pub const DIRECTIONS: usize = 8;
