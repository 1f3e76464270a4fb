pub mod config;
pub mod planner;
pub mod ports;
pub mod response;
pub mod state;
pub mod synth;

pub use config::{ConditionSpec, ExperimentConfig, FieldLayout, FieldRole};
pub use planner::plan;
pub use ports::{FramePresenter, NullPresenter, ScriptedObserver, SessionSink, SubfieldFrame};
pub use response::ResponseMachine;
pub use state::{BlockEvent, BlockRunner};
pub use synth::synthesize;
