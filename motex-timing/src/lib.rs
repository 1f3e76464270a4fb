pub mod clock;

pub use clock::{FixedStep, InvalidRate, SimRate};
