pub mod field;
pub mod kernel;

pub use field::DotField;
pub use kernel::{
    meters_per_degree, step_coherent, step_non_coherent, step_rotation, COMPASS_DIRECTIONS,
};
