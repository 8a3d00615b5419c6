pub mod constants;
pub mod mass;

pub use mass::{
    ppm_error,
    to_mass,
    to_mz,
};
