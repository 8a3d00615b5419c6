/// Mass of a proton in daltons (CODATA 2014).
pub const PROTON_MASS: f64 = 1.007_276_466_812;

/// Intensity written into a peak that was absorbed by another one.
pub const VOIDED_INTENSITY: f64 = -1.0;
