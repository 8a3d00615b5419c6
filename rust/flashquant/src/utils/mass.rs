use super::constants::PROTON_MASS;

/// Converts an observed m/z at a given charge into a neutral monoisotopic mass.
///
/// Negative charges are handled, so `to_mass(to_mz(m, z), z) == m` for any
/// non-zero `z`.
pub fn to_mass(mz: f64, charge: i32) -> f64 {
    mz * charge.abs() as f64 - charge as f64 * PROTON_MASS
}

/// Converts a neutral monoisotopic mass into the m/z observed at `charge`.
pub fn to_mz(mass: f64, charge: i32) -> f64 {
    mass / charge.abs() as f64 + charge.signum() as f64 * PROTON_MASS
}

/// Signed relative error of `observed` against `theoretical`, in ppm.
pub fn ppm_error(observed: f64, theoretical: f64) -> f64 {
    ((observed - theoretical) / theoretical) * 1e6
}
