//! Apparent blood viscosity in narrow tubes.
//!
//! In-vitro law of Pries, Neuhaus, Gaehtgens (1992): the relative apparent
//! viscosity of blood in a glass tube as a function of tube diameter (um)
//! and discharge haematocrit. The minimum near 7 um is the Fahraeus-
//! Lindqvist effect.

/// Relative apparent viscosity at discharge haematocrit 0.45.
fn eta_45(diameter_um: f64) -> f64 {
    220.0 * (-1.3 * diameter_um).exp() + 3.2 - 2.44 * (-0.06 * diameter_um.powf(0.645)).exp()
}

/// Shape exponent of the haematocrit dependence.
fn shape_exponent(diameter_um: f64) -> f64 {
    let d12 = 1e-11 * diameter_um.powi(12);
    let saturation = 1.0 / (1.0 + d12);
    (0.8 + (-0.075 * diameter_um).exp()) * (saturation - 1.0) + saturation
}

/// Relative apparent viscosity of blood at the given tube diameter (um)
/// and discharge haematocrit.
pub fn relative_apparent_viscosity(diameter_um: f64, hd: f64) -> f64 {
    let eta = eta_45(diameter_um);
    let c = shape_exponent(diameter_um);
    1.0 + (eta - 1.0) * ((1.0 - hd).powf(c) - 1.0) / ((1.0 - 0.45_f64).powf(c) - 1.0)
}
