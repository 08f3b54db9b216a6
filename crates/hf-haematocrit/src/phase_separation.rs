//! Empirical erythrocyte phase-separation law at a bifurcation.
//!
//! Follows the in-vivo bifurcation model of Pries et al.: the fractional RBC
//! flux into a daughter branch is a logit-linear function of its fractional
//! blood flow, with full-plasma and full-RBC saturation regions at the
//! extremes.

use crate::error::{HaematocritError, HaematocritResult};
use hf_core::units::constants::M_TO_UM;

/// Below this flow a daughter is treated as carrying no RBCs at all.
const MIN_DAUGHTER_FLOW: f64 = 1e-36;

/// Physical packing limit; haematocrit at or above this is redistributed.
const SATURATION_THRESHOLD: f64 = 0.99;

/// The aggregated upstream stream feeding a bifurcation.
#[derive(Debug, Clone, Copy)]
pub struct ParentStream {
    /// Volumetric flow (m³/s, unsigned).
    pub flow: f64,
    /// Discharge haematocrit of the stream.
    pub haematocrit: f64,
    /// Vessel diameter (m).
    pub diameter: f64,
}

/// One daughter branch of a bifurcation.
#[derive(Debug, Clone, Copy)]
pub struct DaughterBranch {
    /// Volumetric flow (m³/s, unsigned).
    pub flow: f64,
    /// Vessel diameter (m).
    pub diameter: f64,
}

/// Result of one phase-separation split.
///
/// A pure value object: callers decide whether to record it into a
/// diagnostics channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOutcome {
    pub hd_a: f64,
    pub hd_b: f64,
    /// Fraction of the parent RBC flux entering each daughter; sums to 1.
    pub rbc_fraction_a: f64,
    pub rbc_fraction_b: f64,
    /// Fraction of the parent blood flow entering each daughter; sums to 1.
    pub flow_fraction_a: f64,
    pub flow_fraction_b: f64,
    pub parent_haematocrit: f64,
}

/// Calibration of the phase-separation law.
///
/// The defaults are the published micrometer-scale calibration constants.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSeparation {
    pub x0_init: f64,
    pub a_init: f64,
    pub b_init: f64,
}

impl Default for PhaseSeparation {
    fn default() -> Self {
        Self {
            x0_init: 1.12,
            a_init: 15.47,
            b_init: 8.13,
        }
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(x: f64) -> f64 {
    let e = x.exp();
    e / (1.0 + e)
}

impl PhaseSeparation {
    /// Non-dimensional parameters of the split law.
    ///
    /// `x0` is the fractional-flow threshold below which a daughter receives
    /// plasma only; `a` biases the split toward the narrower daughter; `b`
    /// scales the logit slope. Diameters enter in micrometers.
    pub fn nondimensional_params(
        &self,
        hd_parent: f64,
        diam_parent: f64,
        diam_a: f64,
        diam_b: f64,
    ) -> (f64, f64, f64) {
        let (da, db, dp) = (diam_a * M_TO_UM, diam_b * M_TO_UM, diam_parent * M_TO_UM);
        let reduced = (1.0 - hd_parent) / dp;

        let x0 = self.x0_init * reduced;
        let a = -self.a_init * ((da * da - db * db) / (da * da + db * db)) * reduced;
        let b = 1.0 + self.b_init * reduced;

        (x0, a, b)
    }

    /// Split the parent RBC flux between two daughters.
    ///
    /// Fails with `Oversaturated` when a daughter would end up with
    /// haematocrit >= 1 even after redistribution (near-zero flow carrying a
    /// nonzero RBC assignment).
    pub fn split(
        &self,
        parent: ParentStream,
        a: DaughterBranch,
        b: DaughterBranch,
    ) -> HaematocritResult<SplitOutcome> {
        let flow_fraction_a = a.flow / (a.flow + b.flow);
        let flow_fraction_b = 1.0 - flow_fraction_a;

        let (x0, coeff_a, coeff_b) =
            self.nondimensional_params(parent.haematocrit, parent.diameter, a.diameter, b.diameter);

        let rbc_flux_parent = parent.haematocrit * parent.flow;

        let (mut rbc_fraction_a, mut rbc_fraction_b) = if flow_fraction_a <= x0 {
            (0.0, 1.0)
        } else if flow_fraction_a >= 1.0 - x0 {
            (1.0, 0.0)
        } else {
            let interior = (flow_fraction_a - x0) / (1.0 - x0);
            let fraction = sigmoid(coeff_a + coeff_b * logit(interior));
            (fraction, 1.0 - fraction)
        };

        // Near-zero daughter flow cannot carry RBCs
        let (mut hd_a, mut hd_b) = if a.flow < MIN_DAUGHTER_FLOW {
            (0.0, rbc_fraction_b * rbc_flux_parent / b.flow)
        } else if b.flow < MIN_DAUGHTER_FLOW {
            (rbc_fraction_a * rbc_flux_parent / a.flow, 0.0)
        } else {
            (
                rbc_fraction_a * rbc_flux_parent / a.flow,
                rbc_fraction_b * rbc_flux_parent / b.flow,
            )
        };

        // Redistribute the surplus above the packing limit to the other daughter
        if hd_b >= SATURATION_THRESHOLD {
            let surplus = (hd_b - SATURATION_THRESHOLD) * b.flow / rbc_flux_parent;
            rbc_fraction_b -= surplus;
            rbc_fraction_a += surplus;
            hd_a = rbc_fraction_a * rbc_flux_parent / a.flow;
            hd_b = rbc_fraction_b * rbc_flux_parent / b.flow;
        } else if hd_a >= SATURATION_THRESHOLD {
            let surplus = (hd_a - SATURATION_THRESHOLD) * a.flow / rbc_flux_parent;
            rbc_fraction_a -= surplus;
            rbc_fraction_b += surplus;
            hd_a = rbc_fraction_a * rbc_flux_parent / a.flow;
            hd_b = rbc_fraction_b * rbc_flux_parent / b.flow;
        }

        if hd_a >= 1.0 || hd_b >= 1.0 {
            return Err(HaematocritError::Oversaturated { hd_a, hd_b });
        }

        Ok(SplitOutcome {
            hd_a,
            hd_b,
            rbc_fraction_a,
            rbc_fraction_b,
            flow_fraction_a,
            flow_fraction_b,
            parent_haematocrit: parent.haematocrit,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rbc_flux_is_conserved(
            hd_parent in 0.05_f64..0.7,
            flow_a in 0.01_f64..1.0,
            flow_b in 0.01_f64..1.0,
            diam_a_um in 4.0_f64..30.0,
            diam_b_um in 4.0_f64..30.0,
        ) {
            let law = PhaseSeparation::default();
            let flow_p = flow_a + flow_b;
            let parent = ParentStream { flow: flow_p, haematocrit: hd_parent, diameter: 10e-6 };
            let a = DaughterBranch { flow: flow_a, diameter: diam_a_um * 1e-6 };
            let b = DaughterBranch { flow: flow_b, diameter: diam_b_um * 1e-6 };

            if let Ok(outcome) = law.split(parent, a, b) {
                let rbc_in = hd_parent * flow_p;
                let rbc_out = outcome.hd_a * flow_a + outcome.hd_b * flow_b;
                prop_assert!((rbc_in - rbc_out).abs() <= 1e-5);
                prop_assert!((outcome.rbc_fraction_a + outcome.rbc_fraction_b - 1.0).abs() <= 1e-9);
            }
        }

        #[test]
        fn haematocrits_stay_in_unit_interval(
            hd_parent in 0.05_f64..0.7,
            flow_a in 0.01_f64..1.0,
            flow_b in 0.01_f64..1.0,
        ) {
            let law = PhaseSeparation::default();
            let parent = ParentStream { flow: flow_a + flow_b, haematocrit: hd_parent, diameter: 10e-6 };
            let a = DaughterBranch { flow: flow_a, diameter: 10e-6 };
            let b = DaughterBranch { flow: flow_b, diameter: 10e-6 };

            if let Ok(outcome) = law.split(parent, a, b) {
                prop_assert!(outcome.hd_a >= 0.0 && outcome.hd_a < 1.0);
                prop_assert!(outcome.hd_b >= 0.0 && outcome.hd_b < 1.0);
            }
        }
    }
}
