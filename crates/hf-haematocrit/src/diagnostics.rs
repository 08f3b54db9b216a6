//! Per-pass split diagnostics.
//!
//! The splitting computation itself is pure; the driver records each outcome
//! here so offline tooling can inspect the fractional flow and RBC shares of
//! a pass. Cleared at the start of every pass.

use crate::phase_separation::SplitOutcome;

#[derive(Debug, Clone, Default)]
pub struct SplitDiagnostics {
    pub rbc_fraction_a: Vec<f64>,
    pub rbc_fraction_b: Vec<f64>,
    pub flow_fraction_a: Vec<f64>,
    pub flow_fraction_b: Vec<f64>,
    pub parent_haematocrit: Vec<f64>,
    pub trifurcation_rbc_fractions: Vec<f64>,
    pub trifurcation_flow_fractions: Vec<f64>,
}

impl SplitDiagnostics {
    pub fn clear(&mut self) {
        self.rbc_fraction_a.clear();
        self.rbc_fraction_b.clear();
        self.flow_fraction_a.clear();
        self.flow_fraction_b.clear();
        self.parent_haematocrit.clear();
        self.trifurcation_rbc_fractions.clear();
        self.trifurcation_flow_fractions.clear();
    }

    pub fn record_split(&mut self, outcome: &SplitOutcome) {
        self.rbc_fraction_a.push(outcome.rbc_fraction_a);
        self.rbc_fraction_b.push(outcome.rbc_fraction_b);
        self.flow_fraction_a.push(outcome.flow_fraction_a);
        self.flow_fraction_b.push(outcome.flow_fraction_b);
        self.parent_haematocrit.push(outcome.parent_haematocrit);
    }

    /// Record a trifurcation: per-daughter fractions of the parent RBC flux
    /// and of the parent blood flow.
    pub fn record_trifurcation(&mut self, rbc_fractions: [f64; 3], flow_fractions: [f64; 3]) {
        self.trifurcation_rbc_fractions.extend(rbc_fractions);
        self.trifurcation_flow_fractions.extend(flow_fractions);
    }
}
