//! Per-junction RBC mass-balance audit.
//!
//! Every resolved junction configuration must conserve both blood volume and
//! RBC flux (q·hd). The audit recomputes both sums from the values the
//! handler actually used, ghosts included.

/// Absolute tolerance for the volumetric and RBC flux balances.
pub const BALANCE_TOLERANCE: f64 = 1e-5;

/// One audited junction configuration. Streams are `(flow, haematocrit)`
/// pairs with unsigned flows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JunctionBalance {
    /// Straight connection (-o-).
    OneToOne {
        parent: (f64, f64),
        daughter: (f64, f64),
    },
    /// Bifurcation (-<).
    OneToTwo {
        parent: (f64, f64),
        daughters: [(f64, f64); 2],
    },
    /// Confluence (>-).
    TwoToOne {
        parents: [(f64, f64); 2],
        daughter: (f64, f64),
    },
    /// Trifurcation (-E).
    OneToThree {
        parent: (f64, f64),
        daughters: [(f64, f64); 3],
    },
    /// Triple confluence (E-).
    ThreeToOne {
        parents: [(f64, f64); 3],
        daughter: (f64, f64),
    },
}

impl JunctionBalance {
    fn totals(&self) -> (f64, f64, f64, f64) {
        fn sum(streams: &[(f64, f64)]) -> (f64, f64) {
            streams
                .iter()
                .fold((0.0, 0.0), |(q, rbc), (flow, hd)| (q + flow, rbc + flow * hd))
        }

        let (parents, daughters): (&[(f64, f64)], &[(f64, f64)]) = match self {
            JunctionBalance::OneToOne { parent, daughter } => {
                (std::slice::from_ref(parent), std::slice::from_ref(daughter))
            }
            JunctionBalance::OneToTwo { parent, daughters } => {
                (std::slice::from_ref(parent), daughters)
            }
            JunctionBalance::TwoToOne { parents, daughter } => {
                (parents, std::slice::from_ref(daughter))
            }
            JunctionBalance::OneToThree { parent, daughters } => {
                (std::slice::from_ref(parent), daughters)
            }
            JunctionBalance::ThreeToOne { parents, daughter } => {
                (parents, std::slice::from_ref(daughter))
            }
        };

        let (flow_in, rbc_in) = sum(parents);
        let (flow_out, rbc_out) = sum(daughters);
        (flow_in, rbc_in, flow_out, rbc_out)
    }

    /// True when both the volumetric and the RBC flux balance hold.
    pub fn is_balanced(&self) -> bool {
        let (flow_in, rbc_in, flow_out, rbc_out) = self.totals();
        (flow_in - flow_out).abs() <= BALANCE_TOLERANCE
            && (rbc_in - rbc_out).abs() <= BALANCE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_connection_balances() {
        let check = JunctionBalance::OneToOne {
            parent: (1.0, 0.45),
            daughter: (1.0, 0.45),
        };
        assert!(check.is_balanced());
    }

    #[test]
    fn straight_connection_flow_mismatch_fails() {
        let check = JunctionBalance::OneToOne {
            parent: (1.0, 0.45),
            daughter: (0.5, 0.9),
        };
        assert!(!check.is_balanced());
    }

    #[test]
    fn bifurcation_balances_when_fluxes_agree() {
        let check = JunctionBalance::OneToTwo {
            parent: (1.0, 0.45),
            daughters: [(0.7, 0.4814488014709555), (0.3, 0.37661946323443735)],
        };
        assert!(check.is_balanced());
    }

    #[test]
    fn bifurcation_rbc_leak_fails() {
        let check = JunctionBalance::OneToTwo {
            parent: (1.0, 0.45),
            daughters: [(0.7, 0.45), (0.3, 0.40)],
        };
        assert!(!check.is_balanced());
    }

    #[test]
    fn confluence_weighted_average_balances() {
        let check = JunctionBalance::TwoToOne {
            parents: [(0.5, 0.4), (0.5, 0.6)],
            daughter: (1.0, 0.5),
        };
        assert!(check.is_balanced());
    }

    #[test]
    fn triple_confluence_balances() {
        let check = JunctionBalance::ThreeToOne {
            parents: [(0.2, 0.3), (0.3, 0.5), (0.5, 0.6)],
            daughter: (1.0, (0.2 * 0.3 + 0.3 * 0.5 + 0.5 * 0.6)),
        };
        assert!(check.is_balanced());
    }

    #[test]
    fn trifurcation_uniform_split_balances() {
        let check = JunctionBalance::OneToThree {
            parent: (1.0, 0.45),
            daughters: [(0.2, 0.45), (0.3, 0.45), (0.5, 0.45)],
        };
        assert!(check.is_balanced());
    }
}
