//! Node resolution driver: one discharge-haematocrit update pass.
//!
//! Junctions are processed in strictly descending pressure order, so every
//! parent vessel's haematocrit is already finalized when a junction is
//! reached. Each junction dispatches on its (parents, daughters, boundary)
//! shape; boundary junctions synthesize a ghost stream for the side that flow
//! conservation says is missing. Ghost parents carry the junction's boundary
//! haematocrit; ghost daughters carry their RBC share out of the network.

use hf_core::{EdgeId, NodeId};
use hf_network::{Boundary, FieldState, VascularNetwork};
use tracing::warn;

use crate::balance::JunctionBalance;
use crate::diagnostics::SplitDiagnostics;
use crate::error::{HaematocritError, HaematocritResult};
use crate::phase_separation::{DaughterBranch, ParentStream, PhaseSeparation};
use crate::topology::{classify, pressure_order, pressure_ranks};

/// Recompute the discharge haematocrit of every vessel.
///
/// Before the first pressure solve there is nothing to propagate: the
/// discharge haematocrit degrades to the tube haematocrit. Otherwise each
/// junction is resolved in descending-pressure order and the pass fails with
/// `RbcImbalance` if any junction leaked RBC flux.
pub fn update_hd(
    network: &VascularNetwork,
    fields: &mut FieldState,
    law: &PhaseSeparation,
    diagnostics: &mut SplitDiagnostics,
) -> HaematocritResult<()> {
    diagnostics.clear();

    let order = match fields.pressure.as_ref() {
        Some(pressure) => pressure_order(pressure),
        None => {
            // First contact: no pressure field to propagate along yet
            fields.hd.copy_from_slice(&fields.ht);
            return Ok(());
        }
    };
    let rank = pressure_ranks(&order);
    let flow: Vec<f64> = fields.flow_rate.iter().map(|q| q.abs()).collect();

    let mut pass = Pass {
        network,
        law,
        flow: &flow,
        hd: &mut fields.hd,
        diagnostics,
        imbalance: 0,
    };

    for &node_index in &order {
        let node = NodeId::from_index(node_index as u32);
        pass.resolve_node(node, &rank)?;
    }

    if pass.imbalance > 0 {
        return Err(HaematocritError::RbcImbalance {
            count: pass.imbalance,
        });
    }
    Ok(())
}

/// Working state of one pass.
struct Pass<'a> {
    network: &'a VascularNetwork,
    law: &'a PhaseSeparation,
    /// Unsigned flow per vessel, snapshotted at pass start.
    flow: &'a [f64],
    hd: &'a mut Vec<f64>,
    diagnostics: &'a mut SplitDiagnostics,
    imbalance: u32,
}

impl Pass<'_> {
    fn q(&self, edge: EdgeId) -> f64 {
        self.flow[edge.index() as usize]
    }

    fn diameter(&self, edge: EdgeId) -> f64 {
        self.network.vessels()[edge.index() as usize].diameter
    }

    fn hd_of(&self, edge: EdgeId) -> f64 {
        self.hd[edge.index() as usize]
    }

    fn set_hd(&mut self, edge: EdgeId, value: f64) {
        self.hd[edge.index() as usize] = value;
    }

    fn audit(&mut self, node: NodeId, check: JunctionBalance) {
        if !check.is_balanced() {
            warn!(node = %node, ?check, "RBC balance violated");
            self.imbalance += 1;
        }
    }

    fn resolve_node(&mut self, node: NodeId, rank: &[usize]) -> HaematocritResult<()> {
        let topology = classify(self.network, node, rank);
        let parents = topology.parents.as_slice();
        let daughters = topology.daughters.as_slice();

        if parents.is_empty() && daughters.is_empty() {
            warn!(node = %node, "isolated junction, skipping");
            return Ok(());
        }

        match self.network.boundary(node) {
            Some(boundary) => self.resolve_boundary(node, parents, daughters, *boundary),
            None => self.resolve_interior(node, parents, daughters),
        }
    }

    fn resolve_interior(
        &mut self,
        node: NodeId,
        parents: &[EdgeId],
        daughters: &[EdgeId],
    ) -> HaematocritResult<()> {
        match (parents, daughters) {
            // (-o-)
            ([p], [d]) => {
                let hd_parent = self.hd_of(*p);
                self.set_hd(*d, hd_parent);
                self.audit(
                    node,
                    JunctionBalance::OneToOne {
                        parent: (self.q(*p), hd_parent),
                        daughter: (self.q(*d), hd_parent),
                    },
                );
            }

            // (-<)
            ([p], [a, b]) => {
                let parent = ParentStream {
                    flow: self.q(*p),
                    haematocrit: self.hd_of(*p),
                    diameter: self.diameter(*p),
                };
                self.split_pair(node, parent, *a, *b)?;
            }

            // (-E)
            ([p], [a, b, c]) => {
                let parent = (self.q(*p), self.hd_of(*p));
                self.trifurcate(node, parent, &[*a, *b, *c], None);
            }

            // (>-)
            ([a, b], [d]) => {
                let streams = [(self.q(*a), self.hd_of(*a)), (self.q(*b), self.hd_of(*b))];
                let merged = merge(&streams);
                self.set_hd(*d, merged);
                self.audit(
                    node,
                    JunctionBalance::TwoToOne {
                        parents: streams,
                        daughter: (self.q(*d), merged),
                    },
                );
            }

            // (>-<): merge the parents into one virtual stream, then split
            ([pa, pb], [a, b]) => {
                let parent = aggregate_parents(
                    (self.q(*pa), self.hd_of(*pa), self.diameter(*pa)),
                    (self.q(*pb), self.hd_of(*pb), self.diameter(*pb)),
                );
                self.split_pair(node, parent, *a, *b)?;
            }

            // (E-)
            ([a, b, c], [d]) => {
                let streams = [
                    (self.q(*a), self.hd_of(*a)),
                    (self.q(*b), self.hd_of(*b)),
                    (self.q(*c), self.hd_of(*c)),
                ];
                let merged = merge(&streams);
                self.set_hd(*d, merged);
                self.audit(
                    node,
                    JunctionBalance::ThreeToOne {
                        parents: streams,
                        daughter: (self.q(*d), merged),
                    },
                );
            }

            ([], _) => {
                warn!(node = %node, "interior junction has no parent, haematocrit left stale");
            }

            _ => {
                warn!(
                    node = %node,
                    parents = parents.len(),
                    daughters = daughters.len(),
                    "unrecognized interior configuration, haematocrit left stale"
                );
            }
        }
        Ok(())
    }

    fn resolve_boundary(
        &mut self,
        node: NodeId,
        parents: &[EdgeId],
        daughters: &[EdgeId],
        boundary: Boundary,
    ) -> HaematocritResult<()> {
        let hd_boundary = boundary.haematocrit;

        match (parents, daughters) {
            // (-o-) with a ghost parent: blood enters here
            ([], [d]) => {
                self.set_hd(*d, hd_boundary);
                self.audit(
                    node,
                    JunctionBalance::OneToOne {
                        parent: (self.q(*d), hd_boundary),
                        daughter: (self.q(*d), hd_boundary),
                    },
                );
            }

            // Pure outflow: a ghost daughter absorbs the whole stream
            ([_], []) | ([_, _], []) | ([_, _, _], []) => {}

            // (-<) with a ghost parent feeding the bifurcation
            ([], [a, b]) => {
                let parent = ParentStream {
                    flow: self.q(*a) + self.q(*b),
                    haematocrit: hd_boundary,
                    diameter: (self.diameter(*a) + self.diameter(*b)) / 2.0,
                };
                self.split_pair(node, parent, *a, *b)?;
            }

            // (-E) with a ghost parent feeding the trifurcation
            ([], [a, b, c]) => {
                let ghost_flow = self.q(*a) + self.q(*b) + self.q(*c);
                self.trifurcate(node, (ghost_flow, hd_boundary), &[*a, *b, *c], None);
            }

            ([p], [d]) => {
                if self.q(*p) < self.q(*d) {
                    // Deficit on the parent side: a ghost parent joins in
                    let streams = [
                        (self.q(*p), self.hd_of(*p)),
                        (self.q(*d) - self.q(*p), hd_boundary),
                    ];
                    let merged = merge(&streams);
                    self.set_hd(*d, merged);
                    self.audit(
                        node,
                        JunctionBalance::TwoToOne {
                            parents: streams,
                            daughter: (self.q(*d), merged),
                        },
                    );
                } else {
                    // Surplus leaves through a ghost daughter shaped like the real one
                    let parent = ParentStream {
                        flow: self.q(*p),
                        haematocrit: self.hd_of(*p),
                        diameter: self.diameter(*p),
                    };
                    let ghost = DaughterBranch {
                        flow: self.q(*p) - self.q(*d),
                        diameter: self.diameter(*d),
                    };
                    self.split_real_and_ghost(node, parent, *d, ghost)?;
                }
            }

            ([pa, pb], [d]) => {
                let inflow = self.q(*pa) + self.q(*pb);
                if self.q(*d) > inflow {
                    // Third, ghost parent supplies the deficit
                    let streams = [
                        (self.q(*pa), self.hd_of(*pa)),
                        (self.q(*pb), self.hd_of(*pb)),
                        (self.q(*d) - inflow, hd_boundary),
                    ];
                    let merged = merge(&streams);
                    self.set_hd(*d, merged);
                    self.audit(
                        node,
                        JunctionBalance::ThreeToOne {
                            parents: streams,
                            daughter: (self.q(*d), merged),
                        },
                    );
                } else {
                    // Surplus leaves through a ghost daughter
                    let parent = aggregate_parents(
                        (self.q(*pa), self.hd_of(*pa), self.diameter(*pa)),
                        (self.q(*pb), self.hd_of(*pb), self.diameter(*pb)),
                    );
                    let ghost = DaughterBranch {
                        flow: inflow - self.q(*d),
                        diameter: self.diameter(*d),
                    };
                    self.split_real_and_ghost(node, parent, *d, ghost)?;
                }
            }

            ([p], [a, b]) => {
                let outflow = self.q(*a) + self.q(*b);
                if self.q(*p) > outflow {
                    // Surplus leaves through a third, ghost daughter
                    let ghost_flow = self.q(*p) - outflow;
                    self.trifurcate(
                        node,
                        (self.q(*p), self.hd_of(*p)),
                        &[*a, *b],
                        Some(ghost_flow),
                    );
                } else {
                    // A ghost parent joins; it copies the real parent's diameter
                    let ghost_flow = outflow - self.q(*p);
                    let parent = aggregate_parents(
                        (self.q(*p), self.hd_of(*p), self.diameter(*p)),
                        (ghost_flow, hd_boundary, self.diameter(*p)),
                    );
                    self.split_pair(node, parent, *a, *b)?;
                }
            }

            _ => {
                warn!(
                    node = %node,
                    parents = parents.len(),
                    daughters = daughters.len(),
                    "unrecognized boundary configuration, haematocrit left stale"
                );
            }
        }
        Ok(())
    }

    /// Phase-separate a parent between two real daughters and audit.
    fn split_pair(
        &mut self,
        node: NodeId,
        parent: ParentStream,
        a: EdgeId,
        b: EdgeId,
    ) -> HaematocritResult<()> {
        let outcome = self.law.split(
            parent,
            DaughterBranch {
                flow: self.q(a),
                diameter: self.diameter(a),
            },
            DaughterBranch {
                flow: self.q(b),
                diameter: self.diameter(b),
            },
        )?;
        self.diagnostics.record_split(&outcome);
        self.set_hd(a, outcome.hd_a);
        self.set_hd(b, outcome.hd_b);
        self.audit(
            node,
            JunctionBalance::OneToTwo {
                parent: (parent.flow, parent.haematocrit),
                daughters: [(self.q(a), outcome.hd_a), (self.q(b), outcome.hd_b)],
            },
        );
        Ok(())
    }

    /// Phase-separate a parent between one real daughter and a ghost.
    ///
    /// Only the real daughter's haematocrit is written back; the ghost's
    /// share leaves the network.
    fn split_real_and_ghost(
        &mut self,
        node: NodeId,
        parent: ParentStream,
        real: EdgeId,
        ghost: DaughterBranch,
    ) -> HaematocritResult<()> {
        let outcome = self.law.split(
            parent,
            DaughterBranch {
                flow: self.q(real),
                diameter: self.diameter(real),
            },
            ghost,
        )?;
        self.diagnostics.record_split(&outcome);
        self.set_hd(real, outcome.hd_a);
        self.audit(
            node,
            JunctionBalance::OneToTwo {
                parent: (parent.flow, parent.haematocrit),
                daughters: [(self.q(real), outcome.hd_a), (ghost.flow, outcome.hd_b)],
            },
        );
        Ok(())
    }

    /// Uniform trifurcation: every daughter inherits the parent haematocrit.
    ///
    /// `ghost_flow` is an optional third outflow absorbing a boundary
    /// surplus; it inherits the parent haematocrit like the real daughters.
    fn trifurcate(
        &mut self,
        node: NodeId,
        parent: (f64, f64),
        real: &[EdgeId],
        ghost_flow: Option<f64>,
    ) {
        let (flow_parent, hd_parent) = parent;

        let mut daughters = [(0.0, 0.0); 3];
        for (slot, edge) in daughters.iter_mut().zip(real.iter()) {
            *slot = (self.q(*edge), hd_parent);
        }
        if let Some(flow) = ghost_flow {
            daughters[real.len()] = (flow, hd_parent);
        }

        for edge in real {
            self.set_hd(*edge, hd_parent);
        }

        let rbc_parent = flow_parent * hd_parent;
        let rbc_fractions = daughters.map(|(q, hd)| {
            if rbc_parent == 0.0 {
                0.0
            } else {
                q * hd / rbc_parent
            }
        });
        let flow_fractions = daughters.map(|(q, _)| q / flow_parent);
        self.diagnostics
            .record_trifurcation(rbc_fractions, flow_fractions);

        self.audit(
            node,
            JunctionBalance::OneToThree {
                parent: (flow_parent, hd_parent),
                daughters,
            },
        );
    }
}

/// Flow-weighted haematocrit of merged parent streams.
fn merge(streams: &[(f64, f64)]) -> f64 {
    let rbc: f64 = streams.iter().map(|(q, hd)| q * hd).sum();
    let flow: f64 = streams.iter().map(|(q, _)| q).sum();
    rbc / flow
}

/// Combine two parent streams `(flow, haematocrit, diameter)` into one
/// virtual stream for a split. The virtual diameter is the mean of the
/// merged streams' diameters.
fn aggregate_parents(a: (f64, f64, f64), b: (f64, f64, f64)) -> ParentStream {
    let (flow_a, hd_a, diam_a) = a;
    let (flow_b, hd_b, diam_b) = b;
    ParentStream {
        flow: flow_a + flow_b,
        haematocrit: merge(&[(flow_a, hd_a), (flow_b, hd_b)]),
        diameter: (diam_a + diam_b) / 2.0,
    }
}
