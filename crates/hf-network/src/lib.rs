//! hf-network: vascular graph layer for haemoflow.
//!
//! Provides:
//! - Core network data structures (Junction, Vessel, VascularNetwork)
//! - Incremental network builder with validation
//! - Boundary conditions (pressure or inflow, with boundary haematocrit)
//! - Per-iteration mutable field state (pressure, flow, haematocrit, velocity)
//!
//! # Example
//!
//! ```
//! use hf_core::units::{m, pa, um};
//! use hf_network::{Boundary, BoundaryKind, NetworkBuilder};
//!
//! let mut builder = NetworkBuilder::new();
//! let inlet = builder.add_junction("inlet");
//! let outlet = builder.add_junction("outlet");
//! builder.add_vessel("arteriole", inlet, outlet, um(10.0), m(1e-3)).unwrap();
//! builder.set_boundary(inlet, Boundary::new(BoundaryKind::Pressure(pa(6000.0)), 0.45));
//! builder.set_boundary(outlet, Boundary::new(BoundaryKind::Pressure(pa(2000.0)), 0.45));
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.junctions().len(), 2);
//! assert_eq!(network.vessels().len(), 1);
//! ```

pub mod boundary;
pub mod builder;
pub mod error;
pub mod fields;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use boundary::{Boundary, BoundaryKind};
pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use fields::FieldState;
pub use graph::{Junction, VascularNetwork, Vessel};
