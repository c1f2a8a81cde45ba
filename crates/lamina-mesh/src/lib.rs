//! # lamina-mesh
//!
//! Triangle mesh representation with Structure-of-Arrays (SoA) layout,
//! plus the topology and geometry queries the membrane force model needs.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`]: Positions and triangle indices in contiguous SoA buffers.
//! - [`Topology`]: Edge adjacency, bending quadruples, closed-manifold checks.
//! - [`geometry`]: Face area vectors and the signed enclosed volume.
//! - Procedural generators (canonical cube, flat sheet, icosphere).

pub mod generators;
pub mod geometry;
pub mod mesh;
pub mod topology;

pub use mesh::TriangleMesh;
pub use topology::{ManifoldDefect, Topology};
