//! Strongly-typed identifiers for simulation entities.
//!
//! Vertices are indices into an external particle store; bonds are
//! indices into the bond registry; meshes group the triangles that bound
//! one enclosed volume.

use serde::{Deserialize, Serialize};

/// Index of a particle (mesh vertex) in the external particle store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Index of a bond in the bond registry. Shared by all bond kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BondId(pub u32);

/// Identifier of one closed mesh (one enclosed volume).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u16);

impl VertexId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Wraps a fixed-size array of raw indices.
    #[inline]
    pub fn many<const N: usize>(raw: [u32; N]) -> [Self; N] {
        raw.map(Self)
    }
}

impl BondId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for VertexId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for BondId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u16> for MeshId {
    fn from(val: u16) -> Self {
        Self(val)
    }
}
