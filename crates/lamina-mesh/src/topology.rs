//! Mesh topology queries.
//!
//! Builds adjacency data structures from the triangle index buffer,
//! enabling the queries the membrane model needs at configuration time:
//! which triangle pairs share an edge (bending quadruples) and whether a
//! triangle list bounds a closed, consistently oriented volume.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::mesh::TriangleMesh;

/// Adjacency of a membrane mesh, derived once from its triangles.
///
/// Built once when a mesh is configured. Edges are kept in ascending
/// `(v_min, v_max)` order so bond registration is deterministic.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Triangles incident to each vertex.
    pub vertex_triangles: Vec<Vec<u32>>,

    /// Each undirected edge once, smaller vertex first.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the adjacent triangles.
    /// Boundary edges have exactly 1 adjacent triangle.
    pub edge_triangles: Vec<Vec<u32>>,

    /// Edges shared by exactly two triangles.
    pub interior_edges: Vec<InteriorEdge>,
}

/// An interior (non-boundary) edge with its two adjacent triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorEdge {
    /// Smaller vertex index of the shared edge.
    pub v0: u32,
    /// Larger vertex index of the shared edge.
    pub v1: u32,
    /// The vertex of triangle A not on the edge.
    pub wing_a: u32,
    /// The vertex of triangle B not on the edge.
    pub wing_b: u32,
    /// Triangle on the `wing_a` side.
    pub tri_a: u32,
    /// Triangle on the `wing_b` side.
    pub tri_b: u32,
    /// Whether triangle A traverses the edge as `v0 → v1`.
    pub a_runs_forward: bool,
}

impl InteriorEdge {
    /// The bending quadruple `[p0, p1, p2, p3]` for this edge.
    ///
    /// Triangles `(p0, p1, p2)` and `(p0, p2, p3)` share the edge
    /// `(p0, p2)` and keep the winding of triangles A and B, so both
    /// right-hand-rule normals agree for a consistently oriented mesh.
    pub fn bending_quad(&self) -> [u32; 4] {
        if self.a_runs_forward {
            [self.v1, self.wing_a, self.v0, self.wing_b]
        } else {
            [self.v0, self.wing_a, self.v1, self.wing_b]
        }
    }
}

impl Topology {
    /// Adjacency of `mesh`.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
        Self::from_triangles(mesh.vertex_count(), &triangles)
    }

    /// Build topology from a bare triangle list over `vertex_count` vertices.
    pub fn from_triangles(vertex_count: usize, triangles: &[[u32; 3]]) -> Self {
        let mut vertex_triangles: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        for (t, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if let Some(list) = vertex_triangles.get_mut(v as usize) {
                    list.push(t as u32);
                }
            }
        }

        let mut edge_map: BTreeMap<(u32, u32), Vec<u32>> = BTreeMap::new();
        for (t, &[a, b, c]) in triangles.iter().enumerate() {
            for (v0, v1) in [(a, b), (b, c), (c, a)] {
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_map.entry(key).or_default().push(t as u32);
            }
        }

        let mut edges = Vec::with_capacity(edge_map.len());
        let mut edge_triangles = Vec::with_capacity(edge_map.len());
        let mut interior_edges = Vec::new();

        for ((v0, v1), tris) in edge_map {
            if let [tri_a, tri_b] = tris[..] {
                let ta = triangles[tri_a as usize];
                let tb = triangles[tri_b as usize];
                interior_edges.push(InteriorEdge {
                    v0,
                    v1,
                    wing_a: wing_vertex(ta, v0, v1),
                    wing_b: wing_vertex(tb, v0, v1),
                    tri_a,
                    tri_b,
                    a_runs_forward: runs_forward(ta, v0, v1),
                });
            }
            edges.push([v0, v1]);
            edge_triangles.push(tris);
        }

        Self {
            vertex_triangles,
            edges,
            edge_triangles,
            interior_edges,
        }
    }

    /// Bending quadruples for every interior edge, in edge order.
    pub fn bending_quads(&self) -> Vec<[u32; 4]> {
        self.interior_edges.iter().map(InteriorEdge::bending_quad).collect()
    }

    /// Edges used by a single triangle.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    /// Whether every edge is shared by two or more triangles.
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}

/// Reason a triangle list fails to bound a closed oriented volume.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifoldDefect {
    #[error("triangle list is empty")]
    Empty,

    #[error("triangle {triangle} repeats a vertex")]
    RepeatedVertex { triangle: usize },

    #[error("half-edge ({from}, {to}) is used by more than one triangle")]
    DuplicateHalfEdge { from: u32, to: u32 },

    #[error("half-edge ({from}, {to}) has no opposite half-edge ({to}, {from})")]
    OpenEdge { from: u32, to: u32 },
}

/// Checks that `triangles` form a closed, consistently oriented 2-manifold.
///
/// Every directed half-edge must occur exactly once and its reverse must
/// occur exactly once. Outward (vs. inward) orientation cannot be decided
/// from connectivity alone; it shows up as the sign of the enclosed volume.
pub fn check_closed_oriented(triangles: &[[u32; 3]]) -> Result<(), ManifoldDefect> {
    if triangles.is_empty() {
        return Err(ManifoldDefect::Empty);
    }

    let mut half_edges: BTreeMap<(u32, u32), usize> = BTreeMap::new();
    for (t, &[a, b, c]) in triangles.iter().enumerate() {
        if a == b || b == c || a == c {
            return Err(ManifoldDefect::RepeatedVertex { triangle: t });
        }
        for (from, to) in [(a, b), (b, c), (c, a)] {
            let count = half_edges.entry((from, to)).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Err(ManifoldDefect::DuplicateHalfEdge { from, to });
            }
        }
    }

    for &(from, to) in half_edges.keys() {
        if !half_edges.contains_key(&(to, from)) {
            return Err(ManifoldDefect::OpenEdge { from, to });
        }
    }

    Ok(())
}

/// Find the vertex in `tri` that is not v0 or v1 (the "wing" vertex).
fn wing_vertex([a, b, c]: [u32; 3], v0: u32, v1: u32) -> u32 {
    if a != v0 && a != v1 {
        a
    } else if b != v0 && b != v1 {
        b
    } else {
        c
    }
}

/// Whether the cyclic order of `tri` visits `v0` directly before `v1`.
fn runs_forward([a, b, c]: [u32; 3], v0: u32, v1: u32) -> bool {
    (a, b) == (v0, v1) || (b, c) == (v0, v1) || (c, a) == (v0, v1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wing_vertex_picks_off_edge_vertex() {
        assert_eq!(wing_vertex([4, 7, 9], 4, 9), 7);
        assert_eq!(wing_vertex([4, 7, 9], 7, 9), 4);
        assert_eq!(wing_vertex([4, 7, 9], 4, 7), 9);
    }

    #[test]
    fn runs_forward_follows_cyclic_order() {
        assert!(runs_forward([0, 1, 2], 0, 1));
        assert!(runs_forward([0, 1, 2], 2, 0));
        assert!(!runs_forward([0, 1, 2], 0, 2));
    }
}
