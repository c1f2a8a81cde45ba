//! Triangle mesh of a membrane surface, stored channel by channel.
//!
//! Coordinates live in three parallel vectors:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! A mesh describes the initial placement of membrane vertices. Once the
//! vertices are handed to a particle store, the store owns the positions
//! and the mesh only contributes its connectivity.

use lamina_math::DVec3;
use lamina_types::{LaminaError, LaminaResult};
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Membrane surface mesh: vertex positions plus triangle connectivity.
///
/// Triangle winding follows the right-hand rule: for a closed mesh,
/// `(p1 - p0) × (p2 - p0)` points out of the enclosed volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex x coordinates.
    pub pos_x: Vec<f64>,
    /// Vertex y coordinates.
    pub pos_y: Vec<f64>,
    /// Vertex z coordinates.
    pub pos_z: Vec<f64>,

    /// Triangle indices, three per triangle: [v0, v1, v2].
    /// Stored flat: `[t0v0, t0v1, t0v2, t1v0, t1v1, t1v2, ...]`
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Vertex count.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Triangle count.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> DVec3 {
        DVec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Corner indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Iterates over all triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Moves vertex `i` to `p`.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: DVec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, p: DVec3) -> u32 {
        self.pos_x.push(p.x);
        self.pos_y.push(p.y);
        self.pos_z.push(p.z);
        (self.pos_x.len() - 1) as u32
    }

    /// Appends a triangle.
    pub fn push_triangle(&mut self, tri: [u32; 3]) {
        self.indices.extend_from_slice(&tri);
    }

    /// Empty mesh with room for the given number of vertices and triangles.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// All vertex positions, in index order.
    pub fn positions(&self) -> Vec<DVec3> {
        (0..self.vertex_count()).map(|i| self.position(i)).collect()
    }

    /// Arithmetic mean of all vertex positions.
    pub fn centroid(&self) -> DVec3 {
        geometry::centroid(&self.positions())
    }

    /// Signed volume enclosed by the mesh (positive for outward winding).
    ///
    /// Only meaningful for a closed mesh.
    pub fn enclosed_volume(&self) -> f64 {
        let positions = self.positions();
        geometry::signed_volume(|i| positions[i as usize], self.triangles())
    }

    /// Translates every vertex by `offset`.
    pub fn translate(&mut self, offset: DVec3) {
        for i in 0..self.vertex_count() {
            let p = self.position(i) + offset;
            self.set_position(i, p);
        }
    }

    /// Scales every vertex about `center` by `factor`.
    pub fn scale_about(&mut self, center: DVec3, factor: f64) {
        for i in 0..self.vertex_count() {
            let p = center + (self.position(i) - center) * factor;
            self.set_position(i, p);
        }
    }

    /// Checks that the buffers describe a usable mesh.
    ///
    /// Checks:
    /// - the three coordinate vectors agree in length
    /// - every index names an existing vertex
    /// - no triangle repeats a vertex
    pub fn validate(&self) -> LaminaResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(LaminaError::InvalidMesh(
                "coordinate vectors differ in length".into(),
            ));
        }

        if self.indices.len() % 3 != 0 {
            return Err(LaminaError::InvalidMesh(
                "index buffer length is not a multiple of 3".into(),
            ));
        }

        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(LaminaError::InvalidMesh(format!(
                    "Index {} at position {} is out of range (vertex count: {})",
                    idx, i, n
                )));
            }
        }

        for (t, [a, b, c]) in self.triangles().enumerate() {
            if a == b || b == c || a == c {
                return Err(LaminaError::InvalidMesh(format!(
                    "Triangle {} has repeated vertex indices: [{}, {}, {}]",
                    t, a, b, c
                )));
            }
        }

        Ok(())
    }

    /// Constructs a mesh from interleaved position data
    /// `[x0, y0, z0, x1, y1, z1, ...]`.
    pub fn from_interleaved(positions: &[f64], indices: &[u32]) -> LaminaResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(LaminaError::InvalidMesh(
                "interleaved position buffer length is not a multiple of 3".into(),
            ));
        }

        let n = positions.len() / 3;
        let mut mesh = Self::with_capacity(n, indices.len() / 3);
        for p in positions.chunks_exact(3) {
            mesh.pos_x.push(p[0]);
            mesh.pos_y.push(p[1]);
            mesh.pos_z.push(p[2]);
        }
        mesh.indices = indices.to_vec();

        mesh.validate()?;
        Ok(mesh)
    }
}
