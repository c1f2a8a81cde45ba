//! Procedural mesh generators for scenarios and tests.
//!
//! Closed generators wind every triangle outward (right-hand rule), so
//! their enclosed volume is positive and they can carry a volume bond
//! directly.

use std::collections::HashMap;

use lamina_math::DVec3;

use crate::mesh::TriangleMesh;

/// Triangles of the canonical cube, outward wound.
///
/// Vertex order is `(0,0,0), (0,0,1), (0,1,0), (0,1,1), (1,1,0), (1,1,1),
/// (1,0,0), (1,0,1)` in units of the edge length, i.e. consecutive pairs
/// walk around the x = 0 face and then the x = 1 face.
pub const CUBE_TRIANGLES: [[u32; 3]; 12] = [
    [0, 1, 2],
    [1, 3, 2],
    [2, 3, 4],
    [3, 5, 4],
    [4, 5, 6],
    [5, 7, 6],
    [6, 7, 0],
    [7, 1, 0],
    [0, 2, 4],
    [0, 4, 6],
    [1, 5, 3],
    [1, 7, 5],
];

/// Generates an axis-aligned cube with the given edge length, centered at
/// `center`, using the canonical vertex order of [`CUBE_TRIANGLES`].
///
/// # Example
/// ```
/// use lamina_math::DVec3;
/// use lamina_mesh::generators::cube;
/// let mesh = cube(1.0, DVec3::ZERO);
/// assert_eq!(mesh.vertex_count(), 8);
/// assert!((mesh.enclosed_volume() - 1.0).abs() < 1e-12);
/// ```
pub fn cube(edge: f64, center: DVec3) -> TriangleMesh {
    const CORNERS: [[f64; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0],
        [1.0, 1.0, 1.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 1.0],
    ];

    let mut mesh = TriangleMesh::with_capacity(8, 12);
    for corner in CORNERS {
        let unit = DVec3::from_array(corner) - DVec3::splat(0.5);
        mesh.push_vertex(center + unit * edge);
    }
    for tri in CUBE_TRIANGLES {
        mesh.push_triangle(tri);
    }
    mesh
}

/// Generates a flat rectangular sheet in the XY plane at Z = 0.
///
/// The sheet spans `[-width/2, width/2]` in X and `[-height/2, height/2]`
/// in Y. Every triangle is wound so its normal points along +Z.
///
/// # Arguments
/// - `cols`: Number of quads along X (vertex count = cols + 1).
/// - `rows`: Number of quads along Y (vertex count = rows + 1).
///
/// # Example
/// ```
/// use lamina_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> TriangleMesh {
    let verts_x = cols + 1;
    let verts_y = rows + 1;
    let mut mesh = TriangleMesh::with_capacity(verts_x * verts_y, cols * rows * 2);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f64 / cols as f64;
            let v = j as f64 / rows as f64;
            mesh.push_vertex(DVec3::new(-half_w + u * width, -half_h + v * height, 0.0));
        }
    }

    for j in 0..rows {
        for i in 0..cols {
            let bot_left = (j * verts_x + i) as u32;
            let bot_right = bot_left + 1;
            let top_left = bot_left + verts_x as u32;
            let top_right = top_left + 1;

            mesh.push_triangle([bot_left, bot_right, top_left]);
            mesh.push_triangle([bot_right, top_right, top_left]);
        }
    }

    mesh
}

/// Generates a closed icosphere centered at the origin.
///
/// Starts from a regular icosahedron and splits every triangle into four
/// `subdivisions` times, projecting new vertices onto the sphere.
/// Subdivision level `n` yields `20 · 4ⁿ` triangles.
pub fn icosphere(radius: f64, subdivisions: u32) -> TriangleMesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let base = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut vertices: Vec<DVec3> = base
        .iter()
        .map(|&p| DVec3::from_array(p).normalize())
        .collect();
    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<DVec3>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let m = (vertices[a as usize] + vertices[b as usize]).normalize();
                vertices.push(m);
                (vertices.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let mut mesh = TriangleMesh::with_capacity(vertices.len(), faces.len());
    for v in vertices {
        mesh.push_vertex(v * radius);
    }
    for f in faces {
        mesh.push_triangle(f);
    }
    mesh
}
