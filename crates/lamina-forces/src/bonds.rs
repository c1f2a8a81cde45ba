//! Bond definitions and the bond registry.
//!
//! The registry owns every triangle, bending and volume bond together with
//! its lazily captured reference geometry. Bonds start [`BondStatus::Pending`],
//! become [`BondStatus::Active`] when their reference is captured, and a
//! triangle bond becomes [`BondStatus::Broken`] once it over-stretches.

use std::collections::HashMap;

use lamina_math::DVec3;
use lamina_mesh::topology::check_closed_oriented;
use lamina_mesh::{Topology, TriangleMesh};
use lamina_types::constants::DEGENERATE_VOLUME_THRESHOLD;
use lamina_types::{BondId, LaminaError, LaminaResult, MeshId, VertexId};
use serde::{Deserialize, Serialize};

use crate::tribend::TribendParams;
use crate::triel::{TrielParams, TrielReference};
use crate::volcons::{mesh_volume, VolConsParams};

/// Lifecycle of a single bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondStatus {
    /// Registered, reference geometry not captured yet.
    Pending,
    /// Reference captured; evaluated every step.
    Active,
    /// Ruptured; skipped from now on.
    Broken,
}

/// In-plane elasticity of one triangle.
#[derive(Debug, Clone)]
pub struct TriangleBond {
    pub id: BondId,
    pub vertices: [VertexId; 3],
    pub params: TrielParams,
    pub(crate) reference: Option<TrielReference>,
    pub(crate) status: BondStatus,
}

impl TriangleBond {
    pub fn reference(&self) -> Option<&TrielReference> {
        self.reference.as_ref()
    }

    pub fn status(&self) -> BondStatus {
        self.status
    }
}

/// Dihedral bending of two triangles sharing an edge.
#[derive(Debug, Clone)]
pub struct BendingBond {
    pub id: BondId,
    /// `[p0, p1, p2, p3]`: triangles `(p0, p1, p2)` and `(p0, p2, p3)`.
    pub vertices: [VertexId; 4],
    pub params: TribendParams,
    pub(crate) reference_angle: Option<f64>,
    pub(crate) status: BondStatus,
}

impl BendingBond {
    /// Signed reference dihedral angle, once captured.
    pub fn reference_angle(&self) -> Option<f64> {
        self.reference_angle
    }

    pub fn status(&self) -> BondStatus {
        self.status
    }
}

/// Volume conservation of one closed mesh.
#[derive(Debug, Clone)]
pub struct VolumeBond {
    pub id: BondId,
    pub mesh: MeshId,
    /// Outward-wound triangles bounding the mesh.
    pub triangles: Vec<[VertexId; 3]>,
    pub params: VolConsParams,
    pub(crate) reference_volume: Option<f64>,
    pub(crate) status: BondStatus,
}

impl VolumeBond {
    pub fn reference_volume(&self) -> Option<f64> {
        self.reference_volume
    }

    pub fn status(&self) -> BondStatus {
        self.status
    }
}

/// Bond kinds applied to a whole mesh by [`BondRegistry::add_membrane`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembraneParams {
    /// One triangle bond per mesh triangle.
    pub triel: Option<TrielParams>,
    /// One bending bond per interior edge.
    pub tribend: Option<TribendParams>,
    /// One volume bond for the mesh. Requires a closed mesh.
    pub volcons: Option<VolConsParams>,
}

/// Bonds created by [`BondRegistry::add_membrane`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembraneBonds {
    pub triangles: Vec<BondId>,
    pub bendings: Vec<BondId>,
    pub volume: Option<BondId>,
}

/// Number of references captured by one [`BondRegistry::capture_pending`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub triangles: usize,
    pub bendings: usize,
    pub volumes: usize,
}

impl CaptureSummary {
    pub fn total(&self) -> usize {
        self.triangles + self.bendings + self.volumes
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Triangle(usize),
    Bending(usize),
    Volume(usize),
}

/// Owner of all membrane bonds.
#[derive(Debug, Clone, Default)]
pub struct BondRegistry {
    pub(crate) triangles: Vec<TriangleBond>,
    pub(crate) bendings: Vec<BendingBond>,
    pub(crate) volumes: Vec<VolumeBond>,
    slots: HashMap<BondId, Slot>,
    next_id: u32,
}

impl BondRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a triangle bond over `vertices`.
    pub fn add_triangle(
        &mut self,
        vertices: [VertexId; 3],
        params: TrielParams,
    ) -> LaminaResult<BondId> {
        params.validate()?;
        require_distinct(&vertices)?;
        let id = self.allocate();
        self.slots.insert(id, Slot::Triangle(self.triangles.len()));
        self.triangles.push(TriangleBond {
            id,
            vertices,
            params,
            reference: None,
            status: BondStatus::Pending,
        });
        Ok(id)
    }

    /// Registers a bending bond over `[p0, p1, p2, p3]`.
    pub fn add_bending(
        &mut self,
        vertices: [VertexId; 4],
        params: TribendParams,
    ) -> LaminaResult<BondId> {
        params.validate()?;
        require_distinct(&vertices)?;
        let id = self.allocate();
        self.slots.insert(id, Slot::Bending(self.bendings.len()));
        self.bendings.push(BendingBond {
            id,
            vertices,
            params,
            reference_angle: None,
            status: BondStatus::Pending,
        });
        Ok(id)
    }

    /// Registers the volume bond of `mesh`.
    ///
    /// `triangles` must form a closed, consistently oriented 2-manifold;
    /// anything else is rejected with [`LaminaError::InconsistentTopology`].
    /// Each mesh carries at most one volume bond.
    pub fn add_volume(
        &mut self,
        mesh: MeshId,
        triangles: Vec<[VertexId; 3]>,
        params: VolConsParams,
    ) -> LaminaResult<BondId> {
        params.validate()?;
        if self.volumes.iter().any(|v| v.mesh == mesh) {
            return Err(LaminaError::InvalidParameter(format!(
                "mesh {:?} already has a volume bond",
                mesh
            )));
        }
        let raw: Vec<[u32; 3]> = triangles.iter().map(|t| t.map(|v| v.0)).collect();
        check_closed_oriented(&raw).map_err(|defect| LaminaError::InconsistentTopology {
            mesh,
            reason: defect.to_string(),
        })?;

        let id = self.allocate();
        self.slots.insert(id, Slot::Volume(self.volumes.len()));
        self.volumes.push(VolumeBond {
            id,
            mesh,
            triangles,
            params,
            reference_volume: None,
            status: BondStatus::Pending,
        });
        Ok(id)
    }

    /// Registers bonds for every element of `mesh`, whose vertex `i` is
    /// particle `first_vertex + i`.
    ///
    /// Parameters and topology are checked first and the bonds are built
    /// on a staged copy, so a rejected mesh leaves the registry unchanged.
    pub fn add_membrane(
        &mut self,
        mesh_id: MeshId,
        mesh: &TriangleMesh,
        first_vertex: VertexId,
        params: &MembraneParams,
    ) -> LaminaResult<MembraneBonds> {
        mesh.validate()?;
        let offset = first_vertex.0;
        let shift = |v: u32| VertexId(offset + v);
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();

        if params.volcons.is_some() {
            check_closed_oriented(&triangles).map_err(|defect| {
                LaminaError::InconsistentTopology {
                    mesh: mesh_id,
                    reason: defect.to_string(),
                }
            })?;
            if self.volumes.iter().any(|v| v.mesh == mesh_id) {
                return Err(LaminaError::InvalidParameter(format!(
                    "mesh {:?} already has a volume bond",
                    mesh_id
                )));
            }
        }
        if let Some(triel) = &params.triel {
            triel.validate()?;
        }
        if let Some(tribend) = &params.tribend {
            tribend.validate()?;
        }
        if let Some(volcons) = &params.volcons {
            volcons.validate()?;
        }

        let mut staged = self.clone();
        let mut created = MembraneBonds::default();
        if let Some(triel) = params.triel {
            for tri in &triangles {
                created.triangles.push(staged.add_triangle(tri.map(shift), triel)?);
            }
        }
        if let Some(tribend) = params.tribend {
            let topology = Topology::from_triangles(mesh.vertex_count(), &triangles);
            for quad in topology.bending_quads() {
                created.bendings.push(staged.add_bending(quad.map(shift), tribend)?);
            }
        }
        if let Some(volcons) = params.volcons {
            let shifted = triangles.iter().map(|t| t.map(shift)).collect();
            created.volume = Some(staged.add_volume(mesh_id, shifted, volcons)?);
        }
        *self = staged;
        Ok(created)
    }

    /// Removes a bond.
    pub fn remove(&mut self, id: BondId) -> LaminaResult<()> {
        let slot = self.slots.remove(&id).ok_or(LaminaError::UnknownBond(id))?;
        match slot {
            Slot::Triangle(i) => {
                self.triangles.remove(i);
            }
            Slot::Bending(i) => {
                self.bendings.remove(i);
            }
            Slot::Volume(i) => {
                self.volumes.remove(i);
            }
        }
        self.reindex();
        Ok(())
    }

    /// Lifecycle state of bond `id`.
    pub fn status(&self, id: BondId) -> LaminaResult<BondStatus> {
        match self.slots.get(&id) {
            Some(Slot::Triangle(i)) => Ok(self.triangles[*i].status),
            Some(Slot::Bending(i)) => Ok(self.bendings[*i].status),
            Some(Slot::Volume(i)) => Ok(self.volumes[*i].status),
            None => Err(LaminaError::UnknownBond(id)),
        }
    }

    pub fn triangle(&self, id: BondId) -> Option<&TriangleBond> {
        match self.slots.get(&id) {
            Some(Slot::Triangle(i)) => self.triangles.get(*i),
            _ => None,
        }
    }

    pub fn bending(&self, id: BondId) -> Option<&BendingBond> {
        match self.slots.get(&id) {
            Some(Slot::Bending(i)) => self.bendings.get(*i),
            _ => None,
        }
    }

    /// The volume bond of `mesh`, if any.
    pub fn volume(&self, mesh: MeshId) -> Option<&VolumeBond> {
        self.volumes.iter().find(|v| v.mesh == mesh)
    }

    pub fn triangles(&self) -> &[TriangleBond] {
        &self.triangles
    }

    pub fn bendings(&self) -> &[BendingBond] {
        &self.bendings
    }

    pub fn volumes(&self) -> &[VolumeBond] {
        &self.volumes
    }

    /// Total number of bonds.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of bonds whose reference geometry is not captured yet.
    pub fn pending_count(&self) -> usize {
        self.triangles
            .iter()
            .map(|b| b.status)
            .chain(self.bendings.iter().map(|b| b.status))
            .chain(self.volumes.iter().map(|b| b.status))
            .filter(|s| *s == BondStatus::Pending)
            .count()
    }

    /// Number of ruptured triangle bonds.
    pub fn broken_count(&self) -> usize {
        self.triangles
            .iter()
            .filter(|b| b.status == BondStatus::Broken)
            .count()
    }

    /// Captures the reference geometry of every pending bond from
    /// `positions` and marks those bonds active.
    ///
    /// Fails without changing any bond if a pending bond references a
    /// vertex outside `positions` or its reference geometry is degenerate.
    pub fn capture_pending(&mut self, positions: &[DVec3]) -> LaminaResult<CaptureSummary> {
        let len = positions.len();
        let at = |bond: BondId, v: VertexId| -> LaminaResult<DVec3> {
            positions
                .get(v.index())
                .copied()
                .ok_or(LaminaError::UnknownVertex { bond, vertex: v, len })
        };

        let mut triangles = Vec::new();
        for (i, bond) in self.triangles.iter().enumerate() {
            if bond.status != BondStatus::Pending {
                continue;
            }
            let p = [
                at(bond.id, bond.vertices[0])?,
                at(bond.id, bond.vertices[1])?,
                at(bond.id, bond.vertices[2])?,
            ];
            let reference =
                TrielReference::capture(p).ok_or_else(|| LaminaError::DegenerateReference {
                    bond: bond.id,
                    reason: "triangle has zero area".into(),
                })?;
            triangles.push((i, reference));
        }

        let mut bendings = Vec::new();
        for (i, bond) in self.bendings.iter().enumerate() {
            if bond.status != BondStatus::Pending {
                continue;
            }
            let mut p = [DVec3::ZERO; 4];
            for (slot, &v) in p.iter_mut().zip(&bond.vertices) {
                *slot = at(bond.id, v)?;
            }
            let angle = bond.params.resolve_reference(p).ok_or_else(|| {
                LaminaError::DegenerateReference {
                    bond: bond.id,
                    reason: "dihedral angle undefined for a degenerate triangle pair".into(),
                }
            })?;
            bendings.push((i, angle));
        }

        let mut volumes = Vec::new();
        for (i, bond) in self.volumes.iter().enumerate() {
            if bond.status != BondStatus::Pending {
                continue;
            }
            for tri in &bond.triangles {
                for &v in tri {
                    at(bond.id, v)?;
                }
            }
            let volume = mesh_volume(positions, &bond.triangles);
            if volume <= DEGENERATE_VOLUME_THRESHOLD {
                return Err(LaminaError::InconsistentTopology {
                    mesh: bond.mesh,
                    reason: format!(
                        "reference volume {:.3e} is not positive; triangles must be wound outward",
                        volume
                    ),
                });
            }
            volumes.push((i, volume));
        }

        let summary = CaptureSummary {
            triangles: triangles.len(),
            bendings: bendings.len(),
            volumes: volumes.len(),
        };
        for (i, reference) in triangles {
            self.triangles[i].reference = Some(reference);
            self.triangles[i].status = BondStatus::Active;
        }
        for (i, angle) in bendings {
            self.bendings[i].reference_angle = Some(angle);
            self.bendings[i].status = BondStatus::Active;
        }
        for (i, volume) in volumes {
            self.volumes[i].reference_volume = Some(volume);
            self.volumes[i].status = BondStatus::Active;
        }
        Ok(summary)
    }

    fn allocate(&mut self) -> BondId {
        let id = BondId(self.next_id);
        self.next_id += 1;
        id
    }

    fn reindex(&mut self) {
        self.slots.clear();
        for (i, b) in self.triangles.iter().enumerate() {
            self.slots.insert(b.id, Slot::Triangle(i));
        }
        for (i, b) in self.bendings.iter().enumerate() {
            self.slots.insert(b.id, Slot::Bending(i));
        }
        for (i, b) in self.volumes.iter().enumerate() {
            self.slots.insert(b.id, Slot::Volume(i));
        }
    }
}

fn require_distinct(vertices: &[VertexId]) -> LaminaResult<()> {
    for (i, a) in vertices.iter().enumerate() {
        if vertices[i + 1..].contains(a) {
            return Err(LaminaError::InvalidParameter(format!(
                "bond repeats vertex {:?}",
                a
            )));
        }
    }
    Ok(())
}
