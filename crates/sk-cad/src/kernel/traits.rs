//! CAD kernel trait definitions
//!
//! The kernel owns every geometric entity. The editor receives leases
//! (see [`super::handle`]) and must hand each one back through the matching
//! `free_*` call once it stops using it.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::handle::{ComponentHandle, HelperHandle, RegionHandle, SketchHandle, SolidHandle};

/// Unique identifier for an edge within a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    /// ID of the solid this edge belongs to
    pub solid_id: Uuid,
    /// Index of the edge within the solid
    pub index: u32,
}

impl EdgeId {
    /// Create a new edge ID
    pub fn new(solid_id: Uuid, index: u32) -> Self {
        Self { solid_id, index }
    }
}

/// Unique identifier for a face within a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId {
    /// ID of the solid this face belongs to
    pub solid_id: Uuid,
    /// Index of the face within the solid
    pub index: u32,
}

impl FaceId {
    /// Create a new face ID
    pub fn new(solid_id: Uuid, index: u32) -> Self {
        Self { solid_id, index }
    }
}

/// A solid edge discretised as a polyline
#[derive(Debug, Clone)]
pub struct Edge {
    /// Edge identity
    pub id: EdgeId,
    /// Polyline points, at least two
    pub points: Vec<Vec3>,
}

/// Error type for kernel operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CadError {
    #[error("Invalid handle: lease {slot} for {id} is no longer live")]
    InvalidHandle { id: Uuid, slot: u64 },

    #[error("Component not found: {0}")]
    ComponentNotFound(Uuid),

    #[error("Sketch not found: {0}")]
    SketchNotFound(Uuid),

    #[error("Sketch element not found: {0}")]
    ElementNotFound(Uuid),

    #[error("Solid not found: {0}")]
    SolidNotFound(Uuid),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// A tessellated mesh output from the CAD kernel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh {
    /// Vertex positions (3 floats per vertex)
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (3 indices per triangle)
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    /// Create an empty tessellated mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([Vec3::from(*a), Vec3::from(*b), Vec3::from(*c)])
        })
    }
}

/// The geometry kernel as seen by the interactive layer.
///
/// All calls are synchronous and deterministic. Every method that returns
/// a handle hands out a fresh lease the caller owns.
pub trait CadKernel {
    /// Kernel name for logging
    fn name(&self) -> &str;

    // ========== Components ==========

    /// Lease the current children of a component, in declaration order
    fn get_children(&mut self, component: &ComponentHandle) -> CadResult<Vec<ComponentHandle>>;

    /// Lease the solids owned by a component
    fn get_solids(&mut self, component: &ComponentHandle) -> CadResult<Vec<SolidHandle>>;

    /// Lease every sketch owned by a component
    fn get_sketches(&mut self, component: &ComponentHandle) -> CadResult<Vec<SketchHandle>>;

    /// Id of the component's primary sketch (the one tools draw into)
    fn get_sketch(&self, component: &ComponentHandle) -> CadResult<Uuid>;

    /// Lease the construction planes of a component
    fn get_planes(&mut self, component: &ComponentHandle) -> CadResult<Vec<HelperHandle>>;

    /// Release a component lease
    fn free_component(&mut self, component: ComponentHandle) -> CadResult<()>;

    // ========== Solids ==========

    /// Faces of a solid
    fn get_faces(&self, solid: &SolidHandle) -> CadResult<Vec<FaceId>>;

    /// Edges of a solid as polylines
    fn get_edges(&self, solid: &SolidHandle) -> CadResult<Vec<Edge>>;

    /// Volume of a solid
    fn volume(&self, solid: &SolidHandle) -> CadResult<f32>;

    /// Tessellate one face
    fn tessellate_face(&self, face: FaceId) -> CadResult<TessellatedMesh>;

    /// Release a solid lease
    fn free_solid(&mut self, solid: SolidHandle) -> CadResult<()>;

    // ========== Sketches ==========

    /// Feature that produced the sketch, if any
    fn sketch_feature_id(&self, sketch: &SketchHandle) -> CadResult<Option<Uuid>>;

    /// Workplane of a sketch: local XY maps onto the sketch plane
    fn sketch_transform(&self, sketch: Uuid) -> CadResult<Mat4>;

    /// Element ids of a sketch, in creation order
    fn get_sketch_elements(&self, sketch: Uuid) -> CadResult<Vec<Uuid>>;

    /// Decompose a sketch into closed regions
    fn get_regions(&mut self, sketch: Uuid, include_nested: bool) -> CadResult<Vec<RegionHandle>>;

    /// Add a line segment
    fn add_line(&mut self, sketch: Uuid, start: Vec3, end: Vec3) -> CadResult<Uuid>;

    /// Add a circle
    fn add_circle(&mut self, sketch: Uuid, center: Vec3, radius: f32) -> CadResult<Uuid>;

    /// Add a three-point arc
    fn add_arc(&mut self, sketch: Uuid, start: Vec3, end: Vec3, through: Vec3) -> CadResult<Uuid>;

    /// Add a spline through the given points
    fn add_spline(&mut self, sketch: Uuid, points: &[Vec3]) -> CadResult<Uuid>;

    /// Remove an element from its sketch
    fn remove_element(&mut self, sketch: Uuid, element: Uuid) -> CadResult<()>;

    /// Release a sketch lease
    fn free_sketch(&mut self, sketch: SketchHandle) -> CadResult<()>;

    // ========== Sketch elements ==========

    /// Control points of an element
    fn get_handles(&self, element: Uuid) -> CadResult<Vec<Vec3>>;

    /// Replace the control points of an element
    fn set_handles(&mut self, element: Uuid, handles: &[Vec3]) -> CadResult<()>;

    /// Characteristic points eligible for snapping
    fn get_snap_points(&self, element: Uuid) -> CadResult<Vec<Vec3>>;

    /// Polyline approximation of an element
    fn tessellate_element(&self, element: Uuid) -> CadResult<Vec<Vec3>>;

    // ========== Regions ==========

    /// Triangulated fill of a region
    fn region_mesh(&self, region: &RegionHandle) -> CadResult<TessellatedMesh>;

    /// Release an owned region
    fn free_region(&mut self, region: RegionHandle) -> CadResult<()>;

    // ========== Construction helpers ==========

    /// Placement of a construction plane
    fn helper_transform(&self, helper: &HelperHandle) -> CadResult<Mat4>;

    /// Release a helper lease
    fn free_helper(&mut self, helper: HelperHandle) -> CadResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_iteration() {
        let mesh = TessellatedMesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        };
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0][1], Vec3::X);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mesh = TessellatedMesh {
            vertices: vec![[0.0; 3]],
            normals: vec![[0.0, 0.0, 1.0]],
            indices: vec![0, 1, 2],
        };
        assert_eq!(mesh.triangles().count(), 0);
    }
}
