//! Vertex formats held by render proxies

use sk_cad::TessellatedMesh;

/// Position + normal vertex for mesh proxies
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Vertex position in world space
    pub position: [f32; 3],
    /// Vertex normal
    pub normal: [f32; 3],
}

/// Position-only vertex for line proxies
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// Vertex position in world space
    pub position: [f32; 3],
}

/// Interleave a kernel mesh into GPU-ready vertices.
///
/// Missing normals default to +Z.
pub fn mesh_vertices(mesh: &TessellatedMesh) -> Vec<MeshVertex> {
    mesh.vertices
        .iter()
        .enumerate()
        .map(|(i, position)| MeshVertex {
            position: *position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
        })
        .collect()
}
