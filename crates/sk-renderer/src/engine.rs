//! Render engine contract consumed by the scene synchronizer and tools

use glam::{Vec2, Vec3};
use sk_cad::TessellatedMesh;

use crate::scene::{
    MaterialKind, ProxyCategory, ProxyGeometry, ProxyId, ProxyTag, RenderProxy,
};
use crate::vertex::{LineVertex, mesh_vertices};

/// Counters produced by one `render` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames rendered so far, including this one
    pub frame: u64,
    /// Proxies drawn
    pub proxies: usize,
    /// Triangles drawn
    pub triangles: usize,
    /// Line segments drawn
    pub line_segments: usize,
    /// Vertex bytes referenced by the frame
    pub vertex_bytes: usize,
}

/// A scene that stores proxies, hit-tests them and draws them
pub trait RenderEngine {
    /// Wrap a kernel mesh into a proxy (not yet added)
    fn convert_mesh(&self, mesh: &TessellatedMesh, material: MaterialKind, tag: ProxyTag) -> RenderProxy {
        let geometry = ProxyGeometry::Mesh {
            vertices: mesh_vertices(mesh),
            indices: mesh.indices.clone(),
        };
        RenderProxy::new(geometry, material, tag)
    }

    /// Wrap a polyline into a proxy (not yet added)
    fn convert_line(&self, polyline: &[Vec3], material: MaterialKind, tag: ProxyTag) -> RenderProxy {
        let geometry = ProxyGeometry::Line {
            points: polyline
                .iter()
                .map(|p| LineVertex { position: p.to_array() })
                .collect(),
        };
        RenderProxy::new(geometry, material, tag)
    }

    /// Insert a proxy into the scene
    fn add(&mut self, proxy: RenderProxy) -> ProxyId;

    /// Remove a proxy, returning it if it was present
    fn remove(&mut self, id: ProxyId) -> Option<RenderProxy>;

    /// Look up a proxy
    fn get(&self, id: ProxyId) -> Option<&RenderProxy>;

    /// Change a proxy's material, returning the previous one
    fn set_material(&mut self, id: ProxyId, material: MaterialKind) -> Option<MaterialKind>;

    /// Proxies under a screen position, front to back, restricted to `filter`
    fn objects_at_screen(&self, screen: Vec2, filter: &[ProxyCategory]) -> Vec<ProxyId>;

    /// Project a world point to pixels; `None` if it is behind the eye
    fn to_screen(&self, point: Vec3) -> Option<Vec2>;

    /// Pointer ray through a screen position
    fn screen_to_ray(&self, screen: Vec2) -> (Vec3, Vec3);

    /// Draw a frame
    fn render(&mut self) -> FrameStats;

    /// Ids of every proxy in the scene
    fn proxy_ids(&self) -> Vec<ProxyId>;

    /// Number of proxies in the scene
    fn len(&self) -> usize;

    /// Whether the scene holds no proxies
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
