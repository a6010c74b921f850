//! Headless scene
//!
//! Keeps proxies in id order and answers hit tests with the camera, without
//! touching a GPU. Windowed front-ends draw the same proxies.

mod bounds;
pub mod collision;
mod proxy;

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use tracing::trace;

pub use bounds::BoundingBox;
pub use proxy::{
    MaterialKind, ProxyCategory, ProxyGeometry, ProxyId, ProxySource, ProxyTag, RenderProxy,
};

use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::engine::{FrameStats, RenderEngine};
use collision::{closest_on_segment, ray_triangle_intersection};

/// Depths closer than this are treated as equal when ordering hits
const DEPTH_EPSILON: f32 = 1e-3;

fn depth_key(depth: f32) -> i64 {
    (depth / DEPTH_EPSILON).round() as i64
}

/// In-memory render scene
#[derive(Debug)]
pub struct Scene {
    camera: Camera,
    viewport: Vec2,
    line_tolerance: f32,
    proxies: BTreeMap<ProxyId, RenderProxy>,
    next_id: u64,
    frame: u64,
}

impl Scene {
    /// Create a scene with a perspective camera
    pub fn new(config: &RendererConfig) -> Self {
        let viewport = Vec2::new(config.viewport.width, config.viewport.height);
        let camera = Camera::from_config(&config.camera, viewport.x / viewport.y);
        Self::with_camera(config, camera)
    }

    /// Create a scene with an explicit camera
    pub fn with_camera(config: &RendererConfig, camera: Camera) -> Self {
        Self {
            camera,
            viewport: Vec2::new(config.viewport.width, config.viewport.height),
            line_tolerance: config.viewport.line_pick_tolerance,
            proxies: BTreeMap::new(),
            next_id: 1,
            frame: 0,
        }
    }

    /// Get the camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Get the camera mutably
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Viewport size in pixels
    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    /// Resize the viewport
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.camera.update_aspect(width / height);
    }

    /// Iterate over proxies in id order
    pub fn iter(&self) -> impl Iterator<Item = (&ProxyId, &RenderProxy)> {
        self.proxies.iter()
    }

    fn line_hit_depth(&self, points: &[Vec3], screen: Vec2) -> Option<f32> {
        let project = |p: Vec3| self.camera.world_to_screen(p, self.viewport);
        if let [only] = points {
            let s = project(*only)?;
            return (s.distance(screen) <= self.line_tolerance).then(|| self.camera.depth_of(*only));
        }
        points
            .windows(2)
            .filter_map(|seg| {
                let (a, b) = (project(seg[0])?, project(seg[1])?);
                let t = closest_on_segment(screen, a, b);
                (a.lerp(b, t).distance(screen) <= self.line_tolerance)
                    .then(|| self.camera.depth_of(seg[0].lerp(seg[1], t)))
            })
            .min_by(f32::total_cmp)
    }

    fn mesh_hit_depth(&self, proxy: &RenderProxy, screen: Vec2) -> Option<f32> {
        let ProxyGeometry::Mesh { vertices, indices } = &proxy.geometry else {
            return None;
        };
        let (origin, dir) = self.camera.screen_to_ray(screen, self.viewport);
        if !proxy.bounds.inflate(1e-4).intersects_ray(origin, dir) {
            return None;
        }
        indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let corner = |i: u32| vertices.get(i as usize).map(|v| Vec3::from(v.position));
                let tri = [corner(tri[0])?, corner(tri[1])?, corner(tri[2])?];
                ray_triangle_intersection(origin, dir, tri)
            })
            .min_by(f32::total_cmp)
            .map(|t| self.camera.depth_of(origin + dir * t))
    }
}

impl RenderEngine for Scene {
    fn add(&mut self, proxy: RenderProxy) -> ProxyId {
        let id = ProxyId(self.next_id);
        self.next_id += 1;
        self.proxies.insert(id, proxy);
        id
    }

    fn remove(&mut self, id: ProxyId) -> Option<RenderProxy> {
        self.proxies.remove(&id)
    }

    fn get(&self, id: ProxyId) -> Option<&RenderProxy> {
        self.proxies.get(&id)
    }

    fn set_material(&mut self, id: ProxyId, material: MaterialKind) -> Option<MaterialKind> {
        self.proxies
            .get_mut(&id)
            .map(|p| std::mem::replace(&mut p.material, material))
    }

    fn objects_at_screen(&self, screen: Vec2, filter: &[ProxyCategory]) -> Vec<ProxyId> {
        let mut hits: Vec<(i64, u8, ProxyId)> = self
            .proxies
            .iter()
            .filter(|(_, p)| filter.contains(&p.tag.category))
            .filter_map(|(id, p)| {
                let depth = match &p.geometry {
                    ProxyGeometry::Line { .. } => {
                        self.line_hit_depth(&p.geometry.positions(), screen)
                    }
                    ProxyGeometry::Mesh { .. } => self.mesh_hit_depth(p, screen),
                }?;
                Some((depth_key(depth), p.tag.category.pick_priority(), *id))
            })
            .collect();
        hits.sort();
        trace!("{} hits at {:?}", hits.len(), screen);
        hits.into_iter().map(|(_, _, id)| id).collect()
    }

    fn to_screen(&self, point: Vec3) -> Option<Vec2> {
        self.camera.world_to_screen(point, self.viewport)
    }

    fn screen_to_ray(&self, screen: Vec2) -> (Vec3, Vec3) {
        self.camera.screen_to_ray(screen, self.viewport)
    }

    fn render(&mut self) -> FrameStats {
        self.frame += 1;
        let mut stats = FrameStats {
            frame: self.frame,
            proxies: self.proxies.len(),
            ..Default::default()
        };
        for proxy in self.proxies.values() {
            stats.vertex_bytes += proxy.geometry.vertex_bytes().len();
            match &proxy.geometry {
                ProxyGeometry::Mesh { indices, .. } => stats.triangles += indices.len() / 3,
                ProxyGeometry::Line { points } => {
                    stats.line_segments += points.len().saturating_sub(1)
                }
            }
        }
        stats
    }

    fn proxy_ids(&self) -> Vec<ProxyId> {
        self.proxies.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.proxies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_cad::TessellatedMesh;
    use uuid::Uuid;

    fn scene() -> Scene {
        let mut config = RendererConfig::default();
        config.viewport.width = 800.0;
        config.viewport.height = 600.0;
        Scene::with_camera(&config, Camera::top_down(Vec3::ZERO, 15.0, 800.0 / 600.0))
    }

    fn tag(category: ProxyCategory) -> ProxyTag {
        let source = match category {
            ProxyCategory::Curve => ProxySource::Element(Uuid::new_v4()),
            _ => ProxySource::Region(Uuid::new_v4()),
        };
        ProxyTag::new(category, source, None)
    }

    fn quad(z: f32) -> TessellatedMesh {
        TessellatedMesh {
            vertices: vec![
                [-1.0, -1.0, z],
                [1.0, -1.0, z],
                [1.0, 1.0, z],
                [-1.0, 1.0, z],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn test_add_remove() {
        let mut scene = scene();
        let proxy = scene.convert_line(&[Vec3::ZERO, Vec3::X], MaterialKind::Line, tag(ProxyCategory::Curve));
        let id = scene.add(proxy);
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_line_hit_within_tolerance() {
        let mut scene = scene();
        let proxy = scene.convert_line(
            &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
            MaterialKind::Line,
            tag(ProxyCategory::Curve),
        );
        let id = scene.add(proxy);
        // (5, 0) is at pixel (500, 300); 20 px per unit
        assert_eq!(scene.objects_at_screen(Vec2::new(500.0, 304.0), &[ProxyCategory::Curve]), vec![id]);
        assert!(scene.objects_at_screen(Vec2::new(500.0, 320.0), &[ProxyCategory::Curve]).is_empty());
        assert!(scene.objects_at_screen(Vec2::new(500.0, 300.0), &[ProxyCategory::Region]).is_empty());
    }

    #[test]
    fn test_hits_are_front_to_back() {
        let mut scene = scene();
        let low = scene.convert_mesh(&quad(0.0), MaterialKind::Region, tag(ProxyCategory::Region));
        let high = scene.convert_mesh(&quad(1.0), MaterialKind::Surface, tag(ProxyCategory::Face));
        let low = scene.add(low);
        let high = scene.add(high);
        let hits = scene.objects_at_screen(Vec2::new(400.0, 300.0), &[ProxyCategory::Region, ProxyCategory::Face]);
        assert_eq!(hits, vec![high, low]);
    }

    #[test]
    fn test_curve_wins_tie_with_region() {
        let mut scene = scene();
        let region = scene.convert_mesh(&quad(0.0), MaterialKind::Region, tag(ProxyCategory::Region));
        let region = scene.add(region);
        let curve = scene.convert_line(
            &[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            MaterialKind::Line,
            tag(ProxyCategory::Curve),
        );
        let curve = scene.add(curve);
        let hits = scene.objects_at_screen(Vec2::new(400.0, 300.0), &[ProxyCategory::Region, ProxyCategory::Curve]);
        assert_eq!(hits, vec![curve, region]);
    }

    #[test]
    fn test_set_material_returns_previous() {
        let mut scene = scene();
        let proxy = scene.convert_mesh(&quad(0.0), MaterialKind::Region, tag(ProxyCategory::Region));
        let id = scene.add(proxy);
        assert_eq!(scene.set_material(id, MaterialKind::HighlightRegion), Some(MaterialKind::Region));
        assert_eq!(scene.get(id).unwrap().material, MaterialKind::HighlightRegion);
        assert_eq!(scene.set_material(ProxyId(999), MaterialKind::Region), None);
    }

    #[test]
    fn test_render_counts() {
        let mut scene = scene();
        let mesh = scene.convert_mesh(&quad(0.0), MaterialKind::Region, tag(ProxyCategory::Region));
        scene.add(mesh);
        let line = scene.convert_line(&[Vec3::ZERO, Vec3::X, Vec3::Y], MaterialKind::Line, tag(ProxyCategory::Curve));
        scene.add(line);

        let stats = scene.render();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.proxies, 2);
        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.line_segments, 2);
        assert_eq!(stats.vertex_bytes, 4 * 24 + 3 * 12);
        assert_eq!(scene.render().frame, 2);
    }
}
