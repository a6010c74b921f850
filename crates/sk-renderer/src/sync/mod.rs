//! Scene synchronization
//!
//! [`SceneSync`] walks the component tree and keeps one proxy per live
//! kernel entity in the render scene. Bookkeeping lives in a side table
//! keyed by component id; the tree itself never sees it.
//!
//! Loading a node twice without unloading it in between duplicates its
//! proxies. Callers pair [`SceneSync::unload_tree`] with
//! [`SceneSync::load_tree`] (see [`SceneSync::reload`]).

mod cache;

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use sk_cad::{CadKernel, RegionHandle, TessellatedMesh};
use sk_core::Document;
use tracing::{debug, info};
use uuid::Uuid;

pub use cache::{ProxyCache, RegionProxy};

use crate::config::{DisplayMode, RendererConfig};
use crate::engine::{FrameStats, RenderEngine};
use crate::error::SyncResult;
use crate::scene::{MaterialKind, ProxyCategory, ProxyId, ProxySource, ProxyTag};

/// Notifications raised while single elements are (un)loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// A curve proxy was created for `element`
    ElementLoaded {
        /// Sketch element id
        element: Uuid,
        /// Owning component
        component: Uuid,
    },
    /// The curve proxy of `element` was removed
    ElementUnloaded {
        /// Sketch element id
        element: Uuid,
        /// Owning component
        component: Uuid,
    },
}

impl SyncEvent {
    /// Component the event concerns
    pub fn component(&self) -> Uuid {
        match self {
            SyncEvent::ElementLoaded { component, .. }
            | SyncEvent::ElementUnloaded { component, .. } => *component,
        }
    }
}

/// Keeps the render scene consistent with the component tree
pub struct SceneSync {
    renderer: Box<dyn RenderEngine>,
    display_mode: DisplayMode,
    plane_size: f32,
    caches: HashMap<Uuid, ProxyCache>,
    curves: HashMap<Uuid, ProxyId>,
    selected: Option<Uuid>,
    preview: Option<ProxyId>,
    events: Vec<SyncEvent>,
}

impl SceneSync {
    /// Create a synchronizer drawing into `renderer`
    pub fn new(renderer: Box<dyn RenderEngine>, config: &RendererConfig) -> Self {
        Self {
            renderer,
            display_mode: config.display_mode,
            plane_size: config.plane_size,
            caches: HashMap::new(),
            curves: HashMap::new(),
            selected: None,
            preview: None,
            events: Vec::new(),
        }
    }

    /// Get the render engine
    pub fn renderer(&self) -> &dyn RenderEngine {
        self.renderer.as_ref()
    }

    /// Get the render engine mutably
    pub fn renderer_mut(&mut self) -> &mut dyn RenderEngine {
        self.renderer.as_mut()
    }

    /// Current display mode
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Switch display mode and rebuild the scene
    pub fn set_display_mode(
        &mut self,
        kernel: &mut dyn CadKernel,
        doc: &mut Document,
        mode: DisplayMode,
    ) -> SyncResult<()> {
        info!("Display mode: {}", mode.name());
        self.display_mode = mode;
        self.reload(kernel, doc)
    }

    /// Unload and load the whole tree
    pub fn reload(&mut self, kernel: &mut dyn CadKernel, doc: &mut Document) -> SyncResult<()> {
        let root = doc.tree.root();
        self.unload_tree(kernel, doc, root, true)?;
        self.load_tree(kernel, doc, root, true)
    }

    /// Create proxies for a component (and its subtree when `recursive`)
    pub fn load_tree(
        &mut self,
        kernel: &mut dyn CadKernel,
        doc: &mut Document,
        id: Uuid,
        recursive: bool,
    ) -> SyncResult<()> {
        if doc.data.is_hidden(id) {
            debug!("Skipping hidden component {}", id);
            return Ok(());
        }
        let is_active = doc.is_active(id)?;
        let is_highlighted = doc.is_highlighted(id)?;
        doc.tree.update_solids(kernel, id)?;

        let node = doc.tree.node(id)?;
        let mut faces = Vec::new();
        let mut wireframe = Vec::new();
        let mut planes = Vec::new();

        for solid in node.solids() {
            if self.display_mode.shows_faces() {
                let material = MaterialKind::for_face(is_active, is_highlighted);
                for face in kernel.get_faces(&solid.handle)? {
                    let mesh = kernel.tessellate_face(face)?;
                    let tag = ProxyTag::new(ProxyCategory::Face, ProxySource::Face(face), Some(id));
                    let proxy = self.renderer.convert_mesh(&mesh, material, tag);
                    faces.push(self.renderer.add(proxy));
                }
            }
            if self.display_mode.shows_edges(is_active) {
                let material = MaterialKind::for_edge(is_active, is_highlighted);
                for edge in kernel.get_edges(&solid.handle)? {
                    let tag =
                        ProxyTag::new(ProxyCategory::Wireframe, ProxySource::Edge(edge.id), Some(id));
                    let proxy = self.renderer.convert_line(&edge.points, material, tag);
                    wireframe.push(self.renderer.add(proxy));
                }
            }
        }

        for helper in node.helpers() {
            let transform = kernel.helper_transform(helper)?;
            let mesh = plane_quad(transform, self.plane_size);
            let tag = ProxyTag::new(ProxyCategory::Plane, ProxySource::Plane(helper.id()), Some(id));
            let proxy = self.renderer.convert_mesh(&mesh, MaterialKind::Plane, tag);
            planes.push(self.renderer.add(proxy));
        }
        let children = node.children().to_vec();

        let cache = self.caches.entry(id).or_default();
        cache.faces.extend(faces);
        cache.wireframe.extend(wireframe);
        cache.planes.extend(planes);

        if id == doc.active() {
            let sketch = doc.sketch_of(kernel, id)?;
            for element in kernel.get_sketch_elements(sketch)? {
                self.load_element(kernel, element, id)?;
            }
            if self.caches.get(&id).is_none_or(|c| c.regions.is_empty()) {
                self.update_regions(kernel, doc, id)?;
            }
        }

        if recursive {
            for child in children {
                self.load_tree(kernel, doc, child, true)?;
            }
        }
        Ok(())
    }

    /// Remove every proxy of a component (and its subtree when `recursive`)
    pub fn unload_tree(
        &mut self,
        kernel: &mut dyn CadKernel,
        doc: &Document,
        id: Uuid,
        recursive: bool,
    ) -> SyncResult<()> {
        if let Some(cache) = self.caches.get_mut(&id) {
            let curves = std::mem::take(&mut cache.curves);
            let meshes: Vec<ProxyId> = cache
                .faces
                .drain(..)
                .chain(cache.wireframe.drain(..))
                .chain(cache.planes.drain(..))
                .collect();
            for element in curves {
                self.unload_element(element, id);
            }
            for proxy in meshes {
                self.renderer.remove(proxy);
            }
        }
        self.purge_regions(kernel, id)?;
        self.caches.remove(&id);

        if recursive && let Some(node) = doc.tree.get(id) {
            for child in node.children() {
                self.unload_tree(kernel, doc, *child, true)?;
            }
        }
        Ok(())
    }

    /// (Re)create the curve proxy of one sketch element
    pub fn load_element(
        &mut self,
        kernel: &dyn CadKernel,
        element: Uuid,
        component: Uuid,
    ) -> SyncResult<()> {
        if let Some(stale) = self.curves.remove(&element) {
            self.renderer.remove(stale);
        }
        let points = kernel.tessellate_element(element)?;
        let material = if self.selected == Some(element) {
            MaterialKind::SelectionLine
        } else {
            MaterialKind::Line
        };
        let tag = ProxyTag::new(ProxyCategory::Curve, ProxySource::Element(element), Some(component));
        let proxy = self.renderer.convert_line(&points, material, tag);
        let id = self.renderer.add(proxy);
        self.curves.insert(element, id);

        let cache = self.caches.entry(component).or_default();
        if !cache.curves.contains(&element) {
            cache.curves.push(element);
        }
        self.events.push(SyncEvent::ElementLoaded { element, component });
        Ok(())
    }

    /// Remove the curve proxy of one sketch element
    pub fn unload_element(&mut self, element: Uuid, component: Uuid) {
        if let Some(proxy) = self.curves.remove(&element) {
            self.renderer.remove(proxy);
        }
        if let Some(cache) = self.caches.get_mut(&component) {
            cache.curves.retain(|e| *e != element);
        }
        self.events.push(SyncEvent::ElementUnloaded { element, component });
    }

    /// Recompute region fills of a component's sketch
    pub fn update_regions(
        &mut self,
        kernel: &mut dyn CadKernel,
        doc: &Document,
        component: Uuid,
    ) -> SyncResult<()> {
        self.purge_regions(kernel, component)?;
        let sketch = doc.sketch_of(kernel, component)?;
        let regions = kernel.get_regions(sketch, false)?;
        debug!("Component {} has {} regions", component, regions.len());

        for region in regions {
            let mesh = kernel.region_mesh(&region)?;
            let tag = ProxyTag::new(
                ProxyCategory::Region,
                ProxySource::Region(region.id()),
                Some(component),
            );
            let proxy = self.renderer.convert_mesh(&mesh, MaterialKind::Region, tag);
            let proxy = self.renderer.add(proxy);
            self.caches
                .entry(component)
                .or_default()
                .regions
                .push(RegionProxy { proxy, region });
        }
        Ok(())
    }

    /// Drop region proxies of a component, releasing owned regions.
    ///
    /// If the kernel refuses a release, the regions not yet visited stay in
    /// the cache so a later purge can return them.
    pub fn purge_regions(&mut self, kernel: &mut dyn CadKernel, component: Uuid) -> SyncResult<()> {
        let Some(cache) = self.caches.get_mut(&component) else {
            return Ok(());
        };
        let mut pending = std::mem::take(&mut cache.regions).into_iter();
        while let Some(RegionProxy { proxy, region }) = pending.next() {
            self.renderer.remove(proxy);
            if !region.no_free()
                && let Err(err) = kernel.free_region(region)
            {
                cache.regions.extend(pending);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Show `mesh` as the single feature preview
    pub fn preview_feature(&mut self, mesh: &TessellatedMesh) -> FrameStats {
        if let Some(old) = self.preview.take() {
            self.renderer.remove(old);
        }
        let tag = ProxyTag::new(ProxyCategory::Preview, ProxySource::Preview, None);
        let proxy = self
            .renderer
            .convert_mesh(mesh, MaterialKind::PreviewAddSurface, tag);
        self.preview = Some(self.renderer.add(proxy));
        self.renderer.render()
    }

    /// Remove the feature preview, if any
    pub fn unpreview_feature(&mut self) -> FrameStats {
        if let Some(old) = self.preview.take() {
            self.renderer.remove(old);
        }
        self.renderer.render()
    }

    /// Mark one sketch element as selected
    pub fn set_selected_element(&mut self, element: Option<Uuid>) {
        if let Some(old) = self.selected.take()
            && let Some(proxy) = self.curves.get(&old)
        {
            self.renderer.set_material(*proxy, MaterialKind::Line);
        }
        self.selected = element;
        if let Some(new) = element
            && let Some(proxy) = self.curves.get(&new)
        {
            self.renderer.set_material(*proxy, MaterialKind::SelectionLine);
        }
    }

    /// Currently selected sketch element
    pub fn selected_element(&self) -> Option<Uuid> {
        self.selected
    }

    /// Curve proxy of an element
    pub fn element_proxy(&self, element: Uuid) -> Option<ProxyId> {
        self.curves.get(&element).copied()
    }

    /// Region shown by a region proxy
    pub fn region(&self, proxy: ProxyId) -> Option<&RegionHandle> {
        self.caches
            .values()
            .flat_map(|c| c.regions.iter())
            .find(|r| r.proxy == proxy)
            .map(|r| &r.region)
    }

    /// Tag of a proxy in the scene
    pub fn tag(&self, proxy: ProxyId) -> Option<ProxyTag> {
        self.renderer.get(proxy).map(|p| p.tag)
    }

    /// Proxy cache of a component
    pub fn cache(&self, component: Uuid) -> Option<&ProxyCache> {
        self.caches.get(&component)
    }

    /// Whether a preview mesh is shown
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Drain pending load/unload notifications
    pub fn take_events(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draw a frame
    pub fn render(&mut self) -> FrameStats {
        self.renderer.render()
    }
}

/// Square of side `size` in the local XY plane of `transform`
fn plane_quad(transform: Mat4, size: f32) -> TessellatedMesh {
    let h = size * 0.5;
    let corners = [
        Vec3::new(-h, -h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, h, 0.0),
        Vec3::new(-h, h, 0.0),
    ];
    let normal = transform.transform_vector3(Vec3::Z).normalize_or_zero();
    TessellatedMesh {
        vertices: corners
            .iter()
            .map(|c| transform.transform_point3(*c).to_array())
            .collect(),
        normals: vec![normal.to_array(); 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
