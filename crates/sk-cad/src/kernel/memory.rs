//! In-memory reference kernel
//!
//! Models components with axis-aligned box solids, construction planes and
//! sketches. Every lease handed out is recorded so tests can check that the
//! editor returns what it borrows.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use tracing::debug;
use uuid::Uuid;

use super::handle::{
    ComponentHandle, Handle, HelperHandle, RegionHandle, RegionKind, SketchHandle, SolidHandle,
};
use super::traits::{CadError, CadKernel, CadResult, Edge, EdgeId, FaceId, TessellatedMesh};
use crate::sketch::{ElementKind, SketchElement, region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeaseKind {
    Component,
    Solid,
    Sketch,
    Helper,
    Region,
}

#[derive(Debug, Default)]
struct ComponentRecord {
    parent: Option<Uuid>,
    children: Vec<Uuid>,
    solids: Vec<Uuid>,
    sketches: Vec<Uuid>,
    planes: Vec<Uuid>,
}

#[derive(Debug)]
struct SolidRecord {
    min: Vec3,
    max: Vec3,
}

#[derive(Debug)]
struct SketchRecord {
    feature_id: Option<Uuid>,
    plane: Mat4,
    elements: Vec<Uuid>,
}

#[derive(Debug)]
struct RegionRecord {
    sketch: Uuid,
    outline: Vec<Vec3>,
    plane: Mat4,
    shared: bool,
}

/// Reference kernel holding the whole model in hash maps
#[derive(Debug)]
pub struct MemoryKernel {
    root: Uuid,
    next_slot: u64,
    leases: HashMap<u64, (Uuid, LeaseKind)>,
    components: HashMap<Uuid, ComponentRecord>,
    solids: HashMap<Uuid, SolidRecord>,
    sketches: HashMap<Uuid, SketchRecord>,
    elements: HashMap<Uuid, SketchElement>,
    element_sketch: HashMap<Uuid, Uuid>,
    planes: HashMap<Uuid, Mat4>,
    regions: HashMap<Uuid, RegionRecord>,
    shared_regions: bool,
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKernel {
    /// Create a kernel holding an empty root component
    pub fn new() -> Self {
        let mut kernel = Self {
            root: Uuid::new_v4(),
            next_slot: 1,
            leases: HashMap::new(),
            components: HashMap::new(),
            solids: HashMap::new(),
            sketches: HashMap::new(),
            elements: HashMap::new(),
            element_sketch: HashMap::new(),
            planes: HashMap::new(),
            regions: HashMap::new(),
            shared_regions: false,
        };
        let root = kernel.root;
        kernel.components.insert(root, ComponentRecord::default());
        kernel.insert_sketch(root, None, Mat4::IDENTITY);
        kernel
    }

    /// Id of the root component
    pub fn root_id(&self) -> Uuid {
        self.root
    }

    /// Lease the root component
    pub fn root(&mut self) -> ComponentHandle {
        let slot = self.lease(self.root, LeaseKind::Component);
        Handle::new(self.root, slot)
    }

    /// Number of leases not yet returned
    pub fn live_handles(&self) -> usize {
        self.leases.len()
    }

    /// Hand out regions as kernel-owned borrows instead of owned leases
    pub fn set_shared_regions(&mut self, shared: bool) {
        self.shared_regions = shared;
    }

    /// Add a child component with its own primary sketch
    pub fn add_component(&mut self, parent: Uuid) -> CadResult<Uuid> {
        let id = Uuid::new_v4();
        self.components
            .get_mut(&parent)
            .ok_or(CadError::ComponentNotFound(parent))?
            .children
            .push(id);
        self.components.insert(
            id,
            ComponentRecord {
                parent: Some(parent),
                ..Default::default()
            },
        );
        self.insert_sketch(id, None, Mat4::IDENTITY);
        Ok(id)
    }

    /// Delete a component and its subtree from the model
    pub fn remove_component(&mut self, id: Uuid) -> CadResult<()> {
        let record = self
            .components
            .remove(&id)
            .ok_or(CadError::ComponentNotFound(id))?;
        if let Some(parent) = record.parent.and_then(|p| self.components.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        for solid in &record.solids {
            self.solids.remove(solid);
        }
        for plane in &record.planes {
            self.planes.remove(plane);
        }
        for sketch in &record.sketches {
            if let Some(s) = self.sketches.remove(sketch) {
                for element in s.elements {
                    self.elements.remove(&element);
                    self.element_sketch.remove(&element);
                }
            }
        }
        for child in record.children {
            self.remove_component(child)?;
        }
        Ok(())
    }

    /// Add an axis-aligned box solid spanning `min..max`
    pub fn add_box(&mut self, component: Uuid, min: Vec3, max: Vec3) -> CadResult<Uuid> {
        let id = Uuid::new_v4();
        self.component_mut(component)?.solids.push(id);
        self.solids.insert(id, SolidRecord { min, max });
        Ok(id)
    }

    /// Add a construction plane
    pub fn add_plane(&mut self, component: Uuid, transform: Mat4) -> CadResult<Uuid> {
        let id = Uuid::new_v4();
        self.component_mut(component)?.planes.push(id);
        self.planes.insert(id, transform);
        Ok(id)
    }

    /// Add a secondary sketch produced by `feature_id`
    pub fn add_sketch(&mut self, component: Uuid, feature_id: Option<Uuid>, plane: Mat4) -> CadResult<Uuid> {
        self.component(component)?;
        Ok(self.insert_sketch(component, feature_id, plane))
    }

    /// Look up an element
    pub fn element(&self, id: Uuid) -> Option<&SketchElement> {
        self.elements.get(&id)
    }

    fn insert_sketch(&mut self, component: Uuid, feature_id: Option<Uuid>, plane: Mat4) -> Uuid {
        let id = Uuid::new_v4();
        self.sketches.insert(
            id,
            SketchRecord {
                feature_id,
                plane,
                elements: Vec::new(),
            },
        );
        if let Some(record) = self.components.get_mut(&component) {
            record.sketches.push(id);
        }
        id
    }

    fn lease(&mut self, id: Uuid, kind: LeaseKind) -> u64 {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.leases.insert(slot, (id, kind));
        slot
    }

    fn check<K>(&self, handle: &Handle<K>, kind: LeaseKind) -> CadResult<Uuid> {
        match self.leases.get(&handle.slot()) {
            Some((id, k)) if *id == handle.id() && *k == kind => Ok(*id),
            _ => Err(CadError::InvalidHandle {
                id: handle.id(),
                slot: handle.slot(),
            }),
        }
    }

    fn release<K>(&mut self, handle: Handle<K>, kind: LeaseKind) -> CadResult<()> {
        self.check(&handle, kind)?;
        self.leases.remove(&handle.slot());
        Ok(())
    }

    fn component(&self, id: Uuid) -> CadResult<&ComponentRecord> {
        self.components.get(&id).ok_or(CadError::ComponentNotFound(id))
    }

    fn component_mut(&mut self, id: Uuid) -> CadResult<&mut ComponentRecord> {
        self.components
            .get_mut(&id)
            .ok_or(CadError::ComponentNotFound(id))
    }

    fn sketch(&self, id: Uuid) -> CadResult<&SketchRecord> {
        self.sketches.get(&id).ok_or(CadError::SketchNotFound(id))
    }

    fn solid(&self, handle: &SolidHandle) -> CadResult<&SolidRecord> {
        let id = self.check(handle, LeaseKind::Solid)?;
        self.solids.get(&id).ok_or(CadError::SolidNotFound(id))
    }

    fn element_plane(&self, element: Uuid) -> CadResult<Mat4> {
        let sketch = self
            .element_sketch
            .get(&element)
            .ok_or(CadError::ElementNotFound(element))?;
        Ok(self.sketch(*sketch)?.plane)
    }

    fn push_element(&mut self, sketch: Uuid, element: SketchElement) -> CadResult<Uuid> {
        let id = element.id;
        self.sketches
            .get_mut(&sketch)
            .ok_or(CadError::SketchNotFound(sketch))?
            .elements
            .push(id);
        debug!("Added {} {} to sketch {}", element.kind.name(), id, sketch);
        self.element_sketch.insert(id, sketch);
        self.elements.insert(id, element);
        Ok(id)
    }

    fn lease_all<K>(&mut self, ids: Vec<Uuid>, kind: LeaseKind) -> Vec<Handle<K>> {
        ids.into_iter()
            .map(|id| {
                let slot = self.lease(id, kind);
                Handle::new(id, slot)
            })
            .collect()
    }
}

/// Corners of one box face, counter-clockwise seen from outside
fn box_face(min: Vec3, max: Vec3, index: u32) -> ([Vec3; 4], Vec3) {
    let axis = (index / 2) as usize;
    let positive = index % 2 == 1;
    let b = (axis + 1) % 3;
    let c = (axis + 2) % 3;

    let corner = |bv: f32, cv: f32| {
        let mut p = Vec3::ZERO;
        p[axis] = if positive { max[axis] } else { min[axis] };
        p[b] = bv;
        p[c] = cv;
        p
    };
    let mut corners = [
        corner(min[b], min[c]),
        corner(max[b], min[c]),
        corner(max[b], max[c]),
        corner(min[b], max[c]),
    ];
    let mut normal = Vec3::ZERO;
    normal[axis] = if positive { 1.0 } else { -1.0 };
    if !positive {
        corners.reverse();
    }
    (corners, normal)
}

fn box_edges(min: Vec3, max: Vec3) -> Vec<[Vec3; 2]> {
    let mut edges = Vec::with_capacity(12);
    for axis in 0..3 {
        let b = (axis + 1) % 3;
        let c = (axis + 2) % 3;
        for (bv, cv) in [(min[b], min[c]), (max[b], min[c]), (max[b], max[c]), (min[b], max[c])] {
            let mut start = Vec3::ZERO;
            start[b] = bv;
            start[c] = cv;
            let mut end = start;
            start[axis] = min[axis];
            end[axis] = max[axis];
            edges.push([start, end]);
        }
    }
    edges
}

impl CadKernel for MemoryKernel {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_children(&mut self, component: &ComponentHandle) -> CadResult<Vec<ComponentHandle>> {
        let id = self.check(component, LeaseKind::Component)?;
        let children = self.component(id)?.children.clone();
        Ok(self.lease_all(children, LeaseKind::Component))
    }

    fn get_solids(&mut self, component: &ComponentHandle) -> CadResult<Vec<SolidHandle>> {
        let id = self.check(component, LeaseKind::Component)?;
        let solids = self.component(id)?.solids.clone();
        Ok(self.lease_all(solids, LeaseKind::Solid))
    }

    fn get_sketches(&mut self, component: &ComponentHandle) -> CadResult<Vec<SketchHandle>> {
        let id = self.check(component, LeaseKind::Component)?;
        let sketches = self.component(id)?.sketches.clone();
        Ok(self.lease_all(sketches, LeaseKind::Sketch))
    }

    fn get_sketch(&self, component: &ComponentHandle) -> CadResult<Uuid> {
        let id = self.check(component, LeaseKind::Component)?;
        self.component(id)?
            .sketches
            .first()
            .copied()
            .ok_or(CadError::SketchNotFound(id))
    }

    fn get_planes(&mut self, component: &ComponentHandle) -> CadResult<Vec<HelperHandle>> {
        let id = self.check(component, LeaseKind::Component)?;
        let planes = self.component(id)?.planes.clone();
        Ok(self.lease_all(planes, LeaseKind::Helper))
    }

    fn free_component(&mut self, component: ComponentHandle) -> CadResult<()> {
        self.release(component, LeaseKind::Component)
    }

    fn get_faces(&self, solid: &SolidHandle) -> CadResult<Vec<FaceId>> {
        self.solid(solid)?;
        Ok((0..6).map(|i| FaceId::new(solid.id(), i)).collect())
    }

    fn get_edges(&self, solid: &SolidHandle) -> CadResult<Vec<Edge>> {
        let record = self.solid(solid)?;
        Ok(box_edges(record.min, record.max)
            .into_iter()
            .enumerate()
            .map(|(i, [a, b])| Edge {
                id: EdgeId::new(solid.id(), i as u32),
                points: vec![a, b],
            })
            .collect())
    }

    fn volume(&self, solid: &SolidHandle) -> CadResult<f32> {
        let record = self.solid(solid)?;
        let size = (record.max - record.min).max(Vec3::ZERO);
        Ok(size.x * size.y * size.z)
    }

    fn tessellate_face(&self, face: FaceId) -> CadResult<TessellatedMesh> {
        let record = self
            .solids
            .get(&face.solid_id)
            .ok_or(CadError::SolidNotFound(face.solid_id))?;
        if face.index >= 6 {
            return Err(CadError::TessellationFailed(format!(
                "face index {} out of range",
                face.index
            )));
        }
        let size = record.max - record.min;
        if size.min_element() <= 0.0 {
            return Err(CadError::TessellationFailed(format!(
                "degenerate face {} of solid {}",
                face.index, face.solid_id
            )));
        }
        let (corners, normal) = box_face(record.min, record.max, face.index);
        Ok(TessellatedMesh {
            vertices: corners.iter().map(|c| c.to_array()).collect(),
            normals: vec![normal.to_array(); 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        })
    }

    fn free_solid(&mut self, solid: SolidHandle) -> CadResult<()> {
        self.release(solid, LeaseKind::Solid)
    }

    fn sketch_feature_id(&self, sketch: &SketchHandle) -> CadResult<Option<Uuid>> {
        let id = self.check(sketch, LeaseKind::Sketch)?;
        Ok(self.sketch(id)?.feature_id)
    }

    fn sketch_transform(&self, sketch: Uuid) -> CadResult<Mat4> {
        Ok(self.sketch(sketch)?.plane)
    }

    fn get_sketch_elements(&self, sketch: Uuid) -> CadResult<Vec<Uuid>> {
        Ok(self.sketch(sketch)?.elements.clone())
    }

    fn get_regions(&mut self, sketch: Uuid, include_nested: bool) -> CadResult<Vec<RegionHandle>> {
        let record = self.sketch(sketch)?;
        let plane = record.plane;
        let elements: Vec<&SketchElement> = record
            .elements
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect();
        let outlines = region::find_outlines(&elements, plane, include_nested);

        let shared = self.shared_regions;
        if shared {
            self.regions.retain(|_, r| !(r.shared && r.sketch == sketch));
        }
        let mut handles = Vec::with_capacity(outlines.len());
        for outline in outlines {
            let id = Uuid::new_v4();
            self.regions.insert(
                id,
                RegionRecord {
                    sketch,
                    outline,
                    plane,
                    shared,
                },
            );
            handles.push(if shared {
                RegionHandle::borrowed(id, 0)
            } else {
                let slot = self.lease(id, LeaseKind::Region);
                RegionHandle::owned(id, slot)
            });
        }
        Ok(handles)
    }

    fn add_line(&mut self, sketch: Uuid, start: Vec3, end: Vec3) -> CadResult<Uuid> {
        self.push_element(sketch, SketchElement::line(start, end))
    }

    fn add_circle(&mut self, sketch: Uuid, center: Vec3, radius: f32) -> CadResult<Uuid> {
        let axis = self.sketch(sketch)?.plane.transform_vector3(Vec3::X);
        let circle = SketchElement::circle(center, radius, axis)?;
        self.push_element(sketch, circle)
    }

    fn add_arc(&mut self, sketch: Uuid, start: Vec3, end: Vec3, through: Vec3) -> CadResult<Uuid> {
        self.push_element(sketch, SketchElement::arc(start, end, through))
    }

    fn add_spline(&mut self, sketch: Uuid, points: &[Vec3]) -> CadResult<Uuid> {
        let spline = SketchElement::new(ElementKind::Spline, points.to_vec())?;
        self.push_element(sketch, spline)
    }

    fn remove_element(&mut self, sketch: Uuid, element: Uuid) -> CadResult<()> {
        let record = self
            .sketches
            .get_mut(&sketch)
            .ok_or(CadError::SketchNotFound(sketch))?;
        let before = record.elements.len();
        record.elements.retain(|e| *e != element);
        if record.elements.len() == before {
            return Err(CadError::ElementNotFound(element));
        }
        self.elements.remove(&element);
        self.element_sketch.remove(&element);
        Ok(())
    }

    fn free_sketch(&mut self, sketch: SketchHandle) -> CadResult<()> {
        self.release(sketch, LeaseKind::Sketch)
    }

    fn get_handles(&self, element: Uuid) -> CadResult<Vec<Vec3>> {
        self.elements
            .get(&element)
            .map(|e| e.handles().to_vec())
            .ok_or(CadError::ElementNotFound(element))
    }

    fn set_handles(&mut self, element: Uuid, handles: &[Vec3]) -> CadResult<()> {
        self.elements
            .get_mut(&element)
            .ok_or(CadError::ElementNotFound(element))?
            .set_handles(handles)
    }

    fn get_snap_points(&self, element: Uuid) -> CadResult<Vec<Vec3>> {
        self.elements
            .get(&element)
            .map(SketchElement::snap_points)
            .ok_or(CadError::ElementNotFound(element))
    }

    fn tessellate_element(&self, element: Uuid) -> CadResult<Vec<Vec3>> {
        let plane = self.element_plane(element)?;
        let normal = plane.transform_vector3(Vec3::Z);
        self.elements
            .get(&element)
            .map(|e| e.tessellate(normal))
            .ok_or(CadError::ElementNotFound(element))
    }

    fn region_mesh(&self, region: &RegionHandle) -> CadResult<TessellatedMesh> {
        if !region.no_free() {
            let lease: Handle<RegionKind> = Handle::new(region.id(), region.slot());
            self.check(&lease, LeaseKind::Region)?;
        }
        let record = self.regions.get(&region.id()).ok_or(CadError::InvalidHandle {
            id: region.id(),
            slot: region.slot(),
        })?;
        Ok(region::triangulate(&record.outline, record.plane))
    }

    fn free_region(&mut self, region: RegionHandle) -> CadResult<()> {
        if region.no_free() {
            return Err(CadError::InvalidHandle {
                id: region.id(),
                slot: region.slot(),
            });
        }
        let lease: Handle<RegionKind> = Handle::new(region.id(), region.slot());
        self.release(lease, LeaseKind::Region)?;
        self.regions.remove(&region.id());
        Ok(())
    }

    fn helper_transform(&self, helper: &HelperHandle) -> CadResult<Mat4> {
        let id = self.check(helper, LeaseKind::Helper)?;
        self.planes
            .get(&id)
            .copied()
            .ok_or(CadError::InvalidGeometry(format!("plane {id} was removed")))
    }

    fn free_helper(&mut self, helper: HelperHandle) -> CadResult<()> {
        self.release(helper, LeaseKind::Helper)
    }
}
