//! Component tree mirroring the kernel's assembly hierarchy
//!
//! Nodes live in an arena keyed by component id. A node exclusively owns
//! the kernel leases for its children, solids, sketches and helpers; every
//! refresh returns the old leases before pulling new ones.

mod data;
mod queries;

use std::collections::HashMap;

use sk_cad::{CadKernel, ComponentHandle, HelperHandle, SketchHandle, SolidHandle};
use tracing::debug;
use uuid::Uuid;

pub use data::{
    ComponentData, ComponentDataStore, ExportConfig, ExportFormat, Material, Parameter,
    SectionView,
};

use crate::error::{CoreError, CoreResult};

/// A solid lease together with its volume, captured when the solid is pulled
#[derive(Debug)]
pub struct SolidEntry {
    pub handle: SolidHandle,
    pub volume: f32,
}

/// One node of the assembly tree
#[derive(Debug)]
pub struct Component {
    id: Uuid,
    real: Option<ComponentHandle>,
    parent: Option<Uuid>,
    children: Vec<Uuid>,
    solids: Vec<SolidEntry>,
    sketches: Vec<SketchHandle>,
    helpers: Vec<HelperHandle>,
}

impl Component {
    fn new(real: ComponentHandle, parent: Option<Uuid>) -> Self {
        Self {
            id: real.id(),
            real: Some(real),
            parent,
            children: Vec::new(),
            solids: Vec::new(),
            sketches: Vec::new(),
            helpers: Vec::new(),
        }
    }

    /// Entity id assigned by the kernel
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Parent component id
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    /// Child ids in declaration order
    pub fn children(&self) -> &[Uuid] {
        &self.children
    }

    pub fn solids(&self) -> &[SolidEntry] {
        &self.solids
    }

    pub fn sketches(&self) -> &[SketchHandle] {
        &self.sketches
    }

    pub fn helpers(&self) -> &[HelperHandle] {
        &self.helpers
    }

    /// Kernel lease of this component. Fails once the node has been freed.
    pub fn real(&self) -> CoreResult<&ComponentHandle> {
        self.real.as_ref().ok_or(CoreError::InvalidReference(self.id))
    }

    /// Whether the node's own lease was released
    pub fn is_freed(&self) -> bool {
        self.real.is_none()
    }
}

/// Arena of components rooted at the kernel's top-level assembly
#[derive(Debug)]
pub struct ComponentTree {
    root: Uuid,
    nodes: HashMap<Uuid, Component>,
}

impl ComponentTree {
    /// Build the tree below `root`, pulling the whole hierarchy
    pub fn new(
        kernel: &mut dyn CadKernel,
        root: ComponentHandle,
        store: &mut ComponentDataStore,
    ) -> CoreResult<Self> {
        let root_id = root.id();
        store.ensure(root_id, true);
        let mut tree = Self {
            root: root_id,
            nodes: HashMap::from([(root_id, Component::new(root, None))]),
        };
        tree.update(kernel, root_id, store)?;
        Ok(tree)
    }

    /// Root component id
    pub fn root(&self) -> Uuid {
        self.root
    }

    /// Get a node
    pub fn get(&self, id: Uuid) -> Option<&Component> {
        self.nodes.get(&id)
    }

    /// Get a node or fail
    pub fn node(&self, id: Uuid) -> CoreResult<&Component> {
        self.nodes.get(&id).ok_or(CoreError::ComponentNotFound(id))
    }

    fn node_mut(&mut self, id: Uuid) -> CoreResult<&mut Component> {
        self.nodes
            .get_mut(&id)
            .ok_or(CoreError::ComponentNotFound(id))
    }

    /// Check if a component is in the tree
    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &Component)> {
        self.nodes.iter()
    }

    /// Refresh children, sketches and helpers of `id` from the kernel,
    /// recursively. Solids are left to [`Self::update_solids`].
    pub fn update(
        &mut self,
        kernel: &mut dyn CadKernel,
        id: Uuid,
        store: &mut ComponentDataStore,
    ) -> CoreResult<()> {
        self.free_children(kernel, id)?;
        self.free_sketches(kernel, id)?;
        self.free_helpers(kernel, id)?;

        let real = self.node(id)?.real()?;
        let children = kernel.get_children(real)?;
        let sketches = kernel.get_sketches(real)?;
        let helpers = kernel.get_planes(real)?;

        let child_ids: Vec<Uuid> = children.iter().map(|c| c.id()).collect();
        for handle in children {
            store.ensure(handle.id(), false);
            self.nodes.insert(handle.id(), Component::new(handle, Some(id)));
        }
        let node = self.node_mut(id)?;
        node.children = child_ids.clone();
        node.sketches = sketches;
        node.helpers = helpers;
        debug!(
            "Updated component {}: {} children, {} sketches, {} helpers",
            id,
            node.children.len(),
            node.sketches.len(),
            node.helpers.len()
        );

        for child in child_ids {
            self.update(kernel, child, store)?;
        }
        Ok(())
    }

    /// Refresh the solids of one component
    pub fn update_solids(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        self.free_solids(kernel, id)?;
        let handles = kernel.get_solids(self.node(id)?.real()?)?;
        let mut solids = Vec::with_capacity(handles.len());
        for handle in handles {
            let volume = kernel.volume(&handle)?;
            solids.push(SolidEntry { handle, volume });
        }
        self.node_mut(id)?.solids = solids;
        Ok(())
    }

    /// Release everything `id` owns. Unless `keep_self`, the node's own lease
    /// is returned too and later access through [`Component::real`] fails.
    pub fn free(&mut self, kernel: &mut dyn CadKernel, id: Uuid, keep_self: bool) -> CoreResult<()> {
        self.free_children(kernel, id)?;
        self.free_solids(kernel, id)?;
        self.free_sketches(kernel, id)?;
        self.free_helpers(kernel, id)?;
        if !keep_self && let Some(real) = self.node_mut(id)?.real.take() {
            kernel.free_component(real)?;
        }
        Ok(())
    }

    fn free_children(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.free(kernel, child, false)?;
            self.nodes.remove(&child);
        }
        Ok(())
    }

    fn free_solids(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        for solid in std::mem::take(&mut self.node_mut(id)?.solids) {
            kernel.free_solid(solid.handle)?;
        }
        Ok(())
    }

    fn free_sketches(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        for sketch in std::mem::take(&mut self.node_mut(id)?.sketches) {
            kernel.free_sketch(sketch)?;
        }
        Ok(())
    }

    fn free_helpers(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        for helper in std::mem::take(&mut self.node_mut(id)?.helpers) {
            kernel.free_helper(helper)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use sk_cad::MemoryKernel;

    fn setup() -> (MemoryKernel, ComponentTree, ComponentDataStore) {
        let mut kernel = MemoryKernel::new();
        let root = kernel.root_id();
        let a = kernel.add_component(root).unwrap();
        kernel.add_component(root).unwrap();
        kernel.add_component(a).unwrap();
        kernel.add_plane(root, Mat4::IDENTITY).unwrap();

        let mut store = ComponentDataStore::new();
        let handle = kernel.root();
        let tree = ComponentTree::new(&mut kernel, handle, &mut store).unwrap();
        (kernel, tree, store)
    }

    #[test]
    fn test_new_pulls_whole_hierarchy() {
        let (kernel, tree, store) = setup();
        assert_eq!(tree.len(), 4);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.helpers().len(), 1);
        assert_eq!(root.sketches().len(), 1);
        assert_eq!(store.get(tree.root()).unwrap().title, "Main Assembly");
        assert_eq!(store.get(root.children()[0]).unwrap().title, "New Component");
        // root, 3 children, 4 sketches, 1 plane
        assert_eq!(kernel.live_handles(), 9);
    }

    #[test]
    fn test_update_replaces_stale_children() {
        let (mut kernel, mut tree, mut store) = setup();
        let root = tree.root();
        let stale = tree.node(root).unwrap().children()[0];
        let grandchild = tree.node(stale).unwrap().children()[0];
        let before = kernel.live_handles();

        kernel.remove_component(stale).unwrap();
        tree.update(&mut kernel, root, &mut store).unwrap();

        let node = tree.node(root).unwrap();
        assert_eq!(node.children().len(), 1);
        assert!(tree.get(stale).is_none());
        assert!(tree.get(grandchild).is_none());
        // stale child, its grandchild and their two sketches are gone
        assert_eq!(kernel.live_handles(), before - 4);
    }

    #[test]
    fn test_update_keeps_ui_state() {
        let (mut kernel, mut tree, mut store) = setup();
        let root = tree.root();
        let child = tree.node(root).unwrap().children()[1];
        store.get_mut(child).unwrap().title = "Lid".to_string();

        tree.update(&mut kernel, root, &mut store).unwrap();
        assert_eq!(store.get(child).unwrap().title, "Lid");
    }

    #[test]
    fn test_update_solids_captures_volume() {
        let (mut kernel, mut tree, _store) = setup();
        let root = tree.root();
        kernel.add_box(root, Vec3::ZERO, Vec3::splat(2.0)).unwrap();
        tree.update_solids(&mut kernel, root).unwrap();
        tree.update_solids(&mut kernel, root).unwrap();

        let solids = tree.node(root).unwrap().solids();
        assert_eq!(solids.len(), 1);
        approx::assert_relative_eq!(solids[0].volume, 8.0);
    }

    #[test]
    fn test_free_releases_every_lease() {
        let (mut kernel, mut tree, _store) = setup();
        let root = tree.root();
        kernel.add_box(root, Vec3::ZERO, Vec3::ONE).unwrap();
        tree.update_solids(&mut kernel, root).unwrap();

        tree.free(&mut kernel, root, false).unwrap();
        assert_eq!(kernel.live_handles(), 0);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(root).unwrap().is_freed());
    }

    #[test]
    fn test_freed_component_fails_loudly() {
        let (mut kernel, mut tree, mut store) = setup();
        let root = tree.root();
        tree.free(&mut kernel, root, false).unwrap();

        let result = tree.update(&mut kernel, root, &mut store);
        assert!(matches!(result, Err(CoreError::InvalidReference(id)) if id == root));
        assert!(tree.update_solids(&mut kernel, root).is_err());
    }

    #[test]
    fn test_free_keep_self() {
        let (mut kernel, mut tree, mut store) = setup();
        let root = tree.root();
        tree.free(&mut kernel, root, true).unwrap();
        assert_eq!(kernel.live_handles(), 1);
        assert!(tree.node(root).unwrap().children().is_empty());

        // Still usable
        tree.update(&mut kernel, root, &mut store).unwrap();
        assert_eq!(tree.node(root).unwrap().children().len(), 2);
    }

    #[test]
    fn test_double_free_is_harmless() {
        let (mut kernel, mut tree, _store) = setup();
        let root = tree.root();
        tree.free(&mut kernel, root, false).unwrap();
        tree.free(&mut kernel, root, false).unwrap();
        assert_eq!(kernel.live_handles(), 0);
    }
}
