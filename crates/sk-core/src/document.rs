//! View state shared by the scene synchronizer, snapping and tools

use sk_cad::{CadKernel, ComponentHandle};
use tracing::info;
use uuid::Uuid;

use crate::component::{ComponentDataStore, ComponentTree};
use crate::error::{CoreError, CoreResult};

/// The open document: tree, UI state, and which component is being edited
#[derive(Debug)]
pub struct Document {
    pub tree: ComponentTree,
    pub data: ComponentDataStore,
    active: Uuid,
    highlighted: Option<Uuid>,
}

impl Document {
    /// Mirror the kernel hierarchy under `root`; the root starts active
    pub fn new(kernel: &mut dyn CadKernel, root: ComponentHandle) -> CoreResult<Self> {
        let mut data = ComponentDataStore::new();
        let tree = ComponentTree::new(kernel, root, &mut data)?;
        let active = tree.root();
        info!("Opened document with {} components", tree.len());
        Ok(Self {
            tree,
            data,
            active,
            highlighted: None,
        })
    }

    /// Component whose sketch receives tool input
    pub fn active(&self) -> Uuid {
        self.active
    }

    pub fn set_active(&mut self, id: Uuid) -> CoreResult<()> {
        if !self.tree.contains(id) {
            return Err(CoreError::ComponentNotFound(id));
        }
        self.active = id;
        Ok(())
    }

    pub fn highlighted(&self) -> Option<Uuid> {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, id: Option<Uuid>) -> CoreResult<()> {
        if let Some(id) = id
            && !self.tree.contains(id)
        {
            return Err(CoreError::ComponentNotFound(id));
        }
        self.highlighted = id;
        Ok(())
    }

    /// Whether `id` is the active component or lies below it
    pub fn is_active(&self, id: Uuid) -> CoreResult<bool> {
        self.tree.has_ancestor(id, self.active)
    }

    /// Whether `id` is the highlighted component or lies below it
    pub fn is_highlighted(&self, id: Uuid) -> CoreResult<bool> {
        match self.highlighted {
            Some(h) => self.tree.has_ancestor(id, h),
            None => Ok(false),
        }
    }

    /// Primary sketch of a component
    pub fn sketch_of(&self, kernel: &dyn CadKernel, id: Uuid) -> CoreResult<Uuid> {
        Ok(kernel.get_sketch(self.tree.node(id)?.real()?)?)
    }

    /// Re-pull a subtree, keeping the active/highlighted ids valid
    pub fn update(&mut self, kernel: &mut dyn CadKernel, id: Uuid) -> CoreResult<()> {
        self.tree.update(kernel, id, &mut self.data)?;
        if !self.tree.contains(self.active) {
            self.active = self.tree.root();
        }
        if self.highlighted.is_some_and(|h| !self.tree.contains(h)) {
            self.highlighted = None;
        }
        Ok(())
    }

    /// Release every kernel lease held by the document
    pub fn close(&mut self, kernel: &mut dyn CadKernel) -> CoreResult<()> {
        let root = self.tree.root();
        self.tree.free(kernel, root, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_cad::MemoryKernel;

    #[test]
    fn test_active_and_highlight_ancestry() {
        let mut kernel = MemoryKernel::new();
        let a = kernel.add_component(kernel.root_id()).unwrap();
        let b = kernel.add_component(a).unwrap();
        let root = kernel.root();
        let mut doc = Document::new(&mut kernel, root).unwrap();

        assert!(doc.is_active(b).unwrap());
        doc.set_active(a).unwrap();
        assert!(doc.is_active(b).unwrap());
        assert!(!doc.is_active(doc.tree.root()).unwrap());

        assert!(!doc.is_highlighted(b).unwrap());
        doc.set_highlighted(Some(b)).unwrap();
        assert!(doc.is_highlighted(b).unwrap());
        assert!(!doc.is_highlighted(a).unwrap());
    }

    #[test]
    fn test_unknown_active_is_rejected() {
        let mut kernel = MemoryKernel::new();
        let root = kernel.root();
        let mut doc = Document::new(&mut kernel, root).unwrap();
        assert!(doc.set_active(Uuid::new_v4()).is_err());
        assert!(doc.set_highlighted(Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn test_update_resets_removed_active() {
        let mut kernel = MemoryKernel::new();
        let a = kernel.add_component(kernel.root_id()).unwrap();
        let root = kernel.root();
        let mut doc = Document::new(&mut kernel, root).unwrap();
        doc.set_active(a).unwrap();

        kernel.remove_component(a).unwrap();
        let root = doc.tree.root();
        doc.update(&mut kernel, root).unwrap();
        assert_eq!(doc.active(), root);
    }

    #[test]
    fn test_close_returns_all_leases() {
        let mut kernel = MemoryKernel::new();
        kernel.add_component(kernel.root_id()).unwrap();
        let root = kernel.root();
        let mut doc = Document::new(&mut kernel, root).unwrap();
        doc.close(&mut kernel).unwrap();
        assert_eq!(kernel.live_handles(), 0);
    }
}
