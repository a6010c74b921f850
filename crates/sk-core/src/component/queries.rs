//! Lookups and aggregations over the component tree

use sk_cad::{CadKernel, SketchHandle};
use uuid::Uuid;

use super::{Component, ComponentDataStore, ComponentTree, Material, Parameter};
use crate::error::CoreResult;

impl ComponentTree {
    /// Depth-first search for a component, starting at `from`
    pub fn find_child(&self, from: Uuid, id: Uuid) -> Option<&Component> {
        let node = self.nodes.get(&from)?;
        if node.id == id {
            return Some(node);
        }
        node.children.iter().find_map(|c| self.find_child(*c, id))
    }

    /// Depth-first search for a sketch by id
    pub fn find_sketch(&self, from: Uuid, sketch: Uuid) -> Option<&SketchHandle> {
        let node = self.nodes.get(&from)?;
        node.sketches
            .iter()
            .find(|s| s.id() == sketch)
            .or_else(|| node.children.iter().find_map(|c| self.find_sketch(*c, sketch)))
    }

    /// Depth-first search for the sketch produced by a feature
    pub fn find_sketch_by_feature(
        &self,
        kernel: &dyn CadKernel,
        from: Uuid,
        feature: Uuid,
    ) -> CoreResult<Option<&SketchHandle>> {
        let node = self.node(from)?;
        for sketch in &node.sketches {
            if kernel.sketch_feature_id(sketch)? == Some(feature) {
                return Ok(Some(sketch));
            }
        }
        for child in &node.children {
            if let Some(found) = self.find_sketch_by_feature(kernel, *child, feature)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Own material, or the nearest ancestor's
    pub fn material<'s>(
        &self,
        id: Uuid,
        store: &'s ComponentDataStore,
    ) -> CoreResult<Option<&'s Material>> {
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.node(cid)?;
            if let Some(material) = store.get(cid).and_then(|d| d.material.as_ref()) {
                return Ok(Some(material));
            }
            current = node.parent;
        }
        Ok(None)
    }

    /// Own parameters followed by inherited ones not shadowed by name
    pub fn parameters(&self, id: Uuid, store: &ComponentDataStore) -> CoreResult<Vec<Parameter>> {
        let node = self.node(id)?;
        let mut params: Vec<Parameter> = store
            .get(id)
            .map(|d| d.parameters.clone())
            .unwrap_or_default();
        if let Some(parent) = node.parent {
            for inherited in self.parameters(parent, store)? {
                if !params.iter().any(|p| p.name == inherited.name) {
                    params.push(inherited);
                }
            }
        }
        Ok(params)
    }

    /// Sum of the volumes of the component's own solids
    pub fn volume(&self, id: Uuid) -> CoreResult<f32> {
        Ok(self.node(id)?.solids.iter().map(|s| s.volume).sum())
    }

    /// Mass of the subtree, `None` when some solid has no material
    pub fn weight(&self, id: Uuid, store: &ComponentDataStore) -> CoreResult<Option<f32>> {
        let node = self.node(id)?;
        let material = self.material(id, store)?;
        if !node.solids.is_empty() && material.is_none() {
            return Ok(None);
        }

        let mut total = 0.0;
        for child in &node.children {
            match self.weight(*child, store)? {
                Some(weight) => total += weight,
                None => return Ok(None),
            }
        }
        if let Some(material) = material {
            total += self.volume(id)? * material.density;
        }
        Ok(Some(total))
    }

    /// Whether `ancestor` is `id` itself or one of its parents
    pub fn has_ancestor(&self, id: Uuid, ancestor: Uuid) -> CoreResult<bool> {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == ancestor {
                return Ok(true);
            }
            current = self.node(cid)?.parent;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec3};
    use sk_cad::MemoryKernel;

    use super::*;

    struct Fixture {
        kernel: MemoryKernel,
        tree: ComponentTree,
        store: ComponentDataStore,
        child: Uuid,
        grandchild: Uuid,
        sibling: Uuid,
    }

    fn fixture() -> Fixture {
        let mut kernel = MemoryKernel::new();
        let root = kernel.root_id();
        let child = kernel.add_component(root).unwrap();
        let grandchild = kernel.add_component(child).unwrap();
        let sibling = kernel.add_component(root).unwrap();

        let mut store = ComponentDataStore::new();
        let handle = kernel.root();
        let tree = ComponentTree::new(&mut kernel, handle, &mut store).unwrap();
        Fixture {
            kernel,
            tree,
            store,
            child,
            grandchild,
            sibling,
        }
    }

    #[test]
    fn test_find_child_depth_first() {
        let f = fixture();
        let root = f.tree.root();
        assert_eq!(f.tree.find_child(root, f.grandchild).unwrap().id(), f.grandchild);
        assert_eq!(f.tree.find_child(root, root).unwrap().id(), root);
        assert!(f.tree.find_child(f.sibling, f.grandchild).is_none());
        assert!(f.tree.find_child(root, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_find_sketch() {
        let f = fixture();
        let sketch = f.tree.node(f.grandchild).unwrap().sketches()[0].id();
        let found = f.tree.find_sketch(f.tree.root(), sketch).unwrap();
        assert_eq!(found.id(), sketch);
        assert!(f.tree.find_sketch(f.sibling, sketch).is_none());
    }

    #[test]
    fn test_find_sketch_by_feature() {
        let mut f = fixture();
        let feature = Uuid::new_v4();
        let sketch = f
            .kernel
            .add_sketch(f.grandchild, Some(feature), Mat4::IDENTITY)
            .unwrap();
        let root = f.tree.root();
        f.tree.update(&mut f.kernel, root, &mut f.store).unwrap();

        let found = f
            .tree
            .find_sketch_by_feature(&f.kernel, root, feature)
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), sketch);
        assert!(
            f.tree
                .find_sketch_by_feature(&f.kernel, root, Uuid::new_v4())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_material_is_inherited() {
        let mut f = fixture();
        let root = f.tree.root();
        f.store.get_mut(root).unwrap().material = Some(Material::new("Steel", 7850.0));
        f.store.get_mut(f.child).unwrap().material = Some(Material::new("Aluminium", 2700.0));

        let name = |id| f.tree.material(id, &f.store).unwrap().map(|m| m.name.clone());
        assert_eq!(name(f.grandchild).as_deref(), Some("Aluminium"));
        assert_eq!(name(f.sibling).as_deref(), Some("Steel"));
    }

    #[test]
    fn test_child_parameter_shadows_parent() {
        let mut f = fixture();
        let root = f.tree.root();
        f.store.get_mut(root).unwrap().parameters =
            vec![Parameter::new("X", 1.0), Parameter::new("Y", 2.0)];
        f.store.get_mut(f.child).unwrap().parameters = vec![Parameter::new("X", 10.0)];

        let params = f.tree.parameters(f.grandchild, &f.store).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], Parameter::new("X", 10.0));
        assert_eq!(params[1], Parameter::new("Y", 2.0));

        let root_params = f.tree.parameters(root, &f.store).unwrap();
        assert_eq!(root_params[0], Parameter::new("X", 1.0));
    }

    #[test]
    fn test_empty_component_has_zero_volume_and_weight() {
        let f = fixture();
        assert_eq!(f.tree.volume(f.sibling).unwrap(), 0.0);
        assert_eq!(f.tree.weight(f.sibling, &f.store).unwrap(), Some(0.0));
    }

    #[test]
    fn test_weight_undefined_without_material() {
        let mut f = fixture();
        f.kernel
            .add_box(f.grandchild, Vec3::ZERO, Vec3::ONE)
            .unwrap();
        f.tree.update_solids(&mut f.kernel, f.grandchild).unwrap();

        let root = f.tree.root();
        assert_eq!(f.tree.weight(f.grandchild, &f.store).unwrap(), None);
        assert_eq!(f.tree.weight(root, &f.store).unwrap(), None);
        // The sibling subtree has no solids, so it stays defined
        assert_eq!(f.tree.weight(f.sibling, &f.store).unwrap(), Some(0.0));
    }

    #[test]
    fn test_weight_aggregates_subtree() {
        let mut f = fixture();
        f.kernel
            .add_box(f.grandchild, Vec3::ZERO, Vec3::new(1.0, 1.0, 2.0))
            .unwrap();
        f.kernel.add_box(f.child, Vec3::ZERO, Vec3::ONE).unwrap();
        f.tree.update_solids(&mut f.kernel, f.grandchild).unwrap();
        f.tree.update_solids(&mut f.kernel, f.child).unwrap();
        f.store.get_mut(f.child).unwrap().material = Some(Material::new("Resin", 1.5));

        let root = f.tree.root();
        assert_relative_eq!(f.tree.weight(f.child, &f.store).unwrap().unwrap(), 4.5);
        assert_relative_eq!(f.tree.weight(root, &f.store).unwrap().unwrap(), 4.5);
        assert_relative_eq!(f.tree.volume(f.child).unwrap(), 1.0);
    }

    #[test]
    fn test_has_ancestor() {
        let f = fixture();
        let root = f.tree.root();
        assert!(f.tree.has_ancestor(f.grandchild, f.grandchild).unwrap());
        assert!(f.tree.has_ancestor(f.grandchild, root).unwrap());
        assert!(f.tree.has_ancestor(f.grandchild, f.child).unwrap());
        assert!(!f.tree.has_ancestor(f.grandchild, f.sibling).unwrap());
        assert!(!f.tree.has_ancestor(root, f.child).unwrap());
    }
}
