//! UI-only component state
//!
//! Stored outside the tree, keyed by component id, so titles, visibility and
//! materials survive every kernel refresh.

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Physical material assigned to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name
    pub name: String,
    /// Density in kg/m³
    pub density: f32,
}

impl Material {
    /// Create a new material
    pub fn new(name: impl Into<String>, density: f32) -> Self {
        Self {
            name: name.into(),
            density,
        }
    }
}

/// A named, user-editable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within one component
    pub name: String,
    /// Current value
    pub value: f32,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A saved section view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionView {
    pub title: String,
    /// Cutting plane placement
    pub transform: Mat4,
}

/// Export target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Stl,
    Step,
    Obj,
}

/// A saved export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub title: String,
    pub format: ExportFormat,
}

/// UI state of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub title: String,
    pub hidden: bool,
    pub material: Option<Material>,
    /// Show the center of gravity marker
    pub cog: bool,
    pub section_views: Vec<SectionView>,
    pub parameters: Vec<Parameter>,
    pub export_configs: Vec<ExportConfig>,
}

impl ComponentData {
    /// Defaults for a freshly discovered component
    pub fn new(is_root: bool) -> Self {
        Self {
            title: if is_root {
                "Main Assembly".to_string()
            } else {
                "New Component".to_string()
            },
            hidden: false,
            material: None,
            cog: false,
            section_views: Vec::new(),
            parameters: Vec::new(),
            export_configs: Vec::new(),
        }
    }
}

/// Document-wide map of component UI state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentDataStore {
    entries: HashMap<Uuid, ComponentData>,
}

impl ComponentDataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `id`, created with defaults on first encounter
    pub fn ensure(&mut self, id: Uuid, is_root: bool) -> &mut ComponentData {
        self.entries
            .entry(id)
            .or_insert_with(|| ComponentData::new(is_root))
    }

    pub fn get(&self, id: Uuid) -> Option<&ComponentData> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ComponentData> {
        self.entries.get_mut(&id)
    }

    /// Whether the component is hidden. Unknown ids are visible.
    pub fn is_hidden(&self, id: Uuid) -> bool {
        self.entries.get(&id).is_some_and(|d| d.hidden)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
