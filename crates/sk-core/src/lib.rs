//! Core data model for the sketch editor
//!
//! - [`ComponentTree`]: in-memory mirror of the kernel's assembly hierarchy
//! - [`ComponentDataStore`]: UI state keyed by entity id, surviving rebuilds
//! - [`Document`]: the view state (tree, active and highlighted component)

pub mod component;
pub mod document;
pub mod error;

pub use component::{
    Component, ComponentData, ComponentDataStore, ComponentTree, ExportConfig, ExportFormat,
    Material, Parameter, SectionView, SolidEntry,
};
pub use document::Document;
pub use error::{CoreError, CoreResult};
