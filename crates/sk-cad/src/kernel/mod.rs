//! Kernel abstraction layer
//!
//! The interactive layer only talks to geometry through [`CadKernel`].
//! [`MemoryKernel`] is a complete in-process implementation used by tests
//! and headless tooling.

mod handle;
mod memory;
mod traits;

pub use handle::{
    ComponentHandle, ComponentKind, Handle, HelperHandle, HelperKind, RegionHandle, RegionKind,
    SketchHandle, SketchKind, SolidHandle, SolidKind,
};
pub use memory::MemoryKernel;
pub use traits::{CadError, CadKernel, CadResult, Edge, EdgeId, FaceId, TessellatedMesh};
