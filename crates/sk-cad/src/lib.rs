//! Geometry kernel contract for the sketch editor
//!
//! This crate provides:
//! - The `CadKernel` trait the interactive layer drives and observes
//! - Lease handles that model kernel-side ownership of entities
//! - Sketch element geometry (lines, circles, arcs, splines)
//! - `MemoryKernel`, an in-memory reference kernel

pub mod kernel;
pub mod sketch;

// Re-exports for convenience
pub use kernel::{
    CadError, CadKernel, CadResult, ComponentHandle, Edge, EdgeId, FaceId, Handle, HelperHandle,
    MemoryKernel, RegionHandle, SketchHandle, SolidHandle, TessellatedMesh,
};
pub use sketch::{ElementKind, SketchElement};
