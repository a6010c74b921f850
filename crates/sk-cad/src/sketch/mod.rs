//! Sketch geometry
//!
//! Element geometry and region detection used by [`crate::MemoryKernel`].
//! Kernels backed by a real modeller only need the [`ElementKind`] names.

mod element;
pub mod region;

pub use element::{ElementKind, SketchElement, circumcenter};
