//! Sketch editor renderer
//!
//! - [`RenderEngine`]: the contract the editor draws and hit-tests through
//! - [`Scene`]: headless implementation with camera-based picking
//! - [`SceneSync`]: keeps scene proxies one-to-one with live kernel entities
//!
//! # Module Structure
//!
//! ```text
//! sk-renderer/
//! ├── camera.rs    # Projection and pointer rays
//! ├── config.rs    # Display mode, viewport and camera settings
//! ├── engine.rs    # RenderEngine trait, FrameStats
//! ├── scene/       # Scene, proxies, bounds, collision tests
//! ├── sync/        # SceneSync and its per-component proxy caches
//! └── vertex.rs    # Pod vertex formats
//! ```

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod scene;
pub mod sync;
pub mod vertex;

// Re-exports for convenience
pub use camera::{Camera, Projection};
pub use config::{CameraConfig, DisplayMode, RendererConfig, ViewportConfig};
pub use engine::{FrameStats, RenderEngine};
pub use error::{SyncError, SyncResult};
pub use scene::{
    BoundingBox, MaterialKind, ProxyCategory, ProxyGeometry, ProxyId, ProxySource, ProxyTag,
    RenderProxy, Scene,
};
pub use sync::{SceneSync, SyncEvent};
