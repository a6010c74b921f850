//! Interactive layer of the sketch editor
//!
//! - [`Viewport`]: routes pointer input through snapping to the active tool
//! - [`Snapper`]: axis guides and anchors from remembered snap points
//! - [`tools`]: drawing, selection, picking and trimming state machines
//! - [`SnapOverlay`]: egui painting of guides plus the pick chooser popup
//!
//! # Module Structure
//!
//! ```text
//! sk-frontend/
//! ├── config.rs        # EditorConfig, RON persistence
//! ├── error.rs         # EditorError, ConfigError
//! ├── event.rs         # ViewportEvent and picked objects
//! ├── overlay.rs       # egui guide overlay and chooser popup
//! ├── palette.rs       # Overlay colors
//! ├── sketch_plane.rs  # Pointer ray to sketch plane
//! ├── snapping.rs      # Snapper, snap point collection
//! ├── tools/           # Tool trait and implementations
//! └── viewport.rs      # Viewport orchestration
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod overlay;
pub mod palette;
pub mod sketch_plane;
pub mod snapping;
pub mod tools;
pub mod viewport;

// Re-exports for convenience
pub use config::{EditorConfig, SnapConfig};
pub use error::{ConfigError, EditorError, EditorResult};
pub use event::{Anchor, Guide, GuideAxis, Picked, ViewportEvent};
pub use overlay::{ChooserAction, SnapOverlay, chooser_window};
pub use sketch_plane::SketchPlane;
pub use snapping::{ActiveHandle, Snapper, collect_snap_points};
pub use tools::{
    ArcTool, Chooser, CircleTool, Highlighter, LineTool, ManipulationTool, PickKind, PickTool,
    SplineTool, Tool, ToolContext, ToolKind, TrimTool,
};
pub use viewport::Viewport;
