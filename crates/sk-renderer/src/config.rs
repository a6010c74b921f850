//! Renderer configuration structures
//!
//! These settings are serializable so the editor configuration file can
//! carry them.

use serde::{Deserialize, Serialize};

/// How solids are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Edges only
    Wireframe,
    /// Faces only
    #[default]
    Shaded,
    /// Faces everywhere, plus edges on the active component
    WireShade,
}

impl DisplayMode {
    /// Whether face meshes are produced
    pub fn shows_faces(&self) -> bool {
        matches!(self, DisplayMode::Shaded | DisplayMode::WireShade)
    }

    /// Whether edge lines are produced for a component
    pub fn shows_edges(&self, is_active: bool) -> bool {
        match self {
            DisplayMode::Wireframe => true,
            DisplayMode::WireShade => is_active,
            DisplayMode::Shaded => false,
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::Wireframe => "Wireframe",
            DisplayMode::Shaded => "Shaded",
            DisplayMode::WireShade => "Wire + Shade",
        }
    }
}

/// Viewport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
    /// Screen distance in pixels within which a line counts as hit
    pub line_pick_tolerance: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            line_pick_tolerance: 6.0,
        }
    }
}

/// Camera default configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Initial eye distance from the origin
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            near_plane: 0.1,
            far_plane: 100000.0,
            distance: 50.0,
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Initial display mode
    pub display_mode: DisplayMode,
    /// Edge length of construction plane quads
    pub plane_size: f32,
    /// Viewport settings
    pub viewport: ViewportConfig,
    /// Camera settings
    pub camera: CameraConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            plane_size: 20.0,
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Create a new renderer configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_per_mode() {
        assert!(DisplayMode::Wireframe.shows_edges(false));
        assert!(!DisplayMode::Wireframe.shows_faces());
        assert!(DisplayMode::WireShade.shows_edges(true));
        assert!(!DisplayMode::WireShade.shows_edges(false));
        assert!(!DisplayMode::Shaded.shows_edges(true));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RendererConfig = ron::from_str("(display_mode: Wireframe)").unwrap();
        assert_eq!(config.display_mode, DisplayMode::Wireframe);
        assert_eq!(config.viewport, ViewportConfig::default());
    }
}
