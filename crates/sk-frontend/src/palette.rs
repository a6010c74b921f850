//! Overlay colors
//!
//! Matches the dark CAD theme: guides use the accent blue, anchors the
//! warning amber so they stand out against curves.

use egui::Color32;

// =============================================================================
// Snap guides
// =============================================================================

/// Dashed alignment guide
pub const GUIDE: Color32 = Color32::from_rgb(66, 150, 250);
/// Anchor ring where both axes align
pub const ANCHOR: Color32 = Color32::from_rgb(255, 180, 60);

// =============================================================================
// Chooser popup
// =============================================================================

/// Popup background
pub const CHOOSER_BG: Color32 = Color32::from_rgb(38, 38, 44);
/// Popup border
pub const CHOOSER_BORDER: Color32 = Color32::from_rgb(65, 65, 75);
/// Candidate label
pub const CHOOSER_TEXT: Color32 = Color32::from_rgb(230, 230, 235);

// =============================================================================
// Helper functions
// =============================================================================

/// Create a semi-transparent version of a color
pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}
