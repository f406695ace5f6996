//! egui adapter for the reorder engine.
//!
//! This crate plays the renderer role for `reorder-core`:
//!
//! - **Board**: maps egui widget rects into a node tree, forwards pointer
//!   events into the engine and paints the drag ghost
//! - **Style**: frames for areas, rows and the ghost

pub mod board;
pub mod style;

pub use board::{ReorderBoard, RowState};
pub use style::{area_frame, ghost_frame};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Minimum area width, so empty areas stay droppable
    pub const AREA_MIN_WIDTH: f32 = 160.0;
    /// Minimum area height
    pub const AREA_MIN_HEIGHT: f32 = 48.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Area corner radius
    pub const PANEL_RADIUS: u8 = 8;
    /// Opacity of the placeholder row left behind by the dragged item
    pub const PLACEHOLDER_OPACITY: f32 = 0.35;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Accepting drop target (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Rejecting drop target (red)
    pub const REJECT: Color32 = Color32::from_rgb(239, 68, 68);
    /// Background of the area the drag started from
    pub const ORIGIN_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Area background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
    /// Ghost background
    pub const GHOST_BG: Color32 = Color32::WHITE;
}
