//! Frames for areas and the drag ghost.

use egui::{Color32, CornerRadius, Frame, Margin, Stroke};
use reorder_core::AreaRecord;
use std::hash::Hash;

use crate::{sizing, theme};

/// Frame for an area, reflecting its drag state.
///
/// A targeted area is outlined in the accent color when it accepts the
/// dragged value and in red when it rejects it.
pub fn area_frame<T: Eq + Hash>(area: Option<&AreaRecord<T>>) -> Frame {
    let (stroke, fill) = match area {
        Some(area) if area.is_target() => {
            let color = if area.condition_attr() == Some(false) {
                theme::REJECT
            } else {
                theme::ACCENT
            };
            (Stroke::new(2.0, color), theme::PANEL_BG)
        }
        Some(area) if area.is_origin() => (Stroke::new(1.0, theme::BORDER), theme::ORIGIN_BG),
        _ => (Stroke::new(1.0, theme::BORDER), theme::PANEL_BG),
    };

    Frame::new()
        .fill(fill)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(stroke)
        .inner_margin(Margin::same(8))
}

/// Create the floating ghost frame with shadow.
pub fn ghost_frame() -> Frame {
    Frame::new()
        .fill(theme::GHOST_BG)
        .corner_radius(CornerRadius::same(sizing::CORNER_RADIUS))
        .stroke(Stroke::new(1.0, theme::ACCENT))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 8,
            offset: [0, 2],
            color: Color32::from_black_alpha(40),
        })
}
