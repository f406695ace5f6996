//! Reorderable areas for egui.
//!
//! [`ReorderBoard`] wraps a [`Reorder`] engine and a [`MemoryTree`]. Each
//! frame, areas and rows report their laid-out rects into the tree under
//! node ids derived from their egui ids; [`ReorderBoard::end_frame`] then
//! settles the engine, forwards the pointer and paints the ghost.
//!
//! ```ignore
//! board.begin_frame(ctx);
//! egui::CentralPanel::default().show(ctx, |ui| {
//!     board.area(ui, egui::Id::new("todo"), &todo, AreaOptions::new, |ui, task, _| {
//!         ui.label(task.as_str());
//!     });
//! });
//! board.end_frame(ctx, |ui, task| { ui.label(task.as_str()); });
//! ```

use egui::{CursorIcon, Id, Order, Pos2, Response, Sense, Ui, vec2};
use reorder_core::{
    AreaId, AreaOptions, Collection, DraggedIs, DropOutcome, HandleOptions, ItemId, ListId,
    ListOptions, MemoryTree, NodeId, Reorder, ReorderConfig, ReleaseOutcome,
};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::{sizing, style};

/// What a row renderer needs to know about its item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowState {
    /// Position within the area's collection.
    pub index: usize,
    /// This row is the placeholder of the dragged value.
    pub positioning: bool,
    /// Where the dragged value sits relative to this row.
    pub dragged_is: Option<DraggedIs>,
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Area { list: ListId, anchor: NodeId },
    Item(ItemId),
}

/// A set of reorderable areas sharing one drag session.
pub struct ReorderBoard<T> {
    engine: Reorder<T>,
    tree: MemoryTree,
    handle_options: HandleOptions,
    /// Every node registered with the engine.
    nodes: HashMap<NodeId, Role>,
    /// Nodes rendered during the current frame.
    seen: HashSet<NodeId>,
}

impl<T: Clone + Eq + Hash> Default for ReorderBoard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> ReorderBoard<T> {
    pub fn new() -> Self {
        Self::with_config(ReorderConfig::default())
    }

    pub fn with_config(config: ReorderConfig) -> Self {
        Self {
            engine: Reorder::with_config(config),
            tree: MemoryTree::headless(),
            handle_options: HandleOptions::default(),
            nodes: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Handle options applied to every row.
    pub fn with_handle_options(mut self, options: HandleOptions) -> Self {
        self.handle_options = options;
        self
    }

    pub fn engine(&self) -> &Reorder<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Reorder<T> {
        &mut self.engine
    }

    pub fn tree(&self) -> &MemoryTree {
        &self.tree
    }

    /// Start a frame. Call before any [`area`](Self::area).
    pub fn begin_frame(&mut self, ctx: &egui::Context) {
        self.seen.clear();
        let viewport = ctx.input(|i| i.content_rect());
        self.tree.set_viewport(Some(to_rect(viewport)));
    }

    /// Show an area listing `values`, one row per value.
    ///
    /// `options` is only called the first time the area is shown; use
    /// [`update_area`](Self::update_area) to change them later.
    pub fn area(
        &mut self,
        ui: &mut Ui,
        id: Id,
        values: &Collection<T>,
        options: impl FnOnce() -> AreaOptions<T>,
        mut add_contents: impl FnMut(&mut Ui, &T, RowState),
    ) -> Response {
        let node = node_id(id);
        let anchor = node_id(id.with("list"));
        let (area, list) = self.register_area(node, anchor, values, options);
        self.seen.insert(node);

        let frame = style::area_frame(self.engine.area(area));
        let inner = frame.show(ui, |ui| {
            ui.set_min_size(vec2(sizing::AREA_MIN_WIDTH, sizing::AREA_MIN_HEIGHT));
            let snapshot: Vec<T> = values.borrow().clone();
            for (index, value) in snapshot.iter().enumerate() {
                self.row(ui, id, node, list, index, value, &mut add_contents);
            }
        });

        let rect = inner.response.rect;
        self.tree.upsert(node, None, to_rect(rect));
        let anchor_rect = egui::Rect::from_min_size(rect.min, egui::Vec2::ZERO);
        self.tree.upsert(anchor, Some(node), to_rect(anchor_rect));
        inner.response
    }

    /// Replace the options of an area shown earlier.
    ///
    /// Returns `false` when no area with this id has been shown.
    pub fn update_area(&mut self, id: Id, options: AreaOptions<T>) -> bool {
        let Some(area) = self.engine.area_for_node(node_id(id)) else {
            return false;
        };
        match self.engine.update_area(area, options) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to update area {:?}: {}", area, err);
                false
            }
        }
    }

    fn register_area(
        &mut self,
        node: NodeId,
        anchor: NodeId,
        values: &Collection<T>,
        options: impl FnOnce() -> AreaOptions<T>,
    ) -> (AreaId, ListId) {
        if let (Some(Role::Area { list, .. }), Some(area)) = (self.nodes.get(&node), self.engine.area_for_node(node)) {
            let list = *list;
            let swapped = self
                .engine
                .list(list)
                .is_some_and(|l| !Rc::ptr_eq(&l.options().view, values));
            if swapped {
                if let Err(err) = self.engine.update_list(list, ListOptions::new(Rc::clone(values))) {
                    log::warn!("Failed to swap list collection: {}", err);
                }
            }
            return (area, list);
        }

        let area = self.engine.attach_area(node, options());
        let list = self.engine.render_list(anchor, ListOptions::new(Rc::clone(values)));
        self.nodes.insert(node, Role::Area { list, anchor });
        log::debug!("Registered area {:?} with list {:?}", area, list);
        (area, list)
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        &mut self,
        ui: &mut Ui,
        area_id: Id,
        area_node: NodeId,
        list: ListId,
        index: usize,
        value: &T,
        add_contents: &mut impl FnMut(&mut Ui, &T, RowState),
    ) {
        let item = match self.engine.attach_item(list, value.clone(), index) {
            Ok(item) => item,
            Err(err) => {
                log::warn!("Failed to attach row {}: {}", index, err);
                return;
            }
        };
        let state = self
            .engine
            .item(item)
            .map(|record| RowState {
                index: record.index(),
                positioning: record.is_positioning(),
                dragged_is: record.dragged_is(),
            })
            .unwrap_or_default();

        let inner = ui.scope(|ui| {
            if state.positioning {
                ui.set_opacity(sizing::PLACEHOLDER_OPACITY);
            }
            add_contents(ui, value, state);
        });
        let rect = inner.response.rect;

        let node = node_id(area_id.with(value));
        self.tree.upsert(node, Some(area_node), to_rect(rect));
        self.seen.insert(node);
        let known = matches!(self.nodes.get(&node), Some(Role::Item(known)) if *known == item);
        if !known {
            let options = self.handle_options.clone();
            if let Err(err) = self.engine.attach_item_handle(&self.tree, item, node, options) {
                log::warn!("Failed to attach handle: {}", err);
            }
            self.nodes.insert(node, Role::Item(item));
        }

        let response = ui.interact(rect, Id::new(("reorder_handle", node)), Sense::drag());
        if response.drag_started() && !self.engine.is_dragging() {
            let origin = ui.input(|i| i.pointer.press_origin()).or(response.interact_pointer_pos());
            if let Some(origin) = origin {
                if let Err(err) = self.engine.press(&self.tree, item, to_point(origin)) {
                    log::debug!("Press ignored: {}", err);
                }
            }
        }
        if response.hovered() && !self.engine.is_dragging() {
            let cursor = self.engine.handle_cursor(item, Instant::now());
            ui.ctx().set_cursor_icon(cursor_icon(cursor));
        }
    }

    /// Finish a frame: drop stale nodes, settle, forward the pointer and
    /// paint the ghost with `ghost_ui`.
    ///
    /// Returns the outcome when a drag ended this frame.
    pub fn end_frame(&mut self, ctx: &egui::Context, ghost_ui: impl FnOnce(&mut Ui, &T)) -> Option<DropOutcome<T>> {
        let now = Instant::now();
        self.remove_stale();

        // Binding errors are logged by the engine.
        let _ = self.engine.settle(&self.tree);
        self.engine.poll_positions(&self.tree, now);

        let (pointer, released) = ctx.input(|i| (i.pointer.latest_pos(), i.pointer.any_released()));
        if let Some(pos) = pointer {
            self.engine.pointer_move(&self.tree, to_point(pos));
        }

        if let Some(ghost) = self.engine.ghost() {
            let rect = ghost.rect();
            let size = vec2(rect.width() as f32, rect.height() as f32);
            egui::Area::new(Id::new("reorder_ghost"))
                .fixed_pos(to_pos(rect.origin()))
                .order(Order::Tooltip)
                .interactable(false)
                .show(ctx, |ui| {
                    style::ghost_frame().show(ui, |ui| {
                        ui.set_min_size(size);
                        ghost_ui(ui, &ghost.value);
                    });
                });
            ctx.set_cursor_icon(CursorIcon::Grabbing);
            ctx.request_repaint();
        }

        if !released {
            return None;
        }
        match self.engine.release(now) {
            ReleaseOutcome::Dropped(outcome) => Some(outcome),
            ReleaseOutcome::Click(_) | ReleaseOutcome::Idle => None,
        }
    }

    /// Unregister nodes that weren't rendered this frame.
    fn remove_stale(&mut self) {
        let stale: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|node| !self.seen.contains(*node))
            .copied()
            .collect();

        let mut areas = Vec::new();
        for node in stale {
            match self.nodes.remove(&node) {
                Some(Role::Item(item)) => {
                    self.engine.detach_item_handle(&self.tree, item, node);
                    self.engine.detach_item(item);
                    self.tree.remove(node);
                }
                Some(Role::Area { list, anchor }) => areas.push((node, list, anchor)),
                None => {}
            }
        }
        for (node, list, anchor) in areas {
            if let Err(err) = self.engine.unrender_list(list) {
                log::debug!("List already gone: {}", err);
            }
            self.engine.detach_area(node);
            self.tree.remove(anchor);
            self.tree.remove(node);
        }
    }
}

fn node_id(id: Id) -> NodeId {
    NodeId(id.value())
}

fn to_rect(rect: egui::Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        rect.min.x as f64,
        rect.min.y as f64,
        rect.max.x as f64,
        rect.max.y as f64,
    )
}

fn to_point(pos: Pos2) -> kurbo::Point {
    kurbo::Point::new(pos.x as f64, pos.y as f64)
}

fn to_pos(point: kurbo::Point) -> Pos2 {
    Pos2::new(point.x as f32, point.y as f32)
}

/// Map a CSS cursor name onto egui's cursor icons.
fn cursor_icon(name: &str) -> CursorIcon {
    match name {
        "pointer" => CursorIcon::PointingHand,
        "grabbing" => CursorIcon::Grabbing,
        "move" => CursorIcon::Move,
        "default" => CursorIcon::Default,
        "not-allowed" => CursorIcon::NotAllowed,
        _ => CursorIcon::Grab,
    }
}
