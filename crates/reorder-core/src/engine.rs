//! Reorder coordinator.
//!
//! [`Reorder`] owns every area, list and item record of one engine instance
//! together with its drag session. Renderers register areas and lists,
//! attach item handles and anchors, and feed pointer and layout events in;
//! the coordinator resolves the nearest item under the drag ghost and
//! splices the backing collections.
//!
//! Everything runs on the host's UI thread. Ordering rules:
//! - at most one splice per resolution pass;
//! - after a splice, no further splice until [`Reorder::settle`] has
//!   re-measured positions (stale geometry would flip the target back);
//! - a `committing` latch blocks re-entry while a splice and renumber run.

use crate::area::{AreaId, AreaOptions, AreaRecord};
use crate::config::ReorderConfig;
use crate::error::{ReorderError, ReorderResult};
use crate::geometry::{Axis, axis_distance, is_measured, rect_of, shared_ancestor};
use crate::item::{AreaLink, DraggedIs, HandleOptions, ItemId, ItemRecord};
use crate::list::{ListBinding, ListId, ListOptions, ListRecord};
use crate::session::{
    Current, DragGhost, DragSession, DropOutcome, LastSplice, PendingPress, PressOutcome,
    ReleaseOutcome, Splice, Target, Targeting,
};
use crate::tree::{NodeId, NodeTree, ancestors};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// A drag-and-drop reorder engine.
pub struct Reorder<T> {
    config: ReorderConfig,
    areas: HashMap<AreaId, AreaRecord<T>>,
    /// Identity-keyed registry: container node to area.
    area_nodes: HashMap<NodeId, AreaId>,
    lists: HashMap<ListId, ListRecord<T>>,
    items: HashMap<ItemId, ItemRecord<T>>,
    session: DragSession<T>,
    next_id: u64,
}

impl<T: Clone + Eq + Hash> Default for Reorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> Reorder<T> {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ReorderConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: ReorderConfig) -> Self {
        Self {
            config,
            areas: HashMap::new(),
            area_nodes: HashMap::new(),
            lists: HashMap::new(),
            items: HashMap::new(),
            session: DragSession::default(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Areas
    // ------------------------------------------------------------------

    /// Attach the area role to a container node.
    ///
    /// Attaching a node that already has an area updates its options and
    /// returns the existing record.
    pub fn attach_area(&mut self, node: NodeId, options: AreaOptions<T>) -> AreaId {
        if let Some(&id) = self.area_nodes.get(&node) {
            if let Some(area) = self.areas.get_mut(&id) {
                area.set_options(options);
                area.condition_attr = self.session.reordering.as_ref().map(|v| area.accepts(v));
                if self.session.targeting.area == Some(id) {
                    self.refresh_targetable();
                }
                return id;
            }
        }

        let id = AreaId(self.next_id());
        let mut area = AreaRecord::new(id, node, options);
        area.condition_attr = self.session.reordering.as_ref().map(|v| area.accepts(v));
        self.areas.insert(id, area);
        self.area_nodes.insert(node, id);
        log::debug!("Attached area {:?} to node {:?}", id, node);
        id
    }

    /// Replace an area's options. Fields absent from `options` are cleared.
    pub fn update_area(&mut self, id: AreaId, options: AreaOptions<T>) -> ReorderResult<()> {
        let area = self.areas.get_mut(&id).ok_or(ReorderError::UnknownArea(id))?;
        area.set_options(options);
        area.condition_attr = self.session.reordering.as_ref().map(|v| area.accepts(v));
        if self.session.targeting.area == Some(id) {
            self.refresh_targetable();
        }
        Ok(())
    }

    /// Tear down the area attached to `node`, dropping its items.
    pub fn detach_area(&mut self, node: NodeId) -> Option<AreaId> {
        let id = self.area_nodes.remove(&node)?;
        let area = self.areas.remove(&id)?;

        for item_id in area.items.values() {
            if let Some(mut item) = self.items.remove(item_id) {
                item.stop_tracking();
            }
        }
        for list in self.lists.values_mut() {
            if list.binding == ListBinding::Bound(id) {
                list.binding = ListBinding::Pending;
            }
        }
        for item in self.items.values_mut() {
            if item.area() == Some(id) {
                item.area = AreaLink::Resolved(None);
            }
        }
        if self.session.targeting.area == Some(id) {
            self.session.targeting.area = None;
            self.session.targeting.targetable = false;
            self.session.targeting.entered_area = false;
        }

        // The dragged value's collection is gone; nothing is left to splice.
        let home = self.session.last_splice.area == Some(id) || self.session.current.area == Some(id);
        if home && self.session.is_active() {
            log::debug!("Area {:?} held the dragged value, ending drag", id);
            self.session.targeting.targetable = false;
            self.stop();
        }
        log::debug!("Detached area {:?} from node {:?}", id, node);
        Some(id)
    }

    pub fn area(&self, id: AreaId) -> Option<&AreaRecord<T>> {
        self.areas.get(&id)
    }

    /// The area attached to `node`, if any.
    pub fn area_for_node(&self, node: NodeId) -> Option<AreaId> {
        self.area_nodes.get(&node).copied()
    }

    pub fn areas(&self) -> impl Iterator<Item = &AreaRecord<T>> {
        self.areas.values()
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// Register a list rendered at `anchor`.
    ///
    /// The owning area is resolved on the next [`settle`](Self::settle),
    /// after the surrounding render has mounted its ancestors.
    pub fn render_list(&mut self, anchor: NodeId, options: ListOptions<T>) -> ListId {
        let id = ListId(self.next_id());
        self.lists.insert(
            id,
            ListRecord {
                id,
                anchor,
                options,
                binding: ListBinding::Pending,
            },
        );
        id
    }

    /// Swap a list's collections, rebinding its area.
    pub fn update_list(&mut self, id: ListId, options: ListOptions<T>) -> ReorderResult<()> {
        let list = self.lists.get_mut(&id).ok_or(ReorderError::UnknownList(id))?;
        if let ListBinding::Bound(area_id) = list.binding {
            if let Some(area) = self.areas.get_mut(&area_id) {
                area.bind(id, Rc::clone(&options.view), Rc::clone(options.splice()));
            }
        }
        list.options = options;
        Ok(())
    }

    /// Unmount a list, freeing its area for another list.
    pub fn unrender_list(&mut self, id: ListId) -> ReorderResult<()> {
        let list = self.lists.remove(&id).ok_or(ReorderError::UnknownList(id))?;
        if let Some(area) = list.area().and_then(|a| self.areas.get_mut(&a)) {
            if area.list == Some(id) {
                area.unbind();
            }
        }
        Ok(())
    }

    pub fn list(&self, id: ListId) -> Option<&ListRecord<T>> {
        self.lists.get(&id)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Get or create the record for `value` rendered at `view_index` of a list.
    ///
    /// Rendering the same value again returns the existing record with its
    /// index refreshed.
    pub fn attach_item(&mut self, list_id: ListId, value: T, view_index: usize) -> ReorderResult<ItemId> {
        let list = self.lists.get(&list_id).ok_or(ReorderError::UnknownList(list_id))?;
        let index = view_index + list.options.start_index;
        let binding = list.binding;

        let existing = match binding {
            ListBinding::Bound(area) => self.areas.get(&area).and_then(|a| a.item(&value)),
            _ => self
                .items
                .values()
                .find(|item| item.list == list_id && item.value == value)
                .map(|item| item.id),
        };
        if let Some(id) = existing {
            if let Some(item) = self.items.get_mut(&id) {
                item.index = index;
                return Ok(id);
            }
        }

        let id = ItemId(self.next_id());
        let link = match binding {
            ListBinding::Bound(area) => {
                if let Some(area) = self.areas.get_mut(&area) {
                    area.items.insert(value.clone(), id);
                }
                AreaLink::Resolved(Some(area))
            }
            ListBinding::Pending => AreaLink::Pending,
            ListBinding::Failed => AreaLink::Resolved(None),
        };
        self.items.insert(id, ItemRecord::new(id, value, list_id, link, index));
        self.refresh_flags();
        Ok(id)
    }

    /// Attach the element used for proximity measurement.
    pub fn attach_item_anchor(&mut self, tree: &dyn NodeTree, id: ItemId, node: NodeId) -> ReorderResult<()> {
        let item = self.items.get_mut(&id).ok_or(ReorderError::UnknownItem(id))?;
        item.anchor = Some(node);
        item.retrack(tree, &self.config.observer);
        Ok(())
    }

    /// Attach the element that starts a drag when pressed.
    pub fn attach_item_handle(
        &mut self,
        tree: &dyn NodeTree,
        id: ItemId,
        node: NodeId,
        options: HandleOptions,
    ) -> ReorderResult<()> {
        let item = self.items.get_mut(&id).ok_or(ReorderError::UnknownItem(id))?;
        item.handle = Some(node);
        item.handle_options = options;
        item.retrack(tree, &self.config.observer);
        Ok(())
    }

    pub fn update_handle(&mut self, id: ItemId, options: HandleOptions) -> ReorderResult<()> {
        let item = self.items.get_mut(&id).ok_or(ReorderError::UnknownItem(id))?;
        item.handle_options = options;
        Ok(())
    }

    /// Detach an anchor element. Ignored if `node` is no longer the anchor.
    pub fn detach_item_anchor(&mut self, tree: &dyn NodeTree, id: ItemId, node: NodeId) {
        if let Some(item) = self.items.get_mut(&id) {
            if item.anchor == Some(node) {
                item.anchor = None;
                item.retrack(tree, &self.config.observer);
            }
        }
    }

    /// Detach a handle element. Ignored if `node` is no longer the handle.
    pub fn detach_item_handle(&mut self, tree: &dyn NodeTree, id: ItemId, node: NodeId) {
        if let Some(item) = self.items.get_mut(&id) {
            if item.handle == Some(node) {
                item.handle = None;
                item.retrack(tree, &self.config.observer);
            }
        }
    }

    /// Tear down an item record.
    ///
    /// If the value is still in the owning area's collection the record is
    /// kept, since the same value is being re-rendered elsewhere in the
    /// list. Returns whether the record was removed.
    pub fn detach_item(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.get(&id) else {
            return false;
        };
        if let Some(area) = item.area().and_then(|a| self.areas.get_mut(&a)) {
            if area.holds(&item.value) {
                return false;
            }
            if area.items.get(&item.value) == Some(&id) {
                area.items.remove(&item.value);
            }
        }
        if let Some(mut item) = self.items.remove(&id) {
            item.stop_tracking();
        }
        true
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemRecord<T>> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemRecord<T>> {
        self.items.values()
    }

    /// The record of `value` in an area's membership.
    pub fn item_for_value(&self, area: AreaId, value: &T) -> Option<&ItemRecord<T>> {
        self.areas
            .get(&area)
            .and_then(|a| a.item(value))
            .and_then(|id| self.items.get(&id))
    }

    /// Force a synchronous re-measure of one item.
    pub fn update_position(&mut self, tree: &dyn NodeTree, id: ItemId) -> Option<Rect> {
        self.items.get_mut(&id).map(|item| item.update_position(tree))
    }

    /// Cursor for an item's handle.
    pub fn handle_cursor(&self, id: ItemId, now: Instant) -> &str {
        let Some(item) = self.items.get(&id) else {
            return "grab";
        };
        match item.handle_options.cursor.as_deref() {
            Some(cursor) => cursor,
            None if item.click_cursor_until.is_some_and(|until| now < until) => "pointer",
            None => "grab",
        }
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Call once rendering and layout have settled.
    ///
    /// Resolves pending list and item areas, re-measures positions after a
    /// splice and runs resolution again. Binding errors are reported for
    /// the first failing list; the others are logged.
    pub fn settle(&mut self, tree: &dyn NodeTree) -> ReorderResult<()> {
        let result = self.resolve_lists(tree);
        self.resolve_item_areas(tree);
        self.refresh_targetable();

        if self.session.awaiting_layout {
            self.session.awaiting_layout = false;
            let areas: Vec<AreaId> = self
                .session
                .current
                .area
                .into_iter()
                .chain(self.session.targeting.area)
                .collect();
            self.remeasure(tree, &areas);
            self.session.targeting.trigger();
        }
        if self.session.is_active() {
            self.resolve();
        }
        result
    }

    fn resolve_lists(&mut self, tree: &dyn NodeTree) -> ReorderResult<()> {
        let mut pending: Vec<ListId> = self
            .lists
            .values()
            .filter(|list| list.binding == ListBinding::Pending)
            .map(|list| list.id)
            .collect();
        pending.sort();

        let mut first_error = None;
        for id in pending {
            let Some(list) = self.lists.get_mut(&id) else {
                continue;
            };
            let found = ancestors(tree, list.anchor).find_map(|n| self.area_nodes.get(&n).copied());
            let outcome = match found.and_then(|a| self.areas.get_mut(&a)) {
                None => Err(ReorderError::ListOutsideArea { list: id }),
                Some(area) if area.list.is_some_and(|l| l != id) => Err(ReorderError::ListAlreadyBound {
                    area: area.id,
                    list: id,
                }),
                Some(area) => {
                    area.bind(id, Rc::clone(&list.options.view), Rc::clone(list.options.splice()));
                    Ok(area.id)
                }
            };

            match outcome {
                Ok(area_id) => {
                    list.binding = ListBinding::Bound(area_id);
                    log::debug!("List {:?} bound to area {:?}", id, area_id);
                    self.adopt_items(id, Some(area_id));
                }
                Err(err) => {
                    log::warn!("{}", err);
                    list.binding = ListBinding::Failed;
                    self.adopt_items(id, None);
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Resolve the pending items of a list to its area.
    fn adopt_items(&mut self, list: ListId, area_id: Option<AreaId>) {
        for item in self.items.values_mut() {
            if item.list != list || item.area != AreaLink::Pending {
                continue;
            }
            item.area = AreaLink::Resolved(area_id);
            if let Some(area) = area_id.and_then(|a| self.areas.get_mut(&a)) {
                area.items.entry(item.value.clone()).or_insert(item.id);
            }
        }
    }

    /// Resolve items whose list can't: walk their own element's ancestors.
    fn resolve_item_areas(&mut self, tree: &dyn NodeTree) {
        for item in self.items.values_mut() {
            if item.area != AreaLink::Pending {
                continue;
            }
            let listed = self.lists.get(&item.list).map(|l| l.binding);
            if listed == Some(ListBinding::Pending) {
                continue;
            }
            let found = item
                .measured_node()
                .and_then(|node| ancestors(tree, node).find_map(|n| self.area_nodes.get(&n).copied()));
            item.area = AreaLink::Resolved(found);
            if let Some(area) = found.and_then(|a| self.areas.get_mut(&a)) {
                area.items.entry(item.value.clone()).or_insert(item.id);
            }
        }
    }

    fn remeasure(&mut self, tree: &dyn NodeTree, areas: &[AreaId]) {
        for item in self.items.values_mut() {
            if item.area().is_some_and(|a| areas.contains(&a)) {
                item.update_position(tree);
            }
        }
    }

    /// Drive every item's position observer.
    ///
    /// Positions only update while dragging, and only for items of the
    /// targeted area.
    pub fn poll_positions(&mut self, tree: &dyn NodeTree, now: Instant) -> Option<Splice> {
        let target = self.session.reordering.as_ref().and(self.session.targeting.area);
        let mut moved = false;
        for item in self.items.values_mut() {
            let enabled = target.is_some() && item.area() == target;
            let Some(tracker) = item.tracker.as_mut() else {
                continue;
            };
            if tracker.poll(tree, now, || enabled) {
                item.update_position(tree);
                moved = true;
            }
        }
        if !moved {
            return None;
        }
        self.session.targeting.trigger();
        self.resolve()
    }

    // ------------------------------------------------------------------
    // Drag session
    // ------------------------------------------------------------------

    pub fn session(&self) -> &DragSession<T> {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_active()
    }

    /// The value being dragged.
    pub fn reordering(&self) -> Option<&T> {
        self.session.reordering.as_ref()
    }

    pub fn ghost(&self) -> Option<&DragGhost<T>> {
        self.session.ghost.as_ref()
    }

    /// A press on an item's handle.
    ///
    /// Clickable handles wait for movement before dragging.
    pub fn press(&mut self, tree: &dyn NodeTree, id: ItemId, pointer: Point) -> ReorderResult<PressOutcome<T>> {
        if self.session.is_active() {
            return Err(ReorderError::AlreadyDragging);
        }
        let item = self.items.get(&id).ok_or(ReorderError::UnknownItem(id))?;
        if item.handle_options.clickable {
            self.session.pending_press = Some(PendingPress { item: id, origin: pointer });
            return Ok(PressOutcome::Deferred);
        }
        self.start_drag(tree, id, pointer).map(PressOutcome::Started)
    }

    /// Open a drag session for an item.
    pub fn start_drag(&mut self, tree: &dyn NodeTree, id: ItemId, pointer: Point) -> ReorderResult<DragGhost<T>> {
        if self.session.is_active() {
            return Err(ReorderError::AlreadyDragging);
        }
        let item = self.items.get(&id).ok_or(ReorderError::UnknownItem(id))?;
        let area_id = item
            .area()
            .filter(|a| self.areas.contains_key(a))
            .ok_or(ReorderError::Unattached(id))?;

        // Measure the whole item, not just a nested handle.
        let reference = self.lists.get(&item.list).map(|l| l.anchor);
        let rect = match (item.handle.or(item.anchor), reference) {
            (Some(node), Some(reference)) => {
                rect_of(tree, shared_ancestor(tree, node, reference).or(Some(node)))
            }
            (node, _) => rect_of(tree, node),
        };
        let (offset, size) = if is_measured(&rect) {
            (pointer - rect.origin(), rect.size())
        } else {
            (Vec2::ZERO, Size::ZERO)
        };

        let value = item.value.clone();
        let index = item.index;
        let ghost = DragGhost {
            value: value.clone(),
            item: item.snapshot(),
            screen_position: pointer,
            pointer_offset: offset,
            minimum_size: size,
        };

        self.session.current = Current {
            area: Some(area_id),
            index,
            item: Some(value.clone()),
        };
        self.session.last_splice = LastSplice {
            area: Some(area_id),
            index: Some(index),
        };
        self.session.targeting = Targeting {
            position: ghost.rect(),
            ..Targeting::default()
        };
        self.session.dragged = Some(id);
        self.session.ghost = Some(ghost.clone());
        self.session.committing = false;
        self.session.awaiting_layout = false;
        self.session.pending_press = None;

        for area in self.areas.values_mut() {
            area.condition_attr = Some(area.accepts(&value));
            area.is_origin = area.id == area_id;
        }
        self.session.reordering = Some(value);
        self.refresh_flags();

        log::debug!("Drag started: item {:?} from area {:?} index {}", id, area_id, index);
        Ok(ghost)
    }

    /// Pointer moved. Starts a deferred drag, moves the ghost, handles area
    /// entry and runs resolution.
    pub fn pointer_move(&mut self, tree: &dyn NodeTree, pointer: Point) -> Option<Splice> {
        if let Some(press) = self.session.pending_press.take() {
            if let Err(err) = self.start_drag(tree, press.item, press.origin) {
                log::warn!("Deferred drag failed to start: {}", err);
                return None;
            }
        }
        if !self.session.is_active() {
            return None;
        }

        if let Some(ghost) = self.session.ghost.as_mut() {
            ghost.screen_position = pointer;
            self.session.targeting.position = ghost.rect();
        }
        self.session.targeting.trigger();

        match self.area_at(tree, pointer) {
            Some(area) if Some(area) != self.session.targeting.area => {
                if let Err(err) = self.enter_area(tree, area) {
                    log::warn!("Failed to enter area {:?}: {}", area, err);
                }
            }
            Some(_) => self.session.targeting.entered_area = true,
            None => self.session.targeting.entered_area = false,
        }
        self.resolve()
    }

    /// The innermost area whose bounds contain `point`.
    fn area_at(&self, tree: &dyn NodeTree, point: Point) -> Option<AreaId> {
        self.areas
            .values()
            .filter_map(|area| {
                tree.rect(area.node)
                    .filter(|rect| rect.contains(point))
                    .map(|rect| (area.id, rect.area()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// The pointer entered an area while dragging.
    ///
    /// Marks it as the target and evaluates its condition. Does not splice
    /// by itself; the next resolution pass does. Returns whether the target
    /// changed.
    pub fn enter_area(&mut self, tree: &dyn NodeTree, id: AreaId) -> ReorderResult<bool> {
        if !self.areas.contains_key(&id) {
            return Err(ReorderError::UnknownArea(id));
        }
        let Some(value) = self.session.reordering.as_ref() else {
            return Ok(false);
        };
        self.session.targeting.entered_area = true;
        if self.session.targeting.area == Some(id) {
            return Ok(false);
        }

        if let Some(previous) = self.session.targeting.area.and_then(|a| self.areas.get_mut(&a)) {
            previous.is_target = false;
        }
        let Some(area) = self.areas.get_mut(&id) else {
            return Err(ReorderError::UnknownArea(id));
        };
        let accepts = area.accepts(value);
        area.condition_attr = Some(accepts);
        area.is_target = true;
        self.session.targeting.area = Some(id);
        self.session.targeting.targetable = accepts && area.is_bound();
        self.session.targeting.trigger();
        self.remeasure(tree, &[id]);

        log::debug!("Entered area {:?} (accepts: {})", id, accepts);
        Ok(true)
    }

    /// Re-evaluate the targeted area's condition and binding.
    fn refresh_targetable(&mut self) {
        let Some(value) = self.session.reordering.as_ref() else {
            return;
        };
        let Some(area) = self.session.targeting.area.and_then(|a| self.areas.get_mut(&a)) else {
            return;
        };
        let accepts = area.accepts(value);
        area.condition_attr = Some(accepts);
        let targetable = accepts && area.is_bound();
        if targetable != self.session.targeting.targetable {
            log::debug!("Area {:?} targetable: {}", area.id, targetable);
            self.session.targeting.targetable = targetable;
            self.session.targeting.trigger();
        }
    }

    /// The measured item of the targeted area closest to the drag ghost.
    ///
    /// Equidistant candidates resolve to whichever is seen first; the
    /// iteration order of an area's membership is unspecified.
    pub fn nearest(&self) -> Option<ItemId> {
        let area = self.areas.get(&self.session.targeting.area?)?;
        let ghost = self.session.targeting.position;
        if !is_measured(&ghost) {
            return None;
        }
        let axis = self.axis_of(area);

        let mut closest: Option<(ItemId, f64)> = None;
        for id in area.items.values() {
            let Some(item) = self.items.get(id) else {
                continue;
            };
            if !is_measured(&item.position) {
                continue;
            }
            let distance = axis_distance(ghost.origin(), item.position.origin(), axis);
            if closest.is_none_or(|(_, best)| distance < best) {
                closest = Some((*id, distance));
            }
        }
        closest.map(|(id, _)| id)
    }

    fn axis_of(&self, area: &AreaRecord<T>) -> Option<Axis> {
        area.options.axis.or(self.config.default_axis)
    }

    /// Where the dragged value would go right now.
    pub fn resolve_target(&self) -> Option<Target> {
        let targeting = &self.session.targeting;
        if !targeting.targetable {
            return None;
        }
        let area_id = targeting.area?;
        let area = self.areas.get(&area_id)?;
        let array = area.array()?;

        if area.items.is_empty() {
            return Some(Target {
                area: area_id,
                index: 0,
                item: None,
                end_of_list: false,
            });
        }

        let id = self.nearest()?;
        let item = self.items.get(&id)?;
        let len = array.borrow().len();
        let ghost = targeting.position.center();
        let center = item.position.center();
        let past = match self.axis_of(area) {
            Some(Axis::X) => ghost.x > center.x,
            _ => ghost.y > center.y,
        };

        Some(Target {
            area: area_id,
            index: item.index,
            item: Some(id),
            end_of_list: targeting.entered_area && item.index + 1 == len && past,
        })
    }

    /// Resolve the target and commit at most one splice.
    pub fn resolve(&mut self) -> Option<Splice> {
        if self.session.committing || self.session.awaiting_layout {
            return None;
        }
        let value = self.session.reordering.as_ref()?;
        self.session.current.area?;
        let target = self.resolve_target()?;

        if let Some(id) = target.item {
            let item = self.items.get(&id)?;
            let last = self.session.last_splice;
            let at_last_splice = last.area == Some(target.area) && last.index == Some(target.index);
            if item.value == *value || at_last_splice {
                log::trace!("Target {:?} is the dragged item, skipping", id);
                return None;
            }
        }
        self.commit(target)
    }

    /// Remove the dragged value from where it last landed and insert it at
    /// the target.
    fn commit(&mut self, target: Target) -> Option<Splice> {
        let from_area = self.session.last_splice.area?;
        let index = target.insertion_index();
        if self.session.current.area == Some(target.area) && self.session.last_splice.index == Some(index) {
            return None;
        }
        let value = self.session.current.item.clone()?;
        let source = self.areas.get(&from_area)?.array()?;
        let dest = self.areas.get(&target.area)?.array()?;

        self.session.committing = true;
        let removed = {
            let mut source = source.borrow_mut();
            let current = self.session.current.index;
            let at = if source.get(current) == Some(&value) {
                Some(current)
            } else {
                source.iter().position(|v| *v == value)
            };
            at.map(|at| {
                source.remove(at);
                at
            })
        };
        let Some(from_index) = removed else {
            log::warn!("Dragged value missing from area {:?}, skipping splice", from_area);
            self.session.committing = false;
            return None;
        };
        let to_index = {
            let mut dest = dest.borrow_mut();
            let at = index.min(dest.len());
            dest.insert(at, value.clone());
            at
        };

        if from_area != target.area {
            self.move_membership(&value, from_area, target.area);
        }
        self.renumber(from_area);
        if from_area != target.area {
            self.renumber(target.area);
        }

        self.session.last_splice = LastSplice {
            area: Some(target.area),
            index: Some(to_index),
        };
        self.session.current.area = Some(target.area);
        self.session.current.index = to_index;
        self.session.committing = false;
        self.session.awaiting_layout = true;
        self.refresh_flags();

        log::debug!(
            "Spliced {:?}[{}] -> {:?}[{}]{}",
            from_area,
            from_index,
            target.area,
            to_index,
            if target.end_of_list { " (end of list)" } else { "" }
        );
        Some(Splice {
            from_area,
            from_index,
            to_area: target.area,
            to_index,
            end_of_list: target.end_of_list,
        })
    }

    /// Move the dragged record from one area's membership to another's.
    fn move_membership(&mut self, value: &T, from: AreaId, to: AreaId) {
        let id = self
            .areas
            .get_mut(&from)
            .and_then(|area| area.items.remove(value))
            .or(self.session.dragged);
        let Some(id) = id else {
            return;
        };
        let Some(dest) = self.areas.get_mut(&to) else {
            return;
        };
        if let Some(item) = self.items.get_mut(&id) {
            item.area = AreaLink::Resolved(Some(to));
            if let Some(list) = dest.list {
                item.list = list;
            }
        }
        dest.items.insert(value.clone(), id);
    }

    /// Re-derive every member's index from the collection order.
    fn renumber(&mut self, area_id: AreaId) {
        let Some(area) = self.areas.get(&area_id) else {
            return;
        };
        let Some(array) = area.array() else {
            return;
        };
        let array = array.borrow();
        let mut positions: HashMap<&T, usize> = HashMap::with_capacity(array.len());
        for (i, value) in array.iter().enumerate() {
            positions.entry(value).or_insert(i);
        }
        for (value, id) in &area.items {
            if let (Some(&index), Some(item)) = (positions.get(value), self.items.get_mut(id)) {
                item.index = index;
            }
        }
    }

    /// Recompute `positioning` and `dragged_is` on every item.
    fn refresh_flags(&mut self) {
        let session = &self.session;
        for item in self.items.values_mut() {
            let dragged = session.reordering.as_ref() == Some(&item.value);
            item.positioning = dragged;
            item.dragged_is = match (&session.reordering, session.current.area) {
                (Some(_), Some(area)) if !dragged && item.area() == Some(area) => {
                    if session.current.index + 1 == item.index {
                        Some(DraggedIs::Before)
                    } else if session.current.index == item.index + 1 {
                        Some(DraggedIs::After)
                    } else {
                        None
                    }
                }
                _ => None,
            };
        }
    }

    /// Pointer released. A clickable handle that never moved is a click;
    /// otherwise the drag ends.
    pub fn release(&mut self, now: Instant) -> ReleaseOutcome<T> {
        if let Some(press) = self.session.pending_press.take() {
            if let Some(item) = self.items.get_mut(&press.item) {
                if item.handle_options.cursor.is_none() {
                    item.click_cursor_until = Some(now + self.config.click_cursor_reset);
                }
            }
            return ReleaseOutcome::Click(press.item);
        }
        match self.stop() {
            Some(outcome) => ReleaseOutcome::Dropped(outcome),
            None => ReleaseOutcome::Idle,
        }
    }

    /// End the drag session and return to idle.
    ///
    /// Calls the targeted area's drop handler when the drag ends with the
    /// pointer inside an accepting area. `current` and `last_splice` keep their last values.
    pub fn stop(&mut self) -> Option<DropOutcome<T>> {
        self.session.pending_press = None;
        let value = self.session.reordering.take()?;
        self.session.ghost = None;

        let mut dropped = false;
        if self.session.targeting.targetable && self.session.targeting.entered_area {
            let target = self.session.targeting.area;
            if let Some(area) = target.and_then(|a| self.areas.get_mut(&a)) {
                dropped = area.drop_value(&value);
            }
        }

        for area in self.areas.values_mut() {
            area.is_target = false;
            area.is_origin = false;
            area.condition_attr = None;
        }
        self.session.targeting = Targeting::default();
        self.session.dragged = None;
        self.session.committing = false;
        self.session.awaiting_layout = false;
        self.refresh_flags();

        log::debug!(
            "Drag stopped at area {:?} index {} (dropped: {})",
            self.session.current.area,
            self.session.current.index,
            dropped
        );
        Some(DropOutcome {
            value,
            area: self.session.current.area,
            index: self.session.current.index,
            dropped,
        })
    }
}
