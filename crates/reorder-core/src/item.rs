//! Per-item records.

use crate::area::AreaId;
use crate::geometry::{UNMEASURED, rect_of};
use crate::list::ListId;
use crate::observer::MoveObserver;
use crate::tree::{NodeId, NodeTree};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Identity of an item record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Where the dragged value sits relative to an item in the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraggedIs {
    Before,
    After,
}

/// Options for the element that starts a drag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleOptions {
    /// Let a press without movement through as a click.
    pub clickable: bool,
    /// Cursor to show over the handle. Defaults to `grab`.
    pub cursor: Option<String>,
}

/// Owning area, resolved lazily by tree ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaLink {
    /// Resolve on the next settle.
    Pending,
    /// Resolved; `None` means the item is outside any area and inert.
    Resolved(Option<AreaId>),
}

/// Immutable copy of an item handed to the drag ghost renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot<T> {
    pub value: T,
    pub index: usize,
    pub area: Option<AreaId>,
    pub position: Rect,
    pub dragging: bool,
}

/// State of one rendered collection element.
#[derive(Debug)]
pub struct ItemRecord<T> {
    pub(crate) id: ItemId,
    pub(crate) value: T,
    pub(crate) list: ListId,
    pub(crate) area: AreaLink,
    pub(crate) index: usize,
    pub(crate) position: Rect,
    pub(crate) dragging: bool,
    pub(crate) positioning: bool,
    pub(crate) dragged_is: Option<DraggedIs>,
    pub(crate) anchor: Option<NodeId>,
    pub(crate) handle: Option<NodeId>,
    pub(crate) handle_options: HandleOptions,
    pub(crate) tracker: Option<MoveObserver>,
    /// Until when a clicked handle reports the pointer cursor.
    pub(crate) click_cursor_until: Option<Instant>,
}

impl<T: Clone> ItemRecord<T> {
    pub(crate) fn new(id: ItemId, value: T, list: ListId, area: AreaLink, index: usize) -> Self {
        Self {
            id,
            value,
            list,
            area,
            index,
            position: UNMEASURED,
            dragging: false,
            positioning: false,
            dragged_is: None,
            anchor: None,
            handle: None,
            handle_options: HandleOptions::default(),
            tracker: None,
            click_cursor_until: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// The list that rendered this item.
    pub fn list(&self) -> ListId {
        self.list
    }

    /// Owning area. `None` while pending or when outside any area.
    pub fn area(&self) -> Option<AreaId> {
        match self.area {
            AreaLink::Resolved(area) => area,
            AreaLink::Pending => None,
        }
    }

    pub fn area_link(&self) -> AreaLink {
        self.area
    }

    /// Position within the owning area's spliced collection.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Last measured rectangle; NaN fields mean not measured yet.
    pub fn position(&self) -> Rect {
        self.position
    }

    /// Is this the live placeholder of the dragged value?
    pub fn is_positioning(&self) -> bool {
        self.positioning
    }

    /// Is this the floating copy? Only snapshots handed to the ghost are.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn dragged_is(&self) -> Option<DraggedIs> {
        self.dragged_is
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    pub fn handle(&self) -> Option<NodeId> {
        self.handle
    }

    pub fn handle_options(&self) -> &HandleOptions {
        &self.handle_options
    }

    /// The node used for proximity measurement: the anchor, else the handle.
    pub fn measured_node(&self) -> Option<NodeId> {
        self.anchor.or(self.handle)
    }

    /// Re-measure synchronously and return the new position.
    pub fn update_position(&mut self, tree: &dyn NodeTree) -> Rect {
        self.position = rect_of(tree, self.measured_node());
        self.position
    }

    /// Copy for the drag ghost.
    pub fn snapshot(&self) -> ItemSnapshot<T> {
        ItemSnapshot {
            value: self.value.clone(),
            index: self.index,
            area: self.area(),
            position: self.position,
            dragging: true,
        }
    }

    /// Restart position tracking if the measured node changed.
    pub(crate) fn retrack(&mut self, tree: &dyn NodeTree, config: &crate::config::ObserverConfig) {
        let node = self.measured_node();
        if self.tracker.as_ref().map(MoveObserver::node) == node {
            return;
        }
        if let Some(mut tracker) = self.tracker.take() {
            tracker.cancel();
        }
        if let Some(node) = node {
            self.tracker = Some(MoveObserver::observe(tree, node, config, true));
        }
        self.update_position(tree);
    }

    pub(crate) fn stop_tracking(&mut self) {
        if let Some(mut tracker) = self.tracker.take() {
            tracker.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObserverConfig;
    use crate::geometry::is_measured;
    use crate::tree::MemoryTree;

    fn record() -> ItemRecord<&'static str> {
        ItemRecord::new(ItemId(1), "a", ListId(1), AreaLink::Pending, 3)
    }

    #[test]
    fn test_new_is_unmeasured() {
        let item = record();
        assert!(!is_measured(&item.position()));
        assert_eq!(item.area(), None);
        assert_eq!(item.index(), 3);
    }

    #[test]
    fn test_anchor_defaults_to_handle() {
        let mut item = record();
        item.handle = Some(NodeId(5));
        assert_eq!(item.measured_node(), Some(NodeId(5)));
        item.anchor = Some(NodeId(6));
        assert_eq!(item.measured_node(), Some(NodeId(6)));
    }

    #[test]
    fn test_retrack_measures() {
        let mut tree = MemoryTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let node = tree.insert(None, Rect::new(1.0, 2.0, 11.0, 12.0));
        let mut item = record();
        item.anchor = Some(node);
        item.retrack(&tree, &ObserverConfig::default());
        assert_eq!(item.position(), Rect::new(1.0, 2.0, 11.0, 12.0));
        assert_eq!(item.tracker.as_ref().map(MoveObserver::node), Some(node));

        item.anchor = None;
        item.retrack(&tree, &ObserverConfig::default());
        assert!(item.tracker.is_none());
        assert!(!is_measured(&item.position()));
    }

    #[test]
    fn test_snapshot_is_dragging() {
        let item = record();
        let snapshot = item.snapshot();
        assert!(snapshot.dragging);
        assert_eq!(snapshot.value, "a");
        assert_eq!(snapshot.index, 3);
    }
}
