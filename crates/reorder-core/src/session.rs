//! Drag session state.

use crate::area::AreaId;
use crate::geometry::UNMEASURED;
use crate::item::{ItemId, ItemSnapshot};
use kurbo::{Point, Rect, Size, Vec2};

/// Logical location of the dragged value.
#[derive(Debug, Clone, PartialEq)]
pub struct Current<T> {
    pub area: Option<AreaId>,
    pub index: usize,
    pub item: Option<T>,
}

impl<T> Default for Current<T> {
    fn default() -> Self {
        Self {
            area: None,
            index: 0,
            item: None,
        }
    }
}

/// The most recently committed splice target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastSplice {
    pub area: Option<AreaId>,
    pub index: Option<usize>,
}

/// Where the drag currently points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targeting {
    /// Ghost rectangle in viewport coordinates.
    pub position: Rect,
    /// Flipped whenever geometry changes without a new pointer position.
    pub position_trigger: bool,
    /// The targeted area is bound and accepts the dragged value.
    pub targetable: bool,
    /// The pointer is inside the targeted area's bounds.
    pub entered_area: bool,
    /// The area whose `is_target` is set.
    pub area: Option<AreaId>,
}

impl Default for Targeting {
    fn default() -> Self {
        Self {
            position: UNMEASURED,
            position_trigger: true,
            targetable: false,
            entered_area: false,
            area: None,
        }
    }
}

impl Targeting {
    pub(crate) fn trigger(&mut self) {
        self.position_trigger = !self.position_trigger;
    }
}

/// Everything the floating ghost needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGhost<T> {
    pub value: T,
    pub item: ItemSnapshot<T>,
    /// Pointer position in viewport coordinates.
    pub screen_position: Point,
    /// Pointer offset from the dragged element's top-left corner.
    pub pointer_offset: Vec2,
    /// Size of the dragged element when the drag started.
    pub minimum_size: Size,
}

impl<T> DragGhost<T> {
    /// Where the ghost should be drawn.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.screen_position - self.pointer_offset, self.minimum_size)
    }
}

/// A press on a clickable handle that hasn't become a drag yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingPress {
    pub item: ItemId,
    pub origin: Point,
}

/// State of the single in-flight drag of one engine instance.
#[derive(Debug, Clone)]
pub struct DragSession<T> {
    pub(crate) current: Current<T>,
    pub(crate) last_splice: LastSplice,
    pub(crate) targeting: Targeting,
    pub(crate) reordering: Option<T>,
    pub(crate) dragged: Option<ItemId>,
    pub(crate) ghost: Option<DragGhost<T>>,
    /// Held while a splice and renumber are running.
    pub(crate) committing: bool,
    /// A splice happened; positions are stale until the next settle.
    pub(crate) awaiting_layout: bool,
    pub(crate) pending_press: Option<PendingPress>,
}

impl<T> Default for DragSession<T> {
    fn default() -> Self {
        Self {
            current: Current::default(),
            last_splice: LastSplice::default(),
            targeting: Targeting::default(),
            reordering: None,
            dragged: None,
            ghost: None,
            committing: false,
            awaiting_layout: false,
            pending_press: None,
        }
    }
}

impl<T> DragSession<T> {
    pub fn is_active(&self) -> bool {
        self.reordering.is_some()
    }

    pub fn current(&self) -> &Current<T> {
        &self.current
    }

    pub fn last_splice(&self) -> LastSplice {
        self.last_splice
    }

    pub fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    /// The value being dragged.
    pub fn reordering(&self) -> Option<&T> {
        self.reordering.as_ref()
    }

    /// The record the drag started from.
    pub fn dragged(&self) -> Option<ItemId> {
        self.dragged
    }

    pub fn ghost(&self) -> Option<&DragGhost<T>> {
        self.ghost.as_ref()
    }

    /// Whether splices are held until the next settle.
    pub fn is_awaiting_layout(&self) -> bool {
        self.awaiting_layout
    }
}

/// Result of a committed splice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splice {
    pub from_area: AreaId,
    pub from_index: usize,
    pub to_area: AreaId,
    pub to_index: usize,
    /// Inserted past the last item of the target area.
    pub end_of_list: bool,
}

/// Where nearest-item resolution points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub area: AreaId,
    pub index: usize,
    /// The nearest item, `None` for an empty area.
    pub item: Option<ItemId>,
    /// The pointer is past the last item; insert after it.
    pub end_of_list: bool,
}

impl Target {
    /// Index the dragged value will be inserted at.
    pub fn insertion_index(&self) -> usize {
        if self.end_of_list { self.index + 1 } else { self.index }
    }
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome<T> {
    pub value: T,
    /// Final committed location.
    pub area: Option<AreaId>,
    pub index: usize,
    /// Whether the target area's drop handler ran.
    pub dropped: bool,
}

/// What a handle press turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome<T> {
    /// The drag started immediately.
    Started(DragGhost<T>),
    /// Clickable handle: waiting for movement or release.
    Deferred,
}

/// What a pointer release turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome<T> {
    /// A drag ended.
    Dropped(DropOutcome<T>),
    /// A clickable handle was pressed and released without moving.
    Click(ItemId),
    /// Nothing was in progress.
    Idle,
}
