//! Reorder Core Library
//!
//! Platform-agnostic drag-and-drop reordering of caller-owned collections.
//! A host renderer registers areas, lists and items against a [`NodeTree`],
//! then forwards pointer and layout events to a [`Reorder`] engine.

pub mod area;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod item;
pub mod list;
pub mod observer;
pub mod session;
pub mod tree;

pub use area::{AreaId, AreaOptions, AreaRecord};
pub use config::{ObserverConfig, ReorderConfig};
pub use engine::Reorder;
pub use error::{ReorderError, ReorderResult};
pub use geometry::{Axis, UNMEASURED, axis_distance, distance, is_measured, rect_of, shared_ancestor};
pub use item::{AreaLink, DraggedIs, HandleOptions, ItemId, ItemRecord, ItemSnapshot};
pub use list::{Collection, ListBinding, ListId, ListOptions, ListRecord, collection};
pub use observer::MoveObserver;
pub use session::{
    Current, DragGhost, DragSession, DropOutcome, LastSplice, PressOutcome, ReleaseOutcome, Splice,
    Target, Targeting,
};
pub use tree::{MemoryTree, NodeId, NodeTree, ancestors};
