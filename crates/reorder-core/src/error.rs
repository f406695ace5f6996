//! Error types for the reorder engine.

use crate::area::AreaId;
use crate::item::ItemId;
use crate::list::ListId;
use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Binding errors are wiring mistakes in the host and are terminal for the
/// attachment that caused them. Geometry problems never show up here; they
/// degrade to unmeasured positions instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("List already rendered inside area {area:?}")]
    ListAlreadyBound { area: AreaId, list: ListId },
    #[error("List {list:?} is not inside an area")]
    ListOutsideArea { list: ListId },
    #[error("Unknown area: {0:?}")]
    UnknownArea(AreaId),
    #[error("Unknown item: {0:?}")]
    UnknownItem(ItemId),
    #[error("Unknown list: {0:?}")]
    UnknownList(ListId),
    #[error("Item {0:?} is not inside an area")]
    Unattached(ItemId),
    #[error("A drag is already in progress")]
    AlreadyDragging,
}

/// Result type for engine operations.
pub type ReorderResult<T> = Result<T, ReorderError>;
