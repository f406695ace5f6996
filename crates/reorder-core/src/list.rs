//! Backing collections and list bindings.

use crate::area::AreaId;
use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// A caller-owned ordered collection the engine splices in place.
pub type Collection<T> = Rc<RefCell<Vec<T>>>;

/// Wrap values into a new [`Collection`].
pub fn collection<T>(values: impl IntoIterator<Item = T>) -> Collection<T> {
    Rc::new(RefCell::new(values.into_iter().collect()))
}

/// Identity of a rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListId(pub u64);

/// What a renderer passes when it lists a collection inside an area.
#[derive(Debug)]
pub struct ListOptions<T> {
    /// The collection being rendered.
    pub view: Collection<T>,
    /// Offset of `view[0]` inside the spliced collection, for partial views.
    pub start_index: usize,
    /// The collection that receives splices. Defaults to `view`.
    pub modify: Option<Collection<T>>,
}

impl<T> ListOptions<T> {
    pub fn new(view: Collection<T>) -> Self {
        Self {
            view,
            start_index: 0,
            modify: None,
        }
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_modify(mut self, modify: Collection<T>) -> Self {
        self.modify = Some(modify);
        self
    }

    /// The collection splices are applied to.
    pub fn splice(&self) -> &Collection<T> {
        self.modify.as_ref().unwrap_or(&self.view)
    }
}

impl<T> Clone for ListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            view: Rc::clone(&self.view),
            start_index: self.start_index,
            modify: self.modify.clone(),
        }
    }
}

/// Where a list stands in resolving its owning area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBinding {
    /// Waiting for the next settle to walk the anchor's ancestors.
    Pending,
    /// Bound to an area.
    Bound(AreaId),
    /// Resolution failed; the list stays inert.
    Failed,
}

/// A list registered by a renderer.
#[derive(Debug)]
pub struct ListRecord<T> {
    pub(crate) id: ListId,
    pub(crate) anchor: NodeId,
    pub(crate) options: ListOptions<T>,
    pub(crate) binding: ListBinding,
}

impl<T> ListRecord<T> {
    pub fn id(&self) -> ListId {
        self.id
    }

    /// The node the list was rendered at.
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn options(&self) -> &ListOptions<T> {
        &self.options
    }

    pub fn binding(&self) -> ListBinding {
        self.binding
    }

    /// The bound area, if resolution succeeded.
    pub fn area(&self) -> Option<AreaId> {
        match self.binding {
            ListBinding::Bound(area) => Some(area),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_defaults_to_view() {
        let view = collection([1, 2, 3]);
        let options = ListOptions::new(Rc::clone(&view));
        assert!(Rc::ptr_eq(options.splice(), &view));
    }

    #[test]
    fn test_splice_prefers_modify() {
        let view = collection([2, 3]);
        let full = collection([1, 2, 3]);
        let options = ListOptions::new(view).with_start_index(1).with_modify(Rc::clone(&full));
        assert!(Rc::ptr_eq(options.splice(), &full));
        assert_eq!(options.start_index, 1);
    }
}
