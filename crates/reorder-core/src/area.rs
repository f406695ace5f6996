//! Drop areas.

use crate::geometry::Axis;
use crate::item::ItemId;
use crate::list::{Collection, ListId};
use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Identity of an area record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub u64);

/// Acceptance predicate: may this value be dropped here?
pub type Condition<T> = Box<dyn Fn(&T) -> bool>;
/// Called with the dropped value when a drag ends over the area.
pub type DropHandler<T> = Box<dyn FnMut(&T)>;
/// Receives the area record whenever options are applied.
pub type AreaGetter<T> = Box<dyn FnMut(&AreaRecord<T>)>;

/// Options for an area.
pub struct AreaOptions<T> {
    /// Lock proximity measurement to one axis.
    pub axis: Option<Axis>,
    /// Space separated style classes.
    pub class: Option<String>,
    pub condition: Option<Condition<T>>,
    pub on_drop: Option<DropHandler<T>>,
    pub get: Option<AreaGetter<T>>,
}

impl<T> Default for AreaOptions<T> {
    fn default() -> Self {
        Self {
            axis: None,
            class: None,
            condition: None,
            on_drop: None,
            get: None,
        }
    }
}

impl<T> AreaOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Fn(&T) -> bool + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    pub fn with_on_drop(mut self, on_drop: impl FnMut(&T) + 'static) -> Self {
        self.on_drop = Some(Box::new(on_drop));
        self
    }

    pub fn with_get(mut self, get: impl FnMut(&AreaRecord<T>) + 'static) -> Self {
        self.get = Some(Box::new(get));
        self
    }
}

impl<T> fmt::Debug for AreaOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaOptions")
            .field("axis", &self.axis)
            .field("class", &self.class)
            .field("condition", &self.condition.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .field("get", &self.get.is_some())
            .finish()
    }
}

/// A drop zone bound to a backing collection.
pub struct AreaRecord<T> {
    pub(crate) id: AreaId,
    pub(crate) node: NodeId,
    pub(crate) options: AreaOptions<T>,
    pub(crate) classes: Vec<String>,
    pub(crate) is_target: bool,
    pub(crate) is_origin: bool,
    /// Membership: value to item record.
    pub(crate) items: HashMap<T, ItemId>,
    pub(crate) list: Option<ListId>,
    view: Option<Collection<T>>,
    splice: Option<Collection<T>>,
    /// Acceptance of the value being dragged, `None` while idle.
    pub(crate) condition_attr: Option<bool>,
}

impl<T: Eq + Hash> AreaRecord<T> {
    pub(crate) fn new(id: AreaId, node: NodeId, options: AreaOptions<T>) -> Self {
        let mut area = Self {
            id,
            node,
            options: AreaOptions::default(),
            classes: Vec::new(),
            is_target: false,
            is_origin: false,
            items: HashMap::new(),
            list: None,
            view: None,
            splice: None,
            condition_attr: None,
        };
        area.set_options(options);
        area
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    /// The container node this area is attached to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn options(&self) -> &AreaOptions<T> {
        &self.options
    }

    /// Classes from `options.class`, split on whitespace.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Is the dragged item over this area?
    pub fn is_target(&self) -> bool {
        self.is_target
    }

    /// Did the dragged item come from here?
    pub fn is_origin(&self) -> bool {
        self.is_origin
    }

    /// Member items keyed by value.
    pub fn items(&self) -> &HashMap<T, ItemId> {
        &self.items
    }

    pub fn item(&self, value: &T) -> Option<ItemId> {
        self.items.get(value).copied()
    }

    /// The list rendered inside this area.
    pub fn list(&self) -> Option<ListId> {
        self.list
    }

    /// The collection that receives splices: the modify collection if
    /// given, otherwise the rendered one.
    pub fn array(&self) -> Option<Collection<T>> {
        self.splice.as_ref().or(self.view.as_ref()).map(Rc::clone)
    }

    /// The rendered collection.
    pub fn view(&self) -> Option<Collection<T>> {
        self.view.as_ref().map(Rc::clone)
    }

    /// Whether a list has been bound to this area.
    pub fn is_bound(&self) -> bool {
        self.view.is_some()
    }

    /// Whether `value` may be dropped here.
    pub fn accepts(&self, value: &T) -> bool {
        self.options.condition.as_ref().is_none_or(|condition| condition(value))
    }

    /// Acceptance of the dragged value, for styling. `None` while idle.
    pub fn condition_attr(&self) -> Option<bool> {
        self.condition_attr
    }

    /// Whether the backing collection currently holds `value`.
    pub fn holds(&self, value: &T) -> bool {
        self.array().is_some_and(|array| array.borrow().contains(value))
    }

    pub(crate) fn bind(&mut self, list: ListId, view: Collection<T>, splice: Collection<T>) {
        self.list = Some(list);
        self.view = Some(view);
        self.splice = Some(splice);
    }

    pub(crate) fn unbind(&mut self) {
        self.list = None;
        self.view = None;
        self.splice = None;
    }

    /// Replace the options wholesale and hand the record to `get`.
    pub(crate) fn set_options(&mut self, options: AreaOptions<T>) {
        self.classes = options
            .class
            .as_deref()
            .map(|class| class.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        self.options = options;
        if let Some(mut get) = self.options.get.take() {
            get(self);
            self.options.get = Some(get);
        }
    }

    /// Run the drop handler, if any.
    pub(crate) fn drop_value(&mut self, value: &T) -> bool {
        match self.options.on_drop.as_mut() {
            Some(on_drop) => {
                on_drop(value);
                true
            }
            None => false,
        }
    }
}

impl<T> fmt::Debug for AreaRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaRecord")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("options", &self.options)
            .field("is_target", &self.is_target)
            .field("is_origin", &self.is_origin)
            .field("items", &self.items.len())
            .field("list", &self.list)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::collection;
    use std::cell::Cell;

    #[test]
    fn test_classes_split() {
        let area: AreaRecord<u32> = AreaRecord::new(
            AreaId(1),
            NodeId(1),
            AreaOptions::new().with_class("  column  done "),
        );
        assert_eq!(area.classes(), &["column".to_string(), "done".to_string()]);
    }

    #[test]
    fn test_accepts_without_condition() {
        let area: AreaRecord<u32> = AreaRecord::new(AreaId(1), NodeId(1), AreaOptions::new());
        assert!(area.accepts(&7));
    }

    #[test]
    fn test_accepts_with_condition() {
        let area: AreaRecord<u32> = AreaRecord::new(
            AreaId(1),
            NodeId(1),
            AreaOptions::new().with_condition(|v: &u32| v % 2 == 0),
        );
        assert!(area.accepts(&2));
        assert!(!area.accepts(&3));
    }

    #[test]
    fn test_array_prefers_splice() {
        let mut area: AreaRecord<u32> = AreaRecord::new(AreaId(1), NodeId(1), AreaOptions::new());
        assert!(area.array().is_none());
        assert!(!area.is_bound());

        let view = collection([2, 3]);
        let full = collection([1, 2, 3]);
        area.bind(ListId(1), Rc::clone(&view), Rc::clone(&full));
        assert!(Rc::ptr_eq(&area.array().unwrap(), &full));
        assert!(Rc::ptr_eq(&area.view().unwrap(), &view));
        assert!(area.holds(&1));

        area.unbind();
        assert!(area.array().is_none());
    }

    #[test]
    fn test_get_called_on_options() {
        let seen = Rc::new(Cell::new(None));
        let seen_in = Rc::clone(&seen);
        let area: AreaRecord<u32> = AreaRecord::new(
            AreaId(9),
            NodeId(1),
            AreaOptions::new().with_get(move |area: &AreaRecord<u32>| seen_in.set(Some(area.id()))),
        );
        assert_eq!(seen.get(), Some(AreaId(9)));
        assert!(area.options().get.is_some());
    }
}
