//! End-to-end drag scenarios against an in-memory node tree.

use kurbo::{Point, Rect};
use reorder_core::{
    AreaId, AreaOptions, HandleOptions, ItemId, ListId, ListOptions, MemoryTree, NodeId, Reorder,
    ReleaseOutcome, collection, Collection,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

const ROW: f64 = 20.0;
const WIDTH: f64 = 200.0;

struct Column {
    node: NodeId,
    area: AreaId,
    list: ListId,
    values: Collection<u32>,
    origin: Point,
}

/// A host that lays every column out as a vertical stack of rows.
struct Board {
    tree: MemoryTree,
    engine: Reorder<u32>,
    columns: Vec<Column>,
    /// One handle node per value, reparented as values move.
    handles: HashMap<u32, NodeId>,
}

impl Board {
    fn new() -> Self {
        Self {
            tree: MemoryTree::new(Rect::new(0.0, 0.0, 1000.0, 800.0)),
            engine: Reorder::new(),
            columns: Vec::new(),
            handles: HashMap::new(),
        }
    }

    fn column(&mut self, x: f64, values: &[u32], options: AreaOptions<u32>) -> usize {
        let origin = Point::new(x, 0.0);
        let node = self.tree.insert(None, Rect::new(x, 0.0, x + WIDTH, 400.0));
        let anchor = self.tree.insert(Some(node), Rect::ZERO);
        let area = self.engine.attach_area(node, options);
        let values = collection(values.iter().copied());
        let list = self.engine.render_list(anchor, ListOptions::new(Rc::clone(&values)));
        self.columns.push(Column {
            node,
            area,
            list,
            values,
            origin,
        });
        self.columns.len() - 1
    }

    /// Re-render every column from its collection, then settle.
    fn render(&mut self) {
        for column in &self.columns {
            let values: Vec<u32> = column.values.borrow().clone();
            for (i, value) in values.into_iter().enumerate() {
                let rect = Rect::new(
                    column.origin.x,
                    i as f64 * ROW,
                    column.origin.x + WIDTH,
                    (i + 1) as f64 * ROW,
                );
                let node = *self
                    .handles
                    .entry(value)
                    .or_insert_with(|| self.tree.insert(Some(column.node), rect));
                self.tree.set_parent(node, Some(column.node));
                self.tree.set_rect(node, rect);

                let id = self.engine.attach_item(column.list, value, i).unwrap();
                self.engine
                    .attach_item_handle(&self.tree, id, node, HandleOptions::default())
                    .unwrap();
            }
        }
        self.engine.settle(&self.tree).unwrap();
    }

    fn item(&self, column: usize, value: u32) -> ItemId {
        self.engine
            .area(self.columns[column].area)
            .and_then(|area| area.item(&value))
            .unwrap()
    }

    fn values(&self, column: usize) -> Vec<u32> {
        self.columns[column].values.borrow().clone()
    }

    /// Press the centre-left of a value's row.
    fn grab(&mut self, column: usize, value: u32) {
        let id = self.item(column, value);
        let rect = self.engine.item(id).unwrap().position();
        let point = Point::new(rect.x0 + 10.0, rect.y0 + 10.0);
        self.engine.start_drag(&self.tree, id, point).unwrap();
    }

    /// Every value in a collection has exactly one record, at its position.
    fn assert_consistent(&self) {
        for column in &self.columns {
            let area = self.engine.area(column.area).unwrap();
            let values = column.values.borrow();
            let keys: HashSet<u32> = area.items().keys().copied().collect();
            let present: HashSet<u32> = values.iter().copied().collect();
            assert_eq!(keys, present, "membership of {:?}", column.area);
            for (i, value) in values.iter().enumerate() {
                let item = self.engine.item(area.item(value).unwrap()).unwrap();
                assert_eq!(item.index(), i, "index of {value}");
                assert_eq!(item.area(), Some(column.area));
            }
        }
    }
}

#[test]
fn test_reorder_within_one_area() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();

    board.grab(a, 2);
    let splice = board.engine.pointer_move(&board.tree, Point::new(10.0, 45.0)).unwrap();
    assert_eq!((splice.from_index, splice.to_index), (1, 2));
    assert_eq!(board.values(a), vec![1, 3, 2]);

    // Held until layout settles.
    assert!(board.engine.session().is_awaiting_layout());
    assert!(board.engine.pointer_move(&board.tree, Point::new(10.0, 46.0)).is_none());
    board.render();
    board.assert_consistent();

    match board.engine.release(Instant::now()) {
        ReleaseOutcome::Dropped(outcome) => {
            assert_eq!(outcome.value, 2);
            assert_eq!(outcome.area, Some(board.columns[a].area));
            assert_eq!(outcome.index, 2);
        }
        other => panic!("unexpected release outcome: {other:?}"),
    }
    assert!(!board.engine.is_dragging());
}

#[test]
fn test_settled_position_is_a_fixed_point() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();

    board.grab(a, 2);
    board.engine.pointer_move(&board.tree, Point::new(10.0, 45.0)).unwrap();
    board.render();

    // The dragged row now sits under the ghost; nothing else happens.
    for _ in 0..3 {
        assert!(board.engine.resolve().is_none());
        assert!(board.engine.pointer_move(&board.tree, Point::new(10.0, 45.0)).is_none());
        board.render();
    }
    assert_eq!(board.values(a), vec![1, 3, 2]);
}

#[test]
fn test_hovering_own_slot_does_not_splice() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();

    board.grab(a, 2);
    assert!(board.engine.pointer_move(&board.tree, Point::new(10.0, 32.0)).is_none());
    board.render();
    assert_eq!(board.values(a), vec![1, 2, 3]);
    assert!(board.engine.session().targeting().area.is_some());
}

#[test]
fn test_end_of_list_insertion() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();

    board.grab(a, 1);
    // Ghost centre (y = 62) is past the last row's centre (y = 50).
    let splice = board.engine.pointer_move(&board.tree, Point::new(10.0, 62.0)).unwrap();
    assert!(splice.end_of_list);
    assert_eq!(board.values(a), vec![2, 3, 1]);
    board.render();
    board.assert_consistent();
}

#[test]
fn test_move_into_empty_area() {
    let mut board = Board::new();
    let dropped = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&dropped);
    let a = board.column(0.0, &[1, 2], AreaOptions::new());
    let b = board.column(
        300.0,
        &[],
        AreaOptions::new().with_on_drop(move |value: &u32| log.borrow_mut().push(*value)),
    );
    board.render();

    board.grab(a, 1);
    let splice = board.engine.pointer_move(&board.tree, Point::new(310.0, 10.0)).unwrap();
    assert_eq!(splice.from_area, board.columns[a].area);
    assert_eq!(splice.to_area, board.columns[b].area);
    assert_eq!(splice.to_index, 0);
    assert_eq!(board.values(a), vec![2]);
    assert_eq!(board.values(b), vec![1]);
    assert!(board.engine.area(board.columns[a].area).unwrap().item(&1).is_none());
    assert!(board.engine.area(board.columns[b].area).unwrap().item(&1).is_some());

    board.render();
    board.assert_consistent();
    assert_eq!(
        board.engine.session().current().area,
        Some(board.columns[b].area)
    );

    let outcome = board.engine.stop().unwrap();
    assert!(outcome.dropped);
    assert_eq!(*dropped.borrow(), vec![1]);
}

#[test]
fn test_move_to_end_of_other_area() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    let b = board.column(300.0, &[4], AreaOptions::new());
    board.render();

    board.grab(a, 2);
    board.engine.pointer_move(&board.tree, Point::new(310.0, 35.0)).unwrap();
    assert_eq!(board.values(a), vec![1, 3]);
    assert_eq!(board.values(b), vec![4, 2]);
    board.render();
    board.assert_consistent();

    // And back again.
    board.engine.pointer_move(&board.tree, Point::new(10.0, 5.0)).unwrap();
    assert_eq!(board.values(a), vec![2, 1, 3]);
    assert_eq!(board.values(b), vec![4]);
    board.render();
    board.assert_consistent();
    board.engine.stop();
    board.assert_consistent();
}

#[test]
fn test_release_without_target() {
    let mut board = Board::new();
    let dropped = Rc::new(RefCell::new(0));
    let count = Rc::clone(&dropped);
    let a = board.column(
        0.0,
        &[1, 2, 3],
        AreaOptions::new().with_on_drop(move |_: &u32| *count.borrow_mut() += 1),
    );
    board.render();

    board.grab(a, 2);
    let outcome = board.engine.stop().unwrap();
    assert!(!outcome.dropped);
    assert_eq!(outcome.area, Some(board.columns[a].area));
    assert_eq!(outcome.index, 1);
    assert_eq!(*dropped.borrow(), 0);
    assert_eq!(board.values(a), vec![1, 2, 3]);
}

#[test]
fn test_rejected_area_is_targeted_but_not_spliced() {
    let mut board = Board::new();
    let dropped = Rc::new(RefCell::new(0));
    let count = Rc::clone(&dropped);
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    let b = board.column(
        300.0,
        &[4, 5],
        AreaOptions::new()
            .with_condition(|value: &u32| *value != 1)
            .with_on_drop(move |_: &u32| *count.borrow_mut() += 1),
    );
    board.render();

    board.grab(a, 1);
    assert!(board.engine.pointer_move(&board.tree, Point::new(310.0, 10.0)).is_none());
    let area = board.engine.area(board.columns[b].area).unwrap();
    assert!(area.is_target());
    assert_eq!(area.condition_attr(), Some(false));
    assert!(!board.engine.session().targeting().targetable);

    board.engine.stop();
    assert_eq!(*dropped.borrow(), 0);
    assert_eq!(board.values(a), vec![1, 2, 3]);
    assert_eq!(board.values(b), vec![4, 5]);
}

#[test]
fn test_leaving_areas_keeps_last_target() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();

    board.grab(a, 3);
    board.engine.pointer_move(&board.tree, Point::new(10.0, 50.0));
    assert!(board.engine.pointer_move(&board.tree, Point::new(600.0, 700.0)).is_none());
    let targeting = board.engine.session().targeting();
    assert!(!targeting.entered_area);
    assert_eq!(targeting.area, Some(board.columns[a].area));
    assert_eq!(board.values(a), vec![1, 2, 3]);
}

#[test]
fn test_release_outside_every_area_skips_on_drop() {
    let mut board = Board::new();
    let dropped = Rc::new(RefCell::new(0));
    let count = Rc::clone(&dropped);
    let a = board.column(
        0.0,
        &[1, 2, 3],
        AreaOptions::new().with_on_drop(move |_: &u32| *count.borrow_mut() += 1),
    );
    board.render();

    board.grab(a, 3);
    board.engine.pointer_move(&board.tree, Point::new(10.0, 50.0));
    board.engine.pointer_move(&board.tree, Point::new(600.0, 700.0));
    assert!(board.engine.area(board.columns[a].area).unwrap().is_target());

    let outcome = board.engine.stop().unwrap();
    assert!(!outcome.dropped);
    assert_eq!(*dropped.borrow(), 0);

    // Released back inside the area, the handler runs.
    board.grab(a, 3);
    board.engine.pointer_move(&board.tree, Point::new(600.0, 700.0));
    board.engine.pointer_move(&board.tree, Point::new(10.0, 50.0));
    let outcome = board.engine.stop().unwrap();
    assert!(outcome.dropped);
    assert_eq!(*dropped.borrow(), 1);
}

#[test]
fn test_area_binding_late_becomes_targetable() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2], AreaOptions::new());
    board.render();

    board.grab(a, 1);
    // Registered mid-drag; its list binds on the next settle.
    let b = board.column(300.0, &[], AreaOptions::new());
    assert!(board.engine.pointer_move(&board.tree, Point::new(310.0, 10.0)).is_none());
    assert!(!board.engine.session().targeting().targetable);

    board.render();
    assert!(board.engine.session().targeting().targetable);
    assert_eq!(board.values(a), vec![2]);
    assert_eq!(board.values(b), vec![1]);
}

#[test]
fn test_position_changes_resolve_while_dragging() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    board.render();
    let now = Instant::now();

    // Not dragging: moves are ignored.
    let three = board.item(a, 3);
    board.tree.set_rect(board.handles[&3], Rect::new(0.0, 45.0, WIDTH, 65.0));
    assert!(board.engine.poll_positions(&board.tree, now).is_none());
    assert_eq!(board.engine.item(three).unwrap().position().y0, 40.0);
    board.tree.set_rect(board.handles[&3], Rect::new(0.0, 40.0, WIDTH, 60.0));
    board.engine.poll_positions(&board.tree, now);

    board.grab(a, 1);
    assert!(board.engine.pointer_move(&board.tree, Point::new(10.0, 12.0)).is_none());
    board.engine.poll_positions(&board.tree, now);

    // Row 3 slides under the ghost without the pointer moving.
    board.tree.set_rect(board.handles[&3], Rect::new(0.0, 1.0, WIDTH, 21.0));
    let splice = board.engine.poll_positions(&board.tree, now).unwrap();
    assert_eq!(splice.from_index, 0);
    assert_eq!(board.engine.item(three).unwrap().position().y0, 1.0);
    assert_ne!(board.values(a)[0], 1);
}

#[test]
fn test_detach_area_mid_drag() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2], AreaOptions::new());
    let b = board.column(300.0, &[3], AreaOptions::new());
    board.render();

    board.grab(a, 1);
    board.engine.pointer_move(&board.tree, Point::new(310.0, 5.0));
    board.render();
    assert_eq!(board.values(b), vec![1, 3]);

    // Area b now holds the dragged value, so removing it ends the drag.
    let node = board.columns[b].node;
    board.engine.detach_area(node);
    assert!(board.engine.session().targeting().area.is_none());
    assert!(!board.engine.is_dragging());
    assert!(board.engine.stop().is_none());

    // The remaining area still reorders.
    board.columns.remove(b);
    board.grab(a, 2);
    assert!(board.engine.is_dragging());
}

#[test]
fn test_detach_target_area_keeps_dragging() {
    let mut board = Board::new();
    let a = board.column(0.0, &[1, 2, 3], AreaOptions::new());
    let b = board.column(
        300.0,
        &[4],
        AreaOptions::new().with_condition(|value: &u32| *value > 3),
    );
    board.render();

    board.grab(a, 1);
    assert!(board.engine.pointer_move(&board.tree, Point::new(310.0, 5.0)).is_none());
    let node = board.columns[b].node;
    board.engine.detach_area(node);
    assert!(board.engine.is_dragging());
    board.columns.remove(b);

    let splice = board.engine.pointer_move(&board.tree, Point::new(10.0, 45.0)).unwrap();
    assert_eq!((splice.from_index, splice.to_index), (0, 2));
    assert_eq!(board.values(a), vec![2, 3, 1]);
    board.render();
    board.assert_consistent();
}
