//! Drag-and-drop reordering of services and portfolio items.
//!
//! A drop is expressed as "move `active` to where `over` currently sits".
//! The plan lists only rows whose stored `display_order` differs from their
//! new index, so applying it leaves orders exactly `0..n-1`.

use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{PortfolioItem, Service};

/// A row with a persisted position among its siblings.
pub trait Ordered {
    fn id(&self) -> Uuid;
    fn display_order(&self) -> i32;
    fn set_display_order(&mut self, order: i32);
}

impl Ordered for Service {
    fn id(&self) -> Uuid {
        self.id
    }
    fn display_order(&self) -> i32 {
        self.display_order
    }
    fn set_display_order(&mut self, order: i32) {
        self.display_order = order;
    }
}

impl Ordered for PortfolioItem {
    fn id(&self) -> Uuid {
        self.id
    }
    fn display_order(&self) -> i32 {
        self.display_order
    }
    fn set_display_order(&mut self, order: i32) {
        self.display_order = order;
    }
}

/// New position for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderChange {
    pub id: Uuid,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderPlan {
    /// Ids in their new visual order.
    pub order: Vec<Uuid>,
    /// Writes needed to persist `order`.
    pub changes: Vec<OrderChange>,
}

impl ReorderPlan {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Removes the element at `from` and re-inserts it at `to`.
/// Out-of-range indices leave the list untouched.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Rows (given in their new order) whose stored position must change.
pub fn order_changes<T: Ordered>(items: &[&T]) -> Vec<OrderChange> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let position = i32::try_from(index).ok()?;
            (item.display_order() != position).then(|| OrderChange {
                id: item.id(),
                display_order: position,
            })
        })
        .collect()
}

/// Plans the drop of `active` onto `over` for a list sorted by display order.
///
/// Returns `None` when either id is not in the list. Dropping an item on
/// itself yields an empty plan.
pub fn plan_move<T: Ordered>(items: &[T], active: Uuid, over: Uuid) -> Option<ReorderPlan> {
    let from = items.iter().position(|item| item.id() == active)?;
    let to = items.iter().position(|item| item.id() == over)?;

    let mut reordered: Vec<&T> = items.iter().collect();
    if from == to {
        return Some(ReorderPlan {
            order: reordered.iter().map(|item| item.id()).collect(),
            changes: Vec::new(),
        });
    }

    move_item(&mut reordered, from, to);

    Some(ReorderPlan {
        order: reordered.iter().map(|item| item.id()).collect(),
        changes: order_changes(&reordered),
    })
}

/// Rearranges `items` into the plan's order and records the planned
/// positions on them, mirroring what the database holds afterwards.
pub fn arrange<T: Ordered>(mut items: Vec<T>, plan: &ReorderPlan) -> Vec<T> {
    let mut arranged = Vec::with_capacity(items.len());
    for id in &plan.order {
        if let Some(index) = items.iter().position(|item| item.id() == *id) {
            arranged.push(items.remove(index));
        }
    }
    arranged.append(&mut items);

    for change in &plan.changes {
        if let Some(item) = arranged.iter_mut().find(|item| item.id() == change.id) {
            item.set_display_order(change.display_order);
        }
    }
    arranged
}

/// Position for a row appended by an admin "Add" action.
pub fn next_display_order(existing_rows: i64) -> i32 {
    i32::try_from(existing_rows).unwrap_or(i32::MAX)
}
