//! Dense ordinal planning for progress markers.
//!
//! Markers of one boundary partner carry `order_number`s that must always be
//! exactly `{1..N}`. This module computes the updates needed to keep that
//! invariant under moves, appends and removals. It never touches storage: the
//! caller executes a [`Plan`] against its store, and must do so atomically
//! (`om-db` wraps every plan in one immediate transaction).
//!
//! ```text
//! move 4 -> 2 (earlier):  shift [2..=3] by +1, set moved = 2
//! move 2 -> 4 (later):    shift [3..=4] by -1, set moved = 4
//! remove 2 of 5:          shift [3..=5] by -1
//! ```

use crate::errors::CoreError;

/// One step of a plan, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderUpdate {
    /// Add `delta` to every sibling whose order lies in `from..=to`.
    Shift { from: u32, to: u32, delta: i32 },
    /// Give the moved item its new order.
    Set { order: u32 },
}

impl OrderUpdate {
    /// Whether this step touches the item currently at `order`.
    #[must_use]
    pub const fn covers(&self, order: u32) -> bool {
        match *self {
            Self::Shift { from, to, .. } => from <= order && order <= to,
            Self::Set { .. } => false,
        }
    }
}

/// Ordered list of updates for one parent scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Parent scope (boundary partner id) the updates are limited to.
    pub scope: String,
    /// Order of the moved item before the plan runs. `None` for removals.
    pub moved_from: Option<u32>,
    pub updates: Vec<OrderUpdate>,
}

impl Plan {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }

    /// Apply the plan to an in-memory list of `(item, order)` pairs.
    ///
    /// The moved item is the one holding `moved_from` before any step runs.
    pub fn apply<K>(&self, items: &mut [(K, u32)]) {
        let moved = self
            .moved_from
            .and_then(|from| items.iter().position(|(_, order)| *order == from));

        for update in &self.updates {
            match *update {
                OrderUpdate::Shift { delta, .. } => {
                    for (idx, (_, order)) in items.iter_mut().enumerate() {
                        if Some(idx) != moved && update.covers(*order) {
                            *order = order.saturating_add_signed(delta);
                        }
                    }
                }
                OrderUpdate::Set { order } => {
                    if let Some(idx) = moved {
                        items[idx].1 = order;
                    }
                }
            }
        }
    }
}

fn check_position(name: &str, order: u32, len: u32) -> Result<(), CoreError> {
    if order == 0 || order > len {
        return Err(CoreError::Validation(format!(
            "{name} order {order} is outside 1..={len}"
        )));
    }
    Ok(())
}

/// Plan moving the item at `current` to `target` within a scope of `len` items.
///
/// `current == target` yields an empty plan: nothing is written.
///
/// # Errors
///
/// Returns `CoreError::Validation` if either position is outside `1..=len`.
pub fn plan_move(scope: &str, current: u32, target: u32, len: u32) -> Result<Plan, CoreError> {
    check_position("current", current, len)?;
    check_position("target", target, len)?;

    let updates = match target.cmp(&current) {
        std::cmp::Ordering::Equal => Vec::new(),
        std::cmp::Ordering::Less => vec![
            OrderUpdate::Shift {
                from: target,
                to: current - 1,
                delta: 1,
            },
            OrderUpdate::Set { order: target },
        ],
        std::cmp::Ordering::Greater => vec![
            OrderUpdate::Shift {
                from: current + 1,
                to: target,
                delta: -1,
            },
            OrderUpdate::Set { order: target },
        ],
    };

    Ok(Plan {
        scope: scope.to_string(),
        moved_from: Some(current),
        updates,
    })
}

/// Plan closing the gap left by removing the item at `removed` from a scope of `len` items.
///
/// # Errors
///
/// Returns `CoreError::Validation` if `removed` is outside `1..=len`.
pub fn plan_remove(scope: &str, removed: u32, len: u32) -> Result<Plan, CoreError> {
    check_position("removed", removed, len)?;

    let updates = if removed == len {
        Vec::new()
    } else {
        vec![OrderUpdate::Shift {
            from: removed + 1,
            to: len,
            delta: -1,
        }]
    };

    Ok(Plan {
        scope: scope.to_string(),
        moved_from: None,
        updates,
    })
}

/// Order for an item appended to a scope currently holding `count` items.
#[must_use]
pub const fn next_order(count: u32) -> u32 {
    count.saturating_add(1)
}

/// Check that `orders` is exactly `{1..N}` with no duplicates.
pub fn is_dense<I>(orders: I) -> bool
where
    I: IntoIterator<Item = u32>,
{
    let mut sorted: Vec<u32> = orders.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .zip(1u32..)
        .all(|(order, expected)| *order == expected)
}
