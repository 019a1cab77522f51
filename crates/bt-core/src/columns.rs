//! Column assignment for concurrent timeline items.
//!
//! Greedy interval-graph colouring: items sorted by start each take the
//! lowest column that is free at their start time. For interval graphs this
//! opens exactly as many columns as the largest set of mutually overlapping
//! items, and it always terminates, so there is no "unplaceable" case.

use std::cmp::Ordering;

/// An item competing for horizontal space, reduced to its time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnItem<K> {
    /// Tie-break key for items starting at the same minute.
    pub key: K,
    pub start_minutes: i64,
    /// Negative durations are treated as point-in-time markers.
    pub duration_minutes: i64,
}

impl<K> ColumnItem<K> {
    fn end_minutes(&self) -> i64 {
        self.start_minutes + self.duration_minutes.max(0)
    }
}

/// An item that keeps its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    /// Index into the input slice.
    pub index: usize,
    pub column: usize,
}

/// The "+N more" indicator that replaces hidden items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowSlot {
    /// Always the last visible column.
    pub column: usize,
    /// Start of the earliest hidden item.
    pub start_minutes: i64,
    pub hidden_count: usize,
}

/// Result of [`assign_columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Visible items in start order.
    pub visible: Vec<PlacedItem>,
    /// Indices of hidden items in start order.
    pub hidden: Vec<usize>,
    pub overflow: Option<OverflowSlot>,
    /// Columns used for layout, at most the visible cap.
    pub total_columns: usize,
    /// Columns the greedy pass needed before capping.
    pub opened_columns: usize,
}

impl ColumnLayout {
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

/// Assigns a column to every item, hiding the overflow beyond
/// `max_visible_columns`.
///
/// When more columns are needed than allowed, everything that landed in the
/// last allowed column or beyond is hidden, and that column is given to a
/// single overflow indicator. A cap of 0 is treated as 1.
pub fn assign_columns<K: Ord>(items: &[ColumnItem<K>], max_visible_columns: usize) -> ColumnLayout {
    assign(&[], items, max_visible_columns)
}

/// Like [`assign_columns`], but the `pinned` items hold column 0 and are
/// never hidden; `items` flow into the columns around them.
///
/// Pinned items must not overlap one another. The result's indices refer
/// to `items` only, and its column count includes column 0. With pinned
/// items present the cap is at least 2, so the overflow indicator never
/// lands on a pinned item.
pub fn assign_columns_pinned<K: Ord>(
    pinned: &[ColumnItem<K>],
    items: &[ColumnItem<K>],
    max_visible_columns: usize,
) -> ColumnLayout {
    let spans: Vec<(i64, i64)> = pinned
        .iter()
        .map(|p| (p.start_minutes, p.end_minutes()))
        .collect();
    let cap = if spans.is_empty() {
        max_visible_columns
    } else {
        max_visible_columns.max(2)
    };
    assign(&spans, items, cap)
}

fn assign<K: Ord>(
    pinned: &[(i64, i64)],
    items: &[ColumnItem<K>],
    max_visible_columns: usize,
) -> ColumnLayout {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| compare(&items[a], &items[b]).then(a.cmp(&b)));

    // Column 0 is opened up front when something is pinned to it.
    let mut column_ends: Vec<i64> = if pinned.is_empty() {
        Vec::new()
    } else {
        vec![i64::MIN]
    };
    let mut placed = Vec::with_capacity(items.len());
    for index in order {
        let item = &items[index];
        let end = item.end_minutes();
        // Point items still occupy their start minute.
        let clashes_with_pinned = pinned
            .iter()
            .any(|&(start, pinned_end)| start < end.max(item.start_minutes + 1) && item.start_minutes < pinned_end);
        let free = column_ends.iter().enumerate().position(|(column, &column_end)| {
            column_end <= item.start_minutes && !(column == 0 && clashes_with_pinned)
        });
        let column = if let Some(free) = free {
            column_ends[free] = end;
            free
        } else {
            column_ends.push(end);
            column_ends.len() - 1
        };
        placed.push(PlacedItem { index, column });
    }

    let opened_columns = column_ends.len();
    let cap = max_visible_columns.max(1);
    if opened_columns <= cap {
        return ColumnLayout {
            visible: placed,
            hidden: Vec::new(),
            overflow: None,
            total_columns: opened_columns,
            opened_columns,
        };
    }

    let overflow_column = cap - 1;
    let (hidden, visible): (Vec<PlacedItem>, Vec<PlacedItem>) = placed
        .into_iter()
        .partition(|item| item.column >= overflow_column);
    let hidden: Vec<usize> = hidden.into_iter().map(|item| item.index).collect();

    let overflow = hidden.first().map(|&first| OverflowSlot {
        column: overflow_column,
        start_minutes: items[first].start_minutes,
        hidden_count: hidden.len(),
    });
    tracing::trace!(
        opened_columns,
        cap,
        hidden = hidden.len(),
        "column overflow"
    );

    ColumnLayout {
        visible,
        hidden,
        overflow,
        total_columns: cap,
        opened_columns,
    }
}

fn compare<K: Ord>(a: &ColumnItem<K>, b: &ColumnItem<K>) -> Ordering {
    a.start_minutes
        .cmp(&b.start_minutes)
        .then_with(|| a.key.cmp(&b.key))
}
