/// Sort engine
///
/// Orders the master index list by one `(column, direction)` pair using the
/// per-row sort-key cache. Ties are broken by each row's insertion position,
/// so an earlier sort on another column never shows through.
///
/// Descending sorts do not flip the comparator. The tiebreak positions are
/// reversed, the list is sorted ascending, and the result is reversed. Rows
/// with equal keys therefore come out in insertion order in both directions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::column::ensure_type;
use crate::error::GridError;
use crate::events::{Detail, Event};
use crate::resolver::{cell_data, Purpose};
use crate::settings::Settings;
use crate::types::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn aria(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSort {
    pub column: usize,
    pub direction: SortDirection,
}

/// Outcome of a header click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortChange {
    /// The column is not orderable; nothing to redraw.
    Unchanged,
    Changed(Option<ActiveSort>),
}

/// Sort the working order by the active sort and return it.
///
/// Without an active sort the working order is returned as it stands.
pub fn sort(settings: &mut Settings) -> Result<Vec<usize>, GridError> {
    stamp_sort_attributes(settings);

    let Some(active) = settings.active_sort else {
        return Ok(settings.sorted_order.clone());
    };
    let column = active.column;

    build_sort_keys(settings, column)?;

    let mut order = std::mem::take(&mut settings.sorted_order);
    let len = settings.master_order.len();

    // position[row] = place of `row` in insertion order
    let mut position = vec![0usize; settings.rows.len()];
    for (i, &row) in settings.master_order.iter().enumerate() {
        position[row] = match active.direction {
            SortDirection::Asc => i,
            SortDirection::Desc => len - 1 - i,
        };
    }

    let rows = &settings.rows;
    order.sort_by(|&a, &b| {
        let x = rows.get(a).and_then(|r| r.sort_key(column));
        let y = rows.get(b).and_then(|r| r.sort_key(column));
        match compare_keys(x, y) {
            Ordering::Equal => position[a].cmp(&position[b]),
            other => other,
        }
    });

    if active.direction == SortDirection::Desc {
        order.reverse();
    }

    log::debug!(
        "sorted {} rows on column {} {:?}",
        order.len(),
        column,
        active.direction
    );
    settings.sorted_order = order;
    settings.trigger(Event::Order, Detail::Order(Some(active)));
    Ok(settings.sorted_order.clone())
}

/// Rows without a key sort first.
fn compare_keys(x: Option<&SortKey>, y: Option<&SortKey>) -> Ordering {
    match (x, y) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

/// Fill the sort-key cache for `column` on every row that lacks it.
fn build_sort_keys(settings: &mut Settings, column: usize) -> Result<(), GridError> {
    let data_type = ensure_type(settings, column)?;

    let mut built = 0;
    for row in 0..settings.rows.len() {
        if settings.rows.get(row).and_then(|r| r.sort_key(column)).is_some() {
            continue;
        }
        let value = cell_data(settings, row, column, Purpose::Sort)?;
        let key = data_type.sort_key(&value);
        if let Some(record) = settings.rows.get_mut(row) {
            record.store_sort_key(column, key);
        }
        built += 1;
    }

    if built > 0 {
        log::trace!("built {} sort keys for column {}", built, column);
    }
    Ok(())
}

/// Advance `column` through asc → desc → none, or start a new ascending sort
/// when another column was active.
pub fn sort_add(settings: &mut Settings, column: usize) -> Result<SortChange, GridError> {
    let col = settings
        .columns
        .get(column)
        .ok_or(GridError::ColumnOutOfRange(column))?;
    if !col.is_orderable() {
        return Ok(SortChange::Unchanged);
    }

    let next = match settings.active_sort {
        Some(active) if active.column == column => match active.direction {
            SortDirection::Asc => Some(ActiveSort {
                column,
                direction: SortDirection::Desc,
            }),
            SortDirection::Desc => None,
        },
        _ => Some(ActiveSort {
            column,
            direction: SortDirection::Asc,
        }),
    };

    settings.active_sort = next;
    Ok(SortChange::Changed(next))
}

/// Mark the sorted header cell with `aria-sort`; clear the others.
fn stamp_sort_attributes(settings: &Settings) {
    for col in settings.columns.iter() {
        let Some(header) = col.header() else {
            continue;
        };
        let mut header = header.borrow_mut();
        match settings.active_sort {
            Some(active) if active.column == col.index() => {
                header.set_attribute("aria-sort", active.direction.aria());
            }
            _ => {
                header.remove_attribute("aria-sort");
            }
        }
    }
}
