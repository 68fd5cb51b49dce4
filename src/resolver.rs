/// Cell data resolver
///
/// Every read of a cell goes through [`cell_data`], which shapes the raw value
/// for the reason it is being asked for. Rendering gets nodes as-is and never
/// sees a null; searching gets the column type's filter text; sorting and raw
/// access get the value untouched, except that rich content is serialized to
/// markup for anything other than display.

use crate::error::GridError;
use crate::row::CellValue;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Display,
    Filter,
    Sort,
    Raw,
}

/// Resolve the value of cell (`row`, `column`) for `purpose`.
///
/// A missing cell yields `CellValue::Null` after a report that is throttled to
/// once per draw.
pub fn cell_data(
    settings: &Settings,
    row: usize,
    column: usize,
    purpose: Purpose,
) -> Result<CellValue, GridError> {
    let record = settings.rows.get(row).ok_or(GridError::RowOutOfRange(row))?;
    let col = settings
        .columns
        .get(column)
        .ok_or(GridError::ColumnOutOfRange(column))?;

    let value = match record.raw(column) {
        Some(value) => value.clone(),
        None => {
            settings.note_missing_data(row, column)?;
            return Ok(CellValue::Null);
        }
    };

    let value = match value {
        CellValue::Node(node) if purpose != Purpose::Display => {
            CellValue::Text(node.borrow().inner_html())
        }
        other => other,
    };

    Ok(match purpose {
        Purpose::Display if value.is_null() => CellValue::Text(String::new()),
        Purpose::Filter => {
            CellValue::Text(col.data_type().unwrap_or_default().filter_format(&value))
        }
        _ => value,
    })
}

/// Display text of a cell, memoized in the row's display cache.
pub fn display_string(settings: &mut Settings, row: usize, column: usize) -> Result<String, GridError> {
    if let Some(cached) = settings
        .rows
        .get(row)
        .ok_or(GridError::RowOutOfRange(row))?
        .display(column)
    {
        return Ok(cached.to_string());
    }

    let text = cell_data(settings, row, column, Purpose::Display)?.to_plain_text();
    if let Some(record) = settings.rows.get_mut(row) {
        record.store_display(column, text.clone());
    }
    Ok(text)
}
