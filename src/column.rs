/// Column registry
///
/// An ordered list of column descriptors. A column's position is its identity
/// and doubles as the index into every row's raw data. Besides the feature
/// flags, a column memoizes two derived values: its detected data type and the
/// longest display string, both dropped whenever the column's data changes.

use crate::dom::ElementRef;
use crate::error::GridError;
use crate::events::{Detail, Event};
use crate::row::CellValue;
use crate::settings::Settings;
use crate::types::{strip_tags, DataType};

#[derive(Debug, Clone)]
pub struct Column {
    index: usize,
    pub(crate) title: String,
    pub(crate) searchable: bool,
    pub(crate) orderable: bool,
    pub(crate) width: Option<String>,
    pub(crate) original_width: Option<String>,
    pub(crate) cached_longest: Option<String>,
    pub(crate) declared_type: Option<DataType>,
    pub(crate) detected_type: Option<DataType>,
    /// Column-level search text, empty for none.
    pub(crate) search: String,
    pub(crate) header: Option<ElementRef>,
}

impl Column {
    pub fn new(index: usize) -> Self {
        Column {
            index,
            title: String::new(),
            searchable: true,
            orderable: true,
            width: None,
            original_width: None,
            cached_longest: None,
            declared_type: None,
            detected_type: None,
            search: String::new(),
            header: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_orderable(&self) -> bool {
        self.orderable
    }

    pub fn width(&self) -> Option<&str> {
        self.width.as_deref()
    }

    pub fn original_width(&self) -> Option<&str> {
        self.original_width.as_deref()
    }

    pub fn cached_longest(&self) -> Option<&str> {
        self.cached_longest.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn header(&self) -> Option<&ElementRef> {
        self.header.as_ref()
    }

    /// Declared type, else the detected one if detection has run.
    pub fn data_type(&self) -> Option<DataType> {
        self.declared_type.or(self.detected_type)
    }

    /// Forget memoized values derived from this column's data.
    pub fn invalidate(&mut self) {
        self.cached_longest = None;
        self.detected_type = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        ColumnRegistry { columns: Vec::new() }
    }

    /// Append `count` columns with default flags. When ordering is disabled
    /// for the table the new columns are not orderable, and stay that way.
    pub fn add(&mut self, count: usize, ordering_enabled: bool) {
        for _ in 0..count {
            let mut column = Column::new(self.columns.len());
            if !ordering_enabled {
                column.orderable = false;
            }
            self.columns.push(column);
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    /// Number of header cells that are not hidden. Columns without a header
    /// cell count as visible.
    pub fn visible_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.header.as_ref().map(|h| !h.borrow().is_hidden()).unwrap_or(true))
            .count()
    }
}

/// Resolve and cache the data type of a column.
pub(crate) fn ensure_type(settings: &mut Settings, column: usize) -> Result<DataType, GridError> {
    let col = settings
        .columns
        .get(column)
        .ok_or(GridError::ColumnOutOfRange(column))?;
    if let Some(data_type) = col.data_type() {
        return Ok(data_type);
    }

    let detected = DataType::detect(
        settings
            .rows
            .iter()
            .filter_map(|row| row.raw(column))
            .filter(|value| !matches!(value, CellValue::Null)),
    );
    log::trace!("column {} detected as {}", column, detected.name());

    if let Some(col) = settings.columns.get_mut(column) {
        col.detected_type = Some(detected);
    }
    Ok(detected)
}

/// Longest display string in a column, memoized on the column.
pub fn longest_string(settings: &mut Settings, column: usize) -> Result<String, GridError> {
    if let Some(cached) = settings
        .columns
        .get(column)
        .ok_or(GridError::ColumnOutOfRange(column))?
        .cached_longest
        .clone()
    {
        return Ok(cached);
    }

    let mut longest = String::new();
    let mut longest_len = 0;
    for row in 0..settings.rows.len() {
        let display = strip_tags(&crate::resolver::display_string(settings, row, column)?);
        let len = display.chars().count();
        if len > longest_len {
            longest_len = len;
            longest = display;
        }
    }

    if let Some(col) = settings.columns.get_mut(column) {
        col.cached_longest = Some(longest.clone());
    }
    Ok(longest)
}

/// Recalculate column widths and stamp them on the header cells.
///
/// A configured width wins; otherwise the width is the longer of the title and
/// the longest display string, in `ch` units.
pub fn adjust_column_sizing(settings: &mut Settings) -> Result<(), GridError> {
    for column in 0..settings.columns.len() {
        let (original_width, title_len) = match settings.columns.get(column) {
            Some(col) => (col.original_width.clone(), col.title.chars().count()),
            None => continue,
        };
        let width = match original_width {
            Some(width) => width,
            None => {
                let longest = longest_string(settings, column)?.chars().count();
                format!("{}ch", title_len.max(longest).max(1))
            }
        };

        if let Some(col) = settings.columns.get_mut(column) {
            if let Some(header) = &col.header {
                header
                    .borrow_mut()
                    .set_attribute("style", format!("width: {}", width));
            }
            col.width = Some(width);
        }
    }

    settings.trigger(Event::ColumnSizing, Detail::None);
    Ok(())
}
