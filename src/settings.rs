/// Settings model
///
/// One `Settings` value per table. It is the shared record that the sort,
/// filter and draw stages read and write: feature flags, the row store and
/// column registry, the three index lists, the paging cursor, notification
/// listeners and the error reporter. Nothing here is global; every stage takes
/// the settings it works on as an explicit argument.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::column::ColumnRegistry;
use crate::dom::{Element, ElementRef};
use crate::error::{ErrorReporter, GridError};
use crate::events::{Detail, Event, EventRegistry, Notification};
use crate::options::{Language, Options};
use crate::row::RowStore;
use crate::sort::ActiveSort;

/// Page size. `-1` on the wire means every row on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DisplayLength {
    All,
    Rows(usize),
}

impl Default for DisplayLength {
    fn default() -> Self {
        DisplayLength::Rows(10)
    }
}

impl From<i64> for DisplayLength {
    fn from(value: i64) -> Self {
        if value <= 0 {
            DisplayLength::All
        } else {
            DisplayLength::Rows(value as usize)
        }
    }
}

impl From<DisplayLength> for i64 {
    fn from(value: DisplayLength) -> Self {
        match value {
            DisplayLength::All => -1,
            DisplayLength::Rows(n) => n as i64,
        }
    }
}

impl DisplayLength {
    pub fn rows(&self) -> Option<usize> {
        match self {
            DisplayLength::All => None,
            DisplayLength::Rows(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub searching: bool,
    pub paging: bool,
    pub ordering: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            searching: true,
            paging: true,
            ordering: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub text: String,
    /// Word/phrase/negation matching, case-insensitive.
    pub smart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Initializing,
    Ready,
}

#[derive(Debug)]
pub struct Settings {
    pub(crate) table: ElementRef,
    pub(crate) body: ElementRef,
    pub(crate) features: Features,
    pub(crate) columns: ColumnRegistry,
    pub(crate) rows: RowStore,
    /// Every row index in insertion order. Append-only.
    pub(crate) master_order: Vec<usize>,
    /// Master order as last arranged by the sort engine.
    pub(crate) sorted_order: Vec<usize>,
    /// Rows passing the current search, in sorted order.
    pub(crate) display_order: Vec<usize>,
    pub(crate) active_sort: Option<ActiveSort>,
    pub(crate) search: SearchState,
    pub(crate) display_start: usize,
    pub(crate) display_length: DisplayLength,
    pub(crate) init_display_start: Option<usize>,
    pub(crate) draw_counter: u64,
    pub(crate) last_error_draw: Cell<Option<u64>>,
    pub(crate) language: Language,
    pub(crate) state: InitState,
    pub(crate) events: EventRegistry,
    pub(crate) reporter: ErrorReporter,
}

impl Settings {
    /// Scan a `<table>` element into a settings model: columns from the header
    /// row, one row record per body row. Nothing is drawn.
    pub fn from_element(table: &ElementRef, options: &Options) -> Result<Settings, GridError> {
        let reporter = ErrorReporter::new(options.err_mode.into());

        let tag = table.borrow().tag().to_string();
        if tag != "table" {
            let err = GridError::NotATable { tag };
            reporter.report(err.clone())?;
            return Err(err);
        }

        let header_row = Element::first_child_by_tag(table, "thead")
            .and_then(|thead| Element::first_child_by_tag(&thead, "tr"));
        let body = match Element::first_child_by_tag(table, "tbody") {
            Some(body) => body,
            None => {
                let body = Element::new_ref("tbody");
                table.borrow_mut().append_element(body.clone());
                body
            }
        };
        let body_rows = body.borrow().child_elements_by_tag(&["tr"]);

        let header_cells = header_row
            .as_ref()
            .map(|tr| tr.borrow().child_elements_by_tag(&["th", "td"]))
            .unwrap_or_default();
        let column_count = if header_cells.is_empty() {
            body_rows
                .first()
                .map(|tr| tr.borrow().child_elements_by_tag(&["td", "th"]).len())
                .unwrap_or(0)
        } else {
            header_cells.len()
        };

        let features = Features {
            searching: options.searching,
            paging: options.paging,
            ordering: options.ordering,
        };

        let mut settings = Settings {
            table: table.clone(),
            body: body.clone(),
            features,
            columns: ColumnRegistry::new(),
            rows: RowStore::new(),
            master_order: Vec::new(),
            sorted_order: Vec::new(),
            display_order: Vec::new(),
            active_sort: None,
            search: SearchState {
                text: options.search.search.clone(),
                smart: options.search.smart,
            },
            display_start: 0,
            display_length: options.page_length,
            init_display_start: Some(options.display_start),
            draw_counter: 0,
            last_error_draw: Cell::new(None),
            language: options.language.clone(),
            state: InitState::Initializing,
            events: EventRegistry::new(),
            reporter,
        };

        settings.columns.add(column_count, features.ordering);
        for (column, cell) in settings.columns.iter_mut().zip(header_cells) {
            {
                let th = cell.borrow();
                column.title = th.text_content().trim().to_string();
                column.original_width = th.attribute("width").map(str::to_string);
            }
            column.header = Some(cell);
        }
        settings.apply_column_options(options)?;

        for tr in &body_rows {
            let (idx, found) = settings.rows.push_element(tr, column_count);
            if found != column_count {
                settings.report(GridError::ColumnCountMismatch {
                    row: idx,
                    expected: column_count,
                    found,
                })?;
            }
            settings.master_order.push(idx);
        }
        settings.sorted_order = settings.master_order.clone();
        settings.display_order = settings.master_order.clone();

        if let Some((column, direction)) = options.order {
            if column >= column_count {
                return Err(GridError::InvalidOptions(format!(
                    "initial order refers to column {} of {}",
                    column, column_count
                )));
            }
            if features.ordering {
                settings.active_sort = Some(ActiveSort { column, direction });
            }
        }

        log::debug!(
            "scanned table: {} columns, {} rows",
            settings.columns.len(),
            settings.rows.len()
        );
        Ok(settings)
    }

    fn apply_column_options(&mut self, options: &Options) -> Result<(), GridError> {
        if options.columns.len() > self.columns.len() {
            return Err(GridError::InvalidOptions(format!(
                "{} column definitions for {} columns",
                options.columns.len(),
                self.columns.len()
            )));
        }

        let ordering = self.features.ordering;
        for (column, def) in self.columns.iter_mut().zip(&options.columns) {
            if let Some(title) = &def.title {
                column.title = title.clone();
            }
            if let Some(searchable) = def.searchable {
                column.searchable = searchable;
            }
            if let Some(orderable) = def.orderable {
                column.orderable = orderable && ordering;
            }
            if let Some(data_type) = def.data_type {
                column.declared_type = Some(data_type);
            }
            if let Some(width) = &def.width {
                column.original_width = Some(width.clone());
            }
        }
        Ok(())
    }

    pub fn table(&self) -> &ElementRef {
        &self.table
    }

    pub fn body(&self) -> &ElementRef {
        &self.body
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn master_order(&self) -> &[usize] {
        &self.master_order
    }

    pub fn sorted_order(&self) -> &[usize] {
        &self.sorted_order
    }

    pub fn display_order(&self) -> &[usize] {
        &self.display_order
    }

    pub fn active_sort(&self) -> Option<ActiveSort> {
        self.active_sort
    }

    pub fn search_text(&self) -> &str {
        &self.search.text
    }

    pub fn is_smart_search(&self) -> bool {
        self.search.smart
    }

    pub fn display_start(&self) -> usize {
        self.display_start
    }

    pub fn display_length(&self) -> DisplayLength {
        self.display_length
    }

    pub fn draw_counter(&self) -> u64 {
        self.draw_counter
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn records_total(&self) -> usize {
        self.master_order.len()
    }

    pub fn records_display(&self) -> usize {
        self.display_order.len()
    }

    /// Whether the window is cut into pages at all.
    pub fn is_paged(&self) -> bool {
        self.features.paging && self.display_length != DisplayLength::All
    }

    /// End (exclusive) of the visible window in the display order.
    pub fn display_end(&self) -> usize {
        let records = self.records_display();
        match self.display_length.rows() {
            Some(len) if self.features.paging => (self.display_start + len).min(records),
            _ => records,
        }
    }

    /// Visible window `[start, end)`, always within the display order.
    pub fn display_window(&self) -> (usize, usize) {
        let records = self.records_display();
        if !self.is_paged() {
            return (0, records);
        }
        let start = self.display_start.min(records);
        (start, self.display_end().max(start))
    }

    /// Call every listener for `event`, in registration order.
    pub fn trigger(&self, event: Event, detail: Detail) {
        let notification = Notification {
            event,
            bubbles: event == Event::Draw,
            detail,
        };
        let listeners = self.events.listeners(event);
        log::trace!("{} -> {} listener(s)", event, listeners.len());
        for listener in listeners {
            listener(self, &notification);
        }
    }

    /// Send a structural warning through the reporter, announcing it first.
    pub fn report(&self, error: GridError) -> Result<(), GridError> {
        self.trigger(Event::Error, Detail::Error(error.clone()));
        self.reporter.report(error)
    }

    /// Report a missing cell at most once per draw.
    pub(crate) fn note_missing_data(&self, row: usize, column: usize) -> Result<(), GridError> {
        if self.last_error_draw.get() == Some(self.draw_counter) {
            return Ok(());
        }
        self.last_error_draw.set(Some(self.draw_counter));
        self.report(GridError::MissingCellData { row, column })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build_table;
    use crate::sort::SortDirection;

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n).map(|i| vec![format!("r{}", i), i.to_string()]).collect()
    }

    #[test]
    fn test_from_element_scans_rows() {
        let table = build_table(&["Name", "N"], &rows(3));
        let settings = Settings::from_element(&table, &Options::default()).unwrap();

        assert_eq!(settings.columns().len(), 2);
        assert_eq!(settings.columns().get(0).unwrap().title(), "Name");
        assert_eq!(settings.rows().len(), 3);
        assert_eq!(settings.master_order(), &[0, 1, 2]);
        assert_eq!(settings.display_order(), &[0, 1, 2]);
        assert_eq!(settings.state(), InitState::Initializing);
    }

    #[test]
    fn test_from_element_rejects_non_table() {
        let div = Element::new_ref("div");
        let err = Settings::from_element(&div, &Options::default()).unwrap_err();
        assert_eq!(err, GridError::NotATable { tag: "div".to_string() });
    }

    #[test]
    fn test_mismatch_reported_in_throw_mode() {
        let table = build_table(&["A", "B"], &[vec!["1".to_string()]]);
        let options = Options::from_json(r#"{"errMode": "throw"}"#).unwrap();
        let err = Settings::from_element(&table, &options).unwrap_err();
        assert_eq!(
            err,
            GridError::ColumnCountMismatch { row: 0, expected: 2, found: 1 }
        );
    }

    #[test]
    fn test_ordering_disabled_forces_columns() {
        let table = build_table(&["A", "B"], &rows(1));
        let options =
            Options::from_json(r#"{"ordering": false, "columns": [{"orderable": true}], "order": [1, "asc"]}"#)
                .unwrap();
        let settings = Settings::from_element(&table, &options).unwrap();

        assert!(!settings.columns().get(0).unwrap().is_orderable());
        assert_eq!(settings.active_sort(), None);
    }

    #[test]
    fn test_initial_order_validated() {
        let table = build_table(&["A"], &[vec!["x".to_string()]]);
        let options = Options::from_json(r#"{"order": [3, "desc"]}"#).unwrap();
        assert!(matches!(
            Settings::from_element(&table, &options),
            Err(GridError::InvalidOptions(_))
        ));

        let options = Options::from_json(r#"{"order": [0, "desc"]}"#).unwrap();
        let settings = Settings::from_element(&table, &options).unwrap();
        assert_eq!(
            settings.active_sort(),
            Some(ActiveSort { column: 0, direction: SortDirection::Desc })
        );
    }

    #[test]
    fn test_display_window_clamps() {
        let table = build_table(&["A", "B"], &rows(25));
        let mut settings = Settings::from_element(&table, &Options::default()).unwrap();

        assert_eq!(settings.display_window(), (0, 10));
        settings.display_start = 20;
        assert_eq!(settings.display_window(), (20, 25));
        settings.display_start = 40;
        assert_eq!(settings.display_window(), (25, 25));

        settings.display_length = DisplayLength::All;
        assert_eq!(settings.display_window(), (0, 25));

        settings.display_length = DisplayLength::Rows(10);
        settings.features.paging = false;
        assert_eq!(settings.display_window(), (0, 25));
    }

    #[test]
    fn test_display_length_serde() {
        let len: DisplayLength = serde_json::from_str("-1").unwrap();
        assert_eq!(len, DisplayLength::All);
        let len: DisplayLength = serde_json::from_str("25").unwrap();
        assert_eq!(len, DisplayLength::Rows(25));
        assert_eq!(serde_json::to_string(&DisplayLength::All).unwrap(), "-1");
    }

    #[test]
    fn test_missing_table_body_is_created() {
        let table = Element::new_ref("table");
        let settings = Settings::from_element(&table, &Options::default()).unwrap();
        assert_eq!(settings.columns().len(), 0);
        assert_eq!(table.borrow().child_elements_by_tag(&["tbody"]).len(), 1);
        assert_eq!(settings.body().borrow().tag(), "tbody");
    }
}
