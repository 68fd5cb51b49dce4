/// LiveGrid DataTable
///
/// `DataTable` binds a grid to a `<table>` element. It owns the table's
/// settings and exposes the operations the surrounding controls call: header
/// clicks, search input, page buttons and the length menu, plus row and cell
/// updates from application code.
///
/// # Examples
///
/// ```
/// use livegrid::{build_table, DataTable, Options, PageAction};
///
/// let rows: Vec<Vec<String>> = (0..25).map(|i| vec![format!("Row{:02}", i)]).collect();
/// let element = build_table(&["Name"], &rows);
///
/// let mut table = DataTable::new(&element, Options::default()).unwrap();
/// assert_eq!(table.rendered_rows().len(), 10);
///
/// table.search("Row1").unwrap();
/// assert_eq!(table.settings().records_display(), 10);
///
/// table.header_click(0).unwrap();
/// table.header_click(0).unwrap();
/// assert_eq!(table.rendered_rows()[0].borrow().text_content(), "Row19");
///
/// assert!(!table.page(PageAction::Next).unwrap());
/// ```

use std::rc::Rc;

use crate::column::{adjust_column_sizing, Column};
use crate::dom::ElementRef;
use crate::draw::{self, PageAction, PageInfo};
use crate::error::{ErrorMode, GridError};
use crate::events::{Detail, Event, ListenerId, Notification};
use crate::options::Options;
use crate::resolver::{cell_data, Purpose};
use crate::row::{render_cell, CellValue};
use crate::settings::{DisplayLength, InitState, Settings};
use crate::sort::{sort_add, ActiveSort, SortChange, SortDirection};

#[derive(Debug)]
pub struct DataTable {
    settings: Settings,
}

impl DataTable {
    /// Bind to a `<table>` element, scan its rows and draw the first page.
    ///
    /// A non-table element is reported and yields `GridError::NotATable`, so a
    /// caller initialising several tables can skip a bad target and go on.
    pub fn new(element: &ElementRef, options: Options) -> Result<DataTable, GridError> {
        let settings = Settings::from_element(element, &options)?;
        let mut table = DataTable { settings };

        draw::re_draw(&mut table.settings, true)?;
        table.settings.state = InitState::Ready;
        log::debug!(
            "table ready: {} columns, {} rows",
            table.settings.columns.len(),
            table.settings.rows.len()
        );
        table.settings.trigger(Event::Init, Detail::None);
        Ok(table)
    }

    /// Construct with options given as JSON.
    pub fn from_json_options(element: &ElementRef, json: &str) -> Result<DataTable, GridError> {
        DataTable::new(element, Options::from_json(json)?)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.settings.state == InitState::Ready
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.settings.columns.get(index)
    }

    pub fn on<F>(&mut self, event: Event, listener: F) -> ListenerId
    where
        F: Fn(&Settings, &Notification) + 'static,
    {
        self.settings.events.on(event, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.settings.events.off(id)
    }

    pub fn set_error_mode(&mut self, mode: ErrorMode) {
        self.settings.reporter.set_mode(mode);
    }

    /// Route reported warnings to a callback instead of the log.
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: Fn(&GridError) + 'static,
    {
        self.set_error_mode(ErrorMode::Callback(Rc::new(callback)));
    }

    pub fn cell_data(&self, row: usize, column: usize, purpose: Purpose) -> Result<CellValue, GridError> {
        cell_data(&self.settings, row, column, purpose)
    }

    /// Header click on `column`. Returns false when the column is not
    /// orderable and nothing was redrawn.
    pub fn header_click(&mut self, column: usize) -> Result<bool, GridError> {
        match sort_add(&mut self.settings, column)? {
            SortChange::Unchanged => Ok(false),
            SortChange::Changed(_) => {
                draw::re_draw(&mut self.settings, true)?;
                Ok(true)
            }
        }
    }

    /// Set (or clear) the active sort and redraw.
    pub fn order(&mut self, sort: Option<(usize, SortDirection)>) -> Result<(), GridError> {
        let active = match sort {
            Some((column, direction)) => {
                if column >= self.settings.columns.len() {
                    return Err(GridError::ColumnOutOfRange(column));
                }
                Some(ActiveSort { column, direction })
            }
            None => None,
        };
        self.settings.active_sort = active;
        draw::re_draw(&mut self.settings, true)
    }

    /// Global search input.
    pub fn search(&mut self, text: &str) -> Result<(), GridError> {
        self.settings.search.text = text.to_string();
        draw::re_draw(&mut self.settings, true)
    }

    /// Switch smart search on or off and redraw.
    pub fn set_smart_search(&mut self, smart: bool) -> Result<(), GridError> {
        self.settings.search.smart = smart;
        draw::re_draw(&mut self.settings, true)
    }

    /// Column-level search input.
    pub fn column_search(&mut self, column: usize, text: &str) -> Result<(), GridError> {
        let col = self
            .settings
            .columns
            .get_mut(column)
            .ok_or(GridError::ColumnOutOfRange(column))?;
        col.search = text.to_string();
        draw::re_draw(&mut self.settings, true)
    }

    pub fn page(&mut self, action: PageAction) -> Result<bool, GridError> {
        draw::page_change(&mut self.settings, action, true)
    }

    /// Page button with a raw action token.
    pub fn page_token(&mut self, token: &str) -> Result<bool, GridError> {
        draw::page_change_token(&mut self.settings, token, true)
    }

    /// Length menu change, then redraw.
    pub fn page_length(&mut self, length: DisplayLength) -> Result<(), GridError> {
        draw::length_change(&mut self.settings, length);
        draw::draw(&mut self.settings)
    }

    pub fn page_info(&self) -> PageInfo {
        draw::page_info(&self.settings)
    }

    pub fn info_text(&self) -> String {
        draw::info_text(&self.settings)
    }

    pub fn redraw(&mut self, recompute: bool) -> Result<(), GridError> {
        draw::re_draw(&mut self.settings, recompute)
    }

    pub fn draw(&mut self) -> Result<(), GridError> {
        draw::draw(&mut self.settings)
    }

    /// Append a row. It joins the master order at once and is rendered the
    /// first time a draw reaches it.
    ///
    /// A row of the wrong width is reported first; in throw mode the error is
    /// returned and the table is left untouched.
    pub fn add_row(&mut self, values: Vec<CellValue>) -> Result<usize, GridError> {
        let expected = self.settings.columns.len();
        let found = values.len();

        if found != expected {
            self.settings.report(GridError::ColumnCountMismatch {
                row: self.settings.rows.len(),
                expected,
                found,
            })?;
        }

        let mut raw: Vec<Option<CellValue>> = values.into_iter().take(expected).map(Some).collect();
        raw.resize(expected, None);
        let idx = self.settings.rows.push(raw);

        self.settings.master_order.push(idx);
        self.settings.sorted_order.push(idx);
        for column in self.settings.columns.iter_mut() {
            column.invalidate();
        }
        Ok(idx)
    }

    /// Replace one cell's raw value, dropping every cache derived from it and
    /// refreshing the rendered cell if the row has been drawn.
    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) -> Result<(), GridError> {
        if column >= self.settings.columns.len() {
            return Err(GridError::ColumnOutOfRange(column));
        }
        let record = self
            .settings
            .rows
            .get_mut(row)
            .ok_or(GridError::RowOutOfRange(row))?;
        record.set_raw(column, value);

        if let Some(cell) = record.cells().and_then(|cells| cells.get(column)).cloned() {
            let display = cell_data(&self.settings, row, column, Purpose::Display)?;
            render_cell(&cell, &display);
        }
        if let Some(col) = self.settings.columns.get_mut(column) {
            col.invalidate();
        }
        Ok(())
    }

    /// Drop cached derivations for a row, or one cell of it.
    pub fn invalidate(&mut self, row: usize, column: Option<usize>) -> Result<(), GridError> {
        self.settings
            .rows
            .get_mut(row)
            .ok_or(GridError::RowOutOfRange(row))?
            .invalidate(column);
        match column {
            Some(column) => {
                if let Some(col) = self.settings.columns.get_mut(column) {
                    col.invalidate();
                }
            }
            None => {
                for col in self.settings.columns.iter_mut() {
                    col.invalidate();
                }
            }
        }
        Ok(())
    }

    pub fn adjust_column_sizing(&mut self) -> Result<(), GridError> {
        adjust_column_sizing(&mut self.settings)
    }

    pub fn visible_column_count(&self) -> usize {
        self.settings.columns.visible_count()
    }

    /// Rows currently in the table body.
    pub fn rendered_rows(&self) -> Vec<ElementRef> {
        self.settings.body.borrow().child_elements_by_tag(&["tr"])
    }
}
