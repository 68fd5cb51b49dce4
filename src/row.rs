/// Row store
///
/// One `RowRecord` per data row. A record owns the raw cell values (the source
/// of truth) plus three memoized caches derived from them: sort keys, filter
/// text and display strings. Every cache is an explicit `Option`; dropping a
/// cache entry is the only way the store reacts to a change in raw data.
///
/// A record also pools its rendered row: `element`/`cells` are bound the first
/// time the row is drawn and the same handles are reused on every later draw.

use std::rc::Rc;

use crate::dom::{Element, ElementRef};
use crate::types::SortKey;

/// A raw cell value.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Text(String),
    /// Rich content: the element whose children make up the cell.
    Node(ElementRef),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Plain text of the value: node text content, empty for null.
    pub fn to_plain_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Node(node) => node.borrow().text_content(),
        }
    }

    /// Read a `<td>`/`<th>`: text-only cells become `Text`, anything with
    /// element children is kept as a `Node`.
    pub fn from_cell(cell: &ElementRef) -> CellValue {
        let el = cell.borrow();
        if el.has_element_children() {
            CellValue::Node(cell.clone())
        } else {
            CellValue::Text(el.text_content())
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Node(a), CellValue::Node(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

#[derive(Debug)]
pub struct RowRecord {
    idx: usize,
    /// One slot per column; `None` is a missing cell.
    raw: Vec<Option<CellValue>>,
    pub(crate) sort_cache: Option<Vec<Option<SortKey>>>,
    pub(crate) filter_cache: Option<Vec<String>>,
    pub(crate) filter_row: Option<String>,
    pub(crate) display_cache: Option<Vec<Option<String>>>,
    /// Pre-existing `<tr>` from the initial scan, bound on first draw.
    source: Option<ElementRef>,
    element: Option<ElementRef>,
    cells: Option<Vec<ElementRef>>,
}

impl RowRecord {
    pub fn new(idx: usize, raw: Vec<Option<CellValue>>) -> Self {
        RowRecord {
            idx,
            raw,
            sort_cache: None,
            filter_cache: None,
            filter_row: None,
            display_cache: None,
            source: None,
            element: None,
            cells: None,
        }
    }

    /// Read a `<tr>` into a record with exactly `column_count` slots.
    /// Returns the record and the number of cells actually found.
    pub fn from_element(idx: usize, tr: &ElementRef, column_count: usize) -> (RowRecord, usize) {
        let cells = tr.borrow().child_elements_by_tag(&["td", "th"]);
        let found = cells.len();

        let raw = (0..column_count)
            .map(|i| cells.get(i).map(CellValue::from_cell))
            .collect();

        let mut record = RowRecord::new(idx, raw);
        record.source = Some(tr.clone());
        (record, found)
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn raw(&self, column: usize) -> Option<&CellValue> {
        self.raw.get(column).and_then(Option::as_ref)
    }

    pub fn raw_data(&self) -> &[Option<CellValue>] {
        &self.raw
    }

    pub(crate) fn set_raw(&mut self, column: usize, value: CellValue) {
        if let Some(slot) = self.raw.get_mut(column) {
            *slot = Some(value);
        }
        self.invalidate(Some(column));
    }

    /// Drop cached derivations. With a column only that column's sort and
    /// display entries go; the filter cache is a join over all columns and
    /// always goes as a whole.
    pub fn invalidate(&mut self, column: Option<usize>) {
        match column {
            Some(col) => {
                if let Some(entry) = self.sort_cache.as_mut().and_then(|c| c.get_mut(col)) {
                    *entry = None;
                }
                if let Some(entry) = self.display_cache.as_mut().and_then(|c| c.get_mut(col)) {
                    *entry = None;
                }
            }
            None => {
                self.sort_cache = None;
                self.display_cache = None;
            }
        }
        self.filter_cache = None;
        self.filter_row = None;
    }

    pub fn sort_key(&self, column: usize) -> Option<&SortKey> {
        self.sort_cache.as_ref().and_then(|c| c.get(column)).and_then(Option::as_ref)
    }

    pub(crate) fn store_sort_key(&mut self, column: usize, key: SortKey) {
        let width = self.raw.len();
        let cache = self.sort_cache.get_or_insert_with(|| vec![None; width]);
        if let Some(entry) = cache.get_mut(column) {
            *entry = Some(key);
        }
    }

    pub fn filter_key(&self, column: usize) -> Option<&str> {
        self.filter_cache.as_ref().and_then(|c| c.get(column)).map(String::as_str)
    }

    pub fn filter_row(&self) -> Option<&str> {
        self.filter_row.as_deref()
    }

    pub fn display(&self, column: usize) -> Option<&str> {
        self.display_cache
            .as_ref()
            .and_then(|c| c.get(column))
            .and_then(Option::as_deref)
    }

    pub(crate) fn store_display(&mut self, column: usize, value: String) {
        let width = self.raw.len();
        let cache = self.display_cache.get_or_insert_with(|| vec![None; width]);
        if let Some(entry) = cache.get_mut(column) {
            *entry = Some(value);
        }
    }

    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }

    pub fn cells(&self) -> Option<&[ElementRef]> {
        self.cells.as_deref()
    }

    pub fn is_materialized(&self) -> bool {
        self.element.is_some()
    }

    pub(crate) fn take_source(&mut self) -> Option<ElementRef> {
        self.source.take()
    }

    pub(crate) fn bind(&mut self, element: ElementRef, cells: Vec<ElementRef>) {
        element
            .borrow_mut()
            .set_attribute("data-dt-row", self.idx.to_string());
        self.element = Some(element);
        self.cells = Some(cells);
    }
}

/// Write a value into a rendered cell.
pub(crate) fn render_cell(cell: &ElementRef, value: &CellValue) {
    match value {
        CellValue::Node(node) => {
            if Rc::ptr_eq(node, cell) {
                return;
            }
            let children = node.borrow().children().to_vec();
            cell.borrow_mut().replace_children(children);
        }
        other => {
            let text = other.to_plain_text();
            cell.borrow_mut()
                .replace_children(vec![crate::dom::Node::Text(text)]);
        }
    }
}

/// Create a fresh `<td>` for a value.
pub(crate) fn create_cell(value: &CellValue) -> ElementRef {
    let td = Element::new_ref("td");
    render_cell(&td, value);
    td
}

/// Append-only store of row records, indexed by `idx`.
#[derive(Debug, Default)]
pub struct RowStore {
    rows: Vec<RowRecord>,
}

impl RowStore {
    pub fn new() -> Self {
        RowStore { rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RowRecord> {
        self.rows.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut RowRecord> {
        self.rows.get_mut(idx)
    }

    /// Add a record built from raw values; returns its index.
    pub fn push(&mut self, raw: Vec<Option<CellValue>>) -> usize {
        let idx = self.rows.len();
        self.rows.push(RowRecord::new(idx, raw));
        idx
    }

    /// Add a record scanned from an existing `<tr>`. Returns the index and the
    /// number of cells found in the element.
    pub fn push_element(&mut self, tr: &ElementRef, column_count: usize) -> (usize, usize) {
        let idx = self.rows.len();
        let (record, found) = RowRecord::from_element(idx, tr, column_count);
        self.rows.push(record);
        (idx, found)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowRecord> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RowRecord> {
        self.rows.iter_mut()
    }
}
