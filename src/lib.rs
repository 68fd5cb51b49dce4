/// LiveGrid - Data Grid Core
///
/// Sorting, searching and paged redraws over an in-memory table document.
/// Each table owns one `Settings` value that is threaded explicitly through
/// the sort, filter and draw stages; derived cell data is memoized per row and
/// dropped whenever the raw data under it changes.

pub mod error;
pub mod dom;
pub mod types;
pub mod row;
pub mod events;
pub mod column;
pub mod resolver;
pub mod settings;
pub mod options;
pub mod sort;
pub mod filter;
pub mod draw;
pub mod table;

pub use error::{ErrMode, ErrorMode, ErrorReporter, GridError};
pub use dom::{build_table, Element, ElementRef, Node};
pub use types::{DataType, SortKey};
pub use row::{CellValue, RowRecord, RowStore};
pub use events::{Detail, Event, EventRegistry, ListenerId, Notification};
pub use column::{Column, ColumnRegistry};
pub use resolver::{cell_data, Purpose};
pub use settings::{DisplayLength, Features, InitState, Settings};
pub use options::{ColumnOptions, Language, Options, SearchOptions};
pub use sort::{ActiveSort, SortChange, SortDirection};
pub use filter::Matcher;
pub use draw::{PageAction, PageInfo};
pub use table::DataTable;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn names(n: usize) -> ElementRef {
        let rows: Vec<Vec<String>> = (0..n).map(|i| vec![format!("Row{:02}", i)]).collect();
        build_table(&["Name"], &rows)
    }

    fn rendered_text(table: &DataTable) -> Vec<String> {
        table
            .rendered_rows()
            .iter()
            .map(|tr| tr.borrow().text_content())
            .collect()
    }

    fn expected(range: impl Iterator<Item = usize>) -> Vec<String> {
        range.map(|i| format!("Row{:02}", i)).collect()
    }

    #[test]
    fn test_sort_filter_page_scenario() {
        let element = names(25);
        let mut table = DataTable::new(&element, Options::default()).unwrap();

        let pages = Rc::new(RefCell::new(Vec::new()));
        for event in [Event::Page, Event::PageNoChange] {
            let sink = pages.clone();
            table.on(event, move |_, n| sink.borrow_mut().push(n.event));
        }

        table.search("Row1").unwrap();
        assert_eq!(table.settings().display_order(), &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
        assert_eq!(rendered_text(&table), expected(10..20));

        // First click ascending, second descending.
        table.header_click(0).unwrap();
        table.header_click(0).unwrap();
        assert_eq!(rendered_text(&table), expected((10..20).rev()));

        assert!(!table.page(PageAction::Next).unwrap());
        assert_eq!(table.settings().display_start(), 0);
        assert_eq!(*pages.borrow(), vec![Event::PageNoChange]);
    }

    #[test]
    fn test_empty_table_placeholder() {
        let element = names(0);
        let table = DataTable::new(&element, Options::default()).unwrap();

        let rows = table.rendered_rows();
        assert_eq!(rows.len(), 1);
        let td = Element::first_child_by_tag(&rows[0], "td").unwrap();
        assert_eq!(
            td.borrow().attribute("colspan"),
            Some(table.visible_column_count().to_string().as_str())
        );
        assert_eq!(td.borrow().text_content(), "No data available in table");
    }

    #[test]
    fn test_no_match_placeholder() {
        let element = names(5);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.search("zzz").unwrap();

        let rows = table.rendered_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].borrow().text_content(), "No matching records found");
    }

    #[test]
    fn test_draw_twice_reuses_rows() {
        let element = names(25);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.page(PageAction::Page(1)).unwrap();

        let first = table.rendered_rows();
        table.draw().unwrap();
        let second = table.rendered_rows();

        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn test_rows_reused_across_sorts() {
        let element = names(3);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        let before = table.rendered_rows();

        table.order(Some((0, SortDirection::Desc))).unwrap();
        let after = table.rendered_rows();

        assert!(Rc::ptr_eq(&before[0], &after[2]));
        assert!(Rc::ptr_eq(&before[2], &after[0]));
    }

    #[test]
    fn test_cache_consistency_after_edit() {
        let element = names(3);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.order(Some((0, SortDirection::Asc))).unwrap();
        table.search("Row").unwrap();
        table.adjust_column_sizing().unwrap();

        table.set_cell(0, 0, "Zed".into()).unwrap();
        {
            let row = table.settings().rows().get(0).unwrap();
            assert_eq!(row.sort_key(0), None);
            assert_eq!(row.filter_row(), None);
            assert_eq!(row.display(0), None);
        }

        table.search("Zed").unwrap();
        let row = table.settings().rows().get(0).unwrap();
        assert_eq!(row.filter_row(), Some("Zed"));
        assert_eq!(row.sort_key(0), Some(&SortKey::Text("zed".to_string())));
        assert_eq!(table.settings().display_order(), &[0]);
    }

    #[test]
    fn test_redraw_returns_to_first_page() {
        let element = names(25);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.page(PageAction::Last).unwrap();
        assert_eq!(table.page_info().page, 2);

        table.header_click(0).unwrap();
        assert_eq!(table.page_info().page, 0);
        assert_eq!(table.info_text(), "Showing 1 to 10 of 25 entries");
    }

    #[test]
    fn test_listener_sequence_for_search() {
        let element = names(5);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for event in [Event::Order, Event::Search, Event::Draw] {
            let sink = seen.clone();
            table.on(event, move |_, n| sink.borrow_mut().push((n.event, n.bubbles)));
        }

        table.order(Some((0, SortDirection::Asc))).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![(Event::Order, false), (Event::Search, false), (Event::Draw, true)]
        );
    }

    #[test]
    fn test_throw_mode_surfaces_missing_data() {
        let mut rows: Vec<Vec<String>> = vec![vec!["a".to_string(), "b".to_string()]];
        rows.push(vec!["c".to_string()]);
        let element = build_table(&["A", "B"], &rows);

        // Log mode draws the short row with a blank cell.
        let table = DataTable::new(&element, Options::default()).unwrap();
        assert_eq!(table.rendered_rows().len(), 2);
        let short = table.settings().rows().get(1).unwrap();
        assert_eq!(short.cells().unwrap().len(), 2);
        assert_eq!(short.cells().unwrap()[1].borrow().text_content(), "");

        let element = build_table(&["A", "B"], &rows);
        let options = Options::from_json(r#"{"errMode": "throw"}"#).unwrap();
        assert_eq!(
            DataTable::new(&element, options).unwrap_err(),
            GridError::ColumnCountMismatch { row: 1, expected: 2, found: 1 }
        );
    }
}
