/// Redraw and pagination coordinator
///
/// A full redraw runs a fixed pipeline: sort, filter, return to the first
/// page, then draw. Drawing slices the visible window out of the display
/// order, makes sure every row in it has a rendered element, and swaps the
/// table body's children for exactly those rows in one step. Paging alone
/// only moves the window and draws; it never re-sorts or re-filters.

use std::str::FromStr;

use crate::dom::{Element, ElementRef, Node};
use crate::error::GridError;
use crate::events::{Detail, Event};
use crate::filter::filter_complete;
use crate::resolver::{cell_data, display_string, Purpose};
use crate::row::{create_cell, render_cell, CellValue};
use crate::settings::{DisplayLength, Settings};
use crate::sort::sort;

/// Page movement requested by a paging control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
    /// Zero-based page number.
    Page(usize),
}

impl FromStr for PageAction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(PageAction::First),
            "previous" => Ok(PageAction::Previous),
            "next" => Ok(PageAction::Next),
            "last" => Ok(PageAction::Last),
            other => other
                .parse::<usize>()
                .map(PageAction::Page)
                .map_err(|_| GridError::UnknownPagingAction(other.to_string())),
        }
    }
}

/// Snapshot of the paging state, for info and pagination widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub pages: usize,
    pub start: usize,
    pub end: usize,
    pub length: DisplayLength,
    pub records_total: usize,
    pub records_display: usize,
}

/// Re-run sort and filter into the display order.
pub fn recompute(settings: &mut Settings) -> Result<(), GridError> {
    if settings.features.ordering {
        sort(settings)?;
    }
    if settings.features.searching {
        let search = settings.search.text.clone();
        filter_complete(settings, &search)?;
    } else {
        settings.display_order = settings.sorted_order.clone();
    }
    Ok(())
}

/// Full redraw: optionally re-sort and re-filter, then back to page one.
pub fn re_draw(settings: &mut Settings, recompute_order: bool) -> Result<(), GridError> {
    if recompute_order {
        recompute(settings)?;
    }
    settings.display_start = 0;
    draw(settings)
}

/// Render the current window into the table body.
pub fn draw(settings: &mut Settings) -> Result<(), GridError> {
    settings.draw_counter += 1;

    if let Some(start) = settings.init_display_start.take() {
        settings.display_start = if start >= settings.records_display() { 0 } else { start };
    }

    // Only an empty display order gets the placeholder. A start sitting exactly
    // on the record count (`Page(n)` with `n * len == records`) draws no rows.
    let nodes = if settings.display_order.is_empty() {
        vec![Node::Element(placeholder_row(settings))]
    } else {
        let (start, end) = settings.display_window();
        let window: Vec<usize> = settings.display_order[start..end].to_vec();
        let mut nodes = Vec::with_capacity(window.len());
        for row in window {
            nodes.push(Node::Element(materialize(settings, row)?));
        }
        nodes
    };

    log::debug!(
        "draw {}: {} row(s) from {} of {}",
        settings.draw_counter,
        nodes.len(),
        settings.display_start,
        settings.records_display()
    );
    settings.body.borrow_mut().replace_children(nodes);
    settings.trigger(Event::Draw, Detail::None);
    Ok(())
}

/// Bind a row to its rendered element, creating it on first use.
///
/// Rows scanned from the document adopt their original `<tr>`; rows added
/// later get a new element built from their display values. Either way the
/// element is created once and reused on every later draw.
pub fn materialize(settings: &mut Settings, row: usize) -> Result<ElementRef, GridError> {
    let record = settings.rows.get_mut(row).ok_or(GridError::RowOutOfRange(row))?;
    if let Some(element) = record.element() {
        return Ok(element.clone());
    }

    let (tr, cells) = match record.take_source() {
        Some(tr) => {
            let mut cells = tr.borrow().child_elements_by_tag(&["td", "th"]);
            cells.truncate(settings.columns.len());
            // Cells edited since the scan show their current value.
            for (column, cell) in cells.iter().enumerate() {
                let current = settings.rows.get(row).and_then(|r| r.raw(column)).cloned();
                if let Some(value) = current {
                    if value != CellValue::from_cell(cell) {
                        render_cell(cell, &cell_data(settings, row, column, Purpose::Display)?);
                    }
                }
            }
            // Short rows get blank cells for the columns they lack.
            for column in cells.len()..settings.columns.len() {
                let value = cell_data(settings, row, column, Purpose::Display)?;
                let td = create_cell(&value);
                tr.borrow_mut().append_element(td.clone());
                cells.push(td);
            }
            (tr, cells)
        }
        None => {
            let tr = Element::new_ref("tr");
            let mut cells = Vec::with_capacity(settings.columns.len());
            for column in 0..settings.columns.len() {
                let value = cell_data(settings, row, column, Purpose::Display)?;
                display_string(settings, row, column)?;
                let td = create_cell(&value);
                tr.borrow_mut().append_element(td.clone());
                cells.push(td);
            }
            (tr, cells)
        }
    };

    if let Some(record) = settings.rows.get_mut(row) {
        record.bind(tr.clone(), cells);
    }
    Ok(tr)
}

/// Single row spanning the visible columns with the empty-table message, or
/// the no-match message when rows exist but none pass the search.
fn placeholder_row(settings: &Settings) -> ElementRef {
    let message = if settings.records_total() == 0 {
        &settings.language.empty_table
    } else {
        &settings.language.zero_records
    };

    let td = Element::with_text("td", message.as_str());
    {
        let mut td = td.borrow_mut();
        td.set_attribute("colspan", settings.columns.visible_count().max(1).to_string());
        td.set_attribute("class", "dt-empty");
    }
    let tr = Element::new_ref("tr");
    tr.borrow_mut().append_element(td);
    tr
}

/// Move the display start. Returns whether it changed; draws only if it did
/// and `redraw` is set.
pub fn page_change(settings: &mut Settings, action: PageAction, redraw: bool) -> Result<bool, GridError> {
    let records = settings.records_display();
    let current = settings.display_start;

    let start = match settings.display_length.rows() {
        None => 0,
        Some(_) if records == 0 || !settings.features.paging => 0,
        Some(len) => match action {
            PageAction::First => 0,
            PageAction::Previous => current.saturating_sub(len),
            PageAction::Next => {
                if current + len < records {
                    current + len
                } else {
                    current
                }
            }
            PageAction::Last => ((records - 1) / len) * len,
            PageAction::Page(page) => {
                let start = page.saturating_mul(len);
                if start > records {
                    0
                } else {
                    start
                }
            }
        },
    };

    finish_page_change(settings, start, redraw)
}

/// Page change from a control's action token (`first`, `next`, `3`, ...).
/// An unknown token is reported and leaves the page where it is.
pub fn page_change_token(settings: &mut Settings, token: &str, redraw: bool) -> Result<bool, GridError> {
    match token.parse::<PageAction>() {
        Ok(action) => page_change(settings, action, redraw),
        Err(err) => {
            settings.report(err)?;
            let start = settings.display_start;
            finish_page_change(settings, start, redraw)
        }
    }
}

fn finish_page_change(settings: &mut Settings, start: usize, redraw: bool) -> Result<bool, GridError> {
    let changed = settings.display_start != start;
    settings.display_start = start;

    if changed {
        settings.trigger(Event::Page, Detail::Page { start });
        if redraw {
            draw(settings)?;
        }
    } else {
        settings.trigger(Event::PageNoChange, Detail::Page { start });
    }
    Ok(changed)
}

/// Set the page length and pull the start back inside the data.
pub fn length_change(settings: &mut Settings, length: DisplayLength) {
    settings.display_length = length;
    length_overflow(settings);
    settings.trigger(Event::Length, Detail::Length(length));
}

/// Keep the start on a page boundary that still shows rows.
fn length_overflow(settings: &mut Settings) {
    let Some(len) = settings.display_length.rows() else {
        settings.display_start = 0;
        return;
    };

    let end = settings.display_end();
    let mut start = settings.display_start as i64;
    let len = len as i64;

    if start >= end as i64 {
        start = end as i64 - len;
    }
    start -= start % len;
    settings.display_start = start.max(0) as usize;
}

pub fn page_info(settings: &Settings) -> PageInfo {
    let records_display = settings.records_display();
    let (start, end) = settings.display_window();
    let (page, pages) = match settings.display_length.rows() {
        Some(len) if settings.features.paging => (start / len, records_display.div_ceil(len)),
        _ => (0, 1),
    };

    PageInfo {
        page,
        pages,
        start,
        end,
        length: settings.display_length,
        records_total: settings.records_total(),
        records_display,
    }
}

/// Info line such as "Showing 1 to 10 of 57 entries".
pub fn info_text(settings: &Settings) -> String {
    let info = page_info(settings);
    let language = &settings.language;

    let template = if info.records_display == 0 {
        &language.info_empty
    } else {
        &language.info
    };
    let mut out = substitute(template, &info);

    if info.records_display != info.records_total {
        out.push(' ');
        out.push_str(&substitute(&language.info_filtered, &info));
    }
    out
}

fn substitute(template: &str, info: &PageInfo) -> String {
    let first = if info.records_display == 0 { 0 } else { info.start + 1 };
    template
        .replace("_START_", &first.to_string())
        .replace("_END_", &info.end.to_string())
        .replace("_TOTAL_", &info.records_display.to_string())
        .replace("_MAX_", &info.records_total.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build_table;
    use crate::options::Options;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn settings_with_rows(n: usize) -> Settings {
        let rows: Vec<Vec<String>> = (0..n).map(|i| vec![format!("Row{:02}", i)]).collect();
        let table = build_table(&["Name"], &rows);
        Settings::from_element(&table, &Options::default()).unwrap()
    }

    fn body_rows(settings: &Settings) -> Vec<ElementRef> {
        settings.body.borrow().child_elements_by_tag(&["tr"])
    }

    #[test]
    fn test_page_action_tokens() {
        assert_eq!("next".parse::<PageAction>(), Ok(PageAction::Next));
        assert_eq!("4".parse::<PageAction>(), Ok(PageAction::Page(4)));
        assert_eq!(
            "sideways".parse::<PageAction>(),
            Err(GridError::UnknownPagingAction("sideways".to_string()))
        );
    }

    #[test]
    fn test_draw_renders_window() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();

        let rows = body_rows(&settings);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].borrow().text_content(), "Row00");
        assert_eq!(rows[0].borrow().attribute("data-dt-row"), Some("0"));
    }

    #[test]
    fn test_draw_twice_is_idempotent() {
        let mut settings = settings_with_rows(12);
        re_draw(&mut settings, true).unwrap();
        let first = body_rows(&settings);
        draw(&mut settings).unwrap();
        let second = body_rows(&settings);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert!(Rc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_page_navigation() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();

        assert!(!page_change(&mut settings, PageAction::Previous, true).unwrap());
        assert_eq!(settings.display_start, 0);

        assert!(page_change(&mut settings, PageAction::Next, true).unwrap());
        assert_eq!(settings.display_start, 10);
        assert!(page_change(&mut settings, PageAction::Next, true).unwrap());
        assert_eq!(settings.display_start, 20);
        assert!(!page_change(&mut settings, PageAction::Next, true).unwrap());
        assert_eq!(body_rows(&settings).len(), 5);

        assert!(page_change(&mut settings, PageAction::First, true).unwrap());
        assert!(page_change(&mut settings, PageAction::Last, true).unwrap());
        assert_eq!(settings.display_start, 20);

        assert!(page_change(&mut settings, PageAction::Page(1), true).unwrap());
        assert_eq!(settings.display_start, 10);
        assert!(page_change(&mut settings, PageAction::Page(7), true).unwrap());
        assert_eq!(settings.display_start, 0);
    }

    #[test]
    fn test_page_change_with_all_rows() {
        let mut settings = settings_with_rows(25);
        settings.display_length = DisplayLength::All;
        settings.display_start = 5;
        assert!(page_change(&mut settings, PageAction::Next, false).unwrap());
        assert_eq!(settings.display_start, 0);
    }

    #[test]
    fn test_page_events() {
        let mut settings = settings_with_rows(15);
        re_draw(&mut settings, true).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for event in [Event::Page, Event::PageNoChange] {
            let sink = seen.clone();
            settings.events.on(event, move |_, n| sink.borrow_mut().push(n.event));
        }

        page_change(&mut settings, PageAction::Next, true).unwrap();
        page_change(&mut settings, PageAction::Next, true).unwrap();
        page_change_token(&mut settings, "bogus", true).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![Event::Page, Event::PageNoChange, Event::PageNoChange]
        );
    }

    #[test]
    fn test_unknown_token_throws_in_throw_mode() {
        let mut settings = settings_with_rows(3);
        settings.reporter.set_mode(crate::error::ErrorMode::Throw);
        assert_eq!(
            page_change_token(&mut settings, "up", true),
            Err(GridError::UnknownPagingAction("up".to_string()))
        );
    }

    #[test]
    fn test_length_change_clamps_start() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();
        page_change(&mut settings, PageAction::Last, false).unwrap();
        assert_eq!(settings.display_start, 20);

        length_change(&mut settings, DisplayLength::Rows(50));
        assert_eq!(settings.display_start, 0);

        settings.display_length = DisplayLength::Rows(10);
        settings.display_start = 20;
        length_change(&mut settings, DisplayLength::Rows(15));
        assert_eq!(settings.display_start, 15);

        length_change(&mut settings, DisplayLength::All);
        assert_eq!(settings.display_start, 0);
    }

    #[test]
    fn test_placeholder_messages() {
        let mut settings = settings_with_rows(0);
        draw(&mut settings).unwrap();
        let rows = body_rows(&settings);
        assert_eq!(rows.len(), 1);
        let td = rows[0].borrow().child_elements_by_tag(&["td"])[0].clone();
        assert_eq!(td.borrow().text_content(), "No data available in table");
        assert_eq!(td.borrow().attribute("colspan"), Some("1"));

        let mut settings = settings_with_rows(3);
        settings.search.text = "zzz".to_string();
        re_draw(&mut settings, true).unwrap();
        let rows = body_rows(&settings);
        assert_eq!(rows[0].borrow().text_content(), "No matching records found");
    }

    #[test]
    fn test_searching_disabled_shows_all() {
        let rows: Vec<Vec<String>> = (0..3).map(|i| vec![i.to_string()]).collect();
        let table = build_table(&["N"], &rows);
        let options = Options::from_json(r#"{"searching": false, "search": {"search": "1"}}"#).unwrap();
        let mut settings = Settings::from_element(&table, &options).unwrap();

        re_draw(&mut settings, true).unwrap();
        assert_eq!(settings.display_order(), &[0, 1, 2]);
    }

    #[test]
    fn test_initial_display_start() {
        let rows: Vec<Vec<String>> = (0..30).map(|i| vec![i.to_string()]).collect();
        let table = build_table(&["N"], &rows);
        let options = Options::from_json(r#"{"displayStart": 20}"#).unwrap();
        let mut settings = Settings::from_element(&table, &options).unwrap();

        recompute(&mut settings).unwrap();
        draw(&mut settings).unwrap();
        assert_eq!(settings.display_start, 20);

        // Only honoured once.
        re_draw(&mut settings, false).unwrap();
        assert_eq!(settings.display_start, 0);
    }

    #[test]
    fn test_info_text() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();
        assert_eq!(info_text(&settings), "Showing 1 to 10 of 25 entries");

        settings.search.text = "Row1".to_string();
        re_draw(&mut settings, true).unwrap();
        assert_eq!(
            info_text(&settings),
            "Showing 1 to 10 of 10 entries (filtered from 25 total entries)"
        );

        settings.search.text = "none".to_string();
        re_draw(&mut settings, true).unwrap();
        assert_eq!(
            info_text(&settings),
            "Showing 0 to 0 of 0 entries (filtered from 25 total entries)"
        );
    }

    #[test]
    fn test_page_info() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();
        page_change(&mut settings, PageAction::Next, true).unwrap();

        let info = page_info(&settings);
        assert_eq!(info.page, 1);
        assert_eq!(info.pages, 3);
        assert_eq!((info.start, info.end), (10, 20));
        assert_eq!(info.records_total, 25);
    }

    #[test]
    fn test_short_rows_padded_and_reported_once_per_draw() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
            vec!["d".to_string()],
        ];
        let table = build_table(&["A", "B"], &rows);
        let mut settings = Settings::from_element(&table, &Options::default()).unwrap();
        let reports = Rc::new(RefCell::new(0));
        let sink = reports.clone();
        settings
            .reporter
            .set_mode(crate::error::ErrorMode::Callback(Rc::new(move |_: &GridError| *sink.borrow_mut() += 1)));

        // One report from building the search rows, one from the draw.
        re_draw(&mut settings, true).unwrap();
        assert_eq!(*reports.borrow(), 2);
        for row in 1..3 {
            let cells = settings.rows.get(row).unwrap().cells().unwrap();
            assert_eq!(cells.len(), 2);
            assert_eq!(cells[1].borrow().text_content(), "");
        }

        draw(&mut settings).unwrap();
        assert_eq!(*reports.borrow(), 2);
    }

    #[test]
    fn test_page_change_ignored_without_paging() {
        let mut settings = settings_with_rows(25);
        settings.features.paging = false;
        re_draw(&mut settings, true).unwrap();

        assert!(!page_change(&mut settings, PageAction::Next, true).unwrap());
        assert!(!page_change(&mut settings, PageAction::Last, true).unwrap());
        assert_eq!(settings.display_start, 0);
        assert_eq!(page_info(&settings).page, 0);
        assert_eq!(body_rows(&settings).len(), 25);
    }

    #[test]
    fn test_page_at_record_count_draws_empty_body() {
        let mut settings = settings_with_rows(20);
        re_draw(&mut settings, true).unwrap();

        assert!(page_change(&mut settings, PageAction::Page(2), true).unwrap());
        assert_eq!(settings.display_start, 20);
        assert_eq!(settings.display_window(), (20, 20));
        assert!(body_rows(&settings).is_empty());

        // One page further resets to the first page.
        assert!(page_change(&mut settings, PageAction::Page(3), true).unwrap());
        assert_eq!(settings.display_start, 0);
        assert_eq!(body_rows(&settings).len(), 10);
    }

    #[test]
    fn test_adopted_row_shows_edit_made_before_first_draw() {
        let mut settings = settings_with_rows(25);
        re_draw(&mut settings, true).unwrap();
        assert!(!settings.rows.get(20).unwrap().is_materialized());

        settings.rows.get_mut(20).unwrap().set_raw(0, "Changed".into());
        page_change(&mut settings, PageAction::Last, true).unwrap();

        let rows = body_rows(&settings);
        assert_eq!(rows[0].borrow().text_content(), "Changed");
        assert_eq!(rows[1].borrow().text_content(), "Row21");
    }
}
