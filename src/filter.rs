/// Filter engine
///
/// Each row carries a cached search string: the filter text of every
/// searchable column, entity-decoded, with line breaks removed, joined by two
/// spaces. A filter pass rebuilds missing caches, resets the display order to
/// a full copy of the sorted master order, and keeps the rows whose search
/// string contains the search text.
///
/// The default match is a case-sensitive substring test. Smart mode is opt-in:
/// case-insensitive terms that must all be present in any order, with
/// `"quoted phrases"` and `!negated` terms.

use crate::column::ensure_type;
use crate::error::GridError;
use crate::events::{Detail, Event};
use crate::resolver::{cell_data, Purpose};
use crate::row::CellValue;
use crate::settings::Settings;
use crate::types::strip_diacritics;

/// One smart-search term, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub negate: bool,
}

/// A compiled search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Substring(String),
    Smart(Vec<Term>),
}

impl Matcher {
    pub fn new(search: &str, smart: bool) -> Matcher {
        let search = strip_diacritics(search);
        if smart {
            Matcher::Smart(parse_terms(&search))
        } else {
            Matcher::Substring(search)
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Matcher::Substring(needle) => haystack.contains(needle.as_str()),
            Matcher::Smart(terms) => {
                let haystack = haystack.to_lowercase();
                terms
                    .iter()
                    .all(|term| haystack.contains(term.text.as_str()) != term.negate)
            }
        }
    }
}

/// Split smart search input into lower-cased terms.
fn parse_terms(input: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negate = false;
        if c == '!' {
            chars.next();
            match chars.peek() {
                Some(&next) if !next.is_whitespace() => negate = true,
                // A lone `!` is an ordinary character.
                _ => {
                    terms.push(Term { text: "!".to_string(), negate: false });
                    continue;
                }
            }
        }

        let mut text = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                text.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
        }

        if !text.is_empty() {
            terms.push(Term {
                text: text.to_lowercase(),
                negate,
            });
        }
    }

    terms
}

/// Decode entities and drop CR, LF and U+2028.
fn normalize_filter_text(text: &str) -> String {
    let decoded = if text.contains('&') {
        html_escape::decode_html_entities(text).into_owned()
    } else {
        text.to_string()
    };
    decoded.replace(['\r', '\n', '\u{2028}'], "")
}

/// Rebuild the search caches of rows that lost them.
pub fn build_search_rows(settings: &mut Settings) -> Result<(), GridError> {
    for column in 0..settings.columns.len() {
        ensure_type(settings, column)?;
    }

    let column_count = settings.columns.len();
    let mut built = 0;
    for row in 0..settings.rows.len() {
        if settings.rows.get(row).and_then(|r| r.filter_row()).is_some() {
            continue;
        }

        let mut keys = Vec::with_capacity(column_count);
        for column in 0..column_count {
            let searchable = settings
                .columns
                .get(column)
                .map(|c| c.is_searchable())
                .unwrap_or(false);
            let key = if searchable {
                match cell_data(settings, row, column, Purpose::Filter)? {
                    CellValue::Text(text) => normalize_filter_text(&text),
                    _ => String::new(),
                }
            } else {
                String::new()
            };
            keys.push(key);
        }

        if let Some(record) = settings.rows.get_mut(row) {
            record.filter_row = Some(keys.join("  "));
            record.filter_cache = Some(keys);
        }
        built += 1;
    }

    if built > 0 {
        log::trace!("built search cache for {} rows", built);
    }
    Ok(())
}

/// Run a full filter pass for `search`, narrowing the display order.
pub fn filter_complete(settings: &mut Settings, search: &str) -> Result<(), GridError> {
    build_search_rows(settings)?;

    settings.search.text = search.to_string();
    settings.display_order = settings.sorted_order.clone();

    if !search.is_empty() {
        let matcher = Matcher::new(search, settings.search.smart);
        let rows = &settings.rows;
        settings.display_order.retain(|&idx| {
            rows.get(idx)
                .and_then(|r| r.filter_row())
                .map(|haystack| matcher.matches(haystack))
                .unwrap_or(false)
        });
    }

    filter_columns(settings);

    log::debug!(
        "search {:?} kept {} of {} rows",
        search,
        settings.display_order.len(),
        settings.master_order.len()
    );
    settings.trigger(Event::Search, Detail::Search(search.to_string()));
    Ok(())
}

/// Apply column-level search texts against each column's filter key.
fn filter_columns(settings: &mut Settings) {
    let smart = settings.search.smart;
    let column_matchers: Vec<(usize, Matcher)> = settings
        .columns
        .iter()
        .filter(|c| !c.search().is_empty())
        .map(|c| (c.index(), Matcher::new(c.search(), smart)))
        .collect();

    if column_matchers.is_empty() {
        return;
    }

    let rows = &settings.rows;
    settings.display_order.retain(|&idx| {
        let Some(row) = rows.get(idx) else {
            return false;
        };
        column_matchers.iter().all(|(column, matcher)| {
            row.filter_key(*column)
                .map(|key| matcher.matches(key))
                .unwrap_or(false)
        })
    });
}
