/// Column data types and their formatters.
///
/// A column's type decides how its cells turn into search text and sort keys.
/// Types are declared in the options or detected from the raw data.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::row::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Num,
    Html,
}

/// Memoized sort key for one cell.
///
/// Numbers sort before text. Keys built by [`DataType::sort_key`] are never
/// NaN; [`SortKey::total_cmp`] still orders one if it appears.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Total order over keys, suitable for `sort_by`.
    pub fn total_cmp(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Num => "num",
            DataType::Html => "html",
        }
    }

    /// Detect a column type from its raw values. Empty placeholders are skipped.
    pub fn detect<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> DataType {
        let mut all_numeric = true;
        let mut saw_value = false;
        let mut saw_markup = false;

        for value in values {
            match value {
                CellValue::Null => {}
                CellValue::Node(_) => {
                    saw_value = true;
                    saw_markup = true;
                    all_numeric = false;
                }
                CellValue::Text(text) => {
                    if is_empty_placeholder(text) {
                        continue;
                    }
                    saw_value = true;
                    if parse_number(text).is_none() {
                        all_numeric = false;
                        if looks_like_markup(text) {
                            saw_markup = true;
                        }
                    }
                }
            }
        }

        if saw_value && all_numeric {
            DataType::Num
        } else if saw_markup {
            DataType::Html
        } else {
            DataType::String
        }
    }

    /// Text used for searching this cell.
    pub fn filter_format(&self, value: &CellValue) -> String {
        let text = match value {
            CellValue::Text(text) => text.as_str(),
            CellValue::Node(node) => return self.filter_format(&CellValue::Text(node.borrow().inner_html())),
            CellValue::Null => return String::new(),
        };

        match self {
            DataType::String | DataType::Num => strip_diacritics(&normalize_new_lines(text)),
            DataType::Html => strip_diacritics(&normalize_new_lines(&strip_tags(text))),
        }
    }

    pub fn sort_key(&self, value: &CellValue) -> SortKey {
        let text = match value {
            CellValue::Text(text) => text.as_str(),
            CellValue::Node(node) => return self.sort_key(&CellValue::Text(node.borrow().inner_html())),
            CellValue::Null => "",
        };

        match self {
            DataType::String => string_sort_key(text),
            DataType::Html => string_sort_key(strip_tags(text).trim()),
            DataType::Num => {
                // Placeholders and unparsable text sort below every number.
                let number = if is_empty_placeholder(text) {
                    None
                } else {
                    parse_number(text)
                };
                SortKey::Number(number.unwrap_or(f64::NEG_INFINITY))
            }
        }
    }
}

fn string_sort_key(text: &str) -> SortKey {
    if is_empty_placeholder(text) {
        SortKey::Text(String::new())
    } else {
        SortKey::Text(text.to_lowercase())
    }
}

/// Empty string or a lone dash.
pub fn is_empty_placeholder(text: &str) -> bool {
    text.is_empty() || text == "-"
}

/// Parse a formatted number, ignoring currency symbols, thousands separators
/// and percent signs.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(*c, ',' | '\'' | '_' | '%' | '$' | '£' | '€' | '¥') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty()
        || !cleaned.chars().any(|c| c.is_ascii_digit())
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }

    cleaned.parse::<f64>().ok()
}

fn looks_like_markup(text: &str) -> bool {
    match (text.find('<'), text.rfind('>')) {
        (Some(open), Some(close)) => open < close,
        _ => false,
    }
}

/// Remove `<...>` tags, keeping the text between them.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Replace CR, LF and U+2028 with a space.
pub fn normalize_new_lines(text: &str) -> String {
    text.replace(['\r', '\n', '\u{2028}'], " ")
}

/// Fold accented Latin letters to their base letter and drop combining marks.
pub fn strip_diacritics(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ('\u{0300}'..='\u{036f}').contains(&c) {
            continue;
        }
        match fold_latin(c) {
            Some(base) => out.push_str(base),
            None => out.push(c),
        }
    }
    out
}

fn fold_latin(c: char) -> Option<&'static str> {
    let base = match c {
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à'..='å' | 'ā' | 'ă' | 'ą' => "a",
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ď' | 'Đ' => "D",
        'ď' | 'đ' => "d",
        'È'..='Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ì'..='Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => "N",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Ù'..='Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ý' | 'Ŷ' | 'Ÿ' => "Y",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}
