/// Initialisation options
///
/// Options are plain serde structs so they can be written inline or loaded
/// from JSON with the familiar camelCase keys:
///
/// ```
/// use livegrid::options::Options;
/// use livegrid::settings::DisplayLength;
///
/// let options = Options::from_json(r#"{
///     "pageLength": 25,
///     "order": [1, "desc"],
///     "columns": [{"searchable": false}, {"type": "num"}]
/// }"#).unwrap();
///
/// assert_eq!(options.page_length, DisplayLength::Rows(25));
/// assert!(options.searching);
/// ```

use serde::{Deserialize, Serialize};

use crate::error::{ErrMode, GridError};
use crate::settings::DisplayLength;
use crate::sort::SortDirection;
use crate::types::DataType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub searching: bool,
    pub paging: bool,
    pub ordering: bool,
    pub page_length: DisplayLength,
    pub display_start: usize,
    /// Initial sort as `[column, "asc" | "desc"]`.
    pub order: Option<(usize, SortDirection)>,
    pub search: SearchOptions,
    pub columns: Vec<ColumnOptions>,
    pub language: Language,
    pub err_mode: ErrMode,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            searching: true,
            paging: true,
            ordering: true,
            page_length: DisplayLength::default(),
            display_start: 0,
            order: None,
            search: SearchOptions::default(),
            columns: Vec::new(),
            language: Language::default(),
            err_mode: ErrMode::default(),
        }
    }
}

impl Options {
    pub fn from_json(json: &str) -> Result<Options, GridError> {
        serde_json::from_str(json).map_err(|e| GridError::InvalidOptions(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GridError> {
        serde_json::to_string(self).map_err(|e| GridError::InvalidOptions(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Initial global search text.
    pub search: String,
    pub smart: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnOptions {
    pub title: Option<String>,
    pub searchable: Option<bool>,
    pub orderable: Option<bool>,
    #[serde(rename = "type")]
    pub data_type: Option<DataType>,
    pub width: Option<String>,
}

/// User-facing strings. `_START_`, `_END_`, `_TOTAL_` and `_MAX_` are
/// substituted in the info strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub empty_table: String,
    pub zero_records: String,
    pub info: String,
    pub info_empty: String,
    pub info_filtered: String,
}

impl Default for Language {
    fn default() -> Self {
        Language {
            empty_table: "No data available in table".to_string(),
            zero_records: "No matching records found".to_string(),
            info: "Showing _START_ to _END_ of _TOTAL_ entries".to_string(),
            info_empty: "Showing 0 to 0 of 0 entries".to_string(),
            info_filtered: "(filtered from _MAX_ total entries)".to_string(),
        }
    }
}
