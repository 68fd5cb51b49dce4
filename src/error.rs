/// Error types and the reporting hook for the grid core.
///
/// Structural problems (bad row shapes, unknown paging actions, missing cell
/// data) are routed through an [`ErrorReporter`]. The default mode logs a
/// warning and lets the operation continue; `Throw` turns the same warning into
/// an `Err` returned from whichever operation hit it.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The element handed to the constructor is not a `<table>`.
    #[error("non-table node initialisation ({tag})")]
    NotATable { tag: String },

    #[error("incorrect column count in row {row}: expected {expected}, found {found}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("requested unknown parameter {column} for row {row}")]
    MissingCellData { row: usize, column: usize },

    #[error("unknown paging action: {0}")]
    UnknownPagingAction(String),

    #[error("row index {0} out of range")]
    RowOutOfRange(usize),

    #[error("column index {0} out of range")]
    ColumnOutOfRange(usize),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// How reported warnings are surfaced, as named in the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrMode {
    #[default]
    Log,
    Throw,
}

/// Callback installed with [`ErrorMode::Callback`].
pub type ErrorCallback = Rc<dyn Fn(&GridError)>;

#[derive(Clone, Default)]
pub enum ErrorMode {
    /// Emit a `log::warn!` record and carry on.
    #[default]
    Log,
    /// Return the warning as an `Err` from the triggering operation.
    Throw,
    /// Hand the warning to a user callback and carry on.
    Callback(ErrorCallback),
}

impl fmt::Debug for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMode::Log => write!(f, "Log"),
            ErrorMode::Throw => write!(f, "Throw"),
            ErrorMode::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl From<ErrMode> for ErrorMode {
    fn from(mode: ErrMode) -> Self {
        match mode {
            ErrMode::Log => ErrorMode::Log,
            ErrMode::Throw => ErrorMode::Throw,
        }
    }
}

/// The single seam through which structural warnings leave the core.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    mode: ErrorMode,
}

impl ErrorReporter {
    pub fn new(mode: ErrorMode) -> Self {
        ErrorReporter { mode }
    }

    pub fn mode(&self) -> &ErrorMode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: ErrorMode) {
        self.mode = mode;
    }

    /// Report a warning. Only `Throw` mode yields an `Err`.
    pub fn report(&self, error: GridError) -> Result<(), GridError> {
        match &self.mode {
            ErrorMode::Log => {
                log::warn!("livegrid: {}", error);
                Ok(())
            }
            ErrorMode::Throw => Err(error),
            ErrorMode::Callback(callback) => {
                callback(&error);
                Ok(())
            }
        }
    }
}
