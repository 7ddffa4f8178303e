//! Error types for stmtledger.

use std::io;
use thiserror::Error;

/// Result type alias for stmtledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while walking a statement grid.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading grid files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The grid JSON could not be decoded.
    #[error("Grid JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The cursor was asked for a row past the end of the input.
    ///
    /// The run loop treats this as the normal end of a document; it only
    /// reaches callers that drive a [`RowCursor`](crate::parser::RowCursor)
    /// themselves.
    #[error("Out of document at page {page}, row {row}")]
    OutOfDocument {
        /// Page index the cursor pointed at
        page: usize,
        /// Row index the cursor pointed at
        row: usize,
    },

    /// No outgoing transition of the current state accepted the next row.
    #[error("Stuck in state '{state}' at page {page}, row {row}: {text:?}")]
    StuckState {
        /// Tag of the state the run loop could not leave
        state: String,
        /// Page index of the unconsumed row
        page: usize,
        /// Row index of the unconsumed row
        row: usize,
        /// Cell texts of the unconsumed row
        text: Vec<String>,
    },

    /// A section's fixed field layout did not match the row it consumed.
    #[error("Malformed field in '{state}': {reason} (row: {row:?})")]
    MalformedField {
        /// Tag of the section that was extracting
        state: String,
        /// Cell texts of the offending row
        row: Vec<String>,
        /// What was expected
        reason: String,
    },

    /// Two sections were registered under the same tag.
    #[error("Duplicate section tag: {0}")]
    DuplicateTag(String),

    /// No grammar is registered under the requested name.
    #[error("Unknown grammar: {0}")]
    UnknownGrammar(String),

    /// A boundary pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Amount text is not an accounting-style currency value.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Date text matched none of the accepted formats.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::MalformedField`] from a section tag and the raw row.
    pub fn malformed(state: &str, row: &[String], reason: impl Into<String>) -> Self {
        Error::MalformedField {
            state: state.to_string(),
            row: row.to_vec(),
            reason: reason.into(),
        }
    }

    /// Whether this error only signals that the input ran out.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::OutOfDocument { .. })
    }
}
