//! Data model for statement walking.
//!
//! The grid types describe the input produced by upstream table extraction;
//! the ledger types describe the flattened output.

mod grid;
mod ledger;

pub use grid::{Cell, Grid, Page, Row};
pub use ledger::{Direction, LedgerEntry};
