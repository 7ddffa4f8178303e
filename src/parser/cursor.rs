//! Forward-only cursor over the page/row grid.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Grid, Row};

/// A `(page, row)` location in the grid.
///
/// Ordering is lexicographic, which is the order the cursor moves in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Zero-based page index
    pub page: usize,
    /// Zero-based row index within the page
    pub row: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} row {}", self.page, self.row)
    }
}

/// Cursor over a borrowed grid.
///
/// The four methods `current_row`, `consume_row`, `consume_page` and
/// `is_last_page` are the only way to observe or move it.
#[derive(Debug)]
pub struct RowCursor<'g> {
    grid: &'g Grid,
    page: usize,
    row: usize,
    col: usize,
}

impl<'g> RowCursor<'g> {
    /// Create a cursor at the first row of the first page.
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            page: 0,
            row: 0,
            col: 0,
        }
    }

    /// Current position.
    pub fn position(&self) -> Position {
        Position {
            page: self.page,
            row: self.row,
        }
    }

    /// Row at the current position, without consuming it.
    pub fn current_row(&self) -> Result<&'g Row> {
        self.grid
            .pages
            .get(self.page)
            .and_then(|page| page.rows.get(self.row))
            .ok_or(Error::OutOfDocument {
                page: self.page,
                row: self.row,
            })
    }

    /// Return the current row and advance to the next one on the same page.
    pub fn consume_row(&mut self) -> Result<&'g Row> {
        let row = self.current_row()?;
        log::trace!("consume {}: {}", self.position(), row.layout_string());
        self.row += 1;
        Ok(row)
    }

    /// Move to the first row of the next page.
    pub fn consume_page(&mut self) {
        self.col = 0;
        self.row = 0;
        self.page += 1;
        log::debug!("cursor moved to page {}", self.page);
    }

    /// Whether the cursor is on the last page (or past it).
    pub fn is_last_page(&self) -> bool {
        self.page + 1 >= self.grid.page_count()
    }

    /// Column index within the current row; reset on every page change.
    pub fn column(&self) -> usize {
        self.col
    }
}
