//! Grid types: the page/row/cell structure produced by table extraction.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

/// A positioned text cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell text
    #[serde(default)]
    pub text: String,

    /// Left edge in points
    #[serde(default)]
    pub left: f32,

    /// Cell width in points
    #[serde(default)]
    pub width: f32,
}

impl Cell {
    /// Create a cell with position.
    pub fn new(text: impl Into<String>, left: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            left,
            width,
        }
    }

    /// Create a cell with text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, 0.0, 0.0)
    }

    /// Check if the cell has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An ordered sequence of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    /// Cells left to right
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a row from cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_texts<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(Cell::text).collect())
    }

    /// Text of the cell at `index`, if present.
    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text.as_str())
    }

    /// Text of the first cell, or an empty string.
    pub fn first_text(&self) -> &str {
        self.text_at(0).unwrap_or("")
    }

    /// All cell texts, empty ones included.
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.text.clone()).collect()
    }

    /// Texts of the non-empty cells.
    pub fn non_empty_texts(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.text.clone())
            .collect()
    }

    /// Non-empty cell texts joined with single spaces.
    pub fn joined(&self) -> String {
        self.non_empty_texts().join(" ")
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Debug line with cell positions and clipped texts.
    pub(crate) fn layout_string(&self) -> String {
        self.cells
            .iter()
            .map(|c| format!("[{:06.2} {:06.2}] {:>13.13}", c.left, c.width, c.text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An ordered sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page {
    /// Rows top to bottom
    pub rows: Vec<Row>,
}

impl Page {
    /// Create a page from rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The full document grid. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    /// Pages in document order
    pub pages: Vec<Page>,
}

/// One table as emitted by tabula's JSON output.
#[derive(Deserialize)]
struct TabulaTable {
    data: Vec<Row>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GridSource {
    Nested(Vec<Page>),
    Tabula(Vec<TabulaTable>),
}

impl Grid {
    /// Create a grid from pages.
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Load a grid from JSON.
    ///
    /// Accepts either tabula's `output_format='json'` layout (a list of
    /// tables, each with a `data` array of rows, one table per page) or a
    /// plain `[[[cell]]]` nesting of pages, rows and cells.
    pub fn from_json(json: &str) -> Result<Self> {
        let source: GridSource = serde_json::from_str(json)?;
        let pages = match source {
            GridSource::Nested(pages) => pages,
            GridSource::Tabula(tables) => tables.into_iter().map(|t| Page::new(t.data)).collect(),
        };
        Ok(Self::new(pages))
    }

    /// Load a grid from a JSON file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Return a copy with every cell text NFKC-normalized and trimmed.
    ///
    /// Extracted PDFs often carry non-breaking spaces and compatibility
    /// characters that would defeat the boundary patterns.
    pub fn normalized(&self) -> Self {
        let pages = self
            .pages
            .iter()
            .map(|page| {
                Page::new(
                    page.rows
                        .iter()
                        .map(|row| {
                            Row::new(
                                row.cells
                                    .iter()
                                    .map(|c| {
                                        let text: String = c.text.nfkc().collect();
                                        Cell::new(text.trim(), c.left, c.width)
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect();
        Self::new(pages)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get the total number of rows across all pages.
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(Page::row_count).sum()
    }

    /// Check if the grid has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
