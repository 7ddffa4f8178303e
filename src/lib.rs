//! # stmtledger
//!
//! Bank statement ledger extraction for Rust.
//!
//! This library walks the cell grid a table extractor produces from a bank
//! statement PDF, recognises its sections (address, statement period,
//! account summaries, per-account activity tables) and emits one ledger
//! entry per transaction line.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stmtledger::{parse_file, render};
//!
//! fn main() -> stmtledger::Result<()> {
//!     // Parse a tabula-style grid JSON file
//!     let statement = parse_file("statement.json")?;
//!
//!     // Print the ledger journal
//!     println!("{}", render::to_ledger_text(&statement));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Guarded section walk**: transitions checked in registration order, first match wins
//! - **Page breaks**: running footers and headers are skipped, the interrupted section resumes
//! - **Ancestor lookups**: each line resolves its account and direction from the section tree
//! - **Declarative patterns**: boundary regexes held in a table, replaceable per institution
//! - **Strict or lenient**: malformed lines fail the document or are logged and skipped

pub mod error;
pub mod grammar;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod render;
pub mod statement;

// Re-export commonly used types
pub use error::{Error, Result};
pub use grammar::{BecuGrammar, BecuPatterns, Grammar, GrammarRegistry, StatementGrammar};
pub use ledger::LedgerBuilder;
pub use model::{Cell, Direction, Grid, LedgerEntry, Page, Row};
pub use parser::{Completion, ErrorMode, ParseOptions, Session};
pub use render::JsonFormat;
pub use statement::Statement;

use std::path::Path;
use std::sync::Arc;

/// Name of the grammar used when none is chosen.
pub const DEFAULT_GRAMMAR: &str = "becu";

/// Parse a statement grid with the default grammar.
///
/// # Example
///
/// ```
/// use stmtledger::{parse_grid, Grid, Page, Row};
///
/// let grid = Grid::new(vec![Page::new(vec![
///     Row::from_texts(["BECU", "0042"]),
///     Row::from_texts(["PO BOX 1"]),
///     Row::from_texts(["SEATTLE WA 98101"]),
///     Row::from_texts(["Statement Period: 01/01/2020-01/31/2020"]),
/// ])]);
/// let statement = parse_grid(&grid).unwrap();
/// assert_eq!(statement.organization(), Some("BECU"));
/// ```
pub fn parse_grid(grid: &Grid) -> Result<Statement> {
    StatementParser::new().parse_grid(grid)
}

/// Parse a statement grid with custom options.
///
/// # Example
///
/// ```no_run
/// use stmtledger::{parse_grid_with_options, Grid, ParseOptions};
///
/// let grid = Grid::from_file("statement.json").unwrap();
/// let options = ParseOptions::new().lenient().with_statement_year(2020);
/// let statement = parse_grid_with_options(&grid, options).unwrap();
/// ```
pub fn parse_grid_with_options(grid: &Grid, options: ParseOptions) -> Result<Statement> {
    StatementParser::new().with_options(options).parse_grid(grid)
}

/// Parse a statement from grid JSON text.
pub fn parse_json(json: &str) -> Result<Statement> {
    StatementParser::new().parse_json(json)
}

/// Parse a statement from a grid JSON file.
///
/// # Example
///
/// ```no_run
/// use stmtledger::parse_file;
///
/// let statement = parse_file("statement.json").unwrap();
/// println!("Entries: {}", statement.entries().len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Statement> {
    StatementParser::new().parse_file(path)
}

/// Parse a grid JSON file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Statement> {
    StatementParser::new().with_options(options).parse_file(path)
}

/// Convert a grid JSON file to ledger journal text.
///
/// # Example
///
/// ```no_run
/// use stmtledger::to_ledger_text;
///
/// let journal = to_ledger_text("statement.json").unwrap();
/// std::fs::write("statement.ledger", journal).unwrap();
/// ```
pub fn to_ledger_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let statement = parse_file(path)?;
    Ok(render::to_ledger_text(&statement))
}

/// Convert a grid JSON file to ledger JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let statement = parse_file(path)?;
    render::to_json(&statement, format)
}

/// Builder for parsing statements.
///
/// # Example
///
/// ```no_run
/// use stmtledger::{BecuPatterns, StatementParser};
///
/// let patterns = BecuPatterns {
///     closing: Some("end of statement".to_string()),
///     ..BecuPatterns::default()
/// };
/// let statement = StatementParser::new()
///     .with_patterns(patterns)
///     .with_statement_year(2020)
///     .lenient()
///     .parse_file("statement.json")?;
/// # Ok::<(), stmtledger::Error>(())
/// ```
pub struct StatementParser {
    registry: GrammarRegistry,
    grammar: String,
    options: ParseOptions,
}

impl StatementParser {
    /// Create a parser with the built-in grammars.
    pub fn new() -> Self {
        Self {
            registry: GrammarRegistry::with_defaults(),
            grammar: DEFAULT_GRAMMAR.to_string(),
            options: ParseOptions::default(),
        }
    }

    /// Select a grammar by name.
    pub fn with_grammar(mut self, name: impl Into<String>) -> Self {
        self.grammar = name.into();
        self
    }

    /// Register an additional grammar.
    pub fn with_registered(mut self, grammar: Arc<dyn StatementGrammar>) -> Self {
        self.registry.register(grammar);
        self
    }

    /// Replace the BECU boundary patterns.
    pub fn with_patterns(self, patterns: BecuPatterns) -> Self {
        self.with_registered(Arc::new(BecuGrammar::with_patterns(patterns)))
    }

    /// Replace all parse options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Set the fallback year for `MM/DD` dates.
    pub fn with_statement_year(mut self, year: i32) -> Self {
        self.options = self.options.with_statement_year(year);
        self
    }

    /// Parse options in effect.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Walk a grid and build its ledger.
    pub fn parse_grid(&self, grid: &Grid) -> Result<Statement> {
        let grammar = self.registry.build(&self.grammar)?;
        let normalized;
        let grid = if self.options.normalize_text {
            normalized = grid.normalized();
            &normalized
        } else {
            grid
        };

        log::info!(
            "parsing {} pages ({} rows) with grammar {}",
            grid.page_count(),
            grid.row_count(),
            self.grammar
        );
        let run = Session::new(grammar, grid, self.options.clone()).run()?;
        let entries = LedgerBuilder::new(&run.grammar)
            .with_statement_year(self.options.statement_year)
            .lenient(self.options.error_mode == ErrorMode::Lenient)
            .build()?;
        Ok(Statement::new(run, entries))
    }

    /// Parse grid JSON text.
    pub fn parse_json(&self, json: &str) -> Result<Statement> {
        self.parse_grid(&Grid::from_json(json)?)
    }

    /// Parse a grid JSON file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Statement> {
        self.parse_grid(&Grid::from_file(path)?)
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_builder() {
        let parser = StatementParser::new().lenient().with_statement_year(2021);
        assert_eq!(parser.options.error_mode, ErrorMode::Lenient);
        assert_eq!(parser.options.statement_year, Some(2021));
        assert_eq!(parser.grammar, DEFAULT_GRAMMAR);
    }

    #[test]
    fn test_unknown_grammar() {
        let result = StatementParser::new()
            .with_grammar("acme")
            .parse_grid(&Grid::default());
        assert!(matches!(result, Err(Error::UnknownGrammar(ref name)) if name == "acme"));
    }

    #[test]
    fn test_empty_grid() {
        let statement = parse_grid(&Grid::default()).unwrap();
        assert_eq!(statement.completion(), Completion::EndOfInput);
        assert!(statement.entries().is_empty());
        assert!(statement.address().is_none());
    }

    #[test]
    fn test_parse_json_invalid() {
        assert!(matches!(parse_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_normalizes_cell_text() {
        let grid = Grid::new(vec![Page::new(vec![
            Row::from_texts(["\u{FF22}\u{FF25}\u{FF23}\u{FF35} ", "0042"]),
            Row::from_texts(["PO\u{00A0}BOX 1"]),
            Row::from_texts(["SEATTLE WA"]),
            Row::from_texts(["Statement Period: 01/01/2020-01/31/2020"]),
        ])]);
        let statement = parse_grid(&grid).unwrap();
        assert_eq!(statement.organization(), Some("BECU"));
        assert_eq!(statement.address().unwrap().lines[0], "PO BOX 1");
    }

    #[test]
    fn test_closing_pattern_reaches_terminal() {
        let grid = Grid::new(vec![Page::new(vec![
            Row::from_texts(["BECU"]),
            Row::from_texts(["PO BOX 1"]),
            Row::from_texts(["SEATTLE WA"]),
            Row::from_texts(["Statement Period: 01/01/2020-01/31/2020"]),
            Row::from_texts(["End of Statement"]),
            Row::from_texts(["Unrecognised trailer"]),
        ])]);
        let patterns = BecuPatterns {
            closing: Some("end of statement".to_string()),
            ..BecuPatterns::default()
        };
        let statement = StatementParser::new()
            .with_patterns(patterns)
            .parse_grid(&grid)
            .unwrap();
        assert_eq!(statement.completion(), Completion::Terminal);
        assert_eq!(statement.last_state(), "terminus");

        let err = parse_grid(&grid).unwrap_err();
        assert!(matches!(err, Error::StuckState { .. }));
    }
}
