//! Sections: parsing units that double as run loop states.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::cursor::RowCursor;
use super::extract::{
    skip_rows, AccountDetail, AccountsSummary, ActivityHeader, ActivityLines, Address,
    BlockHeader, FeesSummary, PageBoundary, StatementPeriod,
};
use super::options::ParseOptions;
use crate::error::{Error, Result};
use crate::model::Row;

/// Stable identifier shared by a section, its tree node and its graph state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionId(pub usize);

impl SectionId {
    /// Index into the section arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Rows skipped by the interest-yield block of an account detail.
const YIELD_ROWS: usize = 3;

/// Variant of a section together with the fields it extracts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionKind {
    /// Structural grouping only
    Plain,
    /// Boundary detection only; consumes nothing
    Matching,
    /// Optional section opened by a heading row, which it consumes
    Opening {
        /// Text of the heading row
        heading: Option<String>,
    },
    /// Organization and mailing address
    Address(Address),
    /// Statement period
    StatementPeriod(StatementPeriod),
    /// Column header block
    BlockHeader(BlockHeader),
    /// Summary table account lines
    AccountsSummary(AccountsSummary),
    /// Summary table fee lines
    FeesSummary(FeesSummary),
    /// Account label of a detail block
    AccountDetail(AccountDetail),
    /// Interest-yield block of a detail block
    AccountYield,
    /// Activity table heading
    ActivityHeader(ActivityHeader),
    /// Activity table lines
    ActivityLines(ActivityLines),
    /// Running footer/header between pages
    PageBoundary(PageBoundary),
    /// End of statement
    Terminal,
}

impl SectionKind {
    /// Short variant name.
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Plain => "plain",
            SectionKind::Matching => "matching",
            SectionKind::Opening { .. } => "opening",
            SectionKind::Address(_) => "address",
            SectionKind::StatementPeriod(_) => "statement_period",
            SectionKind::BlockHeader(_) => "block_header",
            SectionKind::AccountsSummary(_) => "accounts_summary",
            SectionKind::FeesSummary(_) => "fees_summary",
            SectionKind::AccountDetail(_) => "account_detail",
            SectionKind::AccountYield => "account_yield",
            SectionKind::ActivityHeader(_) => "activity_header",
            SectionKind::ActivityLines(_) => "activity_lines",
            SectionKind::PageBoundary(_) => "page_boundary",
            SectionKind::Terminal => "terminal",
        }
    }

    /// Variants entered once per repeated line; lenient mode may skip these.
    fn is_repeated_line(&self) -> bool {
        matches!(
            self,
            SectionKind::AccountsSummary(_)
                | SectionKind::FeesSummary(_)
                | SectionKind::ActivityLines(_)
        )
    }

    /// Variants that need no entry before they may be left.
    fn is_structural(&self) -> bool {
        matches!(self, SectionKind::Plain | SectionKind::Matching)
    }
}

/// One document span, acting as a state of the run loop.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Identifier shared with the tree and graph
    pub id: SectionId,
    /// Unique tag
    pub tag: String,
    /// Variant and extracted fields
    #[serde(flatten)]
    pub kind: SectionKind,
    /// Whether a page break may interrupt this state
    pub interruptible: bool,
    /// How many times the state was entered
    pub visits: usize,
    #[serde(skip)]
    pattern: Option<Regex>,
}

impl Section {
    /// Create a section with no boundary pattern.
    pub fn new(id: SectionId, tag: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            id,
            tag: tag.into(),
            kind,
            interruptible: false,
            visits: 0,
            pattern: None,
        }
    }

    /// Attach a case-insensitive boundary pattern.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Some(RegexBuilder::new(pattern).case_insensitive(true).build()?);
        Ok(self)
    }

    /// Let a page break interrupt this state.
    pub fn interruptible(mut self) -> Self {
        self.interruptible = true;
        self
    }

    /// Boundary pattern source, if any.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// May this state be entered, given the next unconsumed row?
    pub fn ready(&self, row: &Row) -> bool {
        let ready = match (&self.pattern, &self.kind) {
            (Some(re), _) => row.cells.iter().any(|c| re.is_match(&c.text)),
            (None, SectionKind::Terminal) => false,
            (None, _) => true,
        };
        log::trace!("{}[{}] ready: {}", self.kind.name(), self.tag, ready);
        ready
    }

    /// May this state be left?
    pub fn done(&self) -> bool {
        self.kind.is_structural() || self.visits > 0
    }

    /// Consume rows and record fields on entering the state.
    pub fn enter(&mut self, cursor: &mut RowCursor<'_>, options: &ParseOptions) -> Result<()> {
        log::debug!("{}[{}] enter at {}", self.kind.name(), self.tag, cursor.position());
        self.visits += 1;
        match self.extract(cursor, options) {
            Err(err @ Error::MalformedField { .. })
                if options.is_lenient() && self.kind.is_repeated_line() =>
            {
                log::warn!("skipping malformed line: {err}");
                Ok(())
            }
            other => other,
        }
    }

    fn extract(&mut self, cursor: &mut RowCursor<'_>, options: &ParseOptions) -> Result<()> {
        let tag = self.tag.as_str();
        match &mut self.kind {
            SectionKind::Plain | SectionKind::Matching | SectionKind::Terminal => Ok(()),
            SectionKind::Opening { heading } => {
                let row = cursor.consume_row()?;
                log::debug!("{tag}: opened by {:?}", row.joined());
                *heading = Some(row.joined());
                Ok(())
            }
            SectionKind::Address(address) => address.extract(tag, cursor),
            SectionKind::StatementPeriod(period) => period.extract(tag, cursor),
            SectionKind::BlockHeader(header) => header.extract(tag, cursor),
            SectionKind::AccountsSummary(summary) => summary.extract(tag, cursor),
            SectionKind::FeesSummary(fees) => fees.extract(tag, cursor),
            SectionKind::AccountDetail(detail) => detail.extract(tag, cursor),
            SectionKind::AccountYield => skip_rows(tag, cursor, YIELD_ROWS),
            SectionKind::ActivityHeader(header) => header.extract(tag, cursor),
            SectionKind::ActivityLines(lines) => lines.extract(tag, cursor, options),
            SectionKind::PageBoundary(boundary) => boundary.extract(tag, cursor, options),
        }
    }
}
