//! Parsed statement: the finished walk plus its ledger.

use rust_decimal::Decimal;

use crate::grammar::Grammar;
use crate::model::{Direction, LedgerEntry};
use crate::parser::{
    Address, Completion, Position, Run, Section, SectionId, SectionKind, SectionTree,
    StatementPeriod,
};

/// Result of parsing one statement grid.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The finished walk
    pub run: Run,
    /// Ledger entries in document order
    pub entries: Vec<LedgerEntry>,
}

impl Statement {
    /// Assemble a statement from a walk and its ledger.
    pub fn new(run: Run, entries: Vec<LedgerEntry>) -> Self {
        Self { run, entries }
    }

    /// Grammar with every section's extracted fields.
    pub fn grammar(&self) -> &Grammar {
        &self.run.grammar
    }

    /// How the walk ended.
    pub fn completion(&self) -> Completion {
        self.run.completion
    }

    /// Where the cursor stopped.
    pub fn position(&self) -> Position {
        self.run.position
    }

    /// Tag of the state the walk ended in.
    pub fn last_state(&self) -> &str {
        &self.grammar().section(self.run.last_state).tag
    }

    /// Section tree.
    pub fn tree(&self) -> &SectionTree {
        &self.grammar().tree
    }

    /// Section by id.
    pub fn section(&self, id: SectionId) -> &Section {
        self.grammar().section(id)
    }

    /// Ledger entries.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Address block, if one was read.
    pub fn address(&self) -> Option<&Address> {
        self.grammar().sections.iter().find_map(|s| match &s.kind {
            SectionKind::Address(address) if s.visits > 0 => Some(address),
            _ => None,
        })
    }

    /// Organization name from the address block.
    pub fn organization(&self) -> Option<&str> {
        self.address().map(|a| a.organization.as_str())
    }

    /// Statement period as printed.
    pub fn period(&self) -> Option<&StatementPeriod> {
        self.grammar().sections.iter().find_map(|s| match &s.kind {
            SectionKind::StatementPeriod(period) if s.visits > 0 => Some(period),
            _ => None,
        })
    }

    /// Account lines of every summary table, in grammar order.
    pub fn summary_lines(&self) -> Vec<&[String]> {
        self.grammar()
            .sections
            .iter()
            .filter_map(|s| match &s.kind {
                SectionKind::AccountsSummary(summary) => Some(summary.lines.iter()),
                _ => None,
            })
            .flatten()
            .map(Vec::as_slice)
            .collect()
    }

    /// Entries listed under one direction.
    pub fn entries_by_direction(&self, direction: Direction) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.direction == direction)
    }

    /// Sum of all entry amounts.
    pub fn net_amount(&self) -> Decimal {
        self.entries.iter().map(|e| e.amount).sum()
    }
}
