//! Ledger emission from a finished walk.
//!
//! Activity lines only hold raw fields. Everything else an entry needs sits
//! on the line's ancestors in the section tree: the activity header gives the
//! direction, the account detail gives the account label and the detail
//! section gives the group tag. Headers keep one record per table they
//! opened, so each line resolves against the record in force at its row.

mod currency;
mod date;

pub use currency::{currency_to_decimal, currency_to_float};
pub use date::{parse_full_date, parse_statement_date};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::model::LedgerEntry;
use crate::parser::{
    AccountDetail, ActivityHeader, ActivityLine, Position, Section, SectionId, SectionKind,
};

/// Builds ledger entries from the sections of a walked grammar.
#[derive(Debug, Clone)]
pub struct LedgerBuilder<'a> {
    grammar: &'a Grammar,
    statement_year: Option<i32>,
    lenient: bool,
}

impl<'a> LedgerBuilder<'a> {
    /// Create a builder over a walked grammar.
    pub fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            statement_year: None,
            lenient: false,
        }
    }

    /// Skip lines whose date or amount cannot be read instead of failing.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Year for `MM/DD` dates when the statement period is unusable.
    pub fn with_statement_year(mut self, year: Option<i32>) -> Self {
        self.statement_year = year;
        self
    }

    /// Last day of the statement period, if one was read and parses.
    pub fn period_end(&self) -> Option<NaiveDate> {
        self.grammar.sections.iter().find_map(|s| match &s.kind {
            SectionKind::StatementPeriod(period) if !period.stop.is_empty() => {
                let end = parse_full_date(&period.stop);
                if end.is_none() {
                    log::warn!("ledger: unreadable statement period end {:?}", period.stop);
                }
                end
            }
            _ => None,
        })
    }

    /// Emit one entry per activity line, in document order.
    pub fn build(&self) -> Result<Vec<LedgerEntry>> {
        let period_end = self.period_end();
        let mut entries: Vec<(Position, LedgerEntry)> = Vec::new();

        for section in &self.grammar.sections {
            let SectionKind::ActivityLines(lines) = &section.kind else {
                continue;
            };
            for line in &lines.lines {
                match self.entry(section, line, period_end) {
                    Ok(entry) => entries.push((line.position, entry)),
                    Err(err @ Error::MalformedField { .. }) if self.lenient => {
                        log::warn!("ledger: skipping line: {err}");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        entries.sort_by_key(|(position, _)| *position);
        log::info!("ledger: {} entries", entries.len());
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    fn entry(
        &self,
        section: &Section,
        line: &ActivityLine,
        period_end: Option<NaiveDate>,
    ) -> Result<LedgerEntry> {
        let tag = section.tag.as_str();

        let header = self
            .nearest(section.id, |kind| match kind {
                SectionKind::ActivityHeader(header) => Some(header),
                _ => None,
            })
            .and_then(|header: &ActivityHeader| header.at(line.position))
            .ok_or_else(|| Error::malformed(tag, &line.fields, "no activity header above line"))?;

        let account = self
            .nearest(section.id, |kind| match kind {
                SectionKind::AccountDetail(detail) => Some(detail),
                _ => None,
            })
            .and_then(|detail: &AccountDetail| detail.at(line.position))
            .unwrap_or_default()
            .to_string();

        let group = self
            .grammar
            .tree
            .ancestors(section.id)
            .map(|id| self.grammar.section(id))
            .find(|s| matches!(s.kind, SectionKind::Opening { .. }))
            .map(|s| s.tag.clone())
            .unwrap_or_default();

        let date = parse_statement_date(line.date(), period_end, self.statement_year)
            .map_err(|err| Error::malformed(tag, &line.fields, err.to_string()))?;
        let amount = currency_to_decimal(line.amount())
            .map_err(|err| Error::malformed(tag, &line.fields, err.to_string()))?;

        log::debug!("ledger: {} {} {} {}", date, amount, header.direction, account);
        Ok(LedgerEntry {
            date,
            amount,
            description: line.description(),
            account,
            direction: header.direction,
            section: group,
        })
    }

    /// Nearest ancestor whose kind `select` accepts.
    fn nearest<T>(
        &self,
        id: SectionId,
        select: impl Fn(&'a SectionKind) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let grammar = self.grammar;
        grammar
            .tree
            .ancestors(id)
            .find_map(|ancestor| select(&grammar.section(ancestor).kind))
    }
}
