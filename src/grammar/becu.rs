//! Grammar for BECU consumer statements.
//!
//! Layout, top to bottom:
//!
//! ```text
//! BECU
//! ├── initial ── address ── statement_period
//! ├── summary_deposit_account   (account lines, then fee lines)
//! ├── summary_loan_account      (account lines)
//! ├── deposit_account           (per account: yield block, activity tables)
//! ├── loan_account              (same shape)
//! ├── page_boundary             ("page N of M" + running header)
//! └── terminus
//! ```
//!
//! Every group is optional: it is reachable from the exits of the initial
//! chain and of every group defined before it.

use serde::{Deserialize, Serialize};

use super::{Grammar, GrammarBuilder, StatementGrammar};
use crate::error::Result;
use crate::parser::{
    AccountDetail, AccountsSummary, ActivityHeader, ActivityLines, Address, BlockHeader,
    FeesSummary, PageBoundary, SectionId, SectionKind, StatementPeriod,
};

/// Boundary patterns by role. All are matched case-insensitively against
/// each cell of the next unconsumed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BecuPatterns {
    /// Page footer that starts a page break
    pub page_boundary: String,
    /// Heading of the deposit account summary
    pub summary_deposit: String,
    /// Heading of the loan account summary
    pub summary_loan: String,
    /// Heading of the deposit account detail
    pub deposit_detail: String,
    /// Heading of the loan account detail
    pub loan_detail: String,
    /// Account lines and account detail headings
    pub account: String,
    /// Fee summary lines
    pub fees: String,
    /// Interest-yield block
    pub yield_block: String,
    /// Activity table headings
    pub activity_header: String,
    /// Activity lines
    pub activity_line: String,
    /// End of statement; without it the walk ends with the input
    pub closing: Option<String>,
}

impl Default for BecuPatterns {
    fn default() -> Self {
        Self {
            page_boundary: "page [0-9]+ of [0-9]+".to_string(),
            summary_deposit: "Summary of Deposit".to_string(),
            summary_loan: "Summary of Loan".to_string(),
            deposit_detail: "Deposit Account".to_string(),
            loan_detail: "Loan Account".to_string(),
            account: "checking|savings".to_string(),
            fees: "fees".to_string(),
            yield_block: "yield".to_string(),
            activity_header: "deposits|withdrawals|checks".to_string(),
            activity_line: "[0-9]{2}/[0-9]{2}".to_string(),
            closing: None,
        }
    }
}

/// Entry state and exit states of one optional group.
struct Group {
    entry: SectionId,
    exits: Vec<SectionId>,
}

/// The BECU statement grammar.
#[derive(Debug, Clone, Default)]
pub struct BecuGrammar {
    /// Boundary patterns
    pub patterns: BecuPatterns,
}

impl BecuGrammar {
    /// Create the grammar with custom patterns.
    pub fn with_patterns(patterns: BecuPatterns) -> Self {
        Self { patterns }
    }

    /// root -> initial -> address -> statement period. Returns the period.
    fn initial_chain(&self, b: &mut GrammarBuilder, bank: SectionId) -> Result<SectionId> {
        let initial = b.section(Some(bank), "initial", SectionKind::Plain)?;
        let address = b.section(
            Some(initial),
            "address",
            SectionKind::Address(Address::default()),
        )?;
        let period = b.section(
            Some(initial),
            "statement_period",
            SectionKind::StatementPeriod(StatementPeriod::default()),
        )?;
        b.initial(initial);
        b.interruptible(period)?;

        b.transition("from_initial", initial, address)?;
        b.transition("from_address", address, period)?;
        Ok(period)
    }

    fn summary(
        &self,
        b: &mut GrammarBuilder,
        bank: SectionId,
        incoming: &[SectionId],
        pattern: &str,
        tag: &str,
        with_fees: bool,
    ) -> Result<Group> {
        let p = &self.patterns;
        let summary = b.matching(Some(bank), tag, SectionKind::Opening { heading: None }, pattern)?;
        b.interruptible(summary)?;
        b.fan_in(incoming, summary)?;

        let header = b.section(
            Some(summary),
            &format!("{tag}/account_header"),
            SectionKind::BlockHeader(BlockHeader::new(2)),
        )?;
        b.interruptible(header)?;
        b.transition(&format!("{tag}:header"), summary, header)?;

        let accounts = b.matching(
            Some(summary),
            &format!("{tag}/accounts"),
            SectionKind::AccountsSummary(AccountsSummary::default()),
            &p.account,
        )?;
        b.interruptible(accounts)?;
        b.transition(&format!("{tag}:accounts"), header, accounts)?;
        b.self_loop(accounts)?;

        if !with_fees {
            return Ok(Group {
                entry: summary,
                exits: vec![accounts],
            });
        }

        let fee_header = b.section(
            Some(summary),
            &format!("{tag}/fee_header"),
            SectionKind::BlockHeader(BlockHeader::new(1)),
        )?;
        b.interruptible(fee_header)?;
        b.transition(&format!("{tag}:fee_header"), accounts, fee_header)?;

        let fees = b.matching(
            Some(summary),
            &format!("{tag}/fees"),
            SectionKind::FeesSummary(FeesSummary::default()),
            &p.fees,
        )?;
        b.interruptible(fees)?;
        b.transition(&format!("{tag}:fees"), fee_header, fees)?;
        b.self_loop(fees)?;

        Ok(Group {
            entry: summary,
            exits: vec![fee_header, fees],
        })
    }

    fn detail(
        &self,
        b: &mut GrammarBuilder,
        bank: SectionId,
        incoming: &[SectionId],
        pattern: &str,
        tag: &str,
    ) -> Result<Group> {
        let p = &self.patterns;
        let detail = b.matching(Some(bank), tag, SectionKind::Opening { heading: None }, pattern)?;
        b.interruptible(detail)?;
        b.fan_in(incoming, detail)?;

        let account = b.matching(
            Some(detail),
            &format!("{tag}/account"),
            SectionKind::AccountDetail(AccountDetail::default()),
            &p.account,
        )?;
        b.interruptible(account)?;
        b.transition(&format!("{tag}:account"), detail, account)?;

        let yield_block = b.matching(
            Some(account),
            &format!("{tag}/yield"),
            SectionKind::AccountYield,
            &p.yield_block,
        )?;
        b.interruptible(yield_block)?;
        b.transition(&format!("{tag}:yield"), account, yield_block)?;

        let header = b.matching(
            Some(account),
            &format!("{tag}/activity_header"),
            SectionKind::ActivityHeader(ActivityHeader::default()),
            &p.activity_header,
        )?;
        b.interruptible(header)?;
        // A reprinted detail heading leads straight into the next activity table.
        b.transition(&format!("{tag}:heading_TO_header"), detail, header)?;
        b.transition(&format!("{tag}:yield_TO_header"), yield_block, header)?;
        b.transition(&format!("{tag}:account_TO_header"), account, header)?;

        let line = b.matching(
            Some(header),
            &format!("{tag}/activity"),
            SectionKind::ActivityLines(ActivityLines::default()),
            &p.activity_line,
        )?;
        b.interruptible(line)?;
        b.transition(&format!("{tag}:lines"), header, line)?;
        b.self_loop(line)?;
        b.fan_out(tag, line, &[account, header])?;

        Ok(Group {
            entry: detail,
            exits: vec![detail, line],
        })
    }
}

impl StatementGrammar for BecuGrammar {
    fn name(&self) -> &str {
        "becu"
    }

    fn build(&self) -> Result<Grammar> {
        let p = &self.patterns;
        let mut b = GrammarBuilder::new("becu");

        let bank = b.section(None, "BECU", SectionKind::Plain)?;
        let boundary = b.matching(
            Some(bank),
            "page_boundary",
            SectionKind::PageBoundary(PageBoundary::default()),
            &p.page_boundary,
        )?;
        b.page_boundary(boundary);

        let mut exits = vec![self.initial_chain(&mut b, bank)?];
        let mut entries = Vec::new();

        let group =
            self.summary(&mut b, bank, &exits, &p.summary_deposit, "summary_deposit_account", true)?;
        entries.push(group.entry);
        exits.extend(group.exits);

        let group = self.summary(&mut b, bank, &exits, &p.summary_loan, "summary_loan_account", false)?;
        entries.push(group.entry);
        exits.extend(group.exits);

        let group = self.detail(&mut b, bank, &exits, &p.deposit_detail, "deposit_account")?;
        entries.push(group.entry);
        exits.extend(group.exits);

        let group = self.detail(&mut b, bank, &exits, &p.loan_detail, "loan_account")?;
        entries.push(group.entry);

        b.page_break_exits(&entries);

        let terminus = match &p.closing {
            Some(pattern) => b.matching(Some(bank), "terminus", SectionKind::Terminal, pattern)?,
            None => b.section(Some(bank), "terminus", SectionKind::Terminal)?,
        };
        b.terminal(terminus);

        b.build()
    }
}
