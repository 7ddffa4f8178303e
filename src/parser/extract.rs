//! Field extraction rules for each section variant.
//!
//! Every `extract` consumes a fixed number of rows from the cursor and
//! records what it finds. A row that does not fit the expected layout is a
//! [`Error::MalformedField`] carrying the section tag and the raw row.

use serde::Serialize;

use super::cursor::{Position, RowCursor};
use super::options::ParseOptions;
use crate::error::{Error, Result};
use crate::model::{Direction, Row};

/// Join two header fragments with a single space, skipping empty ones.
fn join_words(top: &str, bottom: &str) -> String {
    [top.trim(), bottom.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split the first field on whitespace, keep the first two tokens atomic and
/// re-join the rest: `"01/15 12.00 Coffee Shop"` -> `["01/15", "12.00", "Coffee Shop"]`.
fn split_leading_pair(tokens: Vec<String>) -> Option<[String; 3]> {
    if tokens.len() < 2 {
        return None;
    }
    let mut iter = tokens.into_iter();
    let first = iter.next()?;
    let second = iter.next()?;
    let rest = iter.collect::<Vec<_>>().join(" ");
    Some([first, second, rest])
}

/// Organization and mailing address block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Address {
    /// Organization name (first cell of the first row)
    pub organization: String,
    /// Trailing code printed after the organization name
    pub code: String,
    /// Address lines
    pub lines: Vec<String>,
}

impl Address {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let row = cursor.consume_row()?;
        if row.non_empty_texts().is_empty() {
            return Err(Error::malformed(tag, &row.texts(), "expected organization name"));
        }
        self.organization = row.first_text().trim().to_string();
        self.code = row
            .cells
            .iter()
            .skip(1)
            .filter(|c| !c.is_empty())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        for _ in 0..2 {
            let row = cursor.consume_row()?;
            self.lines.push(row.joined());
        }
        log::debug!("address: {} {:?} {:?}", self.organization, self.code, self.lines);
        Ok(())
    }
}

/// Statement period as printed, e.g. `Statement Period: 01/01/2020-01/31/2020`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementPeriod {
    /// Start date text
    pub start: String,
    /// Stop date text
    pub stop: String,
}

impl StatementPeriod {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let row = cursor.consume_row()?;
        let text = row.joined();
        let (_, dates) = text
            .split_once(':')
            .ok_or_else(|| Error::malformed(tag, &row.texts(), "expected 'label: start-stop'"))?;
        let parts: Vec<&str> = dates.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [start, stop] if !start.is_empty() && !stop.is_empty() => {
                self.start = start.to_string();
                self.stop = stop.to_string();
                log::debug!("statement period {} .. {}", self.start, self.stop);
                Ok(())
            }
            _ => Err(Error::malformed(
                tag,
                &row.texts(),
                format!("expected two dates separated by '-', found {}", parts.len()),
            )),
        }
    }
}

/// Column header block above a summary table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockHeader {
    /// Physical rows the header occupies (1 or 2)
    pub lines: usize,
    /// Reconstructed column labels
    pub headers: Vec<String>,
}

impl BlockHeader {
    /// Create a header spanning `lines` rows.
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            headers: Vec::new(),
        }
    }

    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let mut rows: Vec<&Row> = Vec::with_capacity(self.lines);
        for _ in 0..self.lines {
            let row = cursor.consume_row()?;
            log::debug!("{tag}: {}", row.layout_string());
            rows.push(row);
        }

        match rows.as_slice() {
            [single] => {
                self.headers = single.non_empty_texts();
                Ok(())
            }
            [top, bottom] => {
                self.headers = Self::rejoin(tag, top, bottom)?;
                log::debug!("{tag}: headers {:?}", self.headers);
                Ok(())
            }
            _ => Err(Error::Other(format!(
                "{tag}: block header must span 1 or 2 rows, not {}",
                self.lines
            ))),
        }
    }

    /// Rebuild the six logical labels of a header the PDF wrapped over two lines.
    fn rejoin(tag: &str, top: &Row, bottom: &Row) -> Result<Vec<String>> {
        let top_texts = top.texts();
        let bottom_texts = bottom.texts();
        if top_texts.len() < 6 {
            return Err(Error::malformed(tag, &top_texts, "expected 6 header cells"));
        }
        if bottom_texts.len() < 6 {
            return Err(Error::malformed(tag, &bottom_texts, "expected 6 header cells"));
        }

        let split_top: Vec<&str> = top_texts[1].split_whitespace().collect();
        let split_bottom: Vec<&str> = bottom_texts[1].split_whitespace().collect();
        // Words past the second belong to no column
        if split_top.len() < 2 {
            return Err(Error::malformed(tag, &top_texts, "expected two words in cell 1"));
        }
        if split_bottom.len() < 2 {
            return Err(Error::malformed(tag, &bottom_texts, "expected two words in cell 1"));
        }

        Ok(vec![
            bottom_texts[0].trim().to_string(),
            join_words(split_top[0], split_bottom[0]),
            join_words(split_top[1], split_bottom[1]),
            bottom_texts[2].trim().to_string(),
            join_words(&top_texts[4], &bottom_texts[4]),
            join_words(&top_texts[5], &bottom_texts[5]),
        ])
    }
}

/// Repeated account lines of a summary table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountsSummary {
    /// One flat field list per line
    pub lines: Vec<Vec<String>>,
}

impl AccountsSummary {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        let first = row
            .text_at(0)
            .ok_or_else(|| Error::malformed(tag, &row.texts(), "empty summary line"))?;

        let mut line = vec![first.to_string()];
        for cell in row.cells.iter().skip(1).filter(|c| !c.is_empty()) {
            line.extend(cell.text.split_whitespace().map(str::to_string));
        }
        log::debug!("{tag}: {line:?}");
        self.lines.push(line);
        Ok(())
    }
}

/// Fee lines. Kept for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeesSummary {
    /// Non-empty cell texts of each fee row
    pub rows: Vec<Vec<String>>,
}

impl FeesSummary {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        self.rows.push(row.non_empty_texts());
        Ok(())
    }
}

/// An account label and where it was printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLabel {
    /// Account label, e.g. `Checking 123456789`
    pub label: String,
    /// Row the label was read from
    pub position: Position,
}

/// Account headings of a detail block, one per account listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountDetail {
    /// Labels in document order
    pub accounts: Vec<AccountLabel>,
}

impl AccountDetail {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let position = cursor.position();
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        let label = row.first_text().trim().to_string();
        if label.is_empty() {
            return Err(Error::malformed(tag, &row.texts(), "expected account label"));
        }
        self.accounts.push(AccountLabel { label, position });
        Ok(())
    }

    /// Most recent label.
    pub fn current(&self) -> Option<&str> {
        self.accounts.last().map(|a| a.label.as_str())
    }

    /// Label in force at `position`.
    pub fn at(&self, position: Position) -> Option<&str> {
        self.accounts
            .iter()
            .rev()
            .find(|a| a.position <= position)
            .map(|a| a.label.as_str())
    }
}

/// One activity table heading (deposits, withdrawals or checks).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTable {
    /// Label as printed, e.g. `Withdrawals and other debits`
    pub label: String,
    /// Direction classified from the label
    pub direction: Direction,
    /// The three column headers
    pub columns: Vec<String>,
    /// Row the label was read from
    pub position: Position,
}

/// Activity table headings under one account, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityHeader {
    /// Headings in document order
    pub tables: Vec<ActivityTable>,
}

impl ActivityHeader {
    pub(crate) fn extract(&mut self, tag: &str, cursor: &mut RowCursor<'_>) -> Result<()> {
        let position = cursor.position();
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        let label = row.first_text().trim().to_string();
        let direction = Direction::from_label(&label).ok_or_else(|| {
            Error::malformed(tag, &row.texts(), "expected deposits, withdrawals or checks")
        })?;

        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        let tokens = row
            .first_text()
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let columns = match split_leading_pair(tokens) {
            Some(columns) if !columns[2].is_empty() => columns.to_vec(),
            _ => {
                return Err(Error::malformed(
                    tag,
                    &row.texts(),
                    "expected three column headers",
                ))
            }
        };

        log::debug!("{tag}: {label} {columns:?}");
        self.tables.push(ActivityTable {
            label,
            direction,
            columns,
            position,
        });
        Ok(())
    }

    /// Most recent heading.
    pub fn current(&self) -> Option<&ActivityTable> {
        self.tables.last()
    }

    /// Heading in force at `position`.
    pub fn at(&self, position: Position) -> Option<&ActivityTable> {
        self.tables.iter().rev().find(|t| t.position <= position)
    }
}

/// One parsed activity line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLine {
    /// `[date, amount, description, continuation...]`
    pub fields: Vec<String>,
    /// Whether a continuation row was merged in
    pub continued: bool,
    /// Where the line started
    pub position: Position,
}

impl ActivityLine {
    /// Date text.
    pub fn date(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    /// Amount text.
    pub fn amount(&self) -> &str {
        self.fields.get(1).map(String::as_str).unwrap_or("")
    }

    /// Description fields joined with single spaces.
    pub fn description(&self) -> String {
        self.fields
            .iter()
            .skip(2)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Every activity line recorded by one activity-line state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityLines {
    /// Lines in document order
    pub lines: Vec<ActivityLine>,
}

impl ActivityLines {
    pub(crate) fn extract(
        &mut self,
        tag: &str,
        cursor: &mut RowCursor<'_>,
        options: &ParseOptions,
    ) -> Result<()> {
        let position = cursor.position();
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());

        let texts = row.non_empty_texts();
        let mut tokens: Vec<String> = texts
            .first()
            .map(|t| t.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        tokens.extend(texts.iter().skip(1).cloned());
        let mut fields = split_leading_pair(tokens)
            .ok_or_else(|| Error::malformed(tag, &row.texts(), "expected date and amount"))?
            .to_vec();

        let mut continued = false;
        if let Ok(next) = cursor.current_row() {
            if next.first_text().contains(options.continuation_marker.as_str()) {
                let next = cursor.consume_row()?;
                fields.extend(next.non_empty_texts());
                continued = true;
                log::debug!("{tag}: continued on next line");
            }
        }

        log::debug!("{tag}: {fields:?}");
        self.lines.push(ActivityLine {
            fields,
            continued,
            position,
        });
        Ok(())
    }
}

/// Running footer/header block between pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageBoundary {
    /// Number of page breaks taken
    pub crossings: usize,
}

impl PageBoundary {
    pub(crate) fn extract(
        &mut self,
        tag: &str,
        cursor: &mut RowCursor<'_>,
        options: &ParseOptions,
    ) -> Result<()> {
        let row = cursor.consume_row()?;
        log::debug!("{tag}: {}", row.layout_string());
        let more_pages = !cursor.is_last_page();
        cursor.consume_page();
        self.crossings += 1;

        if more_pages {
            for _ in 0..options.running_header_rows {
                let row = cursor.consume_row()?;
                log::debug!("{tag}: skip {}", row.layout_string());
            }
        }
        Ok(())
    }
}

/// Skip `count` rows, logging each.
pub(crate) fn skip_rows(tag: &str, cursor: &mut RowCursor<'_>, count: usize) -> Result<()> {
    for _ in 0..count {
        let row = cursor.consume_row()?;
        log::debug!("{tag}: skip {}", row.layout_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Grid, Page};

    fn grid(rows: Vec<Row>) -> Grid {
        Grid::new(vec![Page::new(rows)])
    }

    #[test]
    fn test_address() {
        let grid = grid(vec![
            Row::from_texts(["LITTLE CATZ LLC", "", "0042"]),
            Row::from_texts(["PO BOX 1", "", "SUITE 2"]),
            Row::from_texts(["SEATTLE WA", "98101"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut address = Address::default();
        address.extract("address", &mut cursor).unwrap();

        assert_eq!(address.organization, "LITTLE CATZ LLC");
        assert_eq!(address.code, "0042");
        assert_eq!(address.lines, vec!["PO BOX 1 SUITE 2", "SEATTLE WA 98101"]);
        assert_eq!(cursor.position().row, 3);
    }

    #[test]
    fn test_statement_period() {
        let grid = grid(vec![Row::from_texts(["Statement Period: 01/01/2020-01/31/2020"])]);
        let mut cursor = RowCursor::new(&grid);
        let mut period = StatementPeriod::default();
        period.extract("statement_period", &mut cursor).unwrap();
        assert_eq!(period.start, "01/01/2020");
        assert_eq!(period.stop, "01/31/2020");
    }

    #[test]
    fn test_statement_period_malformed() {
        let grid = grid(vec![Row::from_texts(["Statement Period 01/01/2020"])]);
        let mut cursor = RowCursor::new(&grid);
        let err = StatementPeriod::default()
            .extract("statement_period", &mut cursor)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedField { ref state, .. } if state == "statement_period"));
    }

    #[test]
    fn test_two_line_block_header() {
        let grid = grid(vec![
            Row::new(vec![
                Cell::new("", 10.0, 30.0),
                Cell::new("Beginning Deposits", 50.0, 80.0),
                Cell::new("", 140.0, 20.0),
                Cell::new("", 170.0, 20.0),
                Cell::new("Ending", 200.0, 40.0),
                Cell::new("Dividends", 250.0, 40.0),
            ]),
            Row::from_texts(["Account", "Balance Credits", "Withdrawals", "", "Balance", "YTD"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut header = BlockHeader::new(2);
        header.extract("summary/account_header", &mut cursor).unwrap();
        assert_eq!(
            header.headers,
            vec![
                "Account",
                "Beginning Balance",
                "Deposits Credits",
                "Withdrawals",
                "Ending Balance",
                "Dividends YTD"
            ]
        );
    }

    #[test]
    fn test_two_line_block_header_too_narrow() {
        let grid = grid(vec![Row::from_texts(["a", "b c"]), Row::from_texts(["d", "e f"])]);
        let mut cursor = RowCursor::new(&grid);
        let err = BlockHeader::new(2).extract("hdr", &mut cursor).unwrap_err();
        assert!(matches!(err, Error::MalformedField { .. }));
    }

    #[test]
    fn test_two_line_block_header_extra_words() {
        let grid = grid(vec![
            Row::from_texts(["", "Beginning Deposits Total", "", "", "Ending", "Dividends"]),
            Row::from_texts(["Account", "Balance Credits", "Withdrawals", "", "Balance", "YTD"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut header = BlockHeader::new(2);
        header.extract("hdr", &mut cursor).unwrap();
        assert_eq!(header.headers[1], "Beginning Balance");
        assert_eq!(header.headers[2], "Deposits Credits");
        assert_eq!(header.headers.len(), 6);
    }

    #[test]
    fn test_two_line_block_header_one_word() {
        let grid = grid(vec![
            Row::from_texts(["", "Beginning", "", "", "Ending", "Dividends"]),
            Row::from_texts(["Account", "Balance Credits", "Withdrawals", "", "Balance", "YTD"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let err = BlockHeader::new(2).extract("hdr", &mut cursor).unwrap_err();
        assert!(matches!(err, Error::MalformedField { .. }));
    }

    #[test]
    fn test_one_line_block_header() {
        let grid = grid(vec![Row::from_texts(["Fees", "", "Total"])]);
        let mut cursor = RowCursor::new(&grid);
        let mut header = BlockHeader::new(1);
        header.extract("hdr", &mut cursor).unwrap();
        assert_eq!(header.headers, vec!["Fees", "Total"]);
    }

    #[test]
    fn test_summary_line_split() {
        let grid = grid(vec![Row::from_texts([
            "Checking 1234",
            "100.00 50.00",
            "",
            "25.00",
        ])]);
        let mut cursor = RowCursor::new(&grid);
        let mut summary = AccountsSummary::default();
        summary.extract("accounts", &mut cursor).unwrap();
        assert_eq!(
            summary.lines,
            vec![vec!["Checking 1234", "100.00", "50.00", "25.00"]]
        );
    }

    #[test]
    fn test_activity_header() {
        let grid = grid(vec![
            Row::from_texts(["Withdrawals and other debits"]),
            Row::from_texts(["Date Amount Transaction Detail"]),
            Row::from_texts(["Checks"]),
            Row::from_texts(["Date Amount Check Number"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut header = ActivityHeader::default();
        header.extract("activity_header", &mut cursor).unwrap();
        let table = header.current().unwrap();
        assert_eq!(table.direction, Direction::Withdrawal);
        assert_eq!(table.columns, vec!["Date", "Amount", "Transaction Detail"]);

        header.extract("activity_header", &mut cursor).unwrap();
        assert_eq!(header.tables.len(), 2);
        let at_first = header.at(Position { page: 0, row: 1 }).unwrap();
        assert_eq!(at_first.direction, Direction::Withdrawal);
        let at_second = header.at(Position { page: 0, row: 9 }).unwrap();
        assert_eq!(at_second.direction, Direction::Check);
        assert_eq!(at_second.columns, vec!["Date", "Amount", "Check Number"]);
    }

    #[test]
    fn test_account_detail_history() {
        let grid = grid(vec![
            Row::from_texts(["Checking 0001"]),
            Row::from_texts(["Savings 0002"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut detail = AccountDetail::default();
        detail.extract("account", &mut cursor).unwrap();
        detail.extract("account", &mut cursor).unwrap();
        assert_eq!(detail.current(), Some("Savings 0002"));
        assert_eq!(detail.at(Position { page: 0, row: 0 }), Some("Checking 0001"));
        assert_eq!(detail.at(Position { page: 3, row: 0 }), Some("Savings 0002"));
    }

    #[test]
    fn test_activity_header_needs_three_columns() {
        let grid = grid(vec![
            Row::from_texts(["Deposits"]),
            Row::from_texts(["Date Amount"]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let err = ActivityHeader::default()
            .extract("activity_header", &mut cursor)
            .unwrap_err();
        match err {
            Error::MalformedField { state, row, .. } => {
                assert_eq!(state, "activity_header");
                assert_eq!(row, vec!["Date Amount"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_activity_line_with_continuation() {
        let grid = grid(vec![
            Row::from_texts(["01/15 (12.50) ATM Withdrawal", "", "Main St"]),
            Row::from_texts(["Machine ID 0042 Seattle"]),
            Row::from_texts(["01/16 3.00 Fee"]),
        ]);
        let options = ParseOptions::default();
        let mut cursor = RowCursor::new(&grid);
        let mut lines = ActivityLines::default();
        lines.extract("activity", &mut cursor, &options).unwrap();
        lines.extract("activity", &mut cursor, &options).unwrap();

        assert_eq!(lines.lines.len(), 2);
        let first = &lines.lines[0];
        assert!(first.continued);
        assert_eq!(first.date(), "01/15");
        assert_eq!(first.amount(), "(12.50)");
        assert_eq!(
            first.description(),
            "ATM Withdrawal Main St Machine ID 0042 Seattle"
        );
        assert!(!lines.lines[1].continued);
        assert_eq!(lines.lines[1].position, Position { page: 0, row: 2 });
    }

    #[test]
    fn test_activity_line_at_end_of_page() {
        let grid = grid(vec![Row::from_texts(["01/15 1.00"])]);
        let mut cursor = RowCursor::new(&grid);
        let mut lines = ActivityLines::default();
        lines
            .extract("activity", &mut cursor, &ParseOptions::default())
            .unwrap();
        assert_eq!(lines.lines[0].fields, vec!["01/15", "1.00", ""]);
        assert_eq!(lines.lines[0].description(), "");
    }

    #[test]
    fn test_activity_line_malformed() {
        let grid = grid(vec![Row::from_texts(["01/15"])]);
        let mut cursor = RowCursor::new(&grid);
        let err = ActivityLines::default()
            .extract("activity", &mut cursor, &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedField { .. }));
    }

    #[test]
    fn test_page_boundary_skips_running_header() {
        let grid = Grid::new(vec![
            Page::new(vec![Row::from_texts(["page 1 of 2"])]),
            Page::new(vec![
                Row::from_texts(["BECU"]),
                Row::from_texts(["Statement Period"]),
                Row::from_texts(["01/20 5.00 Deposit"]),
            ]),
        ]);
        let mut cursor = RowCursor::new(&grid);
        let mut boundary = PageBoundary::default();
        boundary
            .extract("page_boundary", &mut cursor, &ParseOptions::default())
            .unwrap();
        assert_eq!(boundary.crossings, 1);
        assert_eq!(cursor.position(), Position { page: 1, row: 2 });
    }

    #[test]
    fn test_page_boundary_on_last_page() {
        let grid = grid(vec![Row::from_texts(["page 1 of 1"])]);
        let mut cursor = RowCursor::new(&grid);
        PageBoundary::default()
            .extract("page_boundary", &mut cursor, &ParseOptions::default())
            .unwrap();
        assert_eq!(cursor.position(), Position { page: 1, row: 0 });
        assert!(cursor.current_row().unwrap_err().is_end_of_input());
    }
}
