//! ASCII section-tree rendering.

use crate::grammar::Grammar;
use crate::parser::{Section, SectionId, SectionKind};

/// Render the section tree with each section's visit count and extracted
/// fields. Works on a fresh grammar as well as on a walked one.
///
/// ```text
/// BECU
/// ├── page_boundary (page_boundary) x1: 1 crossing
/// ├── initial (plain)
/// │   ├── address (address) x1: BECU 0042 / PO BOX 1 / SEATTLE WA
/// ```
pub fn to_tree_text(grammar: &Grammar) -> String {
    let mut out = String::new();
    if let Some(root) = grammar.tree.root() {
        out.push_str(&label(grammar.section(root)));
        out.push('\n');
        render_children(grammar, root, "", &mut out);
    }
    out
}

fn render_children(grammar: &Grammar, id: SectionId, prefix: &str, out: &mut String) {
    let children = grammar.tree.children(id);
    for (i, &child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let section = grammar.section(child);
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&label(section));
        out.push('\n');

        let child_prefix = format!("{prefix}{indent}");
        for line in detail_lines(section) {
            out.push_str(&child_prefix);
            out.push_str("· ");
            out.push_str(&line);
            out.push('\n');
        }
        render_children(grammar, child, &child_prefix, out);
    }
}

fn label(section: &Section) -> String {
    let mut text = format!("{} ({})", section.tag, section.kind.name());
    if section.visits > 0 {
        text.push_str(&format!(" x{}", section.visits));
    }
    let summary = summary(&section.kind);
    if !summary.is_empty() {
        text.push_str(": ");
        text.push_str(&summary);
    }
    text
}

/// One-line digest of a section's fields.
fn summary(kind: &SectionKind) -> String {
    match kind {
        SectionKind::Plain
        | SectionKind::Matching
        | SectionKind::AccountYield
        | SectionKind::Terminal => String::new(),
        SectionKind::Opening { heading } => heading.clone().unwrap_or_default(),
        SectionKind::Address(address) => {
            let mut parts = vec![format!("{} {}", address.organization, address.code)
                .trim()
                .to_string()];
            parts.extend(address.lines.iter().cloned());
            parts.retain(|p| !p.is_empty());
            parts.join(" / ")
        }
        SectionKind::StatementPeriod(period) if !period.start.is_empty() => {
            format!("{} - {}", period.start, period.stop)
        }
        SectionKind::StatementPeriod(_) => String::new(),
        SectionKind::BlockHeader(header) => header.headers.join(" | "),
        SectionKind::AccountsSummary(summary) => plural(summary.lines.len(), "line"),
        SectionKind::FeesSummary(fees) => plural(fees.rows.len(), "row"),
        SectionKind::AccountDetail(detail) => detail
            .accounts
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        SectionKind::ActivityHeader(header) => header
            .tables
            .iter()
            .map(|t| format!("{} [{}]", t.label, t.direction))
            .collect::<Vec<_>>()
            .join(", "),
        SectionKind::ActivityLines(lines) => plural(lines.lines.len(), "line"),
        SectionKind::PageBoundary(boundary) => plural(boundary.crossings, "crossing"),
    }
}

/// Repeated rows, printed one per line under their section.
fn detail_lines(section: &Section) -> Vec<String> {
    match &section.kind {
        SectionKind::AccountsSummary(summary) => {
            summary.lines.iter().map(|line| line.join(" ")).collect()
        }
        SectionKind::FeesSummary(fees) => fees.rows.iter().map(|row| row.join(" ")).collect(),
        SectionKind::ActivityLines(lines) => lines
            .lines
            .iter()
            .map(|line| {
                format!("{} {} {}", line.date(), line.amount(), line.description())
                    .trim_end()
                    .to_string()
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 0 {
        String::new()
    } else if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{BecuGrammar, StatementGrammar};
    use crate::model::{Grid, Page, Row};

    #[test]
    fn test_fresh_grammar_tree() {
        let grammar = BecuGrammar::default().build().unwrap();
        let text = to_tree_text(&grammar);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "BECU (plain)");
        assert_eq!(lines[1], "├── page_boundary (page_boundary)");
        assert_eq!(lines[2], "├── initial (plain)");
        assert_eq!(lines[3], "│   ├── address (address)");
        assert_eq!(lines[4], "│   └── statement_period (statement_period)");
        assert_eq!(lines.last(), Some(&"└── terminus (terminal)"));
    }

    #[test]
    fn test_walked_tree_shows_fields() {
        let grid = Grid::new(vec![Page::new(vec![
            Row::from_texts(["BECU", "0042"]),
            Row::from_texts(["PO BOX 1"]),
            Row::from_texts(["SEATTLE WA"]),
            Row::from_texts(["Statement Period: 01/01/2020-01/31/2020"]),
            Row::from_texts(["Deposit Account Activity"]),
            Row::from_texts(["Checking 0001"]),
            Row::from_texts(["Deposits and other credits"]),
            Row::from_texts(["Date Amount Transaction Detail"]),
            Row::from_texts(["01/03 1,000.00 Payroll"]),
        ])]);
        let statement = crate::parse_grid(&grid).unwrap();
        let text = to_tree_text(statement.grammar());

        assert!(text.contains("address (address) x1: BECU 0042 / PO BOX 1 / SEATTLE WA"));
        assert!(text.contains("statement_period (statement_period) x1: 01/01/2020 - 01/31/2020"));
        assert!(text.contains("deposit_account/account (account_detail) x1: Checking 0001"));
        assert!(text.contains("Deposits and other credits [deposit]"));
        assert!(text.contains("deposit_account/activity (activity_lines) x1: 1 line"));
        assert!(text.contains("· 01/03 1,000.00 Payroll"));
    }
}
