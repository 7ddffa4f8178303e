//! Integration tests for grammars and the registry.

use std::sync::Arc;

use stmtledger::grammar::{
    BecuGrammar, BecuPatterns, Grammar, GrammarBuilder, GrammarRegistry, StatementGrammar,
};
use stmtledger::parser::{
    AccountDetail, ActivityHeader, ActivityLines, Address, SectionKind, Session,
};
use stmtledger::{Completion, Direction, Error, Grid, Page, ParseOptions, Row, StatementParser};

/// A one-account layout: address, then a single activity table.
struct PlainBank;

impl StatementGrammar for PlainBank {
    fn name(&self) -> &str {
        "plain"
    }

    fn build(&self) -> stmtledger::Result<Grammar> {
        let mut b = GrammarBuilder::new("plain");
        let root = b.section(None, "PLAIN", SectionKind::Plain)?;
        let address = b.section(Some(root), "address", SectionKind::Address(Address::default()))?;
        let detail = b.matching(
            Some(root),
            "activity",
            SectionKind::Opening { heading: None },
            "^activity$",
        )?;
        let account = b.matching(
            Some(detail),
            "activity/account",
            SectionKind::AccountDetail(AccountDetail::default()),
            "account",
        )?;
        let header = b.matching(
            Some(account),
            "activity/header",
            SectionKind::ActivityHeader(ActivityHeader::default()),
            "deposits|withdrawals",
        )?;
        let line = b.matching(
            Some(header),
            "activity/line",
            SectionKind::ActivityLines(ActivityLines::default()),
            "^[0-9]{4}-[0-9]{2}-[0-9]{2}",
        )?;
        let terminal = b.matching(Some(root), "end", SectionKind::Terminal, "^end$")?;
        b.initial(root).terminal(terminal);

        b.transition("root_address", root, address)?;
        b.transition("address_activity", address, detail)?;
        b.transition("activity_account", detail, account)?;
        b.transition("account_header", account, header)?;
        b.transition("header_line", header, line)?;
        b.self_loop(line)?;
        b.fan_out("line", line, &[header])?;
        b.build()
    }
}

fn plain_grid() -> Grid {
    Grid::new(vec![Page::new(vec![
        Row::from_texts(["Plain Savings Bank"]),
        Row::from_texts(["1 Main St"]),
        Row::from_texts(["Springfield"]),
        Row::from_texts(["Activity"]),
        Row::from_texts(["Account 77"]),
        Row::from_texts(["Deposits"]),
        Row::from_texts(["Date Amount Memo"]),
        Row::from_texts(["2021-03-02 10.00 Interest"]),
        Row::from_texts(["Withdrawals"]),
        Row::from_texts(["Date Amount Memo"]),
        Row::from_texts(["2021-03-05 (4.00) Service charge"]),
        Row::from_texts(["End"]),
        Row::from_texts(["Legal notices follow"]),
    ])])
}

#[test]
fn test_registry_defaults() {
    let registry = GrammarRegistry::with_defaults();
    assert!(registry.supports("becu"));
    assert!(!registry.supports("plain"));
    assert_eq!(registry.names(), vec!["becu"]);
    assert!(matches!(registry.build("acme"), Err(Error::UnknownGrammar(_))));
}

#[test]
fn test_custom_grammar_through_parser() {
    let statement = StatementParser::new()
        .with_registered(Arc::new(PlainBank))
        .with_grammar("plain")
        .parse_grid(&plain_grid())
        .unwrap();

    assert_eq!(statement.completion(), Completion::Terminal);
    assert_eq!(statement.last_state(), "end");
    assert_eq!(statement.organization(), Some("Plain Savings Bank"));

    let entries = statement.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].iso_date(), "2021-03-02");
    assert_eq!(entries[0].direction, Direction::Deposit);
    assert_eq!(entries[0].account, "Account 77");
    assert_eq!(entries[0].section, "activity");
    assert_eq!(entries[1].direction, Direction::Withdrawal);
    assert_eq!(entries[1].description, "Service charge");
}

#[test]
fn test_first_registered_transition_wins() {
    let build = |order: [&str; 2]| {
        let mut b = GrammarBuilder::new("tie");
        let root = b.section(None, "root", SectionKind::Plain).unwrap();
        let end = b.section(Some(root), "end", SectionKind::Terminal).unwrap();
        b.initial(root).terminal(end);
        for tag in order {
            let id = b
                .matching(Some(root), tag, SectionKind::Opening { heading: None }, "fee")
                .unwrap();
            b.transition(&format!("root_{tag}"), root, id).unwrap();
        }
        b.build().unwrap()
    };
    let grid = Grid::new(vec![Page::new(vec![Row::from_texts(["Monthly fees"])])]);

    for order in [["fees_a", "fees_b"], ["fees_b", "fees_a"]] {
        for _ in 0..3 {
            let run = Session::new(build(order), &grid, ParseOptions::default())
                .run()
                .unwrap();
            assert_eq!(run.completion, Completion::EndOfInput);
            let entered: Vec<&str> = run
                .visited
                .iter()
                .map(|&id| run.grammar.section(id).tag.as_str())
                .collect();
            assert_eq!(entered, vec![order[0]]);
        }
    }
}

#[test]
fn test_patterns_from_json() {
    let patterns: BecuPatterns =
        serde_json::from_str(r#"{"page_boundary": "seite [0-9]+ von [0-9]+"}"#).unwrap();
    assert_eq!(patterns.page_boundary, "seite [0-9]+ von [0-9]+");
    assert_eq!(patterns.account, BecuPatterns::default().account);

    let grammar = BecuGrammar::with_patterns(patterns).build().unwrap();
    let boundary = grammar.find("page_boundary").unwrap();
    assert_eq!(boundary.pattern(), Some("seite [0-9]+ von [0-9]+"));
}

#[test]
fn test_invalid_pattern_rejected() {
    let patterns = BecuPatterns {
        fees: "fees(".to_string(),
        ..BecuPatterns::default()
    };
    let result = BecuGrammar::with_patterns(patterns).build();
    assert!(matches!(result, Err(Error::InvalidPattern(_))));
}

#[test]
fn test_sections_share_ids_with_tree() {
    let grammar = BecuGrammar::default().build().unwrap();
    assert_eq!(grammar.sections.len(), grammar.tree.len());
    for (id, _) in grammar.tree.walk() {
        let node = grammar.tree.get(id).unwrap();
        assert_eq!(grammar.section(id).tag, node.tag);
    }
}
