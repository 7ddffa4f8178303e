//! JSON rendering for parsed statements.

use serde::Serialize;

use crate::error::Result;
use crate::grammar::Grammar;
use crate::model::LedgerEntry;
use crate::parser::{
    Address, Completion, Position, Section, SectionGraph, SectionTree, StatementPeriod,
};
use crate::statement::Statement;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct StatementJson<'a> {
    grammar: &'a str,
    completion: Completion,
    position: Position,
    organization: Option<&'a str>,
    address: Option<&'a Address>,
    period: Option<&'a StatementPeriod>,
    summary: Vec<&'a [String]>,
    entries: &'a [LedgerEntry],
}

#[derive(Serialize)]
struct GrammarJson<'a> {
    name: &'a str,
    initial: &'a str,
    terminal: &'a str,
    tree: &'a SectionTree,
    sections: &'a [Section],
    graph: &'a SectionGraph,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Convert a statement's metadata and ledger to JSON.
pub fn to_json(statement: &Statement, format: JsonFormat) -> Result<String> {
    let view = StatementJson {
        grammar: &statement.grammar().name,
        completion: statement.completion(),
        position: statement.position(),
        organization: statement.organization(),
        address: statement.address(),
        period: statement.period(),
        summary: statement.summary_lines(),
        entries: statement.entries(),
    };
    serialize(&view, format)
}

/// Convert a grammar, with every section's fields, tree and graph, to JSON.
pub fn grammar_to_json(grammar: &Grammar, format: JsonFormat) -> Result<String> {
    let view = GrammarJson {
        name: &grammar.name,
        initial: &grammar.section(grammar.initial).tag,
        terminal: &grammar.section(grammar.terminal).tag,
        tree: &grammar.tree,
        sections: &grammar.sections,
        graph: &grammar.graph,
    };
    serialize(&view, format)
}
