//! Plain-text ledger journal rendering.

use crate::statement::Statement;

/// Render entries as a journal: `date<TAB>description` followed by
/// `<TAB>account<TAB>amount`, one blank line between transactions.
///
/// Entries with no account label fall back to their detail section tag.
pub fn to_ledger_text(statement: &Statement) -> String {
    let mut out = String::new();
    for (i, entry) in statement.entries().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let account = if entry.account.is_empty() {
            entry.section.as_str()
        } else {
            entry.account.as_str()
        };
        out.push_str(&format!("{}\t{}\n", entry.iso_date(), entry.description));
        out.push_str(&format!("\t{}\t{}\n", account, entry.amount));
    }
    out
}
