//! Ledger types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which activity block a transaction was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money leaving the account
    Withdrawal,
    /// Money entering the account
    Deposit,
    /// A cleared check
    Check,
}

impl Direction {
    /// Classify an activity block label such as "Withdrawals and other debits".
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("withdrawal") {
            Some(Direction::Withdrawal)
        } else if lower.contains("deposit") {
            Some(Direction::Deposit)
        } else if lower.contains("check") {
            Some(Direction::Check)
        } else {
            None
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Withdrawal => "withdrawal",
            Direction::Deposit => "deposit",
            Direction::Check => "check",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured transaction derived from an activity line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction date (serialized as `YYYY-MM-DD`)
    pub date: NaiveDate,

    /// Signed amount as printed on the statement
    pub amount: Decimal,

    /// Description, including any continuation text
    pub description: String,

    /// Account label from the enclosing detail header
    pub account: String,

    /// Activity block the line was listed under
    pub direction: Direction,

    /// Tag of the detail section (e.g. `deposit_account`)
    pub section: String,
}

impl LedgerEntry {
    /// ISO-8601 date string.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
