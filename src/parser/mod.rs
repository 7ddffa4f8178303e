//! Section-recognition engine.
//!
//! A [`Session`] walks a [`Grid`](crate::model::Grid) row by row. Each state
//! of the walk is a [`Section`]; the [`SectionGraph`] says which section may
//! follow which, and the [`SectionTree`] records where each section sits in
//! the document for later ancestor lookups.

mod cursor;
mod extract;
mod graph;
mod machine;
mod options;
mod section;
mod tree;

pub use cursor::{Position, RowCursor};
pub use extract::{
    AccountDetail, AccountLabel, AccountsSummary, ActivityHeader, ActivityLine, ActivityLines,
    ActivityTable, Address, BlockHeader, FeesSummary, PageBoundary, StatementPeriod,
};
pub use graph::{SectionGraph, Transition};
pub use machine::{Completion, Run, Session, Step};
pub use options::{ErrorMode, ParseOptions};
pub use section::{Section, SectionId, SectionKind};
pub use tree::{Ancestors, SectionTree, TreeNode};
