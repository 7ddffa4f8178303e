//! The run loop: drives a grammar's graph over one grid.

use serde::Serialize;

use super::cursor::{Position, RowCursor};
use super::options::ParseOptions;
use super::section::SectionId;
use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::model::{Grid, Row};

/// Why a walk finished successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The terminal state was reached
    Terminal,
    /// The input ran out
    EndOfInput,
    /// A state was re-entered without the cursor moving
    Stalled,
}

/// Outcome of one run loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition committed into this state
    Entered(SectionId),
    /// The walk is over
    Finished(Completion),
}

/// A finished walk: the grammar with every section's extracted fields.
#[derive(Debug, Clone)]
pub struct Run {
    /// Grammar after the walk
    pub grammar: Grammar,
    /// How the walk ended
    pub completion: Completion,
    /// State the walk ended in
    pub last_state: SectionId,
    /// Cursor position at the end
    pub position: Position,
    /// States entered, in order
    pub visited: Vec<SectionId>,
}

/// One document session: a grammar, a cursor and the current state.
///
/// A session handles exactly one grid and is consumed by [`Session::run`].
pub struct Session<'g> {
    grammar: Grammar,
    cursor: RowCursor<'g>,
    options: ParseOptions,
    current: SectionId,
    interrupted: Option<SectionId>,
    visited: Vec<SectionId>,
    steps: usize,
    /// Cursor position when a row was last consumed
    progress_at: Position,
    /// States entered since `progress_at`
    entered_since: Vec<SectionId>,
}

impl<'g> Session<'g> {
    /// Start a session in the grammar's initial state.
    pub fn new(grammar: Grammar, grid: &'g Grid, options: ParseOptions) -> Self {
        let current = grammar.initial;
        let cursor = RowCursor::new(grid);
        Self {
            grammar,
            progress_at: cursor.position(),
            cursor,
            options,
            current,
            interrupted: None,
            visited: Vec::new(),
            steps: 0,
            entered_since: vec![current],
        }
    }

    /// Current state.
    pub fn current(&self) -> SectionId {
        self.current
    }

    /// Cursor position.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Grammar in its current state.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn stuck(&self, row: &Row) -> Error {
        let position = self.cursor.position();
        Error::StuckState {
            state: self.grammar.section(self.current).tag.clone(),
            page: position.page,
            row: position.row,
            text: row.texts(),
        }
    }

    /// Take the first transition out of the current state whose guard holds.
    pub fn step(&mut self) -> Result<Step> {
        if self.current == self.grammar.terminal {
            return Ok(Step::Finished(Completion::Terminal));
        }

        let row = match self.cursor.current_row() {
            Ok(row) => row,
            Err(err) if err.is_end_of_input() => {
                log::debug!("run: out of document in {}", self.grammar.section(self.current).tag);
                return Ok(Step::Finished(Completion::EndOfInput));
            }
            Err(err) => return Err(err),
        };

        self.steps += 1;
        if let Some(max) = self.options.max_steps {
            if self.steps > max {
                log::warn!("run: step limit {max} reached");
                return Err(self.stuck(row));
            }
        }

        let chosen = self
            .grammar
            .graph
            .outgoing(self.current)
            .find(|t| t.permits(&self.grammar.sections, row, self.interrupted))
            .map(|t| (t.target, t.name.clone()));
        let Some((target, name)) = chosen else {
            return Err(self.stuck(row));
        };
        log::debug!("run: {} at {}", name, self.cursor.position());

        let source = self.current;
        match self.grammar.page_boundary {
            Some(boundary) if target == boundary && source != boundary => {
                self.interrupted = Some(source);
            }
            Some(boundary) if source == boundary => self.interrupted = None,
            _ => {}
        }

        self.current = target;
        self.visited.push(target);
        let section = &mut self.grammar.sections[target.index()];
        match section.enter(&mut self.cursor, &self.options) {
            Ok(()) => {}
            Err(err) if err.is_end_of_input() => {
                log::debug!("run: out of document while entering {}", section.tag);
                return Ok(Step::Finished(Completion::EndOfInput));
            }
            Err(err) => return Err(err),
        }

        let position = self.cursor.position();
        if position != self.progress_at {
            self.progress_at = position;
            self.entered_since.clear();
        } else if self.entered_since.contains(&target) {
            log::warn!(
                "run: {name} re-entered {} without consuming a row",
                self.grammar.section(target).tag
            );
            return Ok(Step::Finished(Completion::Stalled));
        }
        self.entered_since.push(target);
        Ok(Step::Entered(target))
    }

    /// Step until the walk finishes.
    pub fn run(mut self) -> Result<Run> {
        let completion = loop {
            if let Step::Finished(completion) = self.step()? {
                break completion;
            }
        };

        log::info!(
            "run: finished ({:?}) in {} at {} after {} steps",
            completion,
            self.grammar.section(self.current).tag,
            self.cursor.position(),
            self.steps
        );

        Ok(Run {
            completion,
            last_state: self.current,
            position: self.cursor.position(),
            visited: self.visited,
            grammar: self.grammar,
        })
    }
}
