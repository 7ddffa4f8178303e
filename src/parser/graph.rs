//! Section graph: guarded transitions between sections.

use serde::Serialize;

use super::section::{Section, SectionId};
use crate::error::{Error, Result};
use crate::model::Row;

/// A guarded edge between two sections.
///
/// The guard is `source.done() && target.ready(row)`, evaluated against the
/// next unconsumed row. A resume edge additionally requires that the page
/// break it leaves from interrupted `resume_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Descriptive name
    pub name: String,
    /// State the edge leaves
    pub source: SectionId,
    /// State the edge enters
    pub target: SectionId,
    /// Interrupted state this resume edge belongs to
    pub resume_from: Option<SectionId>,
}

impl Transition {
    /// Evaluate the guard. Pure: neither sections nor row are touched.
    pub fn permits(&self, sections: &[Section], row: &Row, interrupted: Option<SectionId>) -> bool {
        if let Some(origin) = self.resume_from {
            if interrupted != Some(origin) {
                return false;
            }
        }
        match (sections.get(self.source.index()), sections.get(self.target.index())) {
            (Some(source), Some(target)) => source.done() && target.ready(row),
            _ => false,
        }
    }
}

/// Directed graph over sections, with edges kept in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionGraph {
    transitions: Vec<Transition>,
    #[serde(skip)]
    outgoing: Vec<Vec<usize>>,
}

impl SectionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transition.
    pub fn add_transition(
        &mut self,
        name: impl Into<String>,
        source: SectionId,
        target: SectionId,
    ) -> Result<()> {
        self.push(Transition {
            name: name.into(),
            source,
            target,
            resume_from: None,
        })
    }

    /// Register an edge out of a page break that only fires when the break
    /// interrupted `origin`.
    pub fn add_resume(
        &mut self,
        name: impl Into<String>,
        boundary: SectionId,
        target: SectionId,
        origin: SectionId,
    ) -> Result<()> {
        self.push(Transition {
            name: name.into(),
            source: boundary,
            target,
            resume_from: Some(origin),
        })
    }

    fn push(&mut self, transition: Transition) -> Result<()> {
        if self.contains(transition.source, transition.target, transition.resume_from) {
            return Err(Error::Other(format!(
                "duplicate transition '{}'",
                transition.name
            )));
        }
        let source = transition.source.index();
        if self.outgoing.len() <= source {
            self.outgoing.resize_with(source + 1, Vec::new);
        }
        log::trace!(
            "transition {} : {:?} -> {:?}",
            transition.name,
            transition.source,
            transition.target
        );
        self.outgoing[source].push(self.transitions.len());
        self.transitions.push(transition);
        Ok(())
    }

    /// Whether an identical edge already exists.
    pub fn contains(
        &self,
        source: SectionId,
        target: SectionId,
        resume_from: Option<SectionId>,
    ) -> bool {
        self.outgoing(source)
            .any(|t| t.target == target && t.resume_from == resume_from)
    }

    /// Edges leaving `source`, in registration order.
    pub fn outgoing(&self, source: SectionId) -> impl Iterator<Item = &Transition> + '_ {
        self.outgoing
            .get(source.index())
            .into_iter()
            .flatten()
            .map(move |&i| &self.transitions[i])
    }

    /// All edges in registration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
