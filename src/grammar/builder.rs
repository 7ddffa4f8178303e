//! Incremental construction of a [`Grammar`].

use crate::error::{Error, Result};
use crate::parser::{Section, SectionGraph, SectionId, SectionKind, SectionTree};

use super::Grammar;

/// Builds sections, tree and graph together so that ids stay in step.
#[derive(Debug)]
pub struct GrammarBuilder {
    name: String,
    sections: Vec<Section>,
    tree: SectionTree,
    graph: SectionGraph,
    initial: Option<SectionId>,
    terminal: Option<SectionId>,
    page_boundary: Option<SectionId>,
    page_break_exits: Vec<SectionId>,
}

impl GrammarBuilder {
    /// Start a grammar with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
            tree: SectionTree::new(),
            graph: SectionGraph::new(),
            initial: None,
            terminal: None,
            page_boundary: None,
            page_break_exits: Vec::new(),
        }
    }

    fn next_id(&self) -> SectionId {
        SectionId(self.sections.len())
    }

    /// Add a section with no boundary pattern.
    pub fn section(
        &mut self,
        parent: Option<SectionId>,
        tag: &str,
        kind: SectionKind,
    ) -> Result<SectionId> {
        let section = Section::new(self.next_id(), tag, kind);
        self.insert(parent, section)
    }

    /// Add a section entered only when `pattern` matches a cell of the next row.
    pub fn matching(
        &mut self,
        parent: Option<SectionId>,
        tag: &str,
        kind: SectionKind,
        pattern: &str,
    ) -> Result<SectionId> {
        let section = Section::new(self.next_id(), tag, kind).with_pattern(pattern)?;
        self.insert(parent, section)
    }

    fn insert(&mut self, parent: Option<SectionId>, section: Section) -> Result<SectionId> {
        let id = section.id;
        self.tree.add_node(id, &section.tag, parent)?;
        log::trace!("{}: section {} ({})", self.name, section.tag, section.kind.name());
        self.sections.push(section);
        Ok(id)
    }

    /// Use `id` as the page-boundary state. Must precede any
    /// [`interruptible`](Self::interruptible) call.
    pub fn page_boundary(&mut self, id: SectionId) -> &mut Self {
        self.page_boundary = Some(id);
        self
    }

    /// Start the run loop in `id`.
    pub fn initial(&mut self, id: SectionId) -> &mut Self {
        self.initial = Some(id);
        self
    }

    /// Stop the run loop on reaching `id`.
    pub fn terminal(&mut self, id: SectionId) -> &mut Self {
        self.terminal = Some(id);
        self
    }

    /// Opt `id` in to page-break interruption: registers `id -> page boundary`
    /// now, ahead of the state's other edges.
    pub fn interruptible(&mut self, id: SectionId) -> Result<()> {
        let boundary = self
            .page_boundary
            .ok_or_else(|| Error::Other("page boundary must be defined first".into()))?;
        let tag = self.tag(id)?.to_string();
        self.sections[id.index()].interruptible = true;
        self.graph
            .add_transition(format!("pagebreak:{tag}"), id, boundary)
    }

    /// Register `from -> to`, ignoring an identical edge that already exists.
    pub fn transition(&mut self, name: &str, from: SectionId, to: SectionId) -> Result<()> {
        if self.graph.contains(from, to, None) {
            return Ok(());
        }
        self.graph.add_transition(name, from, to)
    }

    /// Register a self-loop for a repeated line.
    pub fn self_loop(&mut self, id: SectionId) -> Result<()> {
        let name = format!("self_{}", self.tag(id)?);
        self.transition(&name, id, id)
    }

    /// Fan in: every state of `incoming` may move to `target`.
    pub fn fan_in(&mut self, incoming: &[SectionId], target: SectionId) -> Result<()> {
        let target_tag = self.tag(target)?.to_string();
        for &from in incoming {
            let name = format!("{}_TO_{}", self.tag(from)?, target_tag);
            self.transition(&name, from, target)?;
        }
        Ok(())
    }

    /// Fan out: `from` may move to every state of `outgoing`.
    pub fn fan_out(&mut self, prefix: &str, from: SectionId, outgoing: &[SectionId]) -> Result<()> {
        let from_tag = self.tag(from)?.to_string();
        for &to in outgoing {
            let name = format!("{prefix}:{from_tag}_TO_{}", self.tag(to)?);
            self.transition(&name, from, to)?;
        }
        Ok(())
    }

    /// States the page boundary may move to when no interrupted state resumes.
    pub fn page_break_exits(&mut self, exits: &[SectionId]) -> &mut Self {
        self.page_break_exits.extend_from_slice(exits);
        self
    }

    fn tag(&self, id: SectionId) -> Result<&str> {
        self.sections
            .get(id.index())
            .map(|s| s.tag.as_str())
            .ok_or_else(|| Error::Other(format!("unknown section id {}", id.index())))
    }

    /// Finish the grammar.
    ///
    /// Edge order out of the page boundary is: resume edges (for each
    /// interruptible state, a copy of its own edges), then the static exits,
    /// then the terminal.
    pub fn build(mut self) -> Result<Grammar> {
        let initial = self
            .initial
            .ok_or_else(|| Error::Other(format!("{}: no initial state", self.name)))?;
        let terminal = self
            .terminal
            .ok_or_else(|| Error::Other(format!("{}: no terminal state", self.name)))?;

        if let Some(boundary) = self.page_boundary {
            let resumable: Vec<(SectionId, Vec<SectionId>)> = self
                .sections
                .iter()
                .filter(|s| s.interruptible)
                .map(|s| {
                    let targets = self
                        .graph
                        .outgoing(s.id)
                        .filter(|t| t.target != boundary)
                        .map(|t| t.target)
                        .collect();
                    (s.id, targets)
                })
                .collect();

            for (origin, targets) in resumable {
                let origin_tag = self.tag(origin)?.to_string();
                for target in targets {
                    let name = format!("resume:{origin_tag}_TO_{}", self.tag(target)?);
                    self.graph.add_resume(name, boundary, target, origin)?;
                }
            }

            let exits = std::mem::take(&mut self.page_break_exits);
            self.fan_out("pagebreak", boundary, &exits)?;
        }

        if self.sections[terminal.index()].pattern().is_some() {
            let sources: Vec<SectionId> = self
                .sections
                .iter()
                .map(|s| s.id)
                .filter(|&id| {
                    id != terminal && (id == initial || self.graph.outgoing(id).next().is_some())
                })
                .collect();
            self.fan_in(&sources, terminal)?;
        }

        log::debug!(
            "grammar {}: {} sections, {} transitions",
            self.name,
            self.sections.len(),
            self.graph.len()
        );

        Ok(Grammar {
            name: self.name,
            sections: self.sections,
            tree: self.tree,
            graph: self.graph,
            initial,
            terminal,
            page_boundary: self.page_boundary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PageBoundary;

    fn base() -> (GrammarBuilder, SectionId, SectionId) {
        let mut builder = GrammarBuilder::new("test");
        let root = builder.section(None, "root", SectionKind::Plain).unwrap();
        let boundary = builder
            .matching(
                Some(root),
                "page_boundary",
                SectionKind::PageBoundary(PageBoundary::default()),
                "page [0-9]+ of [0-9]+",
            )
            .unwrap();
        builder.page_boundary(boundary).initial(root);
        (builder, root, boundary)
    }

    #[test]
    fn test_requires_terminal() {
        let (builder, _, _) = base();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_interruptible_needs_boundary() {
        let mut builder = GrammarBuilder::new("test");
        let root = builder.section(None, "root", SectionKind::Plain).unwrap();
        assert!(builder.interruptible(root).is_err());
    }

    #[test]
    fn test_resume_edges_copy_interrupted_edges() {
        let (mut builder, root, boundary) = base();
        let line = builder
            .matching(Some(root), "line", SectionKind::Matching, "x")
            .unwrap();
        let other = builder
            .matching(Some(root), "other", SectionKind::Matching, "y")
            .unwrap();
        let terminal = builder.section(Some(root), "terminus", SectionKind::Terminal).unwrap();
        builder.terminal(terminal);

        builder.transition("root_line", root, line).unwrap();
        builder.interruptible(line).unwrap();
        builder.self_loop(line).unwrap();
        builder.transition("line_other", line, other).unwrap();
        builder.page_break_exits(&[other]);

        let grammar = builder.build().unwrap();
        let out_of_line: Vec<_> = grammar.graph.outgoing(line).map(|t| t.target).collect();
        assert_eq!(out_of_line, vec![boundary, line, other]);

        let out_of_boundary: Vec<_> = grammar
            .graph
            .outgoing(boundary)
            .map(|t| (t.target, t.resume_from))
            .collect();
        assert_eq!(
            out_of_boundary,
            vec![(line, Some(line)), (other, Some(line)), (other, None)]
        );
    }

    #[test]
    fn test_duplicate_tag() {
        let (mut builder, root, _) = base();
        builder.section(Some(root), "dup", SectionKind::Plain).unwrap();
        let err = builder.section(Some(root), "dup", SectionKind::Plain).unwrap_err();
        assert!(matches!(err, Error::DuplicateTag(_)));
    }
}
