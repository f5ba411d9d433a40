//! Path queries.
//!
//! A query is a `/`-delimited list of child names, matched
//! case-insensitively in stored order. A segment may carry an `@k` suffix
//! picking the `k`-th (0-based) of several same-named siblings. A leading
//! `ROOT` segment refers to the node the query starts from.
//!
//! Without an index, a segment matching several siblings is either an
//! error ([`ResolveMode::Strict`], used by editing callers that need one
//! target) or fans out into every match ([`ResolveMode::All`], used by
//! reading and display callers).

use std::sync::OnceLock;

use regex::Regex;

use crate::error::TreeError;
use crate::node::{TreeNode, ROOT_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// More than one unindexed match is an `AmbiguousPath` error.
    Strict,
    /// More than one unindexed match resolves every match.
    All,
}

/// One parsed query segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub index: Option<i64>,
}

fn index_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^(.*)@(-?[0-9]+)$").unwrap())
}

impl Segment {
    pub fn parse(segment: &str) -> Self {
        if let Some(caps) = index_suffix_regex().captures(segment) {
            if let Ok(index) = caps[2].parse::<i64>() {
                return Segment {
                    name: caps[1].to_string(),
                    index: Some(index),
                };
            }
        }
        Segment {
            name: segment.to_string(),
            index: None,
        }
    }
}

/// Splits a query into segments, dropping empty segments and a leading
/// `ROOT`.
pub fn parse_path(path: &str) -> Vec<Segment> {
    let mut tokens = path.split('/').filter(|t| !t.is_empty()).peekable();
    if tokens.peek() == Some(&ROOT_NAME) {
        tokens.next();
    }
    tokens.map(Segment::parse).collect()
}

/// Case-insensitive name comparison used for matching.
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// A resolved node together with its canonical path from the query root.
///
/// The canonical path indexes every level (`name@k`), so resolving it in
/// strict mode from the same root yields the same node.
#[derive(Debug, Clone)]
pub struct Match<'n, 'h> {
    pub path: String,
    pub node: &'n TreeNode<'h>,
}

/// Result of a query: one node, or (in [`ResolveMode::All`]) one result
/// per sibling that matched an ambiguous segment, nested per level.
#[derive(Debug, Clone)]
pub enum Resolved<'n, 'h> {
    One(Match<'n, 'h>),
    Many(Vec<Resolved<'n, 'h>>),
}

impl<'n, 'h> Resolved<'n, 'h> {
    pub fn is_one(&self) -> bool {
        matches!(self, Resolved::One(_))
    }

    /// The single match, if the query did not fan out.
    pub fn as_one(&self) -> Option<&Match<'n, 'h>> {
        match self {
            Resolved::One(m) => Some(m),
            Resolved::Many(_) => None,
        }
    }

    /// Number of top-level results: 1 for a single match.
    pub fn len(&self) -> usize {
        match self {
            Resolved::One(_) => 1,
            Resolved::Many(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every leaf match in traversal order.
    pub fn into_matches(self) -> Vec<Match<'n, 'h>> {
        match self {
            Resolved::One(m) => vec![m],
            Resolved::Many(all) => all.into_iter().flat_map(Resolved::into_matches).collect(),
        }
    }

    pub fn into_nodes(self) -> Vec<&'n TreeNode<'h>> {
        self.into_matches().into_iter().map(|m| m.node).collect()
    }
}

enum Step {
    /// `(child index, ordinal among matches)`
    Single(usize, usize),
    Every(Vec<(usize, usize)>),
}

fn join(prefix: &str, name: &str, ordinal: usize) -> String {
    if prefix.is_empty() {
        format!("{name}@{ordinal}")
    } else {
        format!("{prefix}/{name}@{ordinal}")
    }
}

impl<'h> TreeNode<'h> {
    pub fn resolve<'n>(&'n self, path: &str, mode: ResolveMode) -> Result<Resolved<'n, 'h>, TreeError> {
        let segments = parse_path(path);
        self.resolve_from(&segments, "", path, mode)
    }

    /// Permissive query: ambiguous segments fan out.
    pub fn select<'n>(&'n self, path: &str) -> Result<Resolved<'n, 'h>, TreeError> {
        self.resolve(path, ResolveMode::All)
    }

    /// Strict query returning exactly one node.
    pub fn find(&self, path: &str) -> Result<&TreeNode<'h>, TreeError> {
        let mut node = self;
        for segment in parse_path(path) {
            let (index, _) = node.strict_step(&segment, path)?;
            node = &node.children()?[index];
        }
        Ok(node)
    }

    /// Strict query returning exactly one node for editing.
    pub fn find_mut(&mut self, path: &str) -> Result<&mut TreeNode<'h>, TreeError> {
        let mut node = self;
        for segment in parse_path(path) {
            let (index, _) = node.strict_step(&segment, path)?;
            node = &mut node.children_vec_mut()?[index];
        }
        Ok(node)
    }

    fn resolve_from<'n>(
        &'n self,
        segments: &[Segment],
        prefix: &str,
        query: &str,
        mode: ResolveMode,
    ) -> Result<Resolved<'n, 'h>, TreeError> {
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(Resolved::One(Match {
                path: prefix.to_string(),
                node: self,
            }));
        };
        let children = self.children()?;
        match self.step(segment, query, mode)? {
            Step::Single(index, ordinal) => {
                let child = &children[index];
                child.resolve_from(rest, &join(prefix, child.name(), ordinal), query, mode)
            }
            Step::Every(matches) => matches
                .into_iter()
                .map(|(index, ordinal)| {
                    let child = &children[index];
                    child.resolve_from(rest, &join(prefix, child.name(), ordinal), query, mode)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Resolved::Many),
        }
    }

    fn strict_step(&self, segment: &Segment, query: &str) -> Result<(usize, usize), TreeError> {
        match self.step(segment, query, ResolveMode::Strict)? {
            Step::Single(index, ordinal) => Ok((index, ordinal)),
            Step::Every(matches) => Err(TreeError::AmbiguousPath {
                path: query.to_string(),
                node: self.name().to_string(),
                name: segment.name.clone(),
                count: matches.len(),
            }),
        }
    }

    fn step(&self, segment: &Segment, query: &str, mode: ResolveMode) -> Result<Step, TreeError> {
        let matches: Vec<usize> = self
            .children()?
            .iter()
            .enumerate()
            .filter(|(_, child)| names_match(child.name(), &segment.name))
            .map(|(index, _)| index)
            .collect();
        if matches.is_empty() {
            return Err(TreeError::PathNotFound {
                path: query.to_string(),
                node: self.name().to_string(),
                name: segment.name.clone(),
            });
        }
        if let Some(k) = segment.index {
            return match usize::try_from(k).ok().filter(|&k| k < matches.len()) {
                Some(k) => Ok(Step::Single(matches[k], k)),
                None => Err(TreeError::IndexOutOfRange {
                    path: query.to_string(),
                    name: segment.name.clone(),
                    index: k,
                    count: matches.len(),
                }),
            };
        }
        if matches.len() == 1 {
            return Ok(Step::Single(matches[0], 0));
        }
        match mode {
            ResolveMode::All => Ok(Step::Every(matches.into_iter().enumerate().map(|(o, i)| (i, o)).collect())),
            ResolveMode::Strict => Err(TreeError::AmbiguousPath {
                path: query.to_string(),
                node: self.name().to_string(),
                name: segment.name.clone(),
                count: matches.len(),
            }),
        }
    }
}
