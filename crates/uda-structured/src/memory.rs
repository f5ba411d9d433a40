//! In-memory native backend.
//!
//! [`MemoryNode`] implements [`NativeHandle`] over owned data and counts how
//! often it is read, which makes the one-shot materialization of
//! [`TreeNode`](crate::TreeNode) observable. [`MemoryFetcher`] serves
//! stored roots by `(query, source)`.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::FetchError;
use crate::native::{Fetcher, HandleRef, NativeHandle, NativeValue};

#[derive(Debug, Default)]
pub struct MemoryNode {
    name: Option<String>,
    attributes: Vec<(String, NativeValue)>,
    children: Vec<Rc<MemoryNode>>,
    attribute_reads: Cell<usize>,
    child_reads: Cell<usize>,
}

impl MemoryNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A node for which the source reports no name.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: MemoryNode) -> Self {
        self.children.push(Rc::new(child));
        self
    }

    /// Adds an already shared child, letting callers keep a reference to
    /// observe its read counters.
    pub fn with_shared_child(mut self, child: Rc<MemoryNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute_reads(&self) -> usize {
        self.attribute_reads.get()
    }

    pub fn child_reads(&self) -> usize {
        self.child_reads.get()
    }
}

impl<'h> NativeHandle<'h> for MemoryNode {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn attributes(&self) -> Vec<(String, NativeValue)> {
        self.attribute_reads.set(self.attribute_reads.get() + 1);
        self.attributes.clone()
    }

    fn children(&self) -> Vec<HandleRef<'h>> {
        self.child_reads.set(self.child_reads.get() + 1);
        self.children
            .iter()
            .map(|child| Rc::clone(child) as HandleRef<'h>)
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryFetcher {
    roots: HashMap<(String, String), Rc<MemoryNode>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: impl Into<String>, source: impl Into<String>, root: MemoryNode) {
        self.roots.insert((query.into(), source.into()), Rc::new(root));
    }

    pub fn with_root(mut self, query: impl Into<String>, source: impl Into<String>, root: MemoryNode) -> Self {
        self.insert(query, source, root);
        self
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch<'s>(&'s self, query: &str, source: &str) -> Result<HandleRef<'s>, FetchError> {
        self.roots
            .get(&(query.to_string(), source.to_string()))
            .map(|root| Rc::clone(root) as HandleRef<'s>)
            .ok_or_else(|| FetchError::new(query, source, "no such signal"))
    }
}
