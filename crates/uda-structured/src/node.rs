//! The tree node model.
//!
//! A [`TreeNode`] is either bound to a native handle, in which case its
//! attributes and children are imported on first access, or detached, in
//! which case both were supplied at construction. Each of the two facets
//! moves through [`Materialization`] exactly once.

use std::cell::{Cell, OnceCell};
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::TreeError;
use crate::native::HandleRef;
use crate::sanitize;
use crate::value::Value;

/// Name given to nodes whose source supplies none.
pub const ROOT_NAME: &str = "ROOT";

/// Ordered attribute set keyed by sanitized identifier.
pub type Attributes = IndexMap<String, Value>;

/// Progress of importing one facet (attributes or children) of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    Unbound,
    Materializing,
    Materialized,
}

#[derive(Debug, Clone)]
struct Lazy<T> {
    state: Cell<Materialization>,
    cell: OnceCell<T>,
}

impl<T> Lazy<T> {
    fn pending() -> Self {
        Self {
            state: Cell::new(Materialization::Unbound),
            cell: OnceCell::new(),
        }
    }

    fn ready(value: T) -> Self {
        Self {
            state: Cell::new(Materialization::Materialized),
            cell: OnceCell::from(value),
        }
    }

    fn state(&self) -> Materialization {
        self.state.get()
    }

    fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    fn get_or_try_init(
        &self,
        node: &str,
        init: impl FnOnce() -> Result<T, TreeError>,
    ) -> Result<&T, TreeError> {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        if self.state.get() == Materialization::Materializing {
            return Err(TreeError::ReentrantMaterialization {
                node: node.to_string(),
            });
        }
        self.state.set(Materialization::Materializing);
        match init() {
            Ok(value) => {
                self.state.set(Materialization::Materialized);
                Ok(self.cell.get_or_init(|| value))
            }
            Err(err) => {
                self.state.set(Materialization::Unbound);
                Err(err)
            }
        }
    }

    fn get_mut(&mut self) -> Option<&mut T> {
        self.cell.get_mut()
    }
}

#[derive(Clone)]
enum Binding<'h> {
    Native(HandleRef<'h>),
    Detached,
}

/// One node of a structured result.
#[derive(Clone)]
pub struct TreeNode<'h> {
    name: String,
    binding: Binding<'h>,
    attributes: Lazy<Attributes>,
    children: Lazy<Vec<TreeNode<'h>>>,
}

impl<'h> TreeNode<'h> {
    /// Wraps a native handle. Nothing is read from the handle except its
    /// name until attributes or children are first accessed.
    pub fn bound(handle: HandleRef<'h>) -> Self {
        let name = handle
            .name()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ROOT_NAME.to_string());
        Self {
            name,
            binding: Binding::Native(handle),
            attributes: Lazy::pending(),
            children: Lazy::pending(),
        }
    }

    /// An owned node with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Attributes::new(), Vec::new())
    }

    pub(crate) fn from_parts(name: String, attributes: Attributes, children: Vec<TreeNode<'h>>) -> Self {
        let name = if name.is_empty() {
            ROOT_NAME.to_string()
        } else {
            name
        };
        Self {
            name,
            binding: Binding::Detached,
            attributes: Lazy::ready(attributes),
            children: Lazy::ready(children),
        }
    }

    /// Builder form of [`add_attribute`](Self::add_attribute) for owned nodes.
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        let id = sanitize::sanitize_identifier(name);
        if let Some(attributes) = self.attributes.get_mut() {
            attributes.insert(id, value.into());
        }
        self
    }

    /// Builder form of [`add_child`](Self::add_child) for owned nodes.
    /// Unlike `add_child`, siblings may share a name.
    pub fn with_child(mut self, child: TreeNode<'h>) -> Self {
        if let Some(children) = self.children.get_mut() {
            children.push(child);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// True when this node holds no native handle.
    pub fn is_detached(&self) -> bool {
        matches!(self.binding, Binding::Detached)
    }

    pub fn attributes_state(&self) -> Materialization {
        self.attributes.state()
    }

    pub fn children_state(&self) -> Materialization {
        self.children.state()
    }

    pub fn attributes(&self) -> Result<&Attributes, TreeError> {
        self.attributes.get_or_try_init(&self.name, || match &self.binding {
            Binding::Native(handle) => import_attributes(handle, &self.name),
            Binding::Detached => Err(TreeError::DetachedUnmaterialized {
                node: self.name.clone(),
            }),
        })
    }

    pub fn children(&self) -> Result<&[TreeNode<'h>], TreeError> {
        self.children
            .get_or_try_init(&self.name, || match &self.binding {
                Binding::Native(handle) => {
                    let children: Vec<TreeNode<'h>> =
                        handle.children().into_iter().map(TreeNode::bound).collect();
                    debug!(node = %self.name, count = children.len(), "materialized children");
                    Ok(children)
                }
                Binding::Detached => Err(TreeError::DetachedUnmaterialized {
                    node: self.name.clone(),
                }),
            })
            .map(Vec::as_slice)
    }

    /// Mutable view of the children. The sequence itself is only reshaped
    /// through the editor operations.
    pub fn children_mut(&mut self) -> Result<&mut [TreeNode<'h>], TreeError> {
        self.children_vec_mut().map(Vec::as_mut_slice)
    }

    pub(crate) fn children_vec_mut(&mut self) -> Result<&mut Vec<TreeNode<'h>>, TreeError> {
        self.children()?;
        let node = self.name.clone();
        self.children
            .get_mut()
            .ok_or(TreeError::DetachedUnmaterialized { node })
    }

    pub(crate) fn attributes_mut(&mut self) -> Result<&mut Attributes, TreeError> {
        self.attributes()?;
        let node = self.name.clone();
        self.attributes
            .get_mut()
            .ok_or(TreeError::DetachedUnmaterialized { node })
    }

    pub fn attribute(&self, name: &str) -> Result<Option<&Value>, TreeError> {
        Ok(self.attributes()?.get(name))
    }

    pub fn has_attribute(&self, name: &str) -> Result<bool, TreeError> {
        Ok(self.attributes()?.contains_key(name))
    }

    /// First child whose name equals `name` exactly.
    pub fn child(&self, name: &str) -> Result<Option<&TreeNode<'h>>, TreeError> {
        Ok(self.children()?.iter().find(|c| c.name == name))
    }

    pub fn child_names(&self) -> Result<Vec<&str>, TreeError> {
        Ok(self.children()?.iter().map(|c| c.name.as_str()).collect())
    }
}

fn import_attributes(handle: &HandleRef<'_>, node: &str) -> Result<Attributes, TreeError> {
    let mut imported = Attributes::new();
    for (raw_name, native) in handle.attributes() {
        let Some(value) = Value::from_native(&raw_name, &native)? else {
            continue;
        };
        let id = sanitize::import_identifier(&raw_name, |candidate| imported.contains_key(candidate));
        imported.insert(id, value);
    }
    debug!(node, count = imported.len(), "materialized attributes");
    Ok(imported)
}

impl fmt::Debug for TreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TreeNode");
        s.field("name", &self.name);
        s.field("detached", &self.is_detached());
        match self.attributes.get() {
            Some(attributes) => s.field("attributes", attributes),
            None => s.field("attributes", &self.attributes.state()),
        };
        match self.children.get() {
            Some(children) => s.field("children", children),
            None => s.field("children", &self.children.state()),
        };
        s.finish()
    }
}

/// Structural equality: name, attributes and children, materializing both
/// sides as needed. A side that fails to materialize compares unequal.
impl<'b> PartialEq<TreeNode<'b>> for TreeNode<'_> {
    fn eq(&self, other: &TreeNode<'b>) -> bool {
        if self.name != other.name {
            return false;
        }
        match (self.attributes(), other.attributes()) {
            (Ok(a), Ok(b)) if a == b => {}
            _ => return false,
        }
        match (self.children(), other.children()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryNode;
    use crate::native::NativeValue;
    use std::rc::Rc;
    use tracing_test::traced_test;

    #[test]
    fn test_unnamed_source_is_root() {
        let node = TreeNode::bound(Rc::new(MemoryNode::unnamed()));
        assert_eq!(node.name(), ROOT_NAME);
    }

    #[test]
    fn test_materializes_once() {
        let native = Rc::new(
            MemoryNode::new("coil")
                .with_attribute("r", 1.2)
                .with_child(MemoryNode::new("geometry")),
        );
        let node = TreeNode::bound(native.clone());
        assert_eq!(node.attributes_state(), Materialization::Unbound);
        assert_eq!(native.attribute_reads(), 0);

        node.attributes().unwrap();
        node.attributes().unwrap();
        node.children().unwrap();
        node.children().unwrap();

        assert_eq!(native.attribute_reads(), 1);
        assert_eq!(native.child_reads(), 1);
        assert_eq!(node.attributes_state(), Materialization::Materialized);
        assert_eq!(node.children_state(), Materialization::Materialized);
    }

    #[test]
    #[traced_test]
    fn test_materialization_is_logged() {
        let node = TreeNode::bound(Rc::new(MemoryNode::new("coil").with_attribute("r", 1.0)));
        node.attributes().unwrap();
        assert!(logs_contain("materialized attributes"));
        assert!(!logs_contain("materialized children"));
    }

    #[test]
    fn test_import_disambiguates_repeated_names() {
        let native = Rc::new(
            MemoryNode::new("n")
                .with_attribute("a-b", 1.0)
                .with_attribute("a_b", 2.0)
                .with_attribute("name", "x"),
        );
        let node = TreeNode::bound(native);
        let keys: Vec<&str> = node.attributes().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a_b", "a_b_", "name_"]);
    }

    #[test]
    fn test_failed_import_resets_state() {
        let native = Rc::new(MemoryNode::new("n").with_attribute("z", NativeValue::scalar("complex128", 1.0)));
        let node = TreeNode::bound(native);
        assert!(matches!(node.attributes(), Err(TreeError::UnknownValueType { .. })));
        assert_eq!(node.attributes_state(), Materialization::Unbound);
    }

    #[test]
    fn test_owned_node_is_materialized() {
        let node = TreeNode::new("").with_attribute("value", 1.0);
        assert_eq!(node.name(), ROOT_NAME);
        assert!(node.is_detached());
        assert_eq!(node.attributes_state(), Materialization::Materialized);
        assert_eq!(node.attribute("value").unwrap(), Some(&Value::from(1.0)));
    }
}
