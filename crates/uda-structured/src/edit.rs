//! Structural edits on owned trees.
//!
//! All operations mutate the receiver in place and materialize it first if
//! it is still bound. Not-found conditions are no-ops, reported through the
//! return value.

use crate::error::TreeError;
use crate::node::TreeNode;
use crate::sanitize;
use crate::value::Value;

/// Which child [`TreeNode::remove_child`] removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSelector {
    /// First child whose name equals this one exactly.
    Name(String),
    /// Child at this position.
    Index(usize),
}

impl From<&str> for ChildSelector {
    fn from(name: &str) -> Self {
        ChildSelector::Name(name.to_string())
    }
}

impl From<usize> for ChildSelector {
    fn from(index: usize) -> Self {
        ChildSelector::Index(index)
    }
}

impl<'h> TreeNode<'h> {
    /// Sets an attribute under its sanitized identifier and returns that
    /// identifier. Overwriting an existing attribute keeps its position.
    pub fn add_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<String, TreeError> {
        let id = sanitize::sanitize_identifier(name);
        self.attributes_mut()?.insert(id.clone(), value.into());
        Ok(id)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<Option<Value>, TreeError> {
        let id = sanitize::sanitize_identifier(name);
        Ok(self.attributes_mut()?.shift_remove(&id))
    }

    /// Appends `child`, suffixing its name with `_` until no sibling has the
    /// same name. Returns the name it was inserted under.
    pub fn add_child(&mut self, mut child: TreeNode<'h>) -> Result<String, TreeError> {
        let children = self.children_vec_mut()?;
        let mut name = child.name().to_string();
        while children.iter().any(|c| c.name() == name) {
            name.push('_');
        }
        child.set_name(name.clone());
        children.push(child);
        Ok(name)
    }

    /// Renames the first child named `old`. Returns whether one was found.
    pub fn rename_child(&mut self, old: &str, new: &str) -> Result<bool, TreeError> {
        match self.children_vec_mut()?.iter_mut().find(|c| c.name() == old) {
            Some(child) => {
                child.set_name(new.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces the children with the ones at `indices`, in that order.
    pub fn retain_children(&mut self, indices: &[usize]) -> Result<(), TreeError> {
        let node = self.name().to_string();
        let children = self.children_vec_mut()?;
        let count = children.len();
        let mut kept = Vec::with_capacity(indices.len());
        for &index in indices {
            let child = children.get(index).ok_or_else(|| TreeError::IndexOutOfRange {
                path: node.clone(),
                name: node.clone(),
                index: index as i64,
                count,
            })?;
            kept.push(child.clone());
        }
        *children = kept;
        Ok(())
    }

    /// Removes and returns the selected child, or `None` if nothing matched.
    pub fn remove_child(&mut self, selector: impl Into<ChildSelector>) -> Result<Option<TreeNode<'h>>, TreeError> {
        let children = self.children_vec_mut()?;
        let index = match selector.into() {
            ChildSelector::Name(name) => children.iter().position(|c| c.name() == name),
            ChildSelector::Index(index) => Some(index).filter(|&i| i < children.len()),
        };
        Ok(index.map(|i| children.remove(i)))
    }

    /// Splices the first child named `name` into this node: its attributes
    /// and children are re-added here, then it is removed. Re-added
    /// children follow the [`add_child`](Self::add_child) renaming rule,
    /// with the collapsed child still counted as a sibling.
    ///
    /// Returns whether such a child existed.
    pub fn collapse_level(&mut self, name: &str) -> Result<bool, TreeError> {
        let Some(index) = self.children()?.iter().position(|c| c.name() == name) else {
            return Ok(false);
        };
        let wrapper = &self.children()?[index];
        let attributes = wrapper.attributes()?.clone();
        let grandchildren = wrapper.children()?.to_vec();

        for (id, value) in attributes {
            self.add_attribute(&id, value)?;
        }
        for child in grandchildren {
            self.add_child(child)?;
        }
        self.children_vec_mut()?.remove(index);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> TreeNode<'static> {
        (0..5).fold(TreeNode::new("coils"), |node, i| {
            node.with_child(TreeNode::new(format!("c{i}")))
        })
    }

    #[test]
    fn test_add_attribute_keeps_position_on_overwrite() {
        let mut node = TreeNode::new("n");
        node.add_attribute("a", 1.0).unwrap();
        node.add_attribute("b", 2.0).unwrap();
        node.add_attribute("a", 3.0).unwrap();
        let attrs: Vec<(&str, f64)> = node
            .attributes()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_f64().unwrap()))
            .collect();
        assert_eq!(attrs, vec![("a", 3.0), ("b", 2.0)]);
    }

    #[test]
    fn test_add_attribute_sanitizes() {
        let mut node = TreeNode::new("n");
        assert_eq!(node.add_attribute("r-pos", 1.0).unwrap(), "r_pos");
        assert_eq!(node.add_attribute("children", 1.0).unwrap(), "children_");
    }

    #[test]
    fn test_remove_attribute() {
        let mut node = TreeNode::new("n").with_attribute("a", 1.0);
        assert_eq!(node.remove_attribute("missing").unwrap(), None);
        assert_eq!(node.remove_attribute("a").unwrap(), Some(Value::from(1.0)));
        assert!(node.attributes().unwrap().is_empty());
    }

    #[test]
    fn test_add_child_renames_inserted_copy() {
        let mut node = TreeNode::new("n").with_child(TreeNode::new("x"));
        let original = TreeNode::new("x");
        assert_eq!(node.add_child(original.clone()).unwrap(), "x_");
        assert_eq!(node.add_child(original.clone()).unwrap(), "x__");
        assert_eq!(original.name(), "x");
        assert_eq!(node.child_names().unwrap(), vec!["x", "x_", "x__"]);
    }

    #[test]
    fn test_rename_child() {
        let mut node = five();
        assert!(node.rename_child("c1", "pickup").unwrap());
        assert!(!node.rename_child("nope", "x").unwrap());
        assert_eq!(node.child_names().unwrap()[1], "pickup");
    }

    #[test]
    fn test_retain_children_order() {
        let mut node = five();
        node.retain_children(&[3, 1]).unwrap();
        assert_eq!(node.child_names().unwrap(), vec!["c3", "c1"]);
    }

    #[test]
    fn test_retain_children_out_of_range() {
        let mut node = five();
        assert!(matches!(
            node.retain_children(&[0, 7]),
            Err(TreeError::IndexOutOfRange { index: 7, count: 5, .. })
        ));
        assert_eq!(node.children().unwrap().len(), 5);
    }

    #[test]
    fn test_remove_child_by_selector() {
        let mut node = five();
        let removed = node.remove_child("c2").unwrap().unwrap();
        assert_eq!(removed.name(), "c2");
        let removed = node.remove_child(0usize).unwrap().unwrap();
        assert_eq!(removed.name(), "c0");
        assert!(node.remove_child(10usize).unwrap().is_none());
        assert!(node.remove_child("c2").unwrap().is_none());
        assert_eq!(node.child_names().unwrap(), vec!["c1", "c3", "c4"]);
    }

    #[test]
    fn test_collapse_level() {
        let wrapper = TreeNode::new("data")
            .with_attribute("signal_type", "element")
            .with_child(TreeNode::new("a"))
            .with_child(TreeNode::new("data"));
        let mut node = TreeNode::new("n").with_child(TreeNode::new("a")).with_child(wrapper);

        assert!(node.collapse_level("data").unwrap());
        assert_eq!(node.child_names().unwrap(), vec!["a", "a_", "data_"]);
        assert_eq!(
            node.attribute("signal_type").unwrap(),
            Some(&Value::from("element"))
        );
        assert!(!node.collapse_level("data").unwrap());
    }
}
