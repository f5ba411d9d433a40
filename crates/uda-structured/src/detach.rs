//! Detached copies and the serialized tree format.
//!
//! A detached tree owns every name, attribute and child and holds no
//! native handle, so it may outlive the session that produced it and cross
//! a serialization boundary. The JSON form is
//!
//! ```json
//! {"name": "coil", "attributes": {"r": {"type": "scalar", "dtype": "float64", "value": 1.2}}, "children": []}
//! ```

use serde::de::{self, Deserializer};
use serde::ser::{self, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::{Attributes, TreeNode};
use crate::sanitize;
use crate::value::Value;

/// A tree that carries no handle lifetime. Trees produced by
/// [`TreeNode::detach`] and [`TreeNode::from_json`] are fully detached.
pub type DetachedTreeNode = TreeNode<'static>;

impl<'h> TreeNode<'h> {
    /// Deep-copies this tree into an owned one, materializing every node of
    /// the source on the way.
    pub fn detach(&self) -> Result<DetachedTreeNode, TreeError> {
        let attributes = self.attributes()?.clone();
        let children = self
            .children()?
            .iter()
            .map(TreeNode::detach)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TreeNode::from_parts(self.name().to_string(), attributes, children))
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TreeNode<'static> {
    pub fn from_json(text: &str) -> Result<DetachedTreeNode, TreeError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Serialize for TreeNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attributes = self.attributes().map_err(ser::Error::custom)?;
        let children = self.children().map_err(ser::Error::custom)?;
        let mut s = serializer.serialize_struct("TreeNode", 3)?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("attributes", attributes)?;
        s.serialize_field("children", children)?;
        s.end()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeRecord {
    name: String,
    #[serde(default)]
    attributes: indexmap::IndexMap<String, Value>,
    #[serde(default)]
    children: Vec<TreeRecord>,
}

impl TryFrom<TreeRecord> for DetachedTreeNode {
    type Error = TreeError;

    fn try_from(record: TreeRecord) -> Result<Self, TreeError> {
        let mut attributes = Attributes::with_capacity(record.attributes.len());
        for (raw, value) in record.attributes {
            let value = value.normalized(&raw)?;
            let id = sanitize::import_identifier(&raw, |c| attributes.contains_key(c));
            attributes.insert(id, value);
        }
        let children = record
            .children
            .into_iter()
            .map(DetachedTreeNode::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TreeNode::from_parts(record.name, attributes, children))
    }
}

impl<'de> Deserialize<'de> for TreeNode<'static> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TreeRecord::deserialize(deserializer)?;
        DetachedTreeNode::try_from(record).map_err(de::Error::custom)
    }
}
