use std::fmt;
use std::str::FromStr;

use uda_structured::TreeNode;

use crate::error::GeometryError;

/// Shape of a geometry request, as tagged by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    /// One geometry element.
    Element,
    /// An array of like elements.
    Array,
    /// A group of arrays and elements.
    Group,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Element => "element",
            SignalType::Array => "array",
            SignalType::Group => "group",
        }
    }

    /// Reads `signal_type` from the tree's `data` child, or from the root
    /// when there is no such child.
    pub fn of_tree(tree: &TreeNode<'_>) -> Result<Self, GeometryError> {
        let holder = match tree.find("data") {
            Ok(data) => data,
            Err(uda_structured::TreeError::PathNotFound { .. }) => tree,
            Err(e) => return Err(e.into()),
        };
        match holder.attribute("signal_type")? {
            Some(value) => match value.as_str() {
                Some(tag) => tag.parse(),
                None => Err(GeometryError::UnknownSignalType(value.to_string())),
            },
            None => Err(GeometryError::MissingSignalType(tree.name().to_string())),
        }
    }
}

impl FromStr for SignalType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "element" => Ok(SignalType::Element),
            "array" => Ok(SignalType::Array),
            "group" => Ok(SignalType::Group),
            other => Err(GeometryError::UnknownSignalType(other.to_string())),
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
