//! Mapping from geometry elements to the signals measured on them.

use tracing::debug;
use uda_structured::{TreeError, TreeNode, Value};

use crate::error::GeometryError;
use crate::present::DATA_LEVEL;
use crate::signal_type::SignalType;

pub const AVAILABLE_ATTRIBUTE: &str = "signal_alias_available";
pub const ALIAS_ATTRIBUTE: &str = "signal_alias";
pub const COMPONENTS_ATTRIBUTE: &str = "comp_names";
const SIGNAL_LEVEL_MARKER: &str = "dimensions";

#[derive(Debug, Clone)]
pub struct SignalGeometryData<'h> {
    data: Option<TreeNode<'h>>,
    signal_type: SignalType,
}

impl<'h> SignalGeometryData<'h> {
    /// Strips the source's wrapper levels and, unless `keep_all`, drops
    /// signals the source reports as unavailable.
    pub fn new(mut tree: TreeNode<'h>, keep_all: bool) -> Result<Self, GeometryError> {
        let signal_type = SignalType::of_tree(&tree)?;
        if signal_type == SignalType::Group {
            let data = tree.find_mut(DATA_LEVEL)?;
            data.collapse_level(DATA_LEVEL)?;
            data.remove_attribute("signal_type")?;
            tree.collapse_level(DATA_LEVEL)?;
        } else {
            tree.collapse_level(DATA_LEVEL)?;
            tree.remove_attribute("signal_type")?;
        }

        let available = match tree.attribute(AVAILABLE_ATTRIBUTE)? {
            Some(value) if !keep_all => Some(alias_list(value)),
            _ => None,
        };
        let data = match available {
            None => Some(tree),
            Some(available) if signal_type == SignalType::Group => {
                retain_available(&mut tree, &available)?;
                Some(tree)
            }
            Some(available) => {
                let alias = tree.attribute(ALIAS_ATTRIBUTE)?.and_then(Value::as_str);
                if alias.is_some_and(|a| available.iter().any(|s| s == a)) {
                    Some(tree)
                } else {
                    debug!(node = %tree.name(), ?alias, "signal unavailable, result dropped");
                    None
                }
            }
        };
        Ok(Self { data, signal_type })
    }

    pub fn data(&self) -> Option<&TreeNode<'h>> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<TreeNode<'h>> {
        self.data
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    /// Every entry of the `comp_names` attributes in the tree.
    pub fn geometry_names(&self) -> Result<Vec<String>, GeometryError> {
        let mut names = Vec::new();
        if let Some(data) = &self.data {
            collect_component_names(data, &mut names)?;
        }
        Ok(names)
    }
}

/// Availability is reported either as a list of aliases or as one
/// comma-separated string.
fn alias_list(value: &Value) -> Vec<String> {
    match value {
        Value::StringList { values } => values.iter().map(|s| s.trim().to_string()).collect(),
        Value::String { value } => value.split(',').map(|s| s.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Finds the level whose children are signals (they carry `dimensions`)
/// and keeps the ones whose `data/signal_alias` is available. A level with
/// no available signal is left as it is.
fn retain_available(node: &mut TreeNode<'_>, available: &[String]) -> Result<(), GeometryError> {
    let mut signal_level = false;
    for child in node.children()? {
        if child.has_attribute(SIGNAL_LEVEL_MARKER)? {
            signal_level = true;
        }
    }
    if !signal_level {
        for child in node.children_mut()? {
            retain_available(child, available)?;
        }
        return Ok(());
    }

    let mut keep = Vec::new();
    for (index, child) in node.children()?.iter().enumerate() {
        let data = match child.find(DATA_LEVEL) {
            Ok(data) => data,
            Err(TreeError::PathNotFound { .. }) => continue,
            Err(e) => return Err(e.into()),
        };
        if let Some(alias) = data.attribute(ALIAS_ATTRIBUTE)?.and_then(Value::as_str) {
            if available.iter().any(|s| s == alias) {
                keep.push(index);
            }
        }
    }
    if !keep.is_empty() {
        debug!(node = %node.name(), kept = keep.len(), "retaining available signals");
        node.retain_children(&keep)?;
    }
    Ok(())
}

fn collect_component_names(node: &TreeNode<'_>, out: &mut Vec<String>) -> Result<(), GeometryError> {
    let mut found = Vec::new();
    for (id, value) in node.attributes()? {
        if id != COMPONENTS_ATTRIBUTE {
            continue;
        }
        if let Some(text) = value.as_str() {
            found.extend(text.split(',').map(|name| name.replace(' ', "")));
        }
    }
    if !found.is_empty() {
        out.extend(found);
        return Ok(());
    }
    for child in node.children()? {
        collect_component_names(child, out)?;
    }
    Ok(())
}
