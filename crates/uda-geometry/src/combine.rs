//! The geometry pipeline: merge, manipulate, present, combine.

use tracing::{debug, warn};
use uda_structured::{DetachedTreeNode, TreeNode, Value};

use crate::error::GeometryError;
use crate::manipulate::Manipulator;
use crate::merge::merge_calibration;
use crate::present::{present, DATA_LEVEL};
use crate::signal_type::SignalType;

/// Attribute marking a geometry element.
pub const ELEMENT_MARKER: &str = "name_";

/// One fetched configuration tree with its optional calibration.
pub struct GeometrySource<'h> {
    pub signal_name: String,
    pub config: TreeNode<'h>,
    pub calibration: Option<TreeNode<'h>>,
    pub manipulator: Option<Box<dyn Manipulator + 'h>>,
}

impl<'h> GeometrySource<'h> {
    pub fn new(signal_name: impl Into<String>, config: TreeNode<'h>, calibration: Option<TreeNode<'h>>) -> Self {
        Self {
            signal_name: signal_name.into(),
            config,
            calibration,
            manipulator: None,
        }
    }

    pub fn with_manipulator(mut self, manipulator: impl Manipulator + 'h) -> Self {
        self.manipulator = Some(Box::new(manipulator));
        self
    }
}

/// Merged, presented and combined geometry.
#[derive(Debug, Clone)]
pub struct GeometryData<'h> {
    data: Option<TreeNode<'h>>,
}

impl<'h> GeometryData<'h> {
    /// Runs every source through the pipeline in order and combines the
    /// results. Trees after the first have their children appended to the
    /// first.
    pub fn build(sources: Vec<GeometrySource<'h>>) -> Result<Self, GeometryError> {
        let single_source = sources.len() == 1;
        let mut data: Option<TreeNode<'h>> = None;
        for source in sources {
            let signal = source.signal_name.strip_suffix('/').unwrap_or(&source.signal_name);
            debug!(signal, "applying geometry calibration");
            let signal_type = SignalType::of_tree(&source.config)?;
            let mut tree = merge_calibration(source.config, source.calibration.as_ref(), signal_type)?;

            if let Some(manipulator) = &source.manipulator {
                debug!(signal, "applying manipulations");
                manipulator.manipulate(&mut tree)?;
            }
            present(&mut tree, signal, signal_type, single_source)?;

            data = Some(match data.take() {
                None => tree,
                Some(mut accumulator) => {
                    append_subtree(&mut accumulator, &tree)?;
                    accumulator
                }
            });
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> Option<&TreeNode<'h>> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<TreeNode<'h>> {
        self.data
    }

    pub fn detach(&self) -> Result<Option<DetachedTreeNode>, GeometryError> {
        Ok(self.data.as_ref().map(TreeNode::detach).transpose()?)
    }

    /// Paths of every geometry element, built from node names below the
    /// root with `data` levels left out.
    pub fn geometry_names(&self) -> Result<Vec<String>, GeometryError> {
        let mut names = Vec::new();
        if let Some(data) = &self.data {
            collect_element_paths(data, "", &mut names)?;
        }
        Ok(names)
    }
}

fn collect_element_paths(node: &TreeNode<'_>, level: &str, out: &mut Vec<String>) -> Result<(), GeometryError> {
    if node.has_attribute(ELEMENT_MARKER)? {
        out.push(level.to_string());
        return Ok(());
    }
    for child in node.children()? {
        let here = if child.name() == DATA_LEVEL {
            level.to_string()
        } else {
            format!("{level}/{}", child.name())
        };
        collect_element_paths(child, &here, out)?;
    }
    Ok(())
}

/// Appends `tree`'s children to `accumulator` and advances its `count` and
/// `shape` by their number. `count` is created when absent.
pub fn append_subtree<'h>(accumulator: &mut TreeNode<'h>, tree: &TreeNode<'h>) -> Result<(), GeometryError> {
    let children = tree.children()?;
    for child in children {
        accumulator.add_child(child.clone())?;
    }
    let added = Value::from(children.len() as i64);
    for (attribute, create) in [("count", true), ("shape", false)] {
        let next = match accumulator.attribute(attribute)? {
            Some(current) => match current.checked_add(&added) {
                Ok(next) => next,
                Err(e) => {
                    warn!(node = %accumulator.name(), attribute, error = %e, "cannot advance size attribute");
                    continue;
                }
            },
            None if create => added.clone(),
            None => continue,
        };
        accumulator.add_attribute(attribute, next)?;
    }
    debug!(node = %accumulator.name(), added = children.len(), "combined subtree");
    Ok(())
}
