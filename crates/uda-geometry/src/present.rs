//! Presentation edits applied after merging.

use tracing::debug;
use uda_structured::TreeNode;

use crate::error::GeometryError;
use crate::signal_type::SignalType;

/// Name of the wrapper level the geometry source introduces.
pub const DATA_LEVEL: &str = "data";

/// Last `/`-separated segment of a signal name, ignoring one trailing `/`.
pub fn group_name(signal: &str) -> Result<&str, GeometryError> {
    let trimmed = signal.strip_suffix('/').unwrap_or(signal);
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if name.is_empty() {
        return Err(GeometryError::InvalidSignalName(signal.to_string()));
    }
    Ok(name)
}

/// Reshapes a merged tree into what the caller asked for.
///
/// The `data` level is renamed after the signal's group name; for arrays
/// and groups the inner `data` level is collapsed. A single-source result
/// then collapses the group level too, so one signal comes back flat;
/// with several sources the group level stays and loses its
/// `signal_type`.
pub fn present(tree: &mut TreeNode<'_>, signal: &str, signal_type: SignalType, single_source: bool) -> Result<(), GeometryError> {
    let group = group_name(signal)?;
    let Some(index) = tree.children()?.iter().position(|c| c.name() == DATA_LEVEL) else {
        debug!(node = %tree.name(), "no data level to present");
        return Ok(());
    };
    tree.rename_child(DATA_LEVEL, group)?;

    if matches!(signal_type, SignalType::Group | SignalType::Array) {
        tree.children_mut()?[index].collapse_level(DATA_LEVEL)?;
    }
    if single_source {
        tree.collapse_level(group)?;
    } else {
        tree.children_mut()?[index].remove_attribute("signal_type")?;
    }
    debug!(node = %tree.name(), group, single_source, "presented");
    Ok(())
}
