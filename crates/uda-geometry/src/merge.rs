//! Reconciliation of a configuration tree with its calibration tree.
//!
//! The calibration tree is walked alongside the configuration tree and
//! correlated to it by child name. At every level, attributes only the
//! calibration carries are copied across. Correction itself happens where
//! the calibration carries correction data:
//!
//! * for an `element` request, at the `data/data` payload of the two roots
//!   (or the roots themselves when there is no such payload);
//! * for `array` and `group` requests, at each calibration child flagged
//!   `calibration = True` that has a same-named configuration child, using
//!   the `data` payload of both.
//!
//! The correction kind comes from the nearest `type` attribute: on the
//! payload itself, else on the flagged child or one of its ancestors.
//!
//! Calibration children without a counterpart among the original
//! configuration children are inserted as new children, flagged or not.
//!
//! Merging is deterministic. Re-merging an already merged tree with the
//! same calibration leaves `ABSOLUTE` corrections unchanged but adds
//! relative corrections a second time.

use tracing::debug;
use uda_structured::{TreeError, TreeNode, Value};

use crate::calibrate::{calibrate, Correction};
use crate::error::GeometryError;
use crate::signal_type::SignalType;

/// Flag marking a calibration child as correction data.
pub const CALIBRATION_FLAG: &str = "calibration";

/// Merges `calibration` into `config` and returns the corrected tree.
/// Without a calibration tree, `config` is returned unchanged.
pub fn merge_calibration<'h>(
    mut config: TreeNode<'h>,
    calibration: Option<&TreeNode<'h>>,
    signal_type: SignalType,
) -> Result<TreeNode<'h>, GeometryError> {
    let Some(calibration) = calibration else {
        debug!(node = %config.name(), "no calibration, configuration kept as is");
        return Ok(config);
    };
    debug!(node = %config.name(), %signal_type, "merging calibration");
    reconcile(calibration, &mut config, signal_type, None)?;
    Ok(config)
}

/// `inherited` is the correction declared by the nearest calibration
/// ancestor, if any.
fn reconcile<'h>(
    calibration: &TreeNode<'h>,
    config: &mut TreeNode<'h>,
    signal_type: SignalType,
    inherited: Option<Correction>,
) -> Result<(), TreeError> {
    copy_missing_attributes(calibration, config)?;
    let inherited = Correction::declared_by(calibration)?.or(inherited);

    if signal_type == SignalType::Element {
        let source = payload(calibration, "data/data")?;
        let target = payload_mut(config, "data/data")?;
        return calibrate(source, target, inherited);
    }

    // Children inserted below are never counterparts.
    let existing = config.children()?.len();
    for cal_child in calibration.children()? {
        let counterpart = config.children()?[..existing].iter().position(|c| c.name() == cal_child.name());
        match (cal_child.attribute(CALIBRATION_FLAG)?, counterpart) {
            (Some(flag), Some(index)) if is_set(flag) => {
                debug!(node = %cal_child.name(), "correcting flagged child");
                let scoped = Correction::declared_by(cal_child)?.or(inherited);
                let target = payload_mut(&mut config.children_mut()?[index], "data")?;
                calibrate(payload(cal_child, "data")?, target, scoped)?;
            }
            (None, Some(index)) => {
                reconcile(cal_child, &mut config.children_mut()?[index], signal_type, inherited)?;
            }
            _ => {
                let inserted = config.add_child(cal_child.clone())?;
                debug!(node = %config.name(), child = %inserted, "calibration child inserted");
            }
        }
    }
    Ok(())
}

fn copy_missing_attributes<'h>(calibration: &TreeNode<'h>, config: &mut TreeNode<'h>) -> Result<(), TreeError> {
    for (id, value) in calibration.attributes()? {
        if !config.has_attribute(id)? {
            config.add_attribute(id, value.clone())?;
        }
    }
    Ok(())
}

fn is_set(flag: &Value) -> bool {
    match flag {
        Value::String { value } => value.eq_ignore_ascii_case("true") || value == "1",
        other => other.as_f64().is_some_and(|x| x != 0.0),
    }
}

/// The node at `path` below `node`, or `node` itself when the path does
/// not exist.
fn payload<'n, 'h>(node: &'n TreeNode<'h>, path: &str) -> Result<&'n TreeNode<'h>, TreeError> {
    match node.find(path) {
        Ok(found) => Ok(found),
        Err(TreeError::PathNotFound { .. }) => Ok(node),
        Err(e) => Err(e),
    }
}

fn payload_mut<'n, 'h>(node: &'n mut TreeNode<'h>, path: &str) -> Result<&'n mut TreeNode<'h>, TreeError> {
    let found = node.find(path).map(|_| ());
    match found {
        Ok(()) => node.find_mut(path),
        Err(TreeError::PathNotFound { .. }) => Ok(node),
        Err(e) => Err(e),
    }
}
