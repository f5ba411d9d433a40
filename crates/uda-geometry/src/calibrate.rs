//! Numeric correction of a configuration subtree by a calibration subtree.

use tracing::{debug, warn};
use uda_structured::{ArithmeticError, TreeError, TreeNode, Value};

/// Calibration attribute classifying the correction.
pub const TYPE_ATTRIBUTE: &str = "type";
/// Calibration bookkeeping attribute, never copied or corrected.
pub const STATUS_ATTRIBUTE: &str = "status";
/// `type` value selecting replacement.
pub const ABSOLUTE: &str = "ABSOLUTE";

/// How a calibration value is applied to the configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// The calibration value replaces the configuration value.
    Absolute,
    /// The calibration value is added element-wise.
    Relative,
}

impl Correction {
    /// The correction declared by `node`'s `type` attribute: `ABSOLUTE`
    /// selects [`Correction::Absolute`], any other value
    /// [`Correction::Relative`].
    pub fn declared_by(node: &TreeNode<'_>) -> Result<Option<Self>, TreeError> {
        Ok(node.attribute(TYPE_ATTRIBUTE)?.map(|ty| {
            if ty.as_str() == Some(ABSOLUTE) {
                Correction::Absolute
            } else {
                Correction::Relative
            }
        }))
    }

    pub fn apply(self, config: &Value, calibration: &Value) -> Result<Value, ArithmeticError> {
        match self {
            Correction::Absolute => Ok(calibration.clone()),
            Correction::Relative => config.checked_add(calibration),
        }
    }
}

/// Corrects `config` with `calibration`, using the correction declared on
/// `calibration`, then `inherited`, then relative.
pub fn calibrate<'h>(
    calibration: &TreeNode<'h>,
    config: &mut TreeNode<'h>,
    inherited: Option<Correction>,
) -> Result<(), TreeError> {
    let correction = match Correction::declared_by(calibration)?.or(inherited) {
        Some(correction) => correction,
        None => {
            warn!(node = %calibration.name(), "calibration has no type, applying relative correction");
            Correction::Relative
        }
    };
    debug!(node = %config.name(), ?correction, "calibrating");
    correct(calibration, config, correction)
}

/// Applies `correction` to every numeric attribute present on both sides,
/// copies attributes and children the configuration lacks, and recurses
/// into same-named children. A child declaring its own `type` switches the
/// correction for its subtree.
fn correct<'h>(calibration: &TreeNode<'h>, config: &mut TreeNode<'h>, correction: Correction) -> Result<(), TreeError> {
    for (id, cal_value) in calibration.attributes()? {
        if id == TYPE_ATTRIBUTE || id == STATUS_ATTRIBUTE {
            continue;
        }
        let Some(current) = config.attribute(id)? else {
            config.add_attribute(id, cal_value.clone())?;
            continue;
        };
        if !cal_value.is_numeric() {
            continue;
        }
        if !current.is_numeric() {
            warn!(node = %config.name(), attribute = %id, "non-numeric configuration value left uncorrected");
            continue;
        }
        match correction.apply(current, cal_value) {
            Ok(corrected) => {
                config.add_attribute(id, corrected)?;
            }
            Err(e) => {
                warn!(node = %config.name(), attribute = %id, error = %e, "correction skipped");
            }
        }
    }

    let existing = config.children()?.len();
    for cal_child in calibration.children()? {
        let scoped = Correction::declared_by(cal_child)?.unwrap_or(correction);
        match config.children()?[..existing].iter().position(|c| c.name() == cal_child.name()) {
            Some(index) => correct(cal_child, &mut config.children_mut()?[index], scoped)?,
            None => {
                config.add_child(cal_child.clone())?;
            }
        }
    }
    Ok(())
}
