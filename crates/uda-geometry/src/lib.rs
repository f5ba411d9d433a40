//! Geometry data over UDA structured trees.
//!
//! A geometry request fetches a configuration tree and, when one exists, a
//! calibration tree for each signal. [`merge_calibration`] corrects the
//! configuration with the calibration, [`present`] strips the wrapper
//! levels the source adds, and [`GeometryData`] combines several signals
//! into one tree.
//!
//! # Example
//!
//! ```
//! use uda_geometry::{merge_calibration, SignalType};
//! use uda_structured::{TreeNode, Value};
//!
//! let config = TreeNode::new("ROOT")
//!     .with_attribute("signal_type", "element")
//!     .with_attribute("value", 10.0);
//! let calibration = TreeNode::new("ROOT")
//!     .with_attribute("type", "ABSOLUTE")
//!     .with_attribute("value", 12.5);
//!
//! let merged = merge_calibration(config, Some(&calibration), SignalType::Element)?;
//! assert_eq!(merged.attribute("value")?, Some(&Value::from(12.5)));
//! # Ok::<(), uda_geometry::GeometryError>(())
//! ```

mod error;
pub use error::GeometryError;

mod config;
pub use config::{GeometryConfig, SIGNAL_PLACEHOLDER};

mod signal_type;
pub use signal_type::SignalType;

mod calibrate;
pub use calibrate::{calibrate, Correction, ABSOLUTE, STATUS_ATTRIBUTE, TYPE_ATTRIBUTE};

mod merge;
pub use merge::{merge_calibration, CALIBRATION_FLAG};

mod manipulate;
pub use manipulate::Manipulator;

mod present;
pub use present::{group_name, present, DATA_LEVEL};

mod combine;
pub use combine::{append_subtree, GeometryData, GeometrySource, ELEMENT_MARKER};

mod signal_geometry;
pub use signal_geometry::{SignalGeometryData, ALIAS_ATTRIBUTE, AVAILABLE_ATTRIBUTE, COMPONENTS_ATTRIBUTE};

mod client;
pub use client::GeometryClient;
