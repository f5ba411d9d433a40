//! The seam between trees and the data-access collaborator.
//!
//! A fetch returns a root [`NativeHandle`]; trees consult handles only while
//! materializing a node and never afterwards. Handle validity is tied to the
//! session that produced it, which the `'h` lifetime carries through
//! [`TreeNode`](crate::TreeNode).

use std::rc::Rc;

use crate::error::FetchError;
use crate::value::Number;

/// Shared reference to a native node valid for the session lifetime `'h`.
pub type HandleRef<'h> = Rc<dyn NativeHandle<'h> + 'h>;

/// Raw payload of a native attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeData {
    /// The source reported the attribute but supplied no value.
    None,
    Numbers(Vec<Number>),
    Strings(Vec<String>),
}

/// A native attribute value: declared type name, dimensions and payload.
///
/// An empty `shape` denotes a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeValue {
    pub type_name: String,
    pub shape: Vec<usize>,
    pub data: NativeData,
}

impl NativeValue {
    pub fn scalar(type_name: impl Into<String>, value: impl Into<Number>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: Vec::new(),
            data: NativeData::Numbers(vec![value.into()]),
        }
    }

    pub fn vector(type_name: impl Into<String>, values: Vec<Number>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: vec![values.len()],
            data: NativeData::Numbers(values),
        }
    }

    pub fn array(type_name: impl Into<String>, shape: Vec<usize>, values: Vec<Number>) -> Self {
        Self {
            type_name: type_name.into(),
            shape,
            data: NativeData::Numbers(values),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            type_name: crate::value::STRING_TYPE.to_string(),
            shape: Vec::new(),
            data: NativeData::Strings(vec![value.into()]),
        }
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self {
            type_name: crate::value::STRING_TYPE.to_string(),
            shape: vec![values.len()],
            data: NativeData::Strings(values),
        }
    }

    pub fn none(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: Vec::new(),
            data: NativeData::None,
        }
    }
}

impl From<f64> for NativeValue {
    fn from(f: f64) -> Self {
        NativeValue::scalar("float64", f)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::string(s)
    }
}

/// Opaque node of the data source's own result representation.
pub trait NativeHandle<'h> {
    /// Node name; `None` or empty when the source supplies none.
    fn name(&self) -> Option<String>;

    /// Attributes in source order.
    fn attributes(&self) -> Vec<(String, NativeValue)>;

    /// Children in source order.
    fn children(&self) -> Vec<HandleRef<'h>>;
}

/// The fetch collaborator. Blocking; retries, if any, are its own concern.
pub trait Fetcher {
    fn fetch<'s>(&'s self, query: &str, source: &str) -> Result<HandleRef<'s>, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch<'s>(&'s self, query: &str, source: &str) -> Result<HandleRef<'s>, FetchError> {
        (**self).fetch(query, source)
    }
}
