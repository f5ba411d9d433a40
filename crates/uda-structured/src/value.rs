//! Leaf values stored in tree node attributes.
//!
//! A [`Value`] is a scalar number, a homogeneous numeric array, a string, or
//! a list of strings. Numeric values keep the element type ([`DType`]) they
//! were fetched with so that corrections add in the same width the data
//! source uses.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::error::TreeError;
use crate::native::{NativeData, NativeValue};

// ── Element types ─────────────────────────────────────────────────────────

/// Numeric element type of a scalar or array attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

/// Declared type name for string attributes.
pub const STRING_TYPE: &str = "string";

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Int16 => "int16",
            DType::UInt16 => "uint16",
            DType::Int32 => "int32",
            DType::UInt32 => "uint32",
            DType::Int64 => "int64",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Looks up a declared native type name. Returns `None` for `string`
    /// and for names without a conversion rule.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int8" => Some(DType::Int8),
            "uint8" => Some(DType::UInt8),
            "int16" => Some(DType::Int16),
            "uint16" => Some(DType::UInt16),
            "int32" => Some(DType::Int32),
            "uint32" => Some(DType::UInt32),
            "int64" => Some(DType::Int64),
            "uint64" => Some(DType::UInt64),
            "float32" => Some(DType::Float32),
            "float64" => Some(DType::Float64),
            _ => None,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            DType::Int8 | DType::UInt8 => 8,
            DType::Int16 | DType::UInt16 => 16,
            DType::Int32 | DType::UInt32 | DType::Float32 => 32,
            DType::Int64 | DType::UInt64 | DType::Float64 => 64,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64
        )
    }

    fn signed_with_bits(bits: u32) -> Self {
        match bits {
            0..=8 => DType::Int8,
            9..=16 => DType::Int16,
            17..=32 => DType::Int32,
            _ => DType::Int64,
        }
    }

    fn unsigned_with_bits(bits: u32) -> Self {
        match bits {
            0..=8 => DType::UInt8,
            9..=16 => DType::UInt16,
            17..=32 => DType::UInt32,
            _ => DType::UInt64,
        }
    }

    /// Result type of adding a value of `self` to a value of `other`.
    ///
    /// Follows the usual array-library promotion table: float32 survives
    /// only when the other side is float32 or an integer of at most 16 bits,
    /// mixed signedness widens to a signed type that holds both, and
    /// `uint64` mixed with a signed type becomes float64.
    pub fn promote(self, other: DType) -> DType {
        if self == other {
            return self;
        }
        match (self.is_float(), other.is_float()) {
            (true, true) => DType::Float64,
            (true, false) | (false, true) => {
                let (float, int) = if self.is_float() { (self, other) } else { (other, self) };
                if float == DType::Float32 && int.bits() <= 16 {
                    DType::Float32
                } else {
                    DType::Float64
                }
            }
            (false, false) => match (self.is_signed(), other.is_signed()) {
                (true, true) => DType::signed_with_bits(self.bits().max(other.bits())),
                (false, false) => DType::unsigned_with_bits(self.bits().max(other.bits())),
                _ => {
                    let (signed, unsigned) =
                        if self.is_signed() { (self, other) } else { (other, self) };
                    if unsigned.bits() >= 64 {
                        DType::Float64
                    } else {
                        DType::signed_with_bits(signed.bits().max(unsigned.bits() * 2))
                    }
                }
            },
        }
    }

    /// Casts `n` into this type's canonical representation, wrapping
    /// integers at the type width.
    pub fn coerce(self, n: Number) -> Number {
        match self {
            DType::Int8 => Number::Int(n.as_i64() as i8 as i64),
            DType::Int16 => Number::Int(n.as_i64() as i16 as i64),
            DType::Int32 => Number::Int(n.as_i64() as i32 as i64),
            DType::Int64 => Number::Int(n.as_i64()),
            DType::UInt8 => Number::UInt(n.as_u64() as u8 as u64),
            DType::UInt16 => Number::UInt(n.as_u64() as u16 as u64),
            DType::UInt32 => Number::UInt(n.as_u64() as u32 as u64),
            DType::UInt64 => Number::UInt(n.as_u64()),
            DType::Float32 => Number::Float(n.as_f64() as f32 as f64),
            DType::Float64 => Number::Float(n.as_f64()),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Numbers ───────────────────────────────────────────────────────────────

/// A single numeric element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            Number::Int(i) => i,
            Number::UInt(u) => u as i64,
            Number::Float(f) => f as i64,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match *self {
            Number::Int(i) => i as u64,
            Number::UInt(u) => u,
            Number::Float(f) => f as u64,
        }
    }

    fn add_as(self, other: Number, dtype: DType) -> Number {
        if dtype.is_float() {
            dtype.coerce(Number::Float(self.as_f64() + other.as_f64()))
        } else if dtype.is_signed() {
            dtype.coerce(Number::Int(self.as_i64().wrapping_add(other.as_i64())))
        } else {
            dtype.coerce(Number::UInt(self.as_u64().wrapping_add(other.as_u64())))
        }
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<u64> for Number {
    fn from(u: u64) -> Self {
        Number::UInt(u)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::UInt(u) => write!(f, "{u}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

// Non-finite floats travel as strings so that a serialized tree reads back
// bit-for-bit (JSON has no NaN or infinity literal).
impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(i) => serializer.serialize_i64(i),
            Number::UInt(u) => serializer.serialize_u64(u),
            Number::Float(f) if f.is_nan() => serializer.serialize_str("NaN"),
            Number::Float(f) if f == f64::INFINITY => serializer.serialize_str("Infinity"),
            Number::Float(f) if f == f64::NEG_INFINITY => serializer.serialize_str("-Infinity"),
            Number::Float(f) => serializer.serialize_f64(f),
        }
    }
}

struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
        Ok(Number::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::UInt(v),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Number, E> {
        Ok(Number::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Number, E> {
        match v {
            "NaN" => Ok(Number::Float(f64::NAN)),
            "Infinity" => Ok(Number::Float(f64::INFINITY)),
            "-Infinity" => Ok(Number::Float(f64::NEG_INFINITY)),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

// ── Values ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("operand is not numeric")]
    NotNumeric,
    #[error("shape {left:?} does not match shape {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Value {
    Scalar {
        dtype: DType,
        value: Number,
    },
    Array {
        dtype: DType,
        shape: Vec<usize>,
        data: Vec<Number>,
    },
    String {
        value: String,
    },
    StringList {
        values: Vec<String>,
    },
}

impl Value {
    pub fn scalar(dtype: DType, value: impl Into<Number>) -> Self {
        Value::Scalar {
            dtype,
            value: dtype.coerce(value.into()),
        }
    }

    /// Builds an array, checking that `data` fills `shape` exactly.
    pub fn array(dtype: DType, shape: Vec<usize>, data: Vec<Number>) -> Result<Self, TreeError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(TreeError::MalformedValue {
                attribute: String::new(),
                reason: format!("shape {shape:?} needs {expected} elements, got {}", data.len()),
            });
        }
        let data = data.into_iter().map(|n| dtype.coerce(n)).collect();
        Ok(Value::Array { dtype, shape, data })
    }

    /// One-dimensional float64 array.
    pub fn vector(data: impl IntoIterator<Item = f64>) -> Self {
        let data: Vec<Number> = data.into_iter().map(Number::Float).collect();
        Value::Array {
            dtype: DType::Float64,
            shape: vec![data.len()],
            data,
        }
    }

    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::StringList {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Scalar { .. } | Value::Array { .. })
    }

    pub fn dtype(&self) -> Option<DType> {
        match self {
            Value::Scalar { dtype, .. } | Value::Array { dtype, .. } => Some(*dtype),
            _ => None,
        }
    }

    /// Dimensions of a numeric value; empty for scalars and strings.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Value::Array { shape, .. } => shape.clone(),
            Value::StringList { values } => vec![values.len()],
            _ => Vec::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar { value, .. } => Some(value.as_f64()),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList { values } => Some(values),
            _ => None,
        }
    }

    /// Numeric elements in row-major order (one element for scalars).
    pub fn numbers(&self) -> Option<&[Number]> {
        match self {
            Value::Scalar { value, .. } => Some(std::slice::from_ref(value)),
            Value::Array { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Element-wise sum. A scalar operand is broadcast over an array
    /// operand; two arrays must have identical shapes.
    pub fn checked_add(&self, other: &Value) -> Result<Value, ArithmeticError> {
        let (Some(left), Some(right)) = (self.dtype(), other.dtype()) else {
            return Err(ArithmeticError::NotNumeric);
        };
        let dtype = left.promote(right);
        match (self, other) {
            (Value::Scalar { value: a, .. }, Value::Scalar { value: b, .. }) => Ok(Value::Scalar {
                dtype,
                value: a.add_as(*b, dtype),
            }),
            (Value::Scalar { value: a, .. }, Value::Array { shape, data, .. })
            | (Value::Array { shape, data, .. }, Value::Scalar { value: a, .. }) => Ok(Value::Array {
                dtype,
                shape: shape.clone(),
                data: data.iter().map(|b| b.add_as(*a, dtype)).collect(),
            }),
            (
                Value::Array { shape: sa, data: da, .. },
                Value::Array { shape: sb, data: db, .. },
            ) => {
                if sa != sb {
                    return Err(ArithmeticError::ShapeMismatch {
                        left: sa.clone(),
                        right: sb.clone(),
                    });
                }
                Ok(Value::Array {
                    dtype,
                    shape: sa.clone(),
                    data: da.iter().zip(db).map(|(a, b)| a.add_as(*b, dtype)).collect(),
                })
            }
            _ => Err(ArithmeticError::NotNumeric),
        }
    }

    /// Re-applies dtype coercion and shape checks to a value read from an
    /// untrusted source (e.g. a deserialized tree).
    pub(crate) fn normalized(self, attribute: &str) -> Result<Value, TreeError> {
        match self {
            Value::Scalar { dtype, value } => Ok(Value::scalar(dtype, value)),
            Value::Array { dtype, shape, data } => {
                Value::array(dtype, shape, data).map_err(|e| with_attribute(e, attribute))
            }
            other => Ok(other),
        }
    }

    /// Converts a native attribute. Returns `Ok(None)` when the source
    /// supplied no payload.
    pub(crate) fn from_native(attribute: &str, native: &NativeValue) -> Result<Option<Value>, TreeError> {
        let malformed = |reason: String| TreeError::MalformedValue {
            attribute: attribute.to_string(),
            reason,
        };
        if matches!(native.data, NativeData::None) {
            return Ok(None);
        }
        if native.type_name == STRING_TYPE {
            let NativeData::Strings(strings) = &native.data else {
                return Err(malformed("declared string but carries numbers".into()));
            };
            return match (native.shape.as_slice(), strings.as_slice()) {
                ([], [single]) => Ok(Some(Value::String {
                    value: single.clone(),
                })),
                ([n], values) if *n == values.len() => Ok(Some(Value::string_list(values.iter().cloned()))),
                (shape, values) => Err(malformed(format!(
                    "{} string(s) do not fit shape {shape:?}",
                    values.len()
                ))),
            };
        }
        let Some(dtype) = DType::from_name(&native.type_name) else {
            return Err(TreeError::UnknownValueType {
                attribute: attribute.to_string(),
                type_name: native.type_name.clone(),
            });
        };
        let NativeData::Numbers(numbers) = &native.data else {
            return Err(malformed(format!("declared {dtype} but carries strings")));
        };
        if native.shape.is_empty() {
            return match numbers.as_slice() {
                [single] => Ok(Some(Value::scalar(dtype, *single))),
                other => Err(malformed(format!("scalar carries {} elements", other.len()))),
            };
        }
        Value::array(dtype, native.shape.clone(), numbers.clone())
            .map(Some)
            .map_err(|e| with_attribute(e, attribute))
    }
}

fn with_attribute(err: TreeError, attribute: &str) -> TreeError {
    match err {
        TreeError::MalformedValue { reason, .. } => TreeError::MalformedValue {
            attribute: attribute.to_string(),
            reason,
        },
        other => other,
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::scalar(DType::Float64, f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::scalar(DType::Int64, i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String { value: s.to_string() }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String { value }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar { value, .. } => write!(f, "{value}"),
            Value::Array { dtype, shape, .. } => write!(f, "<{dtype} array {shape:?}>"),
            Value::String { value } => f.write_str(value),
            Value::StringList { values } => write!(f, "{values:?}"),
        }
    }
}
