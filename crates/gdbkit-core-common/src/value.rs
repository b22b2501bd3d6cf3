//! Cell values and rows.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a row, used to correlate values across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single cell value.
///
/// Values are totally ordered: null sorts first, then numbers (integers and
/// doubles compare exactly by numeric value), then text, then geometries.
/// Integer `1` and double `1.0` are equal under this order, as are `-0.0` and
/// `0.0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Geometry(Box<geojson::Geometry>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the geometry held by this value, if any.
    #[must_use]
    pub fn as_geometry(&self) -> Option<&geojson::Geometry> {
        match self {
            Value::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Short name of the value's kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Geometry(_) => "geometry",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Double(_) => 1,
            Value::Text(_) => 2,
            Value::Geometry(_) => 3,
        }
    }

    fn geometry_json(geometry: &geojson::Geometry) -> String {
        serde_json::to_string(geometry).unwrap_or_default()
    }
}

/// Orders doubles numerically, with `-0.0 == 0.0`. NaNs fall back to
/// `total_cmp`, which places them below or above every number by sign.
fn cmp_doubles(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Orders an integer against a double exactly, without rounding the integer
/// to the nearest double.
fn cmp_integer_double(i: i64, d: f64) -> Ordering {
    // 2^63, the first double above `i64::MAX`.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    if d.is_nan() {
        return if d.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if d >= I64_BOUND {
        return Ordering::Less;
    }
    if d < -I64_BOUND {
        return Ordering::Greater;
    }

    let whole = d.trunc();
    #[allow(clippy::cast_possible_truncation)]
    let whole_int = whole as i64;
    i.cmp(&whole_int).then_with(|| cmp_doubles(0.0, d - whole))
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Double(b)) => cmp_integer_double(*a, *b),
            (Value::Double(a), Value::Integer(b)) => cmp_integer_double(*b, *a).reverse(),
            (Value::Double(a), Value::Double(b)) => cmp_doubles(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Geometry(a), Value::Geometry(b)) => {
                Self::geometry_json(a).cmp(&Self::geometry_json(b))
            },
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<Null>"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Geometry(g) => f.write_str(&Self::geometry_json(g)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<geojson::Geometry> for Value {
    fn from(g: geojson::Geometry) -> Self {
        Value::Geometry(Box::new(g))
    }
}

/// A row read from a dataset: its identifier and the requested column values,
/// in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
}
