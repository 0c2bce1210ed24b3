//! Typed payload values.

use std::fmt;

/// Wire tag of a [`Value`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ValueTag {
    Absent = 0,
    Null = 1,
    Boolean = 2,
    Integer = 3,
    Float = 4,
    String = 5,
}

impl ValueTag {
    pub fn from_i32(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(ValueTag::Absent),
            1 => Some(ValueTag::Null),
            2 => Some(ValueTag::Boolean),
            3 => Some(ValueTag::Integer),
            4 => Some(ValueTag::Float),
            5 => Some(ValueTag::String),
            _ => None,
        }
    }
}

/// One payload slot.
///
/// `Absent` marks a slot that was never written and is distinct from an
/// explicitly stored `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Shared `Absent` handed out for slots past the end of a payload.
pub(crate) static ABSENT: Value = Value::Absent;

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Absent => ValueTag::Absent,
            Value::Null => ValueTag::Null,
            Value::Boolean(_) => ValueTag::Boolean,
            Value::Integer(_) => ValueTag::Integer,
            Value::Float(_) => ValueTag::Float,
            Value::String(_) => ValueTag::String,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("-"),
            Value::Null => f.write_str("nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}
