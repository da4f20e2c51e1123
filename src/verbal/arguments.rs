//! Bound handler arguments.
//!
//! The executor hands every handler an [`Arguments`] with exactly one slot per
//! declared parameter, ordered by position. Slots nobody bound hold the declared
//! default or the type's zero value.

use crate::globals::GlobalValues;
use crate::model::{EnumValue, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("No argument named `{0}`")]
    Missing(String),

    #[error("Argument `{name}` is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

/// Extracts a concrete Rust type from a bound [`Value`].
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Enum(e) => Some(e.name.clone()),
            _ => None,
        }
    }
}

impl FromValue for EnumValue {
    const EXPECTED: &'static str = "enum";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Enum(e) => Some(e.clone()),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x as f32),
            _ => None,
        }
    }
}

macro_rules! integer_from_value {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$t>::try_from(*i).ok(),
                        Value::UInt(u) => <$t>::try_from(*u).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Value { name: String, value: Value },
    Globals(GlobalValues),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    slots: Vec<Slot>,
}

impl Arguments {
    pub(crate) fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Number of handler parameters, including the global options slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The value at `position`, or `None` for the global options slot.
    pub fn at(&self, position: usize) -> Option<&Value> {
        match self.slots.get(position)? {
            Slot::Value { value, .. } => Some(value),
            Slot::Globals(_) => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Value { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self
            .value(name)
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))?;
        T::from_value(value).ok_or_else(|| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: T::EXPECTED,
        })
    }

    pub fn globals(&self) -> Option<&GlobalValues> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Globals(values) => Some(values),
            Slot::Value { .. } => None,
        })
    }

    /// Named values in position order, skipping the global options slot.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Value { name, value } => Some((name.as_str(), value)),
            Slot::Globals(_) => None,
        })
    }
}
