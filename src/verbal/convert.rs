use crate::model::{EnumValue, Value, ValueType};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{value}` is not a valid {expected}")]
pub struct ConversionError {
    pub value: String,
    pub expected: String,
}

impl ConversionError {
    fn new(value: &str, expected: &ValueType) -> Self {
        Self {
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Turns raw token text into typed values.
///
/// Replaceable on the executor for hosts that need other parsing rules.
pub trait ValueConverter {
    /// Converts `raw` to `target`. An empty string means "flag present" for booleans.
    fn convert(&self, raw: &str, target: &ValueType) -> Result<Value, ConversionError>;

    /// The zero value used for parameters nobody bound and that declare no default.
    fn default_for(&self, target: &ValueType) -> Value;
}

/// Invariant-culture conversion of primitives, enums and single-element arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

/// Parses `true` / `false` in any case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_number<T: FromStr>(raw: &str, target: &ValueType) -> Result<T, ConversionError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConversionError::new(raw, target))
}

impl ValueConverter for DefaultConverter {
    fn convert(&self, raw: &str, target: &ValueType) -> Result<Value, ConversionError> {
        let value = match target {
            ValueType::Bool if raw.is_empty() => Value::Bool(true),
            ValueType::Bool => {
                Value::Bool(parse_bool(raw).ok_or_else(|| ConversionError::new(raw, target))?)
            }
            ValueType::I8 => Value::Int(parse_number::<i8>(raw, target)?.into()),
            ValueType::I16 => Value::Int(parse_number::<i16>(raw, target)?.into()),
            ValueType::I32 => Value::Int(parse_number::<i32>(raw, target)?.into()),
            ValueType::I64 => Value::Int(parse_number::<i64>(raw, target)?),
            ValueType::U8 => Value::UInt(parse_number::<u8>(raw, target)?.into()),
            ValueType::U16 => Value::UInt(parse_number::<u16>(raw, target)?.into()),
            ValueType::U32 => Value::UInt(parse_number::<u32>(raw, target)?.into()),
            ValueType::U64 => Value::UInt(parse_number::<u64>(raw, target)?),
            ValueType::F32 => Value::Float(parse_number::<f32>(raw, target)?.into()),
            ValueType::F64 => Value::Float(parse_number::<f64>(raw, target)?),
            ValueType::String => Value::String(raw.to_string()),
            ValueType::Enum(e) => {
                let text = raw.trim();
                let member = match text.parse::<i64>() {
                    Ok(ordinal) => e.by_ordinal(ordinal),
                    Err(_) => e.by_name(text),
                };
                Value::Enum(
                    member
                        .map(EnumValue::from)
                        .ok_or_else(|| ConversionError::new(raw, target))?,
                )
            }
            ValueType::Array(element) => Value::Array(vec![self.convert(raw, element)?]),
        };
        Ok(value)
    }

    fn default_for(&self, target: &ValueType) -> Value {
        match target {
            ValueType::Bool => Value::Bool(false),
            ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64 => Value::Int(0),
            ValueType::U8 | ValueType::U16 | ValueType::U32 | ValueType::U64 => Value::UInt(0),
            ValueType::F32 | ValueType::F64 => Value::Float(0.0),
            ValueType::String => Value::String(String::new()),
            ValueType::Enum(e) => Value::Enum(e.zero().map(EnumValue::from).unwrap_or(EnumValue {
                name: String::new(),
                ordinal: 0,
            })),
            ValueType::Array(_) => Value::Array(Vec::new()),
        }
    }
}
