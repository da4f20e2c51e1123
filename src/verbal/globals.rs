//! Options accepted at any point of a command line.
//!
//! Global options are declared once on the executor. They bind before any
//! command option is considered and are handed to every handler that declares
//! a global options slot.

use crate::arguments::{ArgumentError, FromValue};
use crate::convert::ValueConverter;
use crate::declare::ParamDecl;
use crate::decorator;
use crate::model::{OptionKey, Parameter, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    options: Vec<Parameter>,
    by_key: HashMap<OptionKey, usize>,
}

impl GlobalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a global option. Value declarations are treated as options.
    pub fn option(mut self, decl: ParamDecl) -> Self {
        let index = self.options.len();
        let parameter = decorator::option_parameter(&decl, index);
        for key in parameter.keys() {
            self.by_key.entry(key).or_insert(index);
        }
        self.options.push(parameter);
        self
    }

    pub fn find(&self, key: &OptionKey) -> Option<&Parameter> {
        self.by_key.get(key).map(|&i| &self.options[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.options.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Fresh values: declared defaults, else zero values.
    pub fn defaults(&self, converter: &dyn ValueConverter) -> GlobalValues {
        GlobalValues {
            entries: self
                .options
                .iter()
                .map(|p| GlobalEntry {
                    name: p.name.clone(),
                    value: p
                        .default
                        .clone()
                        .unwrap_or_else(|| converter.default_for(&p.value_type)),
                    explicit: false,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GlobalEntry {
    name: String,
    value: Value,
    explicit: bool,
}

/// Global option values for one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalValues {
    entries: Vec<GlobalEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AlreadyBound;

impl GlobalValues {
    /// Binds a converted value. Arrays accumulate; anything else binds once.
    pub(crate) fn bind(&mut self, parameter: &Parameter, value: Value) -> Result<(), AlreadyBound> {
        let Some(entry) = self.entries.get_mut(parameter.position) else {
            return Ok(());
        };
        if !entry.explicit {
            entry.value = value;
            entry.explicit = true;
            Ok(())
        } else if parameter.is_array() && entry.value.append(value) {
            Ok(())
        } else {
            Err(AlreadyBound)
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
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

    /// True when the option appeared on the command line.
    pub fn is_set(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name && e.explicit)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.value))
    }
}
