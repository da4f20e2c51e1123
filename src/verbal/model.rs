//! # Command Model
//!
//! The descriptor tree the executor walks: [`Verb`]s group child verbs and
//! [`Command`]s, and each command describes its handler's [`Parameter`]s.
//!
//! The tree is produced by the decorator from immutable declarations (see
//! `declare`) and is only ever read afterwards. Parents own their children; a
//! node knows where it sits through its `path` instead of a back-pointer.

use crate::declare::Handler;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The declared type of a handler argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Enum(EnumType),
    Array(Box<ValueType>),
}

impl ValueType {
    pub fn array(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    /// The element type for arrays, the type itself otherwise.
    pub fn element(&self) -> &ValueType {
        match self {
            ValueType::Array(element) => element,
            other => other,
        }
    }

    /// Flags are bound by presence alone and never consume a following token.
    pub fn is_flag(&self) -> bool {
        matches!(self.element(), ValueType::Bool)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::I8 => write!(f, "i8"),
            ValueType::I16 => write!(f, "i16"),
            ValueType::I32 => write!(f, "i32"),
            ValueType::I64 => write!(f, "i64"),
            ValueType::U8 => write!(f, "u8"),
            ValueType::U16 => write!(f, "u16"),
            ValueType::U32 => write!(f, "u32"),
            ValueType::U64 => write!(f, "u64"),
            ValueType::F32 => write!(f, "f32"),
            ValueType::F64 => write!(f, "f64"),
            ValueType::String => write!(f, "string"),
            ValueType::Enum(e) => write!(f, "{}", e.name),
            ValueType::Array(element) => write!(f, "[{}]", element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub ordinal: i64,
}

/// An enumeration accepted by name (case-insensitive) or by ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Members get ordinals in declaration order, starting at zero.
    pub fn new<I, S>(name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            members: members
                .into_iter()
                .enumerate()
                .map(|(i, member)| EnumMember {
                    name: member.into(),
                    ordinal: i as i64,
                })
                .collect(),
        }
    }

    pub fn with_ordinals<I, S>(name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            members: members
                .into_iter()
                .map(|(member, ordinal)| EnumMember {
                    name: member.into(),
                    ordinal,
                })
                .collect(),
        }
    }

    pub fn by_ordinal(&self, ordinal: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.ordinal == ordinal)
    }

    pub fn by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| same_name(&m.name, name))
    }

    /// The zero-valued member, falling back to the first declared one.
    pub fn zero(&self) -> Option<&EnumMember> {
        self.by_ordinal(0).or_else(|| self.members.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub ordinal: i64,
}

impl From<&EnumMember> for EnumValue {
    fn from(member: &EnumMember) -> Self {
        Self {
            name: member.name.clone(),
            ordinal: member.ordinal,
        }
    }
}

/// A converted argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Enum(EnumValue),
    Array(Vec<Value>),
}

impl Value {
    /// Appends the elements of `other` when both are arrays.
    ///
    /// Returns false, leaving `self` untouched, when either side is not an array.
    pub fn append(&mut self, other: Value) -> bool {
        match (self, other) {
            (Value::Array(items), Value::Array(more)) => {
                items.extend(more);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}", e.name),
            Value::Array(items) => {
                let joined: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// The case folding every name lookup uses: verbs, commands, long options,
/// enum members and the help/version flags.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

pub fn same_name(a: &str, b: &str) -> bool {
    fold_name(a) == fold_name(b)
}

/// How an option is looked up. Short forms are case-sensitive, long forms are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Short(char),
    Long(String),
}

impl OptionKey {
    pub fn long(name: &str) -> Self {
        OptionKey::Long(fold_name(name))
    }

    /// Builds the lookup key for a token key; short-form keys are a single char.
    pub fn from_token(key: &str, is_short_form: bool) -> Option<Self> {
        if is_short_form {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(OptionKey::Short(c)),
                _ => None,
            }
        } else if key.is_empty() {
            None
        } else {
            Some(OptionKey::long(key))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionForms {
    pub short: Option<char>,
    pub long: Option<String>,
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Bound by position.
    Value { help: Option<String> },
    /// Bound by `-s` / `--long` key.
    Option(OptionForms),
}

/// One handler argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub position: usize,
    pub value_type: ValueType,
    pub default: Option<Value>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn is_array(&self) -> bool {
        self.value_type.is_array()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn help(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Value { help } => help.as_deref(),
            ParameterKind::Option(forms) => forms.help.as_deref(),
        }
    }

    pub fn forms(&self) -> Option<&OptionForms> {
        match &self.kind {
            ParameterKind::Option(forms) => Some(forms),
            ParameterKind::Value { .. } => None,
        }
    }

    /// Every key the parameter can be looked up by.
    pub fn keys(&self) -> Vec<OptionKey> {
        let mut keys = Vec::new();
        if let Some(forms) = self.forms() {
            if let Some(c) = forms.short {
                keys.push(OptionKey::Short(c));
            }
            if let Some(long) = &forms.long {
                keys.push(OptionKey::long(long));
            }
        }
        keys
    }

    /// How the parameter is named in messages: `--long`, `-s`, or its name.
    pub fn display_key(&self) -> String {
        match self.forms() {
            Some(OptionForms {
                long: Some(long), ..
            }) => format!("--{}", long),
            Some(OptionForms {
                short: Some(c), ..
            }) => format!("-{}", c),
            _ => self.name.clone(),
        }
    }
}

/// A leaf operation bound to a handler.
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub path: Vec<String>,
    pub help: Option<String>,
    pub category: Option<String>,
    /// Every parameter except the global options slot, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Indexes into `parameters` of the positional values, in position order.
    pub ordered_values: Vec<usize>,
    /// Indexes into `parameters`, once per alias.
    pub options_by_key: HashMap<OptionKey, usize>,
    pub global_options_slot: Option<usize>,
    /// Number of handler arguments, including the global options slot.
    pub arity: usize,
    pub handler: Handler,
}

impl Command {
    pub fn find_option(&self, key: &OptionKey) -> Option<usize> {
        self.options_by_key.get(key).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &Parameter> {
        self.ordered_values.iter().map(|&i| &self.parameters[i])
    }

    /// Options in declaration order, each listed once.
    pub fn options(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p.kind, ParameterKind::Option(_)))
    }

    pub fn has_options(&self) -> bool {
        !self.options_by_key.is_empty()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("parameters", &self.parameters)
            .field("global_options_slot", &self.global_options_slot)
            .finish_non_exhaustive()
    }
}

/// A named node grouping child verbs and commands.
#[derive(Debug, Clone)]
pub struct Verb {
    pub name: String,
    pub path: Vec<String>,
    pub help: Option<String>,
    pub category: Option<String>,
    pub is_root: bool,
    /// Keyed by lowercased name.
    pub verbs: BTreeMap<String, Verb>,
    /// Keyed by lowercased name.
    pub commands: BTreeMap<String, Command>,
}

impl Verb {
    pub fn find_verb(&self, name: &str) -> Option<&Verb> {
        self.verbs.get(&fold_name(name))
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.get(&fold_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_lookup() {
        let level = EnumType::new("LogLevel", ["Debug", "Info", "Warn"]);
        assert_eq!(level.by_name("info").map(|m| m.ordinal), Some(1));
        assert_eq!(level.by_ordinal(2).map(|m| m.name.as_str()), Some("Warn"));
        assert!(level.by_name("trace").is_none());
        assert_eq!(level.zero().map(|m| m.name.as_str()), Some("Debug"));
    }

    #[test]
    fn test_names_fold_beyond_ascii() {
        assert!(same_name("ÜBER", "über"));
        assert!(!same_name("über", "uber"));
        assert_eq!(OptionKey::long("ÄRGER"), OptionKey::long("ärger"));
        let e = EnumType::new("Mode", ["Ölig", "Trocken"]);
        assert_eq!(e.by_name("ÖLIG").map(|m| m.ordinal), Some(0));
    }

    #[test]
    fn test_enum_zero_falls_back_to_first() {
        let e = EnumType::with_ordinals("Odd", [("One", 1), ("Three", 3)]);
        assert_eq!(e.zero().map(|m| m.name.as_str()), Some("One"));
    }

    #[test]
    fn test_value_append_arrays_only() {
        let mut perms = Value::Array(vec![Value::String("read".into())]);
        assert!(perms.append(Value::Array(vec![Value::String("write".into())])));
        assert_eq!(perms.to_string(), "read,write");

        let mut single = Value::Int(1);
        assert!(!single.append(Value::Array(vec![Value::Int(2)])));
        assert_eq!(single, Value::Int(1));
    }

    #[test]
    fn test_option_key_from_token() {
        assert_eq!(OptionKey::from_token("a", true), Some(OptionKey::Short('a')));
        assert_eq!(
            OptionKey::from_token("Keep-Storage", false),
            Some(OptionKey::Long("keep-storage".into()))
        );
        assert_eq!(OptionKey::from_token("", false), None);
        assert_eq!(OptionKey::from_token("", true), None);
    }

    #[test]
    fn test_value_type_flags() {
        assert!(ValueType::Bool.is_flag());
        assert!(ValueType::array(ValueType::Bool).is_flag());
        assert!(!ValueType::I32.is_flag());
        assert_eq!(ValueType::array(ValueType::String).to_string(), "[string]");
    }
}
