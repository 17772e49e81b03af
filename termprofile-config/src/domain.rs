//! The four value domains a profile stores.
//!
//! Each domain owns one key file section. [`DomainValue`] ties a Rust type to
//! its domain so that section lookup, encoding and change-event construction
//! are written once and shared by the typed accessors.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::notifier::ChangeEvent;

/// A value domain and its backing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Text,
    Integer,
    Boolean,
    Float,
}

impl Domain {
    /// All domains in section order.
    pub const ALL: [Domain; 4] = [
        Domain::Text,
        Domain::Integer,
        Domain::Boolean,
        Domain::Float,
    ];

    /// Name of the key file section holding this domain.
    pub fn section(self) -> &'static str {
        match self {
            Domain::Text => "strings",
            Domain::Integer => "ints",
            Domain::Boolean => "booleans",
            Domain::Float => "floats",
        }
    }

    /// Short type name used on the command line and in diagnostics.
    pub fn type_name(self) -> &'static str {
        match self {
            Domain::Text => "string",
            Domain::Integer => "int",
            Domain::Boolean => "boolean",
            Domain::Float => "float",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Domain::Text => 0,
            Domain::Integer => 1,
            Domain::Boolean => 2,
            Domain::Float => 3,
        }
    }

    /// Parse `raw` as a value of this domain.
    pub fn parse_value(self, raw: &str) -> Option<Value> {
        match self {
            Domain::Text => String::decode(raw).map(Value::Text),
            Domain::Integer => i64::decode(raw).map(Value::Integer),
            Domain::Boolean => bool::decode(raw).map(Value::Boolean),
            Domain::Float => f64::decode(raw).map(Value::Float),
        }
    }

    /// The value getters return for a missing or unreadable key.
    pub fn zero(self) -> Value {
        match self {
            Domain::Text => Value::Text(String::new()),
            Domain::Integer => Value::Integer(0),
            Domain::Boolean => Value::Boolean(false),
            Domain::Float => Value::Float(0.0),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" | "strings" | "text" => Ok(Domain::Text),
            "int" | "ints" | "integer" => Ok(Domain::Integer),
            "boolean" | "booleans" | "bool" => Ok(Domain::Boolean),
            "float" | "floats" | "double" => Ok(Domain::Float),
            other => Err(format!(
                "unknown value type '{other}' (expected string, int, boolean or float)"
            )),
        }
    }
}

/// A value from any domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
}

impl Value {
    /// Domain this value belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            Value::Text(_) => Domain::Text,
            Value::Integer(_) => Domain::Integer,
            Value::Boolean(_) => Domain::Boolean,
            Value::Float(_) => Domain::Float,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&v.encode()),
        }
    }
}

/// A Rust type stored in exactly one domain.
pub trait DomainValue: Sized + Clone + Default + Send + 'static {
    /// The domain (and therefore section) holding values of this type.
    const DOMAIN: Domain;

    /// Parse the stored text. `None` means the entry is unreadable as this type.
    fn decode(raw: &str) -> Option<Self>;

    /// Text written to the key file.
    fn encode(&self) -> String;

    /// Wrap a change of this type in its event variant.
    fn changed(key: String, value: Self) -> ChangeEvent;

    /// Borrow the key and value if `event` is this type's variant.
    fn from_event(event: &ChangeEvent) -> Option<(&str, &Self)>;
}

impl DomainValue for String {
    const DOMAIN: Domain = Domain::Text;

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn encode(&self) -> String {
        self.clone()
    }

    fn changed(key: String, value: Self) -> ChangeEvent {
        ChangeEvent::StringChanged { key, value }
    }

    fn from_event(event: &ChangeEvent) -> Option<(&str, &Self)> {
        match event {
            ChangeEvent::StringChanged { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }
}

impl DomainValue for i64 {
    const DOMAIN: Domain = Domain::Integer;

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn encode(&self) -> String {
        self.to_string()
    }

    fn changed(key: String, value: Self) -> ChangeEvent {
        ChangeEvent::IntChanged { key, value }
    }

    fn from_event(event: &ChangeEvent) -> Option<(&str, &Self)> {
        match event {
            ChangeEvent::IntChanged { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }
}

impl DomainValue for bool {
    const DOMAIN: Domain = Domain::Boolean;

    fn decode(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn encode(&self) -> String {
        self.to_string()
    }

    fn changed(key: String, value: Self) -> ChangeEvent {
        ChangeEvent::BooleanChanged { key, value }
    }

    fn from_event(event: &ChangeEvent) -> Option<(&str, &Self)> {
        match event {
            ChangeEvent::BooleanChanged { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }
}

impl DomainValue for f64 {
    const DOMAIN: Domain = Domain::Float;

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    // Debug formatting is the shortest text that parses back to the same bits
    fn encode(&self) -> String {
        format!("{self:?}")
    }

    fn changed(key: String, value: Self) -> ChangeEvent {
        ChangeEvent::FloatChanged { key, value }
    }

    fn from_event(event: &ChangeEvent) -> Option<(&str, &Self)> {
        match event {
            ChangeEvent::FloatChanged { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }
}
