//! Preprocessor definitions.
//!
//! In build descriptions a definition is either a bare name or a single
//! entry mapping `{NAME: value}` where the value is a string, a boolean or
//! a number.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A preprocessor definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDefine")]
pub struct Define {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDefine {
    Name(String),
    Pair(BTreeMap<String, DefineValue>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefineValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawDefine> for Define {
    type Error = String;

    fn try_from(raw: RawDefine) -> Result<Self, Self::Error> {
        match raw {
            RawDefine::Name(name) => Ok(Define::new(name)),
            RawDefine::Pair(map) => {
                let (name, value) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| "empty define mapping".to_string())?;
                let value = match value {
                    DefineValue::Bool(b) => b.to_string(),
                    DefineValue::Int(i) => i.to_string(),
                    DefineValue::Float(f) => f.to_string(),
                    DefineValue::Text(s) => s,
                };
                Ok(Define::with_value(name, value))
            }
        }
    }
}

impl Define {
    /// A definition without value.
    pub fn new(name: impl Into<String>) -> Self {
        Define {
            name: name.into(),
            value: None,
        }
    }

    /// A definition with value.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Value, empty when the definition has none.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_deref() {
            Some(value) if !value.is_empty() => write!(f, "{}={}", self.name, value),
            _ => f.write_str(&self.name),
        }
    }
}

/// Definitions whose name is not listed in `undefines`.
pub fn remove_defines(defines: &[Define], undefines: &[String]) -> Vec<Define> {
    defines
        .iter()
        .filter(|define| !undefines.contains(&define.name))
        .cloned()
        .collect()
}

/// Render definitions joined by `delimiter`.
pub fn join_defines(defines: &[Define], delimiter: &str) -> String {
    defines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(delimiter)
}
