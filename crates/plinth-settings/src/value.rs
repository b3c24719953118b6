//! Tagged value model and coercion rules for settings entries.
//!
//! Every value is one of six semantic types and round-trips through a
//! canonical string form: parsing the canonical form under the value's own
//! tag reproduces the value within the precision of that type.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Semantic type tag for a settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Case-insensitive `true`/`false`.
    #[serde(rename = "boolean")]
    Bool,
    /// 32-bit signed integer, base 10.
    #[serde(rename = "int")]
    Int,
    /// 64-bit signed integer, base 10.
    #[serde(rename = "long")]
    Long,
    /// Double-precision decimal.
    #[serde(rename = "double")]
    Double,
    /// Single-precision decimal.
    #[serde(rename = "float")]
    Float,
    /// Passed through unchanged.
    #[serde(rename = "string")]
    Text,
}

impl ValueKind {
    /// Stable tag stored in the backing store's `type` column.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Float => "float",
            Self::Text => "string",
        }
    }

    /// Parse a canonical string under this kind.
    ///
    /// Returns `None` when `raw` does not parse under the kind. `Text`
    /// accepts any input unchanged.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<SettingsValue> {
        match self {
            Self::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(SettingsValue::Bool(true)),
                "false" => Some(SettingsValue::Bool(false)),
                _ => None,
            },
            Self::Int => raw.parse::<i32>().ok().map(SettingsValue::Int),
            Self::Long => raw.parse::<i64>().ok().map(SettingsValue::Long),
            Self::Double => raw.parse::<f64>().ok().map(SettingsValue::Double),
            Self::Float => raw.parse::<f32>().ok().map(SettingsValue::Float),
            Self::Text => Some(SettingsValue::Text(raw.to_string())),
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_tag())
    }
}

impl FromStr for ValueKind {
    type Err = SettingsError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "double" => Ok(Self::Double),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::Text),
            _ => Err(SettingsError::UnknownTypeTag {
                tag: tag.to_string(),
            }),
        }
    }
}

/// A settings value in one of the six supported semantic types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingsValue {
    /// Boolean flag.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// Double-precision float.
    Double(f64),
    /// Single-precision float.
    Float(f32),
    /// Free-form text.
    Text(String),
}

impl SettingsValue {
    /// Kind tag derived from the runtime variant, never caller-supplied.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Double(_) => ValueKind::Double,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Canonical string form, independent of the semantic tag.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Long(value) => value.to_string(),
            Self::Double(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    /// Re-interpret this value under `kind` via the canonical string form.
    ///
    /// Returns `None` when the canonical form does not parse under `kind`.
    #[must_use]
    pub fn coerce(&self, kind: ValueKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        kind.parse(&self.canonical())
    }

    /// Boolean payload when this value is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Integer payload when this value is an `Int`.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        if let Self::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Long payload when this value is a `Long`.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        if let Self::Long(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Double payload when this value is a `Double`.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        if let Self::Double(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Float payload when this value is a `Float`.
    #[must_use]
    pub const fn as_f32(&self) -> Option<f32> {
        if let Self::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Text payload when this value is a `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

impl Display for SettingsValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.canonical())
    }
}

impl From<bool> for SettingsValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SettingsValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for SettingsValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for SettingsValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<f32> for SettingsValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingsValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingsValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
