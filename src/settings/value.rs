//! Setting value and storage-type coercion.
//!
//! The settings table stores everything as text with a `type` column noting
//! how to read it back: `json` for list values (checkbox groups), `boolean`
//! for yes/no toggles, `string` for the rest.

use serde_json::Value;

/// Storage type column of a settings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    String,
    Boolean,
    Json,
}

impl SettingType {
    /// Parse the column value. Unknown types read as `string`.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "boolean" => SettingType::Boolean,
            "json" => SettingType::Json,
            _ => SettingType::String,
        }
    }

    /// Column value for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Boolean => "boolean",
            SettingType::Json => "json",
        }
    }
}

/// A decoded setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl SettingValue {
    /// Shorthand for a text value.
    pub fn text(value: impl Into<String>) -> Self {
        SettingValue::Text(value.into())
    }

    /// The boolean reading of this value, if it is a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            SettingValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// The text reading of this value, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Coerce to the stored `(val, type)` column pair.
    ///
    /// Lists encode as JSON, yes/no-like text normalizes to `yes`/`no` with
    /// a boolean type, everything else stores verbatim as a string.
    pub fn storage(&self) -> (String, SettingType) {
        match self {
            SettingValue::List(items) => (
                serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string()),
                SettingType::Json,
            ),
            SettingValue::Flag(flag) => (
                if *flag { "yes" } else { "no" }.to_string(),
                SettingType::Boolean,
            ),
            SettingValue::Text(text) => match normalize_flag(text) {
                Some(flag) => (
                    if flag { "yes" } else { "no" }.to_string(),
                    SettingType::Boolean,
                ),
                None => (text.clone(), SettingType::String),
            },
        }
    }

    /// Decode a stored `(val, type)` column pair.
    ///
    /// JSON values that fail to parse decode to an empty list; empty-string
    /// list elements are filtered out.
    pub fn decode(val: &str, kind: SettingType) -> Self {
        match kind {
            SettingType::Json => {
                let items = serde_json::from_str::<Value>(val)
                    .ok()
                    .and_then(|value| value.as_array().cloned())
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        other => Some(other.to_string()),
                    })
                    .filter(|item| !item.is_empty())
                    .collect();
                SettingValue::List(items)
            }
            SettingType::Boolean => match normalize_flag(val) {
                Some(flag) => SettingValue::Flag(flag),
                None => SettingValue::Text(val.to_string()),
            },
            SettingType::String => SettingValue::Text(val.to_string()),
        }
    }

    /// Convert yes/no-like text into a flag, leaving other values alone.
    pub fn normalized(self) -> Self {
        match self {
            SettingValue::Text(text) => match normalize_flag(&text) {
                Some(flag) => SettingValue::Flag(flag),
                None => SettingValue::Text(text),
            },
            other => other,
        }
    }
}

fn normalize_flag(value: &str) -> Option<bool> {
    match value {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}
