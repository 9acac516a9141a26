// src/params/value.rs

use std::fmt;

use serde::Deserialize;

/// A single scalar launch parameter.
///
/// Deserialises untagged, so TOML `true`, `3`, `0.5` and `"x"` map to the
/// matching variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParameterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Bool(_) => "bool",
            ParameterValue::Int(_) => "int",
            ParameterValue::Float(_) => "float",
            ParameterValue::Str(_) => "string",
        }
    }
}

/// Renders the value the way it is passed on a command line.
///
/// Floats always carry a decimal point (`1.0`, not `1`) so the receiving node
/// does not re-type them as integers.
impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{b}"),
            ParameterValue::Int(i) => write!(f, "{i}"),
            ParameterValue::Float(x) => write!(f, "{x:?}"),
            ParameterValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Str(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_render_with_decimal_point() {
        assert_eq!(ParameterValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParameterValue::Float(0.1627).to_string(), "0.1627");
        assert_eq!(ParameterValue::Float(-0.035).to_string(), "-0.035");
    }

    #[test]
    fn toml_scalars_deserialize_to_matching_variants() {
        #[derive(Deserialize)]
        struct Row {
            a: ParameterValue,
            b: ParameterValue,
            c: ParameterValue,
            d: ParameterValue,
        }

        let row: Row = toml::from_str("a = true\nb = 3\nc = 0.5\nd = \"x\"").unwrap();
        assert_eq!(row.a, ParameterValue::Bool(true));
        assert_eq!(row.b, ParameterValue::Int(3));
        assert_eq!(row.c, ParameterValue::Float(0.5));
        assert_eq!(row.d, ParameterValue::Str("x".into()));
    }
}
