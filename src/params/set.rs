// src/params/set.rs

use std::collections::HashSet;
use std::mem;

use crate::errors::{LaunchError, Result};
use crate::params::ParameterValue;

/// Ordered, immutable mapping from parameter name to scalar value.
///
/// Only [`ParameterSetBuilder::build`] constructs one, and it rejects
/// duplicate names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates entries for a [`ParameterSet`].
#[derive(Debug, Default)]
pub struct ParameterSetBuilder {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Duplicates are detected in [`build`](Self::build).
    pub fn set(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.entries.push((name.to_string(), value.into()));
        self
    }

    /// Append only when `value` is `Some`.
    pub fn set_opt<V: Into<ParameterValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    /// Replace the value of an existing entry in place, or append it.
    ///
    /// A replacement keeps the entry's type. The one exception is an integer
    /// written for a float entry, which is widened.
    pub fn replace(mut self, name: &str, value: ParameterValue) -> Result<Self> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = retyped(name, &entry.1, value)?,
            None => self.entries.push((name.to_string(), value)),
        }
        Ok(self)
    }

    pub fn build(self) -> Result<ParameterSet> {
        let mut seen = HashSet::new();
        for (name, _) in &self.entries {
            if name.is_empty() {
                return Err(LaunchError::invalid("parameter names must be non-empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(LaunchError::invalid(format!(
                    "parameter '{name}' appears more than once in one parameter set"
                )));
            }
        }
        Ok(ParameterSet {
            entries: self.entries,
        })
    }
}

fn retyped(
    name: &str,
    current: &ParameterValue,
    value: ParameterValue,
) -> Result<ParameterValue> {
    match (current, value) {
        (ParameterValue::Float(_), ParameterValue::Int(i)) => Ok(ParameterValue::Float(i as f64)),
        (current, value) if mem::discriminant(current) == mem::discriminant(&value) => Ok(value),
        (current, value) => Err(LaunchError::invalid(format!(
            "parameter '{name}' is a {} but the override gives a {}",
            current.type_name(),
            value.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_keeps_insertion_order() {
        let set = ParameterSetBuilder::new()
            .set("z", 1i64)
            .set("a", "x")
            .set_opt::<f64>("skipped", None)
            .set_opt("m", Some(true))
            .build()
            .unwrap();

        assert_eq!(set.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(set.get("a"), Some(&ParameterValue::Str("x".into())));
        assert!(!set.contains("skipped"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ParameterSetBuilder::new()
            .set("a", 1i64)
            .set("a", 2i64)
            .build()
            .unwrap_err();
        assert!(matches!(err, LaunchError::InvalidConfiguration(msg) if msg.contains("'a'")));
    }

    #[test]
    fn replace_overwrites_in_place() {
        let set = ParameterSetBuilder::new()
            .set("a", 1i64)
            .set("b", 2i64)
            .replace("a", ParameterValue::Int(9))
            .and_then(|b| b.replace("c", ParameterValue::Bool(false)))
            .and_then(ParameterSetBuilder::build)
            .unwrap();

        let pairs: Vec<_> = set.iter().map(|(n, v)| (n.to_string(), v.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), ParameterValue::Int(9)),
                ("b".to_string(), ParameterValue::Int(2)),
                ("c".to_string(), ParameterValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn replace_rejects_a_change_of_type() {
        let err = ParameterSetBuilder::new()
            .set("publish_image_marked", 1i64)
            .replace("publish_image_marked", ParameterValue::Bool(true))
            .unwrap_err();
        assert!(matches!(
            err,
            LaunchError::InvalidConfiguration(msg)
                if msg.contains("publish_image_marked") && msg.contains("int") && msg.contains("bool")
        ));
    }

    #[test]
    fn replace_widens_int_into_float() {
        let set = ParameterSetBuilder::new()
            .set("map_init_pose_z", -0.035)
            .replace("map_init_pose_z", ParameterValue::Int(1))
            .and_then(ParameterSetBuilder::build)
            .unwrap();
        assert_eq!(set.get("map_init_pose_z"), Some(&ParameterValue::Float(1.0)));
    }
}
