use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing [`VariableDirective`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariableDirectiveParseError {
    /// The `=` separating name and value was missing.
    #[error("variable '{0}' is missing the assignment '='")]
    MissingAssignment(String),
    /// The variable name was empty.
    #[error("variable '{0}' has an empty name")]
    EmptyName(String),
}

/// A variable declared for the component at startup (`name=value`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VariableDirective {
    /// Variable name.
    pub name: String,
    /// Variable value; always a string.
    pub value: String,
}

impl VariableDirective {
    /// Creates a new directive.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for VariableDirective {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.name, self.value)
    }
}

impl FromStr for VariableDirective {
    type Err = VariableDirectiveParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, value) = input
            .split_once('=')
            .ok_or_else(|| VariableDirectiveParseError::MissingAssignment(input.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VariableDirectiveParseError::EmptyName(input.to_string()));
        }
        Ok(Self::new(name, value))
    }
}

/// Collapses directives into a lookup table, keeping the last value per name.
#[must_use]
pub fn variable_table<'a, I>(directives: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a VariableDirective>,
{
    directives
        .into_iter()
        .map(|directive| (directive.name.clone(), directive.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_value_containing_separator() {
        let directive: VariableDirective = "dsn=postgres://u@h/db?x=1".parse().expect("parse");
        assert_eq!(directive.name, "dsn");
        assert_eq!(directive.value, "postgres://u@h/db?x=1");
    }

    #[rstest]
    #[case::no_assignment(
        "workers",
        VariableDirectiveParseError::MissingAssignment("workers".into())
    )]
    #[case::empty_name(" =1", VariableDirectiveParseError::EmptyName(" =1".into()))]
    fn rejects_malformed_directives(
        #[case] input: &str,
        #[case] expected: VariableDirectiveParseError,
    ) {
        assert_eq!(input.parse::<VariableDirective>(), Err(expected));
    }

    #[test]
    fn later_directives_win() {
        let directives = vec![
            VariableDirective::new("mode", "fast"),
            VariableDirective::new("mode", "safe"),
        ];
        let table = variable_table(&directives);
        assert_eq!(table.get("mode").map(String::as_str), Some("safe"));
        assert_eq!(table.len(), 1);
    }
}
