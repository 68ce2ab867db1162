//! Verbose and compact field naming.
//!
//! Workers pick one naming mode at startup. In compact mode every path segment
//! that names a protocol field is swapped for its short alias before it
//! touches the tree, so `command/name` is stored as `c/n`. Segments that are
//! not protocol fields (service names, property names, user data keys) pass
//! through untouched.

use serde_json::{Map, Value};

/// Field-naming mode applied to every payload a worker reads or writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldNames {
    /// Full field names such as `command` and `params`.
    Verbose,
    /// Short aliases such as `c` and `p`.
    #[default]
    Compact,
}

impl FieldNames {
    /// Selects the mode from the worker's compact-names flag.
    #[must_use]
    pub const fn from_compact_flag(compact: bool) -> Self {
        if compact { Self::Compact } else { Self::Verbose }
    }

    /// Returns `true` for the compact mode.
    #[must_use]
    pub const fn is_compact(self) -> bool {
        matches!(self, Self::Compact)
    }

    /// Translates a verbose field name into the key stored under this mode.
    #[must_use]
    pub fn key(self, field: &str) -> &str {
        match self {
            Self::Verbose => field,
            Self::Compact => compact_alias(field).unwrap_or(field),
        }
    }

    /// Builds a mapping whose keys are translated under this mode.
    #[must_use]
    pub fn object<'a, I>(self, fields: I) -> Value
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let map = fields
            .into_iter()
            .map(|(field, value)| (self.key(field).to_owned(), value))
            .collect::<Map<String, Value>>();
        Value::Object(map)
    }
}

/// Short alias for a protocol field, when one exists.
#[must_use]
pub fn compact_alias(field: &str) -> Option<&'static str> {
    let alias = match field {
        "code" | "command" => "c",
        "data" | "datetime" => "d",
        "error" => "E",
        "files" => "f",
        "gateway" => "g",
        "id" => "i",
        "message" | "meta" => "m",
        "name" => "n",
        "origin" => "o",
        "params" | "properties" => "p",
        "result" => "r",
        "scope" | "status" => "s",
        "transactions" | "type" => "t",
        "transport" => "T",
        "value" => "v",
        _ => return None,
    };
    Some(alias)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::command("command", "c")]
    #[case::params("params", "p")]
    #[case::transport("transport", "T")]
    #[case::error("error", "E")]
    #[case::unknown("users", "users")]
    fn compact_mode_aliases_known_fields(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(FieldNames::Compact.key(field), expected);
    }

    #[test]
    fn verbose_mode_keeps_names() {
        assert_eq!(FieldNames::Verbose.key("command"), "command");
    }

    #[test]
    fn object_translates_keys() {
        let record = FieldNames::Compact.object([("name", json!("id")), ("value", json!(7))]);
        assert_eq!(record, json!({"n": "id", "v": 7}));
    }

    #[test]
    fn flag_selects_mode() {
        assert_eq!(FieldNames::from_compact_flag(true), FieldNames::Compact);
        assert!(!FieldNames::from_compact_flag(false).is_compact());
    }
}
