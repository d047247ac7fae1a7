//! Sort order from the `sort` parameter

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field sorted when a request gives no `sort`
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Numeric form used by document stores (1 / -1)
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Ordered (field, direction) pairs, first pair sorts first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(Vec<(String, SortDirection)>);

impl SortSpec {
    pub fn new(keys: Vec<(String, SortDirection)>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a store sort document (`{"name": 1}`)
    ///
    /// Key order is not guaranteed by `serde_json::Map`; backends that need the
    /// order should walk [`SortSpec::keys`] instead.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, direction)| (field.clone(), Value::from(direction.as_i32())))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Builds [`SortSpec`]s from raw `sort` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpecifier {
    default_field: String,
    allow_descending_prefix: bool,
}

impl Default for SortSpecifier {
    fn default() -> Self {
        Self {
            default_field: DEFAULT_SORT_FIELD.to_string(),
            allow_descending_prefix: false,
        }
    }
}

impl SortSpecifier {
    pub fn new(default_field: impl Into<String>, allow_descending_prefix: bool) -> Self {
        Self {
            default_field: default_field.into(),
            allow_descending_prefix,
        }
    }

    /// Parse a comma-separated field list
    ///
    /// Every field sorts ascending and is used as written. When the
    /// descending prefix is enabled, `-name` sorts `name` descending instead.
    /// Absent or blank input sorts the default field, newest first.
    pub fn sort(&self, raw: Option<&str>) -> SortSpec {
        let keys: Vec<(String, SortDirection)> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .filter_map(|field| match field.strip_prefix('-') {
                Some(name) if self.allow_descending_prefix => {
                    let name = name.trim();
                    (!name.is_empty()).then(|| (name.to_string(), SortDirection::Descending))
                }
                _ => Some((field.to_string(), SortDirection::Ascending)),
            })
            .collect();

        if keys.is_empty() {
            return SortSpec(vec![(
                self.default_field.clone(),
                SortDirection::Descending,
            )]);
        }
        SortSpec(keys)
    }
}
