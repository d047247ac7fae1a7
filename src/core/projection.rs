//! Field projection from the `select` parameter

use crate::core::error::QueryError;
use indexmap::IndexSet;
use serde_json::{Map, Value};

/// Whether the listed fields are kept or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Include,
    Exclude,
}

/// Ordered set of fields to return (or to leave out)
///
/// An empty spec returns every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSpec {
    mode: ProjectionMode,
    fields: IndexSet<String>,
}

impl Default for ProjectionSpec {
    fn default() -> Self {
        Self::all()
    }
}

impl ProjectionSpec {
    /// Projection returning every field
    pub fn all() -> Self {
        Self {
            mode: ProjectionMode::Include,
            fields: IndexSet::new(),
        }
    }

    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: ProjectionMode::Include,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: ProjectionMode::Exclude,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn is_all(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a store projection document (`{"name": 1, "tags": 1}`)
    pub fn to_json(&self) -> Option<Value> {
        if self.is_all() {
            return None;
        }
        let flag = match self.mode {
            ProjectionMode::Include => 1,
            ProjectionMode::Exclude => 0,
        };
        Some(Value::Object(
            self.fields
                .iter()
                .map(|field| (field.clone(), Value::from(flag)))
                .collect::<Map<String, Value>>(),
        ))
    }
}

/// Parse a comma-separated `select` value
///
/// A leading `-` excludes a field. Included and excluded fields cannot be
/// mixed in one projection.
pub fn select(raw: Option<&str>) -> Result<ProjectionSpec, QueryError> {
    let Some(raw) = raw else {
        return Ok(ProjectionSpec::all());
    };

    let mut mode = None;
    let mut fields = IndexSet::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (entry_mode, name) = match entry.strip_prefix('-') {
            Some(name) => (ProjectionMode::Exclude, name.trim()),
            None => (ProjectionMode::Include, entry),
        };
        if name.is_empty() {
            continue;
        }
        match mode {
            None => mode = Some(entry_mode),
            Some(m) if m != entry_mode => {
                return Err(QueryError::MalformedProjection {
                    reason: format!(
                        "cannot mix included and excluded fields ('{}')",
                        entry
                    ),
                });
            }
            Some(_) => {}
        }
        fields.insert(name.to_string());
    }

    Ok(ProjectionSpec {
        mode: mode.unwrap_or(ProjectionMode::Include),
        fields,
    })
}
