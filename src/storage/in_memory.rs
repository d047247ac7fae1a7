//! In-memory implementation of DocumentStore for testing and development

use crate::core::document::{Document, ID_FIELD};
use crate::core::filter::{ComparisonOperator, FilterCondition, FilterExpression};
use crate::core::projection::{ProjectionMode, ProjectionSpec};
use crate::core::sort::{SortDirection, SortSpec};
use crate::core::store::{DocumentStore, FindOptions};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Collection = IndexMap<Uuid, Document>;

/// In-memory document store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Documents keep insertion order, which is also the tie-break order when
/// sorting.
///
/// Filter operands arrive as strings and are cast to the type of the stored
/// value before comparing, so `isPublished=true` matches a boolean and
/// `price[gt]=10` compares numerically against a number.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, collection: &str, f: impl FnOnce(Option<&Collection>) -> R) -> Result<R> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(f(collections.get(collection)))
    }

    fn write<R>(&self, collection: &str, f: impl FnOnce(&mut Collection) -> R) -> Result<R> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(f(collections.entry(collection.to_string()).or_default()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn count(&self, collection: &str, filter: Option<&FilterExpression>) -> Result<u64> {
        self.read(collection, |docs| {
            let Some(docs) = docs else {
                return 0;
            };
            match filter {
                Some(filter) => docs.values().filter(|doc| matches(doc, filter)).count() as u64,
                None => docs.len() as u64,
            }
        })
    }

    async fn find(&self, collection: &str, options: &FindOptions) -> Result<Vec<Document>> {
        let mut selected: Vec<Document> = self.read(collection, |docs| {
            docs.map(|docs| {
                docs.values()
                    .filter(|doc| matches(doc, &options.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
        })?;

        // stable, so equal keys keep insertion order
        selected.sort_by(|a, b| compare_documents(a, b, &options.sort));

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(options.limit).unwrap_or(usize::MAX);
        Ok(selected
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|doc| project(doc, &options.projection))
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Document>> {
        self.read(collection, |docs| docs.and_then(|docs| docs.get(id).cloned()))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| anyhow!("Document has no valid '{}' field", ID_FIELD))?;

        self.write(collection, |docs| {
            if docs.contains_key(&id) {
                return Err(anyhow!("Duplicate id {} in collection '{}'", id, collection));
            }
            docs.insert(id, document.clone());
            Ok(document)
        })?
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        patch: Document,
    ) -> Result<Option<Document>> {
        self.write(collection, |docs| {
            let doc = docs.get_mut(id)?;
            for (key, value) in patch {
                if key == ID_FIELD {
                    continue;
                }
                set_path(doc, &key, value);
            }
            Some(doc.clone())
        })
    }

    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Document>> {
        // shift_remove keeps the insertion order of the remaining documents
        self.write(collection, |docs| docs.shift_remove(id))
    }
}

// ---------------------------------------------------------------------------
// Filter evaluation
// ---------------------------------------------------------------------------

fn matches(doc: &Document, filter: &FilterExpression) -> bool {
    filter.iter().all(|(field, condition)| {
        let stored = lookup(doc, field);
        match condition {
            FilterCondition::Equals(operand) => stored.is_some_and(|v| equals(v, operand)),
            FilterCondition::Compare(ops) => ops
                .iter()
                .all(|(op, operand)| stored.is_some_and(|v| compare(v, *op, operand))),
        }
    })
}

/// Resolve a field, following dots into embedded documents
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    match doc.get(head)? {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}

/// Equality with array semantics: an array matches if it equals the operand
/// or any of its elements does
fn equals(stored: &Value, operand: &Value) -> bool {
    if let Value::Array(items) = stored
        && !operand.is_array()
    {
        return items.iter().any(|item| scalar_equals(item, operand));
    }
    scalar_equals(stored, operand)
}

fn scalar_equals(stored: &Value, operand: &Value) -> bool {
    match (stored, operand) {
        (_, Value::String(raw)) => cast_equals(stored, raw),
        (Value::Object(stored), Value::Object(expected)) => {
            stored.len() == expected.len()
                && expected
                    .iter()
                    .all(|(key, v)| stored.get(key).is_some_and(|s| scalar_equals(s, v)))
        }
        _ => stored == operand,
    }
}

fn cast_equals(stored: &Value, raw: &str) -> bool {
    match stored {
        Value::String(s) => s == raw,
        Value::Bool(b) => parse_bool(raw) == Some(*b),
        Value::Number(n) => match (n.as_f64(), raw.trim().parse::<f64>()) {
            (Some(n), Ok(parsed)) => n == parsed,
            _ => false,
        },
        Value::Null => raw == "null",
        _ => false,
    }
}

fn compare(stored: &Value, op: ComparisonOperator, operand: &Value) -> bool {
    if op == ComparisonOperator::In {
        return match operand {
            Value::Array(candidates) => candidates.iter().any(|c| equals(stored, c)),
            other => equals(stored, other),
        };
    }

    if let Value::Array(items) = stored {
        return items.iter().any(|item| compare(item, op, operand));
    }

    let Some(ordering) = cast_ordering(stored, operand) else {
        return false;
    };
    match op {
        ComparisonOperator::Gt => ordering == Ordering::Greater,
        ComparisonOperator::Gte => ordering != Ordering::Less,
        ComparisonOperator::Lt => ordering == Ordering::Less,
        ComparisonOperator::Lte => ordering != Ordering::Greater,
        ComparisonOperator::In => false,
    }
}

/// Order `stored` against `operand` after casting the operand to the stored type
///
/// Values of different types never compare.
fn cast_ordering(stored: &Value, operand: &Value) -> Option<Ordering> {
    let Value::String(raw) = operand else {
        return (type_rank(stored) == type_rank(operand))
            .then(|| compare_values(stored, operand));
    };
    match stored {
        Value::String(s) => Some(s.as_str().cmp(raw.as_str())),
        Value::Number(n) => {
            let parsed = raw.trim().parse::<f64>().ok()?;
            n.as_f64()?.partial_cmp(&parsed)
        }
        Value::Bool(b) => Some(b.cmp(&parse_bool(raw)?)),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

fn compare_documents(a: &Document, b: &Document, sort: &SortSpec) -> Ordering {
    for (field, direction) in sort.keys() {
        let left = lookup(a, field).unwrap_or(&Value::Null);
        let right = lookup(b, field).unwrap_or(&Value::Null);
        let ordering = match direction {
            SortDirection::Ascending => compare_values(left, right),
            SortDirection::Descending => compare_values(right, left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Cross-type order used by document stores: null, numbers, strings,
/// objects, arrays, booleans
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x
            .iter()
            .zip(y.iter())
            .map(|((kx, vx), (ky, vy))| kx.cmp(ky).then_with(|| compare_values(vx, vy)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// ---------------------------------------------------------------------------
// Projection and updates
// ---------------------------------------------------------------------------

fn project(doc: Document, projection: &ProjectionSpec) -> Document {
    if projection.is_all() {
        return doc;
    }
    match projection.mode() {
        ProjectionMode::Include => {
            let mut out = Map::new();
            if let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD.to_string(), id.clone());
            }
            for field in projection.fields() {
                if let Some(value) = lookup(&doc, field) {
                    set_path(&mut out, field, value.clone());
                }
            }
            out
        }
        ProjectionMode::Exclude => {
            let mut out = doc;
            for field in projection.fields() {
                remove_path(&mut out, field);
            }
            out
        }
    }
}

/// Set a possibly dotted path, creating embedded documents on the way
fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                set_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(doc: &mut Document, path: &str) {
    if doc.remove(path).is_some() {
        return;
    }
    if let Some((head, rest)) = path.split_once('.')
        && let Some(Value::Object(inner)) = doc.get_mut(head)
    {
        remove_path(inner, rest);
    }
}
