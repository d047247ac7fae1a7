//! Filter compilation
//!
//! Turns the flat, untyped query parameters of a list request into a
//! [`FilterExpression`] the storage layer understands.
//!
//! # Syntax
//!
//! - Equality: `isPublished=true` → `{"isPublished": "true"}`
//! - Comparison: `price[gte]=10&price[lt]=100` → `{"price": {"$gte": "10", "$lt": "100"}}`
//! - Membership: `author[in]=Ada,Grace` → `{"author": {"$in": ["Ada", "Grace"]}}`
//! - Embedded document: `location[city]=Boston` → `{"location": {"city": "Boston"}}`
//!
//! The keywords `gt`, `gte`, `lt`, `lte` and `in` are recognised only as whole
//! words. They are rewritten to their `$` operator symbol wherever they stand
//! alone in a field name, a bracket segment or a value; `ingredient` or
//! `lighter` are left alone.
//!
//! Operands are kept as strings. Casting them to the stored value's type is the
//! storage backend's job.

use crate::core::error::QueryError;
use crate::core::query::RawParams;
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Sigil prefixed to operator keywords
pub const OPERATOR_SIGIL: char = '$';

static OPERATOR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(gt|gte|lt|lte|in)\b").expect("operator keyword pattern is valid")
});

/// Comparison operators supported in filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComparisonOperator {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 5] = [
        ComparisonOperator::Gt,
        ComparisonOperator::Gte,
        ComparisonOperator::Lt,
        ComparisonOperator::Lte,
        ComparisonOperator::In,
    ];

    /// Keyword used in query strings (`gte`)
    pub fn keyword(self) -> &'static str {
        match self {
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Lte => "lte",
            ComparisonOperator::In => "in",
        }
    }

    /// Store-native operator symbol (`$gte`)
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Gt => "$gt",
            ComparisonOperator::Gte => "$gte",
            ComparisonOperator::Lt => "$lt",
            ComparisonOperator::Lte => "$lte",
            ComparisonOperator::In => "$in",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Field equals the value (an embedded document when the value is an object)
    Equals(Value),
    /// Field satisfies every listed comparison
    Compare(BTreeMap<ComparisonOperator, Value>),
}

/// Structured filter over document fields, all conditions combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    conditions: BTreeMap<String, FilterCondition>,
}

impl FilterExpression {
    /// Create an empty expression matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.into(), FilterCondition::Equals(value.into()));
        self
    }

    /// Add a comparison, merging with comparisons already set on the field
    pub fn with_comparison(
        mut self,
        field: impl Into<String>,
        op: ComparisonOperator,
        operand: impl Into<Value>,
    ) -> Self {
        let entry = self
            .conditions
            .entry(field.into())
            .or_insert_with(|| FilterCondition::Compare(BTreeMap::new()));
        if let FilterCondition::Equals(_) = entry {
            *entry = FilterCondition::Compare(BTreeMap::new());
        }
        if let FilterCondition::Compare(ops) = entry {
            ops.insert(op, operand.into());
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterCondition> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render in the store's query-document form
    pub fn to_json(&self) -> Value {
        let map = self
            .conditions
            .iter()
            .map(|(field, condition)| {
                let value = match condition {
                    FilterCondition::Equals(v) => v.clone(),
                    FilterCondition::Compare(ops) => Value::Object(
                        ops.iter()
                            .map(|(op, operand)| (op.symbol().to_string(), operand.clone()))
                            .collect(),
                    ),
                };
                (field.clone(), value)
            })
            .collect::<Map<String, Value>>();
        Value::Object(map)
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Rewrite whole-word operator keywords to their `$` symbol
pub fn rewrite_keywords(text: &str) -> Cow<'_, str> {
    OPERATOR_KEYWORD.replace_all(text, |caps: &Captures| {
        format!("{}{}", OPERATOR_SIGIL, &caps[1])
    })
}

/// Compile filter parameters into a [`FilterExpression`]
///
/// `params` must already have the reserved keys removed
/// (see [`RawParams::without_reserved`]).
pub fn compile(params: &RawParams) -> Result<FilterExpression, QueryError> {
    let mut pairs: Vec<(&str, &str)> = params.iter().collect();
    pairs.sort_unstable();

    let mut tree: BTreeMap<String, Node> = BTreeMap::new();
    for (key, value) in pairs {
        let (field, segments) = parse_key(key)?;
        if field.contains(OPERATOR_SIGIL) {
            return Err(QueryError::filter(field, "field names cannot contain '$'"));
        }
        let field_name = rewrite_keywords(field).into_owned();
        if field_name
            .split('.')
            .any(|part| part.starts_with(OPERATOR_SIGIL))
        {
            return Err(QueryError::filter(
                field,
                "field names cannot be operators or contain an operator in their path",
            ));
        }

        let mut path = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.contains(OPERATOR_SIGIL) {
                return Err(QueryError::filter(
                    field,
                    format!("operator '{}' must be written without the '$' sigil", segment),
                ));
            }
            path.push(rewrite_keywords(segment).into_owned());
        }

        let leaf = Node::Leaf(rewrite_keywords(value).into_owned());
        insert(&mut tree, field_name, &path, leaf, field)?;
    }

    let mut expression = FilterExpression::new();
    for (field, node) in tree {
        let condition = condition_for(&field, node)?;
        expression.conditions.insert(field, condition);
    }
    Ok(expression)
}

#[derive(Debug)]
enum Node {
    Leaf(String),
    Branch(BTreeMap<String, Node>),
}

/// Split `price[gte]` into `("price", ["gte"])`
fn parse_key(key: &str) -> Result<(&str, Vec<&str>), QueryError> {
    let (field, mut rest) = match key.find('[') {
        Some(idx) => key.split_at(idx),
        None => (key, ""),
    };
    if field.is_empty() {
        return Err(QueryError::filter(key, "missing field name"));
    }
    if field.contains(']') {
        return Err(QueryError::filter(key, "unbalanced brackets"));
    }

    let mut segments = Vec::new();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(QueryError::filter(key, "unexpected text after ']'"));
        };
        let Some(close) = inner.find(']') else {
            return Err(QueryError::filter(key, "unbalanced brackets"));
        };
        let segment = &inner[..close];
        if segment.is_empty() {
            return Err(QueryError::filter(key, "empty bracket segment"));
        }
        if segment.contains('[') {
            return Err(QueryError::filter(key, "unbalanced brackets"));
        }
        segments.push(segment);
        rest = &inner[close + 1..];
    }

    Ok((field, segments))
}

fn insert(
    tree: &mut BTreeMap<String, Node>,
    name: String,
    path: &[String],
    leaf: Node,
    field: &str,
) -> Result<(), QueryError> {
    let conflict = || QueryError::filter(field, "field is given both a value and nested keys");

    match path.split_first() {
        None => {
            if tree.contains_key(&name) {
                return Err(conflict());
            }
            tree.insert(name, leaf);
            Ok(())
        }
        Some((next, remaining)) => {
            let node = tree
                .entry(name)
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            match node {
                Node::Branch(children) => insert(children, next.clone(), remaining, leaf, field),
                Node::Leaf(_) => Err(conflict()),
            }
        }
    }
}

fn condition_for(field: &str, node: Node) -> Result<FilterCondition, QueryError> {
    let children = match node {
        Node::Leaf(value) => return Ok(FilterCondition::Equals(Value::String(value))),
        Node::Branch(children) => children,
    };

    let operator_count = children
        .keys()
        .filter(|key| ComparisonOperator::from_symbol(key).is_some())
        .count();

    if operator_count == 0 {
        return Ok(FilterCondition::Equals(embedded_value(field, children)?));
    }
    if operator_count != children.len() {
        return Err(QueryError::filter(
            field,
            "operators cannot be mixed with embedded fields",
        ));
    }

    let mut ops = BTreeMap::new();
    for (symbol, child) in children {
        let Some(op) = ComparisonOperator::from_symbol(&symbol) else {
            continue;
        };
        let operand = match (op, child) {
            (ComparisonOperator::In, Node::Leaf(list)) => Value::Array(
                list.split(',')
                    .map(|item| Value::String(item.trim().to_string()))
                    .collect(),
            ),
            (_, Node::Leaf(value)) => Value::String(value),
            (_, Node::Branch(nested)) => embedded_value(field, nested)?,
        };
        ops.insert(op, operand);
    }
    Ok(FilterCondition::Compare(ops))
}

fn embedded_value(field: &str, children: BTreeMap<String, Node>) -> Result<Value, QueryError> {
    let mut map = Map::new();
    for (key, child) in children {
        if key.starts_with(OPERATOR_SIGIL) {
            return Err(QueryError::filter(
                field,
                format!("operator '{}' must be applied directly to a field", key),
            ));
        }
        let value = match child {
            Node::Leaf(value) => Value::String(value),
            Node::Branch(nested) => embedded_value(field, nested)?,
        };
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}
