//! Document model shared by every store implementation.

use agora_core::{AgoraError, AgoraResult};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// Location of a document: `collection/id`.
///
/// Subcollections are ordinary collections whose name contains the parent
/// path, e.g. `posts/p1/likes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    /// Creates a path from a collection and a document id.
    #[must_use]
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Path of the document `id` in the subcollection `sub` of this document.
    #[must_use]
    pub fn child(&self, sub: &str, id: impl Into<String>) -> Self {
        Self::new(self.subcollection(sub), id)
    }

    /// Name of the subcollection `sub` of this document.
    #[must_use]
    pub fn subcollection(&self, sub: &str) -> String {
        format!("{}/{}/{}", self.collection, self.id, sub)
    }

    /// Collection holding the document.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document id within its collection.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Document {
    /// Document id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Deserializes the fields into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> AgoraResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            AgoraError::store(format!("Malformed document {}: {}", self.path, e))
        })
    }

    /// Reads an integer field, treating a missing field as zero.
    #[must_use]
    pub fn get_i64(&self, field: &str) -> i64 {
        self.fields.get(field).and_then(Value::as_i64).unwrap_or(0)
    }
}

/// Serializes `value` into a field map.
pub fn to_fields<T: Serialize>(value: &T) -> AgoraResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AgoraError::internal(format!(
            "Document must serialize to an object, got {other}"
        ))),
    }
}

/// Builds a field map from key/value pairs.
#[must_use]
pub fn fields<I, K>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// A single mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Writes a new document; fails with `Conflict` if it exists.
    Create { path: DocumentPath, fields: Fields },
    /// Overwrites or creates the document.
    Set { path: DocumentPath, fields: Fields },
    /// Shallow-merges into the document, creating it if absent.
    Merge { path: DocumentPath, fields: Fields },
    /// Shallow-merges into an existing document; fails with `NotFound` if absent.
    Update { path: DocumentPath, fields: Fields },
    /// Adds `by` to an integer field of an existing document.
    ///
    /// A missing field counts as zero and the result never drops below zero.
    Increment {
        path: DocumentPath,
        field: String,
        by: i64,
    },
    /// Removes the document. Deleting a missing document is a no-op.
    Delete { path: DocumentPath },
}

impl WriteOp {
    /// Create-if-absent of a serializable value.
    pub fn create<T: Serialize>(path: DocumentPath, value: &T) -> AgoraResult<Self> {
        Ok(Self::Create {
            path,
            fields: to_fields(value)?,
        })
    }

    /// Overwrite with a serializable value.
    pub fn set<T: Serialize>(path: DocumentPath, value: &T) -> AgoraResult<Self> {
        Ok(Self::Set {
            path,
            fields: to_fields(value)?,
        })
    }

    /// Shallow merge, creating the document when absent.
    #[must_use]
    pub fn merge(path: DocumentPath, fields: Fields) -> Self {
        Self::Merge { path, fields }
    }

    /// Shallow merge into an existing document.
    #[must_use]
    pub fn update(path: DocumentPath, fields: Fields) -> Self {
        Self::Update { path, fields }
    }

    /// Counter increment (or decrement with a negative `by`).
    #[must_use]
    pub fn increment(path: DocumentPath, field: impl Into<String>, by: i64) -> Self {
        Self::Increment {
            path,
            field: field.into(),
            by,
        }
    }

    /// Deletion.
    #[must_use]
    pub fn delete(path: DocumentPath) -> Self {
        Self::Delete { path }
    }

    /// Path the operation touches.
    #[must_use]
    pub fn path(&self) -> &DocumentPath {
        match self {
            Self::Create { path, .. }
            | Self::Set { path, .. }
            | Self::Merge { path, .. }
            | Self::Update { path, .. }
            | Self::Increment { path, .. }
            | Self::Delete { path } => path,
        }
    }
}

/// Ordered list of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Appends every operation of `ops`.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = WriteOp>) -> &mut Self {
        self.ops.extend(ops);
        self
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if the batch holds no operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the batch.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Field predicate. Documents missing the field never match.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
    ArrayContains(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
}

impl Filter {
    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// `field in values`
    pub fn one_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// `value in field[]`
    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayContains(field.into(), value.into())
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(field.into(), value.into())
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte(field.into(), value.into())
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(field.into(), value.into())
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(field.into(), value.into())
    }

    /// Whether `fields` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        let field_value = |name: &str| fields.get(name);
        match self {
            Self::Eq(name, expected) => field_value(name).is_some_and(|v| v == expected),
            Self::In(name, options) => field_value(name).is_some_and(|v| options.contains(v)),
            Self::ArrayContains(name, expected) => field_value(name)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(expected)),
            Self::Gt(name, bound) => {
                field_value(name).is_some_and(|v| compare_values(v, bound) == Ordering::Greater)
            }
            Self::Gte(name, bound) => {
                field_value(name).is_some_and(|v| compare_values(v, bound) != Ordering::Less)
            }
            Self::Lt(name, bound) => {
                field_value(name).is_some_and(|v| compare_values(v, bound) == Ordering::Less)
            }
            Self::Lte(name, bound) => {
                field_value(name).is_some_and(|v| compare_values(v, bound) != Ordering::Greater)
            }
        }
    }
}

/// Query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, Direction)>,
    pub limit: Option<usize>,
    /// Id of a document of the collection; results start after it.
    pub start_after: Option<String>,
}

impl Query {
    /// Query over every document of `collection`, ordered by id.
    #[must_use]
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            start_after: None,
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a sort key. Ties are broken by document id.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Starts after the document with this id.
    #[must_use]
    pub fn start_after(mut self, cursor: Option<&str>) -> Self {
        self.start_after = cursor.map(ToString::to_string);
        self
    }

    /// Compares two documents by the query ordering, then by id.
    #[must_use]
    pub fn compare(&self, a: (&str, &Fields), b: (&str, &Fields)) -> Ordering {
        for (field, direction) in &self.order_by {
            let left = a.1.get(field).unwrap_or(&Value::Null);
            let right = b.1.get(field).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            if ordering != Ordering::Equal {
                return apply_direction(ordering, *direction);
            }
        }
        let tiebreak = self
            .order_by
            .last()
            .map_or(Direction::Ascending, |(_, direction)| *direction);
        apply_direction(a.0.cmp(b.0), tiebreak)
    }

    /// Whether the document passes every filter.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|f| f.matches(fields))
    }
}

fn apply_direction(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Ascending => ordering,
        Direction::Descending => ordering.reverse(),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y) {
                let ordering = compare_values(left, right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_child_paths() {
        let post = DocumentPath::new("posts", "p1");
        let like = post.child("likes", "u1");
        assert_eq!(like.collection(), "posts/p1/likes");
        assert_eq!(like.id(), "u1");
        assert_eq!(like.to_string(), "posts/p1/likes/u1");
    }

    #[test]
    fn test_filters() {
        let doc = obj(json!({"author_id": "u1", "tags": ["a", "b"], "created_at": 10}));
        assert!(Filter::eq("author_id", "u1").matches(&doc));
        assert!(!Filter::eq("author_id", "u2").matches(&doc));
        assert!(Filter::one_of("author_id", ["u2", "u1"]).matches(&doc));
        assert!(Filter::array_contains("tags", "b").matches(&doc));
        assert!(Filter::gt("created_at", 9).matches(&doc));
        assert!(Filter::gte("created_at", 10).matches(&doc));
        assert!(!Filter::lt("created_at", 10).matches(&doc));
        assert!(Filter::lte("created_at", 10).matches(&doc));
        assert!(!Filter::eq("missing", Value::Null).matches(&doc));
    }

    #[test]
    fn test_value_ordering() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(1.5), &json!(1)), Ordering::Greater);
    }

    #[test]
    fn test_query_compare_breaks_ties_by_id() {
        let query = Query::collection("posts").order_by("created_at", Direction::Descending);
        let a = obj(json!({"created_at": 5}));
        let b = obj(json!({"created_at": 5}));
        assert_eq!(query.compare(("a", &a), ("b", &b)), Ordering::Greater);
    }

    #[test]
    fn test_decode_reports_malformed_documents() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Counter {
            count: i64,
        }

        let doc = Document {
            path: DocumentPath::new("counters", "c1"),
            fields: obj(json!({"count": "many"})),
            create_time: Utc::now(),
            update_time: Utc::now(),
        };
        let err = doc.decode::<Counter>().unwrap_err();
        assert_eq!(err.error_code(), "STORE_ERROR");
        assert_eq!(doc.get_i64("count"), 0);
    }
}
