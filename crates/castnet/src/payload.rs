//! Wire-format payload construction.
//!
//! A [`Payload`] is a single nested JSON document addressed by dotted key
//! paths. The three write primitives have distinct conditional semantics that
//! must not be collapsed into one another:
//!
//! - [`Payload::set`] writes unconditionally;
//! - [`Payload::set_if_not_empty`] drops empty values, where `null`, `""`,
//!   `[]`, `{}`, `0` and `false` all count as empty (filter accumulation);
//! - [`Payload::set_if_not_null`] drops only `null`, preserving `0` and
//!   `false` (pagination offsets, where zero is meaningful).

use serde_json::{Map, Value};

/// A mutable nested document builder.
///
/// Construct a new instance per document; a payload is not a shared
/// singleton.
///
/// ```
/// use castnet::payload::Payload;
/// use serde_json::json;
///
/// let payload = Payload::new()
///     .set("index", "products")
///     .set_if_not_null("body.from", 0)
///     .set_if_not_empty("body.sort", json!([]));
///
/// assert_eq!(payload.get("body.from"), Some(&json!(0)));
/// assert_eq!(payload.get("body.sort"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Payload {
    doc: Map<String, Value>,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload targeting the given index.
    pub fn for_index(index: &str) -> Self {
        Self::new().set("index", index)
    }

    /// Unconditionally writes `value` at the dotted `path`, creating
    /// intermediate levels as nested objects.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        set_path(&mut self.doc, path, value.into());
        self
    }

    /// Writes `value` at `path` only when it is non-empty.
    pub fn set_if_not_empty(self, path: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if is_empty_value(&value) {
            return self;
        }
        self.set(path, value)
    }

    /// Writes `value` at `path` unless it is `null`. An explicit `0` or
    /// `false` is preserved.
    pub fn set_if_not_null(self, path: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            return self;
        }
        self.set(path, value)
    }

    /// Deep-merges `value` into the existing value at `path`.
    ///
    /// The existing value wins on scalar conflicts; lists are replaced, not
    /// concatenated. With no existing value this is a plain `set`.
    pub fn merge(self, path: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let merged = match self.get(path) {
            Some(existing) => deep_merge(existing, &value),
            None => value,
        };
        self.set(path, merged)
    }

    /// Returns the value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.doc, path)
    }

    /// Returns a clone of the value at `path`, or `default` when absent.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Consumes the payload, returning the full document.
    pub fn into_value(self) -> Value {
        Value::Object(self.doc)
    }

    /// Returns the full document.
    pub fn to_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }
}

/// Returns true when `value` carries no content.
///
/// `null`, empty strings, empty arrays, empty objects, numeric zero and
/// `false` are all empty. Pagination offsets must therefore go through
/// [`Payload::set_if_not_null`], never this predicate.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Recursively merges two documents, left-biased.
///
/// Objects merge key-by-key; on a scalar or list conflict the left value
/// wins. A `null` left value defers to the right.
pub fn deep_merge(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut out = l.clone();
            for (key, right_value) in r {
                let merged = match out.get(key) {
                    Some(left_value) => deep_merge(left_value, right_value),
                    None => right_value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        (Value::Null, _) => right.clone(),
        _ => left.clone(),
    }
}

fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = doc;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry.as_object_mut() {
            Some(next) => current = next,
            None => return,
        }
    }
}

fn get_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_objects() {
        let payload = Payload::new().set("body.query.bool.must", json!([{"term": {"a": 1}}]));
        assert_eq!(
            payload.into_value(),
            json!({"body": {"query": {"bool": {"must": [{"term": {"a": 1}}]}}}})
        );
    }

    #[test]
    fn test_set_preserves_siblings() {
        let payload = Payload::new()
            .set("body.query.bool.must.match_all", json!({}))
            .set("body.query.bool.filter.bool.must", json!([{"term": {"a": 1}}]));

        assert_eq!(payload.get("body.query.bool.must.match_all"), Some(&json!({})));
        assert_eq!(
            payload.get("body.query.bool.filter.bool.must"),
            Some(&json!([{"term": {"a": 1}}]))
        );
    }

    #[test]
    fn test_set_replaces_scalar_intermediates() {
        let payload = Payload::new()
            .set("body.size", 10)
            .set("body.size.inner", "x");
        assert_eq!(payload.get("body.size.inner"), Some(&json!("x")));
    }

    #[test]
    fn test_set_if_not_empty_drops_empty_values() {
        let payload = Payload::new()
            .set_if_not_empty("a", Value::Null)
            .set_if_not_empty("b", "")
            .set_if_not_empty("c", json!([]))
            .set_if_not_empty("d", json!({}))
            .set_if_not_empty("e", 0)
            .set_if_not_empty("f", false);
        assert_eq!(payload.into_value(), json!({}));
    }

    #[test]
    fn test_set_if_not_empty_keeps_content() {
        let payload = Payload::new()
            .set_if_not_empty("a", "x")
            .set_if_not_empty("b", json!([1]))
            .set_if_not_empty("c", true)
            .set_if_not_empty("d", 5);
        assert_eq!(payload.into_value(), json!({"a": "x", "b": [1], "c": true, "d": 5}));
    }

    #[test]
    fn test_set_if_not_null_preserves_zero_and_false() {
        let payload = Payload::new()
            .set_if_not_null("from", 0)
            .set_if_not_null("flag", false)
            .set_if_not_null("absent", Value::Null);
        assert_eq!(payload.into_value(), json!({"from": 0, "flag": false}));
    }

    #[test]
    fn test_get_with_default() {
        let payload = Payload::new().set("body.from", 3);
        assert_eq!(payload.get_or("body.from", json!([])), json!(3));
        assert_eq!(payload.get_or("body.missing", json!([])), json!([]));
        assert_eq!(payload.get("body.missing.deeper"), None);
    }

    #[test]
    fn test_merge_into_existing() {
        let payload = Payload::new()
            .set("body.mapping", json!({"a": {"type": "text"}}))
            .merge(
                "body.mapping",
                json!({"a": {"type": "keyword"}, "b": {"type": "integer"}}),
            );

        assert_eq!(
            payload.get("body.mapping"),
            Some(&json!({"a": {"type": "text"}, "b": {"type": "integer"}}))
        );
    }

    #[test]
    fn test_deep_merge_is_left_biased() {
        let merged = deep_merge(
            &json!({"a": {"type": "text"}}),
            &json!({"a": {"type": "keyword"}, "b": {"type": "integer"}}),
        );
        assert_eq!(merged, json!({"a": {"type": "text"}, "b": {"type": "integer"}}));
    }

    #[test]
    fn test_deep_merge_replaces_lists() {
        let merged = deep_merge(&json!({"tags": [1, 2]}), &json!({"tags": [3]}));
        assert_eq!(merged, json!({"tags": [1, 2]}));

        let merged = deep_merge(&json!({}), &json!({"tags": [3]}));
        assert_eq!(merged, json!({"tags": [3]}));
    }

    #[test]
    fn test_deep_merge_null_defers_to_right() {
        let merged = deep_merge(&Value::Null, &json!({"a": 1}));
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn test_deep_merge_nested_recursion() {
        let merged = deep_merge(
            &json!({"properties": {"name": {"type": "text", "analyzer": "standard"}}}),
            &json!({"properties": {"name": {"boost": 2}, "price": {"type": "float"}}}),
        );
        assert_eq!(
            merged,
            json!({"properties": {
                "name": {"type": "text", "analyzer": "standard", "boost": 2},
                "price": {"type": "float"}
            }})
        );
    }
}
