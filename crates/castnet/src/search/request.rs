//! Search request description and fluent builder.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::error::EngineResult;
use crate::index::SearchableEntity;
use crate::search::rule::Rule;

/// Boolean clause types a filter may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoolClause {
    Must,
    MustNot,
    Should,
    Filter,
}

impl BoolClause {
    /// The wire-format name of the clause.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolClause::Must => "must",
            BoolClause::MustNot => "must_not",
            BoolClause::Should => "should",
            BoolClause::Filter => "filter",
        }
    }
}

/// Sort direction for [`SearchRequest::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A raw override: when set, translation is bypassed entirely and the
/// callback's result document is returned as the search outcome.
pub type RawCallback = Arc<dyn Fn(&SearchRequest) -> EngineResult<Value> + Send + Sync>;

/// One search operation's immutable description.
///
/// Built fluently, then handed to the engine. Pagination mutation for
/// `paginate` happens before translation by rebuilding `from`/`size` through
/// the same builder methods.
#[derive(Clone)]
pub struct SearchRequest {
    pub(crate) entity: Arc<dyn SearchableEntity>,
    /// The free-text query string.
    pub query: String,
    /// Explicit rules; when empty, the entity's configured rules apply, and
    /// failing that a single built-in match-all rule.
    pub rules: Vec<Rule>,
    /// Filter clauses partitioned by boolean clause type, in insertion
    /// order per clause.
    pub wheres: BTreeMap<BoolClause, Vec<Value>>,
    /// Sort directives in wire format.
    pub orders: Vec<Value>,
    /// Field-selection list (`_source`).
    pub select: Vec<String>,
    /// Result offset. Zero is meaningful and preserved.
    pub from: Option<u64>,
    /// Result window size. Zero is meaningful and preserved.
    pub size: Option<u64>,
    /// Diagnostic flag: request scoring explanation.
    pub explain: Option<bool>,
    /// Diagnostic flag: request query profiling.
    pub profile: Option<bool>,
    /// Result-collapsing field.
    pub collapse: Option<String>,
    /// Raw override bypassing translation.
    pub callback: Option<RawCallback>,
}

impl SearchRequest {
    /// Creates a request against `entity` with the given free-text query.
    pub fn new(entity: Arc<dyn SearchableEntity>, query: impl Into<String>) -> Self {
        Self {
            entity,
            query: query.into(),
            rules: Vec::new(),
            wheres: BTreeMap::new(),
            orders: Vec::new(),
            select: Vec::new(),
            from: None,
            size: None,
            explain: None,
            profile: None,
            collapse: None,
            callback: None,
        }
    }

    /// The target entity.
    pub fn entity(&self) -> &Arc<dyn SearchableEntity> {
        &self.entity
    }

    /// Adds an explicit rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replaces the explicit rule list.
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    /// Appends a filter document to the given boolean clause.
    pub fn filter(mut self, clause: BoolClause, filter: Value) -> Self {
        self.wheres.entry(clause).or_default().push(filter);
        self
    }

    /// Appends a `term` filter to the `must` clause.
    pub fn where_term(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(BoolClause::Must, clause::term(field, value))
    }

    /// Appends a `terms` filter to the `must` clause.
    pub fn where_in(self, field: &str, values: Vec<Value>) -> Self {
        self.filter(BoolClause::Must, clause::terms(field, values))
    }

    /// Appends a `term` filter to the `must_not` clause.
    pub fn where_not(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(BoolClause::MustNot, clause::term(field, value))
    }

    /// Adds a sort directive on `field`.
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        let mut directive = Map::new();
        directive.insert(field.to_string(), json!({"order": order.as_str()}));
        self.orders.push(Value::Object(directive));
        self
    }

    /// Restricts returned fields.
    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.select = fields;
        self
    }

    /// Sets the result offset.
    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the result window size.
    pub fn take(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Collapses results on `field`.
    pub fn collapse(mut self, field: impl Into<String>) -> Self {
        self.collapse = Some(field.into());
        self
    }

    /// Requests a scoring explanation.
    pub fn explain(mut self) -> Self {
        self.explain = Some(true);
        self
    }

    /// Requests query profiling.
    pub fn profile(mut self) -> Self {
        self.profile = Some(true);
        self
    }

    /// Installs a raw override bypassing translation.
    pub fn callback(
        mut self,
        callback: impl Fn(&SearchRequest) -> EngineResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }
}

/// Wire-format filter clause constructors.
pub mod clause {
    use super::*;

    /// `{"term": {field: value}}`
    pub fn term(field: &str, value: impl Into<Value>) -> Value {
        let mut inner = Map::new();
        inner.insert(field.to_string(), value.into());
        json!({"term": Value::Object(inner)})
    }

    /// `{"terms": {field: values}}`
    pub fn terms(field: &str, values: Vec<Value>) -> Value {
        let mut inner = Map::new();
        inner.insert(field.to_string(), Value::Array(values));
        json!({"terms": Value::Object(inner)})
    }

    /// `{"range": {field: bounds}}`, e.g. bounds `{"gte": 10, "lt": 20}`.
    pub fn range(field: &str, bounds: Value) -> Value {
        let mut inner = Map::new();
        inner.insert(field.to_string(), bounds);
        json!({"range": Value::Object(inner)})
    }

    /// `{"exists": {"field": field}}`
    pub fn exists(field: &str) -> Value {
        json!({"exists": {"field": field}})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::testing::entity_fixture;

    #[test]
    fn test_filters_partition_by_clause() {
        let request = SearchRequest::new(entity_fixture(), "phone")
            .where_term("status", "active")
            .where_term("brand", "acme")
            .filter(BoolClause::Should, clause::exists("discount"));

        assert_eq!(request.wheres[&BoolClause::Must].len(), 2);
        assert_eq!(request.wheres[&BoolClause::Should].len(), 1);
        assert!(!request.wheres.contains_key(&BoolClause::MustNot));
    }

    #[test]
    fn test_clause_constructors() {
        assert_eq!(
            clause::term("status", "active"),
            json!({"term": {"status": "active"}})
        );
        assert_eq!(
            clause::terms("id", vec![json!(1), json!(2)]),
            json!({"terms": {"id": [1, 2]}})
        );
        assert_eq!(
            clause::range("price", json!({"gte": 10})),
            json!({"range": {"price": {"gte": 10}}})
        );
    }

    #[test]
    fn test_builder_accumulates() {
        let request = SearchRequest::new(entity_fixture(), "phone")
            .order_by("price", SortOrder::Desc)
            .select(vec!["id".to_string(), "name".to_string()])
            .from(0)
            .take(25)
            .collapse("brand")
            .explain();

        assert_eq!(request.orders, vec![json!({"price": {"order": "desc"}})]);
        assert_eq!(request.from, Some(0));
        assert_eq!(request.size, Some(25));
        assert_eq!(request.collapse.as_deref(), Some("brand"));
        assert_eq!(request.explain, Some(true));
        assert_eq!(request.profile, None);
    }
}
