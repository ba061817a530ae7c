//! Pluggable search rules.
//!
//! A rule decides whether it applies to a request and, when it does,
//! contributes the query fragment (and optionally a highlight fragment) of
//! one candidate payload. Rules must be side-effect-free and idempotent:
//! building fragments twice from the same request yields identical
//! documents.

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::search::request::SearchRequest;

/// A plain transformation rule: request in, query fragment out.
pub type QueryFn = Arc<dyn Fn(&SearchRequest) -> Value + Send + Sync>;

/// A stateful rule instantiated per request.
///
/// `is_applicable` is a pure function of the request the rule was built
/// from; an inapplicable rule contributes no candidate payload at all.
pub trait SearchRule: Send + Sync {
    /// Whether this rule applies to the request it was instantiated with.
    fn is_applicable(&self) -> bool {
        true
    }

    /// The query fragment this rule contributes.
    fn query_fragment(&self) -> Value;

    /// The highlight fragment this rule contributes. May be empty.
    fn highlight_fragment(&self) -> Value {
        Value::Null
    }
}

/// Builds a [`SearchRule`] instance for a concrete request.
pub trait RuleFactory: Send + Sync {
    /// Instantiates the rule against `request`.
    fn instantiate(&self, request: &SearchRequest) -> Box<dyn SearchRule>;
}

/// A search rule, resolved once per translation by pattern match.
#[derive(Clone)]
pub enum Rule {
    /// A plain transformation function producing a query fragment directly.
    /// Function rules are always applicable and contribute no highlight.
    Function(QueryFn),
    /// A stateful rule object, instantiated with the request and consulted
    /// for applicability before contributing fragments.
    Stateful(Arc<dyn RuleFactory>),
}

impl Rule {
    /// Wraps a plain transformation function.
    pub fn function(f: impl Fn(&SearchRequest) -> Value + Send + Sync + 'static) -> Self {
        Rule::Function(Arc::new(f))
    }

    /// Wraps a stateful rule factory.
    pub fn stateful(factory: impl RuleFactory + 'static) -> Self {
        Rule::Stateful(Arc::new(factory))
    }

    /// The built-in fallback rule matching every document.
    pub fn match_all() -> Self {
        Rule::stateful(MatchAllRule)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Function(_) => f.write_str("Rule::Function"),
            Rule::Stateful(_) => f.write_str("Rule::Stateful"),
        }
    }
}

/// The default rule used when neither the request nor its entity configure
/// any: match every document.
pub struct MatchAllRule;

impl SearchRule for MatchAllRule {
    fn query_fragment(&self) -> Value {
        json!({"bool": {"must": {"match_all": {}}}})
    }
}

impl RuleFactory for MatchAllRule {
    fn instantiate(&self, _request: &SearchRequest) -> Box<dyn SearchRule> {
        Box::new(MatchAllRule)
    }
}
