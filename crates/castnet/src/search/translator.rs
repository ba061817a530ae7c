//! Translation of a search request into candidate wire payloads.
//!
//! One candidate is produced per applicable rule, in rule order. Ordering is
//! significant: the execution coordinator tries candidates sequentially and
//! earlier rules are presumed more specific. When every rule is inapplicable
//! the sequence is empty and callers treat that as "no results".

use serde_json::Value;

use crate::index::SearchableEntity;
use crate::payload::Payload;
use crate::search::request::SearchRequest;
use crate::search::rule::Rule;

/// One fully-formed request document produced from one applicable rule.
#[derive(Debug, Clone)]
pub struct CandidatePayload {
    doc: Value,
}

impl CandidatePayload {
    /// The target index name.
    pub fn index(&self) -> &str {
        self.doc.get("index").and_then(Value::as_str).unwrap_or("")
    }

    /// The request body.
    pub fn body(&self) -> Value {
        self.doc.get("body").cloned().unwrap_or(Value::Null)
    }

    /// The body reduced to its `query` key, for operations whose endpoint
    /// rejects search-only fields (count, delete-by-query).
    pub fn query_body(&self) -> Value {
        match self.doc.get("body").and_then(|b| b.get("query")) {
            Some(query) => serde_json::json!({"query": query}),
            None => serde_json::json!({}),
        }
    }

    /// The complete document, including index targeting.
    pub fn document(&self) -> &Value {
        &self.doc
    }
}

/// A payload pre-seeded with the entity's index targeting.
pub fn entity_payload(entity: &dyn SearchableEntity) -> Payload {
    Payload::new()
        .set("index", entity.configurator().name())
        .set("type", entity.searchable_as())
}

/// Translates `request` into an ordered sequence of candidate payloads.
///
/// `highlight` disables highlight fragments for operations that cannot use
/// them (count, delete-by-query).
pub fn build_payload_collection(request: &SearchRequest, highlight: bool) -> Vec<CandidatePayload> {
    let rules = resolve_rules(request);
    let mut bases = Vec::with_capacity(rules.len());

    for rule in &rules {
        let mut payload = entity_payload(request.entity.as_ref());

        match rule {
            Rule::Function(query_fn) => {
                payload = payload.set_if_not_empty("body.query", query_fn(request));
            }
            Rule::Stateful(factory) => {
                let rule = factory.instantiate(request);
                if !rule.is_applicable() {
                    continue;
                }
                payload = payload.set_if_not_empty("body.query", rule.query_fragment());
                if highlight {
                    payload = payload.set_if_not_empty("body.highlight", rule.highlight_fragment());
                }
            }
        }

        bases.push(payload);
    }

    bases
        .into_iter()
        .map(|payload| augment(payload, request))
        .collect()
}

fn resolve_rules(request: &SearchRequest) -> Vec<Rule> {
    if !request.rules.is_empty() {
        return request.rules.clone();
    }
    let entity_rules = request.entity.search_rules();
    if !entity_rules.is_empty() {
        return entity_rules;
    }
    vec![Rule::match_all()]
}

fn augment(mut payload: Payload, request: &SearchRequest) -> CandidatePayload {
    payload = payload
        .set_if_not_empty("body._source", request.select.clone())
        .set_if_not_empty(
            "body.collapse.field",
            request.collapse.clone().map_or(Value::Null, Value::from),
        )
        .set_if_not_empty("body.sort", request.orders.clone())
        .set_if_not_empty("body.explain", request.explain.map_or(Value::Null, Value::from))
        .set_if_not_empty("body.profile", request.profile.map_or(Value::Null, Value::from))
        .set_if_not_null("body.from", request.from.map_or(Value::Null, Value::from))
        .set_if_not_null("body.size", request.size.map_or(Value::Null, Value::from));

    for (clause, filters) in &request.wheres {
        let key = format!("body.query.bool.filter.bool.{}", clause.as_str());

        let mut combined = match payload.get_or(&key, Value::Array(Vec::new())) {
            Value::Array(existing) => existing,
            other => vec![other],
        };
        combined.extend(filters.iter().cloned());

        payload = payload.set_if_not_empty(&key, Value::Array(combined));
    }

    CandidatePayload {
        doc: payload.into_value(),
    }
}
