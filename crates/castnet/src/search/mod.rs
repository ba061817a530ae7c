//! Search request description, pluggable rules, and payload translation.

pub mod request;
pub mod rule;
pub mod translator;

pub use request::{BoolClause, SearchRequest, SortOrder};
pub use rule::{MatchAllRule, Rule, RuleFactory, SearchRule};
pub use translator::{CandidatePayload, build_payload_collection};
