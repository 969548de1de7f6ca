//! Compound autocomplete text-search clause construction.
//!
//! A single multi-field clause would work for today's needs, but
//! compounding one autocomplete sub-clause per field path keeps
//! per-field weighting and future tuning modular.

use serde_json::{Value, json};

/// At least one `should` sub-clause must match for a document to be
/// returned; anything lower is meaningless for a query.
pub const DEFAULT_MINIMUM_SHOULD_MATCH: u64 = 1;

/// Builds a compound clause OR-ing one autocomplete sub-clause per
/// mapped field path.
///
/// Returns `None` when the trimmed query is empty or no field paths
/// are supplied. An empty search clause is invalid against the text
/// search engine, so callers short-circuit to an empty result instead.
///
/// # Examples
///
/// ```
/// use tablescout_query::text::{DEFAULT_MINIMUM_SHOULD_MATCH, compound_autocomplete};
///
/// let clause = compound_autocomplete("piz", &["name"], DEFAULT_MINIMUM_SHOULD_MATCH);
/// assert!(clause.is_some());
/// assert!(compound_autocomplete("   ", &["name"], DEFAULT_MINIMUM_SHOULD_MATCH).is_none());
/// ```
#[must_use]
pub fn compound_autocomplete(
    query: &str,
    field_paths: &[&str],
    minimum_should_match: u64,
) -> Option<Value> {
    let trimmed = query.trim();
    if trimmed.is_empty() || field_paths.is_empty() {
        return None;
    }

    let should: Vec<Value> = field_paths
        .iter()
        .map(|path| json!({ "autocomplete": { "query": trimmed, "path": path } }))
        .collect();

    Some(json!({
        "compound": {
            "should": should,
            "minimumShouldMatch": minimum_should_match,
        }
    }))
}

/// Builds a full search-stage document for the named search index,
/// delegating clause construction to [`compound_autocomplete`].
#[must_use]
pub fn search_stage(index: &str, query: &str, field_paths: &[&str]) -> Option<Value> {
    let clause = compound_autocomplete(query, field_paths, DEFAULT_MINIMUM_SHOULD_MATCH)?;
    let mut stage = json!({ "index": index });
    if let (Value::Object(target), Value::Object(source)) = (&mut stage, clause) {
        target.extend(source);
    }
    Some(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_queries_produce_no_clause(#[case] query: &str) {
        assert!(compound_autocomplete(query, &["name"], DEFAULT_MINIMUM_SHOULD_MATCH).is_none());
        assert!(search_stage("idx", query, &["name"]).is_none());
    }

    #[rstest]
    fn no_field_paths_produce_no_clause() {
        assert!(compound_autocomplete("soba", &[], DEFAULT_MINIMUM_SHOULD_MATCH).is_none());
    }

    #[rstest]
    fn clause_covers_each_field_path() {
        let clause = compound_autocomplete("soba", &["name", "neighborhood"], 1)
            .expect("non-blank query");
        let should = clause
            .pointer("/compound/should")
            .and_then(Value::as_array)
            .expect("should array");
        assert_eq!(should.len(), 2);
        assert_eq!(
            should.first().and_then(|c| c.pointer("/autocomplete/query")),
            Some(&json!("soba"))
        );
        assert_eq!(
            clause.pointer("/compound/minimumShouldMatch"),
            Some(&json!(1))
        );
    }

    #[rstest]
    fn query_is_trimmed_before_compilation() {
        let clause =
            compound_autocomplete("  soba  ", &["name"], 1).expect("non-blank query");
        assert_eq!(
            clause.pointer("/compound/should/0/autocomplete/query"),
            Some(&json!("soba"))
        );
    }

    #[rstest]
    fn search_stage_names_the_index() {
        let stage = search_stage("entity-search", "soba", &["name"]).expect("non-blank query");
        assert_eq!(stage.get("index"), Some(&json!("entity-search")));
        assert!(stage.get("compound").is_some());
    }
}
