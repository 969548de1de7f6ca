//! In-process reference implementation of the store seam.
//!
//! [`MemoryStore`] interprets exactly the stage vocabulary the builder
//! emits: autocomplete compound search, geo-radius search, `$in` /
//! `$gte` / `$lte` / `$and` match operators over the entity fields the
//! translation layer names, multi-key sorts, and skip/limit windows.
//! Tests use it to prove the pushed-down match path and
//! [`FilterSpec::passes`](tablescout_core::FilterSpec::passes) agree;
//! the CLI uses it to run discovery over a JSON entity file.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Duration;

use serde_json::Value;

use tablescout_core::geo::{clamp_coordinate, distance_km};
use tablescout_core::{Entity, EntityStore, SortKey, SortOrder, Stage, StoreError, sanitise_score};

/// A store over an owned entity list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entities: Vec<Entity>,
}

fn rejected(reason: impl Into<String>) -> StoreError {
    StoreError::RejectedPipeline {
        reason: reason.into(),
    }
}

impl MemoryStore {
    /// Creates a store over the given entities.
    #[must_use]
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Number of entities held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn run_pipeline(
        &self,
        pipeline: &[Stage],
        timeout: Option<Duration>,
    ) -> Result<Vec<Entity>, StoreError> {
        // The in-process scan is effectively instant; an exhausted
        // budget is the only way to time out.
        if timeout.is_some_and(|budget| budget.is_zero()) {
            return Err(StoreError::Timeout);
        }

        let mut rows = self.entities.clone();
        for (position, stage) in pipeline.iter().enumerate() {
            match stage {
                Stage::Search(document) => {
                    if position != 0 {
                        return Err(rejected("search must be the first pipeline stage"));
                    }
                    rows = apply_search(rows, document)?;
                }
                Stage::Match(document) => {
                    let mut kept = Vec::with_capacity(rows.len());
                    for row in rows {
                        if matches_document(&row, document)? {
                            kept.push(row);
                        }
                    }
                    rows = kept;
                }
                Stage::Sort(keys) => sort_rows(&mut rows, keys),
                Stage::Skip(count) => {
                    let skip = usize::try_from(*count).unwrap_or(usize::MAX);
                    rows = rows.into_iter().skip(skip).collect();
                }
                Stage::Limit(count) => {
                    rows.truncate(usize::try_from(*count).unwrap_or(usize::MAX));
                }
                // Entities are returned whole; projections only trim
                // wire payloads on a remote store.
                Stage::Project(_) => {}
            }
        }
        Ok(rows)
    }
}

fn apply_search(rows: Vec<Entity>, document: &Value) -> Result<Vec<Entity>, StoreError> {
    if let Some(geo_within) = document.get("geoWithin") {
        apply_geo_search(rows, geo_within)
    } else if let Some(compound) = document.get("compound") {
        apply_text_search(rows, compound)
    } else {
        Err(rejected("unsupported search document"))
    }
}

fn apply_geo_search(rows: Vec<Entity>, geo_within: &Value) -> Result<Vec<Entity>, StoreError> {
    let lat = geo_within
        .pointer("/center/lat")
        .and_then(Value::as_f64)
        .ok_or_else(|| rejected("geoWithin search requires a centre latitude"))?;
    let lng = geo_within
        .pointer("/center/lng")
        .and_then(Value::as_f64)
        .ok_or_else(|| rejected("geoWithin search requires a centre longitude"))?;
    let radius_km = geo_within
        .get("radiusKm")
        .and_then(Value::as_f64)
        .ok_or_else(|| rejected("geoWithin search requires a radius"))?;

    let center = clamp_coordinate(lat, lng);
    Ok(rows
        .into_iter()
        .filter(|entity| {
            entity
                .location
                .is_some_and(|location| distance_km(location, center) <= radius_km)
        })
        .collect())
}

fn apply_text_search(rows: Vec<Entity>, compound: &Value) -> Result<Vec<Entity>, StoreError> {
    let minimum = compound
        .get("minimumShouldMatch")
        .and_then(Value::as_u64)
        .unwrap_or(1);
    let clauses = compound
        .get("should")
        .and_then(Value::as_array)
        .ok_or_else(|| rejected("compound search requires a should array"))?
        .clone();

    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let mut matched = 0_u64;
        for clause in &clauses {
            if autocomplete_matches(&row, clause)? {
                matched += 1;
            }
        }
        if matched >= minimum {
            kept.push(row);
        }
    }
    Ok(kept)
}

/// Autocomplete semantics: any whitespace-separated token of the field
/// value starts with the query, case-insensitively.
fn autocomplete_matches(entity: &Entity, clause: &Value) -> Result<bool, StoreError> {
    let query = clause
        .pointer("/autocomplete/query")
        .and_then(Value::as_str)
        .ok_or_else(|| rejected("autocomplete clause requires a query"))?;
    let path = clause
        .pointer("/autocomplete/path")
        .and_then(Value::as_str)
        .ok_or_else(|| rejected("autocomplete clause requires a path"))?;

    let needle = query.to_lowercase();
    Ok(text_values(entity, path)
        .iter()
        .any(|value| token_prefix_match(value, &needle)))
}

fn text_values<'entity>(entity: &'entity Entity, path: &str) -> Vec<&'entity str> {
    match path {
        "name" => vec![entity.name.as_str()],
        "neighborhood" => entity.neighborhood.as_deref().into_iter().collect(),
        "categories" => entity.categories.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

fn token_prefix_match(value: &str, lowercased_query: &str) -> bool {
    value
        .split_whitespace()
        .any(|token| token.to_lowercase().starts_with(lowercased_query))
}

fn matches_document(entity: &Entity, document: &Value) -> Result<bool, StoreError> {
    let Some(object) = document.as_object() else {
        return Err(rejected("match document must be an object"));
    };
    for (field, condition) in object {
        let fulfilled = if field == "$and" {
            let clauses = condition
                .as_array()
                .ok_or_else(|| rejected("$and requires an array of clauses"))?;
            let mut all = true;
            for clause in clauses {
                if !matches_document(entity, clause)? {
                    all = false;
                    break;
                }
            }
            all
        } else {
            field_condition(entity, field, condition)?
        };
        if !fulfilled {
            return Ok(false);
        }
    }
    Ok(true)
}

fn field_condition(entity: &Entity, field: &str, condition: &Value) -> Result<bool, StoreError> {
    if let Some(operators) = condition.as_object() {
        if operators.keys().any(|key| key.starts_with('$')) {
            for (operator, operand) in operators {
                let fulfilled = match operator.as_str() {
                    "$in" => in_condition(entity, field, operand)?,
                    "$gte" => compare_condition(entity, field, operand, Ordering::is_ge)?,
                    "$lte" => compare_condition(entity, field, operand, Ordering::is_le)?,
                    "$eq" => equality_condition(entity, field, operand)?,
                    other => return Err(rejected(format!("unsupported operator {other}"))),
                };
                if !fulfilled {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }
    equality_condition(entity, field, condition)
}

fn string_set<'entity>(entity: &'entity Entity, field: &str) -> Option<&'entity BTreeSet<String>> {
    match field {
        "categories" => Some(&entity.categories),
        "customTags" => Some(&entity.custom_tags),
        "creatorIds" => Some(&entity.creator_ids),
        "publications" => Some(&entity.publications),
        "awards" => Some(&entity.awards),
        _ => None,
    }
}

fn in_condition(entity: &Entity, field: &str, operand: &Value) -> Result<bool, StoreError> {
    let candidates = operand
        .as_array()
        .ok_or_else(|| rejected("$in requires an array operand"))?;

    if field == "priceLevel" {
        return Ok(candidates
            .iter()
            .filter_map(Value::as_u64)
            .any(|level| level == u64::from(entity.price_level)));
    }
    if field == "id" {
        return Ok(candidates
            .iter()
            .filter_map(Value::as_str)
            .any(|id| id == entity.id));
    }
    if let Some(values) = string_set(entity, field) {
        return Ok(candidates
            .iter()
            .filter_map(Value::as_str)
            .any(|candidate| values.contains(candidate)));
    }
    Err(rejected(format!("field {field} does not support $in")))
}

fn numeric_field(entity: &Entity, field: &str) -> Option<f64> {
    if let Some(source) = field.strip_prefix("ratings.") {
        return Some(entity.ratings.get(source).copied().unwrap_or(0.0));
    }
    match field {
        "priceLevel" => Some(f64::from(entity.price_level)),
        "qualityScore" => Some(sanitise_score(entity.quality_score)),
        "percentMatch" => Some(sanitise_score(entity.percent_match)),
        _ => None,
    }
}

fn compare_condition(
    entity: &Entity,
    field: &str,
    operand: &Value,
    accept: fn(Ordering) -> bool,
) -> Result<bool, StoreError> {
    let threshold = operand
        .as_f64()
        .ok_or_else(|| rejected("comparison operators require a numeric operand"))?;
    let value = numeric_field(entity, field)
        .ok_or_else(|| rejected(format!("field {field} is not numeric")))?;
    Ok(accept(value.total_cmp(&threshold)))
}

fn equality_condition(entity: &Entity, field: &str, operand: &Value) -> Result<bool, StoreError> {
    match field {
        "id" => Ok(operand.as_str() == Some(entity.id.as_str())),
        "reservable" => Ok(operand.as_bool() == Some(entity.reservable)),
        "favorited" => Ok(operand.as_bool() == Some(entity.favorited)),
        _ => Err(rejected(format!("field {field} does not support equality"))),
    }
}

fn compare_field(a: &Entity, b: &Entity, field: &str) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "createdAt" => a.created_at.cmp(&b.created_at),
        "priceLevel" => a.price_level.cmp(&b.price_level),
        "qualityScore" => {
            sanitise_score(a.quality_score).total_cmp(&sanitise_score(b.quality_score))
        }
        "percentMatch" => sanitise_score(a.percent_match).total_cmp(&sanitise_score(b.percent_match)),
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Entity], keys: &[SortKey]) {
    rows.sort_by(|a, b| {
        for key in keys {
            let ordering = match key.order {
                SortOrder::Ascending => compare_field(a, b, &key.field),
                SortOrder::Descending => compare_field(a, b, &key.field).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}
