//! Column/Field Matcher
//!
//! Resolves a logical field id onto one of the physical columns that actually
//! exist, reporting which strategy succeeded and how confident it is. The
//! cascade tries, in order:
//! 1. the expected MDLH column, exactly
//! 2. any registered synonym, exactly
//! 3. the normalized field id against normalized columns
//! 4. any normalized synonym against normalized columns
//! 5. the single best fuzzy candidate, if similar enough
//!
//! The first strategy that finds a column wins, so confidence always follows the
//! strategy priority.

pub mod category;
pub mod normalize;
pub mod similarity;
pub mod synonyms;

pub use category::infer_column_category;
pub use normalize::normalize_column_name;
pub use similarity::calculate_similarity;
pub use synonyms::SynonymRegistry;

use crate::catalog::FieldDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

pub const CONFIDENCE_EXACT: f64 = 1.0;
pub const CONFIDENCE_SYNONYM_EXACT: f64 = 0.95;
pub const CONFIDENCE_NORMALIZED: f64 = 0.85;
pub const CONFIDENCE_SYNONYM_NORMALIZED: f64 = 0.80;
/// Fuzzy similarity is scaled down so it can never outrank a deterministic match
pub const FUZZY_WEIGHT: f64 = 0.8;
/// Minimum raw similarity for a fuzzy candidate to count as a match
pub const FUZZY_THRESHOLD: f64 = 0.7;

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ExactMdlh,
    SynonymExact,
    Normalized,
    SynonymNormalized,
    FuzzyField,
    FuzzyExpected,
    FuzzySynonym,
    None,
}

impl MatchMethod {
    pub fn is_fuzzy(&self) -> bool {
        matches!(
            self,
            MatchMethod::FuzzyField | MatchMethod::FuzzyExpected | MatchMethod::FuzzySynonym
        )
    }

    /// Exact strategies need no human review
    pub fn is_exact(&self) -> bool {
        matches!(self, MatchMethod::ExactMdlh | MatchMethod::SynonymExact)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatchResult {
    pub matched: bool,
    pub column: Option<String>,
    pub confidence: f64,
    pub method: MatchMethod,
}

impl ColumnMatchResult {
    fn found(column: &str, confidence: f64, method: MatchMethod) -> Self {
        Self {
            matched: true,
            column: Some(column.to_string()),
            confidence,
            method,
        }
    }

    pub fn none() -> Self {
        Self {
            matched: false,
            column: None,
            confidence: 0.0,
            method: MatchMethod::None,
        }
    }
}

fn find_exact<'a>(target: &str, columns: &'a [String]) -> Option<&'a String> {
    let target = target.trim();
    columns.iter().find(|c| c.trim().eq_ignore_ascii_case(target))
}

fn find_normalized<'a>(
    target: &str,
    normalized_columns: &[(String, &'a String)],
) -> Option<&'a String> {
    let target = normalize_column_name(target);
    if target.is_empty() {
        return None;
    }
    normalized_columns
        .iter()
        .find(|(norm, _)| *norm == target)
        .map(|(_, original)| *original)
}

/// Match one logical field against the available physical columns.
///
/// `expected_column` is the canonical MDLH column for the field, if known.
/// The returned column is spelled exactly as it appears in `column_names`.
pub fn match_field_to_column(
    registry: &SynonymRegistry,
    field_id: &str,
    column_names: &[String],
    expected_column: Option<&str>,
) -> ColumnMatchResult {
    if column_names.is_empty() {
        return ColumnMatchResult::none();
    }
    let synonyms = registry.synonyms(field_id);

    if let Some(expected) = expected_column {
        if let Some(column) = find_exact(expected, column_names) {
            return ColumnMatchResult::found(column, CONFIDENCE_EXACT, MatchMethod::ExactMdlh);
        }
    }

    for synonym in synonyms {
        if let Some(column) = find_exact(synonym, column_names) {
            return ColumnMatchResult::found(
                column,
                CONFIDENCE_SYNONYM_EXACT,
                MatchMethod::SynonymExact,
            );
        }
    }

    let normalized_columns: Vec<(String, &String)> = column_names
        .iter()
        .map(|c| (normalize_column_name(c), c))
        .collect();

    if let Some(column) = find_normalized(field_id, &normalized_columns) {
        return ColumnMatchResult::found(column, CONFIDENCE_NORMALIZED, MatchMethod::Normalized);
    }

    for synonym in synonyms {
        if let Some(column) = find_normalized(synonym, &normalized_columns) {
            return ColumnMatchResult::found(
                column,
                CONFIDENCE_SYNONYM_NORMALIZED,
                MatchMethod::SynonymNormalized,
            );
        }
    }

    let mut candidates: Vec<(&str, MatchMethod)> = vec![(field_id, MatchMethod::FuzzyField)];
    if let Some(expected) = expected_column {
        candidates.push((expected, MatchMethod::FuzzyExpected));
    }
    candidates.extend(synonyms.iter().map(|s| (s.as_str(), MatchMethod::FuzzySynonym)));

    let mut best: Option<(&String, f64, MatchMethod)> = None;
    for (candidate, method) in &candidates {
        for column in column_names {
            let score = calculate_similarity(candidate, column);
            if best.map_or(true, |(_, best_score, _)| score > best_score) {
                best = Some((column, score, *method));
            }
        }
    }

    match best {
        Some((column, score, method)) if score >= FUZZY_THRESHOLD => {
            debug!(
                "Fuzzy match for '{}': {} (similarity {:.2})",
                field_id, column, score
            );
            ColumnMatchResult::found(column, score * FUZZY_WEIGHT, method)
        }
        _ => ColumnMatchResult::none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldColumnMatch {
    pub field_id: String,
    pub column: String,
    pub confidence: f64,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBuckets {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unmatched: usize,
}

impl ConfidenceBuckets {
    fn record(&mut self, confidence: f64, matched: bool) {
        if !matched {
            self.unmatched += 1;
        } else if confidence >= 0.9 {
            self.high += 1;
        } else if confidence >= 0.7 {
            self.medium += 1;
        } else if confidence >= 0.5 {
            self.low += 1;
        } else {
            self.unmatched += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatchReport {
    pub matched: Vec<FieldColumnMatch>,
    pub unmatched_fields: Vec<String>,
    /// Physical columns no field claimed, in input order
    pub unmatched_columns: Vec<String>,
    pub stats: ConfidenceBuckets,
}

/// Run the cascade for every field in a catalog
pub fn match_catalog_to_columns(
    registry: &SynonymRegistry,
    field_catalog: &[FieldDefinition],
    column_names: &[String],
) -> CatalogMatchReport {
    let mut matched = Vec::new();
    let mut unmatched_fields = Vec::new();
    let mut stats = ConfidenceBuckets::default();
    let mut claimed: HashSet<String> = HashSet::new();

    for field in field_catalog {
        let result =
            match_field_to_column(registry, &field.id, column_names, field.expected_column());
        stats.record(result.confidence, result.matched);
        match result.column {
            Some(column) => {
                claimed.insert(column.clone());
                matched.push(FieldColumnMatch {
                    field_id: field.id.clone(),
                    column,
                    confidence: result.confidence,
                    method: result.method,
                });
            }
            None => unmatched_fields.push(field.id.clone()),
        }
    }

    let unmatched_columns = column_names
        .iter()
        .filter(|c| !claimed.contains(*c))
        .cloned()
        .collect();

    CatalogMatchReport {
        matched,
        unmatched_fields,
        unmatched_columns,
        stats,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnIdentification {
    pub field_id: String,
    pub confidence: f64,
    pub method: MatchMethod,
}

/// Inverse lookup: which logical field does this physical column most likely hold?
pub fn identify_column(
    registry: &SynonymRegistry,
    column_name: &str,
) -> Option<ColumnIdentification> {
    let upper = column_name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let identified = |field_id: &str, confidence: f64, method: MatchMethod| ColumnIdentification {
        field_id: field_id.to_string(),
        confidence,
        method,
    };

    for (field_id, _) in registry.iter() {
        if field_id.to_uppercase() == upper {
            return Some(identified(field_id, CONFIDENCE_EXACT, MatchMethod::ExactMdlh));
        }
    }
    for (field_id, synonyms) in registry.iter() {
        if synonyms.iter().any(|s| *s == upper) {
            return Some(identified(field_id, CONFIDENCE_SYNONYM_EXACT, MatchMethod::SynonymExact));
        }
    }

    let normalized = normalize_column_name(&upper);
    for (field_id, _) in registry.iter() {
        if normalize_column_name(field_id) == normalized {
            return Some(identified(field_id, CONFIDENCE_NORMALIZED, MatchMethod::Normalized));
        }
    }
    for (field_id, synonyms) in registry.iter() {
        if synonyms.iter().any(|s| normalize_column_name(s) == normalized) {
            return Some(identified(
                field_id,
                CONFIDENCE_SYNONYM_NORMALIZED,
                MatchMethod::SynonymNormalized,
            ));
        }
    }

    let mut best: Option<(&str, f64, MatchMethod)> = None;
    for (field_id, synonyms) in registry.iter() {
        let field_score = calculate_similarity(field_id, &upper);
        if best.map_or(true, |(_, s, _)| field_score > s) {
            best = Some((field_id, field_score, MatchMethod::FuzzyField));
        }
        for synonym in synonyms {
            let score = calculate_similarity(synonym, &upper);
            if best.map_or(true, |(_, s, _)| score > s) {
                best = Some((field_id, score, MatchMethod::FuzzySynonym));
            }
        }
    }

    best.filter(|(_, score, _)| *score >= FUZZY_THRESHOLD)
        .map(|(field_id, score, method)| identified(field_id, score * FUZZY_WEIGHT, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldCategory, FieldDefinition};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_synonym_exact_scenario() {
        let registry = SynonymRegistry::with_defaults();
        let result = match_field_to_column(
            &registry,
            "owner_users",
            &cols(&["OWNER", "DESC", "CERT_STATUS"]),
            None,
        );
        assert_eq!(
            result,
            ColumnMatchResult {
                matched: true,
                column: Some("OWNER".to_string()),
                confidence: 0.95,
                method: MatchMethod::SynonymExact,
            }
        );
    }

    #[test]
    fn test_expected_column_beats_synonym() {
        let registry = SynonymRegistry::with_defaults();
        let result = match_field_to_column(
            &registry,
            "owner_users",
            &cols(&["OWNER", "owner_users"]),
            Some("OWNER_USERS"),
        );
        assert_eq!(result.method, MatchMethod::ExactMdlh);
        assert_eq!(result.column.as_deref(), Some("owner_users"));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_normalized_beats_synonym_normalized() {
        let mut registry = SynonymRegistry::empty();
        registry.add_field_synonyms("widget_count", &["GADGET"]);
        // field stem WIDGET and synonym stem GADGET both present
        let result = match_field_to_column(
            &registry,
            "widget_count",
            &cols(&["SRC_GADGETS", "DIM_WIDGET_ID"]),
            None,
        );
        assert_eq!(result.method, MatchMethod::Normalized);
        assert_eq!(result.column.as_deref(), Some("DIM_WIDGET_ID"));
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_synonym_normalized() {
        let mut registry = SynonymRegistry::empty();
        registry.add_field_synonyms("widget_count", &["GADGET"]);
        let result =
            match_field_to_column(&registry, "widget_count", &cols(&["SRC_GADGETS"]), None);
        assert_eq!(result.method, MatchMethod::SynonymNormalized);
        assert_eq!(result.confidence, 0.80);
    }

    #[test]
    fn test_fuzzy_match_scaled() {
        let registry = SynonymRegistry::empty();
        let columns = cols(&["CERTIFICAT", "GUID"]);
        let result = match_field_to_column(&registry, "certificate", &columns, None);
        assert!(result.matched);
        assert_eq!(result.method, MatchMethod::FuzzyField);
        assert_eq!(result.column.as_deref(), Some("CERTIFICAT"));
        let expected = calculate_similarity("certificate", "CERTIFICAT") * FUZZY_WEIGHT;
        assert!((result.confidence - expected).abs() < 1e-9);
        assert!(result.confidence < CONFIDENCE_SYNONYM_NORMALIZED);
    }

    #[test]
    fn test_no_match() {
        let registry = SynonymRegistry::with_defaults();
        let columns = cols(&["GUID", "ZZZ"]);
        let result = match_field_to_column(&registry, "popularity_score", &columns, None);
        assert_eq!(result, ColumnMatchResult::none());
        let empty = match_field_to_column(&registry, "guid", &[], Some("GUID"));
        assert!(!empty.matched);
    }

    #[test]
    fn test_added_synonyms_visible_immediately() {
        let mut registry = SynonymRegistry::with_defaults();
        let columns = cols(&["STEWARD_LIST"]);
        let before = match_field_to_column(&registry, "owner_users", &columns, None);
        assert_ne!(before.method, MatchMethod::SynonymExact);

        registry.add_field_synonyms("owner_users", &["steward_list"]);
        let after = match_field_to_column(&registry, "owner_users", &columns, None);
        assert_eq!(after.method, MatchMethod::SynonymExact);
        assert_eq!(after.column.as_deref(), Some("STEWARD_LIST"));
    }

    #[test]
    fn test_catalog_report() {
        let registry = SynonymRegistry::with_defaults();
        let catalog = vec![
            FieldDefinition::new("guid", "GUID", "", FieldCategory::Identity, &["GUID"]),
            FieldDefinition::new(
                "owner_users",
                "Owners",
                "",
                FieldCategory::Ownership,
                &["OWNER_USERS"],
            ),
            FieldDefinition::new(
                "popularity_score",
                "Pop",
                "",
                FieldCategory::Usage,
                &["POPULARITY_SCORE"],
            ),
        ];
        let columns = cols(&["GUID", "OWNER", "EXTRA_COL"]);
        let report = match_catalog_to_columns(&registry, &catalog, &columns);

        assert_eq!(report.matched.len(), 2);
        assert_eq!(report.unmatched_fields, vec!["popularity_score".to_string()]);
        assert_eq!(report.unmatched_columns, vec!["EXTRA_COL".to_string()]);
        assert_eq!(report.stats.high, 2);
        assert_eq!(report.stats.unmatched, 1);
    }

    #[test]
    fn test_identify_column() {
        let registry = SynonymRegistry::with_defaults();

        let by_synonym = identify_column(&registry, "ownerusers").unwrap();
        assert_eq!(by_synonym.field_id, "owner_users");
        assert_eq!(by_synonym.method, MatchMethod::SynonymExact);

        let by_id = identify_column(&registry, "GUID").unwrap();
        assert_eq!(by_id.method, MatchMethod::ExactMdlh);

        assert!(identify_column(&registry, "QQQQQQQQ").is_none());
    }
}
