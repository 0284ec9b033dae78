//! Column-level issues for a generated query

use crate::matcher::{identify_column, match_field_to_column, SynonymRegistry};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAlternate {
    pub column: String,
    pub alternate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlIssues {
    pub missing_columns: Vec<String>,
    pub alternates: Vec<ColumnAlternate>,
}

impl SqlIssues {
    pub fn is_clean(&self) -> bool {
        self.missing_columns.is_empty() && self.alternates.is_empty()
    }
}

fn find_alternate(
    registry: &SynonymRegistry,
    requested: &str,
    available: &[String],
) -> Option<String> {
    // a recognised field carries its synonyms into the search
    let field_id = identify_column(registry, requested)
        .map(|identified| identified.field_id)
        .unwrap_or_else(|| requested.to_lowercase());
    let result = match_field_to_column(registry, &field_id, available, Some(requested));
    if result.matched {
        debug!(
            "Column {} -> {:?} ({:?}, {:.2})",
            requested, result.column, result.method, result.confidence
        );
    }
    result.column
}

/// Split requested columns that do not exist into substitutable and missing
pub fn find_sql_issues(
    registry: &SynonymRegistry,
    requested_columns: &[String],
    available_columns: &[String],
) -> SqlIssues {
    let mut issues = SqlIssues::default();
    for requested in requested_columns {
        let requested = requested.trim();
        if requested.is_empty()
            || available_columns.iter().any(|c| c.trim().eq_ignore_ascii_case(requested))
        {
            continue;
        }
        match find_alternate(registry, requested, available_columns) {
            Some(alternate) => issues.alternates.push(ColumnAlternate {
                column: requested.to_string(),
                alternate,
            }),
            None => issues.missing_columns.push(requested.to_string()),
        }
    }
    issues
}

/// Substitute each alternate for its missing column, as a whole identifier
pub fn apply_column_alternates(sql: &str, issues: &SqlIssues) -> String {
    let mut rewritten = sql.to_string();
    for ColumnAlternate { column, alternate } in &issues.alternates {
        let Ok(re) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(column))) else {
            continue;
        };
        rewritten = re.replace_all(&rewritten, NoExpand(alternate)).into_owned();
    }
    rewritten
}
