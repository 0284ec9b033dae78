use crate::catalog::FieldCategory;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Tested in order; the first hit wins
    static ref CATEGORY_PATTERNS: Vec<(FieldCategory, Regex)> = vec![
        (
            FieldCategory::Ownership,
            Regex::new(r"OWNER|ADMIN|STEWARD|EXPERT|CREATED_?BY|UPDATED_?BY").unwrap(),
        ),
        (
            FieldCategory::Documentation,
            Regex::new(r"DESC|README|DOC|COMMENT|SUMMARY|DEFINITION").unwrap(),
        ),
        (FieldCategory::Glossary, Regex::new(r"TERM|GLOSSARY|MEANING|CATEGOR").unwrap()),
        (
            FieldCategory::Classification,
            Regex::new(r"TAG|CLASSIFICATION|PII|SENSITIV|LABEL").unwrap(),
        ),
        (
            FieldCategory::Governance,
            Regex::new(r"CERTIF|POLIC|DOMAIN|ANNOUNCEMENT|COMPLIANCE|RETENTION").unwrap(),
        ),
        (
            FieldCategory::Lineage,
            Regex::new(r"LINEAGE|UPSTREAM|DOWNSTREAM|PROCESS|INPUT|OUTPUT|(PRIMARY|FOREIGN)_?KEY")
                .unwrap(),
        ),
        (
            FieldCategory::Quality,
            Regex::new(r"QUALITY|(^|_)DQ(_|$)|SODA|(^|_)MC(_|$)|MONTE|ANOMAL|FRESHNESS").unwrap(),
        ),
        (
            FieldCategory::Usage,
            Regex::new(r"POPULAR|QUERY|USAGE|VIEW_?COUNT|READ_?COUNT|ACCESS").unwrap(),
        ),
        (
            FieldCategory::Identity,
            Regex::new(r"GUID|QUALIFIED|(^|_)NAME$|TYPE|(^|_)ID$|CONNECTOR|STATUS|^NAME").unwrap(),
        ),
        (
            FieldCategory::Timestamp,
            Regex::new(r"TIME|DATE|(^|_)AT$|CREATED|UPDATED|MODIFIED").unwrap(),
        ),
        (
            FieldCategory::Integration,
            Regex::new(r"CONNECTION|SOURCE|EXTERNAL|INTEGRATION|SYNC|AIRFLOW|DBT|FIVETRAN")
                .unwrap(),
        ),
    ];
}

/// Guess which category a physical column belongs to from its name alone
pub fn infer_column_category(column_name: &str) -> FieldCategory {
    let upper = column_name.trim().to_uppercase();
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&upper))
        .map(|(category, _)| *category)
        .unwrap_or(FieldCategory::Unknown)
}
