//! Table reference extraction
//!
//! Regex based and deliberately permissive: a bare `ATLAS*` token anywhere in the
//! statement counts as a table reference, as does anything after FROM/JOIN/INTO/UPDATE.

use crate::resolver::is_known_gold_table;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CLAUSE_TABLE: Regex =
        Regex::new(r#"(?i)\b(?:FROM|JOIN|INTO|UPDATE)\s+([A-Za-z_"{<][\w."{}<>$]*)"#).unwrap();
    static ref ENTITY_TOKEN: Regex = Regex::new(r"(?i)\b(\w+_ENTITY)\b").unwrap();
    static ref ATLAS_TOKEN: Regex = Regex::new(r"(?i)\b(ATLAS\w+)\b").unwrap();
    static ref GOLD_TOKEN: Regex = Regex::new(r"(?i)\bGOLD\.(\w+)\b").unwrap();
    static ref MUSTACHE_PLACEHOLDER: Regex = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
    static ref ANGLE_PLACEHOLDER: Regex = Regex::new(r"<([A-Za-z_]\w*)>").unwrap();
}

/// Table-valued keywords that follow FROM/JOIN without naming a table
const NON_TABLE_KEYWORDS: &[&str] = &["LATERAL"];

fn is_placeholder(token: &str) -> bool {
    token.contains("{{") || token.contains('<')
}

fn keep_reference(token: &str) -> bool {
    !token.is_empty()
        && !is_placeholder(token)
        && !token.contains("INFORMATION_SCHEMA")
        && !NON_TABLE_KEYWORDS.contains(&token)
}

/// Every table the statement appears to touch, uppercased, in first-seen order
pub fn extract_all_referenced_tables(sql: &str) -> Vec<String> {
    let clause_refs = CLAUSE_TABLE
        .captures_iter(sql)
        .map(|caps| caps[1].replace('"', "").trim_end_matches('.').to_uppercase());
    let entity_refs = ENTITY_TOKEN.captures_iter(sql).map(|caps| caps[1].to_uppercase());
    let atlas_refs = ATLAS_TOKEN.captures_iter(sql).map(|caps| caps[1].to_uppercase());
    let gold_refs = GOLD_TOKEN
        .captures_iter(sql)
        .filter(|caps| is_known_gold_table(&caps[1]))
        .map(|caps| format!("GOLD.{}", caps[1].to_uppercase()));

    clause_refs
        .chain(entity_refs)
        .chain(atlas_refs)
        .chain(gold_refs)
        .filter(|token| keep_reference(token))
        .unique()
        .collect()
}

/// Unresolved template placeholders (`{{NAME}}` or `<Name>`), de-duplicated
pub fn find_placeholders(sql: &str) -> Vec<String> {
    MUSTACHE_PLACEHOLDER
        .captures_iter(sql)
        .map(|caps| format!("{{{{{}}}}}", &caps[1]))
        .chain(ANGLE_PLACEHOLDER.captures_iter(sql).map(|caps| format!("<{}>", &caps[1])))
        .unique()
        .collect()
}
