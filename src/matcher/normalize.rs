//! Column name normalization
//!
//! Strips warehouse-specific decoration (staging prefixes, type suffixes) so that
//! `ASSET_OWNER_ID`, `SRC_OWNER` and `OWNERS` all reduce to the same stem.

/// Prefixes in priority order; `__` must be tried before `_`
pub const STRIP_PREFIXES: &[&str] = &[
    "__", "_", "ASSET_", "DATA_", "META_", "ATLAN_", "MDLH_", "SRC_", "TGT_", "RAW_", "STG_",
    "DIM_", "FACT_",
];

/// Suffixes in priority order; only stripped when at least three characters remain.
/// The plural `S` is kept after another `S` (`CLASS`, `ACCESS`).
pub const STRIP_SUFFIXES: &[&str] = &[
    "_ID", "_GUID", "_NAME", "_VALUE", "_FLAG", "_STATUS", "_COUNT", "_SCORE", "_PERCENT",
    "_TYPE", "_DATE", "_TIME", "S",
];

const MIN_STEM_LEN: usize = 3;

fn strips_suffix(stem: &str, suffix: &str) -> bool {
    match stem.strip_suffix(suffix) {
        Some(rest) => rest.len() >= MIN_STEM_LEN && !(suffix == "S" && rest.ends_with('S')),
        None => false,
    }
}

fn strip_once(name: &str) -> String {
    let mut stem = name;

    if let Some(prefix) = STRIP_PREFIXES
        .iter()
        .find(|p| stem.starts_with(*p) && stem.len() > p.len())
    {
        stem = &stem[prefix.len()..];
    }

    if let Some(suffix) = STRIP_SUFFIXES.iter().find(|s| strips_suffix(stem, s)) {
        stem = &stem[..stem.len() - suffix.len()];
    }

    stem.trim().to_string()
}

/// Normalize a physical column name or field id to its comparison stem.
///
/// One pass strips the first matching prefix, then the first matching suffix.
/// Passes repeat until the stem stops changing, which makes the function
/// idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize_column_name(name: &str) -> String {
    let mut current = name.trim().to_uppercase();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
