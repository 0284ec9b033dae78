use strsim::levenshtein;

/// Similarity score between two identifiers in `[0, 1]`.
///
/// - identical ignoring case: `1.0`
/// - one contains the other: `0.7 + (shorter / longer) * 0.2`
/// - otherwise: `1 - levenshtein / longer`, clamped at zero
///
/// Empty input never matches anything.
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_uppercase();
    let b = b.trim().to_uppercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longer = len_a.max(len_b) as f64;
    let shorter = len_a.min(len_b) as f64;

    if a.contains(&b) || b.contains(&a) {
        return 0.7 + (shorter / longer) * 0.2;
    }

    let distance = levenshtein(&a, &b) as f64;
    (1.0 - distance / longer).max(0.0)
}
