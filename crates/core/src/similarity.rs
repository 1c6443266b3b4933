//! Edit-distance string similarity
//!
//! Used by the identity and data-consistency checks to compare names and
//! addresses extracted from different documents. Inputs are short, so the
//! full Levenshtein matrix is always computed.

/// Levenshtein distance (insert/delete/substitute, unit cost) over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    // matrix[i][j] = distance between a[..i] and b[..j]
    let mut matrix = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        matrix[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let substitution = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + substitution);
        }
    }

    matrix[n][m]
}

/// Similarity in `[0, 1]`, case- and whitespace-insensitive.
///
/// `1 - edit_distance / max_len`; two strings that normalize to empty are
/// identical (1.0).
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - edit_distance(&a, &b) as f64 / max_len as f64
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edit_distance_classic() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_empty_strings_are_identical() {
        assert_eq!(string_similarity("", ""), 1.0);
        assert_eq!(string_similarity("   ", ""), 1.0);
    }

    #[test]
    fn test_one_side_empty() {
        assert_eq!(string_similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_case_and_whitespace_ignored() {
        assert_eq!(string_similarity("Rahul Kumar", "rahulkumar"), 1.0);
        assert_eq!(string_similarity(" RAHUL\tKUMAR ", "rahul kumar"), 1.0);
    }

    #[test]
    fn test_partial_similarity() {
        // "rahulkumar" vs "rahulkumaar": one insertion over 11 chars
        let sim = string_similarity("Rahul Kumar", "Rahul Kumaar");
        assert!((sim - (1.0 - 1.0 / 11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_unicode_counts_chars() {
        assert_eq!(edit_distance("café", "cafe"), 1);
        assert!((string_similarity("café", "cafe") - 0.75).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_self_similarity_is_one(s in "[a-zA-Z0-9 ]{1,24}") {
            prop_assert_eq!(string_similarity(&s, &s), 1.0);
        }

        #[test]
        fn prop_similarity_is_symmetric(a in "[a-z ]{0,16}", b in "[a-z ]{0,16}") {
            prop_assert_eq!(string_similarity(&a, &b), string_similarity(&b, &a));
        }

        #[test]
        fn prop_similarity_in_unit_range(a in "\\PC{0,16}", b in "\\PC{0,16}") {
            let sim = string_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&sim));
        }
    }
}
