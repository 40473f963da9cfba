// ==============================================================================
// natural_order.rs - Natural Chunk Name Ordering
// ==============================================================================
// Description: Orders chunk file names by their numeric position suffix
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::cmp::Ordering;

/// Position of a chunk name, from lowest to highest sort rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    /// No name at all
    Absent,
    /// No '.' or nothing after the last '.'
    Unnumbered,
    Numbered(u64),
    /// Non-numeric suffix
    Named,
}

fn position(name: Option<&str>) -> Position {
    let Some(name) = name else {
        return Position::Absent;
    };

    match name.rsplit_once('.') {
        None => Position::Unnumbered,
        Some((_, "")) => Position::Unnumbered,
        Some((_, token)) => match token.parse::<u64>() {
            Ok(n) => Position::Numbered(n),
            Err(_) => Position::Named,
        },
    }
}

/// Compare two chunk names by the token after their last '.'.
///
/// `...gz.9` sorts before `...gz.89`; names without a token come first and
/// names with a non-numeric token come last. Equal positions fall back to
/// plain string order.
pub fn compare(a: Option<&str>, b: Option<&str>) -> Ordering {
    position(a).cmp(&position(b)).then_with(|| a.cmp(&b))
}

/// Sort chunk names in place into ascending natural order
pub fn sort_names(names: &mut [String]) {
    names.sort_by(|a, b| compare(Some(a), Some(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(suffixes: &[&str]) -> Vec<String> {
        suffixes
            .iter()
            .map(|s| format!("resumable-sample1vcfgz{}", s))
            .collect()
    }

    fn suffixes(names: &[String]) -> Vec<String> {
        names
            .iter()
            .map(|n| n.trim_start_matches("resumable-sample1vcfgz").to_string())
            .collect()
    }

    #[test]
    fn test_single_digit_positions() {
        let mut names = named(&[".1", ".5", ".4", ".2", ".3", ".6"]);
        sort_names(&mut names);
        assert_eq!(suffixes(&names), vec![".1", ".2", ".3", ".4", ".5", ".6"]);
    }

    #[test]
    fn test_numeric_not_lexical() {
        let mut names = named(&[".89", ".9", ".90", ".91", ".92", ".93"]);
        sort_names(&mut names);
        assert_eq!(suffixes(&names), vec![".9", ".89", ".90", ".91", ".92", ".93"]);
    }

    #[test]
    fn test_unnumbered_first_named_last() {
        let mut names = named(&[".12", ".abc", "", ".3", "."]);
        sort_names(&mut names);
        assert_eq!(suffixes(&names), vec!["", ".", ".3", ".12", ".abc"]);
    }

    #[test]
    fn test_absent_sorts_before_everything() {
        let mut names: Vec<Option<&str>> = vec![
            Some("chunk.zz"),
            Some("chunk.2"),
            None,
            Some("chunk"),
            Some("chunk.1"),
        ];
        names.sort_by(|a, b| compare(*a, *b));
        assert_eq!(
            names,
            vec![None, Some("chunk"), Some("chunk.1"), Some("chunk.2"), Some("chunk.zz")]
        );
    }

    #[test]
    fn test_gz_suffix_in_name() {
        let mut names = vec!["sample.vcf.gz.10".to_string(), "sample.vcf.gz.9".to_string()];
        sort_names(&mut names);
        assert_eq!(names, vec!["sample.vcf.gz.9", "sample.vcf.gz.10"]);
    }
}
