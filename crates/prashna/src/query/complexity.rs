//! Structural complexity scoring.

/// Conjunctions are counted as substring occurrences, not whole words, so
/// "sandwich" contributes an "and".
const CONJUNCTIONS: [&str; 7] = [
    "and", "or", "but", "while", "however", "whereas", "although",
];

/// Default score at or above which a query is considered complex.
pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 15;

/// Weighted structural score: one point per word, three per `?`/`&`, four
/// per conjunction occurrence.
pub fn score_complexity(query: &str) -> u32 {
    let word_count = query.split_whitespace().count() as u32;
    let punctuation_count = query.chars().filter(|c| *c == '?' || *c == '&').count() as u32;

    let lower = query.to_lowercase();
    let conjunction_count: u32 = CONJUNCTIONS
        .iter()
        .map(|word| lower.matches(word).count() as u32)
        .sum();

    word_count + punctuation_count * 3 + conjunction_count * 4
}

/// Whether a query warrants decomposition.
pub fn is_complex(query: &str, threshold: u32) -> bool {
    score_complexity(query) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_counts_words() {
        assert_eq!(score_complexity("cats like milk"), 3);
    }

    #[test]
    fn test_score_weights_punctuation() {
        // 3 words + 2 punctuation marks at weight 3
        assert_eq!(score_complexity("cats like milk?&"), 9);
    }

    #[test]
    fn test_score_counts_conjunction_substrings() {
        // 1 word containing "and" as a substring
        assert_eq!(score_complexity("sandwich"), 5);
    }

    #[test]
    fn test_score_is_monotonic_in_word_count() {
        assert!(score_complexity("cats like milk") < score_complexity("cats like milk daily"));
    }

    #[test]
    fn test_threshold_boundary() {
        // 14 plain words, none containing a conjunction substring
        let fourteen = "the cat sat on a mat with a hat in a big red box";
        assert_eq!(score_complexity(fourteen), 14);
        assert!(!is_complex(fourteen, DEFAULT_COMPLEXITY_THRESHOLD));

        let fifteen = "the cat sat on a mat with a hat in a big red box today";
        assert_eq!(score_complexity(fifteen), 15);
        assert!(is_complex(fifteen, DEFAULT_COMPLEXITY_THRESHOLD));
    }

    #[test]
    fn test_multi_clause_comparison_is_complex() {
        let query =
            "What is the difference between a revocable and irrevocable trust and how are they taxed?";
        // 15 words, one '?', two "and" occurrences
        assert_eq!(score_complexity(query), 26);
        assert!(is_complex(query, DEFAULT_COMPLEXITY_THRESHOLD));
    }
}
