//! Property-based tests cross-validating the graph against a plain
//! `HashSet` model, the dump format against the live graph, and the
//! perfect hash numbering against lexicographic rank.

use dawgdict::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

/// Short lowercase words collide on prefixes and suffixes often, which is
/// exactly what stresses minimization.
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,8}"
}

fn dict_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word_strategy(), 1..40)
}

proptest! {
    /// Membership agrees with a `HashSet` over the same input, both for
    /// contained words and for probes assembled from the same alphabet.
    #[test]
    fn prop_contains_matches_model(terms in dict_strategy(), probes in dict_strategy()) {
        let model: HashSet<String> = terms.iter().cloned().collect();
        let dawg = Dawg::from_terms(terms);

        prop_assert_eq!(dawg.word_count(), model.len());
        for word in &model {
            prop_assert!(dawg.contains(word));
        }
        for probe in &probes {
            prop_assert_eq!(dawg.contains(probe), model.contains(probe));
        }
    }

    /// `words()` is exactly the sorted, deduplicated input.
    #[test]
    fn prop_words_are_sorted_input(terms in dict_strategy()) {
        let mut expected = terms.clone();
        expected.sort();
        expected.dedup();

        let dawg = Dawg::from_terms(terms);
        prop_assert_eq!(dawg.words(), expected);
    }

    /// The iterator visits the same set, in the same order, as `words()`.
    #[test]
    fn prop_iterator_agrees_with_words(terms in dict_strategy()) {
        let dawg = Dawg::from_terms(terms);
        let iterated: Result<Vec<String>, _> = dawg.iter().collect();
        prop_assert_eq!(iterated.unwrap(), dawg.words());
    }

    /// A dump read back answers every query the original does.
    #[test]
    fn prop_save_load_equivalence(terms in dict_strategy(), probes in dict_strategy()) {
        let dawg = Dawg::from_terms(terms);
        let loaded = Dawg::from_bytes(&dawg.save()).unwrap();

        prop_assert_eq!(loaded.words(), dawg.words());
        prop_assert_eq!(loaded.state(), dawg.state());
        prop_assert_eq!(loaded.stats(), dawg.stats());
        for probe in &probes {
            prop_assert_eq!(loaded.contains(probe), dawg.contains(probe));
            prop_assert_eq!(loaded.longest_prefix(probe), dawg.longest_prefix(probe));
        }
    }

    /// Perfect hashing is a bijection onto 1..=n following lexicographic
    /// rank, and both directions invert each other.
    #[test]
    fn prop_perfect_hash_is_lexicographic_bijection(terms in dict_strategy()) {
        let dawg = Dawg::from_terms(terms);
        let words = dawg.words();

        for (i, word) in words.iter().enumerate() {
            prop_assert_eq!(dawg.word_to_index(word), Some(i + 1));
            let round_tripped = dawg.index_to_word(i + 1);
            prop_assert_eq!(round_tripped.as_deref(), Some(word.as_str()));
        }
        prop_assert_eq!(dawg.index_to_word(words.len() + 1), None);
    }

    /// `longest_prefix` is maximal: walkable for its length and no further.
    #[test]
    fn prop_longest_prefix_is_maximal(terms in dict_strategy(), probe in word_strategy()) {
        let dawg = Dawg::from_terms(terms);
        let len = dawg.longest_prefix(&probe);

        prop_assert!(len <= probe.len());
        if len > 0 {
            prop_assert!(dawg.matches(&probe[..len]));
        }
        if len < probe.len() {
            prop_assert_eq!(dawg.longest_prefix(&probe[..len + 1]), len);
        }
        prop_assert_eq!(dawg.matches(&probe), len > 0);
    }

    /// Prefix enumeration returns exactly the model words with that prefix.
    #[test]
    fn prop_find_all_prefix_matches_model(terms in dict_strategy(), prefix in "[a-d]{0,3}") {
        let model: HashSet<String> = terms.iter().cloned().collect();
        let dawg = Dawg::from_terms(terms);

        let found: Result<Vec<String>, _> = dawg
            .find_all(&prefix, None, MatchKind::AtLeastPrefix)
            .collect();
        let found = found.unwrap();

        let mut expected: Vec<String> = model
            .iter()
            .filter(|w| w.starts_with(&prefix))
            .cloned()
            .collect();
        expected.sort();
        prop_assert_eq!(found, expected);
    }

    /// Rebuilding an identical word set always yields an identical graph
    /// shape (minimality makes the node count canonical).
    #[test]
    fn prop_rebuild_is_canonical(terms in dict_strategy()) {
        let first = Dawg::from_terms(terms.clone());
        let mut shuffled = terms;
        shuffled.reverse();
        let second = Dawg::from_terms(shuffled);

        prop_assert_eq!(first.stats(), second.stats());
    }
}
