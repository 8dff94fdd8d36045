//! Vowel-group segmentation.
//!
//! Splits a lowercase name into rough syllables: each segment is a run of
//! consonants, a run of vowels and a trailing run of consonants. `y` belongs
//! to both classes, so it can carry a segment on its own (`lynn`) or end one
//! as part of the greedy trailing consonant run (`mary`). Segments are the
//! successive, non-overlapping, greedy matches scanned left to right.

use std::sync::LazyLock;

use regex::Regex;

/// Consonants, then at least one vowel, then consonants.
const VOWEL_GROUP_PATTERN: &str = "[bcdfghjklmnpqrstvwxyz]*[aeiouy]+[bcdfghjklmnpqrstvwxyz]*";

static VOWEL_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VOWEL_GROUP_PATTERN).expect("Invalid vowel group regex"));

/// Split `text` into vowel-group segments.
///
/// `text` is expected to be lowercase already; uppercase letters are not
/// matched. Characters outside every segment (spaces, digits, punctuation,
/// non-Latin letters) are skipped. When nothing matches, the whole input is
/// returned as a single segment.
///
/// ## Examples
///
/// ```
/// use mouth_sounds::segment::vowel_groups;
///
/// assert_eq!(vowel_groups("davik"), vec!["dav", "ik"]);
/// assert_eq!(vowel_groups("ng"), vec!["ng"]);
/// ```
pub fn vowel_groups(text: &str) -> Vec<&str> {
    let segments: Vec<&str> = VOWEL_GROUP.find_iter(text).map(|m| m.as_str()).collect();

    if segments.is_empty() {
        tracing::trace!(text, "no vowel groups, using whole text as one segment");
        return vec![text];
    }

    tracing::trace!(text, ?segments, "vowel groups");
    segments
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: never panics and never returns an empty list
        #[test]
        fn vowel_groups_never_empty(s in ".*") {
            prop_assert!(!vowel_groups(&s).is_empty());
        }

        /// Property: for lowercase ASCII letters the segments cover the input exactly
        #[test]
        fn letters_are_fully_covered(s in "[a-z]{1,40}") {
            let joined: String = vowel_groups(&s).concat();
            prop_assert_eq!(joined, s);
        }

        /// Property: every segment of a lettered name holds a vowel, unless there is only one
        #[test]
        fn segments_contain_vowels(s in "[a-z]{1,40}") {
            let segments = vowel_groups(&s);
            if segments.len() > 1 {
                for segment in segments {
                    prop_assert!(segment.chars().any(|c| "aeiouy".contains(c)));
                }
            }
        }
    }
}
