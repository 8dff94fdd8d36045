//! Name to chip generation.
//!
//! A name first goes through the curated override table. Names without an
//! override fall back to vowel-group segmentation, which gives the user a
//! syllable-ish starting point to edit.

use std::borrow::Cow;

use tracing::debug;

use crate::labels::resolve_label;
use crate::overrides::OverrideTable;
use crate::segment::vowel_groups;
use crate::types::{Chip, ChipSet};

/// The most chips the heuristic path will produce by default.
pub const DEFAULT_MAX_CHIPS: usize = 5;

/// Generates chip sets from names.
///
/// The generator owns its override table so callers can inject curated
/// entries (e.g. from a library index file) without touching the built-in set.
///
/// ## Examples
///
/// ```
/// use mouth_sounds::ChipGenerator;
///
/// let set = ChipGenerator::new().generate("Davik");
/// assert_eq!(set.labels(), vec!["DAV", "IK"]);
/// assert_eq!(set.say_as, "dav-ik");
/// ```
#[derive(Debug, Clone)]
pub struct ChipGenerator {
    overrides: Cow<'static, OverrideTable>,
    max_chips: usize,
}

impl Default for ChipGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipGenerator {
    /// A generator using the built-in overrides and the default chip cap.
    pub fn new() -> Self {
        Self {
            overrides: Cow::Borrowed(OverrideTable::builtin()),
            max_chips: DEFAULT_MAX_CHIPS,
        }
    }

    /// Use `overrides` instead of the built-in table.
    #[must_use]
    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = Cow::Owned(overrides);
        self
    }

    /// Cap the number of chips the heuristic path returns.
    ///
    /// A cap of zero is treated as one; a name always gets at least one chip.
    #[must_use]
    pub fn with_max_chips(mut self, max_chips: usize) -> Self {
        self.max_chips = max_chips.max(1);
        self
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn max_chips(&self) -> usize {
        self.max_chips
    }

    /// Turn a name into a chip set.
    ///
    /// Never fails. Empty or whitespace-only names give [`ChipSet::empty`].
    pub fn generate(&self, name: &str) -> ChipSet {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return ChipSet::empty();
        }

        let lower = trimmed.to_lowercase();

        if let Some(entry) = self.overrides.get(&lower) {
            debug!(name = %lower, "using curated override");
            let chips = entry
                .labels
                .iter()
                .map(|label| Chip::new(label.clone(), resolve_label(label)))
                .collect();
            return ChipSet {
                chips,
                say_as: entry.say_as.clone(),
            };
        }

        let segments = vowel_groups(&lower);
        let chips: Vec<Chip> = segments
            .iter()
            .filter(|segment| !segment.is_empty())
            .take(self.max_chips)
            .map(|segment| Chip::from_segment(segment))
            .collect();

        if chips.len() < segments.len() {
            debug!(
                name = %lower,
                segments = segments.len(),
                kept = chips.len(),
                "truncated heuristic chips"
            );
        }

        // say-as covers every segment, not just the ones kept as chips
        ChipSet {
            chips,
            say_as: segments.join("-"),
        }
    }
}

/// Turn a name into a chip set using the built-in overrides.
///
/// ## Examples
///
/// ```
/// use mouth_sounds::generate_chips_from_name;
///
/// let set = generate_chips_from_name("earl");
/// assert_eq!(set.labels(), vec!["ER", "L"]);
/// assert_eq!(set.payload(), "ur, luh. earl");
/// ```
pub fn generate_chips_from_name(name: &str) -> ChipSet {
    ChipGenerator::new().generate(name)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: generation never panics
        #[test]
        fn generate_never_panics(s in ".*") {
            let _ = generate_chips_from_name(&s);
        }

        /// Property: never more than the chip cap
        #[test]
        fn chip_count_is_capped(s in ".*") {
            prop_assert!(generate_chips_from_name(&s).chips.len() <= DEFAULT_MAX_CHIPS);
        }

        /// Property: non-empty input always gets a non-empty say-as
        #[test]
        fn say_as_is_non_empty(s in "\\s*[a-zA-Z0-9]{1,30}\\s*") {
            prop_assert!(!generate_chips_from_name(&s).say_as.is_empty());
        }

        /// Property: for letter-only names the chips spell out a prefix of the name
        #[test]
        fn chips_reconstruct_a_prefix(s in "[a-zA-Z]{1,40}") {
            let lower = s.to_lowercase();
            prop_assume!(OverrideTable::builtin().get(&lower).is_none());

            let set = generate_chips_from_name(&s);
            let rebuilt: String = set.chips.iter().map(|c| c.label.to_lowercase()).collect();
            prop_assert!(lower.starts_with(&rebuilt));

            if set.chips.len() < DEFAULT_MAX_CHIPS {
                prop_assert_eq!(rebuilt, lower);
            }
        }

        /// Property: heuristic chips are case transforms of the same segment
        #[test]
        fn heuristic_label_matches_speak(s in "[a-z]{1,40}") {
            prop_assume!(OverrideTable::builtin().get(&s).is_none());
            for chip in generate_chips_from_name(&s).chips {
                prop_assert_eq!(chip.label, chip.speak.to_uppercase());
            }
        }

        /// Property: same input, same output
        #[test]
        fn generate_is_pure(s in ".*") {
            prop_assert_eq!(generate_chips_from_name(&s), generate_chips_from_name(&s));
        }
    }
}
