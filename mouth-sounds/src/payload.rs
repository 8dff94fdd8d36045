//! Joins chips into a single utterance for speech synthesis.

use crate::types::Chip;

/// Build the utterance for a set of chips.
///
/// The chips are read out one by one ("teaching" the pronunciation), then the
/// whole-name say-as follows after a full stop:
///
/// ```
/// use mouth_sounds::{build_payload, Chip};
///
/// let chips = vec![Chip::new("ER", "ur"), Chip::new("L", "luh")];
/// assert_eq!(build_payload(&chips, "earl"), "ur, luh. earl");
/// ```
///
/// With no chips the result still starts with `". "`.
pub fn build_payload(chips: &[Chip], say_as: &str) -> String {
    let teaching = chips
        .iter()
        .map(|chip| chip.speak.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!("{teaching}. {say_as}")
}
