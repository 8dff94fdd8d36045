//! Core types: chips and chip sets.

use serde::{Deserialize, Serialize};

use crate::labels::resolve_label;
use crate::payload::build_payload;

/// A single editable pronunciation unit.
///
/// `label` is what a user sees and edits; `speak` is what the speech engine
/// is asked to say for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chip {
    /// Uppercase display label.
    pub label: String,
    /// Lowercase speakable string.
    pub speak: String,
}

impl Chip {
    /// Create a chip from explicit parts.
    pub fn new(label: impl Into<String>, speak: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            speak: speak.into(),
        }
    }

    /// Create a chip from a label, resolving its speak string through the
    /// label table.
    ///
    /// The label is trimmed and upper-cased first so user edits such as
    /// `" sh "` land on the `SH` entry.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_uppercase();
        let speak = resolve_label(&label);
        Self { label, speak }
    }

    /// Create a chip from a raw text segment.
    ///
    /// The label and speak string are the upper and lower case forms of the
    /// same segment.
    pub fn from_segment(segment: &str) -> Self {
        Self {
            label: segment.to_uppercase(),
            speak: segment.to_string(),
        }
    }
}

/// The ordered chips for a name plus a whole-name fallback pronunciation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipSet {
    /// Chips in speaking order.
    pub chips: Vec<Chip>,
    /// Whole-name fallback pronunciation.
    pub say_as: String,
}

impl ChipSet {
    /// The chip set for an empty name: no chips and an empty say-as.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chip set from user-edited labels.
    ///
    /// Blank labels are skipped. Each remaining label resolves through the
    /// label table.
    pub fn from_labels<I, S>(labels: I, say_as: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chips = labels
            .into_iter()
            .filter(|label| !label.as_ref().trim().is_empty())
            .map(|label| Chip::from_label(label.as_ref()))
            .collect();

        Self {
            chips,
            say_as: say_as.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty() && self.say_as.is_empty()
    }

    /// The labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.chips.iter().map(|c| c.label.as_str()).collect()
    }

    /// The utterance to hand to a speech engine.
    ///
    /// See [`build_payload`].
    pub fn payload(&self) -> String {
        build_payload(&self.chips, &self.say_as)
    }
}
