//! The label table.
//!
//! Maps a chip label (what the user sees, e.g. `ER`) to the lowercase string a
//! speech engine should say for it (e.g. `ur`). Speak strings are kept
//! lowercase so engines pronounce them as sounds instead of spelling out an
//! acronym.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Every known label and its speak string, in display order.
pub const MOUTH_SOUNDS: &[(&str, &str)] = &[
    ("ER", "ur"),
    ("AR", "ahr"),
    ("OR", "or"),
    ("SH", "sh"),
    ("CH", "ch"),
    ("TH", "th"),
    ("NG", "ng"),
    ("EE", "ee"),
    ("OO", "oo"),
    ("AY", "ay"),
    ("EYE", "eye"),
    ("OW", "ow"),
    ("AH", "uh"),
    ("UH", "uh"),
    ("OH", "oh"),
    ("L", "luh"),
    ("R", "r"),
    ("M", "m"),
    ("N", "n"),
    ("S", "s"),
    ("T", "t"),
    ("K", "k"),
    ("D", "d"),
    ("B", "b"),
    ("P", "p"),
    ("V", "v"),
    ("F", "f"),
    ("G", "g"),
    ("H", "h"),
    ("J", "j"),
    ("W", "w"),
    ("Y", "y"),
    ("Z", "z"),
];

static LABEL_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| MOUTH_SOUNDS.iter().copied().collect());

/// Look a label up in the table without any fallback.
///
/// Lookups are exact: labels are uppercase by convention and `"sh"` is not
/// the same key as `"SH"`.
pub fn lookup_label(label: &str) -> Option<&'static str> {
    LABEL_TABLE.get(label).copied()
}

/// Resolve a label to the string a speech engine should say.
///
/// Unknown labels fall back to the label lowercased. This never fails.
///
/// ## Examples
///
/// ```
/// use mouth_sounds::resolve_label;
///
/// assert_eq!(resolve_label("L"), "luh");
/// assert_eq!(resolve_label("XX"), "xx");
/// ```
pub fn resolve_label(label: &str) -> String {
    match lookup_label(label) {
        Some(speak) => speak.to_string(),
        None => label.to_lowercase(),
    }
}

/// Iterate the known labels in display order.
pub fn known_labels() -> impl Iterator<Item = &'static str> {
    MOUTH_SOUNDS.iter().map(|(label, _)| *label)
}
