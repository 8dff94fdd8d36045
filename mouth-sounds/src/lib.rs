//! Mouth Sounds
//!
//! Turns a person's name into a short list of editable "pronunciation chips"
//! and speaks them with the host's text-to-speech engine.
//!
//! ## Features
//!
//! - **Curated overrides**: exact whole-name matches win over guesswork
//! - **Vowel-group heuristic**: a syllable-ish starting point for any other name
//! - **Label table**: maps chip labels like `ER` to strings engines say as sounds
//! - **Host speech**: `say` on macOS, `espeak-ng` elsewhere, with cancellation
//!
//! ## Quick Start
//!
//! ```
//! use mouth_sounds::generate_chips_from_name;
//!
//! let set = generate_chips_from_name("earl");
//! assert_eq!(set.labels(), vec!["ER", "L"]);
//! assert_eq!(set.payload(), "ur, luh. earl");
//! ```
//!
//! ```ignore
//! use mouth_sounds::{HostSpeaker, SpeechSettings, SpeechSynthesizer};
//!
//! let speaker = HostSpeaker::detect()?;
//! speaker.speak(&set.payload(), None, &SpeechSettings::default()).await?;
//! ```
//!
//! ## Module Structure
//!
//! - [`labels`] - The label to speak-string table
//! - [`segment`] - Vowel-group segmentation
//! - [`overrides`] - Curated whole-name overrides and library files
//! - [`chips`] - Name to chip generation
//! - [`payload`] - Joining chips into one utterance
//! - [`speech`] - The speech collaborator and host implementation
//! - [`config`] - User configuration
//! - [`errors`] - Error types

pub mod chips;
pub mod config;
pub mod errors;
pub mod labels;
pub mod overrides;
pub mod payload;
pub mod segment;
pub mod speech;
pub mod types;

pub use chips::{generate_chips_from_name, ChipGenerator, DEFAULT_MAX_CHIPS};
pub use config::Config;
pub use errors::{ConfigError, SpeechError};
pub use labels::{known_labels, lookup_label, resolve_label};
pub use overrides::{OverrideEntry, OverrideTable};
pub use payload::build_payload;
pub use speech::{HostEngine, HostSpeaker, SpeechSettings, SpeechSynthesizer, Voice};
pub use types::{Chip, ChipSet};
