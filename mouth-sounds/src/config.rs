//! User configuration.
//!
//! Read from `$XDG_CONFIG_HOME/mouth-sounds/config.toml`, falling back to
//! `~/.config/mouth-sounds/config.toml`. Every field is optional and a missing
//! file is the same as an empty one.
//!
//! ```toml
//! library_index = "/home/me/names.json"
//! max_chips = 5
//! voice = "en-us"
//! rate = 0.9
//! ```

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chips::ChipGenerator;
use crate::errors::ConfigError;
use crate::overrides::OverrideTable;
use crate::speech::SpeechSettings;

/// Marker used for remote URLs that have not been set up yet.
pub const UNSET_URL: &str = "TO_BE_SET";

const CONFIG_DIR_NAME: &str = "mouth-sounds";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Local override library (JSON) merged over the built-in overrides.
    pub library_index: Option<PathBuf>,
    /// Remote override library index. Not fetched yet.
    pub library_index_url: Option<String>,
    /// Where user corrections will be submitted. Not used yet.
    pub submission_endpoint_url: Option<String>,
    /// Chip cap for the heuristic path.
    pub max_chips: Option<usize>,
    /// Default voice selector.
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

/// Treat blank and placeholder URLs as unset.
fn configured_url(url: Option<&String>) -> Option<&str> {
    url.map(|u| u.trim())
        .filter(|u| !u.is_empty() && *u != UNSET_URL)
}

impl Config {
    /// Where the config file lives, if a home directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        let config_dir = match env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()?.join(".config"),
        };
        Some(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse config from TOML text. `path` is only used in errors.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load config from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "Loaded config");
                Self::from_toml(&contents, path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Load config from [`Config::default_path`].
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// The remote library index URL, unless it is still a placeholder.
    pub fn library_index_url(&self) -> Option<&str> {
        configured_url(self.library_index_url.as_ref())
    }

    /// The submission endpoint URL, unless it is still a placeholder.
    pub fn submission_endpoint_url(&self) -> Option<&str> {
        configured_url(self.submission_endpoint_url.as_ref())
    }

    /// Speech settings from the configured rate, pitch and volume.
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
        }
    }

    /// The override table this config describes: the built-ins, plus the
    /// library index file when one is set.
    pub fn overrides(&self) -> Result<OverrideTable, ConfigError> {
        match &self.library_index {
            Some(path) => OverrideTable::builtin_with_library(path),
            None => Ok(OverrideTable::builtin().clone()),
        }
    }

    /// A chip generator using this config's overrides and chip cap.
    pub fn chip_generator(&self) -> Result<ChipGenerator, ConfigError> {
        let mut generator = ChipGenerator::new();
        if self.library_index.is_some() {
            generator = generator.with_overrides(self.overrides()?);
        }
        if let Some(max_chips) = self.max_chips {
            generator = generator.with_max_chips(max_chips);
        }
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::chips::DEFAULT_MAX_CHIPS;

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("", Path::new("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            library_index = "/tmp/names.json"
            library_index_url = "https://example.com/index.json"
            submission_endpoint_url = "TO_BE_SET"
            max_chips = 3
            voice = "en-us"
            rate = 0.9
            pitch = 1.2
            volume = 0.5
        "#;
        let config = Config::from_toml(toml, Path::new("config.toml")).unwrap();

        assert_eq!(config.library_index, Some(PathBuf::from("/tmp/names.json")));
        assert_eq!(config.library_index_url(), Some("https://example.com/index.json"));
        assert_eq!(config.submission_endpoint_url(), None);
        assert_eq!(config.max_chips, Some(3));
        assert_eq!(config.voice.as_deref(), Some("en-us"));
        assert_eq!(
            config.speech_settings(),
            SpeechSettings::new().with_rate(0.9).with_pitch(1.2).with_volume(0.5)
        );
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let result = Config::from_toml("colour = \"red\"", Path::new("config.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_blank_urls_are_unset() {
        let config = Config {
            library_index_url: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(config.library_index_url(), None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_chips = 2").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.max_chips, Some(2));
    }

    #[test]
    fn test_default_generator() {
        let generator = Config::default().chip_generator().unwrap();
        assert_eq!(generator.max_chips(), DEFAULT_MAX_CHIPS);
        assert_eq!(generator.overrides(), OverrideTable::builtin());
    }

    #[test]
    fn test_generator_with_library_and_cap() {
        let mut library = tempfile::NamedTempFile::new().unwrap();
        write!(
            library,
            r#"{{"entries": {{"niamh": {{"labels": ["N", "EE", "V"], "sayAs": "neev"}}}}}}"#
        )
        .unwrap();

        let config = Config {
            library_index: Some(library.path().to_path_buf()),
            max_chips: Some(1),
            ..Config::default()
        };
        let generator = config.chip_generator().unwrap();

        assert_eq!(generator.generate("Niamh").say_as, "neev");
        assert_eq!(generator.generate("earl").say_as, "earl");
        assert_eq!(generator.generate("davik").labels(), vec!["DAV"]);
    }

    #[test]
    fn test_generator_with_missing_library_fails() {
        let config = Config {
            library_index: Some(PathBuf::from("/definitely/not/here.json")),
            ..Config::default()
        };
        assert!(config.chip_generator().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_default_path_uses_xdg_config_home() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test") };
        let path = Config::default_path();
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        assert_eq!(
            path,
            Some(PathBuf::from("/tmp/xdg-test/mouth-sounds/config.toml"))
        );
    }
}
