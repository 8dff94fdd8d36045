use std::path::PathBuf;

/// Errors raised by the speech collaborator.
///
/// Chip generation itself never fails; only talking to the host's speech
/// engine can.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No usable speech engine was found on this host.
    ///
    /// This is an environment problem, not a retryable one. Callers should
    /// surface it (e.g. disable their "speak" action) rather than retry.
    #[error("Speech synthesis is not available on this host: {reason}")]
    Unavailable {
        /// Why the capability is missing.
        reason: String,
    },

    /// The speech engine process could not be started.
    #[error("Failed to spawn '{engine}'")]
    ProcessSpawnFailed {
        /// The engine binary that failed to start.
        engine: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The engine process was started without a stdin pipe.
    #[error("'{engine}' did not expose a stdin pipe")]
    StdinPipeError {
        /// The engine binary.
        engine: String,
    },

    /// Writing the utterance to the engine's stdin failed.
    #[error("Failed to write text to '{engine}'")]
    StdinWriteError {
        /// The engine binary.
        engine: String,
    },

    /// The engine exited with a failure status.
    #[error("'{engine}' failed: {stderr}")]
    ProcessFailed {
        /// The engine binary.
        engine: String,
        /// Captured stderr from the engine.
        stderr: String,
    },

    /// Listing voices failed.
    #[error("Failed to list voices for '{engine}': {message}")]
    VoiceEnumerationFailed {
        /// The engine binary.
        engine: String,
        /// What went wrong.
        message: String,
    },

    #[error("I/O error")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Errors raised while loading configuration or an override library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::Config`].
    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The override library is not valid JSON for an override index.
    #[error("Invalid override library {path}: {message}")]
    Library { path: PathBuf, message: String },
}
