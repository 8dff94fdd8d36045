//! Speech synthesis through the host's TTS command line tools.
//!
//! The chip logic only produces a string; this module hands it to whatever
//! speech engine the host has. `say` is used on macOS, `espeak-ng` (or the
//! older `espeak`) everywhere else.
//!
//! Settings use the same ranges as the Web Speech API so values carry over
//! from a browser front end unchanged:
//!
//! | setting | range    | default |
//! |---------|----------|---------|
//! | rate    | 0.1-10.0 | 1.0     |
//! | pitch   | 0.0-2.0  | 1.0     |
//! | volume  | 0.0-1.0  | 1.0     |

use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::ChildStderr;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::errors::SpeechError;

/// Words per minute both `say` and `espeak` use at a rate of 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// A voice offered by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name.
    pub name: String,
    /// What to pass to the engine to select this voice.
    pub identifier: String,
    /// Language or locale code, e.g. `en-us`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Whether the voice is synthesized on this machine.
    pub local_service: bool,
}

impl Voice {
    /// A local voice selected by its name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            identifier: name.clone(),
            name,
            language: None,
            local_service: true,
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Whether `selector` names this voice (case-insensitive, by name or identifier).
    pub fn matches(&self, selector: &str) -> bool {
        self.name.eq_ignore_ascii_case(selector) || self.identifier.eq_ignore_ascii_case(selector)
    }
}

/// Optional prosody settings for one utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

impl SpeechSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    #[must_use]
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Rate clamped to 0.1-10.0.
    pub fn rate(&self) -> Option<f32> {
        self.rate.map(|r| r.clamp(0.1, 10.0))
    }

    /// Pitch clamped to 0.0-2.0.
    pub fn pitch(&self) -> Option<f32> {
        self.pitch.map(|p| p.clamp(0.0, 2.0))
    }

    /// Volume clamped to 0.0-1.0.
    pub fn volume(&self) -> Option<f32> {
        self.volume.map(|v| v.clamp(0.0, 1.0))
    }
}

/// Something that can speak text out loud.
///
/// All calls are best-effort: they trigger audio output and report whether
/// the engine could be driven, nothing more.
pub trait SpeechSynthesizer: Send + Sync {
    /// Stop any utterance currently being spoken.
    fn cancel(&self) -> impl std::future::Future<Output = ()> + Send;

    /// Speak `text`, cancelling any in-flight utterance first.
    ///
    /// ## Errors
    ///
    /// Returns [`SpeechError::Unavailable`] when the engine is missing, or
    /// another [`SpeechError`] when it could not be driven.
    fn speak(
        &self,
        text: &str,
        voice: Option<&Voice>,
        settings: &SpeechSettings,
    ) -> impl std::future::Future<Output = Result<(), SpeechError>> + Send;

    /// Every voice the engine reports.
    fn voices(&self) -> impl std::future::Future<Output = Result<Vec<Voice>, SpeechError>> + Send;

    /// Whether the engine can be used at all.
    fn is_available(&self) -> bool;

    /// Voices synthesized on this machine.
    fn list_local_voices(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Voice>, SpeechError>> + Send {
        async move {
            let voices = self.voices().await?;
            Ok(voices.into_iter().filter(|v| v.local_service).collect())
        }
    }
}

/// A host TTS command line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEngine {
    /// macOS `say`.
    Say,
    /// `espeak-ng` or `espeak`; holds the binary name.
    ESpeak(String),
}

impl HostEngine {
    pub fn binary(&self) -> &str {
        match self {
            HostEngine::Say => "say",
            HostEngine::ESpeak(binary) => binary,
        }
    }

    /// Command line arguments for one utterance (text goes on stdin).
    pub fn args(&self, voice: Option<&Voice>, settings: &SpeechSettings) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(voice) = voice {
            args.push("-v".to_string());
            args.push(voice.identifier.clone());
        }

        let wpm = settings
            .rate()
            .map(|rate| (BASE_WORDS_PER_MINUTE * rate).round() as u32);

        match self {
            HostEngine::Say => {
                if let Some(wpm) = wpm {
                    args.push("-r".to_string());
                    args.push(wpm.to_string());
                }
                if settings.pitch.is_some() || settings.volume.is_some() {
                    debug!("`say` has no pitch or volume flags, ignoring them");
                }
            }
            HostEngine::ESpeak(_) => {
                if let Some(wpm) = wpm {
                    args.push("-s".to_string());
                    args.push(wpm.to_string());
                }
                // espeak pitch is 0-99 with 50 as the default
                if let Some(pitch) = settings.pitch() {
                    args.push("-p".to_string());
                    args.push(((pitch * 50.0).round() as u32).min(99).to_string());
                }
                // espeak amplitude is 0-200 with 100 as the default
                if let Some(volume) = settings.volume() {
                    args.push("-a".to_string());
                    args.push(((volume * 100.0).round() as u32).to_string());
                }
            }
        }

        args
    }

    fn voice_list_args(&self) -> &'static [&'static str] {
        match self {
            HostEngine::Say => &["-v", "?"],
            HostEngine::ESpeak(_) => &["--voices"],
        }
    }

    fn parse_voices(&self, output: &str) -> Vec<Voice> {
        let parse: fn(&str) -> Option<Voice> = match self {
            HostEngine::Say => parse_say_voice_line,
            HostEngine::ESpeak(_) => parse_espeak_voice_line,
        };

        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let voice = parse(line);
                if voice.is_none() {
                    trace!(engine = self.binary(), line, "Skipping unparseable voice line");
                }
                voice
            })
            .collect()
    }
}

/// Speaks through a host command line tool.
///
/// Each utterance runs as a child process. Cancelling (directly or by
/// starting another utterance) kills whichever child is still running.
#[derive(Debug)]
pub struct HostSpeaker {
    engine: HostEngine,
    generation: watch::Sender<u64>,
}

impl HostSpeaker {
    /// Use a specific engine without checking that it is installed.
    pub fn with_engine(engine: HostEngine) -> Self {
        let (generation, _) = watch::channel(0);
        Self { engine, generation }
    }

    /// Find a speech engine on this host.
    ///
    /// ## Errors
    ///
    /// Returns [`SpeechError::Unavailable`] when no supported engine is installed.
    pub fn detect() -> Result<Self, SpeechError> {
        let candidates: &[&str] = if cfg!(target_os = "macos") {
            &["say", "espeak-ng", "espeak"]
        } else {
            &["espeak-ng", "espeak"]
        };

        for binary in candidates {
            if which::which(binary).is_ok() {
                debug!(binary, "Found host speech engine");
                let engine = match *binary {
                    "say" => HostEngine::Say,
                    other => HostEngine::ESpeak(other.to_string()),
                };
                return Ok(Self::with_engine(engine));
            }
        }

        Err(SpeechError::Unavailable {
            reason: format!("none of {} is installed", candidates.join(", ")),
        })
    }

    pub fn engine(&self) -> &HostEngine {
        &self.engine
    }

    fn ensure_available(&self) -> Result<(), SpeechError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(SpeechError::Unavailable {
                reason: format!("'{}' is not installed", self.engine.binary()),
            })
        }
    }
}

/// Read a child's stderr to the end, replacing invalid UTF-8.
async fn drain_stderr(stderr: Option<ChildStderr>) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    if let Some(mut stderr) = stderr {
        stderr.read_to_end(&mut bytes).await?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl SpeechSynthesizer for HostSpeaker {
    async fn cancel(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    async fn speak(
        &self,
        text: &str,
        voice: Option<&Voice>,
        settings: &SpeechSettings,
    ) -> Result<(), SpeechError> {
        self.ensure_available()?;
        self.cancel().await;
        let mut cancelled = self.generation.subscribe();

        let engine = self.engine.binary().to_string();
        let args = self.engine.args(voice, settings);
        debug!(engine = %engine, ?args, "Speaking");

        let mut cmd = tokio::process::Command::new(&engine);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| SpeechError::ProcessSpawnFailed {
            engine: engine.clone(),
            source: e,
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SpeechError::StdinPipeError {
                engine: engine.clone(),
            })?;

        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|_| SpeechError::StdinWriteError {
                engine: engine.clone(),
            })?;

        // EOF tells the engine the text is complete
        drop(stdin);

        let stderr = child.stderr.take();

        // stderr is drained while waiting; a full pipe would block the engine
        tokio::select! {
            (status, message) = async { tokio::join!(child.wait(), drain_stderr(stderr)) } => {
                let status = status?;
                let message = message?;
                if status.success() {
                    return Ok(());
                }
                Err(SpeechError::ProcessFailed { engine, stderr: message })
            }
            _ = cancelled.changed() => {
                debug!(engine = %engine, "Utterance cancelled");
                child.kill().await?;
                Ok(())
            }
        }
    }

    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        self.ensure_available()?;

        let engine = self.engine.binary();
        let output = tokio::process::Command::new(engine)
            .args(self.engine.voice_list_args())
            .output()
            .await
            .map_err(|e| SpeechError::VoiceEnumerationFailed {
                engine: engine.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SpeechError::VoiceEnumerationFailed {
                engine: engine.to_string(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(self.engine.parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn is_available(&self) -> bool {
        which::which(self.engine.binary()).is_ok()
    }
}

/// Parse one line of `say -v ?` output.
///
/// ```text
/// Samantha            en_US    # Hello! My name is Samantha.
/// Eddy (English (US)) en_US    # Hello! My name is Eddy.
/// ```
fn parse_say_voice_line(line: &str) -> Option<Voice> {
    let metadata = line.split('#').next()?.trim();
    let locale = metadata.split_whitespace().last()?;
    let name = metadata[..metadata.rfind(locale)?].trim();

    if name.is_empty() {
        return None;
    }

    Some(Voice::named(name).with_language(locale.replace('_', "-").to_lowercase()))
}

/// Parse one line of `espeak --voices` output.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us              --/M      English_(America)  gmw/en-US            (en 3)
/// ```
fn parse_espeak_voice_line(line: &str) -> Option<Voice> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 || parts[0].parse::<u32>().is_err() {
        return None;
    }

    let language = parts[1];
    let name = parts[3].replace('_', " ");

    Some(
        Voice::named(name)
            .with_identifier(language)
            .with_language(language),
    )
}
