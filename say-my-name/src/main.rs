//! Pronunciation chip CLI.
//!
//! Breaks a name into editable chips, prints them and optionally speaks the
//! result with the host's text-to-speech engine.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{bail, WrapErr};
use mouth_sounds::labels::MOUTH_SOUNDS;
use mouth_sounds::{ChipSet, Config, HostSpeaker, SpeechSynthesizer, Voice};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Most bytes read from stdin.
const STDIN_LIMIT: u64 = 10_000;

/// Turn a name into pronunciation chips and speak it
///
/// # Examples
///
/// ```no_run
/// // say-my-name Davik
/// // say-my-name earl --speak
/// // say-my-name Siobhan --labels SH,IH,V,AW,N --say-as shivawn --speak
/// // echo "Mary Jane" | say-my-name --json
/// ```
#[derive(Parser, Debug)]
#[command(name = "say-my-name")]
#[command(author, version, about = "Break a name into pronunciation chips and speak it")]
struct Cli {
    /// Name to break into chips (reads from stdin if not provided)
    #[arg(value_name = "NAME")]
    name: Vec<String>,

    /// Output the chips as JSON
    #[arg(long)]
    json: bool,

    /// Use these chip labels instead of the generated ones (e.g. "ER,L")
    #[arg(long, value_delimiter = ',', value_name = "LABELS")]
    labels: Vec<String>,

    /// Replace the whole-name say-as pronunciation
    #[arg(long, value_name = "TEXT")]
    say_as: Option<String>,

    /// Override library (JSON) to merge over the built-in overrides
    #[arg(long, value_name = "FILE")]
    library: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Most chips to generate for names without an override
    #[arg(long, value_name = "N")]
    max_chips: Option<usize>,

    /// Speak the chips and the say-as out loud
    #[arg(short, long)]
    speak: bool,

    /// Voice to speak with (name or identifier)
    #[arg(long, value_name = "VOICE")]
    voice: Option<String>,

    /// Speech rate (0.1-10, 1 is normal)
    #[arg(long)]
    rate: Option<f32>,

    /// Speech pitch (0-2, 1 is normal)
    #[arg(long)]
    pitch: Option<f32>,

    /// Speech volume (0-1)
    #[arg(long)]
    volume: Option<f32>,

    /// List the voices available on this machine and exit
    #[arg(long)]
    list_voices: bool,

    /// List the known chip labels and exit
    #[arg(long)]
    list_labels: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// JSON output: the chip set plus the utterance it speaks as.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    #[serde(flatten)]
    chip_set: &'a ChipSet,
    payload: String,
}

/// Set up logging on stderr.
///
/// Nothing is logged unless `-v` is given or `RUST_LOG` is set.
fn init_tracing(verbose: u8) {
    let from_env = std::env::var("RUST_LOG").ok();
    if verbose == 0 && from_env.is_none() {
        return;
    }

    let base_filter = from_env.unwrap_or_else(|| match verbose {
        1 => "info,say_my_name=info,mouth_sounds=info".to_string(),
        2 => "info,say_my_name=debug,mouth_sounds=debug".to_string(),
        _ => "debug,say_my_name=trace,mouth_sounds=trace".to_string(),
    });

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Joins multiple arguments into a single name
fn join_args(args: &[String]) -> String {
    args.join(" ")
}

/// Reads a name from stdin, trimmed, up to [`STDIN_LIMIT`] bytes
fn read_from_stdin() -> io::Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    read_name(stdin.lock())
}

/// Reads at most [`STDIN_LIMIT`] bytes and trims them into a name.
///
/// The cap can land inside a multi-byte character, so invalid UTF-8 is
/// replaced rather than rejected.
fn read_name(reader: impl Read) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.take(STDIN_LIMIT).read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

/// Apply command line flags on top of the loaded config.
fn merge_config(mut config: Config, cli: &Cli) -> Config {
    if let Some(library) = &cli.library {
        config.library_index = Some(library.clone());
    }
    if let Some(max_chips) = cli.max_chips {
        config.max_chips = Some(max_chips);
    }
    if let Some(voice) = &cli.voice {
        config.voice = Some(voice.clone());
    }
    config.rate = cli.rate.or(config.rate);
    config.pitch = cli.pitch.or(config.pitch);
    config.volume = cli.volume.or(config.volume);
    config
}

/// Apply the user's chip edits to a generated chip set.
fn apply_edits(generated: ChipSet, labels: &[String], say_as: Option<&str>) -> ChipSet {
    let mut set = if labels.is_empty() {
        generated
    } else {
        ChipSet::from_labels(labels, generated.say_as)
    };

    if let Some(say_as) = say_as {
        set.say_as = say_as.to_string();
    }
    set
}

fn render_text(set: &ChipSet) -> String {
    let mut out = String::new();
    let width = set
        .chips
        .iter()
        .map(|c| c.label.chars().count())
        .max()
        .unwrap_or(0);

    for chip in &set.chips {
        let label = format!("{:<width$}", chip.label, width = width);
        out.push_str(&format!(
            "{}  {}\n",
            label.if_supports_color(Stream::Stdout, |t| t.bold()),
            chip.speak
        ));
    }

    out.push_str(&format!(
        "{} {}\n",
        "say as:".if_supports_color(Stream::Stdout, |t| t.dimmed()),
        set.say_as
    ));
    out.push_str(&format!(
        "{} {}\n",
        "payload:".if_supports_color(Stream::Stdout, |t| t.dimmed()),
        set.payload()
    ));
    out
}

fn list_labels() {
    for (label, speak) in MOUTH_SOUNDS {
        println!(
            "{:<4} {}",
            label.if_supports_color(Stream::Stdout, |t| t.bold()),
            speak
        );
    }
}

async fn list_voices(speaker: &HostSpeaker, json: bool) -> color_eyre::Result<()> {
    let voices = speaker
        .list_local_voices()
        .await
        .wrap_err("Could not list voices")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }

    for voice in voices {
        match &voice.language {
            Some(language) => println!("{} ({})", voice.name, language),
            None => println!("{}", voice.name),
        }
    }
    Ok(())
}

/// Find the voice a selector refers to, falling back to passing the
/// selector straight through to the engine.
async fn select_voice(speaker: &HostSpeaker, selector: &str) -> Voice {
    match speaker.list_local_voices().await {
        Ok(voices) => {
            if let Some(voice) = voices.into_iter().find(|v| v.matches(selector)) {
                return voice;
            }
            warn!(selector, "No matching voice found, passing it to the engine as-is");
        }
        Err(e) => warn!(error = %e, "Could not list voices"),
    }
    Voice::named(selector)
}

async fn speak(set: &ChipSet, config: &Config) -> color_eyre::Result<()> {
    let speaker = HostSpeaker::detect().wrap_err("Cannot speak")?;

    let voice = match &config.voice {
        Some(selector) => Some(select_voice(&speaker, selector).await),
        None => None,
    };
    let settings = config.speech_settings();

    let payload = set.payload();
    debug!(payload = %payload, "Speaking payload");
    speaker
        .speak(&payload, voice.as_ref(), &settings)
        .await
        .wrap_err("Speech failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_labels {
        list_labels();
        return Ok(());
    }

    let loaded = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let config = merge_config(loaded, &cli);

    if cli.list_voices {
        let speaker = HostSpeaker::detect().wrap_err("Cannot list voices")?;
        return list_voices(&speaker, cli.json).await;
    }

    let name = if cli.name.is_empty() {
        read_from_stdin()?
    } else {
        join_args(&cli.name)
    };

    if name.trim().is_empty() {
        bail!("No name provided. Usage: say-my-name <NAME> or echo \"NAME\" | say-my-name");
    }

    let generator = config.chip_generator()?;
    let set = apply_edits(generator.generate(&name), &cli.labels, cli.say_as.as_deref());

    if cli.json {
        let report = Report {
            chip_set: &set,
            payload: set.payload(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&set));
    }

    if cli.speak {
        speak(&set, &config).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mouth_sounds::{generate_chips_from_name, Chip};

    #[test]
    fn test_join_args_multi_word() {
        let args = vec!["Mary".to_string(), "Jane".to_string()];
        assert_eq!(join_args(&args), "Mary Jane");
    }

    #[test]
    fn test_join_args_empty() {
        let args: Vec<String> = vec![];
        assert_eq!(join_args(&args), "");
    }

    #[test]
    fn test_apply_edits_without_edits_keeps_generated() {
        let generated = generate_chips_from_name("davik");
        assert_eq!(apply_edits(generated.clone(), &[], None), generated);
    }

    #[test]
    fn test_apply_edits_with_labels_keeps_say_as() {
        let labels = vec!["D".to_string(), "AY".to_string(), "vik".to_string()];
        let set = apply_edits(generate_chips_from_name("davik"), &labels, None);

        assert_eq!(
            set.chips,
            vec![
                Chip::new("D", "d"),
                Chip::new("AY", "ay"),
                Chip::new("VIK", "vik")
            ]
        );
        assert_eq!(set.say_as, "dav-ik");
    }

    #[test]
    fn test_apply_edits_with_say_as() {
        let set = apply_edits(generate_chips_from_name("davik"), &[], Some("day-vik"));
        assert_eq!(set.say_as, "day-vik");
        assert_eq!(set.labels(), vec!["DAV", "IK"]);
    }

    #[test]
    fn test_merge_config_prefers_flags() {
        let cli = Cli::parse_from(["say-my-name", "earl", "--rate", "1.5", "--max-chips", "2"]);
        let config = Config {
            rate: Some(0.5),
            pitch: Some(1.2),
            ..Config::default()
        };
        let merged = merge_config(config, &cli);

        assert_eq!(merged.rate, Some(1.5));
        assert_eq!(merged.pitch, Some(1.2));
        assert_eq!(merged.max_chips, Some(2));
    }

    #[test]
    fn test_labels_flag_splits_on_commas() {
        let cli = Cli::parse_from(["say-my-name", "earl", "--labels", "ER,L"]);
        assert_eq!(cli.labels, vec!["ER", "L"]);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&generate_chips_from_name("earl"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("  ur"));
        assert!(lines[1].ends_with("  luh"));
        assert!(lines[2].ends_with(" earl"));
        assert!(lines[3].ends_with("ur, luh. earl"));
    }

    #[test]
    fn test_render_text_aligns_non_ascii_labels() {
        let set = ChipSet {
            chips: vec![Chip::new("ÆRØ", "aero"), Chip::new("B", "b")],
            say_as: "aero-b".to_string(),
        };
        let text = render_text(&set);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].ends_with("  aero"));
        assert!(lines[1].ends_with("    b"));
        // speak column starts at the same character offset on every line
        assert_eq!(
            lines[0].chars().count() - "aero".len(),
            lines[1].chars().count() - "b".len()
        );
    }

    #[test]
    fn test_read_name_trims() {
        assert_eq!(read_name(&b"  Mary Jane \n"[..]).unwrap(), "Mary Jane");
    }

    #[test]
    fn test_read_name_cut_inside_a_character() {
        // "é" is two bytes, so the cap falls after its first byte
        let mut input = "a".repeat(STDIN_LIMIT as usize - 1).into_bytes();
        input.extend_from_slice("éé".as_bytes());

        let name = read_name(&input[..]).unwrap();
        assert!(name.starts_with("aaa"));
        assert_eq!(name.chars().filter(|c| *c == 'a').count(), STDIN_LIMIT as usize - 1);
        assert!(!name.contains('é'));
    }

    #[test]
    fn test_read_name_stops_at_limit() {
        let input = "b".repeat(STDIN_LIMIT as usize + 500);
        let name = read_name(input.as_bytes()).unwrap();
        assert_eq!(name.len(), STDIN_LIMIT as usize);
    }
}
