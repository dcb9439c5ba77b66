// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use drum808::config::{validate_config, DEFAULT_CONFIG_PATH};
use drum808::player::{create_sink, OutputFormat, PlayerSettings};
use drum808::play_song;
use drum808::sequencer::StopSignal;
use drum808::timing::TickInterval;

/// Default play time in seconds
const DEFAULT_DURATION_SECS: f64 = 20.0;

fn print_usage() {
    println!("drum808 - Drum Machine Step Sequencer");
    println!();
    println!("Usage: drum808 [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>      Song beat configuration (default {})", DEFAULT_CONFIG_PATH);
    println!("  --song <NAME>        Song to play (default: first song in the file)");
    println!("  --output <FORMAT>    Output format: text or audio (default text)");
    println!("  --duration <SECS>    Play time in seconds (default {})", DEFAULT_DURATION_SECS);
    println!("  --sounds <DIR>       Directory of TR-808 WAV samples");
    println!("  --list               List songs in the configuration");
    println!("  --help               Show this help message");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=debug) for scheduler logs. Ctrl+C stops playback.");
}

/// Parsed command line
#[derive(Debug)]
struct Options {
    config: PathBuf,
    song: Option<String>,
    output: OutputFormat,
    duration: Duration,
    settings: PlayerSettings,
    list: bool,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            song: None,
            output: OutputFormat::default(),
            duration: Duration::from_secs_f64(DEFAULT_DURATION_SECS),
            settings: PlayerSettings::default(),
            list: false,
            help: false,
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", flag))
        };

        match arg.as_str() {
            "--config" => options.config = PathBuf::from(value("--config")?),
            "--song" => options.song = Some(value("--song")?),
            "--output" => options.output = value("--output")?.parse()?,
            "--duration" => {
                let raw = value("--duration")?;
                let secs: f64 = raw
                    .parse()
                    .map_err(|_| anyhow!("Invalid duration: {}", raw))?;
                if secs <= 0.0 {
                    return Err(anyhow!("Duration must be a positive number of seconds: {}", raw));
                }
                options.duration = Duration::try_from_secs_f64(secs)
                    .map_err(|_| anyhow!("Duration out of range: {}", raw))?;
            }
            "--sounds" => options.settings.sound_dir = PathBuf::from(value("--sounds")?),
            "--list" => options.list = true,
            "--help" | "-h" => options.help = true,
            other => return Err(anyhow!("Unknown option: {}", other)),
        }
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return Ok(());
    }

    let config = validate_config(&options.config)
        .with_context(|| format!("Invalid configuration in {:?}", options.config))?;

    if options.list {
        for song in &config.song_beat {
            println!(
                "{} ({} BPM, {} beats x {} notes)",
                song.name, song.beats_per_minute, song.beats_per_sequence, song.notes_per_beat
            );
        }
        return Ok(());
    }

    let song = match &options.song {
        Some(name) => config.song(name)?,
        None => config.first_song()?,
    };
    let spec = song
        .to_beat_spec()
        .with_context(|| format!("Song '{}' cannot be played", song.name))?;
    let interval = TickInterval::from_tempo(spec.beats_per_minute(), spec.notes_per_beat())?;

    let sink = create_sink(options.output, &options.settings)
        .with_context(|| format!("Failed to create {} output", options.output))?;

    println!(
        "\nPlaying {} at BPM: {} ({} per step)",
        song.name,
        spec.beats_per_minute(),
        interval
    );

    let stop = StopSignal::new();
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let report = play_song(&spec, sink, Some(options.duration), stop).await?;
    tracing::info!(ticks = report.ticks, dispatches = report.dispatches, "playback finished");

    println!("Song {} completed!", song.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("drum808")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let options = parse_args(&args(&[])).unwrap();
        assert_eq!(options.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(options.output, OutputFormat::Text);
        assert_eq!(options.duration, Duration::from_secs(20));
        assert!(options.song.is_none());
    }

    #[test]
    fn test_all_flags() {
        let options = parse_args(&args(&[
            "--config", "songs.yaml", "--song", "Four on the Floor", "--output", "audio",
            "--duration", "2.5", "--sounds", "kit", "--list",
        ]))
        .unwrap();

        assert_eq!(options.config, PathBuf::from("songs.yaml"));
        assert_eq!(options.song.as_deref(), Some("Four on the Floor"));
        assert_eq!(options.output, OutputFormat::Audio);
        assert_eq!(options.duration, Duration::from_millis(2500));
        assert_eq!(options.settings.sound_dir, PathBuf::from("kit"));
        assert!(options.list);
    }

    #[test]
    fn test_bad_flags() {
        assert!(parse_args(&args(&["--song"])).is_err());
        assert!(parse_args(&args(&["--output", "midi"])).is_err());
        assert!(parse_args(&args(&["--duration", "-1"])).is_err());
        assert!(parse_args(&args(&["--duration", "soon"])).is_err());
        assert!(parse_args(&args(&["--duration", "inf"])).is_err());
        assert!(parse_args(&args(&["--duration", "NaN"])).is_err());
        assert!(parse_args(&args(&["--duration", "1e30"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
