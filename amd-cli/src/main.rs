//! `amd` — replay a recorded inbound call leg through the detector.
//!
//! ## Flow
//!
//! ```text
//! load amd.json ──► ParameterStore
//! SimSwitch::originate + answer
//! uuid_amd_detect "<uuid> <overrides>"   (same path an external controller uses)
//! WAV frames ──► SimChannel::deliver ──► detach on verdict / end of file
//! print reply, verdict, channel variables, hooks, events
//! ```

mod settings;
mod switch;
mod wav;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use amd_core::{
    uuid_amd_detect, AmdEvent, AudioFrame, DecisionBus, FrameOutcome, ParameterStore, VerdictReport,
};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::info;

use settings::{default_config_path, load_parameters, save_parameters};
use switch::SimSwitch;

const DEFAULT_UUID: &str = "00000000-0000-0000-0000-00000000a3d0";
const DEFAULT_FRAME_MS: u32 = 20;

#[derive(Debug)]
struct Args {
    wav: PathBuf,
    config: Option<PathBuf>,
    uuid: String,
    frame_ms: u32,
    overrides: Option<String>,
    hangup_after_ms: Option<u64>,
    init_config: bool,
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    reply: String,
    frames_delivered: usize,
    verdict: Option<VerdictReport>,
    variables: BTreeMap<String, String>,
    hooks: Vec<String>,
    events: Vec<AmdEvent>,
}

const USAGE: &str = "Usage: amd --wav <file.wav> [--config <amd.json>] [--uuid <id>] \
[--frame-ms <n>] [--args \"key=val;key=val\"] [--hangup-after-ms <n>] [--json]
       amd --init-config [--config <amd.json>]";

fn parse_args() -> Result<Args> {
    let mut wav: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut uuid = DEFAULT_UUID.to_string();
    let mut frame_ms = DEFAULT_FRAME_MS;
    let mut overrides: Option<String> = None;
    let mut hangup_after_ms: Option<u64> = None;
    let mut init_config = false;
    let mut json = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--wav" => {
                let v = it.next().ok_or_else(|| anyhow!("missing value for --wav"))?;
                wav = Some(PathBuf::from(v));
            }
            "--config" => {
                let v = it.next().ok_or_else(|| anyhow!("missing value for --config"))?;
                config = Some(PathBuf::from(v));
            }
            "--uuid" => {
                uuid = it.next().ok_or_else(|| anyhow!("missing value for --uuid"))?;
            }
            "--frame-ms" => {
                let v = it.next().ok_or_else(|| anyhow!("missing value for --frame-ms"))?;
                frame_ms = v
                    .parse::<u32>()
                    .ok()
                    .filter(|ms| (1..=1000).contains(ms))
                    .ok_or_else(|| anyhow!("invalid value for --frame-ms: {v}"))?;
            }
            "--args" => {
                overrides = Some(it.next().ok_or_else(|| anyhow!("missing value for --args"))?);
            }
            "--hangup-after-ms" => {
                let v = it
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --hangup-after-ms"))?;
                hangup_after_ms = Some(
                    v.parse::<u64>()
                        .map_err(|_| anyhow!("invalid value for --hangup-after-ms: {v}"))?,
                );
            }
            "--init-config" => init_config = true,
            "--json" => json = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}\n{USAGE}"),
        }
    }

    let wav = match wav {
        Some(wav) => wav,
        None if init_config => PathBuf::new(),
        None => bail!("--wav is required\n{USAGE}"),
    };
    Ok(Args {
        wav,
        config,
        uuid,
        frame_ms,
        overrides,
        hangup_after_ms,
        init_config,
        json,
    })
}

fn run() -> Result<bool> {
    let args = parse_args()?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let store = ParameterStore::new(load_parameters(&config_path)?);
    info!(config_path = ?config_path, "AMD configuration loaded");

    if args.init_config {
        save_parameters(&config_path, &store.snapshot())
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("wrote {}", config_path.display());
        return Ok(true);
    }

    let frames = load_recording(&args)?;

    let switch = SimSwitch::new();
    let channel = switch.originate(&args.uuid);
    channel.answer();

    let bus = DecisionBus::new();
    let mut rx = bus.subscribe();

    let cmd = match args.overrides.as_deref() {
        Some(overrides) => format!("{} {}", args.uuid, overrides),
        None => args.uuid.clone(),
    };
    let reply = uuid_amd_detect(&switch, &store.snapshot(), &cmd, &bus);
    if !reply.is_ok() {
        println!("{reply}");
        return Ok(false);
    }

    let mut frames_delivered = 0;
    let mut elapsed_ms: u64 = 0;
    let mut verdict = None;
    for frame in &frames {
        if args.hangup_after_ms.is_some_and(|limit| elapsed_ms >= limit) {
            verdict = channel.hang_up();
            break;
        }
        elapsed_ms += u64::from(frame.duration_ms());
        match channel.deliver(frame) {
            None => break,
            Some(FrameOutcome::Decided(report)) => verdict = Some(report),
            Some(_) => {}
        }
        frames_delivered += 1;
    }
    // End of recording: the media path goes away.
    if let Some(report) = channel.detach() {
        info!(frames_delivered, "recording ended before a verdict");
        verdict = Some(report);
    }

    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    let summary = RunSummary {
        reply: reply.to_string(),
        frames_delivered,
        verdict,
        variables: channel.variables(),
        hooks: channel.hooks(),
        events,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to render summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(true)
}

fn load_recording(args: &Args) -> Result<Vec<AudioFrame>> {
    let frames = wav::read_frames(&args.wav, args.frame_ms)?;
    info!(
        wav = ?args.wav,
        frames = frames.len(),
        frame_ms = args.frame_ms,
        "recording loaded"
    );
    Ok(frames)
}

fn print_summary(summary: &RunSummary) {
    println!("{}", summary.reply);
    println!("frames delivered: {}", summary.frames_delivered);
    match &summary.verdict {
        Some(v) => println!("verdict: {}/{} at {}", v.result, v.cause, v.decided_at),
        None => println!("verdict: none"),
    }
    for (name, value) in &summary.variables {
        println!("  {name}={value}");
    }
    for hook in &summary.hooks {
        println!("  hook: {hook}");
    }
}

fn main() -> ExitCode {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("amd_core=info,amd=info")),
        )
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("amd failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
