//! winfer CLI
//!
//! Feeds a live sample stream through the windowed resampler and runs ONNX
//! inference whenever the trigger policy fires.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use winfer::{
    config::Config,
    core::{ControlGrid, InferenceScheduler, TensorLayout},
    engine::InferenceEngine,
    stats::RunStats,
    stream::{parse_sample_line, StreamSample, SyntheticConfig, SyntheticSource},
    VERSION,
};

/// Timing jitter of the synthetic source, as a fraction of the sample period.
const SYNTHETIC_JITTER: f64 = 0.2;

#[derive(Parser)]
#[command(name = "winfer")]
#[command(version = VERSION)]
#[command(about = "Windowed resampling and inference triggering for signal streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream samples through the resampler and run inference on triggers
    Run {
        /// Path to the ONNX model (overrides the configured model path)
        #[arg(long, short)]
        model: Option<PathBuf>,

        /// Samples per window
        #[arg(long)]
        window_size: Option<usize>,

        /// Channels per sample
        #[arg(long)]
        signals: Option<usize>,

        /// Nominal sample rate in Hz
        #[arg(long)]
        rate: Option<f64>,

        /// Minimum seconds of stream time between inference triggers
        #[arg(long)]
        interval: Option<f64>,

        /// Tensor layout handed to the engine (channel-major or time-major)
        #[arg(long)]
        layout: Option<String>,

        /// Read `timestamp,v1,...,vN` lines from stdin instead of the
        /// synthetic source
        #[arg(long)]
        stdin: bool,

        /// Stop after this many samples (runs until Ctrl+C if unset)
        #[arg(long)]
        max_samples: Option<u64>,
    },

    /// Show statistics from the last run
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            window_size,
            signals,
            rate,
            interval,
            layout,
            stdin,
            max_samples,
        } => {
            if let Err(e) = cmd_run(
                model,
                window_size,
                signals,
                rate,
                interval,
                layout,
                stdin,
                max_samples,
            ) {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    model: Option<PathBuf>,
    window_size: Option<usize>,
    signals: Option<usize>,
    rate: Option<f64>,
    interval: Option<f64>,
    layout: Option<String>,
    stdin: bool,
    max_samples: Option<u64>,
) -> anyhow::Result<()> {
    println!("winfer v{VERSION}");
    println!();

    // Load configuration and apply command-line overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(v) = window_size {
        config.window_size = v;
    }
    if let Some(v) = signals {
        config.num_signals = v;
    }
    if let Some(v) = rate {
        config.sample_rate_hz = v;
    }
    if let Some(v) = interval {
        config.inference_interval_secs = v;
    }
    if let Some(ref name) = layout {
        config.tensor_layout = TensorLayout::from_name(name)
            .with_context(|| format!("unknown tensor layout: {name}"))?;
    }
    if model.is_some() {
        config.model_path = model;
    }

    config.validate().context("invalid configuration")?;
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Starting stream...");
    println!("  Window size: {} samples", config.window_size);
    println!("  Channels: {}", config.num_signals);
    println!("  Sample rate: {} Hz", config.sample_rate_hz);
    println!("  Inference interval: {}s", config.inference_interval_secs);
    println!("  Tensor layout: {:?}", config.tensor_layout);
    println!(
        "  Source: {}",
        if stdin { "stdin" } else { "synthetic" }
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let engine = build_engine(&config)?;

    // The synthetic source can space samples up to SYNTHETIC_JITTER short of
    // nominal; its grid span shrinks by the same margin so a full window of
    // jittered samples always covers it. Stdin streams declare their rate.
    let grid = if stdin {
        ControlGrid::for_window(config.window_size, config.sample_rate_hz)
    } else {
        ControlGrid::for_jittered_window(config.window_size, config.sample_rate_hz, SYNTHETIC_JITTER)
    };
    let scheduler = InferenceScheduler::new(
        engine,
        grid,
        config.num_signals,
        config.inference_interval_secs,
        config.tensor_layout,
    );

    let stats = RunStats::with_persistence(config.data_path.join("stats.json"));
    println!("Run ID: {}", stats.run_id());

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }

    if stdin {
        let receiver = spawn_stdin_reader(config.num_signals);
        stream_loop(scheduler, &receiver, &running, &stats, max_samples);
    } else {
        let mut source = SyntheticSource::new(SyntheticConfig {
            num_signals: config.num_signals,
            sample_rate_hz: config.sample_rate_hz,
            jitter: SYNTHETIC_JITTER,
        });
        source.start();
        stream_loop(scheduler, source.receiver(), &running, &stats, max_samples);
        source.stop();
    }

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save run statistics: {e}");
    }

    println!();
    println!("{}", stats.summary());

    Ok(())
}

#[cfg(feature = "onnx")]
fn build_engine(config: &Config) -> anyhow::Result<winfer::OnnxEngine> {
    let model_path = config
        .model_path
        .as_ref()
        .context("no model configured; pass --model or set model_path in the config")?;

    winfer::OnnxEngine::from_file(
        model_path,
        config.window_size,
        config.num_signals,
        config.tensor_layout,
    )
    .with_context(|| format!("could not load model {}", model_path.display()))
}

#[cfg(not(feature = "onnx"))]
fn build_engine(_config: &Config) -> anyhow::Result<std::convert::Infallible> {
    anyhow::bail!("this build has no inference backend (rebuild with the `onnx` feature)")
}

/// Drain the sample stream, pushing into the scheduler until shutdown.
fn stream_loop<E: InferenceEngine>(
    mut scheduler: InferenceScheduler<E>,
    receiver: &Receiver<StreamSample>,
    running: &AtomicBool,
    stats: &RunStats,
    max_samples: Option<u64>,
) {
    let mut pushed: u64 = 0;
    let mut last_timestamp = f64::NEG_INFINITY;
    let mut last_save = std::time::Instant::now();

    while running.load(Ordering::SeqCst) {
        let sample = match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(sample) => sample,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };

        // The scheduler treats non-increasing timestamps as a broken caller
        // invariant; skip them here rather than crash on malformed input.
        if sample.timestamp <= last_timestamp {
            eprintln!(
                "Warning: skipping out-of-order sample at t={}",
                sample.timestamp
            );
            continue;
        }
        last_timestamp = sample.timestamp;

        stats.record_sample();
        match scheduler.push_sample(&sample.values, sample.timestamp) {
            Ok(Some(outputs)) => {
                stats.record_inference();
                let preview: Vec<f32> = outputs
                    .first()
                    .map(|buf| buf.iter().take(4).copied().collect())
                    .unwrap_or_default();
                println!(
                    "[t={:.3}s] inference: {} output buffer(s), first values: {:?}",
                    sample.timestamp,
                    outputs.len(),
                    preview
                );
            }
            Ok(None) => {}
            Err(e) => {
                stats.record_engine_failure();
                eprintln!("Warning: inference failed: {e}");
            }
        }

        if last_save.elapsed() >= Duration::from_secs(5) {
            if let Err(e) = stats.save() {
                eprintln!("Warning: Could not save run statistics: {e}");
            }
            last_save = std::time::Instant::now();
        }

        pushed += 1;
        if let Some(max) = max_samples {
            if pushed >= max {
                break;
            }
        }
    }
}

/// Read `timestamp,v1,...,vN` lines from stdin on a background thread.
fn spawn_stdin_reader(num_signals: usize) -> Receiver<StreamSample> {
    let (sender, receiver) = crossbeam_channel::bounded(10_000);

    std::thread::spawn(move || {
        use std::io::BufRead;

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_sample_line(&line, num_signals) {
                Ok(sample) => {
                    if sender.send(sample).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("Warning: skipping malformed line: {e}");
                }
            }
        }
    });

    receiver
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();
    let stats_path = config.data_path.join("stats.json");

    if !stats_path.exists() {
        println!("No run statistics found at {:?}", stats_path);
        return;
    }

    match std::fs::read_to_string(&stats_path) {
        Ok(content) => match serde_json::from_str::<winfer::StatsSnapshot>(&content) {
            Ok(snapshot) => {
                println!("Last run: {}", snapshot.run_id);
                println!("  Started: {}", snapshot.run_start);
                println!("  Samples pushed: {}", snapshot.samples_pushed);
                println!("  Inferences run: {}", snapshot.inferences_run);
                println!("  Engine failures: {}", snapshot.engine_failures);
                println!("  Duration: {}s", snapshot.run_duration_secs);
            }
            Err(e) => eprintln!("Error: could not parse {:?}: {e}", stats_path),
        },
        Err(e) => eprintln!("Error: could not read {:?}: {e}", stats_path),
    }
}

fn cmd_config() {
    match Config::load() {
        Ok(config) => match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("Configuration file: {:?}", Config::config_path());
                println!("{json}");
            }
            Err(e) => eprintln!("Error serializing config: {e}"),
        },
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    }
}
