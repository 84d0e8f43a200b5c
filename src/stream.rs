//! Sample stream plumbing for feeding a scheduler.
//!
//! The scheduler itself is synchronous and single-threaded; this module
//! provides the producer side used by the CLI: a synthetic multi-channel
//! source for demos and smoke testing, and a line parser for piping
//! pre-recorded samples in over stdin.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One multi-channel observation with its stream timestamp in seconds.
#[derive(Debug, Clone)]
pub struct StreamSample {
    pub values: Vec<f32>,
    pub timestamp: f64,
}

/// Errors from parsing a textual sample line.
#[derive(Debug)]
pub enum ParseError {
    /// The line did not contain a timestamp followed by one value per channel.
    WrongFieldCount { expected: usize, got: usize },
    /// A field was not a valid number.
    BadNumber(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::WrongFieldCount { expected, got } => {
                write!(f, "expected {expected} fields, got {got}")
            }
            ParseError::BadNumber(field) => write!(f, "not a number: {field}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one `timestamp,v1,...,vN` line into a sample.
pub fn parse_sample_line(line: &str, num_signals: usize) -> Result<StreamSample, ParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() != num_signals + 1 {
        return Err(ParseError::WrongFieldCount {
            expected: num_signals + 1,
            got: fields.len(),
        });
    }

    let timestamp: f64 = fields[0]
        .parse()
        .map_err(|_| ParseError::BadNumber(fields[0].to_string()))?;

    let values = fields[1..]
        .iter()
        .map(|f| f.parse().map_err(|_| ParseError::BadNumber(f.to_string())))
        .collect::<Result<Vec<f32>, _>>()?;

    Ok(StreamSample { values, timestamp })
}

/// Configuration for the synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Number of channels to generate
    pub num_signals: usize,
    /// Nominal sample rate in Hz
    pub sample_rate_hz: f64,
    /// Timing jitter as a fraction of the sample period (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_signals: 2,
            sample_rate_hz: 100.0,
            jitter: 0.2,
        }
    }
}

/// A background producer of jittered sine-wave samples.
///
/// Emulates a real capture device: samples arrive on a bounded channel at
/// roughly the nominal rate, with irregular spacing, and with timestamps
/// taken from a monotonic clock.
pub struct SyntheticSource {
    config: SyntheticConfig,
    sender: Sender<StreamSample>,
    receiver: Receiver<StreamSample>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    /// Create a new synthetic source.
    pub fn new(config: SyntheticConfig) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start producing samples on a background thread.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();

        self.handle = Some(thread::spawn(move || {
            produce(config, sender, running);
        }));
    }

    /// Stop the producer thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the producer thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for produced samples.
    pub fn receiver(&self) -> &Receiver<StreamSample> {
        &self.receiver
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn produce(config: SyntheticConfig, sender: Sender<StreamSample>, running: Arc<AtomicBool>) {
    let period = 1.0 / config.sample_rate_hz;
    let start = Instant::now();
    // Small xorshift state for deterministic timing jitter.
    let mut rng_state: u64 = 0x9e37_79b9_7f4a_7c15;

    while running.load(Ordering::SeqCst) {
        let timestamp = start.elapsed().as_secs_f64();

        let values: Vec<f32> = (0..config.num_signals)
            .map(|ch| {
                let freq = 0.5 + ch as f64;
                (2.0 * std::f64::consts::PI * freq * timestamp).sin() as f32
            })
            .collect();

        // If the consumer fell behind and the channel is full, drop the sample.
        let _ = sender.try_send(StreamSample { values, timestamp });

        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 7;
        rng_state ^= rng_state << 17;
        let unit = (rng_state >> 11) as f64 / (1u64 << 53) as f64;
        let jittered = period * (1.0 + config.jitter * (2.0 * unit - 1.0));

        thread::sleep(Duration::from_secs_f64(jittered.max(period * 0.1)));
    }
}
