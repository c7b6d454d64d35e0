//! Batch decode pipeline: parallel per-frame decoding, ordered aggregation.
//!
//! Frame decoding is pure over immutable buffers, so it fans out across
//! blocking worker tasks with no shared mutable state. The sequence
//! aggregator is inherently order-dependent, so decoded frames are rejoined
//! in capture order and folded by a single consumer. A cooperative
//! cancellation flag is checked between frames; no frame ever needs
//! mid-decode cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::aggregate::{AggregateConfig, SequenceAggregator, SequenceEvent};
use crate::error::{DecodeError, Error, Result};
use crate::frame::{DecodedFrame, FrameDecoder, RawFrame};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of blocking decode workers.
    pub workers: usize,
    pub aggregate: AggregateConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            aggregate: AggregateConfig::default(),
        }
    }
}

/// Cooperative cancellation flag shared with a running pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; workers stop at the next frame boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-frame decode outcome. Failures stay attached to their frame; one
/// malformed frame never aborts the batch.
#[derive(Debug, Clone)]
pub enum DecodeOutcome {
    Frame(DecodedFrame),
    Failed {
        number: u64,
        time: f64,
        error: DecodeError,
    },
}

impl DecodeOutcome {
    pub fn frame(&self) -> Option<&DecodedFrame> {
        match self {
            DecodeOutcome::Frame(frame) => Some(frame),
            DecodeOutcome::Failed { .. } => None,
        }
    }
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// One outcome per input frame, in capture order. A cancelled run holds
    /// the decoded prefix only.
    pub frames: Vec<DecodeOutcome>,
    /// Aggregator event stream, in capture order.
    pub events: Vec<SequenceEvent>,
    /// True when the run stopped early on the cancellation flag.
    pub cancelled: bool,
}

/// Decode a batch of frames in parallel, preserving capture order.
///
/// The input is split into contiguous chunks, one blocking task per chunk;
/// rejoining the chunks in spawn order restores capture order without a
/// reorder buffer.
pub async fn decode_ordered(
    frames: Vec<RawFrame>,
    decoder: Arc<FrameDecoder>,
    config: &PipelineConfig,
    cancel: CancelFlag,
) -> Result<(Vec<DecodeOutcome>, bool)> {
    if frames.is_empty() {
        return Ok((Vec::new(), false));
    }

    let workers = config.workers.max(1);
    let chunk_size = frames.len().div_ceil(workers);

    let mut handles = Vec::with_capacity(workers);
    let mut frames = frames;
    while !frames.is_empty() {
        let rest = frames.split_off(chunk_size.min(frames.len()));
        let chunk = std::mem::replace(&mut frames, rest);
        let decoder = Arc::clone(&decoder);
        let cancel = cancel.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            decode_chunk(&chunk, &decoder, &cancel)
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        let chunk = handle.await.map_err(|e| Error::Worker(e.to_string()))?;
        outcomes.extend(chunk);
    }

    let cancelled = cancel.is_cancelled();
    Ok((outcomes, cancelled))
}

fn decode_chunk(
    frames: &[RawFrame],
    decoder: &FrameDecoder,
    cancel: &CancelFlag,
) -> Vec<DecodeOutcome> {
    let mut outcomes = Vec::with_capacity(frames.len());
    for raw in frames {
        if cancel.is_cancelled() {
            break;
        }
        match decoder.decode(raw) {
            Ok(frame) => outcomes.push(DecodeOutcome::Frame(frame)),
            Err(error) => {
                warn!(frame = raw.number, %error, "frame rejected");
                outcomes.push(DecodeOutcome::Failed {
                    number: raw.number,
                    time: raw.time,
                    error,
                });
            }
        }
    }
    outcomes
}

/// Run the full pipeline: parallel decode, then one ordered aggregation fold.
pub async fn run(
    frames: Vec<RawFrame>,
    decoder: Arc<FrameDecoder>,
    config: PipelineConfig,
    cancel: CancelFlag,
) -> Result<PipelineOutput> {
    let (outcomes, cancelled) = decode_ordered(frames, decoder, &config, cancel).await?;

    let mut aggregator = SequenceAggregator::new(config.aggregate);
    let mut events = Vec::new();
    for outcome in &outcomes {
        if let Some(frame) = outcome.frame() {
            events.extend(aggregator.ingest(frame));
        }
    }

    Ok(PipelineOutput {
        frames: outcomes,
        events,
        cancelled,
    })
}
