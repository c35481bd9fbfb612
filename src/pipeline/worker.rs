//! The capture worker task.
//!
//! One task per running stream owns the whole production path: pull a raw
//! frame, run detection when armed, substitute the blank payload while
//! masked, stamp timing, post the clock, and offer the frame to the queue.
//! Cooldown ticks arrive through the same `select!`, so every piece of
//! masking state is touched from exactly one task and needs no locks.

use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::clock::StreamClock;
use super::cooldown::{MaskingState, TickOutcome};
use super::queue::FrameQueue;
use crate::CameraError;
use crate::config::CameraConfig;
use crate::detect::{Detector, PresenceReport, evaluate_fail_open};
use crate::source::CaptureSource;
use crate::types::{FrameTiming, VideoFrame};

/// Lifecycle state shared between the worker task, start/stop calls, and
/// device property reads.
///
/// Epoch and running flag live in one packed word (epoch in the high bits,
/// running in bit 0) so a worker from a previous run can retire without
/// clobbering the state of the run that replaced it. The frame sequence
/// survives restarts; it only ever moves forward.
#[derive(Debug)]
pub struct StreamShared {
    state: AtomicU64,
    next_sequence: AtomicU64,
    failure: Mutex<Option<CameraError>>,
}

impl StreamShared {
    /// Stopped state at epoch zero.
    pub fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
            next_sequence: AtomicU64::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Whether a worker currently owns the stream.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) & 1 == 1
    }

    /// Epoch of the current (or most recent) run.
    pub fn epoch(&self) -> u64 {
        self.state.load(Ordering::Acquire) >> 1
    }

    /// Open a new run: advance the epoch and set running in one step.
    /// Returns the new epoch.
    pub(crate) fn begin_run(&self) -> u64 {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                Some((((state >> 1) + 1) << 1) | 1)
            })
            .unwrap_or_else(|value| value);
        (previous >> 1) + 1
    }

    /// Clear the running flag, keeping the epoch.
    pub(crate) fn end_run(&self) {
        self.state.fetch_and(!1, Ordering::AcqRel);
    }

    /// Retire a worker: clear running only if `epoch` is still current and
    /// the flag is still set. Returns whether this call cleared it.
    pub(crate) fn clear_running_for_epoch(&self, epoch: u64) -> bool {
        self.state
            .compare_exchange(
                (epoch << 1) | 1,
                epoch << 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Sequence slot the next accepted frame will occupy.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::Acquire)
    }

    pub(crate) fn advance_sequence(&self) {
        self.next_sequence.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_failure(&self, error: CameraError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Take the most recent terminal failure, if the last run ended in one.
    pub fn take_failure(&self) -> Option<CameraError> {
        self.failure.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Default for StreamShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a worker run needs, handed over at spawn.
pub struct WorkerContext {
    pub config: CameraConfig,
    pub shared: Arc<StreamShared>,
    pub queue: Arc<FrameQueue>,
    pub clock: Arc<StreamClock>,
    pub detector: Arc<Mutex<dyn Detector>>,
    pub frames: watch::Sender<Option<Arc<VideoFrame>>>,
    pub cancel: CancellationToken,
    pub epoch: u64,
    pub source: Box<dyn CaptureSource>,
}

/// Spawn the worker task for one run.
pub fn spawn(ctx: WorkerContext) -> JoinHandle<()> {
    tokio::spawn(run(ctx))
}

async fn run(ctx: WorkerContext) {
    let WorkerContext {
        config,
        shared,
        queue,
        clock,
        detector,
        frames,
        cancel,
        epoch,
        mut source,
    } = ctx;

    info!(epoch, "capture worker started");

    // The masked payload is all zeroes in the stream's own geometry; build
    // it once and share it across every masked frame.
    let blank: Arc<[u8]> = Arc::from(vec![0u8; config.frame_bytes()]);
    let mut masking = MaskingState::new(config.cooldown_ticks);
    let mut ticker: Option<Interval> = None;
    let tick_period = config.tick_interval();
    let mut produced = 0u64;
    let mut error_count = 0u32;

    loop {
        if cancel.is_cancelled() {
            info!("capture worker cancelled");
            break;
        }

        let event = tokio::select! {
            _ = cancel.cancelled() => {
                info!("capture worker cancelled during read");
                break;
            }
            _ = tick_or_pending(ticker.as_mut()) => Event::Tick,
            result = source.next_frame() => Event::Source(result),
        };

        match event {
            Event::Tick => match masking.tick() {
                TickOutcome::StillActive { remaining } => {
                    trace!(remaining, "cooldown tick");
                }
                TickOutcome::Expired => {
                    info!("cooldown expired, masking lifted");
                    ticker = None;
                }
                TickOutcome::Ignored => {
                    debug!("tick while idle, stopping timer");
                    ticker = None;
                }
            },
            Event::Source(Ok(Some(captured))) => {
                error_count = 0;

                let mut report = PresenceReport::clear();
                if masking.detection_armed() {
                    let detector = Arc::clone(&detector);
                    let frame = captured.clone();
                    let joined = tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("capture worker cancelled during detection");
                            break;
                        }
                        joined = tokio::task::spawn_blocking(move || {
                            evaluate_fail_open(&detector, &frame)
                        }) => joined,
                    };
                    report = match joined {
                        Ok(report) => report,
                        Err(join_error) => {
                            warn!(
                                error = %join_error,
                                "detection task failed, treating frame as clear"
                            );
                            PresenceReport::clear()
                        }
                    };
                }

                // A frame read can win the select race against
                // cancellation; nothing is delivered once the run is
                // cancelled.
                if cancel.is_cancelled() {
                    info!("capture worker cancelled before delivery");
                    break;
                }

                if report.person_present && masking.flag_presence() {
                    info!(
                        confidence = report.confidence,
                        ticks = config.cooldown_ticks,
                        "person detected, masking frames"
                    );
                    let mut tick = interval_at(Instant::now() + tick_period, tick_period);
                    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker = Some(tick);
                }

                let masked = masking.should_mask();
                let sequence = shared.next_sequence();
                let timing = FrameTiming::for_sequence(sequence, config.frame_rate);
                clock.post(timing.presentation);

                // Masked frames carry the stream's configured geometry; the
                // blank payload is sized for it, not for the capture's.
                let frame = Arc::new(if masked {
                    VideoFrame::new(
                        Arc::clone(&blank),
                        config.width,
                        config.height,
                        config.pixel_format,
                        timing,
                        sequence,
                    )
                } else {
                    VideoFrame::new(
                        Arc::clone(&captured.data),
                        captured.width,
                        captured.height,
                        captured.pixel_format,
                        timing,
                        sequence,
                    )
                });

                let accepted = queue.enqueue(Arc::clone(&frame));
                if accepted {
                    shared.advance_sequence();
                    produced += 1;
                    frames.send_replace(Some(frame));
                }
                trace!(sequence, masked, accepted, "frame processed");
            }
            Event::Source(Ok(None)) => {
                info!(produced, "capture source ended");
                break;
            }
            Event::Source(Err(e)) => {
                error_count += 1;
                error!(
                    error = %e,
                    attempt = error_count,
                    budget = config.source_error_budget,
                    "capture source error"
                );

                if error_count >= config.source_error_budget {
                    error!("source error budget exhausted, stopping stream");
                    shared.record_failure(CameraError::StreamTerminated {
                        consecutive_errors: error_count,
                    });
                    break;
                }

                // Exponential backoff, capped at 1.6s.
                let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                tokio::time::sleep(backoff).await;
            }
        }
    }

    // Retire: only the run that still owns the epoch may flip the stream to
    // stopped and close out the monitoring tap.
    if shared.clear_running_for_epoch(epoch) {
        frames.send_replace(None);
    }
    info!(epoch, produced, "capture worker ended");
}

enum Event {
    Tick,
    Source(crate::Result<Option<crate::types::CapturedFrame>>),
}

async fn tick_or_pending(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
