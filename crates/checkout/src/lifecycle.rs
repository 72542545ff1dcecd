//! App lifecycle monitoring for the UPI flow.
//!
//! Opening a UPI deep link hands control to another application; the only
//! observable signal of what happened is when this process loses and
//! regains the foreground. [`AppLifecycleMonitor`] packages that into one
//! operation: wait until the process returns to foreground, recording
//! entry/exit timestamps, or until a caller-specified timeout elapses.
//!
//! Timestamps ride on the events themselves rather than being sampled from
//! a clock, so a fake [`LifecycleSource`] makes the whole heuristic
//! deterministic under test.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 16;

/// Whether the host process currently holds the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Foreground,
    Background,
}

/// One foreground/background transition, stamped by the publisher.
#[derive(Debug, Clone, Copy)]
pub struct PhaseChange {
    pub phase: AppPhase,
    pub at: DateTime<Utc>,
}

/// Publisher of lifecycle transitions.
///
/// The host application owns one of these and publishes every transition;
/// in tests a fake publishes fabricated transitions with fabricated
/// timestamps.
#[derive(Clone)]
pub struct LifecycleSource {
    tx: broadcast::Sender<PhaseChange>,
}

impl LifecycleSource {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a transition. Lossy if nobody is subscribed, which is fine:
    /// transitions only matter while a UPI attempt is in flight.
    pub fn publish(&self, phase: AppPhase, at: DateTime<Utc>) {
        let _ = self.tx.send(PhaseChange { phase, at });
    }

    fn subscribe(&self) -> broadcast::Receiver<PhaseChange> {
        self.tx.subscribe()
    }

    /// How many monitors are currently listening.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LifecycleSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of waiting for the process to return to foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// The process went to background and came back.
    Returned {
        left_at: DateTime<Utc>,
        returned_at: DateTime<Utc>,
    },
    /// No foreground return within the caller's timeout.
    TimedOut,
}

impl ReturnOutcome {
    /// Elapsed background time, zero for a timeout.
    #[must_use]
    pub fn background_elapsed(&self) -> Duration {
        match self {
            Self::Returned {
                left_at,
                returned_at,
            } => (*returned_at - *left_at).to_std().unwrap_or_default(),
            Self::TimedOut => Duration::ZERO,
        }
    }
}

/// A single-use subscription to lifecycle transitions.
///
/// Uniquely owned per in-flight UPI attempt. [`Self::wait_for_return`]
/// consumes the monitor, so the subscription is torn down deterministically
/// on both the return and the timeout path - no handler leaks across
/// repeated checkout attempts.
pub struct AppLifecycleMonitor {
    rx: broadcast::Receiver<PhaseChange>,
}

impl AppLifecycleMonitor {
    /// Subscribe to `source`. Must happen before the deep link is opened,
    /// or the background transition may be missed.
    #[must_use]
    pub fn subscribe(source: &LifecycleSource) -> Self {
        Self {
            rx: source.subscribe(),
        }
    }

    /// Wait until the process leaves and re-enters the foreground, or until
    /// `timeout` elapses.
    ///
    /// A foreground event with no preceding background event is ignored;
    /// the first background event wins if several arrive.
    pub async fn wait_for_return(mut self, timeout: Duration) -> ReturnOutcome {
        let wait = async {
            let mut left_at: Option<DateTime<Utc>> = None;
            loop {
                match self.rx.recv().await {
                    Ok(PhaseChange {
                        phase: AppPhase::Background,
                        at,
                    }) => {
                        if left_at.is_none() {
                            left_at = Some(at);
                        }
                    }
                    Ok(PhaseChange {
                        phase: AppPhase::Foreground,
                        at,
                    }) => {
                        if let Some(left_at) = left_at {
                            return ReturnOutcome::Returned {
                                left_at,
                                returned_at: at,
                            };
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "lifecycle monitor lagged behind transitions");
                    }
                    // Source dropped: no return can ever be observed.
                    Err(broadcast::error::RecvError::Closed) => return ReturnOutcome::TimedOut,
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(outcome) => outcome,
            Err(_) => ReturnOutcome::TimedOut,
        }
    }
}
