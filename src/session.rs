//! Extraction session: one full pass, then splits-only polling until the
//! table renders.
//!
//! A [`Session`] owns the record and the polling task. The task is the only
//! writer; presentation layers read through [`Session::subscribe`]. Dropping
//! or closing the session cancels polling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::{PollConfig, Settings};
use crate::error::{ExtractionError, SessionError};
use crate::gate;
use crate::host::{execute, PageHost};
use crate::parser::{extract_activity_with, extract_splits, Page};
use crate::record::ActivityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Final record is ready; no polling pending.
    Settled,
    /// Splits were empty after the full pass; polling is scheduled.
    AwaitingSplits,
    /// Polling hit `max_attempts` without finding splits.
    SplitsUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PollState,
    pub record: ActivityRecord,
}

/// Polling diagnostics. Swallowed errors never reach the user; they are
/// only counted here and logged at debug level.
#[derive(Debug, Default)]
pub struct PollStats {
    attempts: AtomicU32,
    swallowed_errors: AtomicU32,
}

impl PollStats {
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn swallowed_errors(&self) -> u32 {
        self.swallowed_errors.load(Ordering::Relaxed)
    }
}

pub struct Session {
    rx: watch::Receiver<SessionSnapshot>,
    stats: Arc<PollStats>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Session {
    /// Gate the page, run the full extraction and start polling if splits are missing.
    pub async fn open<H>(host: Arc<H>, settings: &Settings) -> Result<Session, SessionError>
    where
        H: PageHost + ?Sized + 'static,
    {
        let record = run_gated(&*host, settings, |page| {
            extract_activity_with(page, &settings.scanner)
        })
        .await?;

        let stats = Arc::new(PollStats::default());
        let cancel = CancellationToken::new();

        if !record.splits.is_empty() {
            info!("Extracted activity with {} splits", record.splits.len());
            let (_tx, rx) = watch::channel(SessionSnapshot {
                state: PollState::Settled,
                record,
            });
            return Ok(Session {
                rx,
                stats,
                cancel,
                task: None,
            });
        }

        if settings.poll.max_attempts == Some(0) {
            warn!("Splits not rendered and polling is disabled");
            let (_tx, rx) = watch::channel(SessionSnapshot {
                state: PollState::SplitsUnavailable,
                record,
            });
            return Ok(Session {
                rx,
                stats,
                cancel,
                task: None,
            });
        }

        info!(
            "Extracted activity, splits not rendered yet; polling every {}ms",
            settings.poll.interval.as_millis()
        );
        let (tx, rx) = watch::channel(SessionSnapshot {
            state: PollState::AwaitingSplits,
            record,
        });
        let task = tokio::spawn(poll_splits(
            host,
            settings.poll,
            tx,
            Arc::clone(&stats),
            cancel.clone(),
        ));

        Ok(Session {
            rx,
            stats,
            cancel,
            task: Some(task),
        })
    }

    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.rx.clone()
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Wait until polling ends. Returns immediately for a settled session.
    pub async fn settled(&self) -> SessionSnapshot {
        let mut rx = self.rx.clone();
        if rx
            .wait_for(|s| s.state != PollState::AwaitingSplits)
            .await
            .is_err()
        {
            debug!("splits polling ended without settling");
        }
        let snapshot = rx.borrow().clone();
        snapshot
    }

    /// Stop polling and wait for the task to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("splits polling task failed to join: {e}");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// One gated extraction pass. Any failure is surfaced, never retried.
/// A host with no known address never passes the gate.
pub async fn run_gated<H, T, F>(host: &H, settings: &Settings, job: F) -> Result<T, SessionError>
where
    H: PageHost + ?Sized,
    F: FnOnce(&Page) -> T,
{
    gate::check(
        host.location().unwrap_or_default(),
        &settings.gate_pattern,
        &settings.messages.not_activity_page,
    )?;

    execute(host, job).await.map_err(|source| {
        ExtractionError {
            prefix: settings.messages.extraction_error.clone(),
            source,
        }
        .into()
    })
}

async fn poll_splits<H>(
    host: Arc<H>,
    poll: PollConfig,
    tx: watch::Sender<SessionSnapshot>,
    stats: Arc<PollStats>,
    cancel: CancellationToken,
) where
    H: PageHost + ?Sized,
{
    // First run one period after the full pass, like a plain interval timer.
    let period = poll.interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("splits polling cancelled after {} attempts", stats.attempts());
                break;
            }
            _ = ticker.tick() => {
                let attempt = stats.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                // A slow snapshot must not hold up close().
                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("splits polling cancelled during poll {}", attempt);
                        break;
                    }
                    result = execute(&*host, extract_splits) => result,
                };
                match result {
                    Ok(splits) if !splits.is_empty() => {
                        info!("Splits appeared after {} polls ({} rows)", attempt, splits.len());
                        tx.send_modify(|s| {
                            s.record.splits = splits;
                            s.state = PollState::Settled;
                        });
                        break;
                    }
                    Ok(_) => trace!("poll {}: splits still empty", attempt),
                    Err(e) => {
                        stats.swallowed_errors.fetch_add(1, Ordering::Relaxed);
                        debug!("poll {} failed, treating as empty: {}", attempt, e);
                    }
                }

                if poll.max_attempts.is_some_and(|max| attempt >= max) {
                    warn!("No splits after {} polls, giving up", attempt);
                    tx.send_modify(|s| s.state = PollState::SplitsUnavailable);
                    break;
                }
            }
        }
    }
}
