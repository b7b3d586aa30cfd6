//! Drives refresh cycles from three triggers: startup, a fixed-period timer and
//! visibility changes.
//!
//! While the display is hidden, timer ticks are dropped without touching the
//! network. Becoming visible runs one cycle straight away; the timer itself is
//! never reset.
//!
//! Cycles are not awaited inline. Each one is numbered when it is triggered and
//! its fetch runs alongside the others, so a slow response cannot hold up later
//! triggers. A successful completion is only shown if no later-numbered cycle
//! has already finished, whether that cycle succeeded or failed. Every cycle is
//! bounded by a deadline, so a server that never answers cannot pile up work.

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::{FetchError, SensorSource};
use crate::dashboard::{DisplaySink, DisplaySync};
use crate::environment::Readiness;
use crate::models::{RefreshTrigger, SensorReading, Visibility};

/// Counters collected over the scheduler's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles_started: u64,
    pub applied: u64,
    pub discarded: u64,
    pub failed: u64,
    pub suppressed_ticks: u64,
}

const DEFAULT_TIMEOUT_PERIODS: u32 = 5;

struct Completion {
    seq: u64,
    trigger: RefreshTrigger,
    started: Instant,
    result: Result<SensorReading, FetchError>,
}

pub struct Scheduler<F, S> {
    source: Rc<F>,
    display: DisplaySync<S>,
    period: Duration,
    cycle_timeout: Duration,
    visibility: Visibility,
    next_seq: u64,
    last_completed: Option<u64>,
    stats: SchedulerStats,
}

impl<F, S> Scheduler<F, S>
where
    F: SensorSource + 'static,
    S: DisplaySink,
{
    /// The cycle deadline defaults to five periods.
    pub fn new(source: F, display: DisplaySync<S>, period: Duration) -> Self {
        Self {
            source: Rc::new(source),
            display,
            period,
            cycle_timeout: period * DEFAULT_TIMEOUT_PERIODS,
            visibility: Visibility::Visible,
            next_seq: 0,
            last_completed: None,
            stats: SchedulerStats::default(),
        }
    }

    /// Longest a single cycle may wait for its fetch before it is failed as a network error.
    pub fn with_cycle_timeout(mut self, cycle_timeout: Duration) -> Self {
        self.cycle_timeout = cycle_timeout.max(Duration::from_millis(1));
        self
    }

    /// Runs until `shutdown` resolves. Pass `std::future::pending()` to run for the
    /// lifetime of the process.
    pub async fn run<D>(
        mut self,
        readiness: Readiness,
        mut visibility_rx: mpsc::UnboundedReceiver<Visibility>,
        shutdown: D,
    ) -> SchedulerStats
    where
        D: Future<Output = ()>,
    {
        readiness.wait().await;

        let mut in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>> =
            FuturesUnordered::new();
        in_flight.push(self.start_cycle(RefreshTrigger::InitialLoad));

        let mut timer = time::interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Refreshing every {} ms", self.period.as_millis());

        let mut environment_open = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,

                _ = timer.tick() => {
                    if let Some(cycle) = self.on_tick() {
                        in_flight.push(cycle);
                    }
                }

                change = visibility_rx.recv(), if environment_open => match change {
                    Some(visibility) => {
                        if let Some(cycle) = self.on_visibility(visibility) {
                            in_flight.push(cycle);
                        }
                    }
                    None => {
                        // Keep the last known state; the timer carries on
                        info!("Visibility updates ended, staying {:?}", self.visibility);
                        environment_open = false;
                    }
                },

                Some(done) = in_flight.next(), if !in_flight.is_empty() => self.complete(done),
            }
        }

        debug!("Scheduler stopped with {} cycle(s) in flight", in_flight.len());
        self.stats
    }

    fn start_cycle(&mut self, trigger: RefreshTrigger) -> LocalBoxFuture<'static, Completion> {
        self.next_seq += 1;
        self.stats.cycles_started += 1;
        let seq = self.next_seq;
        debug!("Refresh cycle #{seq} started ({trigger})");

        let source = Rc::clone(&self.source);
        let deadline = self.cycle_timeout;
        async move {
            let started = Instant::now();
            let result = match time::timeout(deadline, source.fetch_reading()).await {
                Ok(result) => result,
                Err(elapsed) => Err(FetchError::Network {
                    path: source.path().to_string(),
                    source: Box::new(elapsed),
                }),
            };
            Completion {
                seq,
                trigger,
                started,
                result,
            }
        }
        .boxed_local()
    }

    fn on_tick(&mut self) -> Option<LocalBoxFuture<'static, Completion>> {
        match self.visibility {
            Visibility::Visible => Some(self.start_cycle(RefreshTrigger::TimerTick)),
            Visibility::Hidden => {
                self.stats.suppressed_ticks += 1;
                debug!("Timer tick suppressed while hidden");
                None
            }
        }
    }

    fn on_visibility(&mut self, visibility: Visibility) -> Option<LocalBoxFuture<'static, Completion>> {
        if self.visibility != visibility {
            info!("Display is now {:?}", visibility);
        }
        self.visibility = visibility;

        match visibility {
            Visibility::Visible => Some(self.start_cycle(RefreshTrigger::VisibilityBecameVisible)),
            Visibility::Hidden => None,
        }
    }

    fn complete(&mut self, done: Completion) {
        let Completion {
            seq,
            trigger,
            started,
            result,
        } = done;
        debug!(
            "Refresh cycle #{seq} ({trigger}) took: {} ms",
            started.elapsed().as_millis()
        );

        let newest = self.last_completed;
        self.last_completed = Some(newest.map_or(seq, |last| last.max(seq)));

        match result {
            Ok(reading) => match newest {
                Some(last) if seq < last => {
                    self.stats.discarded += 1;
                    debug!("Discarding reading from cycle #{seq}, cycle #{last} already finished");
                }
                _ => {
                    self.stats.applied += 1;
                    self.display.apply_reading(reading);
                }
            },
            Err(e) => {
                self.stats.failed += 1;
                self.display.report_failure(&e);
            }
        }
    }
}
