use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::{self, MissedTickBehavior};

use crate::sync::engine::{Evaluation, SyncEngine};

/// Round-robin over the account pool, advanced once per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRotation {
    pool: usize,
    next: usize,
}

impl AccountRotation {
    /// Rotation over `pool` accounts (at least one).
    pub fn new(pool: usize) -> Self {
        Self {
            pool: pool.max(1),
            next: 0,
        }
    }

    /// Number of accounts in the pool.
    pub fn pool(&self) -> usize {
        self.pool
    }

    /// Account for this tick; moves the index to the next one.
    pub fn advance(&mut self) -> usize {
        let account = self.next;
        self.next = (self.next + 1) % self.pool;
        account
    }
}

/// What one scheduler tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine ran to completion.
    Evaluated(Evaluation),
    /// Upstream throttled us; ticks pause for `pause`.
    Throttled {
        /// Consecutive throttle count including this one.
        count: u32,
        /// Delay before the next tick.
        pause: Duration,
    },
    /// Any other failure. The next tick proceeds normally.
    Failed(String),
}

/// Drives a [`SyncEngine`] on a fixed interval with linear throttle backoff.
pub struct Scheduler {
    engine: Arc<SyncEngine>,
    rotation: AccountRotation,
    interval: Duration,
    backoff_base: Duration,
}

impl Scheduler {
    /// Scheduler ticking every `interval`, pausing `backoff_base * n` after the n-th
    /// consecutive throttle.
    pub fn new(
        engine: Arc<SyncEngine>,
        rotation: AccountRotation,
        interval: Duration,
        backoff_base: Duration,
    ) -> Self {
        Self {
            engine,
            rotation,
            interval,
            backoff_base,
        }
    }

    /// Engine being driven.
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One tick: pick the account, evaluate, apply the backoff policy.
    pub async fn step(&mut self) -> TickOutcome {
        let account = self.rotation.advance();
        match self.engine.evaluate(account).await {
            Ok(evaluation) => {
                self.engine.reset_throttle();
                TickOutcome::Evaluated(evaluation)
            }
            Err(err) if err.is_rate_limited() => {
                let count = self.engine.record_throttle();
                let pause = self.backoff_base.saturating_mul(count);
                tracing::warn!(count, pause_ms = pause.as_millis() as u64, error = %err, "throttled, pausing");
                match self.engine.force_clear().await {
                    Ok(Evaluation::Busy) => {
                        tracing::warn!("cover removal skipped, generation in flight");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(error = %err, "fallback cover removal failed"),
                }
                TickOutcome::Throttled { count, pause }
            }
            Err(err) => {
                tracing::warn!(account, error = %err, "evaluation failed");
                TickOutcome::Failed(err.to_string())
            }
        }
    }

    /// Tick until `shutdown` resolves. An in-flight tick is allowed to finish.
    ///
    /// After a throttle the next tick fires as soon as the backoff pause ends, then the
    /// regular interval resumes from there.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            accounts = self.rotation.pool(),
            "scheduler started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let TickOutcome::Throttled { pause, .. } = self.step().await else {
                continue;
            };
            tokio::select! {
                () = &mut shutdown => break,
                () = time::sleep(pause) => {}
            }
            ticker.reset_immediately();
        }
        tracing::info!("scheduler stopped");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/scheduler.rs"]
mod tests;
