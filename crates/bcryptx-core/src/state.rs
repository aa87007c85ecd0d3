//! Tuned cost state
//!
//! The cost pair moves through three phases:
//!
//! ```text
//! Unset --(first read)--> Tuning --(success)--> Ready
//!   ^                        |                    |
//!   +------(failure)---------+    (explicit tune) |
//!                            ^--------------------+
//! ```
//!
//! Only one tuning run is in flight per instance. Readers that arrive while a
//! run is in flight wait for it instead of starting another, and share its
//! error if it fails. A failed run puts back whatever was there before it
//! started, so the next reader to arrive after it tries again.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::{Error, Result, TunedCosts, TuningReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unset,
    Tuning,
    Ready(TunedCosts),
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    /// Runs started so far; numbers each run
    runs: u64,
    /// Number and error of the latest failed run
    failure: Option<(u64, Error)>,
}

/// Holder for one instance's quick and strong costs
#[derive(Debug)]
pub struct TunedState {
    inner: Mutex<Inner>,
    settled: Condvar,
}

impl TunedState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: Phase::Unset,
                runs: 0,
                failure: None,
            }),
            settled: Condvar::new(),
        }
    }

    /// Current costs without waiting or tuning
    ///
    /// Returns `None` while unset or while a run is in flight.
    pub fn peek(&self) -> Option<TunedCosts> {
        match self.lock().phase {
            Phase::Ready(costs) => Some(costs),
            _ => None,
        }
    }

    /// Whether a tuning run is in flight
    pub fn is_tuning(&self) -> bool {
        matches!(self.lock().phase, Phase::Tuning)
    }

    /// Current costs, running `tune` first if none are set
    ///
    /// A caller that waited on an in-flight run which then failed gets that
    /// run's error rather than starting a run of its own.
    pub fn current<F>(&self, tune: F) -> Result<TunedCosts>
    where
        F: FnOnce() -> Result<TuningReport>,
    {
        let inner = self.lock();
        let joined = matches!(inner.phase, Phase::Tuning).then_some(inner.runs);
        let inner = self.wait_settled(inner);

        if let Phase::Ready(costs) = inner.phase {
            return Ok(costs);
        }
        if let (Some(joined), Some((failed, err))) = (joined, &inner.failure) {
            if *failed >= joined {
                return Err(err.replay());
            }
        }
        self.run(inner, tune).map(|report| report.costs)
    }

    /// Run `tune` and replace the current costs with its result
    pub fn retune<F>(&self, tune: F) -> Result<TuningReport>
    where
        F: FnOnce() -> Result<TuningReport>,
    {
        let inner = self.wait_settled(self.lock());
        self.run(inner, tune)
    }

    fn run<F>(&self, mut inner: MutexGuard<'_, Inner>, tune: F) -> Result<TuningReport>
    where
        F: FnOnce() -> Result<TuningReport>,
    {
        let previous = inner.phase;
        inner.phase = Phase::Tuning;
        inner.runs += 1;
        let run = inner.runs;
        drop(inner);

        let mut flight = InFlight {
            state: self,
            run,
            outcome: previous,
            failure: Some(Error::Internal("tuning run panicked".into())),
        };

        let result = tune();
        match &result {
            Ok(report) => {
                flight.outcome = Phase::Ready(report.costs);
                flight.failure = None;
            }
            Err(e) => {
                tracing::warn!(run, error = %e, "Tuning run failed");
                flight.failure = Some(e.replay());
            }
        }
        drop(flight);

        result
    }

    fn wait_settled<'a>(&'a self, inner: MutexGuard<'a, Inner>) -> MutexGuard<'a, Inner> {
        self.settled
            .wait_while(inner, |inner| matches!(inner.phase, Phase::Tuning))
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TunedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Leaves the `Tuning` phase when dropped, even if the run panicked
struct InFlight<'a> {
    state: &'a TunedState,
    run: u64,
    outcome: Phase,
    failure: Option<Error>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.state.lock();
        inner.phase = self.outcome;
        inner.failure = self.failure.take().map(|err| (self.run, err));
        drop(inner);
        self.state.settled.notify_all();
    }
}
